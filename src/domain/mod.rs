pub mod commit;
pub mod diff;
pub mod record;
