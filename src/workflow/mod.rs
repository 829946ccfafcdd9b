pub mod summary;
pub mod sweep;
pub mod sync;
