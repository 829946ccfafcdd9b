pub mod config;
pub mod sweep;
pub mod sync;
