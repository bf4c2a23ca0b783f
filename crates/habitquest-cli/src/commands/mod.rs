pub mod archive;
pub mod chains;
pub mod complete;
pub mod config;
pub mod level;
pub mod log;
pub mod sync;
pub mod week;
