//! Configuration sources layered on top of the defaults.

pub mod config_file;
pub mod environment;
