//! Infrastructure layer module
//!
//! Configuration management and logging setup. Store implementations live
//! under `adapters::sqlite` and satisfy the port traits defined in the
//! domain layer.

pub mod config;
pub mod logging;
