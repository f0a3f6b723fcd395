//! Shared infrastructure: errors, configuration, paths and logging

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use config::Config;
pub use error::{Error, Result};
