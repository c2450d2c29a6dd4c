//! Configuration file validation and generation
//!
//! This module provides:
//! - Schema validation for the JSON config files accepted by the CLIs
//!   (the checkconfig command)
//! - Boot configuration generation for hybrid apps

pub mod bootconfig;
pub mod check;

pub use bootconfig::bootconfig;
pub use check::{check_config, ConfigError, ConfigKind, ConfigReport};
