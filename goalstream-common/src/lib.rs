//! # Goalstream Common Library
//!
//! Shared code for the goalstream services including:
//! - Common error types
//! - Configuration loading (TOML + environment overrides)
//! - Game-clock string parsing

pub mod clock;
pub mod config;
pub mod error;

pub use config::IngestConfig;
pub use error::{Error, Result};
