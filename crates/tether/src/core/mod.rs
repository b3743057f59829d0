//! # Core Module
//!
//! Shared abstractions the rest of the crate builds on.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for the handle, logging and window defaults
//! - **Foundation**: Low-level utilities (identity, logging)

pub mod config;

// Re-export foundation modules for convenience
pub use crate::foundation;

// Re-export commonly used config types
pub use config::{
    HandleConfig,
    LoggingConfig,
    WindowConfig,
    Config,
    ConfigError,
};
