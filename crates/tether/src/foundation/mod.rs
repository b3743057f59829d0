//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the crate:
//! - Resource identity allocation
//! - Logging utilities

pub mod identity;
pub mod logging;

pub use identity::ResourceId;
