//! # Tether
//!
//! Lifecycle management for resources that depend on an external, process-wide
//! library that must be initialized before use and shut down afterwards.
//!
//! ## Features
//!
//! - **Single Handle**: A [`HandleFactory`] guards the one subsystem handle
//! - **Resource Tracking**: The handle releases every live dependent resource at shutdown
//! - **Pluggable Backends**: The native library sits behind [`SubsystemBackend`]
//! - **Window Trees**: Windows register themselves and can be grouped under parents
//! - **Configuration**: TOML or RON files for backend, subsystems, logging and window defaults
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tether::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let factory = HandleFactory::new(HandleConfig::default()).into_shared();
//!     factory.create_default_handle()?;
//!
//!     let main_window = Window::new(&factory, "Main", Rectangle::sized(800, 600));
//!     main_window.activate()?;
//!
//!     // Releases the window, then shuts the library down
//!     factory.destroy_handle()?;
//!     assert!(!main_window.is_created());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

// Core modules
pub mod core;
pub mod config;
pub mod error;
pub mod foundation;

// Lifecycle
pub mod handle;
pub mod subsystem;
pub mod tracking;

// Dependent resources
pub mod window;

#[cfg(test)]
mod tests;

pub use error::{ContractKind, ErrorKind, HandleError};

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, HandleError>;

/// Common imports for applications
pub mod prelude {
    pub use crate::core::{Config, HandleConfig, LoggingConfig, WindowConfig};
    pub use crate::error::{ErrorKind, HandleError};
    pub use crate::foundation::ResourceId;
    pub use crate::handle::{HandleFactory, HandlePhase, ResourceHandle};
    pub use crate::subsystem::{HeadlessBackend, SubsystemBackend, Subsystems};
    pub use crate::tracking::Trackable;
    pub use crate::window::{Rectangle, Window, WindowOptions};
}
