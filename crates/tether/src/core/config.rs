//! # Unified Configuration
//!
//! Configuration for the subsystem handle, logging, and the defaults new
//! windows are created with. Every structure is serializable, so a whole
//! [`HandleConfig`] can live in a TOML or RON file.
//!
//! ```toml
//! backend = "headless"
//! subsystems = "VIDEO | EVENTS"
//!
//! [logging]
//! level = "debug"
//!
//! [window]
//! title = "Main"
//! options = "SHOWN | RESIZABLE"
//!
//! [window.geometry]
//! x = 0
//! y = 0
//! width = 1280
//! height = 720
//! ```

use log::LevelFilter;
use serde::{Serialize, Deserialize};

use crate::foundation::logging;
use crate::subsystem::{HeadlessBackend, Subsystems};
use crate::window::{Rectangle, WindowOptions};

// Re-export from the config module for convenience
pub use crate::config::{Config, ConfigError};

/// # Logging Configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level filter, overridable through `RUST_LOG`
    pub level: String,
}

impl LoggingConfig {
    /// Create a logging configuration with the given level
    pub fn new(level: impl Into<String>) -> Self {
        Self { level: level.into() }
    }

    /// Parsed level filter
    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        logging::parse_level(&self.level)
            .ok_or_else(|| ConfigError::Invalid(format!("unknown log level '{}'", self.level)))
    }

    /// Install the logger with this configuration
    pub fn apply(&self) -> Result<(), ConfigError> {
        logging::init_with_level(self.level_filter()?);
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info")
    }
}

/// # Window Defaults
///
/// Values new windows start with when built from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Initial option flags
    pub options: WindowOptions,
    /// Position and size
    pub geometry: Rectangle,
}

impl WindowConfig {
    /// Create window defaults with a title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            options: WindowOptions::SHOWN | WindowOptions::RESIZABLE,
            geometry: Rectangle::sized(1280, 720),
        }
    }

    /// Set geometry
    pub fn with_geometry(mut self, geometry: Rectangle) -> Self {
        self.geometry = geometry;
        self
    }

    /// Set option flags
    pub fn with_options(mut self, options: WindowOptions) -> Self {
        self.options = options;
        self
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("Tether Window")
    }
}

/// # Handle Configuration
///
/// Top-level configuration handed to the
/// [`HandleFactory`](crate::handle::HandleFactory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleConfig {
    /// Backend kind used by `create_default_handle`
    pub backend: String,
    /// Subsystems switched on before the handle initializes
    pub subsystems: Subsystems,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Window defaults
    pub window: WindowConfig,
}

impl HandleConfig {
    /// Create a configuration for the given backend kind
    pub fn new(backend: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            subsystems: Subsystems::VIDEO | Subsystems::EVENTS,
            logging: LoggingConfig::default(),
            window: WindowConfig::default(),
        }
    }

    /// Set subsystems to activate on creation
    pub fn with_subsystems(mut self, subsystems: Subsystems) -> Self {
        self.subsystems = subsystems;
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.logging.level = level.into();
        self
    }

    /// Set window defaults
    pub fn with_window(mut self, window: WindowConfig) -> Self {
        self.window = window;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.trim().is_empty() {
            return Err(ConfigError::Invalid("backend kind cannot be empty".to_string()));
        }

        self.logging.level_filter()?;

        if self.window.title.is_empty() {
            return Err(ConfigError::Invalid("window title cannot be empty".to_string()));
        }

        Ok(())
    }
}

impl Default for HandleConfig {
    fn default() -> Self {
        Self::new(HeadlessBackend::KIND)
    }
}

impl Config for HandleConfig {}
