//! Backend that drives no native library
//!
//! Useful for tools, tests and servers that still want the tracking
//! discipline without opening a display or audio device.

use super::{SubsystemBackend, Subsystems};

/// No-op backend that remembers what it was asked to do
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    active: Option<Subsystems>,
    init_count: u32,
}

impl HeadlessBackend {
    /// Backend kind name used by the factory
    pub const KIND: &'static str = "headless";

    /// Create a new headless backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Subsystems passed to the last successful initialize, while up
    pub const fn active(&self) -> Option<Subsystems> {
        self.active
    }

    /// How many times the backend has been brought up
    pub const fn init_count(&self) -> u32 {
        self.init_count
    }
}

impl SubsystemBackend for HeadlessBackend {
    fn name(&self) -> &str {
        Self::KIND
    }

    fn initialize(&mut self, subsystems: Subsystems) -> Result<(), String> {
        if self.active.is_some() {
            return Err("headless backend is already running".to_string());
        }
        log::debug!("Headless backend up with {:?}", subsystems);
        self.active = Some(subsystems);
        self.init_count += 1;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), String> {
        match self.active.take() {
            Some(_) => {
                log::debug!("Headless backend down");
                Ok(())
            }
            None => Err("headless backend is not running".to_string()),
        }
    }
}
