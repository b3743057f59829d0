//! Subsystem selection and backend abstraction
//!
//! A [`ResourceHandle`](crate::handle::ResourceHandle) never talks to a native
//! library directly. It drives a [`SubsystemBackend`] that is injected when the
//! handle is built, so one handle type serves every library binding.

pub mod flags;
pub mod headless;

pub use flags::Subsystems;
pub use headless::HeadlessBackend;

/// Backend trait for the external subsystem
///
/// Implementations perform the real library setup and teardown. The handle
/// calls into the backend only from `initialize` and `shutdown`.
pub trait SubsystemBackend: Send {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Bring the library up with the requested subsystems
    fn initialize(&mut self, subsystems: Subsystems) -> Result<(), String>;

    /// Tear the library down
    fn shutdown(&mut self) -> Result<(), String>;

    /// Most recent error reported by the library, if any
    ///
    /// Consulted whenever the handle raises a contract error so the
    /// library's own diagnostics travel with it.
    fn last_error(&self) -> Option<String> {
        None
    }
}
