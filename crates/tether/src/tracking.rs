//! Trackable resource capability
//!
//! Anything that must be released before the subsystem goes away implements
//! [`Trackable`]. The handle keeps only weak references to trackables and asks
//! them to release themselves at shutdown.
//!
//! Registration is not part of this trait: an implementation's own
//! `activate`/`release` decide when to call
//! [`ResourceHandle::track`](crate::handle::ResourceHandle::track) and
//! [`ResourceHandle::untrack`](crate::handle::ResourceHandle::untrack).

use std::sync::Weak;

use crate::foundation::ResourceId;
use crate::Result;

/// A resource whose lifetime is bound to the subsystem handle
pub trait Trackable: Send + Sync {
    /// Stable identity used by the handle registry
    fn resource_id(&self) -> ResourceId;

    /// Create the resource
    ///
    /// Fails with `AlreadyCreated` when called on an active resource.
    fn activate(&self) -> Result<()>;

    /// Destroy the resource
    ///
    /// Fails with `NotCreated` when called on an inactive resource. The
    /// handle calls this for every tracked resource at shutdown, and the
    /// implementation may call back into the handle while doing so.
    fn release(&self) -> Result<()>;

    /// Short description for logs
    fn describe(&self) -> String {
        self.resource_id().to_string()
    }
}

/// Non-owning reference to any trackable
pub type TrackableRef = Weak<dyn Trackable>;

/// A reference that points at nothing, the "null" trackable
pub fn dangling() -> TrackableRef {
    Weak::<Dangling>::new()
}

/// Uninhabited type backing [`dangling`]
enum Dangling {}

impl Trackable for Dangling {
    fn resource_id(&self) -> ResourceId {
        match *self {}
    }

    fn activate(&self) -> Result<()> {
        match *self {}
    }

    fn release(&self) -> Result<()> {
        match *self {}
    }
}
