//! Subsystem handle and its factory
//!
//! A [`ResourceHandle`] represents "the external library is up". It owns the
//! registry of trackable resources that depend on the library and releases
//! every one of them when the library is shut down. The [`HandleFactory`]
//! makes sure at most one handle exists at a time.
//!
//! # State machine
//!
//! ```text
//!  Uninitialized --initialize--> Initialized --shutdown--> ShuttingDown --> Uninitialized
//! ```
//!
//! Resources may only be tracked while the handle is `Initialized`. During
//! `ShuttingDown` the handle no longer accepts new registrations, but resources
//! can still untrack themselves; that is exactly what they do when `shutdown`
//! asks them to release.

pub mod factory;

pub use factory::{BackendBuilder, HandleFactory};

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{ContractKind, Detail, ErrorKind, HandleError, ReleaseFailure};
use crate::foundation::ResourceId;
use crate::subsystem::{HeadlessBackend, SubsystemBackend, Subsystems};
use crate::tracking::TrackableRef;
use crate::Result;

/// Lifecycle phase of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlePhase {
    /// Library is down
    Uninitialized,
    /// Library is up and resources may be tracked
    Initialized,
    /// Teardown in progress
    ShuttingDown,
}

struct HandleState {
    phase: HandlePhase,
    subsystems: Subsystems,
    tracked: HashMap<ResourceId, TrackableRef>,
    backend: Box<dyn SubsystemBackend>,
}

impl HandleState {
    fn contract_error(&self, kind: ContractKind) -> HandleError {
        HandleError::contract(kind, Detail::from_option(self.backend.last_error()))
    }
}

/// Handle to the external subsystem and registry of dependent resources
///
/// The registry holds weak references only. Dropping a resource without
/// releasing it leaves a dead entry that is skipped at shutdown and pruned on
/// the next `track`.
pub struct ResourceHandle {
    kind: String,
    state: Mutex<HandleState>,
}

impl ResourceHandle {
    /// Create an uninitialized handle driving the given backend
    pub fn new(kind: impl Into<String>, backend: Box<dyn SubsystemBackend>) -> Self {
        Self {
            kind: kind.into(),
            state: Mutex::new(HandleState {
                phase: HandlePhase::Uninitialized,
                subsystems: Subsystems::NONE,
                tracked: HashMap::new(),
                backend,
            }),
        }
    }

    /// Create an uninitialized handle on the headless backend
    pub fn headless() -> Self {
        Self::new(HeadlessBackend::KIND, Box::new(HeadlessBackend::new()))
    }

    fn state(&self) -> MutexGuard<'_, HandleState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bring the subsystem up
    ///
    /// Fails with `AlreadyInitialized` unless the handle is uninitialized. A
    /// backend failure leaves the handle uninitialized.
    pub fn initialize(&self) -> Result<()> {
        let mut state = self.state();
        if state.phase != HandlePhase::Uninitialized {
            return Err(state.contract_error(ContractKind::AlreadyInitialized));
        }

        let subsystems = state.subsystems;
        state
            .backend
            .initialize(subsystems)
            .map_err(|message| HandleError::Backend { operation: "initialize", message })?;
        state.phase = HandlePhase::Initialized;

        log::info!("Subsystem handle '{}' initialized with {:?}", self.kind, subsystems);
        Ok(())
    }

    /// Tear the subsystem down, releasing every tracked resource
    ///
    /// The registry is snapshotted and the lock dropped before any resource is
    /// released, so resources may untrack themselves from `release`. Entries
    /// that left the registry after the snapshot are not released again. A failing
    /// resource does not stop the loop; all failures come back together as
    /// [`HandleError::Teardown`]. Whatever happens, the registry ends up empty
    /// and the handle uninitialized.
    pub fn shutdown(&self) -> Result<()> {
        let snapshot: Vec<(ResourceId, TrackableRef)> = {
            let mut state = self.state();
            if state.phase != HandlePhase::Initialized {
                return Err(state.contract_error(ContractKind::NotInitialized));
            }
            state.phase = HandlePhase::ShuttingDown;
            state.tracked.iter().map(|(id, resource)| (*id, resource.clone())).collect()
        };

        log::info!(
            "Shutting down subsystem handle '{}' with {} tracked resource(s)",
            self.kind,
            snapshot.len()
        );

        let mut failures = Vec::new();
        for (id, resource) in snapshot {
            let Some(resource) = resource.upgrade() else {
                log::warn!("{id} was dropped without being released");
                continue;
            };

            // Released by a sibling or another thread since the snapshot
            if !self.is_tracked(id) {
                log::debug!("{} already released", resource.describe());
                continue;
            }

            match resource.release() {
                Ok(()) => log::debug!("Released {}", resource.describe()),
                Err(error) if error.kind() == ErrorKind::NotCreated && !self.is_tracked(id) => {
                    log::debug!("{} was released concurrently", resource.describe());
                }
                Err(error) => {
                    log::error!("Failed to release {}: {}", resource.describe(), error);
                    failures.push(ReleaseFailure { resource: Some(id), error });
                }
            }
        }

        let mut state = self.state();
        if !state.tracked.is_empty() {
            log::debug!("Dropping {} registration(s) left after release", state.tracked.len());
            state.tracked.clear();
        }
        if let Err(message) = state.backend.shutdown() {
            log::error!("Subsystem backend '{}' failed to shut down: {}", self.kind, message);
            failures.push(ReleaseFailure {
                resource: None,
                error: HandleError::Backend { operation: "shut down", message },
            });
        }
        state.phase = HandlePhase::Uninitialized;
        drop(state);

        if failures.is_empty() {
            log::info!("Subsystem handle '{}' shut down", self.kind);
            Ok(())
        } else {
            Err(HandleError::Teardown(failures))
        }
    }

    /// Switch subsystems on, returning the resulting set
    pub fn activate_subsystems(&self, subsystems: Subsystems) -> Subsystems {
        let mut state = self.state();
        state.subsystems.insert(subsystems);
        log::debug!("Active subsystems now {:?}", state.subsystems);
        state.subsystems
    }

    /// Switch subsystems off, returning the resulting set
    pub fn deactivate_subsystems(&self, subsystems: Subsystems) -> Subsystems {
        let mut state = self.state();
        state.subsystems.remove(subsystems);
        log::debug!("Active subsystems now {:?}", state.subsystems);
        state.subsystems
    }

    /// Register a resource
    ///
    /// Fails with `NullResource` when the reference no longer points at a live
    /// resource and with `NotInitialized` outside the initialized phase.
    /// Tracking the same resource twice is a no-op.
    pub fn track(&self, resource: &TrackableRef) -> Result<()> {
        let id = match resource.upgrade() {
            Some(live) => live.resource_id(),
            None => return Err(self.state().contract_error(ContractKind::NullResource)),
        };

        let mut state = self.state();
        if state.phase != HandlePhase::Initialized {
            return Err(state.contract_error(ContractKind::NotInitialized));
        }

        state.tracked.retain(|_, entry| entry.strong_count() > 0);
        if state.tracked.insert(id, resource.clone()).is_none() {
            log::debug!("Tracking {id} ({} total)", state.tracked.len());
        }
        Ok(())
    }

    /// Unregister a resource
    ///
    /// Fails with `NullResource` like [`track`](Self::track). Removing a
    /// resource that is not tracked is a no-op.
    pub fn untrack(&self, resource: &TrackableRef) -> Result<()> {
        let id = match resource.upgrade() {
            Some(live) => live.resource_id(),
            None => return Err(self.state().contract_error(ContractKind::NullResource)),
        };

        let mut state = self.state();
        if state.tracked.remove(&id).is_some() {
            log::debug!("Untracked {id} ({} left)", state.tracked.len());
        }
        Ok(())
    }

    /// Whether the subsystem is up
    pub fn is_initialized(&self) -> bool {
        self.state().phase == HandlePhase::Initialized
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> HandlePhase {
        self.state().phase
    }

    /// Subsystems currently switched on
    pub fn active_subsystems(&self) -> Subsystems {
        self.state().subsystems
    }

    /// Backend kind this handle was built for
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Name reported by the backend
    pub fn backend_name(&self) -> String {
        self.state().backend.name().to_string()
    }

    /// Number of registrations, including ones whose resource was dropped
    pub fn tracked_count(&self) -> usize {
        self.state().tracked.len()
    }

    /// Whether a resource is registered
    pub fn is_tracked(&self, id: ResourceId) -> bool {
        self.state().tracked.contains_key(&id)
    }

    /// Registered identities in ascending order
    pub fn tracked_ids(&self) -> Vec<ResourceId> {
        let mut ids: Vec<_> = self.state().tracked.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("ResourceHandle")
            .field("kind", &self.kind)
            .field("phase", &state.phase)
            .field("subsystems", &state.subsystems)
            .field("tracked", &state.tracked.len())
            .finish()
    }
}
