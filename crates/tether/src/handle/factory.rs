//! Handle factory
//!
//! The factory is the context object every dependent resource is given. It
//! holds at most one [`ResourceHandle`] and is the only way to create, reach
//! or destroy it.
//!
//! ```text
//!  Empty --create_handle--> Holding --destroy_handle--> Empty
//! ```
//!
//! `create_handle` and `destroy_handle` are serialized by a lifecycle lock.
//! Window tree changes are serialized by a separate tree lock.
//! The slot itself is only locked for a moment, so resources can still reach
//! the handle through [`HandleFactory::get_handle`] while `destroy_handle` is
//! releasing them.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use crate::core::config::HandleConfig;
use crate::error::{ContractKind, Detail, DetailProvider, HandleError};
use crate::subsystem::{HeadlessBackend, SubsystemBackend};
use crate::Result;

use super::{HandlePhase, ResourceHandle};

/// Builds the backend for one handle kind
pub type BackendBuilder =
    Arc<dyn Fn(&HandleConfig) -> Result<Box<dyn SubsystemBackend>> + Send + Sync>;

/// Guardian of the single subsystem handle
pub struct HandleFactory {
    config: HandleConfig,
    builders: RwLock<HashMap<String, BackendBuilder>>,
    detail: Option<DetailProvider>,
    lifecycle: Mutex<()>,
    slot: RwLock<Option<Arc<ResourceHandle>>>,
    tree: Mutex<()>,
}

impl HandleFactory {
    /// Create an empty factory with the headless backend registered
    pub fn new(config: HandleConfig) -> Self {
        let factory = Self {
            config,
            builders: RwLock::new(HashMap::new()),
            detail: None,
            lifecycle: Mutex::new(()),
            slot: RwLock::new(None),
            tree: Mutex::new(()),
        };
        factory.register_backend(HeadlessBackend::KIND, |_| Ok(Box::new(HeadlessBackend::new())));
        factory
    }

    /// Attach a provider whose text is appended to factory errors
    #[must_use]
    pub fn with_error_detail(
        mut self,
        provider: impl Fn() -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.detail = Some(Arc::new(provider));
        self
    }

    /// Wrap the factory for sharing with dependent resources
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Configuration the factory was built with
    pub fn config(&self) -> &HandleConfig {
        &self.config
    }

    /// Register or replace the builder for a backend kind
    pub fn register_backend(
        &self,
        kind: impl Into<String>,
        builder: impl Fn(&HandleConfig) -> Result<Box<dyn SubsystemBackend>> + Send + Sync + 'static,
    ) {
        let kind = kind.into();
        log::debug!("Registering subsystem backend '{}'", kind);
        self.builders
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(kind, Arc::new(builder));
    }

    /// Registered backend kinds in alphabetical order
    pub fn backend_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<_> = self
            .builders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        kinds.sort();
        kinds
    }

    pub(crate) fn error(&self, kind: ContractKind) -> HandleError {
        HandleError::contract(kind, Detail::from_provider(self.detail.as_ref()))
    }

    /// Serializes parent/child changes between windows of this factory
    ///
    /// Taken before any window state lock. No window may be dropped while it
    /// is held.
    pub(crate) fn tree_lock(&self) -> MutexGuard<'_, ()> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> Option<Arc<ResourceHandle>> {
        self.slot.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Create, configure and initialize the handle for `kind`
    ///
    /// Fails with `AlreadyCreated` while a handle exists and with
    /// `UnknownBackend` when no builder is registered for `kind`.
    pub fn create_handle(&self, kind: &str) -> Result<Arc<ResourceHandle>> {
        let _lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        if self.current().is_some() {
            return Err(self.error(ContractKind::AlreadyCreated));
        }

        let builder = self
            .builders
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(kind)
            .cloned()
            .ok_or_else(|| HandleError::UnknownBackend(kind.to_string()))?;

        let handle = ResourceHandle::new(kind, builder(&self.config)?);
        handle.activate_subsystems(self.config.subsystems);
        handle.initialize()?;

        let handle = Arc::new(handle);
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&handle));
        log::info!("Created subsystem handle '{}'", kind);
        Ok(handle)
    }

    /// Create the handle for the backend named in the configuration
    pub fn create_default_handle(&self) -> Result<Arc<ResourceHandle>> {
        self.create_handle(&self.config.backend)
    }

    /// Shut the handle down and forget it
    ///
    /// Fails with `NotCreated` when there is no handle. The reference is
    /// cleared even when teardown reports failures; those are returned
    /// afterwards. A handle that was already shut down by hand is simply
    /// dropped. While a manual shutdown is still running the handle is kept
    /// and `NotInitialized` is returned, so releasing resources can still
    /// reach it.
    pub fn destroy_handle(&self) -> Result<()> {
        let _lifecycle = self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
        let handle = self.current().ok_or_else(|| self.error(ContractKind::NotCreated))?;

        let result = match handle.phase() {
            HandlePhase::Initialized => handle.shutdown(),
            HandlePhase::ShuttingDown => {
                log::warn!("Subsystem handle '{}' is still shutting down", handle.kind());
                return Err(self.error(ContractKind::NotInitialized));
            }
            HandlePhase::Uninitialized => {
                log::warn!("Subsystem handle '{}' was already shut down", handle.kind());
                Ok(())
            }
        };

        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = None;
        log::info!("Destroyed subsystem handle '{}'", handle.kind());
        result
    }

    /// Shared reference to the current handle
    ///
    /// Fails with `NotCreated` when there is none; never creates one.
    pub fn get_handle(&self) -> Result<Arc<ResourceHandle>> {
        self.current().ok_or_else(|| self.error(ContractKind::NotCreated))
    }

    /// Whether a handle currently exists
    pub fn has_handle(&self) -> bool {
        self.current().is_some()
    }
}

impl Default for HandleFactory {
    fn default() -> Self {
        Self::new(HandleConfig::default())
    }
}

impl fmt::Debug for HandleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleFactory")
            .field("backend", &self.config.backend)
            .field("handle", &self.current())
            .finish_non_exhaustive()
    }
}
