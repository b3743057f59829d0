//! Error types for handle and resource lifecycle operations
//!
//! Every state-machine violation is reported through [`HandleError`]. The six
//! contract kinds carry an optional [`Detail`] string pulled from the
//! subsystem's "last error" query at the moment the error is raised.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::foundation::ResourceId;

/// Zero-argument provider of an externally supplied error detail
///
/// Backends usually wrap their library's "last error" query in one of these.
pub type DetailProvider = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Flat classification of every [`HandleError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The handle was initialized twice without an intervening shutdown
    AlreadyInitialized,
    /// The handle was shut down (or used) while not initialized
    NotInitialized,
    /// A handle or resource was created twice
    AlreadyCreated,
    /// A handle or resource was used before creation
    NotCreated,
    /// A resource reference was absent or already dropped
    NullResource,
    /// A window tried to leave a parent it does not have
    NoParent,
    /// A parent link would make a window its own ancestor
    ParentCycle,
    /// No backend builder is registered for the requested kind
    UnknownBackend,
    /// The subsystem backend reported a failure
    Backend,
    /// One or more tracked resources failed to release during shutdown
    Teardown,
}

impl ErrorKind {
    /// Human-readable message associated with the kind
    pub const fn message(self) -> &'static str {
        match self {
            Self::AlreadyInitialized => "The subsystem handle is already initialized",
            Self::NotInitialized => "The subsystem handle is not initialized",
            Self::AlreadyCreated => "The object already exists; it cannot be created again",
            Self::NotCreated => "The object must be created before being accessed or released",
            Self::NullResource => "The resource reference is absent or no longer alive",
            Self::NoParent => "The window has no parent to detach from",
            Self::ParentCycle => "The parent link would create a cycle",
            Self::UnknownBackend => "No backend is registered for the requested kind",
            Self::Backend => "The subsystem backend reported a failure",
            Self::Teardown => "Some tracked resources failed to release",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The six contract violations that carry a [`Detail`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractKind {
    /// See [`ErrorKind::AlreadyInitialized`]
    AlreadyInitialized,
    /// See [`ErrorKind::NotInitialized`]
    NotInitialized,
    /// See [`ErrorKind::AlreadyCreated`]
    AlreadyCreated,
    /// See [`ErrorKind::NotCreated`]
    NotCreated,
    /// See [`ErrorKind::NullResource`]
    NullResource,
    /// See [`ErrorKind::NoParent`]
    NoParent,
}

impl From<ContractKind> for ErrorKind {
    fn from(kind: ContractKind) -> Self {
        match kind {
            ContractKind::AlreadyInitialized => Self::AlreadyInitialized,
            ContractKind::NotInitialized => Self::NotInitialized,
            ContractKind::AlreadyCreated => Self::AlreadyCreated,
            ContractKind::NotCreated => Self::NotCreated,
            ContractKind::NullResource => Self::NullResource,
            ContractKind::NoParent => Self::NoParent,
        }
    }
}

/// Optional detail text appended to a contract error
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Detail(Option<String>);

impl Detail {
    /// Detail with no extra text
    pub const fn none() -> Self {
        Self(None)
    }

    /// Wrap a detail string; empty strings count as no detail
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(text))
        }
    }

    /// Wrap an optional detail string
    pub fn from_option(text: Option<String>) -> Self {
        text.map_or_else(Self::none, Self::new)
    }

    /// Query a provider, if any
    pub fn from_provider(provider: Option<&DetailProvider>) -> Self {
        Self::from_option(provider.and_then(|provider| provider()))
    }

    /// The detail text, if present
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl fmt::Display for Detail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(text) => write!(f, " ({text})"),
            None => Ok(()),
        }
    }
}

/// A single resource that failed to release during shutdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseFailure {
    /// Identity of the failing resource, `None` for the backend itself
    pub resource: Option<ResourceId>,
    /// What went wrong
    pub error: HandleError,
}

impl fmt::Display for ReleaseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.resource {
            Some(id) => write!(f, "{id}: {}", self.error),
            None => write!(f, "backend: {}", self.error),
        }
    }
}

/// Errors raised by handles, the factory and dependent resources
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleError {
    /// Initialize called on an initialized handle
    #[error("{}{}", ErrorKind::AlreadyInitialized, .0)]
    AlreadyInitialized(Detail),

    /// Operation requires an initialized handle
    #[error("{}{}", ErrorKind::NotInitialized, .0)]
    NotInitialized(Detail),

    /// Handle or resource created twice
    #[error("{}{}", ErrorKind::AlreadyCreated, .0)]
    AlreadyCreated(Detail),

    /// Handle or resource not created yet
    #[error("{}{}", ErrorKind::NotCreated, .0)]
    NotCreated(Detail),

    /// Absent or dropped resource reference
    #[error("{}{}", ErrorKind::NullResource, .0)]
    NullResource(Detail),

    /// Detach requested without a parent
    #[error("{}{}", ErrorKind::NoParent, .0)]
    NoParent(Detail),

    /// Linking `child` under `parent` would close a loop
    #[error("Linking {child} under {parent} would create a parent cycle")]
    ParentCycle {
        /// Window asking for a parent
        child: ResourceId,
        /// Requested parent
        parent: ResourceId,
    },

    /// No backend builder for the kind
    #[error("No subsystem backend registered for kind '{0}'")]
    UnknownBackend(String),

    /// Backend failure during a lifecycle step
    #[error("Subsystem backend failed to {operation}: {message}")]
    Backend {
        /// Step that failed
        operation: &'static str,
        /// Backend message
        message: String,
    },

    /// Aggregated shutdown failures
    #[error("{} tracked resource(s) failed to release: {}", .0.len(), join_failures(.0))]
    Teardown(Vec<ReleaseFailure>),
}

fn join_failures(failures: &[ReleaseFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl HandleError {
    /// Build a contract error of the given kind with a detail
    pub fn contract(kind: ContractKind, detail: Detail) -> Self {
        match kind {
            ContractKind::AlreadyInitialized => Self::AlreadyInitialized(detail),
            ContractKind::NotInitialized => Self::NotInitialized(detail),
            ContractKind::AlreadyCreated => Self::AlreadyCreated(detail),
            ContractKind::NotCreated => Self::NotCreated(detail),
            ContractKind::NullResource => Self::NullResource(detail),
            ContractKind::NoParent => Self::NoParent(detail),
        }
    }

    /// Kind of this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyInitialized(_) => ErrorKind::AlreadyInitialized,
            Self::NotInitialized(_) => ErrorKind::NotInitialized,
            Self::AlreadyCreated(_) => ErrorKind::AlreadyCreated,
            Self::NotCreated(_) => ErrorKind::NotCreated,
            Self::NullResource(_) => ErrorKind::NullResource,
            Self::NoParent(_) => ErrorKind::NoParent,
            Self::ParentCycle { .. } => ErrorKind::ParentCycle,
            Self::UnknownBackend(_) => ErrorKind::UnknownBackend,
            Self::Backend { .. } => ErrorKind::Backend,
            Self::Teardown(_) => ErrorKind::Teardown,
        }
    }

    /// Detail attached to a contract error, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::AlreadyInitialized(detail)
            | Self::NotInitialized(detail)
            | Self::AlreadyCreated(detail)
            | Self::NotCreated(detail)
            | Self::NullResource(detail)
            | Self::NoParent(detail) => detail.as_deref(),
            _ => None,
        }
    }

    /// Per-resource failures of an aggregated teardown error
    pub fn release_failures(&self) -> &[ReleaseFailure] {
        match self {
            Self::Teardown(failures) => failures,
            _ => &[],
        }
    }
}
