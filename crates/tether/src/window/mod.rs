//! Windows as tracked resources
//!
//! A [`Window`] registers itself with the subsystem handle when it is created
//! and unregisters when it is released. Windows can also be grouped into a
//! parent/child tree. The tree is purely logical: releasing a parent does not
//! release its children, and shutting the handle down releases every window
//! regardless of where it sits in the tree.
//!
//! Parents hold weak references to children and children hold a weak
//! reference to their parent, so the tree never keeps a window alive.

pub mod geometry;
pub mod options;

pub use geometry::Rectangle;
pub use options::WindowOptions;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::core::config::WindowConfig;
use crate::error::{ContractKind, HandleError};
use crate::foundation::ResourceId;
use crate::handle::HandleFactory;
use crate::tracking::{Trackable, TrackableRef};
use crate::Result;

struct WindowState {
    title: String,
    geometry: Rectangle,
    options: WindowOptions,
    parent: Option<Weak<Window>>,
    children: HashMap<ResourceId, Weak<Window>>,
    created: bool,
}

/// A window whose lifetime is bound to the subsystem handle
pub struct Window {
    id: ResourceId,
    factory: Arc<HandleFactory>,
    me: Weak<Window>,
    state: Mutex<WindowState>,
}

impl Window {
    /// Create a window description; call [`Trackable::activate`] to create it
    pub fn new(
        factory: &Arc<HandleFactory>,
        title: impl Into<String>,
        geometry: Rectangle,
    ) -> Arc<Self> {
        let title = title.into();
        Arc::new_cyclic(|me| Self {
            id: ResourceId::next(),
            factory: Arc::clone(factory),
            me: me.clone(),
            state: Mutex::new(WindowState {
                title,
                geometry,
                options: WindowOptions::NONE,
                parent: None,
                children: HashMap::new(),
                created: false,
            }),
        })
    }

    /// Create a window description from configured defaults
    pub fn from_config(factory: &Arc<HandleFactory>, config: &WindowConfig) -> Arc<Self> {
        let window = Self::new(factory, config.title.clone(), config.geometry);
        window.activate_option(config.options);
        window
    }

    fn state(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn as_trackable(&self) -> TrackableRef {
        self.me.clone()
    }

    /// Identity of this window
    pub const fn id(&self) -> ResourceId {
        self.id
    }

    /// Whether the window is currently created
    pub fn is_created(&self) -> bool {
        self.state().created
    }

    /// Window title
    pub fn title(&self) -> String {
        self.state().title.clone()
    }

    /// Change the window title
    pub fn set_title(&self, title: impl Into<String>) {
        self.state().title = title.into();
    }

    /// Position and size
    pub fn geometry(&self) -> Rectangle {
        self.state().geometry
    }

    /// Change position and size
    pub fn set_geometry(&self, geometry: Rectangle) {
        self.state().geometry = geometry;
    }

    /// Current option flags
    pub fn options(&self) -> WindowOptions {
        self.state().options
    }

    /// Turn options on, returning the resulting set
    pub fn activate_option(&self, options: WindowOptions) -> WindowOptions {
        let mut state = self.state();
        state.options.insert(options);
        state.options
    }

    /// Turn options off, returning the resulting set
    pub fn deactivate_option(&self, options: WindowOptions) -> WindowOptions {
        let mut state = self.state();
        state.options.remove(options);
        state.options
    }

    /// Make this window a child of `parent`
    ///
    /// A window that already has a parent is detached from it first. Links
    /// that would make the window its own ancestor are rejected with
    /// [`HandleError::ParentCycle`].
    pub fn link_to_parent(&self, parent: &Arc<Self>) -> Result<()> {
        // Every window touched stays alive until the tree lock is gone
        let mut lineage = Vec::new();
        let _tree = self.factory.tree_lock();

        let mut cursor = Some(Arc::clone(parent));
        while let Some(ancestor) = cursor {
            if ancestor.id == self.id {
                lineage.push(ancestor);
                return Err(HandleError::ParentCycle { child: self.id, parent: parent.id });
            }
            cursor = ancestor.parent();
            lineage.push(ancestor);
        }

        let previous = self.state().parent.replace(Arc::downgrade(parent));
        if let Some(previous) = previous.and_then(|weak| weak.upgrade()) {
            if previous.id != parent.id {
                previous.state().children.remove(&self.id);
            }
            lineage.push(previous);
        }
        parent.state().children.insert(self.id, self.me.clone());

        log::debug!("Linked {} under {}", self.id, parent.id);
        Ok(())
    }

    /// Detach this window from its parent
    ///
    /// Fails with `NoParent` when no parent is set.
    pub fn loose_parent(&self) -> Result<()> {
        let detached = {
            let _tree = self.factory.tree_lock();
            let link = self.state().parent.take();
            let parent = link.ok_or_else(|| self.factory.error(ContractKind::NoParent))?.upgrade();
            if let Some(parent) = &parent {
                parent.state().children.remove(&self.id);
            }
            parent
        };

        if let Some(parent) = detached {
            log::debug!("Unlinked {} from {}", self.id, parent.id);
        }
        Ok(())
    }

    /// Parent window, if set and still alive
    pub fn parent(&self) -> Option<Arc<Self>> {
        self.state().parent.as_ref().and_then(Weak::upgrade)
    }

    /// Live children in ascending id order
    pub fn children(&self) -> Vec<Arc<Self>> {
        let mut children: Vec<_> = self.state().children.values().filter_map(Weak::upgrade).collect();
        children.sort_by_key(|child| child.id);
        children
    }

    /// Whether `child` is linked under this window
    pub fn has_child(&self, child: &Self) -> bool {
        self.state().children.contains_key(&child.id)
    }
}

impl Trackable for Window {
    fn resource_id(&self) -> ResourceId {
        self.id
    }

    fn activate(&self) -> Result<()> {
        let mut state = self.state();
        if state.created {
            return Err(self.factory.error(ContractKind::AlreadyCreated));
        }

        self.factory.get_handle()?.track(&self.as_trackable())?;
        state.created = true;

        log::debug!("Created window '{}' ({})", state.title, self.id);
        Ok(())
    }

    fn release(&self) -> Result<()> {
        let mut state = self.state();
        if !state.created {
            return Err(self.factory.error(ContractKind::NotCreated));
        }

        self.factory.get_handle()?.untrack(&self.as_trackable())?;
        state.created = false;

        log::debug!("Released window '{}' ({})", state.title, self.id);
        Ok(())
    }

    fn describe(&self) -> String {
        format!("window '{}' ({})", self.state().title, self.id)
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if state.created {
            log::warn!("Window '{}' ({}) dropped while still created", state.title, self.id);
        }
        if let Some(parent) = state.parent.take().and_then(|weak| weak.upgrade()) {
            let _tree = self.factory.tree_lock();
            parent.state().children.remove(&self.id);
        }
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Window")
            .field("id", &self.id)
            .field("title", &state.title)
            .field("geometry", &state.geometry)
            .field("options", &state.options)
            .field("created", &state.created)
            .field("children", &state.children.len())
            .finish()
    }
}
