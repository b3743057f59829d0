//! End-to-end lifecycle scenarios across the factory, handle and windows

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crate::config::ConfigFormat;
use crate::foundation::logging;
use crate::prelude::*;
use crate::tracking;

fn session() -> Arc<HandleFactory> {
    logging::init_for_tests();
    let factory = HandleFactory::default().into_shared();
    factory.create_default_handle().unwrap();
    factory
}

/// A GPU-style buffer that refuses to release while `pinned` is set
struct PinnedBuffer {
    id: ResourceId,
    factory: Arc<HandleFactory>,
    me: Weak<PinnedBuffer>,
    pinned: AtomicBool,
    created: AtomicBool,
}

impl PinnedBuffer {
    fn new(factory: &Arc<HandleFactory>, pinned: bool) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            id: ResourceId::next(),
            factory: Arc::clone(factory),
            me: me.clone(),
            pinned: AtomicBool::new(pinned),
            created: AtomicBool::new(false),
        })
    }
}

impl Trackable for PinnedBuffer {
    fn resource_id(&self) -> ResourceId {
        self.id
    }

    fn activate(&self) -> crate::Result<()> {
        let me: tracking::TrackableRef = self.me.clone();
        self.factory.get_handle()?.track(&me)?;
        self.created.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn release(&self) -> crate::Result<()> {
        if self.pinned.load(Ordering::SeqCst) {
            return Err(HandleError::Backend {
                operation: "free buffer",
                message: "buffer is pinned".to_string(),
            });
        }
        let me: tracking::TrackableRef = self.me.clone();
        self.factory.get_handle()?.untrack(&me)?;
        self.created.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// A swap chain that tears its window down together with itself
struct SwapChain {
    id: ResourceId,
    factory: Arc<HandleFactory>,
    me: Weak<SwapChain>,
    window: Arc<Window>,
    created: AtomicBool,
}

impl SwapChain {
    fn new(window: &Arc<Window>, factory: &Arc<HandleFactory>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            id: ResourceId::next(),
            factory: Arc::clone(factory),
            me: me.clone(),
            window: Arc::clone(window),
            created: AtomicBool::new(false),
        })
    }
}

impl Trackable for SwapChain {
    fn resource_id(&self) -> ResourceId {
        self.id
    }

    fn activate(&self) -> crate::Result<()> {
        let me: tracking::TrackableRef = self.me.clone();
        self.factory.get_handle()?.track(&me)?;
        self.created.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn release(&self) -> crate::Result<()> {
        let me: tracking::TrackableRef = self.me.clone();
        self.factory.get_handle()?.untrack(&me)?;
        self.created.store(false, Ordering::SeqCst);
        if self.window.is_created() {
            self.window.release()?;
        }
        Ok(())
    }
}

/// Tries to destroy the handle from inside its own teardown
struct Impatient {
    id: ResourceId,
    factory: Arc<HandleFactory>,
    me: Weak<Impatient>,
    outcome: Mutex<Option<crate::Result<()>>>,
}

impl Impatient {
    fn new(factory: &Arc<HandleFactory>) -> Arc<Self> {
        Arc::new_cyclic(|me| Self {
            id: ResourceId::next(),
            factory: Arc::clone(factory),
            me: me.clone(),
            outcome: Mutex::new(None),
        })
    }
}

impl Trackable for Impatient {
    fn resource_id(&self) -> ResourceId {
        self.id
    }

    fn activate(&self) -> crate::Result<()> {
        let me: tracking::TrackableRef = self.me.clone();
        self.factory.get_handle()?.track(&me)
    }

    fn release(&self) -> crate::Result<()> {
        *self.outcome.lock().unwrap() = Some(self.factory.destroy_handle());
        let me: tracking::TrackableRef = self.me.clone();
        self.factory.get_handle()?.untrack(&me)
    }
}

#[test]
fn test_destroy_handle_releases_window_tree() {
    let factory = session();
    let a = Window::new(&factory, "A", Rectangle::sized(800, 600));
    let b = Window::new(&factory, "B", Rectangle::sized(320, 240));
    a.activate().unwrap();
    b.activate().unwrap();
    b.link_to_parent(&a).unwrap();
    assert_eq!(factory.get_handle().unwrap().tracked_count(), 2);

    factory.destroy_handle().unwrap();

    assert!(!a.is_created());
    assert!(!b.is_created());
    assert!(!factory.has_handle());
    assert_eq!(factory.get_handle().unwrap_err().kind(), ErrorKind::NotCreated);

    // Tree links survive teardown
    assert!(a.has_child(&b));
}

#[test]
fn test_window_calls_after_destroy_fail() {
    let factory = session();
    let window = Window::new(&factory, "late", Rectangle::sized(100, 100));
    window.activate().unwrap();
    factory.destroy_handle().unwrap();

    assert_eq!(window.release().unwrap_err().kind(), ErrorKind::NotCreated);
    assert_eq!(window.activate().unwrap_err().kind(), ErrorKind::NotCreated);
}

#[test]
fn test_windows_survive_a_session_restart() {
    let factory = session();
    let window = Window::new(&factory, "persistent", Rectangle::sized(100, 100));
    window.activate().unwrap();
    factory.destroy_handle().unwrap();

    let handle = factory.create_default_handle().unwrap();
    assert_eq!(handle.tracked_count(), 0);

    window.activate().unwrap();
    assert!(handle.is_tracked(window.id()));
}

#[test]
fn test_manual_shutdown_then_destroy() {
    let factory = session();
    let window = Window::new(&factory, "manual", Rectangle::sized(100, 100));
    window.activate().unwrap();

    let handle = factory.get_handle().unwrap();
    handle.shutdown().unwrap();
    assert!(!window.is_created());
    assert_eq!(window.activate().unwrap_err().kind(), ErrorKind::NotInitialized);

    factory.destroy_handle().unwrap();
    assert!(!factory.has_handle());
}

#[test]
fn test_dropped_window_does_not_block_shutdown() {
    let factory = session();
    let kept = Window::new(&factory, "kept", Rectangle::sized(10, 10));
    kept.activate().unwrap();
    {
        let lost = Window::new(&factory, "lost", Rectangle::sized(10, 10));
        lost.activate().unwrap();
    }

    factory.destroy_handle().unwrap();
    assert!(!kept.is_created());
}

#[test]
fn test_failing_resource_is_reported_after_full_teardown() {
    let factory = session();
    let window = Window::new(&factory, "window", Rectangle::sized(10, 10));
    let loose = PinnedBuffer::new(&factory, false);
    let pinned = PinnedBuffer::new(&factory, true);
    window.activate().unwrap();
    loose.activate().unwrap();
    pinned.activate().unwrap();
    let handle = factory.get_handle().unwrap();

    let err = factory.destroy_handle().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Teardown);
    let failures = err.release_failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].resource, Some(pinned.id));
    assert!(!window.is_created());
    assert!(!loose.created.load(Ordering::SeqCst));
    assert!(pinned.created.load(Ordering::SeqCst));
    assert_eq!(handle.tracked_count(), 0);
    assert!(!handle.is_initialized());
    assert!(!factory.has_handle());
}

#[test]
fn test_concurrent_windows_share_one_handle() {
    let factory = session();
    let workers: Vec<_> = (0..8)
        .map(|index| {
            let factory = Arc::clone(&factory);
            std::thread::spawn(move || {
                let window = Window::new(&factory, format!("worker {index}"), Rectangle::sized(64, 64));
                window.activate().unwrap();
                if index % 2 == 0 {
                    window.release().unwrap();
                }
                window
            })
        })
        .collect();

    let windows: Vec<_> = workers.into_iter().map(|worker| worker.join().unwrap()).collect();
    assert_eq!(factory.get_handle().unwrap().tracked_count(), 4);

    factory.destroy_handle().unwrap();
    assert!(windows.iter().all(|window| !window.is_created()));
}

#[test]
fn test_configured_session() {
    logging::init_for_tests();
    let source = r#"
        backend = "headless"
        subsystems = "VIDEO | AUDIO"

        [logging]
        level = "debug"

        [window]
        title = "Configured"
        options = "HIDDEN"

        [window.geometry]
        x = 10
        y = 20
        width = 300
        height = 200
    "#;
    let config = HandleConfig::from_str_as(source, ConfigFormat::Toml).unwrap();
    config.validate().unwrap();

    let factory = HandleFactory::new(config).into_shared();
    let handle = factory.create_default_handle().unwrap();
    assert_eq!(handle.active_subsystems(), Subsystems::VIDEO | Subsystems::AUDIO);

    let window = Window::from_config(&factory, &factory.config().window);
    window.activate().unwrap();
    assert_eq!(window.title(), "Configured");
    assert_eq!(window.geometry(), Rectangle::new(10, 20, 300, 200));
    assert_eq!(window.options(), WindowOptions::HIDDEN);
    assert!(handle.is_tracked(window.id()));
}

#[test]
fn test_resource_releasing_its_window_during_teardown() {
    let factory = session();
    let pairs: Vec<_> = (0..16)
        .map(|index| {
            let window = Window::new(&factory, format!("surface {index}"), Rectangle::sized(64, 64));
            let chain = SwapChain::new(&window, &factory);
            window.activate().unwrap();
            chain.activate().unwrap();
            (window, chain)
        })
        .collect();
    assert_eq!(factory.get_handle().unwrap().tracked_count(), 32);

    factory.destroy_handle().unwrap();

    for (window, chain) in &pairs {
        assert!(!window.is_created());
        assert!(!chain.created.load(Ordering::SeqCst));
    }
    assert!(!factory.has_handle());
}

#[test]
fn test_destroy_during_manual_shutdown_keeps_handle() {
    let factory = session();
    let impatient = Impatient::new(&factory);
    let window = Window::new(&factory, "bystander", Rectangle::sized(10, 10));
    impatient.activate().unwrap();
    window.activate().unwrap();

    let handle = factory.get_handle().unwrap();
    handle.shutdown().unwrap();

    let outcome = impatient.outcome.lock().unwrap().take().unwrap();
    assert_eq!(outcome.unwrap_err().kind(), ErrorKind::NotInitialized);
    assert!(!window.is_created());
    assert!(factory.has_handle());

    factory.destroy_handle().unwrap();
    assert!(!factory.has_handle());
}
