//! Tether demo application
//!
//! Brings the headless subsystem up, builds a small window tree, prints it and
//! tears everything down again through the factory.
//!
//! Usage: `tether_demo [config.toml|config.ron]`

use std::sync::Arc;

use tether::prelude::*;

fn load_config() -> Result<HandleConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            let config = HandleConfig::load_from_file(&path)?;
            config.validate()?;
            Ok(config)
        }
        None => Ok(HandleConfig::default()),
    }
}

fn print_tree(window: &Arc<Window>, depth: usize) {
    let geometry = window.geometry();
    println!(
        "{:indent$}{} '{}' {}x{} at ({}, {}) created={}",
        "",
        window.id(),
        window.title(),
        geometry.width,
        geometry.height,
        geometry.x,
        geometry.y,
        window.is_created(),
        indent = depth * 2
    );
    for child in window.children() {
        print_tree(&child, depth + 1);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    config.logging.apply()?;

    log::info!("Starting tether demo with backend '{}'", config.backend);
    let factory = HandleFactory::new(config).into_shared();
    let handle = factory.create_default_handle()?;
    log::info!("Active subsystems: {:?}", handle.active_subsystems());

    let main_window = Window::from_config(&factory, &factory.config().window);
    main_window.activate()?;

    let inspector = Window::new(&factory, "Inspector", Rectangle::new(0, 0, 320, 720));
    let console = Window::new(&factory, "Console", Rectangle::new(320, 520, 960, 200));
    for panel in [&inspector, &console] {
        panel.activate_option(WindowOptions::SHOWN | WindowOptions::INPUT_FOCUS);
        panel.activate()?;
        panel.link_to_parent(&main_window)?;
    }

    if let Err(error) = main_window.link_to_parent(&console) {
        log::warn!("Rejected link: {}", error);
    }

    console.release()?;
    print_tree(&main_window, 0);
    println!("{} resource(s) tracked", handle.tracked_count());

    factory.destroy_handle()?;
    println!("After teardown:");
    print_tree(&main_window, 0);

    Ok(())
}
