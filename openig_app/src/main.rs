//! OpenIG bootstrap
//!
//! Opens the host window, stands up Vulkan and resolves a rendering adapter,
//! attaches the diagnostic overlay, and runs the (still empty) main loop.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glfw::{Action, Key, WindowEvent};
use ig_engine::config::AppConfig;
use ig_engine::overlay::DebugOverlay;
use ig_engine::render::vulkan::VulkanContext;
use ig_engine::render::window::Window;

const CONFIG_PATH: &str = "openig.toml";

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("Startup failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_or_default(CONFIG_PATH)?;

    log::info!("Creating host window...");
    let mut window = Window::new(
        &config.window.title,
        config.window.width,
        config.window.height,
    )?;

    log::info!("Initializing Vulkan...");
    let vulkan = VulkanContext::new(&mut window, &config.vulkan)?;
    log::info!("Rendering on {}", vulkan.adapter_name());

    let mut overlay = DebugOverlay::new();
    let speed = Rc::new(Cell::new(1.0_f32));
    let callsign = Rc::new(RefCell::new(String::from("IG-01")));
    overlay.add_slider("speed", Rc::clone(&speed), 0.0, 10.0);
    overlay.add_text_field("callsign", Rc::clone(&callsign), 32);
    overlay.add_button("print state", {
        let speed = Rc::clone(&speed);
        let callsign = Rc::clone(&callsign);
        move || log::info!("speed={} callsign={}", speed.get(), callsign.borrow())
    });

    if let Err(e) = overlay.init() {
        // Diagnostic aid only; the application keeps running without it
        log::warn!("Debug overlay unavailable: {e}");
    }

    while !window.should_close() {
        window.poll_events();
        let events: Vec<_> = window.flush_events().collect();
        for (_, event) in events {
            if let WindowEvent::Key(Key::Escape, _, Action::Press, _) = event {
                window.set_should_close(true);
            }
        }

        overlay.draw();
    }

    Ok(())
}
