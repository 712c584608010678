//! # OpenIG Engine
//!
//! Early-stage image generator skeleton with Vulkan rendering setup and a
//! standalone diagnostic overlay.
//!
//! ## Features
//!
//! - **Vulkan Bootstrap**: Instance creation, validation-layer auditing, and
//!   physical-device resolution against a presentation surface
//! - **Device Selection**: Queue-family capability mapping with a swappable
//!   suitability policy
//! - **Debug Overlay**: Declarative slider/text/button registry rendered in an
//!   auxiliary window with its own GL context
//! - **Configuration**: TOML-backed application configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ig_engine::config::AppConfig;
//! use ig_engine::render::window::Window;
//! use ig_engine::render::vulkan::VulkanContext;
//! use ig_engine::overlay::DebugOverlay;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::default();
//!     let mut window = Window::new(
//!         &config.window.title,
//!         config.window.width,
//!         config.window.height,
//!     )?;
//!     let _vulkan = VulkanContext::new(&mut window, &config.vulkan)?;
//!
//!     let mut overlay = DebugOverlay::new();
//!     if let Err(e) = overlay.init() {
//!         log::warn!("Debug overlay unavailable: {e}");
//!     }
//!
//!     while !window.should_close() {
//!         window.poll_events();
//!         overlay.draw();
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod overlay;
pub mod render;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{AppConfig, VulkanConfig, WindowConfig},
        overlay::{DebugOverlay, SharedText, SharedValue, WidgetId},
        render::vulkan::{
            DiscreteGpuPolicy, QueueFamilyCapabilities, SuitabilityPolicy, VulkanContext,
            VulkanError,
        },
        render::window::Window,
    };
}
