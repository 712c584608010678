//! Debug overlay subsystem
//!
//! An auxiliary on-screen panel in its own window with its own GL context.
//! Calling code declaratively registers controls (float sliders, text fields,
//! buttons) bound to shared storage; each `draw()` renders and processes input
//! for all registered controls, context-switching into the overlay's surface
//! and back so the host application's rendering context is never disturbed.
//!
//! The overlay is a diagnostic aid, never essential: init failures leave it
//! inert, draw failures are logged and skipped, and nothing here propagates an
//! error into the host's main loop.

mod backend;
mod context;
mod widgets;

pub use widgets::{SharedText, SharedValue, WidgetId};

use backend::OverlayBackend;
use context::{ContextScope, GlfwContextProvider};
use thiserror::Error;
use widgets::{ButtonWidget, LabelRegistry, SliderWidget, TextFieldWidget};

/// Overlay errors
#[derive(Error, Debug)]
pub enum OverlayError {
    /// Windowing subsystem failed to initialize
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// Auxiliary window creation returned no handle
    #[error("Overlay window creation failed")]
    WindowCreationFailed,

    /// UI renderer setup or frame submission failed
    #[error("Overlay renderer error: {0}")]
    Renderer(String),

    /// `init()` was called on an already-initialized overlay; there is no
    /// re-init path
    #[error("Overlay already initialized")]
    AlreadyInitialized,
}

/// Result type for overlay operations
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Diagnostic control panel rendered in an auxiliary window
///
/// Widgets may be registered before or after [`init`](Self::init); rendering
/// starts once init succeeds. Render order is registration order, grouped by
/// kind: sliders, then text fields, then buttons.
pub struct DebugOverlay {
    sliders: Vec<SliderWidget>,
    text_fields: Vec<TextFieldWidget>,
    buttons: Vec<ButtonWidget>,
    labels: LabelRegistry,
    next_id: u64,
    backend: Option<OverlayBackend>,
}

impl DebugOverlay {
    /// Create an uninitialized overlay; no window exists yet
    pub fn new() -> Self {
        Self {
            sliders: Vec::new(),
            text_fields: Vec::new(),
            buttons: Vec::new(),
            labels: LabelRegistry::default(),
            next_id: 0,
            backend: None,
        }
    }

    /// Stand up the auxiliary window and its rendering context
    ///
    /// Whatever context was current on the calling thread is restored before
    /// this returns, success or failure, so the host never sees an implicit
    /// context switch. On failure the overlay stays uninitialized and later
    /// [`draw`](Self::draw) calls are ignored.
    pub fn init(&mut self) -> OverlayResult<()> {
        if self.backend.is_some() {
            return Err(OverlayError::AlreadyInitialized);
        }

        let mut provider = GlfwContextProvider;
        let backend = {
            let _restore = ContextScope::save(&mut provider);
            OverlayBackend::new()?
        };

        self.backend = Some(backend);
        log::info!("Debug overlay initialized");
        Ok(())
    }

    /// Whether `init()` has succeeded
    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    /// Register a float slider bound to shared storage, clamped to
    /// `[lower_bound, upper_bound]` for display
    pub fn add_slider(
        &mut self,
        label: &str,
        value: SharedValue,
        lower_bound: f32,
        upper_bound: f32,
    ) -> WidgetId {
        let label = self.labels.register(label);
        self.sliders.push(SliderWidget {
            label,
            value,
            lower_bound,
            upper_bound,
        });
        self.allocate_id()
    }

    /// Register a text field editing shared storage in place, trimmed to
    /// `capacity` bytes after each edit
    pub fn add_text_field(
        &mut self,
        label: &str,
        buffer: SharedText,
        capacity: usize,
    ) -> WidgetId {
        let label = self.labels.register(label);
        self.text_fields.push(TextFieldWidget {
            label,
            buffer,
            capacity,
        });
        self.allocate_id()
    }

    /// Register a button whose callback fires synchronously inside `draw()`
    /// the frame a click is reported
    pub fn add_button(&mut self, label: &str, callback: impl FnMut() + 'static) -> WidgetId {
        let label = self.labels.register(label);
        self.buttons.push(ButtonWidget {
            label,
            callback: Box::new(callback),
        });
        self.allocate_id()
    }

    /// Render and process input for all registered controls
    ///
    /// No-op with a diagnostic when not initialized. Otherwise runs the frame
    /// with the overlay context current and restores the previously-current
    /// context afterwards, even when a frame step fails.
    pub fn draw(&mut self) {
        let Some(backend) = self.backend.as_mut() else {
            log::debug!("DebugOverlay::draw() called but overlay is not initialized");
            return;
        };

        let mut provider = GlfwContextProvider;
        let _scope = ContextScope::enter(&mut provider, backend.context_handle());
        if let Err(e) = backend.draw_frame(
            &mut self.sliders,
            &mut self.text_fields,
            &mut self.buttons,
        ) {
            log::warn!("Debug overlay frame skipped: {e}");
        }
        // _scope re-binds the saved context on drop
    }

    fn allocate_id(&mut self) -> WidgetId {
        let id = WidgetId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for DebugOverlay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    #[test]
    fn test_draw_before_init_is_inert() {
        let mut overlay = DebugOverlay::new();

        let value = Rc::new(Cell::new(1.5_f32));
        let text = Rc::new(RefCell::new(String::from("abc")));
        let clicks = Rc::new(Cell::new(0_u32));

        overlay.add_slider("speed", Rc::clone(&value), 0.0, 10.0);
        overlay.add_text_field("callsign", Rc::clone(&text), 16);
        overlay.add_button("fire", {
            let clicks = Rc::clone(&clicks);
            move || clicks.set(clicks.get() + 1)
        });

        overlay.draw();

        assert!(!overlay.is_initialized());
        assert_eq!(value.get(), 1.5);
        assert_eq!(*text.borrow(), "abc");
        assert_eq!(clicks.get(), 0);
    }

    #[test]
    fn test_registration_is_legal_before_init() {
        let mut overlay = DebugOverlay::new();

        let a = overlay.add_slider("a", Rc::new(Cell::new(0.0)), 0.0, 1.0);
        let b = overlay.add_text_field("b", Rc::new(RefCell::new(String::new())), 8);
        let c = overlay.add_button("c", || {});

        assert_ne!(a, b);
        assert_ne!(b, c);
        assert!(!overlay.is_initialized());
    }

    #[test]
    fn test_colliding_labels_render_in_registration_order() {
        let mut overlay = DebugOverlay::new();

        overlay.add_slider("speed", Rc::new(Cell::new(0.0)), 0.0, 1.0);
        overlay.add_slider("speed", Rc::new(Cell::new(0.0)), 0.0, 1.0);
        overlay.add_slider("speed", Rc::new(Cell::new(0.0)), 0.0, 1.0);

        let labels: Vec<&str> = overlay.sliders.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["speed", "speed (1)", "speed (2)"]);
    }

    #[test]
    fn test_labels_deconflict_across_widget_kinds() {
        let mut overlay = DebugOverlay::new();

        overlay.add_slider("power", Rc::new(Cell::new(0.0)), 0.0, 1.0);
        overlay.add_button("power", || {});

        assert_eq!(overlay.sliders[0].label, "power");
        assert_eq!(overlay.buttons[0].label, "power (1)");
    }
}
