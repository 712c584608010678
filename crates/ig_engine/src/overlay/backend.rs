//! Auxiliary window backend
//!
//! Owns the overlay's GLFW window with its own GL 3.3 context, the Dear ImGui
//! context, and the glow renderer. All calls here assume the overlay context
//! is current; the manager brackets them in a `ContextScope`.

use std::time::Instant;

use glfw::Context as _;
use imgui_glow_renderer::AutoRenderer;

use super::context::ContextHandle;
use super::widgets::{clamp_to_capacity, ButtonWidget, SliderWidget, TextFieldWidget};
use super::{OverlayError, OverlayResult};

const OVERLAY_WIDTH: u32 = 600;
const OVERLAY_HEIGHT: u32 = 900;
const OVERLAY_TITLE: &str = "Debug Window";

pub(crate) struct OverlayBackend {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    imgui: imgui::Context,
    renderer: AutoRenderer,
    last_frame: Instant,
}

impl OverlayBackend {
    /// Create the auxiliary window and UI stack
    ///
    /// Leaves the overlay context current on return; the caller is
    /// responsible for restoring whatever was current before.
    pub(crate) fn new() -> OverlayResult<Self> {
        let mut glfw =
            glfw::init(glfw::fail_on_errors).map_err(|_| OverlayError::InitializationFailed)?;

        glfw.window_hint(glfw::WindowHint::ContextVersion(3, 3));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(
            glfw::OpenGlProfileHint::Core,
        ));

        let (mut window, events) = glfw
            .create_window(
                OVERLAY_WIDTH,
                OVERLAY_HEIGHT,
                OVERLAY_TITLE,
                glfw::WindowMode::Windowed,
            )
            .ok_or(OverlayError::WindowCreationFailed)?;

        window.set_char_polling(true);
        window.set_key_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_mouse_button_polling(true);
        window.set_scroll_polling(true);

        window.make_current();
        glfw.set_swap_interval(glfw::SwapInterval::Sync(1));

        let mut imgui = imgui::Context::create();
        imgui.set_ini_filename(None::<std::path::PathBuf>);
        imgui.io_mut().config_flags |= imgui::ConfigFlags::NAV_ENABLE_KEYBOARD;
        imgui.style_mut().use_dark_colors();

        let gl = unsafe {
            glow::Context::from_loader_function(|s| window.get_proc_address(s) as *const _)
        };
        let renderer = AutoRenderer::initialize(gl, &mut imgui)
            .map_err(|e| OverlayError::Renderer(e.to_string()))?;

        Ok(Self {
            glfw,
            window,
            events,
            imgui,
            renderer,
            last_frame: Instant::now(),
        })
    }

    /// The overlay context handle, for the manager's scope bracket
    pub(crate) fn context_handle(&self) -> ContextHandle {
        ContextHandle(self.window.window_ptr() as usize)
    }

    /// Pump input, lay out the fixed panel, render, and present one frame
    ///
    /// Widgets render grouped by kind in registration order: sliders, then
    /// text fields, then buttons. Button callbacks fire synchronously here,
    /// inside the frame.
    pub(crate) fn draw_frame(
        &mut self,
        sliders: &mut [SliderWidget],
        text_fields: &mut [TextFieldWidget],
        buttons: &mut [ButtonWidget],
    ) -> OverlayResult<()> {
        self.glfw.poll_events();

        let now = Instant::now();
        let io = self.imgui.io_mut();
        io.update_delta_time(now - self.last_frame);
        self.last_frame = now;

        let (width, height) = self.window.get_size();
        let (fb_width, fb_height) = self.window.get_framebuffer_size();
        io.display_size = [width as f32, height as f32];
        if width > 0 && height > 0 {
            io.display_framebuffer_scale = [
                fb_width as f32 / width as f32,
                fb_height as f32 / height as f32,
            ];
        }

        for (_, event) in glfw::flush_messages(&self.events) {
            forward_event(io, &event);
        }

        let ui = self.imgui.new_frame();
        ui.window("Debug Panel")
            .position([0.0, 0.0], imgui::Condition::Always)
            .size([width as f32, height as f32], imgui::Condition::Always)
            .flags(
                imgui::WindowFlags::NO_TITLE_BAR
                    | imgui::WindowFlags::NO_MOVE
                    | imgui::WindowFlags::NO_RESIZE,
            )
            .build(|| {
                for slider in sliders.iter_mut() {
                    let mut value = slider.value.get();
                    if ui.slider(&slider.label, slider.lower_bound, slider.upper_bound, &mut value)
                    {
                        slider.value.set(value);
                    }
                }

                for field in text_fields.iter_mut() {
                    let mut buffer = field.buffer.borrow_mut();
                    if ui.input_text(&field.label, &mut buffer).build() {
                        clamp_to_capacity(&mut buffer, field.capacity);
                    }
                }

                for button in buttons.iter_mut() {
                    if ui.button(&button.label) {
                        (button.callback)();
                    }
                }
            });

        let draw_data = self.imgui.render();

        use glow::HasContext as _;
        unsafe {
            let gl = self.renderer.gl_context();
            gl.viewport(0, 0, fb_width, fb_height);
            gl.clear_color(0.45, 0.55, 0.60, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT);
        }
        self.renderer
            .render(draw_data)
            .map_err(|e| OverlayError::Renderer(e.to_string()))?;

        self.window.swap_buffers();
        Ok(())
    }
}

fn forward_event(io: &mut imgui::Io, event: &glfw::WindowEvent) {
    match *event {
        glfw::WindowEvent::CursorPos(x, y) => {
            io.add_mouse_pos_event([x as f32, y as f32]);
        }
        glfw::WindowEvent::MouseButton(button, action, _) => {
            if let Some(mapped) = map_mouse_button(button) {
                io.add_mouse_button_event(mapped, action != glfw::Action::Release);
            }
        }
        glfw::WindowEvent::Scroll(x, y) => {
            io.add_mouse_wheel_event([x as f32, y as f32]);
        }
        glfw::WindowEvent::Char(c) => {
            io.add_input_character(c);
        }
        glfw::WindowEvent::Key(key, _, action, _) => {
            if let Some(mapped) = map_key(key) {
                io.add_key_event(mapped, action != glfw::Action::Release);
            }
        }
        _ => {}
    }
}

fn map_mouse_button(button: glfw::MouseButton) -> Option<imgui::MouseButton> {
    match button {
        glfw::MouseButton::Button1 => Some(imgui::MouseButton::Left),
        glfw::MouseButton::Button2 => Some(imgui::MouseButton::Right),
        glfw::MouseButton::Button3 => Some(imgui::MouseButton::Middle),
        _ => None,
    }
}

/// Keys the text and navigation widgets care about; everything else reaches
/// imgui through the character stream
fn map_key(key: glfw::Key) -> Option<imgui::Key> {
    match key {
        glfw::Key::Backspace => Some(imgui::Key::Backspace),
        glfw::Key::Delete => Some(imgui::Key::Delete),
        glfw::Key::Enter => Some(imgui::Key::Enter),
        glfw::Key::Tab => Some(imgui::Key::Tab),
        glfw::Key::Left => Some(imgui::Key::LeftArrow),
        glfw::Key::Right => Some(imgui::Key::RightArrow),
        glfw::Key::Up => Some(imgui::Key::UpArrow),
        glfw::Key::Down => Some(imgui::Key::DownArrow),
        glfw::Key::Home => Some(imgui::Key::Home),
        glfw::Key::End => Some(imgui::Key::End),
        glfw::Key::Escape => Some(imgui::Key::Escape),
        glfw::Key::A => Some(imgui::Key::A),
        glfw::Key::C => Some(imgui::Key::C),
        glfw::Key::V => Some(imgui::Key::V),
        glfw::Key::X => Some(imgui::Key::X),
        glfw::Key::LeftControl | glfw::Key::RightControl => Some(imgui::Key::ModCtrl),
        glfw::Key::LeftShift | glfw::Key::RightShift => Some(imgui::Key::ModShift),
        glfw::Key::LeftAlt | glfw::Key::RightAlt => Some(imgui::Key::ModAlt),
        _ => None,
    }
}
