//! Poll-driven winit window exposed through `SurfaceProvider`

use std::error::Error;
use std::time::Duration;

use lumen_3d_engine::{engine_error, engine_info};
use lumen_3d_engine::lumen3d::frame::SurfaceProvider;
use lumen_3d_engine::lumen3d::render::Extent2D;
use lumen_3d_engine::lumen3d::scene::{KeyMappings, MovementInput};
use rustc_hash::FxHashSet;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

/// WASD + QE movement, arrow keys to look around
pub const DEFAULT_KEY_MAPPINGS: KeyMappings<KeyCode> = KeyMappings {
    move_left: KeyCode::KeyA,
    move_right: KeyCode::KeyD,
    move_forward: KeyCode::KeyW,
    move_backward: KeyCode::KeyS,
    move_up: KeyCode::KeyE,
    move_down: KeyCode::KeyQ,
    look_left: KeyCode::ArrowLeft,
    look_right: KeyCode::ArrowRight,
    look_up: KeyCode::ArrowUp,
    look_down: KeyCode::ArrowDown,
};

/// Window state updated by winit callbacks
struct WindowState {
    title: String,
    size: PhysicalSize<u32>,
    window: Option<Window>,
    window_error: Option<String>,
    resized: bool,
    close_requested: bool,
    pressed_keys: FxHashSet<KeyCode>,
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(self.size);
        match event_loop.create_window(attributes) {
            Ok(window) => self.window = Some(window),
            Err(e) => {
                self.window_error = Some(e.to_string());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                engine_info!("lumen3d::demo", "Close requested, shutting down");
                self.close_requested = true;
                event_loop.exit();
            }
            WindowEvent::Resized(_) => {
                self.resized = true;
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    if event.state.is_pressed() {
                        self.pressed_keys.insert(key);
                    } else {
                        self.pressed_keys.remove(&key);
                    }
                }
            }
            WindowEvent::Focused(false) => {
                self.pressed_keys.clear();
            }
            _ => {}
        }
    }
}

/// Owns the event loop and the single demo window
pub struct WinitSurface {
    event_loop: EventLoop<()>,
    state: WindowState,
}

impl WinitSurface {
    /// Create the event loop and pump it until the window exists
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, Box<dyn Error>> {
        let event_loop = EventLoop::new()?;
        let mut surface = Self {
            event_loop,
            state: WindowState {
                title: title.to_string(),
                size: PhysicalSize::new(width, height),
                window: None,
                window_error: None,
                resized: false,
                close_requested: false,
                pressed_keys: FxHashSet::default(),
            },
        };

        while surface.state.window.is_none() && !surface.state.close_requested {
            surface.pump(Some(Duration::ZERO));
            if let Some(error) = surface.state.window_error.take() {
                engine_error!("lumen3d::demo", "Window creation failed: {}", error);
                return Err(error.into());
            }
        }
        Ok(surface)
    }

    /// The demo window, `None` only if the user closed it during startup
    pub fn window(&self) -> Option<&Window> {
        self.state.window.as_ref()
    }

    /// Held movement keys resolved through `mappings`
    pub fn movement_input(&self, mappings: &KeyMappings<KeyCode>) -> MovementInput {
        mappings.read(|key| self.state.pressed_keys.contains(&key))
    }

    fn pump(&mut self, timeout: Option<Duration>) {
        if let PumpStatus::Exit(_) = self.event_loop.pump_app_events(timeout, &mut self.state) {
            self.state.close_requested = true;
        }
    }
}

impl SurfaceProvider for WinitSurface {
    fn current_extent(&self) -> Extent2D {
        self.state
            .window
            .as_ref()
            .map(|window| {
                let size = window.inner_size();
                Extent2D::new(size.width, size.height)
            })
            .unwrap_or_default()
    }

    fn should_close(&self) -> bool {
        self.state.close_requested
    }

    fn poll_events(&mut self) {
        self.pump(Some(Duration::ZERO));
    }

    fn wait_events(&mut self) {
        self.pump(None);
    }

    fn was_resized(&self) -> bool {
        self.state.resized
    }

    fn clear_resized_flag(&mut self) {
        self.state.resized = false;
    }
}
