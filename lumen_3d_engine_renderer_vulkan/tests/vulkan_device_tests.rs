//! Integration tests for VulkanGraphicsDevice and VulkanPresentationChain
//!
//! These tests drive the real frame loop against a hidden window.
//! All tests require a GPU and a display and are marked with #[ignore].
//!
//! Run with: cargo test --test vulkan_device_tests -- --ignored

use std::sync::Arc;

use glam::Vec3;
use lumen_3d_engine::lumen3d::frame::{DrawSystem, FrameController, FrameInfo, SurfaceProvider};
use lumen_3d_engine::lumen3d::render::{
    Extent2D, GraphicsDevice, ImageAcquisition, PresentMode, PresentationChain,
    MAX_FRAMES_IN_FLIGHT,
};
use lumen_3d_engine::lumen3d::scene::{Camera, ObjectRegistry};
use lumen_3d_engine::lumen3d::{Error, RendererConfig};
use lumen_3d_engine_renderer_vulkan::{Model, SimpleRenderSystem, Vertex, VulkanGraphicsDevice};
use serial_test::serial;
use winit::event_loop::EventLoop;
use winit::window::Window;

/// Hidden window exposed through the surface contract
struct TestSurface {
    window: Window,
    resized: bool,
}

impl SurfaceProvider for TestSurface {
    fn current_extent(&self) -> Extent2D {
        let size = self.window.inner_size();
        Extent2D::new(size.width, size.height)
    }

    fn should_close(&self) -> bool {
        false
    }

    fn poll_events(&mut self) {}

    fn wait_events(&mut self) {}

    fn was_resized(&self) -> bool {
        self.resized
    }

    fn clear_resized_flag(&mut self) {
        self.resized = false;
    }
}

/// Helper to create a hidden test window for Vulkan
#[allow(deprecated)]
fn create_test_surface() -> (TestSurface, EventLoop<()>) {
    let mut builder = EventLoop::builder();
    #[cfg(target_os = "linux")]
    winit::platform::x11::EventLoopBuilderExtX11::with_any_thread(&mut builder, true);
    let event_loop = builder.build().unwrap();

    let window_attrs = Window::default_attributes()
        .with_title("Vulkan GraphicsDevice Test")
        .with_inner_size(winit::dpi::PhysicalSize::new(800, 600))
        .with_visible(false); // Hidden window for tests
    let window = event_loop.create_window(window_attrs).unwrap();
    (TestSurface { window, resized: false }, event_loop)
}

fn triangle() -> [Vertex; 3] {
    [
        Vertex::new(Vec3::new(0.0, -0.5, 0.0), Vec3::X),
        Vertex::new(Vec3::new(0.5, 0.5, 0.0), Vec3::Y),
        Vertex::new(Vec3::new(-0.5, 0.5, 0.0), Vec3::Z),
    ]
}

// ============================================================================
// DEVICE AND CHAIN
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_create_device_and_chain() {
    let (surface, _event_loop) = create_test_surface();
    let device = VulkanGraphicsDevice::new(&surface.window, &RendererConfig::default()).unwrap();

    let chain = device
        .create_presentation_chain(surface.current_extent(), None)
        .unwrap();

    assert!(chain.image_count() >= 2);
    assert_eq!(chain.frames_in_flight(), MAX_FRAMES_IN_FLIGHT);
    assert!(!chain.extent().is_zero());
    assert!(chain.aspect_ratio() > 0.0);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_chain_reports_requested_or_fifo_present_mode() {
    let (surface, _event_loop) = create_test_surface();
    let config = RendererConfig::default().with_present_mode(PresentMode::Immediate);
    let device = VulkanGraphicsDevice::new(&surface.window, &config).unwrap();

    let chain = device
        .create_presentation_chain(surface.current_extent(), None)
        .unwrap();

    assert!(matches!(chain.present_mode(), PresentMode::Immediate | PresentMode::Fifo));
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_recreated_chain_keeps_format() {
    let (surface, _event_loop) = create_test_surface();
    let device = VulkanGraphicsDevice::new(&surface.window, &RendererConfig::default()).unwrap();

    let first = device
        .create_presentation_chain(surface.current_extent(), None)
        .unwrap();
    let second = device
        .create_presentation_chain(surface.current_extent(), Some(&first))
        .unwrap();

    assert!(first.compare_format(&second));
    drop(first);
    assert!(second.image_count() >= 2);
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_zero_extent_is_rejected() {
    let (surface, _event_loop) = create_test_surface();
    let device = VulkanGraphicsDevice::new(&surface.window, &RendererConfig::default()).unwrap();

    let result = device.create_presentation_chain(Extent2D::new(0, 0), None);
    assert!(matches!(result, Err(Error::SurfaceUnsupported(_))));
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_acquire_returns_valid_image_index() {
    let (surface, _event_loop) = create_test_surface();
    let device = VulkanGraphicsDevice::new(&surface.window, &RendererConfig::default()).unwrap();
    let mut chain = device
        .create_presentation_chain(surface.current_extent(), None)
        .unwrap();

    match chain.acquire_next_image(0).unwrap() {
        ImageAcquisition::Ready(index) | ImageAcquisition::Suboptimal(index) => {
            assert!((index as usize) < chain.image_count());
        }
        ImageAcquisition::OutOfDate => {}
    }
    device.wait_idle().unwrap();
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_command_buffer_allocation() {
    let (surface, _event_loop) = create_test_surface();
    let device = VulkanGraphicsDevice::new(&surface.window, &RendererConfig::default()).unwrap();

    let command_buffers = device.allocate_command_buffers(3).unwrap();
    assert_eq!(command_buffers.len(), 3);
    device.free_command_buffers(&command_buffers);
}

// ============================================================================
// FRAME LOOP
// ============================================================================

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_frame_loop_renders_and_cycles_slots() {
    let (mut surface, _event_loop) = create_test_surface();
    let config = RendererConfig::default();
    let device = Arc::new(VulkanGraphicsDevice::new(&surface.window, &config).unwrap());

    let mut frames = FrameController::new(Arc::clone(&device), &mut surface, &config).unwrap();
    let mut render_system = SimpleRenderSystem::new(&device, frames.current_render_pass()).unwrap();

    let model = Arc::new(Model::new(&device, &triangle()).unwrap());
    let mut objects = ObjectRegistry::new();
    let object = objects.spawn();
    object.model = Some(model);
    object.color = Vec3::new(0.1, 0.8, 0.1);
    object.transform.translation.z = 2.5;

    let mut camera = Camera::new();
    camera.set_perspective_projection(55f32.to_radians(), frames.aspect_ratio(), 0.1, 20.0);

    let mut slots = Vec::new();
    let mut rendered = 0;
    for _ in 0..8 {
        if let Some(command_buffer) = frames.begin_frame(&mut surface).unwrap() {
            slots.push(frames.frame_index());
            frames.begin_render_pass(command_buffer);
            render_system
                .render(&FrameInfo {
                    frame_index: frames.frame_index(),
                    frame_time: 0.016,
                    command_buffer,
                    camera: &camera,
                    objects: &objects,
                })
                .unwrap();
            frames.end_render_pass(command_buffer);
            frames.end_frame(&mut surface).unwrap();
            rendered += 1;
        }
    }

    assert!(rendered > 0);
    assert!(slots.iter().all(|&slot| slot < MAX_FRAMES_IN_FLIGHT));
    assert!(!frames.is_frame_in_progress());
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_frame_loop_with_finite_fence_timeout() {
    let (mut surface, _event_loop) = create_test_surface();
    let mut config = RendererConfig::default();
    config.acquire_timeout_ns = 5_000_000_000;
    let device = Arc::new(VulkanGraphicsDevice::new(&surface.window, &config).unwrap());
    let mut frames = FrameController::new(Arc::clone(&device), &mut surface, &config).unwrap();

    // More frames than slots, so images come back with a previous owner
    let mut rendered = 0;
    for _ in 0..(MAX_FRAMES_IN_FLIGHT * 4) {
        if let Some(command_buffer) = frames.begin_frame(&mut surface).unwrap() {
            frames.begin_render_pass(command_buffer);
            frames.end_render_pass(command_buffer);
            frames.end_frame(&mut surface).unwrap();
            rendered += 1;
        }
    }

    assert!(rendered > 0);
    device.wait_idle().unwrap();
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_resize_flag_rebuilds_chain() {
    let (mut surface, _event_loop) = create_test_surface();
    let config = RendererConfig::default();
    let device = Arc::new(VulkanGraphicsDevice::new(&surface.window, &config).unwrap());
    let mut frames = FrameController::new(Arc::clone(&device), &mut surface, &config).unwrap();

    let command_buffer = loop {
        if let Some(command_buffer) = frames.begin_frame(&mut surface).unwrap() {
            break command_buffer;
        }
    };
    frames.begin_render_pass(command_buffer);
    frames.end_render_pass(command_buffer);

    let before = frames.recreation_count();
    surface.resized = true;
    frames.end_frame(&mut surface).unwrap();

    assert_eq!(frames.recreation_count(), before + 1);
    assert!(!surface.was_resized());
}

#[test]
#[ignore] // Requires GPU
#[serial]
fn test_vulkan_model_rejects_degenerate_geometry() {
    let (surface, _event_loop) = create_test_surface();
    let device = VulkanGraphicsDevice::new(&surface.window, &RendererConfig::default()).unwrap();

    let result = Model::new(&device, &triangle()[..2]);
    assert!(matches!(result, Err(Error::InvalidResource(_))));
}
