//! Lumen3D demo - a flat-shaded cube and a keyboard-driven camera
//!
//! Controls: WASD to move, Q/E down/up, arrow keys to look around.
//! Build with `--features vulkan-validation` to route validation layer
//! messages into the engine log.

mod winit_surface;

use std::error::Error;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use lumen_3d_engine::engine_error;
use lumen_3d_engine::engine_info;
use lumen_3d_engine::lumen3d::frame::{DrawSystem, FrameController, FrameInfo, SurfaceProvider};
use lumen_3d_engine::lumen3d::scene::{Camera, KeyboardMovementController, ObjectRegistry, Transform};
use lumen_3d_engine::lumen3d::RendererConfig;
use lumen_3d_engine_renderer_vulkan::{Model, SimpleRenderSystem, Vertex, VulkanGraphicsDevice};

use winit_surface::{WinitSurface, DEFAULT_KEY_MAPPINGS};

/// Longest frame time fed to movement, in seconds
const MAX_FRAME_TIME: f32 = 0.2;

fn main() {
    if let Err(e) = run() {
        engine_error!("lumen3d::demo", "Fatal: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = RendererConfig::default().with_app_name("Lumen3D Demo");

    let mut surface = WinitSurface::new("Lumen3D", 800, 600)?;
    let Some(window) = surface.window() else {
        return Ok(());
    };
    let device = Arc::new(VulkanGraphicsDevice::new(window, &config)?);

    let mut frames = match FrameController::new(Arc::clone(&device), &mut surface, &config) {
        // Closed while still minimized
        Err(_) if surface.should_close() => return Ok(()),
        result => result?,
    };
    // Rebuilt chains keep their formats, so the pipeline stays compatible
    let mut render_system = SimpleRenderSystem::new(&device, frames.current_render_pass())?;

    let mut objects = ObjectRegistry::new();
    let cube = objects.spawn();
    cube.model = Some(Arc::new(Model::new(&device, &cube_vertices(Vec3::ZERO))?));
    cube.color = Vec3::new(0.1, 0.8, 0.1);
    cube.transform.translation = Vec3::new(0.0, 0.0, 2.5);
    cube.transform.scale = Vec3::splat(0.5);

    let mut camera = Camera::new();
    let mut viewer = Transform::default();
    let controller = KeyboardMovementController::default();

    engine_info!("lumen3d::demo", "Entering main loop");
    let mut current_time = Instant::now();

    while !surface.should_close() {
        surface.poll_events();

        let new_time = Instant::now();
        let frame_time = (new_time - current_time).as_secs_f32().min(MAX_FRAME_TIME);
        current_time = new_time;

        let input = surface.movement_input(&DEFAULT_KEY_MAPPINGS);
        controller.move_in_plane_xz(&input, frame_time, &mut viewer);
        camera.set_view_yxz(viewer.translation, viewer.rotation);
        camera.set_perspective_projection(55f32.to_radians(), frames.aspect_ratio(), 0.1, 20.0);

        if let Some(command_buffer) = frames.begin_frame(&mut surface)? {
            frames.begin_render_pass(command_buffer);
            render_system.render(&FrameInfo {
                frame_index: frames.frame_index(),
                frame_time,
                command_buffer,
                camera: &camera,
                objects: &objects,
            })?;
            frames.end_render_pass(command_buffer);
            frames.end_frame(&mut surface)?;
        }
    }

    engine_info!("lumen3d::demo", "Shutting down after {} chain rebuilds", frames.recreation_count());

    #[cfg(feature = "vulkan-validation")]
    lumen_3d_engine_renderer_vulkan::print_validation_stats_report();

    Ok(())
}

/// Unit cube centered on `offset`
///
/// Vertex colors are carried through the pipeline; the object color pushed
/// per draw is what ends up on screen.
fn cube_vertices(offset: Vec3) -> Vec<Vertex> {
    // Four corners per face, drawn as (a, b, c) and (a, d, b)
    let faces: [[[f32; 3]; 4]; 6] = [
        // left (x = -0.5)
        [[-0.5, -0.5, -0.5], [-0.5, 0.5, 0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, -0.5]],
        // right (x = 0.5)
        [[0.5, -0.5, -0.5], [0.5, 0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, -0.5]],
        // top (y = -0.5, Y points down)
        [[-0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5], [0.5, -0.5, -0.5]],
        // bottom (y = 0.5)
        [[-0.5, 0.5, -0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5], [0.5, 0.5, -0.5]],
        // nose (z = 0.5)
        [[-0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5], [0.5, -0.5, 0.5]],
        // tail (z = -0.5)
        [[-0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, -0.5, -0.5]],
    ];

    faces
        .iter()
        .flat_map(|&[a, b, c, d]| {
            [a, b, c, a, d, b].map(|corner| Vertex::new(Vec3::from_array(corner) + offset, Vec3::ONE))
        })
        .collect()
}
