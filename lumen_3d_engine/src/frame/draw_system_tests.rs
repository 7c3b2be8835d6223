//! DrawSystem contract exercised through the frame protocol

use std::sync::Arc;
use glam::{Mat4, Vec3};

use crate::config::RendererConfig;
use crate::error::Result;
use crate::frame::{DrawSystem, FrameController, FrameInfo};
use crate::graphics_device::mock_graphics_device::*;
use crate::scene::{Camera, ObjectRegistry};

struct Mesh;

/// Records the transform it would push for each object
#[derive(Default)]
struct RecordingSystem {
    pushed: Vec<(MockCommandBuffer, Mat4, Vec3)>,
}

impl DrawSystem for RecordingSystem {
    type CommandBuffer = MockCommandBuffer;
    type Model = Mesh;

    fn render(&mut self, frame: &FrameInfo<'_, MockCommandBuffer, Mesh>) -> Result<()> {
        let projection_view = frame.camera.projection_view();
        for object in frame.objects.iter().filter(|o| o.model.is_some()) {
            self.pushed.push((
                frame.command_buffer,
                projection_view * object.transform.mat4(),
                object.color,
            ));
        }
        Ok(())
    }
}

#[test]
fn test_draw_system_records_inside_render_pass() {
    let (device, state) = MockGraphicsDevice::new();
    let mut surface = MockSurface::new(800, 600);
    let mut frames =
        FrameController::new(Arc::new(device), &mut surface, &RendererConfig::default()).unwrap();

    let mut objects: ObjectRegistry<Mesh> = ObjectRegistry::new();
    {
        let cube = objects.spawn();
        cube.model = Some(Arc::new(Mesh));
        cube.color = Vec3::new(0.1, 0.8, 0.1);
        cube.transform.translation = Vec3::new(0.0, 0.0, 2.5);
        cube.transform.scale = Vec3::splat(0.5);
    }
    objects.spawn();

    let mut camera = Camera::new();
    camera.set_perspective_projection(55f32.to_radians(), frames.aspect_ratio(), 0.1, 20.0);

    let mut system = RecordingSystem::default();

    let cb = frames.begin_frame(&mut surface).unwrap().unwrap();
    frames.begin_render_pass(cb);
    system
        .render(&FrameInfo {
            frame_index: frames.frame_index(),
            frame_time: 0.016,
            command_buffer: cb,
            camera: &camera,
            objects: &objects,
        })
        .unwrap();
    frames.end_render_pass(cb);
    frames.end_frame(&mut surface).unwrap();

    assert_eq!(system.pushed.len(), 1);
    let (pushed_cb, transform, color) = system.pushed[0];
    assert_eq!(pushed_cb, cb);
    assert_eq!(color, Vec3::new(0.1, 0.8, 0.1));

    let expected = *camera.projection()
        * Mat4::from_translation(Vec3::new(0.0, 0.0, 2.5))
        * Mat4::from_scale(Vec3::splat(0.5));
    assert!(transform.abs_diff_eq(expected, 1e-5));

    let state = state.lock().unwrap();
    assert_eq!(state.count_calls(|c| matches!(c, MockCall::BeginRenderPass { .. })), 1);
    assert_eq!(state.count_calls(|c| matches!(c, MockCall::EndRenderPass(_))), 1);
}
