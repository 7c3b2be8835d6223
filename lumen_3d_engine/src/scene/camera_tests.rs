use glam::{Mat4, Vec3, Vec4};
use crate::scene::Transform;
use super::*;

fn project(m: &Mat4, p: Vec3) -> Vec3 {
    let clip = *m * Vec4::new(p.x, p.y, p.z, 1.0);
    clip.truncate() / clip.w
}

// ============================================================================
// Projection
// ============================================================================

#[test]
fn test_default_camera_is_identity() {
    let camera = Camera::new();
    assert_eq!(*camera.projection(), Mat4::IDENTITY);
    assert_eq!(*camera.view(), Mat4::IDENTITY);
    assert_eq!(camera.projection_view(), Mat4::IDENTITY);
}

#[test]
fn test_perspective_maps_near_and_far_to_unit_depth() {
    let mut camera = Camera::new();
    camera.set_perspective_projection(55f32.to_radians(), 800.0 / 600.0, 0.1, 20.0);

    let near = project(camera.projection(), Vec3::new(0.0, 0.0, 0.1));
    let far = project(camera.projection(), Vec3::new(0.0, 0.0, 20.0));
    assert!((near.z - 0.0).abs() < 1e-5);
    assert!((far.z - 1.0).abs() < 1e-5);
}

#[test]
fn test_perspective_edges_of_fov_map_to_clip_bounds() {
    let mut camera = Camera::new();
    let fov_y = 90f32.to_radians();
    camera.set_perspective_projection(fov_y, 2.0, 0.1, 10.0);

    // At depth 1 a 90 degree fov spans y in -1..1 and x in -2..2
    let corner = project(camera.projection(), Vec3::new(2.0, 1.0, 1.0));
    assert!((corner.x - 1.0).abs() < 1e-5);
    assert!((corner.y - 1.0).abs() < 1e-5);
}

#[test]
#[should_panic(expected = "aspect ratio")]
fn test_perspective_rejects_zero_aspect() {
    Camera::new().set_perspective_projection(1.0, 0.0, 0.1, 10.0);
}

#[test]
fn test_orthographic_maps_box_to_clip_volume() {
    let mut camera = Camera::new();
    camera.set_orthographic_projection(-2.0, 2.0, -1.0, 1.0, 0.0, 10.0);

    let min = project(camera.projection(), Vec3::new(-2.0, -1.0, 0.0));
    let max = project(camera.projection(), Vec3::new(2.0, 1.0, 10.0));
    assert!(min.abs_diff_eq(Vec3::new(-1.0, -1.0, 0.0), 1e-6));
    assert!(max.abs_diff_eq(Vec3::new(1.0, 1.0, 1.0), 1e-6));
}

// ============================================================================
// View
// ============================================================================

#[test]
fn test_view_direction_moves_position_to_origin() {
    let mut camera = Camera::new();
    let position = Vec3::new(1.0, -2.0, -3.0);
    camera.set_view_direction(position, Vec3::new(0.5, 0.0, 1.0), Vec3::new(0.0, -1.0, 0.0));

    let p = camera.view().transform_point3(position);
    assert!(p.abs_diff_eq(Vec3::ZERO, 1e-5));
}

#[test]
fn test_view_target_puts_target_on_forward_axis() {
    let mut camera = Camera::new();
    camera.set_view_target(Vec3::new(-1.0, -2.0, 2.0), Vec3::new(0.0, 0.0, 2.5), Vec3::new(0.0, -1.0, 0.0));

    let target = camera.view().transform_point3(Vec3::new(0.0, 0.0, 2.5));
    let distance = (Vec3::new(0.0, 0.0, 2.5) - Vec3::new(-1.0, -2.0, 2.0)).length();
    assert!(target.abs_diff_eq(Vec3::new(0.0, 0.0, distance), 1e-5));
}

#[test]
fn test_view_yxz_without_rotation_is_translation() {
    let mut camera = Camera::new();
    camera.set_view_yxz(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
    assert!(camera
        .view()
        .abs_diff_eq(Mat4::from_translation(Vec3::new(-1.0, -2.0, -3.0)), 1e-6));
}

#[test]
fn test_view_yxz_inverts_transform() {
    let viewer = Transform {
        translation: Vec3::new(0.5, -1.0, -2.5),
        rotation: Vec3::new(0.2, 0.9, 0.1),
        ..Default::default()
    };
    let mut camera = Camera::new();
    camera.set_view_yxz(viewer.translation, viewer.rotation);

    assert!(camera.view().abs_diff_eq(viewer.mat4().inverse(), 1e-5));
}

#[test]
fn test_projection_view_order() {
    let mut camera = Camera::new();
    camera.set_perspective_projection(1.0, 1.5, 0.1, 20.0);
    camera.set_view_yxz(Vec3::new(0.0, 0.0, -2.5), Vec3::ZERO);
    assert_eq!(camera.projection_view(), *camera.projection() * *camera.view());
}
