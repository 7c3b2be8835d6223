use glam::{Mat3, Mat4, Vec3};
use super::*;

fn sample() -> Transform {
    Transform {
        translation: Vec3::new(1.0, -2.0, 2.5),
        scale: Vec3::new(0.5, 2.0, 1.5),
        rotation: Vec3::new(0.3, 1.1, -0.7),
    }
}

#[test]
fn test_default_is_identity() {
    let transform = Transform::default();
    assert_eq!(transform.mat4(), Mat4::IDENTITY);
    assert_eq!(transform.normal_matrix(), Mat3::IDENTITY);
}

#[test]
fn test_mat4_matches_yxz_composition() {
    let t = sample();
    let expected = Mat4::from_translation(t.translation)
        * Mat4::from_rotation_y(t.rotation.y)
        * Mat4::from_rotation_x(t.rotation.x)
        * Mat4::from_rotation_z(t.rotation.z)
        * Mat4::from_scale(t.scale);

    assert!(t.mat4().abs_diff_eq(expected, 1e-5));
}

#[test]
fn test_translation_only() {
    let t = Transform {
        translation: Vec3::new(0.0, 0.0, 2.5),
        ..Default::default()
    };
    let p = t.mat4().transform_point3(Vec3::new(1.0, 1.0, 1.0));
    assert!(p.abs_diff_eq(Vec3::new(1.0, 1.0, 3.5), 1e-6));
}

#[test]
fn test_normal_matrix_is_inverse_transpose() {
    let t = sample();
    let expected = Mat3::from_mat4(t.mat4()).inverse().transpose();
    assert!(t.normal_matrix().abs_diff_eq(expected, 1e-4));
}
