/// Object transform with Tait-Bryan Y-X-Z rotation

use glam::{Mat3, Mat4, Vec3, Vec4};

/// Translation, per-axis scale and Euler rotation (radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub scale: Vec3,
    /// Rotation around X (pitch), Y (yaw) and Z (roll)
    pub rotation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
        }
    }
}

impl Transform {
    /// Model matrix `T * Ry * Rx * Rz * S`
    pub fn mat4(&self) -> Mat4 {
        let [u, v, w] = self.rotation_axes();
        Mat4::from_cols(
            (u * self.scale.x).extend(0.0),
            (v * self.scale.y).extend(0.0),
            (w * self.scale.z).extend(0.0),
            Vec4::new(self.translation.x, self.translation.y, self.translation.z, 1.0),
        )
    }

    /// Inverse-transpose of the upper 3x3 of `mat4()`
    pub fn normal_matrix(&self) -> Mat3 {
        let [u, v, w] = self.rotation_axes();
        let inverse_scale = Vec3::ONE / self.scale;
        Mat3::from_cols(u * inverse_scale.x, v * inverse_scale.y, w * inverse_scale.z)
    }

    /// Columns of `Ry * Rx * Rz`
    fn rotation_axes(&self) -> [Vec3; 3] {
        let (s3, c3) = self.rotation.z.sin_cos();
        let (s2, c2) = self.rotation.x.sin_cos();
        let (s1, c1) = self.rotation.y.sin_cos();
        [
            Vec3::new(c1 * c3 + s1 * s2 * s3, c2 * s3, c1 * s2 * s3 - c3 * s1),
            Vec3::new(c3 * s1 * s2 - c1 * s3, c2 * c3, c1 * c3 * s2 + s1 * s3),
            Vec3::new(c2 * s1, -s2, c1 * c2),
        ]
    }
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
