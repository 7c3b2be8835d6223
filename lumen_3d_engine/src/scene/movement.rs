/// Keyboard-driven fly movement in the XZ plane
///
/// Platform neutral: the caller resolves its key mappings to a
/// `MovementInput` with `KeyMappings::read` and passes that in.

use std::f32::consts::TAU;
use glam::Vec3;
use super::Transform;

/// Pitch limit in radians (about 85 degrees)
pub const PITCH_LIMIT: f32 = 1.5;

/// Key bindings for each movement action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMappings<K> {
    pub move_left: K,
    pub move_right: K,
    pub move_forward: K,
    pub move_backward: K,
    pub move_up: K,
    pub move_down: K,
    pub look_left: K,
    pub look_right: K,
    pub look_up: K,
    pub look_down: K,
}

impl<K: Copy> KeyMappings<K> {
    /// Sample every bound key
    ///
    /// # Arguments
    ///
    /// * `is_pressed` - Returns true while the given key is held
    pub fn read(&self, is_pressed: impl Fn(K) -> bool) -> MovementInput {
        MovementInput {
            move_left: is_pressed(self.move_left),
            move_right: is_pressed(self.move_right),
            move_forward: is_pressed(self.move_forward),
            move_backward: is_pressed(self.move_backward),
            move_up: is_pressed(self.move_up),
            move_down: is_pressed(self.move_down),
            look_left: is_pressed(self.look_left),
            look_right: is_pressed(self.look_right),
            look_up: is_pressed(self.look_up),
            look_down: is_pressed(self.look_down),
        }
    }
}

/// Held state of each movement action for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementInput {
    pub move_left: bool,
    pub move_right: bool,
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_up: bool,
    pub move_down: bool,
    pub look_left: bool,
    pub look_right: bool,
    pub look_up: bool,
    pub look_down: bool,
}

/// Moves and turns a transform from keyboard input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardMovementController {
    /// Units per second
    pub move_speed: f32,
    /// Radians per second
    pub look_speed: f32,
}

impl Default for KeyboardMovementController {
    fn default() -> Self {
        Self {
            move_speed: 3.0,
            look_speed: 2.0,
        }
    }
}

impl KeyboardMovementController {
    /// Apply one frame of input to `transform`
    ///
    /// Look input turns the transform (pitch clamped to `PITCH_LIMIT`, yaw
    /// wrapped to `[0, 2π)`), move input translates it relative to the yaw.
    /// Y points down.
    pub fn move_in_plane_xz(&self, input: &MovementInput, dt: f32, transform: &mut Transform) {
        let mut rotate = Vec3::ZERO;
        if input.look_right {
            rotate.y += 1.0;
        }
        if input.look_left {
            rotate.y -= 1.0;
        }
        if input.look_up {
            rotate.x += 1.0;
        }
        if input.look_down {
            rotate.x -= 1.0;
        }

        if rotate.length_squared() > f32::EPSILON {
            transform.rotation += self.look_speed * dt * rotate.normalize();
        }

        transform.rotation.x = transform.rotation.x.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        transform.rotation.y = transform.rotation.y.rem_euclid(TAU);

        let yaw = transform.rotation.y;
        let forward = Vec3::new(yaw.sin(), 0.0, yaw.cos());
        let right = Vec3::new(forward.z, 0.0, -forward.x);
        let up = Vec3::new(0.0, -1.0, 0.0);

        let mut direction = Vec3::ZERO;
        if input.move_forward {
            direction += forward;
        }
        if input.move_backward {
            direction -= forward;
        }
        if input.move_right {
            direction += right;
        }
        if input.move_left {
            direction -= right;
        }
        if input.move_up {
            direction += up;
        }
        if input.move_down {
            direction -= up;
        }

        if direction.length_squared() > f32::EPSILON {
            transform.translation += self.move_speed * dt * direction.normalize();
        }
    }
}

#[cfg(test)]
#[path = "movement_tests.rs"]
mod tests;
