/// Scene module - objects, transforms, camera and keyboard movement

pub mod transform;
pub mod object;
pub mod camera;
pub mod movement;

pub use transform::*;
pub use object::*;
pub use camera::*;
pub use movement::*;
