/// Frame module - frame protocol, window contract and draw system contract

pub mod surface;
pub mod frame_controller;
pub mod draw_system;

pub use surface::*;
pub use frame_controller::*;
pub use draw_system::*;
