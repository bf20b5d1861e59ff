pub mod gamepad;
pub mod gamepad_controller;

pub use gamepad::{GamepadControl, GamepadState};
pub use gamepad_controller::GamepadController;
