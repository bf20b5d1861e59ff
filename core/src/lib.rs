pub mod core;
pub mod device;

pub mod prelude {
    pub use crate::core::{Component, PortDevice, Word};
    pub use crate::device::gamepad::{GamepadControl, GamepadState};
    pub use crate::device::gamepad_controller::{GamepadController, InputFault, StateError};
}
