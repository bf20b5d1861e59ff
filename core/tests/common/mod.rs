#![allow(dead_code)]

use padport_core::core::{Component, PortDevice, Word};
use padport_core::device::gamepad::GamepadControl;
use padport_core::device::gamepad_controller::GamepadController;

/// Global address of the first input port.
pub const INPUT_PORT_BASE: u32 = 0x600;

/// Minimal bus for testing: one device mapped at a fixed port range,
/// every other address unanswered.
pub struct TestBus<D: PortDevice> {
    pub device: D,
    pub base: u32,
}

impl<D: PortDevice> TestBus<D> {
    pub fn new(device: D, base: u32) -> Self {
        Self { device, base }
    }

    fn local(&self, addr: u32) -> Option<u32> {
        addr.checked_sub(self.base)
            .filter(|&local| local < self.device.port_count())
    }

    pub fn read(&mut self, addr: u32) -> Option<Word> {
        let local = self.local(addr)?;
        self.device.read_port(local)
    }

    pub fn write(&mut self, addr: u32, value: Word) -> bool {
        match self.local(addr) {
            Some(local) => self.device.write_port(local, value),
            None => false,
        }
    }
}

impl<D: PortDevice + Component> TestBus<D> {
    pub fn end_frame(&mut self) {
        self.device.change_frame();
    }
}

/// Controller with `gamepad` plugged in.
pub fn connected_controller(gamepad: usize) -> GamepadController {
    let mut controller = GamepadController::new();
    controller.set_gamepad_connection(gamepad, true);
    controller
}

/// Read the selected gamepad's counter for `control` through the register
/// interface.
pub fn read_control(controller: &GamepadController, control: GamepadControl) -> i32 {
    controller
        .read_port(control.local_port())
        .expect("control ports are always decoded")
        .as_integer()
}

pub fn real_time(controller: &GamepadController, gamepad: usize, control: GamepadControl) -> i32 {
    controller.real_time_state(gamepad).unwrap().counter(control)
}

pub fn provided(controller: &GamepadController, gamepad: usize, control: GamepadControl) -> i32 {
    controller.provided_state(gamepad).unwrap().counter(control)
}
