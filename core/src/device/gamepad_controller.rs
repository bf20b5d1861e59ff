//! Gamepad controller: the console's input chip.
//!
//! Two copies of every gamepad are kept. The real-time copy follows host
//! input events as they arrive; the provided copy is what the bus reads and
//! only changes at frame boundaries. A program therefore sees one stable
//! snapshot per frame no matter when, or how often, the host reports input.
//!
//! | Local port | Access     | Register                                   |
//! |------------|------------|--------------------------------------------|
//! | 0          | read/write | Selected gamepad (writes of 0..4 accepted) |
//! | 1-11       | read       | Counters of the selected gamepad, in       |
//! |            |            | [`GamepadControl::ALL`] order              |
//!
//! Invalid ports, gamepad indices and register values are silently ignored,
//! like unmapped addresses on real hardware. Ignored accesses are reported
//! through `tracing` at trace level only.

use tracing::{debug, trace};

use crate::core::{Component, PortDevice, Word};
use crate::device::gamepad::{CONTROL_COUNT, GamepadControl, GamepadState, MAX_FRAMES_IN_STATE};

/// Number of gamepad ports on the console.
pub const GAMEPAD_PORTS: usize = 4;

/// Local port of the selected-gamepad register.
pub const SELECTED_GAMEPAD_PORT: u32 = 0;

/// Highest decoded local port.
pub const LAST_PORT: u32 = CONTROL_COUNT as u32;

/// Accesses the controller decodes but refuses. Never returned to callers;
/// used to describe dropped accesses in trace output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InputFault {
    #[error("local port {0} is not decoded")]
    InvalidPort(u32),
    #[error("gamepad index {0} is out of range")]
    InvalidGamepadIndex(usize),
    #[error("selected gamepad value {0} is out of range")]
    InvalidSelectionValue(i32),
}

/// Errors from [`GamepadController::load_state`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("not a gamepad state snapshot")]
    BadMagic,
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u8),
    #[error("snapshot holds {found} gamepads, expected {expected}")]
    GamepadCountMismatch { expected: usize, found: usize },
    #[error("snapshot truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("snapshot has {0} trailing bytes")]
    TrailingBytes(usize),
    #[error("invalid connection flag {value} for gamepad {gamepad}")]
    InvalidConnectionFlag { gamepad: usize, value: u8 },
    #[error("selected gamepad {0} is out of range")]
    InvalidSelection(i32),
    #[error("gamepad {gamepad} {control} counter {value} is out of range")]
    CounterOutOfRange {
        gamepad: usize,
        control: GamepadControl,
        value: i32,
    },
    #[error("gamepad {gamepad} is disconnected but holds {control}")]
    DisconnectedControlHeld {
        gamepad: usize,
        control: GamepadControl,
    },
    #[error("gamepad {gamepad} holds both {control} and {opposite}")]
    OppositeDirectionsHeld {
        gamepad: usize,
        control: GamepadControl,
        opposite: GamepadControl,
    },
}

const STATE_MAGIC: &[u8; 4] = b"PADS";
const STATE_VERSION: u8 = 1;
const STATE_HEADER_LEN: usize = 4 + 1 + 1 + 4;
const STATE_GAMEPAD_LEN: usize = 1 + CONTROL_COUNT * 4;
const STATE_LEN: usize = STATE_HEADER_LEN + 2 * GAMEPAD_PORTS * STATE_GAMEPAD_LEN;

/// Input chip for up to four gamepads.
///
/// Host events update the real-time copy of each gamepad immediately; at
/// every frame boundary that copy is published as the provided copy, which
/// is the only one the bus can read. Each control keeps a signed counter of
/// frames spent in its current state: positive while pressed, negative while
/// released, saturating at [`MAX_FRAMES_IN_STATE`].
pub struct GamepadController {
    real_time: [GamepadState; GAMEPAD_PORTS],
    provided: [GamepadState; GAMEPAD_PORTS],
    selected: usize,
}

impl GamepadController {
    /// All gamepads disconnected and fully released, gamepad 0 selected.
    pub fn new() -> Self {
        let mut controller = Self {
            real_time: [GamepadState::new(); GAMEPAD_PORTS],
            provided: [GamepadState::new(); GAMEPAD_PORTS],
            selected: 0,
        };
        for port in 0..GAMEPAD_PORTS {
            controller.reset_gamepad(port);
            controller.real_time[port].connected = false;
        }
        controller.reset();
        controller
    }

    // -----------------------------------------------------------------------
    // Bus registers
    // -----------------------------------------------------------------------

    /// Read a local port. Port 0 returns the selected gamepad; ports 1-11
    /// return the selected gamepad's frame-stable counters.
    pub fn read_port(&self, local_port: u32) -> Option<Word> {
        if local_port > LAST_PORT {
            trace!(target: "padport_core::gamepad", fault = %InputFault::InvalidPort(local_port), "read ignored");
            return None;
        }

        if local_port == SELECTED_GAMEPAD_PORT {
            return Some(Word::from_integer(self.selected as i32));
        }

        let counter = self.provided[self.selected].counters[(local_port - 1) as usize];
        Some(Word::from_integer(counter))
    }

    /// Write a local port. Only the selected-gamepad register is writable;
    /// its write is always acknowledged, but a value outside `0..4` is
    /// dropped.
    pub fn write_port(&mut self, local_port: u32, value: Word) -> bool {
        if local_port != SELECTED_GAMEPAD_PORT {
            trace!(target: "padport_core::gamepad", fault = %InputFault::InvalidPort(local_port), "write ignored");
            return false;
        }

        let requested = value.as_integer();
        match usize::try_from(requested) {
            Ok(gamepad) if gamepad < GAMEPAD_PORTS => self.selected = gamepad,
            _ => {
                trace!(target: "padport_core::gamepad", fault = %InputFault::InvalidSelectionValue(requested), "write dropped");
            }
        }
        true
    }

    // -----------------------------------------------------------------------
    // Frame scheduler
    // -----------------------------------------------------------------------

    /// Publish this frame's final input to the bus, then age every counter
    /// by one frame.
    pub fn change_frame(&mut self) {
        self.provided = self.real_time;

        for state in &mut self.real_time {
            state.advance_frame();
        }
    }

    /// Console reset. Gamepads are physical devices, so their connection and
    /// press timing survive; only the selection register is cleared.
    pub fn reset(&mut self) {
        self.selected = 0;
    }

    // -----------------------------------------------------------------------
    // Host input events
    // -----------------------------------------------------------------------

    /// Release every control of `gamepad` for the maximum time and make the
    /// result visible on the bus immediately.
    pub fn reset_gamepad(&mut self, gamepad: usize) {
        let Some(state) = self.real_time.get_mut(gamepad) else {
            trace!(target: "padport_core::gamepad", fault = %InputFault::InvalidGamepadIndex(gamepad), "reset ignored");
            return;
        };

        state.release_all();
        self.provided[gamepad] = *state;
        debug!(target: "padport_core::gamepad", gamepad, "gamepad reset");
    }

    /// Report a gamepad being plugged in or unplugged. Unplugging releases
    /// every control.
    pub fn set_gamepad_connection(&mut self, gamepad: usize, connected: bool) {
        let Some(state) = self.real_time.get_mut(gamepad) else {
            trace!(target: "padport_core::gamepad", fault = %InputFault::InvalidGamepadIndex(gamepad), "connection event ignored");
            return;
        };

        state.connected = connected;
        debug!(target: "padport_core::gamepad", gamepad, connected, "gamepad connection changed");

        if !connected {
            self.reset_gamepad(gamepad);
        }
    }

    /// Report a control being pressed or released. Repeated reports of the
    /// current state are ignored so they cannot restart the duration count.
    /// Pressing a direction releases the opposite direction.
    pub fn set_gamepad_control(&mut self, gamepad: usize, control: GamepadControl, pressed: bool) {
        let Some(state) = self.real_time.get_mut(gamepad) else {
            trace!(target: "padport_core::gamepad", fault = %InputFault::InvalidGamepadIndex(gamepad), "control event ignored");
            return;
        };

        if !state.connected {
            return;
        }

        if !state.transition(control, pressed) || !pressed {
            return;
        }

        // Opposite directions can never be held together
        if let Some(opposite) = control.opposite()
            && state.is_pressed(opposite)
        {
            state.transition(opposite, false);
        }
    }

    // -----------------------------------------------------------------------
    // Host-side inspection
    // -----------------------------------------------------------------------

    pub fn selected_gamepad(&self) -> usize {
        self.selected
    }

    pub fn real_time_state(&self, gamepad: usize) -> Option<&GamepadState> {
        self.real_time.get(gamepad)
    }

    pub fn provided_state(&self, gamepad: usize) -> Option<&GamepadState> {
        self.provided.get(gamepad)
    }

    pub fn is_connected(&self, gamepad: usize) -> bool {
        self.real_time.get(gamepad).is_some_and(|s| s.connected)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Serialize the full controller state (little-endian).
    ///
    /// Layout: `"PADS"`, version `u8`, gamepad count `u8`, selected `i32`,
    /// then for each gamepad its real-time and provided states, each as a
    /// connection byte followed by 11 `i32` counters.
    pub fn save_state(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(STATE_LEN);
        out.extend_from_slice(STATE_MAGIC);
        out.push(STATE_VERSION);
        out.push(GAMEPAD_PORTS as u8);
        out.extend_from_slice(&(self.selected as i32).to_le_bytes());

        for gamepad in 0..GAMEPAD_PORTS {
            for state in [&self.real_time[gamepad], &self.provided[gamepad]] {
                out.push(state.connected as u8);
                for counter in state.counters {
                    out.extend_from_slice(&counter.to_le_bytes());
                }
            }
        }
        out
    }

    /// Restore a snapshot produced by [`save_state`](Self::save_state).
    /// The snapshot is fully validated first; on error nothing changes.
    /// Records that input events could never produce (a disconnected gamepad
    /// holding a control, or both directions of an axis held) are rejected.
    pub fn load_state(&mut self, data: &[u8]) -> Result<(), StateError> {
        if data.len() < STATE_HEADER_LEN {
            return Err(StateError::Truncated {
                expected: STATE_LEN,
                actual: data.len(),
            });
        }
        if &data[0..4] != STATE_MAGIC {
            return Err(StateError::BadMagic);
        }
        if data[4] != STATE_VERSION {
            return Err(StateError::UnsupportedVersion(data[4]));
        }
        if data[5] as usize != GAMEPAD_PORTS {
            return Err(StateError::GamepadCountMismatch {
                expected: GAMEPAD_PORTS,
                found: data[5] as usize,
            });
        }
        if data.len() < STATE_LEN {
            return Err(StateError::Truncated {
                expected: STATE_LEN,
                actual: data.len(),
            });
        }
        if data.len() > STATE_LEN {
            return Err(StateError::TrailingBytes(data.len() - STATE_LEN));
        }

        let selected = read_i32(data, 6);
        let selected = match usize::try_from(selected) {
            Ok(gamepad) if gamepad < GAMEPAD_PORTS => gamepad,
            _ => return Err(StateError::InvalidSelection(selected)),
        };

        let mut real_time = [GamepadState::new(); GAMEPAD_PORTS];
        let mut provided = [GamepadState::new(); GAMEPAD_PORTS];
        let mut offset = STATE_HEADER_LEN;
        for gamepad in 0..GAMEPAD_PORTS {
            real_time[gamepad] = decode_gamepad(data, offset, gamepad)?;
            offset += STATE_GAMEPAD_LEN;
            provided[gamepad] = decode_gamepad(data, offset, gamepad)?;
            offset += STATE_GAMEPAD_LEN;
        }

        self.real_time = real_time;
        self.provided = provided;
        self.selected = selected;
        debug!(target: "padport_core::gamepad", selected, "gamepad state restored");
        Ok(())
    }
}

fn read_i32(data: &[u8], offset: usize) -> i32 {
    let mut bytes = [0u8; 4];
    bytes.copy_from_slice(&data[offset..offset + 4]);
    i32::from_le_bytes(bytes)
}

/// Caller guarantees `data` holds a full gamepad record at `offset`.
fn decode_gamepad(data: &[u8], offset: usize, gamepad: usize) -> Result<GamepadState, StateError> {
    let connected = match data[offset] {
        0 => false,
        1 => true,
        value => return Err(StateError::InvalidConnectionFlag { gamepad, value }),
    };

    let mut state = GamepadState {
        connected,
        counters: [0; CONTROL_COUNT],
    };
    for control in GamepadControl::ALL {
        let value = read_i32(data, offset + 1 + control.index() * 4);
        if value == 0 || !(-MAX_FRAMES_IN_STATE..=MAX_FRAMES_IN_STATE).contains(&value) {
            return Err(StateError::CounterOutOfRange {
                gamepad,
                control,
                value,
            });
        }
        state.counters[control.index()] = value;
    }

    // Held controls must be reachable through input events
    for control in GamepadControl::ALL {
        if !state.is_pressed(control) {
            continue;
        }
        if !connected {
            return Err(StateError::DisconnectedControlHeld { gamepad, control });
        }
        if let Some(opposite) = control.opposite()
            && state.is_pressed(opposite)
        {
            return Err(StateError::OppositeDirectionsHeld {
                gamepad,
                control,
                opposite,
            });
        }
    }
    Ok(state)
}

impl Default for GamepadController {
    fn default() -> Self {
        Self::new()
    }
}

impl PortDevice for GamepadController {
    fn port_count(&self) -> u32 {
        LAST_PORT + 1
    }

    fn read_port(&mut self, local_port: u32) -> Option<Word> {
        GamepadController::read_port(self, local_port)
    }

    fn write_port(&mut self, local_port: u32, value: Word) -> bool {
        GamepadController::write_port(self, local_port, value)
    }
}

impl Component for GamepadController {
    fn change_frame(&mut self) {
        GamepadController::change_frame(self);
    }

    fn reset(&mut self) {
        GamepadController::reset(self);
    }
}
