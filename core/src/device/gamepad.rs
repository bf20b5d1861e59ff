//! Gamepad controls and per-gamepad time-in-state counters.
//!
//! Each control keeps one signed counter. The sign is the press state
//! (positive = pressed, negative = released) and the magnitude is how many
//! frames the control has spent in that state, saturating at
//! [`MAX_FRAMES_IN_STATE`]. A counter is never 0, so "just pressed" (+1)
//! and "just released" (-1) are always distinguishable.
use std::fmt;
use std::str::FromStr;

/// Number of controls on every gamepad.
pub const CONTROL_COUNT: usize = 11;

/// Saturation point of the time-in-state counters (one minute at 60 fps).
pub const MAX_FRAMES_IN_STATE: i32 = 3600;

/// Controls in register order. The discriminant is the counter index;
/// the control is visible on local port `index + 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GamepadControl {
    Left = 0,
    Right = 1,
    Up = 2,
    Down = 3,
    Start = 4,
    A = 5,
    B = 6,
    X = 7,
    Y = 8,
    L = 9,
    R = 10,
}

impl GamepadControl {
    /// Index-to-control table. `ALL[i].index() == i`.
    pub const ALL: [GamepadControl; CONTROL_COUNT] = [
        GamepadControl::Left,
        GamepadControl::Right,
        GamepadControl::Up,
        GamepadControl::Down,
        GamepadControl::Start,
        GamepadControl::A,
        GamepadControl::B,
        GamepadControl::X,
        GamepadControl::Y,
        GamepadControl::L,
        GamepadControl::R,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Local port on which this control's counter is read.
    pub const fn local_port(self) -> u32 {
        self as u32 + 1
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_local_port(local_port: u32) -> Option<Self> {
        local_port
            .checked_sub(1)
            .and_then(|i| Self::from_index(i as usize))
    }

    pub const fn is_direction(self) -> bool {
        matches!(self, Self::Left | Self::Right | Self::Up | Self::Down)
    }

    /// The direction that can never be held together with this one.
    pub const fn opposite(self) -> Option<Self> {
        match self {
            Self::Left => Some(Self::Right),
            Self::Right => Some(Self::Left),
            Self::Up => Some(Self::Down),
            Self::Down => Some(Self::Up),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
            Self::Start => "start",
            Self::A => "a",
            Self::B => "b",
            Self::X => "x",
            Self::Y => "y",
            Self::L => "l",
            Self::R => "r",
        }
    }
}

impl fmt::Display for GamepadControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown control name passed to [`GamepadControl::from_str`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown gamepad control: {0:?}")]
pub struct UnknownControl(pub String);

impl FromStr for GamepadControl {
    type Err = UnknownControl;

    /// Case-insensitive; accepts the `name()` spellings plus `button_*`
    /// forms for the buttons (e.g. `"ButtonA"`, `"button_start"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase().replace('_', "");
        let name = lower.strip_prefix("button").unwrap_or(&lower);
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| UnknownControl(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// GamepadState
// ---------------------------------------------------------------------------

/// Connection flag plus one time-in-state counter per control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GamepadState {
    pub connected: bool,
    pub counters: [i32; CONTROL_COUNT],
}

impl GamepadState {
    /// Disconnected, every control released for the maximum time.
    pub const fn new() -> Self {
        Self {
            connected: false,
            counters: [-MAX_FRAMES_IN_STATE; CONTROL_COUNT],
        }
    }

    pub fn counter(&self, control: GamepadControl) -> i32 {
        self.counters[control.index()]
    }

    pub fn is_pressed(&self, control: GamepadControl) -> bool {
        self.counter(control) > 0
    }

    /// Frames spent in the current press state (1..=3600).
    pub fn frames_in_state(&self, control: GamepadControl) -> u32 {
        self.counter(control).unsigned_abs()
    }

    /// Release every control for the maximum time. The connection flag is
    /// left alone.
    pub(crate) fn release_all(&mut self) {
        self.counters = [-MAX_FRAMES_IN_STATE; CONTROL_COUNT];
    }

    /// Move every counter one frame further from zero, saturating.
    pub(crate) fn advance_frame(&mut self) {
        for counter in &mut self.counters {
            let stepped = if *counter < 0 {
                counter.saturating_sub(1)
            } else {
                counter.saturating_add(1)
            };
            *counter = stepped.clamp(-MAX_FRAMES_IN_STATE, MAX_FRAMES_IN_STATE);
        }
    }

    /// Restart `control` in the given press state with a duration of one
    /// frame. Returns false (and changes nothing) if it is already there.
    pub(crate) fn transition(&mut self, control: GamepadControl, pressed: bool) -> bool {
        if self.is_pressed(control) == pressed {
            return false;
        }
        self.counters[control.index()] = if pressed { 1 } else { -1 };
        true
    }
}

impl Default for GamepadState {
    fn default() -> Self {
        Self::new()
    }
}
