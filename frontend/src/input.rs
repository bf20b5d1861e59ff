use std::collections::HashMap;

use padport_core::device::gamepad::GamepadControl;

/// Maps host key names to (gamepad, control) pairs.
///
/// Key names are matched case-insensitively, so a script may write
/// `"Left"`, `"left"` or `"LEFT"`.
pub struct KeyMap {
    map: HashMap<String, (usize, GamepadControl)>,
}

impl KeyMap {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    /// Bind a key to a gamepad control, replacing any previous binding.
    pub fn bind(&mut self, key: &str, gamepad: usize, control: GamepadControl) {
        self.map.insert(key.to_ascii_lowercase(), (gamepad, control));
    }

    /// Look up the gamepad control bound to a key.
    pub fn get(&self, key: &str) -> Option<(usize, GamepadControl)> {
        self.map.get(&key.to_ascii_lowercase()).copied()
    }
}

/// Build the default key map: two gamepads on one keyboard.
pub fn default_key_map() -> KeyMap {
    use GamepadControl::*;

    const BINDINGS: &[(&str, usize, GamepadControl)] = &[
        // Gamepad 0
        ("Left", 0, Left),
        ("Right", 0, Right),
        ("Up", 0, Up),
        ("Down", 0, Down),
        ("Return", 0, Start),
        ("Z", 0, A),
        ("X", 0, B),
        ("A", 0, X),
        ("S", 0, Y),
        ("Q", 0, L),
        ("W", 0, R),
        // Gamepad 1
        ("J", 1, Left),
        ("L", 1, Right),
        ("I", 1, Up),
        ("K", 1, Down),
        ("RShift", 1, Start),
        ("N", 1, A),
        ("M", 1, B),
        ("H", 1, X),
        ("U", 1, Y),
        ("Y", 1, L),
        ("O", 1, R),
    ];

    let mut km = KeyMap::new();
    for &(key, gamepad, control) in BINDINGS {
        km.bind(key, gamepad, control);
    }
    km
}
