//! Session scripts: a TOML description of host input and bus activity,
//! frame by frame.
//!
//! ```toml
//! [bindings]
//! "Space" = { gamepad = 0, control = "a" }
//!
//! [[frame]]
//! repeat = 2
//! events = [{ connect = 0 }, { key = "Left", pressed = true }]
//! writes = [{ port = 0, value = 1 }]
//! reads = [0, 1]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use padport_core::device::gamepad::{GamepadControl, UnknownControl};
use padport_core::device::gamepad_controller::StateError;
use serde::Deserialize;

use crate::input::KeyMap;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that stop a session before or while it runs.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid script: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("frame {frame}: no binding for key {key:?}")]
    UnknownKey { frame: usize, key: String },

    #[error("frame {frame}: repeat must be at least 1")]
    ZeroRepeat { frame: usize },

    #[error("invalid state snapshot: {0}")]
    State(#[from] StateError),

    #[error("failed to write report: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to encode report: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Script model
// ---------------------------------------------------------------------------

/// A control name as written in a script (`"left"`, `"ButtonA"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct ControlName(pub GamepadControl);

impl TryFrom<String> for ControlName {
    type Error = UnknownControl;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse().map(ControlName)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Binding {
    pub gamepad: usize,
    pub control: ControlName,
}

/// One host-side event. Variants are distinguished by their field names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Event {
    Control {
        gamepad: usize,
        control: ControlName,
        pressed: bool,
    },
    Key {
        key: String,
        pressed: bool,
    },
    Connect {
        connect: usize,
    },
    Disconnect {
        disconnect: usize,
    },
    ResetGamepad {
        reset_gamepad: usize,
    },
    ConsoleReset {
        console_reset: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortWrite {
    pub port: u32,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameScript {
    #[serde(default = "default_repeat")]
    pub repeat: u32,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub writes: Vec<PortWrite>,
    #[serde(default)]
    pub reads: Vec<u32>,
}

fn default_repeat() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Script {
    #[serde(default)]
    pub bindings: BTreeMap<String, Binding>,
    #[serde(default, rename = "frame")]
    pub frames: Vec<FrameScript>,
}

impl Script {
    pub fn parse(text: &str) -> Result<Self, SessionError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Add the script's own bindings to `key_map`.
    pub fn apply_bindings(&self, key_map: &mut KeyMap) {
        for (key, binding) in &self.bindings {
            key_map.bind(key, binding.gamepad, binding.control.0);
        }
    }

    /// Check everything that can be checked before the first frame runs.
    pub fn validate(&self, key_map: &KeyMap) -> Result<(), SessionError> {
        for (frame, script) in self.frames.iter().enumerate() {
            if script.repeat == 0 {
                return Err(SessionError::ZeroRepeat { frame });
            }
            for event in &script.events {
                if let Event::Key { key, .. } = event
                    && key_map.get(key).is_none()
                {
                    return Err(SessionError::UnknownKey {
                        frame,
                        key: key.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::default_key_map;

    #[test]
    fn parse_full_script() {
        let script = Script::parse(
            r#"
            [bindings]
            "Space" = { gamepad = 1, control = "ButtonA" }

            [[frame]]
            repeat = 3
            events = [
                { connect = 0 },
                { disconnect = 2 },
                { gamepad = 0, control = "left", pressed = true },
                { key = "Space", pressed = false },
                { reset_gamepad = 1 },
                { console_reset = true },
            ]
            writes = [{ port = 0, value = -1 }]
            reads = [0, 1, 12]

            [[frame]]
            "#,
        )
        .unwrap();

        assert_eq!(
            script.bindings["Space"],
            Binding {
                gamepad: 1,
                control: ControlName(GamepadControl::A),
            }
        );
        assert_eq!(script.frames.len(), 2);
        let first = &script.frames[0];
        assert_eq!(first.repeat, 3);
        assert_eq!(
            first.events,
            vec![
                Event::Connect { connect: 0 },
                Event::Disconnect { disconnect: 2 },
                Event::Control {
                    gamepad: 0,
                    control: ControlName(GamepadControl::Left),
                    pressed: true,
                },
                Event::Key {
                    key: "Space".to_string(),
                    pressed: false,
                },
                Event::ResetGamepad { reset_gamepad: 1 },
                Event::ConsoleReset {
                    console_reset: true,
                },
            ]
        );
        assert_eq!(first.writes, vec![PortWrite { port: 0, value: -1 }]);
        assert_eq!(first.reads, vec![0, 1, 12]);
        assert_eq!(script.frames[1], FrameScript {
            repeat: 1,
            ..Default::default()
        });
    }

    #[test]
    fn unknown_control_name_is_a_parse_error() {
        let err = Script::parse(
            r#"
            [[frame]]
            events = [{ gamepad = 0, control = "turbo", pressed = true }]
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Parse(_)));
    }

    #[test]
    fn unknown_frame_field_is_a_parse_error() {
        let err = Script::parse("[[frame]]\nread = [1]\n").unwrap_err();
        assert!(matches!(err, SessionError::Parse(_)));
    }

    #[test]
    fn validate_rejects_unbound_keys() {
        let script = Script::parse(
            r#"
            [[frame]]
            events = [{ key = "Left", pressed = true }]
            [[frame]]
            events = [{ key = "F12", pressed = true }]
            "#,
        )
        .unwrap();
        let err = script.validate(&default_key_map()).unwrap_err();
        assert!(matches!(err, SessionError::UnknownKey { frame: 1, ref key } if key == "F12"));
    }

    #[test]
    fn script_bindings_make_keys_valid() {
        let script = Script::parse(
            r#"
            [bindings]
            "F12" = { gamepad = 2, control = "start" }
            [[frame]]
            events = [{ key = "f12", pressed = true }]
            "#,
        )
        .unwrap();
        let mut key_map = default_key_map();
        script.apply_bindings(&mut key_map);
        assert!(script.validate(&key_map).is_ok());
        assert_eq!(key_map.get("F12"), Some((2, GamepadControl::Start)));
    }

    #[test]
    fn validate_rejects_zero_repeat() {
        let script = Script::parse("[[frame]]\nrepeat = 0\n").unwrap();
        let err = script.validate(&default_key_map()).unwrap_err();
        assert!(matches!(err, SessionError::ZeroRepeat { frame: 0 }));
    }
}
