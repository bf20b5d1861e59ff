use padport_core::core::{Component, PortDevice, Word};
use padport_core::device::gamepad_controller::GamepadController;
use serde::Serialize;
use tracing::debug;

use crate::input::KeyMap;
use crate::script::{Event, FrameScript, Script};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteResult {
    pub port: u32,
    pub value: i32,
    pub accepted: bool,
}

/// `value` is `None` when the read was not answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReadResult {
    pub port: u32,
    pub value: Option<i32>,
}

/// Bus activity observed during one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub frame: u64,
    pub writes: Vec<WriteResult>,
    pub reads: Vec<ReadResult>,
}

/// Plays the host backend, the bus core and the frame scheduler around one
/// gamepad controller.
pub struct Session {
    controller: GamepadController,
    key_map: KeyMap,
    frame: u64,
}

impl Session {
    pub fn new(controller: GamepadController, key_map: KeyMap) -> Self {
        Self {
            controller,
            key_map,
            frame: 0,
        }
    }

    pub fn controller(&self) -> &GamepadController {
        &self.controller
    }

    pub fn frames_run(&self) -> u64 {
        self.frame
    }

    /// Run every frame of `script`, then pad with idle frames (repeating the
    /// last frame's reads) until at least `min_frames` have run. Each frame's
    /// report is handed to `sink` as soon as the frame ends.
    pub fn run<E>(
        &mut self,
        script: &Script,
        min_frames: u64,
        mut sink: impl FnMut(&FrameReport) -> Result<(), E>,
    ) -> Result<(), E> {
        for frame in &script.frames {
            for _ in 0..frame.repeat {
                sink(&self.run_frame(frame))?;
            }
        }

        let idle = FrameScript {
            repeat: 1,
            reads: script
                .frames
                .last()
                .map(|f| f.reads.clone())
                .unwrap_or_default(),
            ..Default::default()
        };
        while self.frame < min_frames {
            sink(&self.run_frame(&idle))?;
        }
        Ok(())
    }

    /// Run one frame: host events, then bus writes and reads, then the
    /// frame boundary.
    pub fn run_frame(&mut self, frame: &FrameScript) -> FrameReport {
        for event in &frame.events {
            self.apply_event(event);
        }

        let writes = frame
            .writes
            .iter()
            .map(|w| {
                let value = Word::from_integer(w.value);
                WriteResult {
                    port: w.port,
                    value: w.value,
                    accepted: PortDevice::write_port(&mut self.controller, w.port, value),
                }
            })
            .collect();

        let reads = frame
            .reads
            .iter()
            .map(|&port| ReadResult {
                port,
                value: PortDevice::read_port(&mut self.controller, port).map(Word::as_integer),
            })
            .collect();

        let report = FrameReport {
            frame: self.frame,
            writes,
            reads,
        };

        Component::change_frame(&mut self.controller);
        self.frame += 1;
        report
    }

    fn apply_event(&mut self, event: &Event) {
        match *event {
            Event::Control {
                gamepad,
                control,
                pressed,
            } => self.controller.set_gamepad_control(gamepad, control.0, pressed),
            Event::Key { ref key, pressed } => match self.key_map.get(key) {
                Some((gamepad, control)) => {
                    self.controller.set_gamepad_control(gamepad, control, pressed)
                }
                None => debug!(key = key.as_str(), "unbound key ignored"),
            },
            Event::Connect { connect } => self.controller.set_gamepad_connection(connect, true),
            Event::Disconnect { disconnect } => {
                self.controller.set_gamepad_connection(disconnect, false)
            }
            Event::ResetGamepad { reset_gamepad } => self.controller.reset_gamepad(reset_gamepad),
            Event::ConsoleReset { console_reset } => {
                if console_reset {
                    Component::reset(&mut self.controller);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::default_key_map;
    use padport_core::device::gamepad::MAX_FRAMES_IN_STATE;

    fn session() -> Session {
        Session::new(GamepadController::new(), default_key_map())
    }

    fn run_script(text: &str, min_frames: u64) -> Vec<FrameReport> {
        let script = Script::parse(text).unwrap();
        let mut session = session();
        let mut reports = Vec::new();
        session
            .run(&script, min_frames, |r| {
                reports.push(r.clone());
                Ok::<_, ()>(())
            })
            .unwrap();
        reports
    }

    fn read_values(report: &FrameReport) -> Vec<Option<i32>> {
        report.reads.iter().map(|r| r.value).collect()
    }

    #[test]
    fn press_becomes_visible_next_frame() {
        let reports = run_script(
            r#"
            [[frame]]
            events = [{ connect = 0 }, { key = "Left", pressed = true }]
            reads = [1]
            [[frame]]
            reads = [1]
            [[frame]]
            reads = [1]
            "#,
            0,
        );
        let left: Vec<_> = reports.iter().map(|r| r.reads[0].value).collect();
        assert_eq!(left, vec![Some(-MAX_FRAMES_IN_STATE), Some(1), Some(2)]);
    }

    #[test]
    fn writes_and_unanswered_reads_are_reported() {
        let reports = run_script(
            r#"
            [[frame]]
            writes = [{ port = 0, value = 2 }, { port = 0, value = 9 }, { port = 3, value = 1 }]
            reads = [0, 12]
            "#,
            0,
        );
        assert_eq!(
            reports[0].writes,
            vec![
                WriteResult {
                    port: 0,
                    value: 2,
                    accepted: true,
                },
                WriteResult {
                    port: 0,
                    value: 9,
                    accepted: true,
                },
                WriteResult {
                    port: 3,
                    value: 1,
                    accepted: false,
                },
            ]
        );
        assert_eq!(read_values(&reports[0]), vec![Some(2), None]);
    }

    #[test]
    fn repeat_and_padding_count_frames() {
        let reports = run_script(
            r#"
            [[frame]]
            repeat = 3
            events = [{ connect = 1 }, { gamepad = 1, control = "start", pressed = true }]
            writes = [{ port = 0, value = 1 }]
            reads = [5]
            "#,
            6,
        );
        assert_eq!(reports.len(), 6);
        assert_eq!(reports.last().unwrap().frame, 5);
        // Idle frames keep reading the last frame's ports
        let start: Vec<_> = reports.iter().map(|r| r.reads[0].value.unwrap()).collect();
        assert_eq!(start, vec![-MAX_FRAMES_IN_STATE, 1, 2, 3, 4, 5]);
        assert!(reports[3].writes.is_empty());
    }

    #[test]
    fn console_reset_keeps_gamepad_state() {
        let reports = run_script(
            r#"
            [[frame]]
            events = [{ connect = 1 }, { gamepad = 1, control = "b", pressed = true }]
            writes = [{ port = 0, value = 1 }]
            [[frame]]
            events = [{ console_reset = true }]
            reads = [0, 7]
            [[frame]]
            writes = [{ port = 0, value = 1 }]
            reads = [0, 7]
            "#,
            0,
        );
        assert_eq!(read_values(&reports[1]), vec![Some(0), Some(-MAX_FRAMES_IN_STATE)]);
        assert_eq!(read_values(&reports[2]), vec![Some(1), Some(2)]);
    }

    #[test]
    fn disconnect_releases_immediately() {
        let reports = run_script(
            r#"
            [[frame]]
            events = [{ connect = 0 }, { key = "Z", pressed = true }]
            [[frame]]
            reads = [6]
            [[frame]]
            events = [{ disconnect = 0 }]
            reads = [6]
            "#,
            0,
        );
        assert_eq!(reports[1].reads[0].value, Some(1));
        assert_eq!(reports[2].reads[0].value, Some(-MAX_FRAMES_IN_STATE));
    }

    #[test]
    fn sink_error_stops_the_session() {
        let script = Script::parse("[[frame]]\nrepeat = 5\n").unwrap();
        let mut session = session();
        let result = session.run(&script, 0, |r| if r.frame == 2 { Err(r.frame) } else { Ok(()) });
        assert_eq!(result, Err(2));
        assert_eq!(session.frames_run(), 3);
    }
}
