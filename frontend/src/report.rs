use std::io::Write;

use clap::ValueEnum;

use crate::emulator::FrameReport;
use crate::script::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One line per bus access
    Text,
    /// One JSON object per frame
    Json,
}

/// Write one frame's bus activity to `out`.
pub fn write_report(
    out: &mut impl Write,
    format: Format,
    report: &FrameReport,
) -> Result<(), SessionError> {
    match format {
        Format::Text => {
            for w in &report.writes {
                let outcome = if w.accepted { "accepted" } else { "rejected" };
                writeln!(
                    out,
                    "frame {}: write port {} <- {}: {outcome}",
                    report.frame, w.port, w.value
                )?;
            }
            for r in &report.reads {
                match r.value {
                    Some(value) => {
                        writeln!(out, "frame {}: port {} = {value}", report.frame, r.port)?
                    }
                    None => writeln!(out, "frame {}: port {} = -", report.frame, r.port)?,
                }
            }
        }
        Format::Json => {
            serde_json::to_writer(&mut *out, report)?;
            writeln!(out)?;
        }
    }
    Ok(())
}
