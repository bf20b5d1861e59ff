use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use padport_core::device::gamepad_controller::GamepadController;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod emulator;
mod input;
mod report;
mod script;

use emulator::Session;
use report::Format;
use script::{Script, SessionError};

/// Run a scripted gamepad session against the console's input controller.
#[derive(Debug, Parser)]
#[command(name = "padport", version)]
struct Args {
    /// Session script (TOML)
    script: PathBuf,

    /// Output format for bus activity
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Keep running idle frames until this many frames have run
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// Restore controller state from a snapshot before the first frame
    #[arg(long)]
    load_state: Option<PathBuf>,

    /// Save controller state to a snapshot after the last frame
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Log controller activity (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("padport: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<(), SessionError> {
    let script = Script::load(&args.script)?;
    let mut key_map = input::default_key_map();
    script.apply_bindings(&mut key_map);
    script.validate(&key_map)?;

    let mut controller = GamepadController::new();
    if let Some(path) = &args.load_state {
        controller.load_state(&read_file(path)?)?;
        info!(path = %path.display(), "controller state loaded");
    }

    let mut session = Session::new(controller, key_map);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    session.run(&script, args.frames, |r| report::write_report(&mut out, args.format, r))?;
    out.flush()?;
    info!(frames = session.frames_run(), "session finished");

    if let Some(path) = &args.save_state {
        std::fs::write(path, session.controller().save_state()).map_err(|source| {
            SessionError::Io {
                path: path.clone(),
                source,
            }
        })?;
        info!(path = %path.display(), "controller state saved");
    }
    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>, SessionError> {
    std::fs::read(path).map_err(|source| SessionError::Io {
        path: path.to_path_buf(),
        source,
    })
}
