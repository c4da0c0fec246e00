use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::info;
use workout_core::workouts::Day;

#[allow(dead_code)]
#[path = "../error.rs"]
mod error;
#[allow(dead_code)]
#[path = "../logging.rs"]
mod logging;
#[allow(dead_code)]
#[path = "../session.rs"]
mod session;

use error::Result;
use session::Session;

/// Replays scripted sessions into transcript files.
#[derive(Debug, Parser)]
#[command(name = "capture_transcripts")]
struct Args {
    /// Directory the transcripts are written to.
    #[arg(long, default_value = "transcripts")]
    out_dir: PathBuf,
}

#[derive(Clone, Copy)]
enum Script {
    Monday,
    RestDay,
}

impl Script {
    const ALL: [Script; 2] = [Script::Monday, Script::RestDay];

    const fn file_name(self) -> &'static str {
        match self {
            Script::Monday => "emulator-monday.log",
            Script::RestDay => "emulator-rest-day.log",
        }
    }

    const fn day(self) -> Day {
        match self {
            Script::Monday => Day::Monday,
            Script::RestDay => Day::Sunday,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_logging(1);

    for script in Script::ALL {
        if let Err(err) = record(script, &args.out_dir) {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

fn record(script: Script, out_dir: &std::path::Path) -> Result<()> {
    let path = out_dir.join(script.file_name());
    let mut session = Session::new(script.day(), Duration::from_secs(1), Some(path.as_path()))?;
    match script {
        Script::Monday => record_monday(&mut session)?,
        Script::RestDay => record_rest_day(&mut session)?,
    }
    info!(path = %path.display(), "transcript written");
    Ok(())
}

fn record_monday(session: &mut Session) -> Result<()> {
    session.handle_completion("st", 2)?;
    session.handle_completion("start ", "start ".len())?;
    session.handle_completion("start mo", "start mo".len())?;

    session.handle_command("start monday")?;
    session.handle_command("tick 9")?;
    session.handle_command("tick")?;
    session.handle_command("tick 5")?;
    session.handle_command("pause")?;
    session.handle_command("tick 3")?;
    session.handle_command("toggle")?;

    session.handle_completion("jump ", "jump ".len())?;
    session.handle_command("jump 2 3")?;
    session.handle_command("jump 2 12")?;
    session.handle_command("status")?;
    session.handle_command("tick 600")?;
    session.handle_command("status")?;
    Ok(())
}

fn record_rest_day(session: &mut Session) -> Result<()> {
    session.handle_completion("help ", "help ".len())?;
    session.handle_command("help")?;
    session.handle_command("help jump")?;
    session.handle_command("plan")?;
    session.handle_command("start")?;
    session.handle_command("toggle")?;
    session.handle_command("start monday")?;
    session.handle_command("plan")?;
    Ok(())
}
