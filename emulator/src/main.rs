mod error;
mod live;
mod logging;
mod session;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing::info;
use workout_core::workouts::Day;

use error::{EmulatorError, Result};
use session::Session;

/// Host front-end for the interval workout engine.
#[derive(Debug, Parser)]
#[command(name = "workout-emulator", version)]
struct Args {
    /// Day whose plan is loaded (full name or three letters).
    #[arg(long, default_value = "monday")]
    day: String,

    /// Append every command and response to this file.
    #[arg(long, value_name = "PATH")]
    transcript: Option<PathBuf>,

    /// Run with a real timer in a raw terminal instead of the line REPL.
    #[arg(long)]
    live: bool,

    /// Live tick period in milliseconds.
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let day = Day::from_name(&args.day).ok_or_else(|| EmulatorError::UnknownDay(args.day.clone()))?;
    let period = Duration::from_millis(args.tick_ms);
    let mut session = Session::new(day, period, args.transcript.as_deref())?;

    let stdout = io::stdout();
    let mut writer = stdout.lock();

    if args.live {
        info!(%day, tick_ms = args.tick_ms, "starting live mode");
        return live::run(&mut session, &mut writer);
    }

    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    writeln!(
        writer,
        "Workout emulator ready ({day}). Type `help` for commands or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        if reader.read_line(&mut line)? == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        for response in session.handle_command(trimmed)? {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let args = Args::try_parse_from(["workout-emulator"]).expect("defaults parse");
        assert_eq!(args.day, "monday");
        assert_eq!(args.tick_ms, 1000);
        assert!(!args.live);
        assert!(args.transcript.is_none());
    }

    #[test]
    fn cli_rejects_zero_tick_period() {
        assert!(Args::try_parse_from(["workout-emulator", "--tick-ms", "0"]).is_err());
    }

    #[test]
    fn verbosity_counts_flags() {
        let args = Args::try_parse_from(["workout-emulator", "-vv", "--day", "fri"])
            .expect("flags parse");
        assert_eq!(args.verbose, 2);
        assert_eq!(Day::from_name(&args.day), Some(Day::Friday));
    }

    #[test]
    fn exit_words_close_the_session() {
        assert!(should_terminate("EXIT"));
        assert!(should_terminate("quit"));
        assert!(!should_terminate("pause"));
    }
}
