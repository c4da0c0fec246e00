//! Error type for the host emulator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use workout_core::workouts::DefinitionError;

#[derive(Debug, Error)]
pub enum EmulatorError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot open transcript {path}: {source}")]
    Transcript {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown day `{0}` (try monday or mon)")]
    UnknownDay(String),

    #[error("invalid workout: {0}")]
    Definition(DefinitionError),

    #[error("formatting failed")]
    Format(#[from] std::fmt::Error),

    #[error("terminal error: {0}")]
    Terminal(#[source] io::Error),
}

impl From<DefinitionError> for EmulatorError {
    fn from(error: DefinitionError) -> Self {
        Self::Definition(error)
    }
}

pub type Result<T> = std::result::Result<T, EmulatorError>;
