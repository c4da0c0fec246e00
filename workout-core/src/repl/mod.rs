//! REPL tooling shared by every workout front-end.
//!
//! The command grammar lives in [`catalog`] and is interpreted by both the
//! [`grammar`] parser and the [`completion`] engine. Parsed commands run
//! through [`commands`] and results render with [`status`].

pub mod catalog;
pub mod commands;
pub mod completion;
pub mod grammar;
pub mod status;
