//! Error kinds produced by the command pipeline and their user-facing routing.
//!
//! Every stage of the pipeline returns a tagged result. [`report`] is the single
//! place that turns a [`ShellError`] into the fixed diagnostic string printed on the
//! error stream and decides whether the interpreter may keep going.

use std::collections::TryReserveError;
use std::io::{self, Write};
use thiserror::Error;

/// Everything that can go wrong while processing one input line.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The line reader had nothing to offer (interrupted, empty line). Never shown.
    #[error("")]
    InputUnavailable,

    /// Storage for a history entry could not be reserved.
    #[error("memory error")]
    AllocationFailure(#[source] TryReserveError),

    /// The operating system refused to create a child process.
    #[error("internal error: system call failed")]
    ProcessCreationFailure(#[source] io::Error),

    /// The external program could not be located or loaded.
    #[error("command not found")]
    CommandNotFound,

    /// Malformed builtin arguments, too many tokens, or a lone `&`.
    #[error("invalid argument")]
    InvalidArgument,

    /// A recall addressed an entry that was never written.
    #[error("history is empty")]
    EmptyHistory,

    /// The history log is at capacity and configured to reject new entries.
    #[error("history is full")]
    HistoryFull,

    /// Anything else, typically a failing terminal or output stream.
    #[error("unexpected error")]
    GeneralUnclassified(#[source] anyhow::Error),
}

impl ShellError {
    /// Whether the interpreter must stop after reporting this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ShellError::AllocationFailure(_)
                | ShellError::ProcessCreationFailure(_)
                | ShellError::GeneralUnclassified(_)
        )
    }

    /// Whether the error produces a diagnostic at all.
    pub fn is_silent(&self) -> bool {
        matches!(self, ShellError::InputUnavailable)
    }
}

impl From<io::Error> for ShellError {
    fn from(e: io::Error) -> Self {
        ShellError::GeneralUnclassified(e.into())
    }
}

impl From<TryReserveError> for ShellError {
    fn from(e: TryReserveError) -> Self {
        ShellError::AllocationFailure(e)
    }
}

/// What the interpreter should do after an error has been reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Abort the current line only.
    Recoverable,
    /// Stop the interpreter.
    Fatal,
}

/// Print the diagnostic for `err` to `stderr` and classify its severity.
///
/// Failing to write the diagnostic itself is ignored: there is nowhere left to
/// report it.
pub fn report(err: &ShellError, stderr: &mut dyn Write) -> Severity {
    if !err.is_silent() {
        let _ = writeln!(stderr, "{}", err);
        let _ = stderr.flush();
    }
    log::debug!("reported {:?}", err);
    if err.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Recoverable
    }
}
