use crate::error::ShellError;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// The builtin a command line resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinKind {
    /// `exit`: leave the interpreter.
    Exit,
    /// `history`: list the most recent entries.
    ShowHistory,
    /// `!!`: run the last command again.
    RecallLast,
    /// `! N` or `!N`: run the command `N` entries back again.
    RecallAt(usize),
}

/// Why a command line was rejected before dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// A builtin that takes an argument was given none.
    MissingArgument,
    /// A recall offset that is not a positive integer.
    InvalidOffset,
}

impl From<InvalidReason> for ShellError {
    fn from(_: InvalidReason) -> Self {
        ShellError::InvalidArgument
    }
}

/// Outcome of inspecting an argument vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClassification {
    /// No tokens at all.
    Empty,
    /// A builtin with unusable arguments.
    Invalid(InvalidReason),
    /// One of the entries of the builtin table.
    Builtin(BuiltinKind),
    /// Anything else; whether the program exists is only known when it is spawned.
    External,
}
