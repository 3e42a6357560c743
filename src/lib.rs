//! A small interactive shell with positional command history.
//!
//! Each line read at the prompt goes through the same pipeline: it is normalized
//! (control characters dropped, separator runs collapsed), split into a bounded
//! argument vector, classified against a fixed table of builtins and finally
//! dispatched. Builtins cover leaving the shell (`exit`), listing recent commands
//! (`history`) and recalling them (`!!`, `! N`, `!N`); everything else is launched
//! as an external program, in the background when the line ends with `&`.
//!
//! The main entry point is [`Interpreter`], which owns the [`HistoryLog`] and runs
//! the read-eval loop over any [`LineReader`].

pub mod builtin;
pub mod command;
pub mod config;
pub mod error;
pub mod external;
pub mod history;
mod interpreter;
pub mod io_adapters;
pub mod lexer;
pub mod normalize;
pub mod parser;

pub use config::{Args, Config};
pub use error::ShellError;
pub use history::HistoryLog;
pub use interpreter::{Flow, Interpreter};
pub use io_adapters::{EditorReader, LineReader, MemWriter, ScriptedReader, StdinReader};
