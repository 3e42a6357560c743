use crate::history::{MAX_CHRONO, OverflowPolicy};
use anyhow::{Result, bail};
use argh::FromArgs;

/// Prompt printed before every read.
pub const PROMPT: &str = "osh>";

/// Number of entries printed by the `history` builtin.
pub const SHOW_LIMIT: usize = 10;

/// Runtime settings of the interpreter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub history_size: usize,
    pub show_limit: usize,
    pub overflow: OverflowPolicy,
    /// Read lines through the interactive line editor instead of plain stdin.
    pub interactive: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompt: PROMPT.to_string(),
            history_size: MAX_CHRONO,
            show_limit: SHOW_LIMIT,
            overflow: OverflowPolicy::EvictOldest,
            interactive: true,
        }
    }
}

#[derive(FromArgs, Debug)]
/// A small interactive shell with positional history recall.
pub struct Args {
    #[argh(option, short = 'p')]
    /// prompt printed before each line (default "osh>")
    pub prompt: Option<String>,

    #[argh(option)]
    /// number of commands kept in the history (default 128)
    pub history_size: Option<usize>,

    #[argh(option)]
    /// number of entries printed by `history` (default 10)
    pub show_limit: Option<usize>,

    #[argh(switch)]
    /// refuse new history entries once the history is full instead of dropping the oldest
    pub reject_when_full: bool,

    #[argh(switch)]
    /// read plain lines from standard input without the line editor
    pub plain: bool,
}

impl TryFrom<Args> for Config {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> Result<Self> {
        let defaults = Config::default();

        let history_size = args.history_size.unwrap_or(defaults.history_size);
        if history_size == 0 {
            bail!("--history-size must be at least 1");
        }
        let show_limit = args.show_limit.unwrap_or(defaults.show_limit);
        if show_limit == 0 {
            bail!("--show-limit must be at least 1");
        }

        Ok(Config {
            prompt: args.prompt.unwrap_or(defaults.prompt),
            history_size,
            show_limit,
            overflow: if args.reject_when_full {
                OverflowPolicy::Reject
            } else {
                OverflowPolicy::EvictOldest
            },
            interactive: !args.plain,
        })
    }
}
