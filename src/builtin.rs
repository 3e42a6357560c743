//! The fixed table of commands the interpreter handles itself.

use crate::command::{BuiltinKind, InvalidReason};
use regex::Regex;
use std::sync::LazyLock;

/// Compact recall form, `!N`, written as a single token.
static COMPACT_RECALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!(-?[0-9]+)$").expect("recall pattern is valid"));

/// Number of parameters a builtin requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    None,
    One,
}

/// Builtin identity without its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinName {
    Exit,
    History,
    RecallLast,
    RecallAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinSpec {
    pub name: &'static str,
    pub builtin: BuiltinName,
    pub arity: Arity,
}

const DEFAULT_BUILTINS: [BuiltinSpec; 4] = [
    BuiltinSpec {
        name: "exit",
        builtin: BuiltinName::Exit,
        arity: Arity::None,
    },
    BuiltinSpec {
        name: "history",
        builtin: BuiltinName::History,
        arity: Arity::None,
    },
    BuiltinSpec {
        name: "!!",
        builtin: BuiltinName::RecallLast,
        arity: Arity::None,
    },
    BuiltinSpec {
        name: "!",
        builtin: BuiltinName::RecallAt,
        arity: Arity::One,
    },
];

/// Static mapping from command name to builtin and arity.
#[derive(Debug, Clone)]
pub struct BuiltinTable {
    specs: &'static [BuiltinSpec],
}

impl Default for BuiltinTable {
    fn default() -> Self {
        Self {
            specs: &DEFAULT_BUILTINS,
        }
    }
}

impl BuiltinTable {
    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<&BuiltinSpec> {
        self.specs.iter().find(|spec| spec.name == name)
    }

    /// Recognize the compact `!N` form, returning the offset text.
    pub fn compact_recall<'a>(&self, token: &'a str) -> Option<&'a str> {
        COMPACT_RECALL
            .captures(token)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

impl BuiltinSpec {
    /// Build the concrete builtin from its (already arity-checked) argument.
    pub fn resolve(&self, arg: Option<&str>) -> Result<BuiltinKind, InvalidReason> {
        match self.builtin {
            BuiltinName::Exit => Ok(BuiltinKind::Exit),
            BuiltinName::History => Ok(BuiltinKind::ShowHistory),
            BuiltinName::RecallLast => Ok(BuiltinKind::RecallLast),
            BuiltinName::RecallAt => {
                let arg = arg.ok_or(InvalidReason::MissingArgument)?;
                parse_offset(arg).map(BuiltinKind::RecallAt)
            }
        }
    }
}

/// Parse a recall offset. Only strictly positive integers are accepted.
pub fn parse_offset(text: &str) -> Result<usize, InvalidReason> {
    let value: i64 = text.parse().map_err(|_| InvalidReason::InvalidOffset)?;
    if value <= 0 {
        return Err(InvalidReason::InvalidOffset);
    }
    usize::try_from(value).map_err(|_| InvalidReason::InvalidOffset)
}
