//! Lexical analysis: splits a normalized command line into a bounded argument vector.

use crate::error::ShellError;
use crate::normalize::NormalizedLine;
use std::ops::Index;

/// Maximum number of tokens an [`ArgumentVector`] can hold.
pub const MAX_LINE: usize = 80;

/// Maximum number of characters kept for a single token.
pub const MAX_TOKEN: usize = 128;

/// Returned by [`ArgumentVector::push`] when the vector is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Full;

/// Ordered, capacity-bounded list of non-empty tokens.
///
/// Index 0 is the command name, the rest are its parameters. The end of the
/// vector is the end of the argument list: it can be handed to
/// `std::process::Command` as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentVector {
    tokens: Vec<String>,
}

impl ArgumentVector {
    pub fn new() -> Self {
        Self {
            tokens: Vec::with_capacity(MAX_LINE),
        }
    }

    /// Append a token. Empty tokens are ignored; a full vector refuses the token.
    pub fn push(&mut self, token: impl Into<String>) -> Result<(), Full> {
        let token = token.into();
        if token.is_empty() {
            return Ok(());
        }
        if self.is_full() {
            return Err(Full);
        }
        self.tokens.push(token);
        Ok(())
    }

    /// Remove and return the last token.
    pub fn pop(&mut self) -> Option<String> {
        self.tokens.pop()
    }

    pub fn is_full(&self) -> bool {
        self.tokens.len() >= MAX_LINE
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.tokens.last().map(String::as_str)
    }

    /// The command name, `args[0]`.
    pub fn program(&self) -> Option<&str> {
        self.get(0)
    }

    /// Everything after the command name.
    pub fn params(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Re-join the tokens with single spaces.
    pub fn join(&self) -> String {
        self.tokens.join(" ")
    }
}

impl Index<usize> for ArgumentVector {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.tokens[index]
    }
}

/// Errors that can occur while splitting a line into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFailure {
    /// There was no line to tokenize.
    NullInput,
    /// The line holds more than [`MAX_LINE`] tokens. The whole line is rejected.
    TooManyTokens,
}

impl From<ParseFailure> for ShellError {
    fn from(failure: ParseFailure) -> Self {
        match failure {
            ParseFailure::NullInput => ShellError::InputUnavailable,
            ParseFailure::TooManyTokens => ShellError::InvalidArgument,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    /// The current token reached [`MAX_TOKEN`]; characters are skipped until the next separator.
    SkippingOverflow,
}

struct LexingFSM<'a> {
    input: std::str::Chars<'a>,
    state: LexingState,
    buffer: String,
    buffer_len: usize,
    out: ArgumentVector,
}

impl<'a> LexingFSM<'a> {
    fn new(line: &'a str) -> Self {
        LexingFSM {
            input: line.chars(),
            state: LexingState::Start,
            buffer: String::with_capacity(MAX_TOKEN),
            buffer_len: 0,
            out: ArgumentVector::new(),
        }
    }

    /// Drives the state machine over the whole line.
    fn make_tokens(mut self) -> Result<ArgumentVector, ParseFailure> {
        while let Some(ch) = self.input.next() {
            match self.state {
                LexingState::Start => self.handle_start(ch),
                LexingState::ReadingWord => self.handle_word(ch)?,
                LexingState::SkippingOverflow => self.handle_overflow(ch)?,
            }
        }
        self.flush()?;
        Ok(self.out)
    }

    fn handle_start(&mut self, ch: char) {
        if ch != ' ' {
            self.accumulate(ch);
            self.state = LexingState::ReadingWord;
        }
    }

    fn handle_word(&mut self, ch: char) -> Result<(), ParseFailure> {
        match ch {
            ' ' => {
                self.flush()?;
                self.state = LexingState::Start;
            }
            _ if self.buffer_len >= MAX_TOKEN => {
                log::warn!("token longer than {} characters truncated", MAX_TOKEN);
                self.state = LexingState::SkippingOverflow;
            }
            c => self.accumulate(c),
        }
        Ok(())
    }

    fn handle_overflow(&mut self, ch: char) -> Result<(), ParseFailure> {
        if ch == ' ' {
            self.flush()?;
            self.state = LexingState::Start;
        }
        Ok(())
    }

    fn accumulate(&mut self, ch: char) {
        self.buffer.push(ch);
        self.buffer_len += 1;
    }

    fn flush(&mut self) -> Result<(), ParseFailure> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let token = std::mem::take(&mut self.buffer);
        self.buffer_len = 0;
        self.out.push(token).map_err(|Full| ParseFailure::TooManyTokens)
    }
}

/// Split a normalized line into an [`ArgumentVector`].
///
/// Tokens are separated by single spaces (the normalizer guarantees there are no
/// runs). Tokens longer than [`MAX_TOKEN`] characters are cut at that length.
pub fn tokenize(line: Option<&NormalizedLine>) -> Result<ArgumentVector, ParseFailure> {
    let line = line.ok_or(ParseFailure::NullInput)?;
    LexingFSM::new(line.as_str()).make_tokens()
}
