use crate::error::ShellError;
use rustyline::error::ReadlineError;
use rustyline::{Config as EditorConfig, DefaultEditor};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, BufRead, Result as IoResult, Write};
use std::rc::Rc;

/// Result of asking the operator for one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A raw line, exactly as typed.
    Line(String),
    /// Nothing usable this time (e.g. Ctrl-C); prompt again silently.
    Retry,
    /// The input is exhausted.
    Eof,
}

/// Source of raw command lines. Implementations print the prompt themselves.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ShellError>;

    /// Called with every line the interpreter recorded, so readers that keep
    /// their own navigation history can follow along.
    fn remember(&mut self, _line: &str) {}
}

/// Interactive reader backed by `rustyline`.
pub struct EditorReader {
    editor: DefaultEditor,
}

impl EditorReader {
    pub fn new(history_size: usize) -> Result<Self, ShellError> {
        let config = EditorConfig::builder()
            .auto_add_history(false)
            .max_history_size(history_size)
            .map_err(|e| ShellError::GeneralUnclassified(e.into()))?
            .build();
        let editor = DefaultEditor::with_config(config)
            .map_err(|e| ShellError::GeneralUnclassified(e.into()))?;
        Ok(Self { editor })
    }
}

impl LineReader for EditorReader {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Retry),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(err) => Err(ShellError::GeneralUnclassified(err.into())),
        }
    }

    fn remember(&mut self, line: &str) {
        if let Err(err) = self.editor.add_history_entry(line) {
            log::warn!("line editor history: {}", err);
        }
    }
}

/// Plain reader over any buffered input, printing the prompt to `prompt_out`.
pub struct StdinReader<R, W> {
    input: R,
    prompt_out: W,
}

impl StdinReader<io::StdinLock<'static>, io::Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdinReader<R, W> {
    pub fn new(input: R, prompt_out: W) -> Self {
        Self { input, prompt_out }
    }
}

impl<R: BufRead, W: Write> LineReader for StdinReader<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ShellError> {
        write!(self.prompt_out, "{}", prompt)?;
        self.prompt_out.flush()?;

        let mut buf = String::new();
        match self.input.read_line(&mut buf) {
            Ok(0) => Ok(ReadOutcome::Eof),
            Ok(_) => Ok(ReadOutcome::Line(buf)),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(ReadOutcome::Retry),
            // Bytes that are not UTF-8 cannot be normalized into anything useful.
            Err(e) if e.kind() == io::ErrorKind::InvalidData => Ok(ReadOutcome::Retry),
            Err(e) => Err(e.into()),
        }
    }
}

/// Reader replaying a fixed list of lines, then reporting end of input.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    lines: VecDeque<ReadOutcome>,
    prompts: usize,
}

impl ScriptedReader {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines
                .into_iter()
                .map(|l| ReadOutcome::Line(l.into()))
                .collect(),
            prompts: 0,
        }
    }

    /// Queue an arbitrary outcome, e.g. [`ReadOutcome::Retry`].
    pub fn push(&mut self, outcome: ReadOutcome) {
        self.lines.push_back(outcome);
    }

    /// How many times a prompt was requested.
    pub fn prompts(&self) -> usize {
        self.prompts
    }
}

impl LineReader for ScriptedReader {
    fn read_line(&mut self, _prompt: &str) -> Result<ReadOutcome, ShellError> {
        self.prompts += 1;
        Ok(self.lines.pop_front().unwrap_or(ReadOutcome::Eof))
    }
}

/// Memory-backed writer for capturing interpreter output.
///
/// Clones share the same buffer.
#[derive(Clone, Default)]
pub struct MemWriter {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl MemWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience: create writer and return (writer, rc_handle).
    pub fn with_handle() -> (Self, Rc<RefCell<Vec<u8>>>) {
        let mw = MemWriter::new();
        let rc = mw.buf.clone();
        (mw, rc)
    }

    /// Everything written so far, decoded lossily.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf.borrow()).into_owned()
    }
}

impl Write for MemWriter {
    fn write(&mut self, data: &[u8]) -> IoResult<usize> {
        self.buf.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}
