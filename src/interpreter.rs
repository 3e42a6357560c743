use crate::builtin::BuiltinTable;
use crate::command::{BuiltinKind, CommandClassification, ExitCode};
use crate::config::Config;
use crate::error::{Severity, ShellError, report};
use crate::external::{BackgroundChildren, ExternalCommand, Launched, split_background};
use crate::history::{EntryKind, HistoryEntry, HistoryLog};
use crate::io_adapters::{LineReader, ReadOutcome};
use crate::lexer::{ArgumentVector, tokenize};
use crate::normalize::{NormalizedLine, normalize};
use crate::parser::classify;
use std::io::Write;

/// What the loop does after a line has been dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Prompt for the next line.
    Continue,
    /// Process this text as the next line instead of prompting.
    Reinject(String),
    /// Leave the loop.
    Exit,
}

/// The interactive command interpreter.
///
/// Owns the history log for its whole lifetime and processes one line at a time:
/// normalize, tokenize, classify, dispatch. Recalled commands are fed back through
/// the same pipeline as if they had been typed.
///
/// Example
/// ```
/// use osh::{Config, Interpreter, ScriptedReader};
/// let mut sh = Interpreter::new(Config::default());
/// let mut input = ScriptedReader::new(["history", "!!", "exit"]);
/// sh.repl(&mut input).unwrap();
/// assert_eq!(sh.history().len(), 1);
/// ```
pub struct Interpreter {
    config: Config,
    table: BuiltinTable,
    history: HistoryLog,
    background: BackgroundChildren,
    last_status: ExitCode,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
}

impl Interpreter {
    /// Create an interpreter writing to the process standard streams.
    pub fn new(config: Config) -> Self {
        Self::with_output(
            config,
            Box::new(std::io::stdout()),
            Box::new(std::io::stderr()),
        )
    }

    /// Create an interpreter with custom output streams for listings and diagnostics.
    pub fn with_output(config: Config, stdout: Box<dyn Write>, stderr: Box<dyn Write>) -> Self {
        let history = HistoryLog::new(config.history_size, config.overflow);
        Self {
            config,
            table: BuiltinTable::default(),
            history,
            background: BackgroundChildren::default(),
            last_status: 0,
            stdout,
            stderr,
        }
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Exit code of the last foreground command.
    pub fn last_status(&self) -> ExitCode {
        self.last_status
    }

    /// Read-eval loop. Returns `Ok` on `exit` or end of input.
    ///
    /// A fatal error is reported on the error stream and then returned, so the caller
    /// only has to pick the exit status.
    pub fn repl(&mut self, reader: &mut dyn LineReader) -> Result<(), ShellError> {
        let mut pending: Option<String> = None;

        loop {
            self.background.reap();

            let raw = match pending.take() {
                Some(line) => line,
                None => match reader.read_line(&self.config.prompt) {
                    Ok(ReadOutcome::Line(line)) => line,
                    Ok(ReadOutcome::Retry) => continue,
                    Ok(ReadOutcome::Eof) => {
                        log::info!("end of input");
                        return Ok(());
                    }
                    Err(err) => {
                        self.report_error(&err);
                        return Err(err);
                    }
                },
            };

            let written = self.history.written();
            let flow = self.process_line(raw);
            if self.history.written() != written {
                if let Some(entry) = self.history.recall(1) {
                    reader.remember(entry.text());
                }
            }

            match flow {
                Ok(Flow::Continue) => {}
                Ok(Flow::Reinject(line)) => pending = Some(line),
                Ok(Flow::Exit) => return Ok(()),
                Err(err) => {
                    if self.report_error(&err) == Severity::Fatal {
                        return Err(err);
                    }
                }
            }
        }
    }

    fn report_error(&mut self, err: &ShellError) -> Severity {
        report(err, &mut *self.stderr)
    }

    /// Run one raw line through the whole pipeline.
    pub fn process_line(&mut self, raw: String) -> Result<Flow, ShellError> {
        let Some(line) = normalize(raw) else {
            return Ok(Flow::Continue);
        };
        let args = tokenize(Some(&line))?;
        let classification = classify(&args, &self.table);
        log::debug!("{:?} classified as {:?}", line.as_str(), classification);
        self.dispatch(classification, &line, args)
    }

    fn dispatch(
        &mut self,
        classification: CommandClassification,
        line: &NormalizedLine,
        args: ArgumentVector,
    ) -> Result<Flow, ShellError> {
        match classification {
            CommandClassification::Empty => Ok(Flow::Continue),
            CommandClassification::Invalid(reason) => {
                log::debug!("rejected {:?}: {:?}", line.as_str(), reason);
                Err(reason.into())
            }
            CommandClassification::Builtin(BuiltinKind::Exit) => Ok(Flow::Exit),
            CommandClassification::Builtin(BuiltinKind::ShowHistory) => {
                self.record(&args.join(), EntryKind::Listing)?;
                self.history.show(self.config.show_limit, &mut *self.stdout)?;
                Ok(Flow::Continue)
            }
            CommandClassification::Builtin(BuiltinKind::RecallLast) => {
                Self::recalled(self.history.last_command())
            }
            CommandClassification::Builtin(BuiltinKind::RecallAt(offset)) => {
                Self::recalled(self.history.recall(offset))
            }
            CommandClassification::External => self.run_external(args),
        }
    }

    /// Copy a recalled entry out of the log so it can be processed as fresh input.
    fn recalled(entry: Option<&HistoryEntry>) -> Result<Flow, ShellError> {
        let entry = entry.ok_or(ShellError::EmptyHistory)?;
        log::debug!("recalled {:?}", entry.text());
        Ok(Flow::Reinject(entry.text().to_owned()))
    }

    /// Append the command as it will run, i.e. with any over-long token already cut.
    fn record(&mut self, text: &str, kind: EntryKind) -> Result<(), ShellError> {
        let entry = HistoryEntry::new(text, kind)?;
        self.history.append(entry)?;
        Ok(())
    }

    fn run_external(&mut self, mut args: ArgumentVector) -> Result<Flow, ShellError> {
        let text = args.join();
        let background = split_background(&mut args);
        if args.is_empty() {
            return Err(ShellError::InvalidArgument);
        }

        self.record(&text, EntryKind::External)?;

        let search_paths = std::env::var_os("PATH").unwrap_or_default();
        let cmd = ExternalCommand::try_create(&search_paths, &args, background)
            .ok_or(ShellError::CommandNotFound)?;

        match cmd.execute()? {
            Launched::Finished(code) => self.last_status = code,
            Launched::Background(child) => {
                writeln!(self.stdout, "[+] {}", child.id())?;
                self.stdout.flush()?;
                self.background.push(child);
            }
        }
        Ok(Flow::Continue)
    }
}
