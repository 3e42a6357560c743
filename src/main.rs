use osh::{Args, Config, EditorReader, Interpreter, LineReader, StdinReader};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Args = argh::from_env();
    let config = match Config::try_from(args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("osh: {:#}", err);
            return ExitCode::FAILURE;
        }
    };
    log::debug!("starting with {:?}", config);

    let mut reader: Box<dyn LineReader> = if config.interactive {
        match EditorReader::new(config.history_size) {
            Ok(reader) => Box::new(reader),
            Err(err) => {
                log::warn!("line editor unavailable, reading plain input: {:?}", err);
                Box::new(StdinReader::stdin())
            }
        }
    } else {
        Box::new(StdinReader::stdin())
    };

    let mut shell = Interpreter::new(config);
    match shell.repl(reader.as_mut()) {
        Ok(()) => ExitCode::SUCCESS,
        // already reported by the interpreter
        Err(_) => ExitCode::FAILURE,
    }
}
