//! Tavla: a backgammon feature extractor speaking a line protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Logging goes to stderr or to `--log-file`, never to stdout.

mod args;

use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead};

use args::Args;
use clap::Parser;
use log::LevelFilter;
use simplelog::{Config, WriteLogger};

use tavla::engine::Engine;
use tavla::protocol::parser::{parse_command, Command};

/// Runs the main protocol loop, reading commands from stdin and writing
/// responses to stdout.
fn main() -> Result<(), Box<dyn Error>> {
    let args = init()?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    if let Some(threads) = args.threads {
        engine.set_option("Threads".to_string(), Some(threads.to_string()));
    }
    if let Some(format) = args.format {
        engine.set_option("Format".to_string(), Some(format));
    }

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                log::error!("failed to read stdin: {}", e);
                break;
            }
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        match cmd {
            Command::Tavla => engine.handle_tavla(&mut out),
            Command::IsReady => engine.handle_isready(&mut out),
            Command::SetOption { name, value } => engine.set_option(name, value),
            Command::NewGame => engine.new_game(),
            Command::Position(pos) => engine.handle_position(&pos, &mut out),
            Command::Side { which } => engine.handle_side(which, &mut out),
            Command::Features => engine.handle_features(&mut out),
            Command::Summary => engine.handle_summary(&mut out),
            Command::Classify => engine.handle_classify(&mut out),
            Command::Encode => engine.handle_encode(&mut out),
            Command::Names => engine.handle_names(&mut out),
            Command::Batch { ids } => engine.handle_batch(&ids, &mut out),
            Command::Quit => break,
        }
    }

    log::info!("shutting down");
    Ok(())
}

fn init() -> Result<Args, Box<dyn Error>> {
    let args = Args::parse();
    let level: LevelFilter = args
        .log_level
        .parse()
        .map_err(|_| format!("invalid log level '{}'", args.log_level))?;

    match &args.log_file {
        Some(path) => WriteLogger::init(level, Config::default(), File::create(path)?)?,
        None => WriteLogger::init(level, Config::default(), io::stderr())?,
    }

    Ok(args)
}
