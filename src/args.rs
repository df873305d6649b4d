use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tavla")]
#[command(about = "Backgammon feature extractor speaking a line protocol on stdin/stdout")]
#[command(version)]
pub struct Args {
    /// Write the log here instead of stderr.
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,

    /// One of off, error, warn, info, debug, trace.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Initial value of the Threads option.
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Initial value of the Format option.
    #[arg(short, long, value_parser = ["plain", "json"])]
    pub format: Option<String>,
}
