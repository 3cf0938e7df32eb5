use clap::{ArgAction, Parser};

/// A utility for finding the biggest files and directories
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_help_flag = true)]
pub struct Args {
    /// (optional) Directory to analyze, defaults to the current working directory
    pub directory: Option<String>,

    /// (optional) Maximum number of biggest files and directories to find
    #[arg(short = 'n', long = "num-entries", default_value_t = 10)]
    pub num_entries: usize,

    /// Ignore directories and only find the biggest files
    #[arg(short = 'f', long = "only-files")]
    pub only_files: bool,

    /// Print sizes with human-readable units like "MiB" and "GiB"
    #[arg(short = 'h', long = "human-readable")]
    pub human_readable: bool,

    /// Measure the space files occupy on disk instead of their length
    #[arg(short = 'u', long = "disk-usage")]
    pub disk_usage: bool,

    #[arg(short, long)]
    pub verbose: bool,

    /// Print help
    #[arg(long, action = ArgAction::Help)]
    help: Option<bool>,
}
