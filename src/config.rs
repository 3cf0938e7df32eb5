use crate::args::Args;
use crate::errors::SearchError;
use std::env;
use std::path::PathBuf;

/// Configuration structure containing runtime settings.
///
/// # Fields
///
/// * `root_path` - Directory whose subtree is ranked
/// * `num_entries` - Number of biggest entries to select
/// * `include_directories` - Whether directories compete with files in the ranking
/// * `human_readable` - Print sizes with binary units instead of raw byte counts
/// * `disk_usage` - Size files by allocated space on disk rather than by length
///
#[derive(Debug, Clone)]
pub struct Config {
    pub root_path: PathBuf,
    pub num_entries: usize,
    pub include_directories: bool,
    pub human_readable: bool,
    pub disk_usage: bool,
}

impl Config {
    /// Builds a new Config instance from provided command line arguments.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * Current directory cannot be determined when no directory is specified
    /// * The chosen root is not a directory
    ///
    pub fn build(args: &Args) -> Result<Config, SearchError> {
        let root_path = match &args.directory {
            Some(directory) => PathBuf::from(directory),
            None => env::current_dir()?,
        };

        if !root_path.is_dir() {
            return Err(SearchError::NotADirectory(root_path));
        }

        log::info!(
            "Searching for the {} biggest {} in {}",
            args.num_entries,
            if args.only_files { "files" } else { "entries" },
            root_path.display()
        );

        Ok(Config {
            root_path,
            num_entries: args.num_entries,
            include_directories: !args.only_files,
            human_readable: args.human_readable,
            disk_usage: args.disk_usage,
        })
    }
}
