use std::io;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub mod args;
pub mod config;
pub mod errors;
pub mod heap;
pub mod render;
pub mod selector;
pub mod traits;
pub mod tree;
pub mod walker;


pub use config::Config;
pub use errors::SearchError;
pub use traits::ByteSize;

use render::TreePrinter;
use tree::Tree;
use walker::FsWalker;

/// Scans `config.root_path`, selects its biggest entries and prints the tree
/// leading to them.
///
/// Selected paths are written to stdout; the tree drawing, unselected entries
/// and warnings go to stderr. Unreadable directories and files only produce
/// warnings; an error is returned only when the output cannot be written.
pub fn run(config: &Config) -> Result<(), SearchError> {
    let progress = scan_progress();
    let mut tree =
        Tree::new(FsWalker::new(config.disk_usage), &config.root_path).with_progress(progress.clone());
    let root = tree.root();

    let total_size = tree.total_size(root);
    let biggest = tree.biggest(config.num_entries, config.include_directories);
    progress.finish_and_clear();

    for ranked in &biggest {
        log::debug!(
            "{} accounts for {} bytes",
            tree.path(ranked.entry).display(),
            ranked.size
        );
        tree.set_selected(ranked.entry, true);
    }

    {
        let stdout = io::stdout();
        let stderr = io::stderr();
        let mut printer = TreePrinter::new(stdout.lock(), stderr.lock(), config.human_readable);
        printer.print(&mut tree, root)?;
    }

    log::info!(
        "Scanned {} entries holding {} with {} warnings",
        tree.len(),
        total_size.format_size(),
        tree.warnings().len()
    );
    Ok(())
}

fn scan_progress() -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.set_style(
        ProgressStyle::with_template("{spinner} {pos} directories scanned {wide_msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
