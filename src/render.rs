//! Connector-drawn rendering of a [`Tree`].
//!
//! Connectors and sizes always go to the secondary stream. A selected entry's
//! full path goes to the primary stream, so redirecting the primary stream
//! yields just the selected paths, one per line.

use std::io::{self, Write};

use crate::traits::ByteSize;
use crate::tree::{EntryId, Tree};
use crate::walker::Walker;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

pub struct TreePrinter<P, S> {
    primary: P,
    secondary: S,
    human_readable: bool,
}

impl<P: Write, S: Write> TreePrinter<P, S> {
    pub fn new(primary: P, secondary: S, human_readable: bool) -> Self {
        Self {
            primary,
            secondary,
            human_readable,
        }
    }

    /// Prints `root` and its display children, recursively.
    pub fn print<W: Walker>(&mut self, tree: &mut Tree<W>, root: EntryId) -> io::Result<()> {
        let mut open = Vec::new();
        self.print_entry(tree, root, &mut open, None)
    }

    pub fn into_inner(self) -> (P, S) {
        (self.primary, self.secondary)
    }

    // `open[i]` tells whether the ancestor at depth i + 1 still has siblings below it.
    fn print_entry<W: Walker>(
        &mut self,
        tree: &mut Tree<W>,
        id: EntryId,
        open: &mut Vec<bool>,
        last: Option<bool>,
    ) -> io::Result<()> {
        for &has_more in open.iter().take(open.len().saturating_sub(1)) {
            let indent = if has_more { PIPE } else { SPACE };
            self.secondary.write_all(indent.as_bytes())?;
        }
        match last {
            Some(true) => self.secondary.write_all(LAST_BRANCH.as_bytes())?,
            Some(false) => self.secondary.write_all(BRANCH.as_bytes())?,
            None => {}
        }

        let size = tree.total_size(id);
        let size = if self.human_readable {
            size.format_size()
        } else {
            size.to_string()
        };
        write!(self.secondary, "[{}] ", size)?;
        self.secondary.flush()?;

        let entry = tree.entry(id);
        if entry.selected() {
            writeln!(self.primary, "{}", entry.path().display())?;
            self.primary.flush()?;
        } else if last.is_none() {
            writeln!(self.secondary, "{}", entry.path().display())?;
        } else {
            writeln!(self.secondary, "{}", entry.name())?;
        }

        let children = tree.children(id);
        for (index, &child) in children.iter().enumerate() {
            let is_last = index + 1 == children.len();
            open.push(!is_last);
            let printed = self.print_entry(tree, child, open, Some(is_last));
            open.pop();
            printed?;
        }
        Ok(())
    }
}
