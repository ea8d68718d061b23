//! Pattern language compiler.
//!
//! A pattern is a chain of atoms joined by implicit or explicit bonds:
//!
//! - shorthand atoms `C N O S P F I B Cl Br H * ?` and aromatic `c n o s`
//! - bracket expressions `[...]` (see [`parse_atom_block`])
//! - bond symbols `- / \ = # ~ @ :`, negated with `!`
//! - bond tag lists `<n,...>` after an atom or bond (see [`parse_tag_list`])
//! - ring-closure marks `0`-`9` and `%nn`
//! - branches `(...)` and fragment separators `.`

mod atom_block;
mod compiler;
mod error;
mod tag;

pub use atom_block::parse_atom_block;
pub use compiler::MARK_SLOTS;
pub use error::{PatternError, PatternErrorKind};
pub use tag::parse_tag_list;

use std::str::FromStr;

use petgraph::graph::NodeIndex;

use crate::graph::PatternGraph;

/// A compiled pattern: its graph and the atom matching starts from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pattern {
    root: NodeIndex,
    graph: PatternGraph,
}

impl Pattern {
    /// First atom of the pattern.
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn graph(&self) -> &PatternGraph {
        &self.graph
    }

    pub fn into_parts(self) -> (NodeIndex, PatternGraph) {
        (self.root, self.graph)
    }
}

impl FromStr for Pattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        compile(s)
    }
}

/// Compile pattern text into a [`Pattern`].
///
/// Fails on the first malformed token; no partial pattern is returned.
///
/// ```
/// let pattern = crabpattern::compile("C1CCCCC1").unwrap();
/// assert_eq!(pattern.graph().atom_count(), 6);
/// assert_eq!(pattern.graph().bond_count(), 6);
/// ```
#[tracing::instrument(level = "debug", skip_all, fields(chars = text.chars().count()))]
pub fn compile(text: &str) -> Result<Pattern, PatternError> {
    let chars: Vec<char> = text.chars().collect();
    match compiler::Compiler::new(&chars).compile() {
        Ok(pattern) => {
            tracing::debug!(
                atoms = pattern.graph.atom_count(),
                bonds = pattern.graph.bond_count(),
                "pattern compiled"
            );
            Ok(pattern)
        }
        Err(err) => {
            tracing::debug!(%err, "pattern rejected");
            Err(err)
        }
    }
}
