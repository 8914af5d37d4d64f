//! Non-fatal layout conditions reported alongside a grid.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::MergeRegion;

/// A degradation the engine recovered from while building one grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A merge was skipped because it overlapped an existing region.
    MergeConflict {
        /// Region that was requested
        requested: MergeRegion,
        /// Region already occupying part of it
        existing: MergeRegion,
    },

    /// A node kind unknown to the walker was replaced by a placeholder.
    UnsupportedNode {
        /// Row holding the placeholder
        row: u32,
        /// Column holding the placeholder
        column: u32,
    },

    /// A table cell span was out of bounds and has been clamped.
    MalformedSpan {
        /// Row of the cell
        row: u32,
        /// Column of the cell
        column: u32,
        /// Span as given (rows, columns)
        requested: (i32, i32),
        /// Span actually applied (rows, columns)
        applied: (u32, u32),
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MergeConflict {
                requested,
                existing,
            } => write!(
                f,
                "merge {} skipped: overlaps existing merge {}",
                requested, existing
            ),
            Diagnostic::UnsupportedNode { row, column } => write!(
                f,
                "unsupported content replaced by placeholder at row {}, column {}",
                row, column
            ),
            Diagnostic::MalformedSpan {
                row,
                column,
                requested,
                applied,
            } => write!(
                f,
                "cell span {}x{} at row {}, column {} clamped to {}x{}",
                requested.0, requested.1, row, column, applied.0, applied.1
            ),
        }
    }
}

/// Accumulator for diagnostics raised during one grid construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
        self.0.push(diagnostic);
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over recorded diagnostics.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Count merge conflicts.
    pub fn merge_conflicts(&self) -> usize {
        self.0
            .iter()
            .filter(|d| matches!(d, Diagnostic::MergeConflict { .. }))
            .count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::MalformedSpan {
            row: 3,
            column: 2,
            requested: (0, 5),
            applied: (1, 3),
        };
        assert_eq!(
            d.to_string(),
            "cell span 0x5 at row 3, column 2 clamped to 1x3"
        );
    }

    #[test]
    fn test_counts() {
        let mut diags = Diagnostics::new();
        assert!(diags.is_empty());
        diags.push(Diagnostic::UnsupportedNode { row: 1, column: 1 });
        diags.push(Diagnostic::MergeConflict {
            requested: MergeRegion::new(1, 1, 1, 2),
            existing: MergeRegion::new(1, 2, 2, 2),
        });
        assert_eq!(diags.len(), 2);
        assert_eq!(diags.merge_conflicts(), 1);
    }

    #[test]
    fn test_serialize_tagged() {
        let d = Diagnostic::UnsupportedNode { row: 4, column: 1 };
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"kind\":\"unsupported_node\""));
    }
}
