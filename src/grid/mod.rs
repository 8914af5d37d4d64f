//! Grid model produced by the engine.
//!
//! A [`GridModel`] is a sparse, 1-indexed map of cells plus the merge
//! regions, row provenance and per-row flags the engine passes need. It is
//! owned by the single construction call for its page and handed to a
//! serializer once sized.

mod diagnostics;
mod model;

pub use diagnostics::{Diagnostic, Diagnostics};
pub use model::{Cell, ColumnWidths, GridModel, MergeRegion, RowSource};
