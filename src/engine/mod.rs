//! Grid construction passes.
//!
//! Per grid the passes run strictly in order: structural walk and spatial
//! clustering write rows at a shared cursor, flowing rows are merged as they
//! are placed, then consolidation and column sizing run over the finished
//! grid.

mod builder;
mod classify;
mod cluster;
mod consolidate;
mod options;
mod sizing;
mod walker;

pub use builder::{build_page, build_workbook, PageBuilder, Sheet, Workbook, COMBINED_SHEET_NAME};
pub use classify::{RowClassifier, RowKind};
pub use cluster::{ClusteredFragment, SpatialClusterer, VisualRow};
pub use consolidate::GridConsolidator;
pub use options::{GridOptions, PageSelection};
pub use sizing::ColumnSizer;
pub use walker::{heading_font_size, StructuralWalker, BULLET_PREFIX, MIN_HEADING_FONT_PT};
