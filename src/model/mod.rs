//! Content tree model for one page of input.
//!
//! These types describe what an upstream rendering or extraction step hands
//! to the grid engine: structural nodes with explicit shape, and text
//! fragments known only by their page coordinates.

mod content;
mod page;
mod style;

pub use content::{
    flatten_text, image_placeholder, inline_text, ContentNode, InlineRun, List, ListItem,
    PositionedFragment, Table, TableCell, TableRow, UNSUPPORTED_PLACEHOLDER,
};
pub use page::{Document, PageContent};
pub use style::{StyleAttrs, TextAlign, DEFAULT_FONT_SIZE_PT};
