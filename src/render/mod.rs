//! Rendering module for writing built workbooks to output formats.

mod json;
mod text;

pub use json::{to_json, JsonFormat};
pub use text::{sheet_text, to_text};
