//! Grid construction options and configuration.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Options for building grids from page content.
///
/// The clustering thresholds are empirical defaults, not tuned optima.
#[derive(Debug, Clone)]
pub struct GridOptions {
    /// Fragment tops are rounded to a multiple of this before row matching
    pub row_bucket_size: f64,

    /// Maximum distance between a normalized top and a row's representative
    pub row_tolerance: f64,

    /// Maximum distance between a fragment's left and a column's representative
    pub column_tolerance: f64,

    /// Positional rows using at least this many columns stay tabular
    pub tabular_column_threshold: usize,

    /// Characters added to the longest value of a column
    pub column_padding: f64,

    /// Lower bound for a non-empty column's width
    pub min_column_width: f64,

    /// Upper bound for any column's width
    pub max_column_width: f64,

    /// Width given to columns without content
    pub empty_column_width: f64,

    /// Highest column a span may reach
    pub max_column_limit: u32,

    /// Fixed display height recorded for positional rows
    pub row_height: Option<f64>,

    /// Build one combined grid for all selected pages
    pub single_sheet: bool,

    /// Build page grids in parallel
    pub parallel: bool,

    /// Pages to build
    pub pages: PageSelection,

    /// Text written to the first cell when the document yields no content
    pub empty_placeholder: Option<String>,
}

impl GridOptions {
    /// Create new grid options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the row bucket size.
    pub fn with_row_bucket_size(mut self, size: f64) -> Self {
        self.row_bucket_size = size;
        self
    }

    /// Set the row tolerance.
    pub fn with_row_tolerance(mut self, tolerance: f64) -> Self {
        self.row_tolerance = tolerance;
        self
    }

    /// Set the column tolerance.
    pub fn with_column_tolerance(mut self, tolerance: f64) -> Self {
        self.column_tolerance = tolerance;
        self
    }

    /// Set the tabular column threshold.
    pub fn with_tabular_threshold(mut self, threshold: usize) -> Self {
        self.tabular_column_threshold = threshold;
        self
    }

    /// Set column padding.
    pub fn with_column_padding(mut self, padding: f64) -> Self {
        self.column_padding = padding;
        self
    }

    /// Set the minimum and maximum width of non-empty columns.
    pub fn with_column_width_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_column_width = min;
        self.max_column_width = max;
        self
    }

    /// Set the width of empty columns.
    pub fn with_empty_column_width(mut self, width: f64) -> Self {
        self.empty_column_width = width;
        self
    }

    /// Set the highest column a span may reach.
    pub fn with_max_column_limit(mut self, limit: u32) -> Self {
        self.max_column_limit = limit;
        self
    }

    /// Record a fixed height for positional rows.
    pub fn with_row_height(mut self, height: f64) -> Self {
        self.row_height = Some(height);
        self
    }

    /// Combine all pages into one grid.
    pub fn single_sheet(mut self) -> Self {
        self.single_sheet = true;
        self
    }

    /// Enable or disable parallel page construction.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel page construction.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Set the placeholder written when the document has no content.
    pub fn with_empty_placeholder(mut self, text: impl Into<String>) -> Self {
        self.empty_placeholder = Some(text.into());
        self
    }

    /// Check that the options describe a usable configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.row_bucket_size.is_finite() && self.row_bucket_size > 0.0) {
            return Err(Error::InvalidOptions(format!(
                "row bucket size must be positive, got {}",
                self.row_bucket_size
            )));
        }
        for (name, value) in [
            ("row tolerance", self.row_tolerance),
            ("column tolerance", self.column_tolerance),
            ("column padding", self.column_padding),
            ("empty column width", self.empty_column_width),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(Error::InvalidOptions(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.tabular_column_threshold == 0 {
            return Err(Error::InvalidOptions(
                "tabular column threshold must be at least 1".into(),
            ));
        }
        if !(self.min_column_width.is_finite()
            && self.max_column_width.is_finite()
            && self.min_column_width <= self.max_column_width)
        {
            return Err(Error::InvalidOptions(format!(
                "column width bounds {}..{} are invalid",
                self.min_column_width, self.max_column_width
            )));
        }
        if self.max_column_limit == 0 {
            return Err(Error::InvalidOptions(
                "max column limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            row_bucket_size: 5.0,
            row_tolerance: 12.0,
            column_tolerance: 30.0,
            tabular_column_threshold: 3,
            column_padding: 2.0,
            min_column_width: 10.0,
            max_column_width: 60.0,
            empty_column_width: 2.0,
            max_column_limit: 16_384,
            row_height: None,
            single_sheet: false,
            parallel: true,
            pages: PageSelection::All,
            empty_placeholder: None,
        }
    }
}

/// Page selection for grid construction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Build all pages
    #[default]
    All,
    /// Build a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Build specific pages (1-indexed)
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let start = parse_page_number(start)?;
                let end = parse_page_number(end)?;
                if start > end {
                    return Err(Error::InvalidPageRange(format!(
                        "start {} is after end {}",
                        start, end
                    )));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                let start = parse_page_number(start)?;
                let end = parse_page_number(end)?;
                pages.extend(start..=end);
            } else {
                pages.push(parse_page_number(part)?);
            }
        }

        pages.sort_unstable();
        pages.dedup();
        Ok(PageSelection::Pages(pages))
    }
}

fn parse_page_number(s: &str) -> Result<u32> {
    s.trim()
        .parse()
        .map_err(|_| Error::InvalidPageRange(format!("'{}' is not a page number", s.trim())))
}
