//! Page- and document-level containers.

use serde::{Deserialize, Serialize};

use super::{ContentNode, PositionedFragment};

/// The content of a single page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageContent {
    /// Page number (1-indexed)
    #[serde(default)]
    pub number: u32,

    /// Content nodes in extraction order
    #[serde(default)]
    pub blocks: Vec<ContentNode>,

    /// Loose positioned fragments not nested under any block
    #[serde(default)]
    pub fragments: Vec<PositionedFragment>,
}

impl PageContent {
    /// Create an empty page.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            blocks: Vec::new(),
            fragments: Vec::new(),
        }
    }

    /// Add a block to the page.
    pub fn add_block(&mut self, block: impl Into<ContentNode>) {
        self.blocks.push(block.into());
    }

    /// Add a loose fragment to the page.
    pub fn add_fragment(&mut self, fragment: PositionedFragment) {
        self.fragments.push(fragment);
    }

    /// Add a block and return self.
    pub fn with_block(mut self, block: impl Into<ContentNode>) -> Self {
        self.add_block(block);
        self
    }

    /// Add a fragment and return self.
    pub fn with_fragment(mut self, fragment: PositionedFragment) -> Self {
        self.add_fragment(fragment);
        self
    }

    /// Check if the page has neither blocks nor fragments.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() && self.fragments.is_empty()
    }

    /// Count fragments, both loose and inline among the blocks.
    pub fn fragment_count(&self) -> usize {
        let inline = self
            .blocks
            .iter()
            .filter(|b| matches!(b, ContentNode::PositionedFragment(_)))
            .count();
        self.fragments.len() + inline
    }
}

/// A document: an ordered list of pages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document title
    #[serde(default)]
    pub title: Option<String>,

    /// Pages in order
    #[serde(default)]
    pub pages: Vec<PageContent>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a page. Pages without a number are numbered by position.
    pub fn add_page(&mut self, mut page: PageContent) {
        if page.number == 0 {
            page.number = self.pages.len() as u32 + 1;
        }
        self.pages.push(page);
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by number (1-indexed).
    pub fn page(&self, number: u32) -> Option<&PageContent> {
        self.pages.iter().find(|p| p.number == number)
    }

    /// Assign positional numbers to pages loaded without one.
    pub fn normalize_numbers(&mut self) {
        for (i, page) in self.pages.iter_mut().enumerate() {
            if page.number == 0 {
                page.number = i as u32 + 1;
            }
        }
    }

    /// Check if no page has any content.
    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(PageContent::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_page_numbers() {
        let mut doc = Document::new();
        doc.add_page(PageContent::default());
        doc.add_page(PageContent::new(7));
        assert_eq!(doc.pages[0].number, 1);
        assert_eq!(doc.pages[1].number, 7);
        assert!(doc.page(7).is_some());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_fragment_count() {
        let page = PageContent::new(1)
            .with_block(ContentNode::PositionedFragment(PositionedFragment::new(
                "a", 0.0, 0.0,
            )))
            .with_block(ContentNode::paragraph("b"))
            .with_fragment(PositionedFragment::new("c", 10.0, 0.0));
        assert_eq!(page.fragment_count(), 2);
        assert!(!page.is_empty());
    }
}
