//! Parsed XML document model

use indexmap::IndexMap;

/// Parsed XML document
///
/// `root` is `None` when the input holds no element at all (empty, blank,
/// or only comments and declarations).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Document {
    pub root: Option<Element>,
}

/// XML element
#[derive(Clone, Debug, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Content>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Child content that takes part in tree building (everything but comments)
    pub fn content(&self) -> impl Iterator<Item = &Content> {
        self.children
            .iter()
            .filter(|child| !matches!(child, Content::Comment(_)))
    }
}

/// XML content node
#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Element(Element),
    /// Character data with entities decoded; CDATA sections are merged in
    Text(String),
    Comment(String),
}
