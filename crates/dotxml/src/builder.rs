//! Document to tree conversion
//!
//! Every element becomes an entry in its parent's [`Node`], keyed by tag
//! name. What the entry holds depends on the element's content:
//!
//! - no content, or a single run of text: a scalar from [`coerce`];
//! - anything else: a nested `Node`, with attributes under [`ATTR_KEY`].
//!   The attribute node is never merged into a list: child elements named
//!   `attr` are dropped when the element has attributes.
//!
//! Sibling elements sharing a name are collected into a [`List`] in document
//! order (see [`Node`]'s promotion rule).
//!
//! [`List`]: crate::value::List

use tracing::{debug, instrument, trace};

use crate::coerce::coerce;
use crate::value::{Node, Value};
use crate::xml::{Content, Document, Element};

/// Key holding an element's attributes
pub const ATTR_KEY: &str = "attr";

/// Key holding text that sits next to child elements
pub const TEXT_KEY: &str = "#text";

/// Builds trees from parsed documents
#[derive(Debug, Default)]
pub struct TreeBuilder {
    elements: usize,
    promotions: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the tree for a whole document.
    ///
    /// The result has a single entry named after the root element, or none
    /// for a document without elements.
    #[instrument(level = "debug", skip_all)]
    pub fn build(&mut self, document: &Document) -> Node {
        let mut root = Node::new();
        if let Some(element) = &document.root {
            let value = self.value_of(element);
            self.insert(&mut root, &element.name, value);
        }
        debug!(
            elements = self.elements,
            promotions = self.promotions,
            "tree built"
        );
        root
    }

    /// Build the node for one element from its attributes and children.
    ///
    /// Unlike [`TreeBuilder::build`] this always yields a `Node`, even for an
    /// element whose only content is text.
    pub fn build_element(&mut self, element: &Element) -> Node {
        let mut node = Node::new();

        if !element.attributes.is_empty() {
            let attrs = element
                .attributes
                .iter()
                .map(|(name, value)| (name.clone(), Value::String(value.clone())))
                .collect();
            node.set(ATTR_KEY, Value::Node(attrs));
        }

        let has_attrs = node.contains_key(ATTR_KEY);
        for child in element.content() {
            match child {
                Content::Element(child) if has_attrs && child.name == ATTR_KEY => {
                    trace!("child element shadowed by attributes");
                }
                Content::Element(child) => {
                    let value = self.value_of(child);
                    self.insert(&mut node, &child.name, value);
                }
                Content::Text(text) => self.insert(&mut node, TEXT_KEY, coerce(text)),
                Content::Comment(_) => {}
            }
        }

        node
    }

    /// Number of elements visited so far
    pub fn elements(&self) -> usize {
        self.elements
    }

    /// Number of keys promoted to lists so far
    pub fn promotions(&self) -> usize {
        self.promotions
    }

    fn value_of(&mut self, element: &Element) -> Value {
        self.elements += 1;

        let mut content = element.content();
        match (content.next(), content.next()) {
            (None, _) => coerce(""),
            (Some(Content::Text(text)), None) => coerce(text),
            _ => Value::Node(self.build_element(element)),
        }
    }

    fn insert(&mut self, node: &mut Node, name: &str, value: Value) {
        if node.append(name, value) {
            trace!(name, "repeated element promoted to list");
            self.promotions += 1;
        }
    }
}

/// Build the tree for `document` with a fresh [`TreeBuilder`]
pub fn build(document: &Document) -> Node {
    TreeBuilder::new().build(document)
}
