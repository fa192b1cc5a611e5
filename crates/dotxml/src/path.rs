//! Dotted path lookup
//!
//! A path is a `.`-separated list of segments, each a key optionally followed
//! by one `[index]`: `profile.message.conversion.point[1].name`.
//!
//! Resolution peels one segment at a time. Any miss along the way (unknown
//! key, indexing something that is not a list, bad or out of range index,
//! descending into a scalar) ends the walk with `None`. Lists can only be
//! entered through an index.

use crate::value::{Node, Value};

/// One step of a path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'p> {
    /// Plain key: `name`
    Key(&'p str),
    /// Indexed key: `name[3]`; `index` is `None` when the brackets do not
    /// hold a non-negative integer
    Index { name: &'p str, index: Option<usize> },
}

impl<'p> Segment<'p> {
    pub fn parse(segment: &'p str) -> Self {
        let Some((name, suffix)) = segment.split_once('[') else {
            return Self::Key(segment);
        };
        let index = suffix
            .strip_suffix(']')
            .and_then(|digits| digits.trim().parse::<usize>().ok());
        Self::Index { name, index }
    }
}

/// Split off the first segment; `rest` is `None` when there is no `.`
fn peel(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

impl Node {
    /// Resolve `path` below this node. `None` means the path leads nowhere;
    /// a null leaf that exists resolves to `Some(&Value::Null)`.
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        let (head, rest) = peel(path);
        let found = match Segment::parse(head) {
            Segment::Key(key) => self.get(key)?,
            Segment::Index { name, index } => self.get(name)?.as_list()?.get(index?)?,
        };
        match rest {
            None => Some(found),
            Some(rest) => found.resolve(rest),
        }
    }

    /// Like [`Node::resolve`], but returns `default` when the path is missing
    /// or resolves to null. The two cases cannot be told apart here.
    pub fn resolve_or<'a>(&'a self, path: &str, default: &'a Value) -> &'a Value {
        or_default(self.resolve(path), default)
    }
}

impl Value {
    /// Resolve `path` below this value; only nodes have anything below them
    pub fn resolve(&self, path: &str) -> Option<&Value> {
        match self {
            Self::Node(node) => node.resolve(path),
            _ => None,
        }
    }

    /// See [`Node::resolve_or`]
    pub fn resolve_or<'a>(&'a self, path: &str, default: &'a Value) -> &'a Value {
        or_default(self.resolve(path), default)
    }
}

fn or_default<'a>(found: Option<&'a Value>, default: &'a Value) -> &'a Value {
    match found {
        Some(value) if !value.is_null() => value,
        _ => default,
    }
}
