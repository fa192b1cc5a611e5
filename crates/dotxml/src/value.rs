//! Tree types built from XML documents
//!
//! A built tree is made of three kinds of values:
//!
//! - [`Node`]: an ordered map from element (or attribute) name to value. The
//!   reserved key `attr` holds the element's attributes as another `Node`.
//! - [`List`]: the values of repeated sibling elements, in document order.
//!   Lists never contain lists.
//! - scalars: integer, float, boolean, string and null leaves.

use indexmap::map::{Entry, Iter, Keys, Values};
use indexmap::IndexMap;
use std::fmt;

/// A value in a built tree
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null leaf (empty element, or text `null`)
    #[default]
    Null,
    /// Boolean leaf
    Bool(bool),
    /// 64-bit integer leaf
    Integer(i64),
    /// Floating point leaf
    Float(f64),
    /// Text leaf that is none of the above
    String(String),
    /// Repeated sibling elements
    List(List),
    /// Element with child elements
    Node(Node),
}

impl Value {
    /// Returns true if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true for every leaf kind, including null
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Node(_))
    }

    /// Returns true if this value is a list
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Returns true if this value is a node
    pub fn is_node(&self) -> bool {
        matches!(self, Self::Node(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the numeric value of an integer or float leaf
    #[allow(clippy::as_conversions, clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Self::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Node(_) => "node",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<List> for Value {
    fn from(value: List) -> Self {
        Self::List(value)
    }
}

impl From<Node> for Value {
    fn from(value: Node) -> Self {
        Self::Node(value)
    }
}

/// Scalars print as their plain text; nodes and lists print as compact JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::List(_) | Self::Node(_) => write_json(f, self),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_node_json(f, self)
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list_json(f, self)
    }
}

fn write_json(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::Null => f.write_str("null"),
        Value::Bool(b) => write!(f, "{b}"),
        Value::Integer(n) => write!(f, "{n}"),
        Value::Float(n) if n.is_finite() => write!(f, "{n}"),
        Value::Float(_) => f.write_str("null"),
        Value::String(s) => write_json_string(f, s),
        Value::List(list) => write_list_json(f, list),
        Value::Node(node) => write_node_json(f, node),
    }
}

fn write_node_json(f: &mut fmt::Formatter<'_>, node: &Node) -> fmt::Result {
    f.write_str("{")?;
    for (i, (key, value)) in node.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write_json_string(f, key)?;
        f.write_str(":")?;
        write_json(f, value)?;
    }
    f.write_str("}")
}

fn write_list_json(f: &mut fmt::Formatter<'_>, list: &List) -> fmt::Result {
    f.write_str("[")?;
    for (i, value) in list.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write_json(f, value)?;
    }
    f.write_str("]")
}

fn write_json_string(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04x}", u32::from(c))?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

/// Ordered map of element names to values
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node(IndexMap<String, Value>);

impl Node {
    /// Creates a new empty node
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Direct child lookup by exact key (no path syntax)
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> Keys<'_, String, Value> {
        self.0.keys()
    }

    pub fn values(&self) -> Values<'_, String, Value> {
        self.0.values()
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Adds `value` under `key`, promoting to a list on repeated keys.
    ///
    /// The first occurrence is stored as is. The second replaces it, in place,
    /// with a two-element list; later occurrences append to that list.
    /// Returns true when this call performed the promotion.
    pub(crate) fn append(&mut self, key: &str, value: Value) -> bool {
        match self.0.entry(key.to_owned()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                false
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::List(list) => {
                    list.0.push(value);
                    false
                }
                existing => {
                    let first = std::mem::take(existing);
                    *existing = Value::List(List(vec![first, value]));
                    true
                }
            },
        }
    }

    /// Removes `key`, handing back its value
    pub(crate) fn take(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Sets `key` unconditionally; used for the attribute node
    pub(crate) fn set(&mut self, key: &str, value: Value) {
        self.0.insert(key.to_owned(), value);
    }
}

impl<'a> IntoIterator for &'a Node {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Node {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(String, Value)> for Node {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(IndexMap::from_iter(iter))
    }
}

/// Values of repeated sibling elements, in document order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct List(Vec<Value>);

impl List {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Element at `index`, or `None` when out of range
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn first(&self) -> Option<&Value> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&Value> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(feature = "serde")]
mod ser {
    use super::{List, Node, Value};
    use serde::{Serialize, Serializer};

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Self::Null => serializer.serialize_unit(),
                Self::Bool(b) => serializer.serialize_bool(*b),
                Self::Integer(n) => serializer.serialize_i64(*n),
                Self::Float(n) => serializer.serialize_f64(*n),
                Self::String(s) => serializer.serialize_str(s),
                Self::List(list) => list.serialize(serializer),
                Self::Node(node) => node.serialize(serializer),
            }
        }
    }

    impl Serialize for Node {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_map(self.iter())
        }
    }

    impl Serialize for List {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self.iter())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(pairs: &[(&str, Value)]) -> Node {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_value_kind_checks() {
        assert!(Value::Null.is_null());
        assert!(Value::Null.is_scalar());
        assert!(Value::Integer(1).is_scalar());
        assert!(!Value::List(List::default()).is_scalar());
        assert!(Value::Node(Node::new()).is_node());
        assert_eq!(Value::Float(1.5).kind(), "float");
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Integer(125).as_i64(), Some(125));
        assert_eq!(Value::Integer(125).as_f64(), Some(125.0));
        assert_eq!(Value::Float(0.6218).as_f64(), Some(0.6218));
        assert_eq!(Value::Float(0.6218).as_i64(), None);
        assert_eq!(Value::from("pump").as_str(), Some("pump"));
        assert_eq!(Value::Null.as_str(), None);
        assert!(Value::Null.as_node().is_none());
    }

    #[test]
    fn test_append_promotes_once() {
        let mut n = Node::new();
        assert!(!n.append("b", Value::Integer(1)));
        assert!(n.append("b", Value::Integer(2)));
        assert!(!n.append("b", Value::Integer(3)));

        let list = n.get("b").and_then(Value::as_list);
        assert_eq!(list.map(List::len), Some(3));
        assert_eq!(list.and_then(|l| l.get(2)), Some(&Value::Integer(3)));
        assert!(list.is_some_and(|l| l.iter().all(|v| !v.is_list())));
    }

    #[test]
    fn test_promotion_keeps_key_position() {
        let mut n = Node::new();
        n.append("a", Value::Integer(1));
        n.append("b", Value::Integer(2));
        n.append("a", Value::Integer(3));

        let keys: Vec<_> = n.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Integer(-7).to_string(), "-7");
        assert_eq!(Value::Float(12.5).to_string(), "12.5");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::from("a \"b\"").to_string(), "a \"b\"");
        assert_eq!(Value::Null.to_string(), "null");
    }

    #[test]
    fn test_display_containers_as_json() {
        let mut inner = Node::new();
        inner.append("x", Value::from("a\"b"));
        inner.append("x", Value::Null);
        let outer = node(&[("p", Value::Node(inner)), ("n", Value::Integer(1))]);

        assert_eq!(outer.to_string(), r#"{"p":{"x":["a\"b",null]},"n":1}"#);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_matches_display() -> Result<(), Box<dyn std::error::Error>> {
        let mut n = Node::new();
        n.append("name", Value::from("pump"));
        n.append("c0", Value::Integer(125));
        n.append("c1", Value::Float(0.5));
        n.append("on", Value::Bool(true));
        n.append("none", Value::Null);

        let json = serde_json::to_string(&n)?;
        assert_eq!(json, n.to_string());
        Ok(())
    }
}
