//! dotxml - dot-notation access to XML documents
//!
//! An XML document is turned into a tree of [`Node`]s (elements with child
//! elements), [`List`]s (repeated sibling elements) and scalar leaves, which
//! is then queried with paths like `profile.message.point[1].name`.
//!
//! # Quick Start
//!
//! ```
//! use dotxml::{from_str, Value};
//! # fn main() -> Result<(), dotxml::Error> {
//! let root = from_str(r#"<p id="7"><name>pump</name><c0>125</c0><c0>88</c0></p>"#)?;
//!
//! assert_eq!(root.resolve("p.name"), Some(&Value::from("pump")));
//! assert_eq!(root.resolve("p.c0[1]"), Some(&Value::Integer(88)));
//! assert_eq!(root.resolve("p.attr.id"), Some(&Value::from("7")));
//! assert_eq!(root.resolve("p.missing.deeper"), None);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use std::path::Path;

use tracing::{debug, instrument};

pub mod builder;
pub use builder::{build, TreeBuilder, ATTR_KEY, TEXT_KEY};

pub mod coerce;
pub use coerce::coerce;

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod path;
pub use path::Segment;

pub mod profile;
pub use profile::{ProfileStore, Reading};

pub mod value;
pub use value::{List, Node, Value};

pub mod xml;
pub use xml::{
    Config, Content as XmlContent, Document as XmlDocument, Element as XmlElement,
    Parser as XmlParser, DEPTH_CEILING,
};

/// Parse XML from string and build its tree
pub fn from_str(s: &str) -> Result<Node> {
    from_bytes(s.as_bytes())
}

/// Parse XML from bytes and build its tree
pub fn from_bytes(bytes: &[u8]) -> Result<Node> {
    from_bytes_with_config(bytes, Config::default())
}

/// Parse with custom parser limits
pub fn from_str_with_config(s: &str, config: Config) -> Result<Node> {
    from_bytes_with_config(s.as_bytes(), config)
}

/// Parse bytes with custom parser limits
pub fn from_bytes_with_config(bytes: &[u8], config: Config) -> Result<Node> {
    let document = XmlParser::with_config(bytes, config).parse()?;
    Ok(build(&document))
}

/// Read an XML file and build its tree
pub fn from_file(path: impl AsRef<Path>) -> Result<Node> {
    from_file_with_config(path, Config::default())
}

/// Read an XML file with custom parser limits
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn from_file_with_config(path: impl AsRef<Path>, config: Config) -> Result<Node> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::io(path.display().to_string(), &e))?;
    debug!(bytes = bytes.len(), "file read");
    from_bytes_with_config(&bytes, config)
}

/// Parse XML from string without building a tree
pub fn parse_xml(s: &str) -> Result<XmlDocument> {
    XmlParser::new(s.as_bytes()).parse()
}
