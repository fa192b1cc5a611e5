//! Minimal XML parser producing the document tree the builder consumes

mod cursor;
pub mod model;
pub mod parser;

pub use model::{Content, Document, Element};
pub use parser::{Config, Parser, DEPTH_CEILING};
