//! XML parser implementation
//!
//! Checks well-formedness only: tags must nest and match, attribute names are
//! unique per element, entities must be known. DTDs are skipped, not applied.

use indexmap::IndexMap;
use tracing::trace;

use crate::error::{Error, ErrorKind, Pos, Result, Span};
use crate::xml::cursor::Cursor;
use crate::xml::model::{Content, Document, Element};

/// Nesting depth no configuration can go past; parser and builder recurse
/// once per level.
pub const DEPTH_CEILING: u16 = 256;

/// Configuration for the XML parser
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum element nesting depth (0 means [`DEPTH_CEILING`]; larger
    /// values are capped to it)
    pub max_depth: u16,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_size: 10 * 1024 * 1024, // 10 MB default
        }
    }
}

impl Config {
    /// Create a new config with unlimited size and the deepest nesting
    /// allowed
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
        }
    }

    /// Create a new config with specific limits
    pub const fn new(max_depth: u16, max_size: usize) -> Self {
        Self {
            max_depth,
            max_size,
        }
    }

    /// Nesting depth actually enforced
    pub const fn depth_limit(self) -> u16 {
        if self.max_depth == 0 || self.max_depth > DEPTH_CEILING {
            DEPTH_CEILING
        } else {
            self.max_depth
        }
    }
}

/// XML parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    config: Config,
    depth: u16,
    len: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration
    pub fn new(input: &'a [u8]) -> Self {
        Self::with_config(input, Config::default())
    }

    /// Create a new parser with custom configuration
    pub fn with_config(input: &'a [u8], config: Config) -> Self {
        Self {
            cursor: Cursor::new(input),
            config,
            depth: 0,
            len: input.len(),
        }
    }

    /// Parse an XML document
    pub fn parse(&mut self) -> Result<Document> {
        if self.config.max_size > 0 && self.len > self.config.max_size {
            return Err(Error::at(
                ErrorKind::MaxSizeExceeded {
                    max: self.config.max_size,
                },
                self.cursor.position(),
            ));
        }

        self.cursor.eat(b"\xEF\xBB\xBF");
        self.skip_misc()?;
        if self.cursor.is_eof() {
            trace!("document has no root element");
            return Ok(Document { root: None });
        }

        let root = self.parse_element()?;
        self.skip_misc()?;
        if !self.cursor.is_eof() {
            return Err(self.error_here(ErrorKind::InvalidToken, "content after root element"));
        }

        Ok(Document { root: Some(root) })
    }

    /// Skip whitespace, comments, processing instructions and DOCTYPE
    /// outside the root element
    fn skip_misc(&mut self) -> Result<()> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.eat(b"<?") {
                self.take_until(b"?>", "unterminated processing instruction")?;
            } else if self.cursor.eat(b"<!--") {
                self.take_until(b"-->", "unterminated comment")?;
            } else if self.cursor.starts_with(b"<!DOCTYPE") {
                self.skip_doctype()?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_doctype(&mut self) -> Result<()> {
        // internal subset may contain '>' inside brackets
        let mut brackets = 0usize;
        while let Some(b) = self.cursor.current() {
            self.cursor.advance();
            match b {
                b'[' => brackets += 1,
                b']' => brackets = brackets.saturating_sub(1),
                b'>' if brackets == 0 => return Ok(()),
                _ => {}
            }
        }
        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated doctype"))
    }

    fn parse_element(&mut self) -> Result<Element> {
        self.enter()?;
        self.expect_byte(b'<')?;

        let name = self.parse_name()?;
        let attributes = self.parse_attributes()?;

        if self.cursor.eat(b"/>") {
            self.leave();
            return Ok(Element {
                name,
                attributes,
                children: Vec::new(),
            });
        }
        self.expect_byte(b'>')?;

        let children = self.parse_content(&name)?;
        self.leave();

        Ok(Element {
            name,
            attributes,
            children,
        })
    }

    fn parse_content(&mut self, name: &str) -> Result<Vec<Content>> {
        let mut children = Vec::new();
        let mut text = String::new();

        loop {
            if self.cursor.is_eof() {
                return Err(self.error_here(
                    ErrorKind::UnexpectedEof,
                    &format!("unterminated element <{name}>"),
                ));
            }

            if self.cursor.starts_with(b"</") {
                let pos = self.cursor.position();
                self.cursor.advance_by(2);
                let close = self.parse_name()?;
                self.cursor.skip_whitespace();
                self.expect_byte(b'>')?;
                if close != name {
                    return Err(Error::at(
                        ErrorKind::MismatchedTag {
                            expected: name.to_string(),
                            found: close,
                        },
                        pos,
                    ));
                }
                break;
            }

            if self.cursor.eat(b"<!--") {
                flush_text(&mut text, &mut children);
                let body = self.take_until(b"-->", "unterminated comment")?;
                children.push(Content::Comment(self.to_str(body)?.to_string()));
            } else if self.cursor.eat(b"<![CDATA[") {
                let body = self.take_until(b"]]>", "unterminated CDATA section")?;
                text.push_str(self.to_str(body)?);
            } else if self.cursor.eat(b"<?") {
                self.take_until(b"?>", "unterminated processing instruction")?;
            } else if self.cursor.current() == Some(b'<') {
                flush_text(&mut text, &mut children);
                children.push(Content::Element(self.parse_element()?));
            } else {
                let chunk = self.parse_char_data()?;
                text.push_str(&chunk);
            }
        }

        flush_text(&mut text, &mut children);
        Ok(children)
    }

    fn parse_char_data(&mut self) -> Result<String> {
        let pos = self.cursor.position();
        let start = self.cursor.offset();
        while let Some(b) = self.cursor.current() {
            if b == b'<' {
                break;
            }
            self.cursor.advance();
        }
        let raw = self.to_str(self.cursor.slice_from(start))?;
        decode_entities(raw, pos)
    }

    fn parse_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            let spaced = self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b'/' | b'>') => break,
                Some(_) if !spaced => {
                    return Err(
                        self.error_here(ErrorKind::InvalidToken, "expected whitespace before attribute")
                    );
                }
                Some(_) => {}
                None => return Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated tag")),
            }

            let pos = self.cursor.position();
            let name = self.parse_name()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b'=')?;
            self.cursor.skip_whitespace();
            let value = self.parse_attribute_value()?;

            if attrs.contains_key(&name) {
                return Err(Error::at(ErrorKind::DuplicateAttribute { name }, pos));
            }
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn parse_attribute_value(&mut self) -> Result<String> {
        let quote = match self.cursor.current() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => {
                return Err(
                    self.error_here(ErrorKind::InvalidToken, "expected quoted attribute value")
                )
            }
        };
        self.cursor.advance();

        let pos = self.cursor.position();
        let start = self.cursor.offset();
        while let Some(b) = self.cursor.current() {
            if b == quote {
                let raw = self.to_str(self.cursor.slice_from(start))?;
                self.cursor.advance();
                return decode_entities(raw, pos);
            }
            if b == b'<' {
                return Err(self.error_here(ErrorKind::InvalidToken, "'<' in attribute value"));
            }
            self.cursor.advance();
        }

        Err(self.error_here(ErrorKind::UnexpectedEof, "unterminated attribute value"))
    }

    fn parse_name(&mut self) -> Result<String> {
        let start = self.cursor.offset();
        match self.cursor.current() {
            Some(b) if is_name_start(b) => self.cursor.advance(),
            Some(_) => return Err(self.error_here(ErrorKind::InvalidToken, "expected name")),
            None => return Err(self.error_here(ErrorKind::UnexpectedEof, "expected name")),
        }
        while let Some(b) = self.cursor.current() {
            if !is_name_char(b) {
                break;
            }
            self.cursor.advance();
        }
        Ok(self.to_str(self.cursor.slice_from(start))?.to_string())
    }

    fn take_until(&mut self, pattern: &[u8], message: &str) -> Result<&'a [u8]> {
        match self.cursor.take_until(pattern) {
            Some(body) => Ok(body),
            None => Err(self.error_here(ErrorKind::UnexpectedEof, message)),
        }
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        match self.cursor.current() {
            Some(b) if b == expected => {
                self.cursor.advance();
                Ok(())
            }
            Some(_) => Err(self.error_here(
                ErrorKind::InvalidToken,
                &format!("expected '{}'", char::from(expected)),
            )),
            None => Err(self.error_here(ErrorKind::UnexpectedEof, "unexpected end of input")),
        }
    }

    fn enter(&mut self) -> Result<()> {
        let max = self.config.depth_limit();
        if self.depth >= max {
            return Err(Error::at(
                ErrorKind::MaxDepthExceeded { max },
                self.cursor.position(),
            ));
        }
        self.depth = self.depth.saturating_add(1);
        Ok(())
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn to_str<'b>(&self, bytes: &'b [u8]) -> Result<&'b str> {
        std::str::from_utf8(bytes)
            .map_err(|_| Error::at(ErrorKind::InvalidUtf8, self.cursor.position()))
    }

    fn error_here(&self, kind: ErrorKind, message: &str) -> Error {
        let pos = self.cursor.position();
        Error::with_message(kind, Span::at(pos), message)
    }
}

fn flush_text(text: &mut String, children: &mut Vec<Content>) {
    if text.trim().is_empty() {
        text.clear();
    } else {
        children.push(Content::Text(std::mem::take(text)));
    }
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':') || b >= 0x80
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str, pos: Pos) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        let (before, after) = rest.split_at(amp);
        result.push_str(before);
        let after = after.strip_prefix('&').unwrap_or(after);

        let Some((entity, tail)) = after.split_once(';') else {
            return Err(invalid_entity(after, pos));
        };
        let decoded = match entity {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => decode_numeric_entity(entity),
        };
        match decoded {
            Some(ch) => result.push(ch),
            None => return Err(invalid_entity(entity, pos)),
        }
        rest = tail;
    }
    result.push_str(rest);

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}

fn invalid_entity(entity: &str, pos: Pos) -> Error {
    Error::at(
        ErrorKind::InvalidEntity {
            entity: entity.chars().take(16).collect(),
        },
        pos,
    )
}
