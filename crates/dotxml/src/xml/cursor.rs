//! Byte cursor with line/column tracking

use crate::error::Pos;

#[derive(Clone, Debug)]
pub(crate) struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    pub(crate) const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    pub(crate) fn current(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    pub(crate) fn starts_with(&self, pattern: &[u8]) -> bool {
        self.rest().starts_with(pattern)
    }

    pub(crate) fn advance(&mut self) {
        if let Some(b) = self.current() {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
                self.col = 1;
            } else if b & 0xC0 != 0x80 {
                // continuation bytes do not start a new column
                self.col += 1;
            }
        }
    }

    pub(crate) fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    /// Consume `pattern` if the input continues with it
    pub(crate) fn eat(&mut self, pattern: &[u8]) -> bool {
        if self.starts_with(pattern) {
            self.advance_by(pattern.len());
            true
        } else {
            false
        }
    }

    /// Returns true if any whitespace was skipped
    pub(crate) fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while let Some(b' ' | b'\t' | b'\r' | b'\n') = self.current() {
            self.advance();
        }
        self.pos > start
    }

    /// Consume up to and including `pattern`, returning the bytes before it.
    /// Returns `None` (with the rest of the input consumed) if it never occurs.
    pub(crate) fn take_until(&mut self, pattern: &[u8]) -> Option<&'a [u8]> {
        let start = self.pos;
        while !self.is_eof() {
            if self.starts_with(pattern) {
                let body = self.slice_from(start);
                self.advance_by(pattern.len());
                return Some(body);
            }
            self.advance();
        }
        None
    }

    pub(crate) const fn position(&self) -> Pos {
        Pos::new(self.pos, self.line, self.col)
    }

    pub(crate) const fn offset(&self) -> usize {
        self.pos
    }

    pub(crate) const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    pub(crate) fn slice_from(&self, start: usize) -> &'a [u8] {
        self.input.get(start..self.pos).unwrap_or_default()
    }

    fn rest(&self) -> &'a [u8] {
        self.input.get(self.pos..).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eat_and_position() {
        let mut cursor = Cursor::new(b"<?xml?>\n<a/>");
        assert!(cursor.eat(b"<?"));
        assert!(!cursor.eat(b"?>"));
        assert_eq!(cursor.take_until(b"?>"), Some(&b"xml"[..]));
        assert!(cursor.skip_whitespace());
        assert_eq!(cursor.position().line, 2);
        assert_eq!(cursor.position().col, 1);
        assert_eq!(cursor.current(), Some(b'<'));
    }

    #[test]
    fn test_take_until_missing_pattern() {
        let mut cursor = Cursor::new(b"<!-- never closed");
        assert_eq!(cursor.take_until(b"-->"), None);
        assert!(cursor.is_eof());
    }

    #[test]
    fn test_columns_count_chars() {
        let mut cursor = Cursor::new("é<".as_bytes());
        cursor.advance_by(2);
        assert_eq!(cursor.current(), Some(b'<'));
        assert_eq!(cursor.position().col, 2);
    }

    #[test]
    fn test_slice_from() {
        let mut cursor = Cursor::new(b"hello world");
        let start = cursor.offset();
        cursor.advance_by(5);
        assert_eq!(cursor.slice_from(start), b"hello");
    }
}
