//! Incremental tokenizer for dump text.
//!
//! Reads straight from a [`BufRead`] one byte at a time through its internal
//! buffer, so a dump is never materialized as one contiguous string.

use std::fmt;
use std::io::{self, BufRead};

use super::error::{DumpError, DumpResult};
use super::group::GroupKind;

/// A lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `(`, `L(` or `R(`
    Open(GroupKind),
    /// `)`
    Close,
    /// `,`
    Comma,
    /// `\n`; only meaningful for line-oriented dumps
    Newline,
    /// Maximal run of anything else that is not whitespace
    Text(String),
}

/// A token and the byte offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: u64,
}

impl Token {
    fn new(kind: TokenKind, offset: u64) -> Self {
        Self { kind, offset }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Open(kind) => write!(f, "{}(", kind.prefix()),
            TokenKind::Close => f.write_str(")"),
            TokenKind::Comma => f.write_str(","),
            TokenKind::Newline => f.write_str("\\n"),
            TokenKind::Text(text) => f.write_str(text),
        }
    }
}

/// UTF-8 byte order mark, skipped at the very start of input.
pub(crate) const BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// True if `byte` is part of a byte order mark at absolute `offset`.
#[inline]
pub(crate) fn is_bom_byte(offset: u64, byte: u8) -> bool {
    offset < BOM.len() as u64 && BOM[offset as usize] == byte
}

#[inline]
fn is_delimiter(byte: u8) -> bool {
    matches!(byte, b'(' | b')' | b',') || byte.is_ascii_whitespace()
}

/// Streaming tokenizer over a buffered reader.
pub struct Tokenizer<R> {
    reader: R,
    offset: u64,
}

impl<R: BufRead> Tokenizer<R> {
    /// Creates a tokenizer positioned at byte 0.
    pub fn new(reader: R) -> Self {
        Self::starting_at(reader, 0)
    }

    /// Creates a tokenizer for a reader whose first `offset` bytes were
    /// already consumed, so reported offsets stay absolute.
    pub fn starting_at(reader: R, offset: u64) -> Self {
        Self { reader, offset }
    }

    /// Byte offset of the next unread byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns true when no bytes remain.
    pub fn at_eof(&mut self) -> DumpResult<bool> {
        Ok(self.peek()?.is_none())
    }

    fn peek(&mut self) -> DumpResult<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok(buf) => return Ok(buf.first().copied()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(DumpError::Io {
                        offset: self.offset,
                        source,
                    })
                }
            }
        }
    }

    #[inline]
    fn bump(&mut self) {
        self.reader.consume(1);
        self.offset += 1;
    }

    /// Reads the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> DumpResult<Option<Token>> {
        loop {
            let Some(byte) = self.peek()? else {
                return Ok(None);
            };
            let offset = self.offset;
            let kind = match byte {
                b'\n' => TokenKind::Newline,
                b'(' => TokenKind::Open(GroupKind::Plain),
                b')' => TokenKind::Close,
                b',' => TokenKind::Comma,
                b if b.is_ascii_whitespace() || is_bom_byte(offset, b) => {
                    self.bump();
                    continue;
                }
                _ => return self.text(offset).map(Some),
            };
            self.bump();
            return Ok(Some(Token::new(kind, offset)));
        }
    }

    fn text(&mut self, offset: u64) -> DumpResult<Token> {
        let mut raw = Vec::new();
        while let Some(byte) = self.peek()? {
            if is_delimiter(byte) {
                break;
            }
            raw.push(byte);
            self.bump();
        }

        // `L(` and `R(` are single tokens
        if self.peek()? == Some(b'(') {
            let kind = match raw.as_slice() {
                b"L" => Some(GroupKind::Leaf),
                b"R" => Some(GroupKind::Rect),
                _ => None,
            };
            if let Some(kind) = kind {
                self.bump();
                return Ok(Token::new(TokenKind::Open(kind), offset));
            }
        }

        Ok(Token::new(
            TokenKind::Text(String::from_utf8_lossy(&raw).into_owned()),
            offset,
        ))
    }
}

impl<R: BufRead> Iterator for Tokenizer<R> {
    type Item = DumpResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Tokenizer::new(input.as_bytes())
            .map(|t| t.unwrap().kind)
            .collect()
    }

    fn text(s: &str) -> TokenKind {
        TokenKind::Text(s.to_string())
    }

    #[test]
    fn test_leading_bom_is_skipped() {
        let toks: Vec<Token> = Tokenizer::new("\u{feff}L()".as_bytes())
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(toks[0], Token::new(TokenKind::Open(GroupKind::Leaf), 3));
        assert_eq!(toks.len(), 2);
    }

    #[test]
    fn test_starting_offset_is_kept() {
        let mut tokens = Tokenizer::starting_at("(1,2)".as_bytes(), 100);
        assert_eq!(tokens.next_token().unwrap().unwrap().offset, 100);
        assert_eq!(tokens.offset(), 101);
    }

    #[test]
    fn test_point_tokens() {
        assert_eq!(
            kinds("(1,-2)"),
            vec![
                TokenKind::Open(GroupKind::Plain),
                text("1"),
                TokenKind::Comma,
                text("-2"),
                TokenKind::Close,
            ]
        );
    }

    #[test]
    fn test_prefixed_opens() {
        assert_eq!(
            kinds("L(R(1, 2, 3, 4), )"),
            vec![
                TokenKind::Open(GroupKind::Leaf),
                TokenKind::Open(GroupKind::Rect),
                text("1"),
                TokenKind::Comma,
                text("2"),
                TokenKind::Comma,
                text("3"),
                TokenKind::Comma,
                text("4"),
                TokenKind::Close,
                TokenKind::Comma,
                TokenKind::Close,
            ]
        );
    }

    #[test]
    fn test_letter_without_paren_is_text() {
        assert_eq!(kinds("L R"), vec![text("L"), text("R")]);
        assert_eq!(
            kinds("Leaf("),
            vec![text("Leaf"), TokenKind::Open(GroupKind::Plain)]
        );
    }

    #[test]
    fn test_whitespace_skipped_but_newline_kept() {
        assert_eq!(
            kinds(" 2 \r\n\t3\n"),
            vec![text("2"), TokenKind::Newline, text("3"), TokenKind::Newline]
        );
    }

    #[test]
    fn test_offsets() {
        let offsets: Vec<u64> = Tokenizer::new("  (12, 3)".as_bytes())
            .map(|t| t.unwrap().offset)
            .collect();
        assert_eq!(offsets, vec![2, 3, 5, 7, 8]);
    }

    #[test]
    fn test_prefixed_open_offset_points_at_letter() {
        let tokens: Vec<Token> = Tokenizer::new(" R(".as_bytes())
            .map(|t| t.unwrap())
            .collect();
        assert_eq!(tokens, vec![Token::new(TokenKind::Open(GroupKind::Rect), 1)]);
    }

    #[test]
    fn test_empty_input() {
        let mut tokenizer = Tokenizer::new("".as_bytes());
        assert!(tokenizer.at_eof().unwrap());
        assert!(tokenizer.next_token().unwrap().is_none());
    }

    #[test]
    fn test_small_buffer_reads_across_refills() {
        let reader = std::io::BufReader::with_capacity(2, "(123,456)".as_bytes());
        let kinds: Vec<TokenKind> = Tokenizer::new(reader).map(|t| t.unwrap().kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Open(GroupKind::Plain),
                text("123"),
                TokenKind::Comma,
                text("456"),
                TokenKind::Close,
            ]
        );
    }

    #[test]
    fn test_io_error_reports_offset() {
        struct Failing;
        impl std::io::Read for Failing {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
            }
        }

        let mut tokenizer = Tokenizer::new(std::io::BufReader::new(Failing));
        let err = tokenizer.next_token().unwrap_err();
        assert!(matches!(err, DumpError::Io { offset: 0, .. }));
    }

    #[test]
    fn test_token_display() {
        assert_eq!(TokenKind::Open(GroupKind::Leaf).to_string(), "L(");
        assert_eq!(TokenKind::Newline.to_string(), "\\n");
        assert_eq!(text("42").to_string(), "42");
    }
}
