//! Section-by-section readers for both dump dialects.

use std::io::{self, BufRead};

use tracing::warn;

use super::error::{DumpError, DumpResult};
use super::grammar::{leaf_from_group, line_from_group, point_from_group, rect_from_group};
use super::group::{Group, GroupKind, GroupScanner, SectionEnd};
use super::token::{is_bom_byte, TokenKind, Tokenizer};
use super::types::{Dialect, Leaf, LineSegment};
use crate::coord::PlanarPoint;

/// The two leading values of a tree dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeHeader {
    pub depth: i64,
    pub leaf_count: i64,
}

/// Reads a tree dump one line at a time.
///
/// Call [`read_header`](Self::read_header), then [`points`](Self::points),
/// then [`lines`](Self::lines), then [`finish`](Self::finish). Each body line
/// is streamed group by group, so callers decide how much to keep in memory.
pub struct TreeDumpReader<R> {
    scanner: GroupScanner<R>,
    exhausted: bool,
}

impl<R: BufRead> TreeDumpReader<R> {
    pub fn new(reader: R) -> Self {
        Self::starting_at(reader, 0)
    }

    /// Reader over input whose first `offset` bytes were already consumed.
    pub fn starting_at(reader: R, offset: u64) -> Self {
        Self {
            scanner: GroupScanner::new(Tokenizer::starting_at(reader, offset), true),
            exhausted: false,
        }
    }

    /// Reads the depth and leaf count lines.
    pub fn read_header(&mut self) -> DumpResult<TreeHeader> {
        let depth = self.header_line(1, "depth header line")?;
        let leaf_count = self.header_line(2, "leaf count header line")?;
        Ok(TreeHeader { depth, leaf_count })
    }

    fn header_line(&mut self, line: usize, expected: &'static str) -> DumpResult<i64> {
        let start = self.scanner.offset();
        let tokens = self.scanner.tokens_mut();
        if self.exhausted || tokens.at_eof()? {
            return Err(DumpError::TruncatedInput {
                offset: start,
                expected,
            });
        }

        let mut parts: Vec<TokenKind> = Vec::new();
        let mut offset = start;
        loop {
            match tokens.next_token()? {
                None => {
                    self.exhausted = true;
                    break;
                }
                Some(token) if token.kind == TokenKind::Newline => break,
                Some(token) => {
                    if parts.is_empty() {
                        offset = token.offset;
                    }
                    parts.push(token.kind);
                    if parts.len() > 1 {
                        break;
                    }
                }
            }
        }

        let reason = || format!("header line {} is not an integer", line);
        match parts.as_slice() {
            [TokenKind::Text(text)] => text
                .parse::<i64>()
                .map_err(|_| DumpError::malformed(offset, text, reason())),
            _ => {
                let shown: String = parts.iter().map(|k| k.to_string()).collect();
                Err(DumpError::malformed(offset, &shown, reason()))
            }
        }
    }

    fn begin_body(&mut self, expected: &'static str) -> DumpResult<()> {
        if self.exhausted || self.scanner.tokens_mut().at_eof()? {
            return Err(DumpError::TruncatedInput {
                offset: self.scanner.offset(),
                expected,
            });
        }
        self.scanner.begin_section();
        Ok(())
    }

    /// Streams the point list line.
    pub fn points(&mut self) -> DumpResult<Section<'_, R, PlanarPoint>> {
        self.begin_body("point list line")?;
        Ok(Section::new(self, point_from_group))
    }

    /// Streams the line list line.
    pub fn lines(&mut self) -> DumpResult<Section<'_, R, LineSegment>> {
        self.begin_body("line list line")?;
        Ok(Section::new(self, line_from_group))
    }

    /// Collects the point list line.
    pub fn read_points(&mut self) -> DumpResult<Vec<PlanarPoint>> {
        self.points()?.collect()
    }

    /// Collects the line list line.
    pub fn read_lines(&mut self) -> DumpResult<Vec<LineSegment>> {
        self.lines()?.collect()
    }

    /// Checks what follows the line list.
    ///
    /// Blank lines are fine. Anything else is ignored with a warning.
    pub fn finish(mut self) -> DumpResult<()> {
        if self.exhausted {
            return Ok(());
        }
        let tokens = self.scanner.tokens_mut();
        while let Some(token) = tokens.next_token()? {
            if token.kind != TokenKind::Newline {
                warn!(
                    offset = token.offset,
                    token = %token.kind,
                    "Ignoring content after the line list"
                );
                break;
            }
        }
        Ok(())
    }
}

/// Streams one body line of a tree dump.
///
/// Yields geometry until the line ends; the first error ends the stream.
pub struct Section<'a, R, T> {
    reader: &'a mut TreeDumpReader<R>,
    assemble: fn(&Group) -> DumpResult<T>,
    done: bool,
}

impl<'a, R: BufRead, T> Section<'a, R, T> {
    fn new(reader: &'a mut TreeDumpReader<R>, assemble: fn(&Group) -> DumpResult<T>) -> Self {
        Self {
            reader,
            assemble,
            done: false,
        }
    }
}

impl<R: BufRead, T> Iterator for Section<'_, R, T> {
    type Item = DumpResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = match self.reader.scanner.next_group() {
            Ok(Some(group)) => (self.assemble)(&group),
            Ok(None) => {
                self.done = true;
                if self.reader.scanner.section_end() == Some(SectionEnd::Eof) {
                    self.reader.exhausted = true;
                }
                return None;
            }
            Err(e) => Err(e),
        };
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

/// Streams the leaves of a leaf dump in file order.
///
/// An `R(...)` written after a closed leaf still belongs to that leaf, up to
/// the next `L(`. A rectangle before the first leaf is an error.
pub struct LeafDumpReader<R> {
    scanner: GroupScanner<R>,
    /// Last leaf read, held back until the next `L(` or end of input
    open: Option<Leaf>,
    done: bool,
}

impl<R: BufRead> LeafDumpReader<R> {
    pub fn new(reader: R) -> Self {
        Self::starting_at(reader, 0)
    }

    /// Reader over input whose first `offset` bytes were already consumed.
    pub fn starting_at(reader: R, offset: u64) -> Self {
        Self {
            scanner: GroupScanner::new(Tokenizer::starting_at(reader, offset), false),
            open: None,
            done: false,
        }
    }

    fn advance(&mut self) -> DumpResult<Option<Leaf>> {
        while let Some(group) = self.scanner.next_group()? {
            if group.kind == GroupKind::Rect {
                let Some(leaf) = self.open.as_mut() else {
                    return Err(DumpError::malformed(
                        group.offset,
                        &group.to_string(),
                        "rectangle before the first leaf",
                    ));
                };
                leaf.rects.push(rect_from_group(&group)?);
            } else {
                let leaf = leaf_from_group(&group)?;
                if let Some(previous) = self.open.replace(leaf) {
                    return Ok(Some(previous));
                }
            }
        }
        Ok(self.open.take())
    }
}

impl<R: BufRead> Iterator for LeafDumpReader<R> {
    type Item = DumpResult<Leaf>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.advance().transpose();
        if !matches!(result, Some(Ok(_))) {
            self.done = true;
        }
        result
    }
}

/// Where a dump starts and which dialect it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detected {
    pub dialect: Dialect,
    /// Leading bytes consumed while looking; pass to `starting_at`
    pub offset: u64,
}

/// Guesses the dialect from the first significant byte.
///
/// A leaf dump starts with `L`; everything else, including empty input, is
/// treated as a tree dump. Whitespace and a UTF-8 byte order mark are
/// skipped. Bytes are only consumed when a whole buffer holds nothing but
/// those, so typical input is left untouched.
pub fn detect_dialect<R: BufRead>(reader: &mut R) -> io::Result<Detected> {
    let mut offset = 0u64;
    loop {
        let (first, len) = match reader.fill_buf() {
            Ok(buf) => {
                let first = buf.iter().enumerate().find_map(|(i, &b)| {
                    let skip = b.is_ascii_whitespace() || is_bom_byte(offset + i as u64, b);
                    (!skip).then_some(b)
                });
                (first, buf.len())
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        if first.is_some() || len == 0 {
            let dialect = match first {
                Some(b'L') => Dialect::Leaves,
                _ => Dialect::Tree,
            };
            return Ok(Detected { dialect, offset });
        }
        reader.consume(len);
        offset += len as u64;
    }
}
