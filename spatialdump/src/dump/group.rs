//! Balanced-delimiter scanning.
//!
//! Every dump grammar is built from parenthesised groups. The scanner here
//! knows nothing about points, lines or rectangles: it only pairs each open
//! with its matching close using a depth stack and hands back the nested
//! [`Group`] tree. Grammar code then checks the shape.

use std::fmt;
use std::io::BufRead;

use super::error::{excerpt, DumpError, DumpResult};
use super::token::{TokenKind, Tokenizer};

/// Deepest nesting the scanner accepts.
///
/// Real dumps never go past two levels.
pub const MAX_DEPTH: usize = 256;

/// The prefix a group was opened with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// `(`
    Plain,
    /// `L(`
    Leaf,
    /// `R(`
    Rect,
}

impl GroupKind {
    /// Text written before the open paren.
    pub fn prefix(&self) -> &'static str {
        match self {
            GroupKind::Plain => "",
            GroupKind::Leaf => "L",
            GroupKind::Rect => "R",
        }
    }
}

/// One element inside a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Group(Group),
    Scalar { text: String, offset: u64 },
    Separator,
}

/// A balanced group and everything between its delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub kind: GroupKind,
    /// Byte offset of the open token
    pub offset: u64,
    pub items: Vec<Item>,
}

impl Group {
    fn new(kind: GroupKind, offset: u64) -> Self {
        Self {
            kind,
            offset,
            items: Vec::new(),
        }
    }

    /// Items that are not separators.
    pub fn elements(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|i| !matches!(i, Item::Separator))
    }

    fn write_open(&self, out: &mut String) {
        out.push_str(self.kind.prefix());
        out.push('(');
        for item in &self.items {
            match item {
                Item::Group(group) => {
                    group.write_open(out);
                    out.push(')');
                }
                Item::Scalar { text, .. } => out.push_str(text),
                Item::Separator => out.push(','),
            }
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_open(&mut out);
        out.push(')');
        f.write_str(&out)
    }
}

/// Renders a stack of still-open groups, outermost first.
fn partial(stack: &[Group]) -> String {
    let mut out = String::new();
    for group in stack {
        group.write_open(&mut out);
    }
    out
}

/// How a section of top-level groups ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionEnd {
    /// A newline closed the section; more input may follow
    Newline,
    /// The input is exhausted
    Eof,
}

/// Pulls top-level groups out of a token stream.
///
/// In line-bounded mode a newline ends the current section, and a newline
/// inside an open group counts as an unmatched open. Otherwise newlines are
/// plain whitespace.
///
/// Stray text and commas between top-level groups are skipped.
pub struct GroupScanner<R> {
    tokens: Tokenizer<R>,
    line_bounded: bool,
    end: Option<SectionEnd>,
}

impl<R: BufRead> GroupScanner<R> {
    pub fn new(tokens: Tokenizer<R>, line_bounded: bool) -> Self {
        Self {
            tokens,
            line_bounded,
            end: None,
        }
    }

    /// Access to the underlying tokenizer, e.g. for header lines.
    pub fn tokens_mut(&mut self) -> &mut Tokenizer<R> {
        &mut self.tokens
    }

    /// Byte offset of the next unread byte.
    pub fn offset(&self) -> u64 {
        self.tokens.offset()
    }

    /// How the last section ended, once it has.
    pub fn section_end(&self) -> Option<SectionEnd> {
        self.end
    }

    /// Starts scanning the next line-bounded section.
    pub fn begin_section(&mut self) {
        self.end = None;
    }

    /// Returns the next top-level group of the current section.
    pub fn next_group(&mut self) -> DumpResult<Option<Group>> {
        if self.end.is_some() {
            return Ok(None);
        }
        loop {
            let Some(token) = self.tokens.next_token()? else {
                self.end = Some(SectionEnd::Eof);
                return Ok(None);
            };
            match token.kind {
                TokenKind::Open(kind) => return self.scan_group(kind, token.offset).map(Some),
                TokenKind::Close => {
                    return Err(DumpError::UnbalancedDelimiter {
                        offset: token.offset,
                        excerpt: ")".to_string(),
                    })
                }
                TokenKind::Newline if self.line_bounded => {
                    self.end = Some(SectionEnd::Newline);
                    return Ok(None);
                }
                TokenKind::Newline | TokenKind::Comma | TokenKind::Text(_) => {}
            }
        }
    }

    /// Reads until the group opened at `offset` is balanced.
    fn scan_group(&mut self, kind: GroupKind, offset: u64) -> DumpResult<Group> {
        let mut stack = vec![Group::new(kind, offset)];

        loop {
            let token = match self.tokens.next_token()? {
                Some(token) => token,
                None => return Err(unbalanced(&stack)),
            };

            match token.kind {
                TokenKind::Open(kind) => {
                    if stack.len() >= MAX_DEPTH {
                        return Err(DumpError::malformed(
                            stack[0].offset,
                            &partial(&stack),
                            format!("nesting deeper than {} levels", MAX_DEPTH),
                        ));
                    }
                    stack.push(Group::new(kind, token.offset));
                }
                TokenKind::Close => {
                    if let Some(done) = stack.pop() {
                        match stack.last_mut() {
                            Some(parent) => parent.items.push(Item::Group(done)),
                            None => return Ok(done),
                        }
                    }
                }
                TokenKind::Comma => push_item(&mut stack, Item::Separator),
                TokenKind::Text(text) => push_item(
                    &mut stack,
                    Item::Scalar {
                        text,
                        offset: token.offset,
                    },
                ),
                TokenKind::Newline if self.line_bounded => {
                    self.end = Some(SectionEnd::Newline);
                    return Err(unbalanced(&stack));
                }
                TokenKind::Newline => {}
            }
        }
    }
}

fn push_item(stack: &mut [Group], item: Item) {
    if let Some(top) = stack.last_mut() {
        top.items.push(item);
    }
}

fn unbalanced(stack: &[Group]) -> DumpError {
    DumpError::UnbalancedDelimiter {
        offset: stack.first().map(|g| g.offset).unwrap_or_default(),
        excerpt: excerpt(&partial(stack)),
    }
}

/// Scans all top-level groups in `reader`, ignoring newlines.
pub fn scan_groups<R: BufRead>(reader: R) -> DumpResult<Vec<Group>> {
    let mut scanner = GroupScanner::new(Tokenizer::new(reader), false);
    let mut groups = Vec::new();
    while let Some(group) = scanner.next_group()? {
        groups.push(group);
    }
    Ok(groups)
}
