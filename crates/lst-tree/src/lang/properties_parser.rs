//! Lossless `.properties` parser

use super::properties::{Comment, CommentDelimiter, Delimiter, Entry, File, PropertiesPrinter, Value};
use crate::id::TreeId;
use crate::markers::Markers;
use crate::parse::{require_print_idempotent, Parser};
use crate::parse_error::ParseError;
use crate::tree::{SourceFile, SourceMeta, Tree};
use std::path::Path;
use std::sync::Arc;

/// Syntax errors the properties grammar can report
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertiesSyntaxError {
    #[error("line {line}: entry has an empty key")]
    EmptyKey { line: usize },

    #[error("line {line}: line continuation at end of input")]
    UnterminatedContinuation { line: usize },
}

/// Parses `.properties` files into [`File`] trees
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesParser;

impl PropertiesParser {
    pub const NAME: &'static str = "PropertiesParser";

    /// Parse without the idempotence check
    pub fn parse_file(source_path: &Path, text: &str) -> Result<File, PropertiesSyntaxError> {
        let (content, eof) = parse_content(text)?;
        Ok(File {
            id: TreeId::random(),
            source: SourceMeta::new(source_path).with_checksum_of(text),
            markers: Markers::empty(),
            content,
            eof,
        })
    }
}

impl Parser for PropertiesParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn extensions(&self) -> &[&str] {
        &["properties"]
    }

    fn parse(&self, source_path: &Path, text: &str) -> SourceFile {
        match Self::parse_file(source_path, text) {
            Ok(file) => require_print_idempotent(Self::NAME, file.into(), text, &PropertiesPrinter),
            Err(e) => {
                tracing::warn!(path = %source_path.display(), error = %e, "properties syntax error");
                ParseError::build(Self::NAME, source_path, text, "SyntaxError", e.to_string()).into()
            }
        }
    }
}

struct Scanner<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn bump(&mut self, c: char) {
        self.pos += c.len_utf8();
    }

    fn take_while(&mut self, f: impl Fn(char) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !f(c) {
                break;
            }
            self.bump(c);
        }
        &self.text[start..self.pos]
    }

    /// 1-based line of byte offset `pos`; only computed for errors
    fn line_at(&self, pos: usize) -> usize {
        self.text[..pos].matches('\n').count() + 1
    }
}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0c')
}

fn is_line_end(c: char) -> bool {
    matches!(c, '\n' | '\r')
}

fn parse_content(text: &str) -> Result<(im::Vector<Tree>, String), PropertiesSyntaxError> {
    let mut s = Scanner { text, pos: 0 };
    let mut content = im::Vector::new();
    loop {
        let prefix = s.take_while(char::is_whitespace).to_string();
        match s.peek() {
            None => return Ok((content, prefix)),
            Some(c @ ('#' | '!')) => {
                s.bump(c);
                let delimiter = if c == '#' {
                    CommentDelimiter::HashTag
                } else {
                    CommentDelimiter::ExclamationMark
                };
                let message = s.take_while(|c| !is_line_end(c)).to_string();
                content.push_back(Tree::from(Comment {
                    id: TreeId::random(),
                    prefix,
                    markers: Markers::empty(),
                    delimiter,
                    message,
                }));
            }
            Some(_) => content.push_back(Tree::from(parse_entry(&mut s, prefix)?)),
        }
    }
}

fn parse_entry(s: &mut Scanner<'_>, prefix: String) -> Result<Entry, PropertiesSyntaxError> {
    let start = s.pos;
    let key = parse_key(s);
    if key.is_empty() {
        return Err(PropertiesSyntaxError::EmptyKey { line: s.line_at(start) });
    }
    let before_equals = s.take_while(is_blank).to_string();
    let delimiter = match s.peek() {
        Some('=') => Delimiter::Equals,
        Some(':') => Delimiter::Colon,
        _ => Delimiter::None,
    };
    let value_prefix = if delimiter == Delimiter::None {
        String::new()
    } else {
        s.pos += 1;
        s.take_while(is_blank).to_string()
    };
    let text = parse_value_text(s)?;
    Ok(Entry {
        id: TreeId::random(),
        prefix,
        markers: Markers::empty(),
        key: key.to_string(),
        before_equals,
        delimiter,
        value: Arc::new(Value {
            id: TreeId::random(),
            prefix: value_prefix,
            markers: Markers::empty(),
            text,
        }),
    })
}

/// A key runs to the first unescaped delimiter, blank or line end
fn parse_key<'a>(s: &mut Scanner<'a>) -> &'a str {
    let start = s.pos;
    while let Some(c) = s.peek() {
        match c {
            '\\' => {
                s.bump(c);
                if let Some(escaped) = s.peek().filter(|e| !is_line_end(*e)) {
                    s.bump(escaped);
                }
            }
            '=' | ':' => break,
            c if is_blank(c) || is_line_end(c) => break,
            c => s.bump(c),
        }
    }
    &s.text[start..s.pos]
}

/// Value text up to the line end, following `\` continuations
fn parse_value_text(s: &mut Scanner<'_>) -> Result<String, PropertiesSyntaxError> {
    let start = s.pos;
    loop {
        let segment = s.take_while(|c| !is_line_end(c));
        let trailing = segment.chars().rev().take_while(|c| *c == '\\').count();
        if trailing % 2 == 0 {
            break;
        }
        if s.peek().is_none() {
            return Err(PropertiesSyntaxError::UnterminatedContinuation { line: s.line_at(s.pos) });
        }
        s.pos += if s.text[s.pos..].starts_with("\r\n") { 2 } else { 1 };
    }
    Ok(s.text[start..s.pos].to_string())
}
