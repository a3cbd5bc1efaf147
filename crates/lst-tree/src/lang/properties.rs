//! Java-style `.properties` files
//!
//! A [`File`] is a flat list of [`Entry`] and [`Comment`] nodes. All
//! whitespace is kept: each node owns the whitespace in front of it as its
//! `prefix`, an entry keeps the whitespace between key and delimiter in
//! `before_equals`, and whatever follows the last node lands in
//! [`File::eof`]. Printing a parsed file reproduces its input byte for byte.

use crate::error::PrintError;
use crate::id::TreeId;
use crate::markers::Markers;
use crate::print::{PrintOutput, Printer};
use crate::tree::{SourceMeta, Tree, TreeKind};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A properties file
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub id: TreeId,
    pub source: SourceMeta,
    pub markers: Markers,
    /// [`Entry`] and [`Comment`] nodes in file order
    pub content: im::Vector<Tree>,
    /// Trailing whitespace after the last node
    pub eof: String,
}

impl File {
    /// An empty file
    #[must_use]
    pub fn new(source_path: impl AsRef<Path>) -> Self {
        Self {
            id: TreeId::random(),
            source: SourceMeta::new(source_path.as_ref()),
            markers: Markers::empty(),
            content: im::Vector::new(),
            eof: String::new(),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &Arc<Entry>> {
        self.content.iter().filter_map(Tree::as_properties_entry)
    }

    /// First entry with the given key
    #[must_use]
    pub fn find_entry(&self, key: &str) -> Option<&Arc<Entry>> {
        self.entries().find(|e| e.key == key)
    }
}

/// `key = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: TreeId,
    pub prefix: String,
    pub markers: Markers,
    pub key: String,
    /// Whitespace between the key and the delimiter
    pub before_equals: String,
    pub delimiter: Delimiter,
    pub value: Arc<Value>,
}

impl Entry {
    /// A new `key=value` entry on its own line
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: TreeId::random(),
            prefix: "\n".to_string(),
            markers: Markers::empty(),
            key: key.into(),
            before_equals: String::new(),
            delimiter: Delimiter::Equals,
            value: Arc::new(Value::new(value)),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

/// Separator between key and value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Delimiter {
    Equals,
    Colon,
    /// Key and value separated by whitespace alone
    None,
}

impl Delimiter {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::Colon => ":",
            Self::None => "",
        }
    }
}

/// Value side of an [`Entry`]
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub id: TreeId,
    /// Whitespace between the delimiter and the text
    pub prefix: String,
    pub markers: Markers,
    /// Raw text, including any line continuations
    pub text: String,
}

impl Value {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: TreeId::random(),
            prefix: String::new(),
            markers: Markers::empty(),
            text: text.into(),
        }
    }
}

/// `# message` or `! message`
#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: TreeId,
    pub prefix: String,
    pub markers: Markers,
    pub delimiter: CommentDelimiter,
    /// Everything after the delimiter up to the end of the line
    pub message: String,
}

impl Comment {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: TreeId::random(),
            prefix: "\n".to_string(),
            markers: Markers::empty(),
            delimiter: CommentDelimiter::HashTag,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommentDelimiter {
    HashTag,
    ExclamationMark,
}

impl CommentDelimiter {
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Self::HashTag => '#',
            Self::ExclamationMark => '!',
        }
    }
}

/// Prints every properties node kind
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesPrinter;

impl PropertiesPrinter {
    fn print_value(value: &Value, out: &mut PrintOutput) {
        out.append(&value.prefix);
        out.before_syntax(&value.markers);
        out.append(&value.text);
        out.after_syntax(&value.markers);
    }

    fn print_entry(entry: &Entry, out: &mut PrintOutput) {
        out.append(&entry.prefix);
        out.before_syntax(&entry.markers);
        out.append(&entry.key);
        out.append(&entry.before_equals);
        out.append(entry.delimiter.as_str());
        Self::print_value(&entry.value, out);
        out.after_syntax(&entry.markers);
    }

    fn print_comment(comment: &Comment, out: &mut PrintOutput) {
        out.append(&comment.prefix);
        out.before_syntax(&comment.markers);
        out.push(comment.delimiter.as_char());
        out.append(&comment.message);
        out.after_syntax(&comment.markers);
    }
}

impl Printer for PropertiesPrinter {
    fn print(&self, tree: &Tree, out: &mut PrintOutput) -> Result<(), PrintError> {
        match tree {
            Tree::PropertiesFile(file) => {
                out.before_syntax(&file.markers);
                for child in &file.content {
                    match child {
                        Tree::PropertiesEntry(entry) => Self::print_entry(entry, out),
                        Tree::PropertiesComment(comment) => Self::print_comment(comment, out),
                        other => {
                            return Err(PrintError::UnexpectedChild {
                                parent: TreeKind::PropertiesFile,
                                kind: other.kind(),
                            })
                        }
                    }
                }
                out.append(&file.eof);
                out.after_syntax(&file.markers);
            }
            Tree::PropertiesEntry(entry) => Self::print_entry(entry, out),
            Tree::PropertiesValue(value) => Self::print_value(value, out),
            Tree::PropertiesComment(comment) => Self::print_comment(comment, out),
            other => {
                return Err(PrintError::UnsupportedKind {
                    printer: "PropertiesPrinter",
                    kind: other.kind(),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::print::MarkerPrinter;

    fn print(tree: &Tree) -> Result<String, PrintError> {
        let mut out = PrintOutput::new(MarkerPrinter::Default);
        PropertiesPrinter.print(tree, &mut out)?;
        Ok(out.into_string())
    }

    #[test]
    fn prints_built_file() {
        let mut file = File::new("app.properties");
        file.content.push_back(Tree::from(Comment::new(" settings").with_prefix("")));
        file.content.push_back(Tree::from(Entry::new("a", "1")));
        file.eof = "\n".to_string();
        assert_eq!(print(&Tree::from(file)).unwrap(), "# settings\na=1\n");
    }

    #[test]
    fn find_entry_by_key() {
        let mut file = File::new("app.properties");
        file.content.push_back(Tree::from(Entry::new("a", "1")));
        file.content.push_back(Tree::from(Entry::new("b", "2")));
        assert_eq!(file.find_entry("b").unwrap().value.text, "2");
        assert!(file.find_entry("c").is_none());
        assert_eq!(file.entries().count(), 2);
    }

    #[test]
    fn rejects_foreign_child() {
        let mut file = File::new("app.properties");
        file.content.push_back(Tree::from(Value::new("stray")));
        assert!(matches!(
            print(&Tree::from(file)),
            Err(PrintError::UnexpectedChild {
                parent: TreeKind::PropertiesFile,
                kind: TreeKind::PropertiesValue
            })
        ));
    }

    #[test]
    fn search_result_prints_after_prefix() {
        let mut entry = Entry::new("a", "1");
        entry.markers = entry.markers.search_result(Some("found".to_string()));
        assert_eq!(print(&Tree::from(entry)).unwrap(), "\n~~(found)~~>a=1");
    }
}
