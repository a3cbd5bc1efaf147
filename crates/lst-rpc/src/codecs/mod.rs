//! Codecs for the built-in tree kinds

mod parse_error;
mod properties;
mod text;

pub use parse_error::ParseErrorCodec;
pub use properties::{PropertiesCodec, PropertiesCommentCodec, PropertiesEntryCodec, PropertiesValueCodec};
pub use text::{PlainTextCodec, SnippetCodec};

use crate::error::RpcError;
use lst_tree::{Tree, TreeError, TreeKind};

fn wrong_kind(expected: TreeKind, actual: &Tree) -> RpcError {
    RpcError::Tree(TreeError::UnexpectedKind {
        expected,
        actual: actual.kind(),
    })
}
