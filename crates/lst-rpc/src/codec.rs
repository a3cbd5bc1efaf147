//! Per-kind codecs and their registry

use crate::codecs::{
    ParseErrorCodec, PlainTextCodec, PropertiesCodec, PropertiesCommentCodec, PropertiesEntryCodec,
    PropertiesValueCodec, SnippetCodec,
};
use crate::error::RpcError;
use crate::receive::ReceiveQueue;
use crate::send::SendQueue;
use lst_tree::{Tree, TreeKind};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Field-by-field serializer for one or more tree kinds
///
/// `rpc_send` and `rpc_receive` must visit the same fields in the same
/// order. `before` is the value last transmitted for the slot, or `None`
/// when the whole object is being added.
pub trait RpcCodec: Send + Sync {
    /// Write the fields of `after`
    ///
    /// # Errors
    /// Returns error if `after` is a kind this codec does not handle
    fn rpc_send(&self, after: &Tree, before: Option<&Tree>, q: &mut SendQueue<'_>) -> Result<(), RpcError>;

    /// Read fields back into a tree, reusing `before` for unchanged slots
    ///
    /// # Errors
    /// Returns error on a malformed message stream
    fn rpc_receive(&self, before: Option<&Tree>, q: &mut ReceiveQueue<'_>) -> Result<Tree, RpcError>;
}

/// Codec lookup by tree kind; read-only once built
#[derive(Clone, Default)]
pub struct CodecRegistry {
    codecs: HashMap<TreeKind, Arc<dyn RpcCodec>>,
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<_> = self.codecs.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("CodecRegistry").field("kinds", &kinds).finish()
    }
}

impl CodecRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a codec for every built-in kind
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TreeKind::PlainText, Arc::new(PlainTextCodec));
        registry.register(TreeKind::Snippet, Arc::new(SnippetCodec));
        registry.register(TreeKind::PropertiesFile, Arc::new(PropertiesCodec));
        registry.register(TreeKind::PropertiesEntry, Arc::new(PropertiesEntryCodec));
        registry.register(TreeKind::PropertiesValue, Arc::new(PropertiesValueCodec));
        registry.register(TreeKind::PropertiesComment, Arc::new(PropertiesCommentCodec));
        registry.register(TreeKind::ParseError, Arc::new(ParseErrorCodec));
        registry
    }

    /// Register or replace the codec for `kind`
    pub fn register(&mut self, kind: TreeKind, codec: Arc<dyn RpcCodec>) {
        self.codecs.insert(kind, codec);
    }

    /// Codec for `kind`
    ///
    /// # Errors
    /// Returns [`RpcError::NoCodec`] when nothing is registered
    pub fn codec_for(&self, kind: TreeKind) -> Result<&dyn RpcCodec, RpcError> {
        self.codecs
            .get(&kind)
            .map(|c| &**c)
            .ok_or_else(|| RpcError::NoCodec(kind.as_str().to_string()))
    }

    /// Check if a codec exists for `kind`
    #[inline]
    #[must_use]
    pub fn contains(&self, kind: TreeKind) -> bool {
        self.codecs.contains_key(&kind)
    }
}
