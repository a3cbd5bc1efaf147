use super::wrong_kind;
use crate::codec::RpcCodec;
use crate::error::RpcError;
use crate::receive::ReceiveQueue;
use crate::send::SendQueue;
use lst_tree::lang::text::{PlainText, Snippet};
use lst_tree::{Tree, TreeKind};

fn snippet_tree(snippet: &std::sync::Arc<Snippet>) -> Tree {
    Tree::Snippet(snippet.clone())
}

/// `text.PlainText`
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextCodec;

impl RpcCodec for PlainTextCodec {
    fn rpc_send(&self, after: &Tree, before: Option<&Tree>, q: &mut SendQueue<'_>) -> Result<(), RpcError> {
        let after = after
            .as_plain_text()
            .ok_or_else(|| wrong_kind(TreeKind::PlainText, after))?;
        let before = before.and_then(Tree::as_plain_text);
        q.get_and_send(&after.id, before.map(|b| &b.id))?;
        q.get_and_send(&after.source, before.map(|b| &b.source))?;
        q.send_markers(&after.markers, before.map(|b| &b.markers))?;
        q.get_and_send(&after.text, before.map(|b| &b.text))?;
        q.send_list(&after.snippets, before.map(|b| &b.snippets), snippet_tree)
    }

    fn rpc_receive(&self, before: Option<&Tree>, q: &mut ReceiveQueue<'_>) -> Result<Tree, RpcError> {
        let before = before.and_then(Tree::as_plain_text);
        Ok(Tree::from(PlainText {
            id: q.receive(before.map(|b| &b.id))?,
            source: q.receive(before.map(|b| &b.source))?,
            markers: q.receive_markers(before.map(|b| &b.markers))?,
            text: q.receive(before.map(|b| &b.text))?,
            snippets: q.receive_list(before.map(|b| &b.snippets), snippet_tree, Tree::into_snippet)?,
        }))
    }
}

/// `text.Snippet`
#[derive(Debug, Clone, Copy, Default)]
pub struct SnippetCodec;

impl RpcCodec for SnippetCodec {
    fn rpc_send(&self, after: &Tree, before: Option<&Tree>, q: &mut SendQueue<'_>) -> Result<(), RpcError> {
        let after = after
            .as_snippet()
            .ok_or_else(|| wrong_kind(TreeKind::Snippet, after))?;
        let before = before.and_then(Tree::as_snippet);
        q.get_and_send(&after.id, before.map(|b| &b.id))?;
        q.send_markers(&after.markers, before.map(|b| &b.markers))?;
        q.get_and_send(&after.text, before.map(|b| &b.text))
    }

    fn rpc_receive(&self, before: Option<&Tree>, q: &mut ReceiveQueue<'_>) -> Result<Tree, RpcError> {
        let before = before.and_then(Tree::as_snippet);
        Ok(Tree::from(Snippet {
            id: q.receive(before.map(|b| &b.id))?,
            markers: q.receive_markers(before.map(|b| &b.markers))?,
            text: q.receive(before.map(|b| &b.text))?,
        }))
    }
}
