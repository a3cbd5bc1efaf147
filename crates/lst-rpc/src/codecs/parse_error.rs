use super::wrong_kind;
use crate::codec::RpcCodec;
use crate::error::RpcError;
use crate::receive::ReceiveQueue;
use crate::send::SendQueue;
use lst_tree::{ParseError, Tree, TreeKind};

/// `ParseError`
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseErrorCodec;

impl RpcCodec for ParseErrorCodec {
    fn rpc_send(&self, after: &Tree, before: Option<&Tree>, q: &mut SendQueue<'_>) -> Result<(), RpcError> {
        let after = after
            .as_parse_error()
            .ok_or_else(|| wrong_kind(TreeKind::ParseError, after))?;
        let before = before.and_then(Tree::as_parse_error);
        q.get_and_send(&after.id, before.map(|b| &b.id))?;
        q.get_and_send(&after.source, before.map(|b| &b.source))?;
        q.send_markers(&after.markers, before.map(|b| &b.markers))?;
        q.get_and_send(&after.text, before.map(|b| &b.text))?;
        q.send_tree(after.erroneous.as_ref(), before.and_then(|b| b.erroneous.as_ref()))
    }

    fn rpc_receive(&self, before: Option<&Tree>, q: &mut ReceiveQueue<'_>) -> Result<Tree, RpcError> {
        let before = before.and_then(Tree::as_parse_error);
        Ok(Tree::from(ParseError {
            id: q.receive(before.map(|b| &b.id))?,
            source: q.receive(before.map(|b| &b.source))?,
            markers: q.receive_markers(before.map(|b| &b.markers))?,
            text: q.receive(before.map(|b| &b.text))?,
            erroneous: q.receive_tree(before.and_then(|b| b.erroneous.as_ref()))?,
        }))
    }
}
