use super::wrong_kind;
use crate::codec::RpcCodec;
use crate::data::RpcState;
use crate::error::RpcError;
use crate::receive::ReceiveQueue;
use crate::send::SendQueue;
use lst_tree::lang::properties::{Comment, Entry, File, Value};
use lst_tree::{Tree, TreeError, TreeKind};

fn check_content(tree: Tree) -> Result<Tree, TreeError> {
    match tree.kind() {
        TreeKind::PropertiesEntry | TreeKind::PropertiesComment => Ok(tree),
        actual => Err(TreeError::UnexpectedKind {
            expected: TreeKind::PropertiesEntry,
            actual,
        }),
    }
}

/// `properties.File`
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesCodec;

impl RpcCodec for PropertiesCodec {
    fn rpc_send(&self, after: &Tree, before: Option<&Tree>, q: &mut SendQueue<'_>) -> Result<(), RpcError> {
        let after = after
            .as_properties_file()
            .ok_or_else(|| wrong_kind(TreeKind::PropertiesFile, after))?;
        let before = before.and_then(Tree::as_properties_file);
        q.get_and_send(&after.id, before.map(|b| &b.id))?;
        q.get_and_send(&after.source, before.map(|b| &b.source))?;
        q.send_markers(&after.markers, before.map(|b| &b.markers))?;
        q.send_list(&after.content, before.map(|b| &b.content), Tree::clone)?;
        q.get_and_send(&after.eof, before.map(|b| &b.eof))
    }

    fn rpc_receive(&self, before: Option<&Tree>, q: &mut ReceiveQueue<'_>) -> Result<Tree, RpcError> {
        let before = before.and_then(Tree::as_properties_file);
        Ok(Tree::from(File {
            id: q.receive(before.map(|b| &b.id))?,
            source: q.receive(before.map(|b| &b.source))?,
            markers: q.receive_markers(before.map(|b| &b.markers))?,
            content: q.receive_list(before.map(|b| &b.content), Tree::clone, check_content)?,
            eof: q.receive(before.map(|b| &b.eof))?,
        }))
    }
}

/// `properties.Entry`
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesEntryCodec;

impl RpcCodec for PropertiesEntryCodec {
    fn rpc_send(&self, after: &Tree, before: Option<&Tree>, q: &mut SendQueue<'_>) -> Result<(), RpcError> {
        let after = after
            .as_properties_entry()
            .ok_or_else(|| wrong_kind(TreeKind::PropertiesEntry, after))?;
        let before = before.and_then(Tree::as_properties_entry);
        q.get_and_send(&after.id, before.map(|b| &b.id))?;
        q.get_and_send(&after.prefix, before.map(|b| &b.prefix))?;
        q.send_markers(&after.markers, before.map(|b| &b.markers))?;
        q.get_and_send(&after.key, before.map(|b| &b.key))?;
        q.get_and_send(&after.before_equals, before.map(|b| &b.before_equals))?;
        q.get_and_send(&after.delimiter, before.map(|b| &b.delimiter))?;
        let value = Tree::PropertiesValue(after.value.clone());
        let before_value = before.map(|b| Tree::PropertiesValue(b.value.clone()));
        q.send_tree(Some(&value), before_value.as_ref())
    }

    fn rpc_receive(&self, before: Option<&Tree>, q: &mut ReceiveQueue<'_>) -> Result<Tree, RpcError> {
        let before = before.and_then(Tree::as_properties_entry);
        let before_value = before.map(|b| Tree::PropertiesValue(b.value.clone()));
        Ok(Tree::from(Entry {
            id: q.receive(before.map(|b| &b.id))?,
            prefix: q.receive(before.map(|b| &b.prefix))?,
            markers: q.receive_markers(before.map(|b| &b.markers))?,
            key: q.receive(before.map(|b| &b.key))?,
            before_equals: q.receive(before.map(|b| &b.before_equals))?,
            delimiter: q.receive(before.map(|b| &b.delimiter))?,
            value: q
                .receive_tree(before_value.as_ref())?
                .ok_or(RpcError::UnexpectedState {
                    reading: "properties.Value",
                    actual: RpcState::Delete,
                })?
                .into_properties_value()?,
        }))
    }
}

/// `properties.Value`
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesValueCodec;

impl RpcCodec for PropertiesValueCodec {
    fn rpc_send(&self, after: &Tree, before: Option<&Tree>, q: &mut SendQueue<'_>) -> Result<(), RpcError> {
        let after = after
            .as_properties_value()
            .ok_or_else(|| wrong_kind(TreeKind::PropertiesValue, after))?;
        let before = before.and_then(Tree::as_properties_value);
        q.get_and_send(&after.id, before.map(|b| &b.id))?;
        q.get_and_send(&after.prefix, before.map(|b| &b.prefix))?;
        q.send_markers(&after.markers, before.map(|b| &b.markers))?;
        q.get_and_send(&after.text, before.map(|b| &b.text))
    }

    fn rpc_receive(&self, before: Option<&Tree>, q: &mut ReceiveQueue<'_>) -> Result<Tree, RpcError> {
        let before = before.and_then(Tree::as_properties_value);
        Ok(Tree::from(Value {
            id: q.receive(before.map(|b| &b.id))?,
            prefix: q.receive(before.map(|b| &b.prefix))?,
            markers: q.receive_markers(before.map(|b| &b.markers))?,
            text: q.receive(before.map(|b| &b.text))?,
        }))
    }
}

/// `properties.Comment`
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesCommentCodec;

impl RpcCodec for PropertiesCommentCodec {
    fn rpc_send(&self, after: &Tree, before: Option<&Tree>, q: &mut SendQueue<'_>) -> Result<(), RpcError> {
        let after = after
            .as_properties_comment()
            .ok_or_else(|| wrong_kind(TreeKind::PropertiesComment, after))?;
        let before = before.and_then(Tree::as_properties_comment);
        q.get_and_send(&after.id, before.map(|b| &b.id))?;
        q.get_and_send(&after.prefix, before.map(|b| &b.prefix))?;
        q.send_markers(&after.markers, before.map(|b| &b.markers))?;
        q.get_and_send(&after.delimiter, before.map(|b| &b.delimiter))?;
        q.get_and_send(&after.message, before.map(|b| &b.message))
    }

    fn rpc_receive(&self, before: Option<&Tree>, q: &mut ReceiveQueue<'_>) -> Result<Tree, RpcError> {
        let before = before.and_then(Tree::as_properties_comment);
        Ok(Tree::from(Comment {
            id: q.receive(before.map(|b| &b.id))?,
            prefix: q.receive(before.map(|b| &b.prefix))?,
            markers: q.receive_markers(before.map(|b| &b.markers))?,
            delimiter: q.receive(before.map(|b| &b.delimiter))?,
            message: q.receive(before.map(|b| &b.message))?,
        }))
    }
}
