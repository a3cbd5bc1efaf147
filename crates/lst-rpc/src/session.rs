//! Stateful send and receive sessions
//!
//! A session remembers the last version of every root tree it has moved,
//! keyed by id, together with the reference table. Sending an edited tree a
//! second time therefore produces a delta against the previous version.

use crate::codec::CodecRegistry;
use crate::data::{RpcBatch, RpcState};
use crate::error::RpcError;
use crate::receive::{ReceiveQueue, ReceiverRefs};
use crate::send::{SendQueue, SenderRefs};
use lst_tree::{Tree, TreeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Sending half of a session
#[derive(Debug)]
pub struct RpcSender {
    codecs: Arc<CodecRegistry>,
    refs: SenderRefs,
    last: HashMap<TreeId, Tree>,
}

impl RpcSender {
    #[must_use]
    pub fn new(codecs: Arc<CodecRegistry>) -> Self {
        Self {
            codecs,
            refs: SenderRefs::default(),
            last: HashMap::new(),
        }
    }

    /// Encode `tree` as a delta against the last version sent
    ///
    /// # Errors
    /// Returns error if a kind in the tree has no codec
    pub fn send(&mut self, tree: &Tree) -> Result<RpcBatch, RpcError> {
        let before = self.last.get(&tree.id()).cloned();
        let mut q = SendQueue::new(&self.codecs, &mut self.refs);
        q.send_tree(Some(tree), before.as_ref())?;
        let data = q.finish();
        tracing::debug!(
            id = %tree.id(),
            kind = %tree.kind(),
            messages = data.len(),
            delta = before.is_some(),
            "encoded tree"
        );
        self.last.insert(tree.id(), tree.clone());
        Ok(RpcBatch { id: tree.id(), data })
    }

    /// Drop the remembered version of a root, forcing a full send next time
    pub fn forget(&mut self, id: TreeId) -> Option<Tree> {
        self.last.remove(&id)
    }

    /// Number of distinct markers containers sent so far
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.refs.len()
    }
}

/// Receiving half of a session
#[derive(Debug)]
pub struct RpcReceiver {
    codecs: Arc<CodecRegistry>,
    refs: ReceiverRefs,
    last: HashMap<TreeId, Tree>,
}

impl RpcReceiver {
    #[must_use]
    pub fn new(codecs: Arc<CodecRegistry>) -> Self {
        Self {
            codecs,
            refs: ReceiverRefs::default(),
            last: HashMap::new(),
        }
    }

    /// Decode a batch, reusing the previous version of the same root
    ///
    /// # Errors
    /// Returns error if the batch is malformed or does not describe a tree
    pub fn receive(&mut self, batch: RpcBatch) -> Result<Tree, RpcError> {
        let id = batch.id;
        let before = self.last.get(&id).cloned();
        let mut q = ReceiveQueue::new(&self.codecs, &mut self.refs, batch.data);
        let tree = q
            .receive_tree(before.as_ref())?
            .ok_or(RpcError::UnexpectedState {
                reading: "root",
                actual: RpcState::Delete,
            })?;
        q.finish()?;
        self.last.insert(id, tree.clone());
        Ok(tree)
    }

    /// Last version received for `id`
    #[must_use]
    pub fn get(&self, id: TreeId) -> Option<&Tree> {
        self.last.get(&id)
    }

    /// Number of distinct markers containers received so far
    #[must_use]
    pub fn reference_count(&self) -> usize {
        self.refs.len()
    }
}

/// Sender and receiver sharing one codec registry
#[must_use]
pub fn session_pair(codecs: Arc<CodecRegistry>) -> (RpcSender, RpcReceiver) {
    (RpcSender::new(codecs.clone()), RpcReceiver::new(codecs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lst_tree::lang::text::PlainText;

    #[test]
    fn second_send_of_same_tree_is_one_no_change() {
        let (mut sender, mut receiver) = session_pair(Arc::new(CodecRegistry::with_defaults()));
        let tree = Tree::from(PlainText::new("a.txt", "hello"));

        let first = sender.send(&tree).unwrap();
        assert!(first.data.len() > 2);
        receiver.receive(first).unwrap();

        let second = sender.send(&tree).unwrap();
        assert_eq!(second.data.len(), 2);
        assert_eq!(second.count(RpcState::NoChange), 1);
        let received = receiver.receive(second).unwrap();
        assert!(received.ptr_eq(receiver.get(tree.id()).unwrap()));
    }

    #[test]
    fn forget_forces_full_send() {
        let mut sender = RpcSender::new(Arc::new(CodecRegistry::with_defaults()));
        let tree = Tree::from(PlainText::new("a.txt", "hello"));
        let full = sender.send(&tree).unwrap().data.len();
        assert!(sender.forget(tree.id()).is_some());
        assert_eq!(sender.send(&tree).unwrap().data.len(), full - 2);
    }
}
