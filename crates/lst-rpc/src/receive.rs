//! Receiving side of the delta protocol
//!
//! Mirrors [`SendQueue`](crate::SendQueue): codecs read their fields in
//! the same fixed order, and every `NO_CHANGE` is answered with the value
//! the receiver already holds for that slot. Unchanged trees come back as
//! the very same `Arc`, never a copy.

use crate::codec::CodecRegistry;
use crate::data::{RpcObjectData, RpcState};
use crate::error::RpcError;
use crate::send::MARKERS_VALUE_TYPE;
use lst_tree::{Marker, Markers, Tree, TreeId, TreeKind};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, VecDeque};

/// Receiver half of the reference table
#[derive(Debug, Default)]
pub struct ReceiverRefs {
    by_ref: HashMap<u32, Markers>,
}

impl ReceiverRefs {
    #[must_use]
    pub fn get(&self, reference: u32) -> Option<&Markers> {
        self.by_ref.get(&reference)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_ref.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_ref.is_empty()
    }
}

/// Incoming message reader for one root object
pub struct ReceiveQueue<'a> {
    codecs: &'a CodecRegistry,
    refs: &'a mut ReceiverRefs,
    data: VecDeque<RpcObjectData>,
}

impl<'a> ReceiveQueue<'a> {
    #[must_use]
    pub fn new(
        codecs: &'a CodecRegistry,
        refs: &'a mut ReceiverRefs,
        data: impl IntoIterator<Item = RpcObjectData>,
    ) -> Self {
        Self {
            codecs,
            refs,
            data: data.into_iter().collect(),
        }
    }

    /// Next message
    ///
    /// # Errors
    /// Returns [`RpcError::UnexpectedEnd`] when the queue is empty
    pub fn take(&mut self) -> Result<RpcObjectData, RpcError> {
        self.data.pop_front().ok_or(RpcError::UnexpectedEnd)
    }

    /// Receive a scalar field
    ///
    /// # Errors
    /// Returns error on a malformed value, or `NO_CHANGE` with no `before`
    pub fn receive<T: DeserializeOwned + Clone>(&mut self, before: Option<&T>) -> Result<T, RpcError> {
        let message = self.take()?;
        match message.state {
            RpcState::NoChange => before.cloned().ok_or(RpcError::MissingBefore("value")),
            RpcState::Delete => Ok(serde_json::from_value(serde_json::Value::Null)?),
            RpcState::Add | RpcState::Change => {
                Ok(serde_json::from_value(message.value.unwrap_or_default())?)
            }
            RpcState::EndOfObject => Err(RpcError::UnexpectedState {
                reading: "value",
                actual: message.state,
            }),
        }
    }

    /// Receive an optional tree field
    ///
    /// # Errors
    /// Returns error for an unknown kind or a malformed nested object
    pub fn receive_tree(&mut self, before: Option<&Tree>) -> Result<Option<Tree>, RpcError> {
        let message = self.take()?;
        match message.state {
            RpcState::NoChange => Ok(before.cloned()),
            RpcState::Delete => Ok(None),
            RpcState::Add => {
                let codecs = self.codecs;
                let kind = tree_kind(&message)?;
                Ok(Some(codecs.codec_for(kind)?.rpc_receive(None, self)?))
            }
            RpcState::Change => {
                let codecs = self.codecs;
                let before = before.ok_or(RpcError::MissingBefore("tree"))?;
                let kind = tree_kind(&message)?;
                Ok(Some(codecs.codec_for(kind)?.rpc_receive(Some(before), self)?))
            }
            RpcState::EndOfObject => Err(RpcError::UnexpectedState {
                reading: "tree",
                actual: message.state,
            }),
        }
    }

    /// Receive a list of child trees
    ///
    /// # Errors
    /// Returns error for a bad position or a malformed element
    pub fn receive_list<N>(
        &mut self,
        before: Option<&im::Vector<N>>,
        to_tree: impl Fn(&N) -> Tree,
        from_tree: impl Fn(Tree) -> Result<N, lst_tree::TreeError>,
    ) -> Result<im::Vector<N>, RpcError>
    where
        N: Clone,
    {
        let header = self.take()?;
        match header.state {
            RpcState::NoChange => {
                return before.cloned().ok_or(RpcError::MissingBefore("list"));
            }
            RpcState::Delete => return Ok(im::Vector::new()),
            RpcState::Add | RpcState::Change => {}
            RpcState::EndOfObject => {
                return Err(RpcError::UnexpectedState {
                    reading: "list",
                    actual: header.state,
                })
            }
        }

        let positions: Vec<i64> = serde_json::from_value(self.take()?.value.unwrap_or_default())?;
        let before: Vec<Tree> = before.map(|b| b.iter().map(&to_tree).collect()).unwrap_or_default();
        let mut list = im::Vector::new();
        for position in positions {
            let previous = if position < 0 {
                None
            } else {
                let found = usize::try_from(position).ok().and_then(|i| before.get(i));
                Some(found.ok_or(RpcError::BadPosition {
                    position,
                    len: before.len(),
                })?)
            };
            let element = self.receive_tree(previous)?.ok_or(RpcError::UnexpectedState {
                reading: "list element",
                actual: RpcState::Delete,
            })?;
            list.push_back(from_tree(element)?);
        }
        Ok(list)
    }

    /// Receive a markers container, resolving refs to the stored object
    ///
    /// # Errors
    /// Returns error for an unknown ref or a malformed marker
    pub fn receive_markers(&mut self, before: Option<&Markers>) -> Result<Markers, RpcError> {
        let message = self.take()?;
        match (message.state, message.reference) {
            (RpcState::NoChange, _) => before.cloned().ok_or(RpcError::MissingBefore("markers")),
            (RpcState::Add, Some(reference)) => {
                if let Some(known) = self.refs.get(reference) {
                    return Ok(known.clone());
                }
                let id: TreeId = self.receive(None)?;
                let count: usize = self.receive(None)?;
                let mut markers = Vec::with_capacity(count);
                for _ in 0..count {
                    let marker = self.take()?;
                    markers.push(serde_json::from_value::<Marker>(marker.value.unwrap_or_default())?);
                }
                let markers = Markers::new(id, markers);
                self.refs.by_ref.insert(reference, markers.clone());
                Ok(markers)
            }
            (state, _) => Err(RpcError::UnexpectedState {
                reading: MARKERS_VALUE_TYPE,
                actual: state,
            }),
        }
    }

    /// Consume the `END_OF_OBJECT` terminator
    ///
    /// # Errors
    /// Returns error if anything else is next
    pub fn finish(mut self) -> Result<(), RpcError> {
        let message = self.take()?;
        if message.state == RpcState::EndOfObject {
            Ok(())
        } else {
            Err(RpcError::UnexpectedState {
                reading: "end of object",
                actual: message.state,
            })
        }
    }
}

fn tree_kind(message: &RpcObjectData) -> Result<TreeKind, RpcError> {
    let value_type = message.value_type.as_deref().unwrap_or_default();
    value_type
        .parse()
        .map_err(|_| RpcError::NoCodec(value_type.to_string()))
}
