//! Sending side of the delta protocol
//!
//! Codecs walk their fields in a fixed order and hand each one to the
//! [`SendQueue`] together with the value last sent for the same slot. The
//! queue emits `NO_CHANGE` when the two agree and the full value only when
//! they differ, so re-sending an edited tree costs one message per
//! untouched field.

use crate::codec::CodecRegistry;
use crate::data::{RpcObjectData, RpcState};
use crate::error::RpcError;
use lst_tree::{Markers, Tree, TreeId};
use serde::Serialize;
use std::collections::HashMap;

/// Kind string sent with every `Markers` reference
pub const MARKERS_VALUE_TYPE: &str = "marker.Markers";

/// Sender half of the reference table
///
/// Keyed by container address; each entry keeps its container alive so an
/// address cannot be reused by a different container during the session.
#[derive(Debug, Default)]
pub struct SenderRefs {
    by_addr: HashMap<usize, (u32, Markers)>,
    next: u32,
}

impl SenderRefs {
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_addr.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_addr.is_empty()
    }

    /// Existing ref, or a newly assigned one flagged `true`
    fn assign(&mut self, markers: &Markers) -> (u32, bool) {
        if let Some((reference, _)) = self.by_addr.get(&markers.addr()) {
            return (*reference, false);
        }
        self.next += 1;
        self.by_addr.insert(markers.addr(), (self.next, markers.clone()));
        (self.next, true)
    }
}

/// Outgoing message buffer for one root object
pub struct SendQueue<'a> {
    codecs: &'a CodecRegistry,
    refs: &'a mut SenderRefs,
    out: Vec<RpcObjectData>,
}

impl<'a> SendQueue<'a> {
    #[must_use]
    pub fn new(codecs: &'a CodecRegistry, refs: &'a mut SenderRefs) -> Self {
        Self {
            codecs,
            refs,
            out: Vec::new(),
        }
    }

    pub fn put(&mut self, data: RpcObjectData) {
        self.out.push(data);
    }

    /// Send a scalar field, compared through its JSON form
    ///
    /// # Errors
    /// Returns error if the value cannot be serialized
    pub fn get_and_send<T: Serialize>(&mut self, after: &T, before: Option<&T>) -> Result<(), RpcError> {
        let after = serde_json::to_value(after)?;
        let data = match before {
            None => RpcObjectData::new(RpcState::Add).with_value(after),
            Some(before) => {
                let before = serde_json::to_value(before)?;
                if before == after {
                    RpcObjectData::no_change()
                } else if after.is_null() {
                    RpcObjectData::delete()
                } else {
                    RpcObjectData::new(RpcState::Change).with_value(after)
                }
            }
        };
        self.put(data);
        Ok(())
    }

    /// Send an optional tree field
    ///
    /// Unchanged by reference is `NO_CHANGE`; a tree with a different id or
    /// kind than its predecessor is sent whole.
    ///
    /// # Errors
    /// Returns error if no codec handles a kind being sent
    pub fn send_tree(&mut self, after: Option<&Tree>, before: Option<&Tree>) -> Result<(), RpcError> {
        match (after, before) {
            (None, None) => self.put(RpcObjectData::no_change()),
            (None, Some(_)) => self.put(RpcObjectData::delete()),
            (Some(after), Some(before)) if after.ptr_eq(before) => {
                self.put(RpcObjectData::no_change());
            }
            (Some(after), Some(before)) if after.kind() == before.kind() && after.id() == before.id() => {
                let codecs = self.codecs;
                self.put(RpcObjectData::new(RpcState::Change).with_value_type(after.kind().as_str()));
                codecs.codec_for(after.kind())?.rpc_send(after, Some(before), self)?;
            }
            (Some(after), _) => {
                let codecs = self.codecs;
                self.put(RpcObjectData::new(RpcState::Add).with_value_type(after.kind().as_str()));
                codecs.codec_for(after.kind())?.rpc_send(after, None, self)?;
            }
        }
        Ok(())
    }

    /// Send a list of child trees
    ///
    /// After the list header comes one positions message: for every element
    /// of `after`, its index in `before` matched by id, or `-1` when new.
    /// Then each element is sent against its matched predecessor.
    ///
    /// # Errors
    /// Returns error if an element cannot be sent
    pub fn send_list<N>(
        &mut self,
        after: &im::Vector<N>,
        before: Option<&im::Vector<N>>,
        to_tree: impl Fn(&N) -> Tree,
    ) -> Result<(), RpcError>
    where
        N: Clone,
    {
        // inline vectors never share a root node, so compare element identity
        let unchanged = before.is_some_and(|b| {
            b.ptr_eq(after)
                || (b.len() == after.len()
                    && b.iter().zip(after.iter()).all(|(x, y)| to_tree(x).ptr_eq(&to_tree(y))))
        });
        if unchanged {
            self.put(RpcObjectData::no_change());
            return Ok(());
        }
        let state = if before.is_some() { RpcState::Change } else { RpcState::Add };
        self.put(RpcObjectData::new(state));

        let before: Vec<Tree> = before.map(|b| b.iter().map(&to_tree).collect()).unwrap_or_default();
        let index: HashMap<TreeId, usize> =
            before.iter().enumerate().map(|(i, t)| (t.id(), i)).collect();
        let after: Vec<Tree> = after.iter().map(&to_tree).collect();
        let positions: Vec<i64> = after
            .iter()
            .map(|t| index.get(&t.id()).map_or(-1, |&i| i as i64))
            .collect();
        self.put(RpcObjectData::new(RpcState::Change).with_value(serde_json::to_value(&positions)?));

        for (element, position) in after.iter().zip(positions) {
            let previous = usize::try_from(position).ok().map(|i| &before[i]);
            self.send_tree(Some(element), previous)?;
        }
        Ok(())
    }

    /// Send a markers container by reference
    ///
    /// The first sighting of a container in this session sends its full
    /// content under a fresh ref; later sightings send the ref alone.
    ///
    /// # Errors
    /// Returns error if a marker cannot be serialized
    pub fn send_markers(&mut self, after: &Markers, before: Option<&Markers>) -> Result<(), RpcError> {
        if before.is_some_and(|b| b.ptr_eq(after)) {
            self.put(RpcObjectData::no_change());
            return Ok(());
        }
        let (reference, first_sighting) = self.refs.assign(after);
        self.put(
            RpcObjectData::new(RpcState::Add)
                .with_value_type(MARKERS_VALUE_TYPE)
                .with_reference(reference),
        );
        if first_sighting {
            self.get_and_send(&after.id(), None)?;
            self.get_and_send(&after.len(), None)?;
            for marker in after.iter() {
                self.put(
                    RpcObjectData::new(RpcState::Add)
                        .with_value_type(marker.kind().as_str())
                        .with_value(serde_json::to_value(marker)?),
                );
            }
        }
        Ok(())
    }

    /// Terminate the object and return the messages
    #[must_use]
    pub fn finish(mut self) -> Vec<RpcObjectData> {
        self.out.push(RpcObjectData::end_of_object());
        self.out
    }
}
