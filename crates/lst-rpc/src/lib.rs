//! LST Wire Codec
//!
//! Moves trees across a process boundary as field-level deltas.
//!
//! # Core Concepts
//!
//! - [`RpcObjectData`]: one message; a `NO_CHANGE` sentinel stands in for
//!   any field equal to the last value sent for the same slot
//! - [`RpcCodec`]: per-kind field walker, registered in a [`CodecRegistry`]
//! - [`SendQueue`] / [`ReceiveQueue`]: the two halves of one object transfer
//! - Reference dedup: a [`lst_tree::Markers`] container is sent in full
//!   once per session, then by numeric ref
//! - [`RpcSender`] / [`RpcReceiver`]: sessions that remember each root tree
//!
//! # Example
//!
//! ```rust,ignore
//! use lst_rpc::{session_pair, CodecRegistry};
//! use std::sync::Arc;
//!
//! let (mut sender, mut receiver) = session_pair(Arc::new(CodecRegistry::with_defaults()));
//! let batch = sender.send(&tree)?;
//! let copy = receiver.receive(batch)?;
//! assert_eq!(copy, tree);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod codec;
pub mod codecs;
mod data;
mod error;
mod receive;
mod send;
mod session;
mod transport;

pub use codec::{CodecRegistry, RpcCodec};
pub use data::{RpcBatch, RpcObjectData, RpcState};
pub use error::RpcError;
pub use receive::{ReceiveQueue, ReceiverRefs};
pub use send::{SendQueue, SenderRefs, MARKERS_VALUE_TYPE};
pub use session::{session_pair, RpcReceiver, RpcSender};
pub use transport::{read_batch, write_batch, RpcChannel};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
