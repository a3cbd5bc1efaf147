//! Error types for the wire codec

use crate::data::RpcState;
use lst_tree::TreeError;

/// Codec and transport errors
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// Queue ran out of messages mid-object
    #[error("unexpected end of message queue")]
    UnexpectedEnd,

    /// A message arrived in a state the reader cannot accept here
    #[error("unexpected {actual} while reading {reading}")]
    UnexpectedState {
        reading: &'static str,
        actual: RpcState,
    },

    /// `NO_CHANGE` for a slot the receiver has no previous value for
    #[error("NO_CHANGE for {0} without a previous value")]
    MissingBefore(&'static str),

    /// No codec for a kind string
    #[error("no codec registered for {0}")]
    NoCodec(String),

    /// A reference the receiver has never seen
    #[error("unknown reference {0}")]
    UnknownReference(u32),

    /// A list position pointing outside the previous list
    #[error("list position {position} out of range for {len} elements")]
    BadPosition { position: i64, len: usize },

    /// Malformed value
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Decoded tree did not fit its slot
    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    /// Transport failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
