//! Wire messages

use lst_tree::TreeId;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// What happened to one slot since the last transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RpcState {
    NoChange,
    Add,
    Delete,
    Change,
    EndOfObject,
}

impl Display for RpcState {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoChange => "NO_CHANGE",
            Self::Add => "ADD",
            Self::Delete => "DELETE",
            Self::Change => "CHANGE",
            Self::EndOfObject => "END_OF_OBJECT",
        })
    }
}

/// One message in a send queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcObjectData {
    pub state: RpcState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<u32>,
}

impl RpcObjectData {
    #[must_use]
    pub fn new(state: RpcState) -> Self {
        Self {
            state,
            value_type: None,
            value: None,
            reference: None,
        }
    }

    #[must_use]
    pub fn no_change() -> Self {
        Self::new(RpcState::NoChange)
    }

    #[must_use]
    pub fn delete() -> Self {
        Self::new(RpcState::Delete)
    }

    #[must_use]
    pub fn end_of_object() -> Self {
        Self::new(RpcState::EndOfObject)
    }

    #[must_use]
    pub fn with_value_type(mut self, value_type: impl Into<String>) -> Self {
        self.value_type = Some(value_type.into());
        self
    }

    #[must_use]
    pub fn with_value(mut self, value: serde_json::Value) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_reference(mut self, reference: u32) -> Self {
        self.reference = Some(reference);
        self
    }
}

/// All messages describing one root object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcBatch {
    /// Id of the root tree
    pub id: TreeId,
    pub data: Vec<RpcObjectData>,
}

impl RpcBatch {
    /// Number of messages in the given state
    #[must_use]
    pub fn count(&self, state: RpcState) -> usize {
        self.data.iter().filter(|d| d.state == state).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_data_json_shape() {
        let data = RpcObjectData::new(RpcState::Add)
            .with_value_type("marker.Markers")
            .with_reference(3);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"state": "ADD", "valueType": "marker.Markers", "ref": 3})
        );
    }

    #[test]
    fn end_of_object_is_bare() {
        let json = serde_json::to_string(&RpcObjectData::end_of_object()).unwrap();
        assert_eq!(json, r#"{"state":"END_OF_OBJECT"}"#);
    }
}
