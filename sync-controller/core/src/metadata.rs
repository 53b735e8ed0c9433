use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fields shared by every admin-store resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Identifier within the resource's collection. Empty until the remote
    /// store has assigned one; the store key, not this field, is
    /// authoritative after a write.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Human-readable name. Not required to be unique.
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_not_serialized() {
        let meta = Metadata {
            name: "test".to_string(),
            ..Default::default()
        };
        let doc = serde_json::to_value(&meta).unwrap();
        assert_eq!(doc, serde_json::json!({"name": "test"}));
    }
}
