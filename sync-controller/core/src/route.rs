use crate::{Metadata, Plugins};
use serde::{Deserialize, Serialize};

/// A routing entry in the admin store.
///
/// Only the synchronization-relevant fields are modeled; traffic-matching
/// details beyond these flow through `plugins` untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    #[serde(flatten)]
    pub metadata: Metadata,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uris: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_id: Option<String>,

    /// Reference to a shared [`crate::PluginConfig`] by identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_config_id: Option<String>,

    #[serde(default)]
    pub plugins: Plugins,
}
