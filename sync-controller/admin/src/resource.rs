use crate::{cache::Cache, cluster::Cluster, Error};
use apisix_sync_controller_core::{PluginConfig, Route};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{fmt, sync::Arc};

/// Response to a full-collection GET. Items nest under `node.items`; the
/// count is a decimal string.
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub count: Option<String>,
    pub node: Node,
}

#[derive(Debug, Deserialize)]
pub struct Node {
    pub key: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// One stored resource: a path-like key embedding the identifier, and the
/// value as an opaque document.
#[derive(Debug, Deserialize)]
pub struct Item {
    pub key: String,
    pub value: serde_json::Value,
}

/// Response to a single-resource write. `action` is `"create"` for PUT and
/// `"compareAndSwap"` for PATCH; the store applies both unconditionally.
#[derive(Debug, Deserialize)]
pub struct WriteResponse {
    pub action: String,
    pub node: Item,
}

impl Item {
    /// Identifier embedded in the store key (`{collection-key}/{id}`). The
    /// key is authoritative over any identifier inside the value document.
    pub fn id(&self) -> &str {
        self.key.rsplit('/').next().unwrap_or(&self.key)
    }

    /// Second decode pass: the opaque value document into the resource's own
    /// schema, with the key's identifier stamped on.
    pub fn resource<T: AdminResource>(&self) -> Result<T, Error> {
        let mut resource: T = serde_json::from_value(self.value.clone())?;
        resource.set_id(self.id().to_string());
        Ok(resource)
    }
}

/// A resource kind the admin store manages.
///
/// Implementations form a closed set: each names its collection path,
/// exposes its identifier, and resolves the kind's cache slot on a shared
/// [`Cluster`]. Adding a kind means adding an impl (and a cache slot), never
/// inspecting runtime types.
pub trait AdminResource:
    Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Kind label used in logs and metrics.
    const KIND: &'static str;

    /// Collection segment under the admin base path.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// The kind's cache slot on the shared cluster.
    fn cache(cluster: &Cluster) -> &Arc<dyn Cache<Self>>;
}

impl AdminResource for PluginConfig {
    const KIND: &'static str = "plugin_config";
    const COLLECTION: &'static str = "plugin_configs";

    fn id(&self) -> &str {
        &self.metadata.id
    }

    fn set_id(&mut self, id: String) {
        self.metadata.id = id;
    }

    fn cache(cluster: &Cluster) -> &Arc<dyn Cache<Self>> {
        cluster.plugin_config_cache()
    }
}

impl AdminResource for Route {
    const KIND: &'static str = "route";
    const COLLECTION: &'static str = "routes";

    fn id(&self) -> &str {
        &self.metadata.id
    }

    fn set_id(&mut self, id: String) {
        self.metadata.id = id;
    }

    fn cache(cluster: &Cluster) -> &Arc<dyn Cache<Self>> {
        cluster.route_cache()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_response_decodes_nested_items() {
        let list: ListResponse = serde_json::from_value(json!({
            "count": "2",
            "node": {
                "key": "/apisix/plugin_configs",
                "items": [
                    {"key": "/apisix/plugin_configs/1", "value": {"name": "a", "plugins": {}}},
                    {"key": "/apisix/plugin_configs/2", "value": {"name": "b", "plugins": {}}},
                ],
            },
        }))
        .unwrap();

        assert_eq!(list.count.as_deref(), Some("2"));
        assert_eq!(list.node.key, "/apisix/plugin_configs");
        assert_eq!(list.node.items.len(), 2);
        assert_eq!(list.node.items[0].id(), "1");
    }

    #[test]
    fn list_response_tolerates_missing_items() {
        let list: ListResponse = serde_json::from_value(json!({
            "count": "0",
            "node": {"key": "/apisix/plugin_configs"},
        }))
        .unwrap();
        assert!(list.node.items.is_empty());
    }

    #[test]
    fn write_response_yields_resource_with_key_identifier() {
        let write: WriteResponse = serde_json::from_value(json!({
            "action": "create",
            "node": {
                "key": "/apisix/plugin_configs/42",
                // The document's own id disagrees with the key; the key wins.
                "value": {"id": "7", "name": "test", "plugins": {"abc": "123"}},
            },
        }))
        .unwrap();

        assert_eq!(write.action, "create");
        let pc: PluginConfig = write.node.resource().unwrap();
        assert_eq!(pc.metadata.id, "42");
        assert_eq!(pc.metadata.name, "test");
        assert_eq!(pc.plugins.get("abc"), Some(&json!("123")));
    }

    #[test]
    fn malformed_wire_document_is_a_decode_error() {
        assert!(serde_json::from_value::<WriteResponse>(json!({"action": "create"})).is_err());

        let item = Item {
            key: "/apisix/plugin_configs/1".to_string(),
            value: json!("not an object"),
        };
        assert!(item.resource::<PluginConfig>().is_err());
    }
}
