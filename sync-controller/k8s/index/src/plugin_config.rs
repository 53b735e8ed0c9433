use crate::{GroupVersion, NotFound, ResourceError};
use apisix_sync_controller_k8s_api::{v2, ResourceExt};
use kube::{
    core::DynamicObject,
    runtime::reflector::{ObjectRef, Store},
};
use std::sync::Arc;

/// An `ApisixPluginConfig` at whichever schema version the cluster stored
/// it. The kind is served at v2 only today; the envelope keeps the same
/// shape as the route's so additional versions are a new variant, not a new
/// pattern.
#[derive(Clone, Debug)]
pub enum ApisixPluginConfig {
    V2(Arc<v2::ApisixPluginConfig>),
}

impl ApisixPluginConfig {
    pub fn group_version(&self) -> GroupVersion {
        match self {
            ApisixPluginConfig::V2(_) => GroupVersion::V2,
        }
    }

    /// Change-token the API server assigned to the wrapped object, captured
    /// at resolution time.
    pub fn resource_version(&self) -> String {
        match self {
            ApisixPluginConfig::V2(pc) => pc.resource_version().unwrap_or_default(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            ApisixPluginConfig::V2(pc) => pc.name_unchecked(),
        }
    }

    pub fn namespace(&self) -> Option<String> {
        match self {
            ApisixPluginConfig::V2(pc) => pc.namespace(),
        }
    }

    pub fn as_v2(&self) -> Result<&v2::ApisixPluginConfig, ResourceError> {
        match self {
            ApisixPluginConfig::V2(pc) => Ok(pc),
        }
    }

    /// Panicking form of [`as_v2`](Self::as_v2); callers must have checked
    /// the tag.
    pub fn expect_v2(&self) -> &v2::ApisixPluginConfig {
        self.as_v2()
            .expect("plugin config is not apisix.apache.org/v2")
    }
}

impl From<Arc<v2::ApisixPluginConfig>> for ApisixPluginConfig {
    fn from(pc: Arc<v2::ApisixPluginConfig>) -> Self {
        ApisixPluginConfig::V2(pc)
    }
}

impl From<v2::ApisixPluginConfig> for ApisixPluginConfig {
    fn from(pc: v2::ApisixPluginConfig) -> Self {
        ApisixPluginConfig::V2(Arc::new(pc))
    }
}

impl TryFrom<&DynamicObject> for ApisixPluginConfig {
    type Error = ResourceError;

    fn try_from(obj: &DynamicObject) -> Result<Self, Self::Error> {
        let api_version = obj
            .types
            .as_ref()
            .map(|t| t.api_version.clone())
            .unwrap_or_default();
        match api_version.as_str() {
            "apisix.apache.org/v2" => {
                let pc: v2::ApisixPluginConfig = crate::decode(&api_version, obj)?;
                Ok(pc.into())
            }
            other => Err(ResourceError::UnsupportedVersion(other.to_string())),
        }
    }
}

/// Single-version lister for `ApisixPluginConfig`.
#[derive(Clone)]
pub struct ApisixPluginConfigLister {
    v2: Store<v2::ApisixPluginConfig>,
}

impl ApisixPluginConfigLister {
    pub fn new(v2: Store<v2::ApisixPluginConfig>) -> Self {
        Self { v2 }
    }

    pub fn v2(&self, namespace: &str, name: &str) -> Result<ApisixPluginConfig, NotFound> {
        self.v2
            .get(&ObjectRef::new(name).within(namespace))
            .map(ApisixPluginConfig::from)
            .ok_or_else(|| NotFound {
                kind: "ApisixPluginConfig",
                namespace: namespace.to_string(),
                name: name.to_string(),
            })
    }

    /// Raw store handle, for callers that need index-level operations like
    /// bulk listing.
    pub fn v2_store(&self) -> &Store<v2::ApisixPluginConfig> {
        &self.v2
    }
}
