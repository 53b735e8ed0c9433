//! Multi-version views over the `apisix.apache.org` custom resources.
//!
//! The cluster may serve the same logical kind at several structurally
//! different schema versions, each watched into its own version-specific
//! store. This crate provides:
//!
//! - an envelope per kind ([`ApisixRoute`], [`ApisixPluginConfig`]) that
//!   wraps exactly one version of the underlying object behind a common
//!   identity/version surface, so downstream code can carry "a route"
//!   without caring which index produced it;
//! - a lister per kind ([`ApisixRouteLister`], [`ApisixPluginConfigLister`])
//!   that routes a namespace/name lookup to the requested version's store
//!   and wraps the hit in the envelope;
//! - [`spawn_store`], the watch plumbing that keeps each version-specific
//!   store current.
//!
//! Listers do no caching of their own; the stores are the watch-fed local
//! state.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod plugin_config;
mod route;
mod store;


pub use self::{
    plugin_config::{ApisixPluginConfig, ApisixPluginConfigLister},
    route::{ApisixRoute, ApisixRouteLister},
    store::{spawn_store, StoreError},
};

use std::fmt;

/// Served versions of the `apisix.apache.org` group.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GroupVersion {
    V2beta2,
    V2beta3,
    V2,
}

impl GroupVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupVersion::V2beta2 => "apisix.apache.org/v2beta2",
            GroupVersion::V2beta3 => "apisix.apache.org/v2beta3",
            GroupVersion::V2 => "apisix.apache.org/v2",
        }
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for GroupVersion {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apisix.apache.org/v2beta2" => Ok(GroupVersion::V2beta2),
            "apisix.apache.org/v2beta3" => Ok(GroupVersion::V2beta3),
            "apisix.apache.org/v2" => Ok(GroupVersion::V2),
            other => Err(ResourceError::UnsupportedVersion(other.to_string())),
        }
    }
}

/// Failures constructing or unwrapping a versioned envelope.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// The object's apiVersion is not one this controller serves.
    #[error("unsupported group/version {0:?}")]
    UnsupportedVersion(String),

    /// A version-specific accessor was invoked on an envelope holding a
    /// different version.
    #[error("resource is {found}, not {expected}")]
    VersionMismatch {
        expected: GroupVersion,
        found: GroupVersion,
    },

    /// The object claimed a served apiVersion but did not match its schema.
    #[error("failed to decode {api_version} object: {source}")]
    Decode {
        api_version: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A namespace/name lookup that missed its version-specific store.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{kind} {namespace}/{name} not found")]
pub struct NotFound {
    pub kind: &'static str,
    pub namespace: String,
    pub name: String,
}

pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    api_version: &str,
    obj: &kube::core::DynamicObject,
) -> Result<T, ResourceError> {
    serde_json::to_value(obj)
        .and_then(serde_json::from_value)
        .map_err(|source| ResourceError::Decode {
            api_version: api_version.to_string(),
            source,
        })
}
