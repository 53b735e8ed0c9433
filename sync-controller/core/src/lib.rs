//! Domain objects mirrored into the gateway's admin store.
//!
//! These are the process-side representation of admin-store resources: the
//! admin client serializes them into the store's wire documents and decodes
//! responses back into them. Translation from cluster custom resources into
//! these types happens in the (separate) reconciliation layer.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod metadata;
mod plugin_config;
mod route;

pub use self::{metadata::Metadata, plugin_config::PluginConfig, route::Route};

/// Named plugin blocks attached to a resource. Keys are plugin names, unique
/// within the map; values are each plugin's own configuration document,
/// passed through opaquely.
pub type Plugins = std::collections::HashMap<String, serde_json::Value>;
