//! Client for an APISIX-style admin API.
//!
//! The admin store is a key-value collection per resource kind behind a
//! small HTTP protocol: ordered full listings, PUT-to-create,
//! unconditionally-applied PATCH (the store labels it `compareAndSwap`) and
//! DELETE. Each kind gets a typed [`ResourceClient`]; all clients of one
//! gateway share a [`Cluster`] bundling the transport, the per-kind caches
//! and a one-shot readiness gate. Reads are served from the caches once the
//! initial full synchronization has been absorbed, so steady-state list
//! traffic never round-trips to the gateway.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod cache;
mod client;
mod cluster;
mod metrics;
mod resource;

#[cfg(test)]
mod tests;

pub use self::{
    cache::{Cache, MemoryCache, NoopCache},
    client::ResourceClient,
    cluster::{Cluster, ClusterConfig},
    metrics::AdminMetrics,
    resource::{AdminResource, Item, ListResponse, Node, WriteResponse},
};

use reqwest::StatusCode;

/// Errors surfaced by admin API calls. All are returned to the caller;
/// a cache miss is the only condition handled locally (it is a valid
/// "unknown", not an error).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote store has no resource at the requested identifier.
    #[error("resource not found in the admin store")]
    NotFound,

    /// The remote answered with a status the operation's contract does not
    /// anticipate.
    #[error("unexpected admin API status {0}")]
    UnexpectedStatus(StatusCode),

    /// A response body did not match the admin protocol's shape.
    #[error("failed to decode admin API response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The request never completed: connection, TLS or timeout failure.
    #[error("admin API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The readiness gate was torn down while a caller was waiting on it;
    /// the cluster is shutting down.
    #[error("canceled while waiting for the initial synchronization")]
    Canceled,
}
