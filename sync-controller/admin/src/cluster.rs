use crate::{
    cache::{Cache, MemoryCache},
    client::ResourceClient,
    metrics::AdminMetrics,
    resource::{AdminResource, ListResponse, WriteResponse},
    Error,
};
use apisix_sync_controller_core::{PluginConfig, Route};
use reqwest::StatusCode;
use std::{sync::Arc, time::Duration};
use tokio::sync::watch;

/// Construction-time settings for a [`Cluster`].
#[derive(Clone, Debug)]
pub struct ClusterConfig {
    /// Base URL of the admin API, e.g. `http://127.0.0.1:9180/apisix/admin`.
    pub base_url: String,

    /// Value sent as `X-API-KEY`, if the admin API requires one.
    pub admin_key: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,
}

/// Shared context for one gateway: the admin endpoint, the HTTP transport,
/// one cache per resource kind, the readiness gate and request metrics.
///
/// Clones share the same inner state. Everything but the cache contents is
/// immutable after construction; the caches are only written by the typed
/// clients' confirmed mutations and by [`sync_cache`](Cluster::sync_cache).
#[derive(Clone)]
pub struct Cluster {
    inner: Arc<Inner>,
}

struct Inner {
    base_url: String,
    admin_key: Option<String>,
    http: reqwest::Client,
    metrics: AdminMetrics,
    synced: watch::Receiver<bool>,
    plugin_configs: Arc<dyn Cache<PluginConfig>>,
    routes: Arc<dyn Cache<Route>>,
}

impl Cluster {
    /// Builds a cluster with in-memory caches. The readiness gate is
    /// injected: its sender is owned by whichever bootstrap performs the
    /// initial synchronization (and signals it exactly once).
    pub fn new(
        config: ClusterConfig,
        synced: watch::Receiver<bool>,
        metrics: AdminMetrics,
    ) -> Result<Self, Error> {
        Self::with_caches(
            config,
            synced,
            metrics,
            Arc::new(MemoryCache::default()),
            Arc::new(MemoryCache::default()),
        )
    }

    /// Like [`new`](Self::new), with caller-supplied cache implementations.
    pub fn with_caches(
        config: ClusterConfig,
        synced: watch::Receiver<bool>,
        metrics: AdminMetrics,
        plugin_configs: Arc<dyn Cache<PluginConfig>>,
        routes: Arc<dyn Cache<Route>>,
    ) -> Result<Self, Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            inner: Arc::new(Inner {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                admin_key: config.admin_key,
                http,
                metrics,
                synced,
                plugin_configs,
                routes,
            }),
        })
    }

    /// Typed client for the plugin-config collection.
    pub fn plugin_configs(&self) -> ResourceClient<PluginConfig> {
        ResourceClient::new(self.clone())
    }

    /// Typed client for the route collection.
    pub fn routes(&self) -> ResourceClient<Route> {
        ResourceClient::new(self.clone())
    }

    pub fn is_synced(&self) -> bool {
        *self.inner.synced.borrow()
    }

    /// Absorbs one full listing of every collection into the typed caches.
    /// Runs once at bootstrap, before the readiness gate is signaled;
    /// steady-state reads never re-fetch.
    pub async fn sync_cache(&self) -> Result<(), Error> {
        self.sync_collection::<PluginConfig>().await?;
        self.sync_collection::<Route>().await?;
        Ok(())
    }

    async fn sync_collection<T: AdminResource>(&self) -> Result<(), Error> {
        let resources = self.list_resources::<T>().await?;
        tracing::info!(
            kind = T::KIND,
            count = resources.len(),
            "Synchronized collection",
        );
        let cache = T::cache(self);
        for resource in resources {
            let id = resource.id().to_string();
            cache.insert(&id, resource);
        }
        Ok(())
    }

    /// Resolves once the initial synchronization has been signaled, or
    /// reports [`Error::Canceled`] if the gate's sender is gone.
    pub(crate) async fn wait_synced(&self) -> Result<(), Error> {
        let mut synced = self.inner.synced.clone();
        synced
            .wait_for(|ready| *ready)
            .await
            .map(|_| ())
            .map_err(|_| Error::Canceled)
    }

    pub(crate) fn plugin_config_cache(&self) -> &Arc<dyn Cache<PluginConfig>> {
        &self.inner.plugin_configs
    }

    pub(crate) fn route_cache(&self) -> &Arc<dyn Cache<Route>> {
        &self.inner.routes
    }

    fn collection_url<T: AdminResource>(&self) -> String {
        format!("{}/{}", self.inner.base_url, T::COLLECTION)
    }

    fn resource_url<T: AdminResource>(&self, id: &str) -> String {
        format!("{}/{}/{}", self.inner.base_url, T::COLLECTION, id)
    }

    pub(crate) async fn list_resources<T: AdminResource>(&self) -> Result<Vec<T>, Error> {
        let url = self.collection_url::<T>();
        let response = self.send::<T>(self.inner.http.get(&url), "GET").await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::UnexpectedStatus(status));
        }

        let list: ListResponse = serde_json::from_slice(&response.bytes().await?)?;
        list.node.items.iter().map(|item| item.resource()).collect()
    }

    pub(crate) async fn create_resource<T: AdminResource>(&self, obj: &T) -> Result<T, Error> {
        // An empty identifier lets the store assign one; the response key
        // carries the effective identifier either way.
        let url = if obj.id().is_empty() {
            self.collection_url::<T>()
        } else {
            self.resource_url::<T>(obj.id())
        };

        let response = self
            .send::<T>(self.inner.http.put(&url).json(obj), "PUT")
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus(status));
        }

        let write: WriteResponse = serde_json::from_slice(&response.bytes().await?)?;
        tracing::debug!(
            kind = T::KIND,
            action = %write.action,
            key = %write.node.key,
            "Created resource",
        );
        write.node.resource()
    }

    pub(crate) async fn update_resource<T: AdminResource>(&self, obj: &T) -> Result<T, Error> {
        let url = self.resource_url::<T>(obj.id());
        let response = self
            .send::<T>(self.inner.http.patch(&url).json(obj), "PATCH")
            .await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound);
        }
        if !status.is_success() {
            return Err(Error::UnexpectedStatus(status));
        }

        let write: WriteResponse = serde_json::from_slice(&response.bytes().await?)?;
        tracing::debug!(
            kind = T::KIND,
            action = %write.action,
            key = %write.node.key,
            "Updated resource",
        );
        write.node.resource()
    }

    pub(crate) async fn delete_resource<T: AdminResource>(&self, id: &str) -> Result<(), Error> {
        let url = self.resource_url::<T>(id);
        let response = self.send::<T>(self.inner.http.delete(&url), "DELETE").await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound);
        }
        if !status.is_success() {
            return Err(Error::UnexpectedStatus(status));
        }
        Ok(())
    }

    async fn send<T: AdminResource>(
        &self,
        request: reqwest::RequestBuilder,
        method: &'static str,
    ) -> Result<reqwest::Response, Error> {
        let request = match &self.inner.admin_key {
            Some(key) => request.header("X-API-KEY", key),
            None => request,
        };
        let response = request.send().await?;
        self.inner.metrics.record(T::KIND, method, response.status());
        Ok(response)
    }
}
