use futures::StreamExt;
use kube::{
    api::Api,
    runtime::{reflector, reflector::Store, watcher, WatchStreamExt},
    Resource,
};
use serde::de::DeserializeOwned;
use std::{fmt::Debug, hash::Hash};
use tracing::Instrument;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store failed to become ready: {0}")]
    NotReady(String),
}

/// Spawns a watch that keeps a local store of `K` current and returns the
/// read half once the first full list has been absorbed.
pub async fn spawn_store<K>(api: Api<K>) -> Result<Store<K>, StoreError>
where
    K: Resource + Clone + Debug + DeserializeOwned + Send + Sync + 'static,
    K::DynamicType: Default + Eq + Hash + Clone,
{
    let (store, writer) = reflector::store();

    let kind = K::kind(&Default::default()).to_string();
    let stream = reflector::reflector(
        writer,
        watcher(api, watcher::Config::default()).default_backoff(),
    )
    .for_each(|event| async move {
        match event {
            Ok(event) => tracing::trace!(?event, "Watch event"),
            Err(error) => tracing::warn!(%error, "Watch stream error"),
        }
    });
    tokio::spawn(stream.instrument(tracing::debug_span!("watch", kind = %kind)));

    store
        .wait_until_ready()
        .await
        .map_err(|error| StoreError::NotReady(error.to_string()))?;
    Ok(store)
}
