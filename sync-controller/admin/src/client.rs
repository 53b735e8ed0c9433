use crate::{resource::AdminResource, Cluster, Error};
use std::{marker::PhantomData, sync::Arc};

/// Typed admin-API client for one resource kind.
///
/// Every operation runs on the caller's task and makes at most one remote
/// round trip; cancellation is dropping the returned future, which is safe
/// at both suspension points (the round trip and the readiness wait).
///
/// Writes racing on the same identifier from concurrent tasks are resolved
/// purely by arrival order at the remote store. The protocol offers no
/// per-object lock and this client does not invent one; the caches only ever
/// reflect a response the store actually returned.
#[derive(Clone)]
pub struct ResourceClient<T> {
    cluster: Cluster,
    _kind: PhantomData<fn() -> T>,
}

impl<T: AdminResource> ResourceClient<T> {
    pub(crate) fn new(cluster: Cluster) -> Self {
        Self {
            cluster,
            _kind: PhantomData,
        }
    }

    /// Writes `obj` to the remote store and caches the persisted state.
    ///
    /// The returned object carries the identifier from the response key,
    /// which is authoritative even when the request already named one.
    pub async fn create(&self, obj: &T) -> Result<T, Error> {
        tracing::debug!(kind = T::KIND, id = %obj.id(), "Creating resource");
        let created = self.cluster.create_resource(obj).await?;
        T::cache(&self.cluster).insert(created.id(), created.clone());
        Ok(created)
    }

    /// Returns the cached snapshot of the collection, ordered by identifier
    /// (the remote store's own key order, so diffs are deterministic).
    ///
    /// Blocks until the initial synchronization has been signaled; once it
    /// has, the snapshot is served from memory with no remote round trip.
    pub async fn list(&self) -> Result<Vec<Arc<T>>, Error> {
        self.cluster.wait_synced().await?;
        let mut resources = T::cache(&self.cluster).list();
        resources.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(resources)
    }

    /// Replaces the remote value at `obj`'s identifier and caches the
    /// persisted state.
    ///
    /// The store applies the patch unconditionally to whatever it currently
    /// holds (its response still labels the action `compareAndSwap`), so
    /// last write wins at identifier granularity. A missing identifier is
    /// reported as [`Error::NotFound`], never upgraded to a create.
    pub async fn update(&self, obj: &T) -> Result<T, Error> {
        tracing::debug!(kind = T::KIND, id = %obj.id(), "Updating resource");
        let updated = self.cluster.update_resource(obj).await?;
        T::cache(&self.cluster).insert(updated.id(), updated.clone());
        Ok(updated)
    }

    /// Removes `obj` from the remote store, then from the cache.
    ///
    /// A 404 is surfaced as [`Error::NotFound`] so the caller can decide
    /// whether an already-absent resource is acceptable; the cache entry is
    /// only dropped once the store confirms the delete.
    pub async fn delete(&self, obj: &T) -> Result<(), Error> {
        tracing::debug!(kind = T::KIND, id = %obj.id(), "Deleting resource");
        self.cluster.delete_resource::<T>(obj.id()).await?;
        T::cache(&self.cluster).delete(obj.id());
        Ok(())
    }
}
