use crate::{GroupVersion, NotFound, ResourceError};
use apisix_sync_controller_k8s_api::{v2, v2beta2, v2beta3, ResourceExt};
use kube::{
    core::DynamicObject,
    runtime::reflector::{ObjectRef, Store},
};
use std::sync::Arc;

/// An `ApisixRoute` at whichever schema version the cluster stored it.
///
/// Exactly one variant is populated and the tag is the variant, so the two
/// can never disagree. The checked `as_*` accessors report a
/// [`ResourceError::VersionMismatch`] when asked for the wrong version; the
/// `expect_*` siblings panic instead and are reserved for call sites that
/// have already checked [`group_version`](Self::group_version) — reaching
/// that panic is a programming defect, not a runtime condition.
#[derive(Clone, Debug)]
pub enum ApisixRoute {
    V2beta2(Arc<v2beta2::ApisixRoute>),
    V2beta3(Arc<v2beta3::ApisixRoute>),
    V2(Arc<v2::ApisixRoute>),
}

impl ApisixRoute {
    pub fn group_version(&self) -> GroupVersion {
        match self {
            ApisixRoute::V2beta2(_) => GroupVersion::V2beta2,
            ApisixRoute::V2beta3(_) => GroupVersion::V2beta3,
            ApisixRoute::V2(_) => GroupVersion::V2,
        }
    }

    /// Change-token the API server assigned to the wrapped object, captured
    /// at resolution time.
    pub fn resource_version(&self) -> String {
        match self {
            ApisixRoute::V2beta2(route) => route.resource_version().unwrap_or_default(),
            ApisixRoute::V2beta3(route) => route.resource_version().unwrap_or_default(),
            ApisixRoute::V2(route) => route.resource_version().unwrap_or_default(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            ApisixRoute::V2beta2(route) => route.name_unchecked(),
            ApisixRoute::V2beta3(route) => route.name_unchecked(),
            ApisixRoute::V2(route) => route.name_unchecked(),
        }
    }

    pub fn namespace(&self) -> Option<String> {
        match self {
            ApisixRoute::V2beta2(route) => route.namespace(),
            ApisixRoute::V2beta3(route) => route.namespace(),
            ApisixRoute::V2(route) => route.namespace(),
        }
    }

    pub fn as_v2beta2(&self) -> Result<&v2beta2::ApisixRoute, ResourceError> {
        match self {
            ApisixRoute::V2beta2(route) => Ok(route),
            other => Err(ResourceError::VersionMismatch {
                expected: GroupVersion::V2beta2,
                found: other.group_version(),
            }),
        }
    }

    pub fn as_v2beta3(&self) -> Result<&v2beta3::ApisixRoute, ResourceError> {
        match self {
            ApisixRoute::V2beta3(route) => Ok(route),
            other => Err(ResourceError::VersionMismatch {
                expected: GroupVersion::V2beta3,
                found: other.group_version(),
            }),
        }
    }

    pub fn as_v2(&self) -> Result<&v2::ApisixRoute, ResourceError> {
        match self {
            ApisixRoute::V2(route) => Ok(route),
            other => Err(ResourceError::VersionMismatch {
                expected: GroupVersion::V2,
                found: other.group_version(),
            }),
        }
    }

    /// Panicking form of [`as_v2beta2`](Self::as_v2beta2); callers must have
    /// checked the tag.
    pub fn expect_v2beta2(&self) -> &v2beta2::ApisixRoute {
        self.as_v2beta2()
            .expect("route is not apisix.apache.org/v2beta2")
    }

    /// Panicking form of [`as_v2beta3`](Self::as_v2beta3); callers must have
    /// checked the tag.
    pub fn expect_v2beta3(&self) -> &v2beta3::ApisixRoute {
        self.as_v2beta3()
            .expect("route is not apisix.apache.org/v2beta3")
    }

    /// Panicking form of [`as_v2`](Self::as_v2); callers must have checked
    /// the tag.
    pub fn expect_v2(&self) -> &v2::ApisixRoute {
        self.as_v2().expect("route is not apisix.apache.org/v2")
    }
}

impl From<Arc<v2beta2::ApisixRoute>> for ApisixRoute {
    fn from(route: Arc<v2beta2::ApisixRoute>) -> Self {
        ApisixRoute::V2beta2(route)
    }
}

impl From<Arc<v2beta3::ApisixRoute>> for ApisixRoute {
    fn from(route: Arc<v2beta3::ApisixRoute>) -> Self {
        ApisixRoute::V2beta3(route)
    }
}

impl From<Arc<v2::ApisixRoute>> for ApisixRoute {
    fn from(route: Arc<v2::ApisixRoute>) -> Self {
        ApisixRoute::V2(route)
    }
}

impl From<v2beta2::ApisixRoute> for ApisixRoute {
    fn from(route: v2beta2::ApisixRoute) -> Self {
        ApisixRoute::V2beta2(Arc::new(route))
    }
}

impl From<v2beta3::ApisixRoute> for ApisixRoute {
    fn from(route: v2beta3::ApisixRoute) -> Self {
        ApisixRoute::V2beta3(Arc::new(route))
    }
}

impl From<v2::ApisixRoute> for ApisixRoute {
    fn from(route: v2::ApisixRoute) -> Self {
        ApisixRoute::V2(Arc::new(route))
    }
}

/// Constructs an envelope from an untyped object by dispatching on its
/// `apiVersion`. Unknown versions are reported, not guessed at.
impl TryFrom<&DynamicObject> for ApisixRoute {
    type Error = ResourceError;

    fn try_from(obj: &DynamicObject) -> Result<Self, Self::Error> {
        let api_version = obj
            .types
            .as_ref()
            .map(|t| t.api_version.clone())
            .unwrap_or_default();
        match api_version.parse::<GroupVersion>()? {
            GroupVersion::V2beta2 => {
                let route: v2beta2::ApisixRoute = crate::decode(&api_version, obj)?;
                Ok(route.into())
            }
            GroupVersion::V2beta3 => {
                let route: v2beta3::ApisixRoute = crate::decode(&api_version, obj)?;
                Ok(route.into())
            }
            GroupVersion::V2 => {
                let route: v2::ApisixRoute = crate::decode(&api_version, obj)?;
                Ok(route.into())
            }
        }
    }
}

/// Routes a namespace/name lookup to the requested version's store and wraps
/// the hit in an [`ApisixRoute`].
#[derive(Clone)]
pub struct ApisixRouteLister {
    v2beta2: Store<v2beta2::ApisixRoute>,
    v2beta3: Store<v2beta3::ApisixRoute>,
    v2: Store<v2::ApisixRoute>,
}

impl ApisixRouteLister {
    pub fn new(
        v2beta2: Store<v2beta2::ApisixRoute>,
        v2beta3: Store<v2beta3::ApisixRoute>,
        v2: Store<v2::ApisixRoute>,
    ) -> Self {
        Self {
            v2beta2,
            v2beta3,
            v2,
        }
    }

    pub fn v2beta2(&self, namespace: &str, name: &str) -> Result<ApisixRoute, NotFound> {
        self.v2beta2
            .get(&ObjectRef::new(name).within(namespace))
            .map(ApisixRoute::from)
            .ok_or_else(|| not_found(namespace, name))
    }

    pub fn v2beta3(&self, namespace: &str, name: &str) -> Result<ApisixRoute, NotFound> {
        self.v2beta3
            .get(&ObjectRef::new(name).within(namespace))
            .map(ApisixRoute::from)
            .ok_or_else(|| not_found(namespace, name))
    }

    pub fn v2(&self, namespace: &str, name: &str) -> Result<ApisixRoute, NotFound> {
        self.v2
            .get(&ObjectRef::new(name).within(namespace))
            .map(ApisixRoute::from)
            .ok_or_else(|| not_found(namespace, name))
    }

    /// Raw store handle, for callers that need index-level operations like
    /// bulk listing.
    pub fn v2beta3_store(&self) -> &Store<v2beta3::ApisixRoute> {
        &self.v2beta3
    }

    /// Raw store handle, for callers that need index-level operations like
    /// bulk listing.
    pub fn v2_store(&self) -> &Store<v2::ApisixRoute> {
        &self.v2
    }
}

fn not_found(namespace: &str, name: &str) -> NotFound {
    NotFound {
        kind: "ApisixRoute",
        namespace: namespace.to_string(),
        name: name.to_string(),
    }
}
