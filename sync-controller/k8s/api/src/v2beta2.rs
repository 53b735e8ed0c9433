use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Route configuration, first beta schema. Backends hang off each HTTP rule;
/// plugins are not yet expressible at this version.
#[derive(Clone, Debug, Default, PartialEq, CustomResource, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "apisix.apache.org",
    version = "v2beta2",
    kind = "ApisixRoute",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ApisixRouteSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub http: Vec<ApisixRouteHTTP>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApisixRouteHTTP {
    pub name: String,

    #[serde(rename = "match")]
    pub route_match: ApisixRouteHTTPMatch,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backends: Vec<ApisixRouteHTTPBackend>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApisixRouteHTTPMatch {
    pub paths: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApisixRouteHTTPBackend {
    pub service_name: String,
    pub service_port: i32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<i32>,
}
