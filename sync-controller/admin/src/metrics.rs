use prometheus_client::{
    encoding::EncodeLabelSet,
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};
use reqwest::StatusCode;

/// Counters for admin API round trips.
#[derive(Clone, Debug, Default)]
pub struct AdminMetrics {
    requests: Family<RequestLabels, Counter>,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct RequestLabels {
    resource: String,
    method: String,
    code: u16,
}

impl AdminMetrics {
    pub fn register(prom: &mut Registry) -> Self {
        let requests = Family::default();
        prom.register(
            "admin_api_requests",
            "Count of admin API requests by resource, method and response code",
            requests.clone(),
        );
        Self { requests }
    }

    pub(crate) fn record(&self, resource: &str, method: &str, code: StatusCode) {
        self.requests
            .get_or_create(&RequestLabels {
                resource: resource.to_string(),
                method: method.to_string(),
                code: code.as_u16(),
            })
            .inc();
    }
}
