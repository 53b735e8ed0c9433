use crate::{
    admin::{AdminMetrics, Cluster, ClusterConfig},
    index, k8s,
};
use anyhow::{bail, Result};
use clap::Parser;
use kube::Api;
use prometheus_client::registry::Registry;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Parser)]
#[clap(
    name = "apisix-sync",
    about = "Synchronizes cluster resources into the gateway's admin store"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "apisix_sync=info,warn",
        env = "APISIX_SYNC_CONTROLLER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    #[clap(flatten)]
    admin: kubert::AdminArgs,

    /// Base URL of the gateway's admin API.
    #[clap(long, default_value = "http://127.0.0.1:9180/apisix/admin")]
    apisix_base_url: String,

    /// Key sent as `X-API-KEY` on every admin API request.
    #[clap(long, env = "APISIX_SYNC_CONTROLLER_ADMIN_KEY")]
    apisix_admin_key: Option<String>,

    /// Admin API request timeout.
    #[clap(long, default_value = "5000")]
    apisix_timeout_ms: u64,
}

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            admin,
            apisix_base_url,
            apisix_admin_key,
            apisix_timeout_ms,
        } = self;

        let mut prom = <Registry>::default();
        let admin_metrics = AdminMetrics::register(prom.sub_registry_with_prefix("apisix"));
        let rt_metrics = kubert::RuntimeMetrics::register(prom.sub_registry_with_prefix("kube"));

        let runtime = kubert::Runtime::builder()
            .with_log(log_level, log_format)
            .with_metrics(rt_metrics)
            .with_admin(admin.into_builder().with_prometheus(prom))
            .with_client(client)
            .build()
            .await?;

        let client = runtime.client();

        // Version-specific stores backing the multi-version listers. Each
        // blocks until its first full list has been absorbed.
        let routes_v2beta2 =
            index::spawn_store(Api::<k8s::v2beta2::ApisixRoute>::all(client.clone())).await?;
        let routes_v2beta3 =
            index::spawn_store(Api::<k8s::v2beta3::ApisixRoute>::all(client.clone())).await?;
        let routes_v2 = index::spawn_store(Api::<k8s::v2::ApisixRoute>::all(client.clone())).await?;
        let plugin_configs_v2 =
            index::spawn_store(Api::<k8s::v2::ApisixPluginConfig>::all(client)).await?;

        let route_lister =
            index::ApisixRouteLister::new(routes_v2beta2, routes_v2beta3, routes_v2);
        let plugin_config_lister = index::ApisixPluginConfigLister::new(plugin_configs_v2);
        tracing::debug!(
            routes_v2 = route_lister.v2_store().state().len(),
            routes_v2beta3 = route_lister.v2beta3_store().state().len(),
            plugin_configs_v2 = plugin_config_lister.v2_store().state().len(),
            "Indexes primed",
        );

        // The readiness gate: flipped exactly once, after the first full
        // admin-store listing lands in the caches.
        let (synced_tx, synced_rx) = watch::channel(false);
        let cluster = Cluster::new(
            ClusterConfig {
                base_url: apisix_base_url,
                admin_key: apisix_admin_key,
                timeout: Duration::from_millis(apisix_timeout_ms),
            },
            synced_rx,
            admin_metrics,
        )?;

        cluster.sync_cache().await?;
        synced_tx.send_replace(true);
        info!("Admin store synchronized; lists are served from cache");

        // The reconciliation layer attaches here: it resolves envelopes
        // through the listers and drives `cluster.plugin_configs()` /
        // `cluster.routes()`.

        if runtime.run().await.is_err() {
            bail!("Aborted");
        }

        Ok(())
    }
}
