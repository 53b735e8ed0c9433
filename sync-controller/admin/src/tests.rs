use crate::{AdminMetrics, Cluster, ClusterConfig, Error};
use apisix_sync_controller_core::{Metadata, PluginConfig};
use hyper::{
    body,
    service::{make_service_fn, service_fn},
    Body, Method, Request, Response, Server, StatusCode,
};
use parking_lot::Mutex;
use serde_json::json;
use std::{collections::BTreeMap, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::watch;

/// In-memory rendition of the admin store: items keyed by
/// `/apisix/{collection}/{id}`, listed in key order, PUT-to-create with
/// store-assigned identifiers when the path names none, unconditional PATCH
/// labeled `compareAndSwap`.
#[derive(Default)]
struct FakeState {
    items: BTreeMap<String, serde_json::Value>,
    next_id: u64,
    list_requests: u64,
}

type SrvState = Arc<Mutex<FakeState>>;

struct FakeServer {
    addr: SocketAddr,
    state: SrvState,
}

fn spawn_admin_server() -> FakeServer {
    let state: SrvState = Arc::new(Mutex::new(FakeState::default()));
    let srv_state = state.clone();
    let make = make_service_fn(move |_conn| {
        let state = srv_state.clone();
        async move {
            Ok::<_, hyper::Error>(service_fn(move |req| handle(state.clone(), req)))
        }
    });
    let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make);
    let addr = server.local_addr();
    tokio::spawn(server);
    FakeServer { addr, state }
}

async fn handle(state: SrvState, req: Request<Body>) -> Result<Response<Body>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let bytes = body::to_bytes(req.into_body()).await?;

    let Some(rest) = path.strip_prefix("/apisix/admin/") else {
        return Ok(status(StatusCode::NOT_FOUND));
    };
    let (collection, id) = match rest.split_once('/') {
        Some((collection, id)) => (collection.to_string(), Some(id.to_string())),
        None => (rest.to_string(), None),
    };
    let collection_key = format!("/apisix/{collection}");

    match method {
        Method::GET => {
            let mut state = state.lock();
            state.list_requests += 1;
            let prefix = format!("{collection_key}/");
            let items: Vec<serde_json::Value> = state
                .items
                .iter()
                .filter(|(key, _)| key.starts_with(&prefix))
                .map(|(key, value)| json!({"key": key, "value": value}))
                .collect();
            let body = json!({
                "count": items.len().to_string(),
                "node": {"key": collection_key, "items": items},
            });
            Ok(json_response(StatusCode::OK, &body))
        }

        Method::PUT => {
            let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or_default();
            let mut state = state.lock();
            let id = match id {
                Some(id) => id,
                None => {
                    state.next_id += 1;
                    state.next_id.to_string()
                }
            };
            if id == "boom" {
                return Ok(status(StatusCode::INTERNAL_SERVER_ERROR));
            }
            let key = format!("{collection_key}/{id}");
            state.items.insert(key.clone(), value.clone());
            let body = json!({"action": "create", "node": {"key": key, "value": value}});
            Ok(json_response(StatusCode::CREATED, &body))
        }

        Method::PATCH => {
            let Some(id) = id else {
                return Ok(status(StatusCode::NOT_FOUND));
            };
            let key = format!("{collection_key}/{id}");
            let mut state = state.lock();
            if !state.items.contains_key(&key) {
                return Ok(status(StatusCode::NOT_FOUND));
            }
            let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or_default();
            state.items.insert(key.clone(), value.clone());
            let body = json!({"action": "compareAndSwap", "node": {"key": key, "value": value}});
            Ok(json_response(StatusCode::OK, &body))
        }

        Method::DELETE => {
            let Some(id) = id else {
                return Ok(status(StatusCode::NOT_FOUND));
            };
            let key = format!("{collection_key}/{id}");
            let mut state = state.lock();
            if state.items.remove(&key).is_some() {
                Ok(status(StatusCode::OK))
            } else {
                Ok(status(StatusCode::NOT_FOUND))
            }
        }

        _ => Ok(status(StatusCode::METHOD_NOT_ALLOWED)),
    }
}

fn status(code: StatusCode) -> Response<Body> {
    Response::builder().status(code).body(Body::empty()).unwrap()
}

fn json_response(code: StatusCode, body: &serde_json::Value) -> Response<Body> {
    Response::builder()
        .status(code)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn new_cluster(addr: SocketAddr, synced: watch::Receiver<bool>) -> Cluster {
    Cluster::new(
        ClusterConfig {
            base_url: format!("http://{addr}/apisix/admin"),
            admin_key: None,
            timeout: Duration::from_secs(5),
        },
        synced,
        AdminMetrics::default(),
    )
    .expect("failed to build cluster")
}

fn plugin_config(id: &str, name: &str, plugins: &[(&str, &str)]) -> PluginConfig {
    PluginConfig {
        metadata: Metadata {
            id: id.to_string(),
            name: name.to_string(),
            ..Default::default()
        },
        plugins: plugins
            .iter()
            .map(|(name, value)| (name.to_string(), json!(value)))
            .collect(),
    }
}

#[tokio::test]
async fn plugin_config_crud_round_trip() {
    let server = spawn_admin_server();
    let (_synced_tx, synced_rx) = watch::channel(true);
    let client = new_cluster(server.addr, synced_rx).plugin_configs();

    let created = client
        .create(&plugin_config("1", "test", &[("abc", "123")]))
        .await
        .unwrap();
    assert_eq!(created.metadata.id, "1");

    let created = client
        .create(&plugin_config("2", "test", &[("abc2", "123")]))
        .await
        .unwrap();
    assert_eq!(created.metadata.id, "2");

    let objs = client.list().await.unwrap();
    assert_eq!(objs.len(), 2);
    assert_eq!(objs[0].metadata.id, "1");
    assert_eq!(objs[1].metadata.id, "2");

    client.delete(&objs[0]).await.unwrap();
    let objs = client.list().await.unwrap();
    assert_eq!(objs.len(), 1);
    assert_eq!(objs[0].metadata.id, "2");

    // A full replace: plugin blocks absent from the update are gone.
    let update = plugin_config("2", "test", &[("abc2", "456"), ("key2", "test update")]);
    client.update(&update).await.unwrap();
    let objs = client.list().await.unwrap();
    assert_eq!(objs.len(), 1);
    assert_eq!(objs[0].metadata.id, "2");
    assert_eq!(objs[0].plugins, update.plugins);

    // Every list above was served from the cache snapshot.
    assert_eq!(server.state.lock().list_requests, 0);
}

#[tokio::test]
async fn list_orders_by_identifier_regardless_of_creation_order() {
    let server = spawn_admin_server();
    let (_synced_tx, synced_rx) = watch::channel(true);
    let client = new_cluster(server.addr, synced_rx).plugin_configs();

    client
        .create(&plugin_config("2", "b", &[]))
        .await
        .unwrap();
    client
        .create(&plugin_config("1", "a", &[]))
        .await
        .unwrap();

    let ids: Vec<String> = client
        .list()
        .await
        .unwrap()
        .iter()
        .map(|pc| pc.metadata.id.clone())
        .collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[tokio::test]
async fn create_without_identifier_takes_the_store_assigned_key() {
    let server = spawn_admin_server();
    let (_synced_tx, synced_rx) = watch::channel(true);
    let client = new_cluster(server.addr, synced_rx).plugin_configs();

    let created = client
        .create(&plugin_config("", "anonymous", &[("abc", "1")]))
        .await
        .unwrap();
    assert_eq!(created.metadata.id, "1");

    let objs = client.list().await.unwrap();
    assert_eq!(objs.len(), 1);
    assert_eq!(objs[0].metadata.id, "1");
    assert_eq!(objs[0].metadata.name, "anonymous");
}

#[tokio::test]
async fn update_of_an_absent_resource_reports_not_found() {
    let server = spawn_admin_server();
    let (_synced_tx, synced_rx) = watch::channel(true);
    let client = new_cluster(server.addr, synced_rx).plugin_configs();

    match client.update(&plugin_config("9", "ghost", &[])).await {
        Err(Error::NotFound) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn delete_of_an_absent_identifier_reports_not_found() {
    let server = spawn_admin_server();
    let (_synced_tx, synced_rx) = watch::channel(true);
    let client = new_cluster(server.addr, synced_rx).plugin_configs();

    client
        .create(&plugin_config("1", "survivor", &[]))
        .await
        .unwrap();

    match client.delete(&plugin_config("9", "ghost", &[])).await {
        Err(Error::NotFound) => {}
        other => panic!("expected NotFound, got {other:?}"),
    }

    // The failed delete must not have touched the cache.
    let objs = client.list().await.unwrap();
    assert_eq!(objs.len(), 1);
    assert_eq!(objs[0].metadata.id, "1");
}

#[tokio::test]
async fn unanticipated_status_is_surfaced_distinctly() {
    let server = spawn_admin_server();
    let (_synced_tx, synced_rx) = watch::channel(true);
    let client = new_cluster(server.addr, synced_rx).plugin_configs();

    match client.create(&plugin_config("boom", "bad", &[])).await {
        Err(Error::UnexpectedStatus(code)) => assert_eq!(code.as_u16(), 500),
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }

    // Nothing was cached for the failed write.
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_waits_for_the_readiness_gate() {
    let server = spawn_admin_server();
    let (synced_tx, synced_rx) = watch::channel(false);
    let client = new_cluster(server.addr, synced_rx).plugin_configs();

    // Before the gate fires, list must not return a view claiming to be
    // complete; it stays pending.
    let pending = tokio::time::timeout(Duration::from_millis(100), client.list()).await;
    assert!(pending.is_err(), "list returned before the initial sync");

    synced_tx.send(true).expect("gate receiver alive");
    let objs = client.list().await.unwrap();
    assert!(objs.is_empty());
}

#[tokio::test]
async fn list_reports_canceled_when_the_gate_is_torn_down() {
    let server = spawn_admin_server();
    let (synced_tx, synced_rx) = watch::channel(false);
    let client = new_cluster(server.addr, synced_rx).plugin_configs();

    drop(synced_tx);
    match client.list().await {
        Err(Error::Canceled) => {}
        other => panic!("expected Canceled, got {other:?}"),
    }
}

#[tokio::test]
async fn noop_caches_accept_writes_and_remember_nothing() {
    let server = spawn_admin_server();
    // A no-op cache is paired with an already-signaled gate: it is "ready"
    // immediately and simply has nothing to serve.
    let (_synced_tx, synced_rx) = watch::channel(true);
    let cluster = Cluster::with_caches(
        ClusterConfig {
            base_url: format!("http://{}/apisix/admin", server.addr),
            admin_key: None,
            timeout: Duration::from_secs(5),
        },
        synced_rx,
        AdminMetrics::default(),
        Arc::new(crate::NoopCache),
        Arc::new(crate::NoopCache),
    )
    .expect("failed to build cluster");
    let client = cluster.plugin_configs();

    let created = client
        .create(&plugin_config("1", "test", &[("abc", "123")]))
        .await
        .unwrap();
    assert_eq!(created.metadata.id, "1");

    // The write reached the store, but the cache kept nothing.
    assert!(server
        .state
        .lock()
        .items
        .contains_key("/apisix/plugin_configs/1"));
    assert!(client.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn sync_cache_absorbs_existing_remote_state() {
    let server = spawn_admin_server();
    {
        let mut state = server.state.lock();
        state.items.insert(
            "/apisix/plugin_configs/1".to_string(),
            json!({"name": "a", "plugins": {"abc": "123"}}),
        );
        state.items.insert(
            "/apisix/plugin_configs/2".to_string(),
            json!({"name": "b", "plugins": {}}),
        );
        state.items.insert(
            "/apisix/routes/r1".to_string(),
            json!({"name": "r", "uris": ["/api/*"], "plugins": {}}),
        );
    }

    let (synced_tx, synced_rx) = watch::channel(false);
    let cluster = new_cluster(server.addr, synced_rx);
    assert!(!cluster.is_synced());

    cluster.sync_cache().await.unwrap();
    synced_tx.send(true).expect("gate receiver alive");
    assert!(cluster.is_synced());

    let plugin_configs = cluster.plugin_configs().list().await.unwrap();
    assert_eq!(plugin_configs.len(), 2);
    assert_eq!(plugin_configs[0].metadata.id, "1");
    assert_eq!(plugin_configs[0].plugins.get("abc"), Some(&json!("123")));

    let routes = cluster.routes().list().await.unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].metadata.id, "r1");
    assert_eq!(routes[0].uris, vec!["/api/*"]);
}
