#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use hearth::http::{create_router, AppState};
use hearth::zwave::{JsonFileStore, NetworkSnapshot, SnapshotNetwork};

static ENV_LOCK: Mutex<()> = Mutex::new(());

pub const NETWORK_FIXTURE: &str = include_str!("../fixtures/zwave_network.json");
pub const FORECAST_FIXTURE: &str = include_str!("../fixtures/yr_forecast.xml");

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to process-global env
/// vars, since tests run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

pub fn network_snapshot() -> NetworkSnapshot {
    serde_json::from_str(NETWORK_FIXTURE).expect("network fixture parses")
}

/// Device config file inside `dir`.
pub fn device_config_store(dir: &Path) -> Arc<JsonFileStore> {
    Arc::new(JsonFileStore::new(dir.join("zwave_device_config.json")))
}

/// State with a device config store and no network.
pub fn state_without_network(dir: &Path) -> AppState {
    AppState::new(device_config_store(dir))
}

/// State with the fixture network; saved config goes to `dir/zwcfg.json`.
pub fn state_with_network(dir: &Path) -> AppState {
    let network = SnapshotNetwork::new(network_snapshot(), dir.join("zwcfg.json"));
    state_without_network(dir).with_network(Arc::new(network))
}

/// Send one request through a fresh router and decode the JSON body.
pub async fn send(state: AppState, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .expect("request builds");

    let response = create_router(state)
        .oneshot(request)
        .await
        .expect("router responds");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body reads");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body is JSON")
    };
    (status, json)
}

pub async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
    send(state, Method::GET, uri, None).await
}

pub async fn post(state: AppState, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    send(state, Method::POST, uri, body).await
}

pub fn router(state: AppState) -> Router {
    create_router(state)
}
