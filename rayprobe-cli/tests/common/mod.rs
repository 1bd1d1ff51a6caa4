//! Common test utilities: an in-process fake Ray dashboard

#![allow(dead_code)]

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use rayprobe_cli::output::OutputFormat;
use rayprobe_cli::{ProbeReport, ProbeSettings};
use rayprobe_common::{AddressSpec, Discovery};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;

/// Node summary item as the dashboard serves it
pub fn node_item(hostname: &str, alive: bool) -> Value {
    json!({
        "hostname": hostname,
        "ip": "10.0.0.1",
        "cpu": 3.5,
        "mem": [34359738368u64, 17179869184u64, 50.0],
        "raylet": {
            "nodeId": format!("id-{}", hostname),
            "nodeManagerAddress": "10.0.0.1",
            "nodeManagerHostname": hostname,
            "state": if alive { "ALIVE" } else { "DEAD" },
            "isHeadNode": false
        }
    })
}

pub fn version_document() -> Value {
    json!({
        "version": "4d8e2e4",
        "ray_version": "2.9.0",
        "ray_commit": "abcdef",
        "session_name": "session_2024-01-01_00-00-00_000000_1"
    })
}

/// Dashboard that serves `nodes` as its roster
pub fn dashboard(nodes: Vec<Value>) -> Router {
    let roster = json!({
        "result": true,
        "msg": "Node summary fetched.",
        "data": { "summary": nodes }
    });
    dashboard_with_roster(roster)
}

/// Dashboard that answers the node query with `roster` verbatim
pub fn dashboard_with_roster(roster: Value) -> Router {
    Router::new()
        .route("/api/version", get(|| async { Json(version_document()) }))
        .route(
            "/nodes",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let roster = roster.clone();
                async move {
                    if params.get("view").map(String::as_str) != Some("summary") {
                        return Err((StatusCode::BAD_REQUEST, "unknown view"));
                    }
                    Ok(Json(roster))
                }
            }),
        )
}

/// Serve `router` on an ephemeral local port
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// Local address nothing is listening on
pub fn unused_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

pub fn settings(address: AddressSpec, format: OutputFormat) -> ProbeSettings {
    ProbeSettings {
        address,
        discovery: Discovery::default(),
        timeout: Some(std::time::Duration::from_secs(10)),
        format,
    }
}

pub fn dashboard_url(addr: SocketAddr) -> AddressSpec {
    AddressSpec::Explicit(format!("http://{}", addr))
}

/// Run the probe and capture what it printed
pub async fn run_probe(settings: &ProbeSettings) -> (String, ProbeReport) {
    let mut out = Vec::new();
    let report = rayprobe_cli::run(settings, &mut out).await.unwrap();
    (String::from_utf8(out).unwrap(), report)
}
