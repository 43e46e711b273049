//! Test doubles and helpers shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use serde_json::{Value, json};

use crate::{
    catalog::Catalog,
    error::FetchError,
    export::publish::Downstream,
    schema::{Category, DataPoint, Region, ResourceDefinition},
    sources::adapter::DataSource,
};

type Script = dyn Fn(&str, &str, Option<i32>) -> Result<Vec<DataPoint>, FetchError> + Send + Sync;

/// Data source answering every fetch from a closure.
pub struct ScriptedSource {
    script: Box<Script>,
    calls: Mutex<Vec<(String, String, Option<i32>)>>,
}

impl ScriptedSource {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&str, &str, Option<i32>) -> Result<Vec<DataPoint>, FetchError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, String, Option<i32>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl DataSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn label(&self) -> &'static str {
        "Scripted"
    }

    async fn fetch(
        &self,
        indicator: &str,
        region: &str,
        year: Option<i32>,
    ) -> Result<Vec<DataPoint>, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((indicator.to_string(), region.to_string(), year));
        (self.script)(indicator, region, year)
    }
}

/// Downstream double counting calls; fails when built with `failing`.
pub struct CountingDownstream {
    calls: AtomicUsize,
    fail: bool,
}

impl CountingDownstream {
    pub fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Downstream for CountingDownstream {
    async fn call_tool(&self, url: &str, tool: &str, _args: Value) -> Result<Value, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(FetchError::Protocol(503));
        }
        Ok(json!({ "echo_url": url, "echo_tool": tool }))
    }
}

/// Two resources (`r1`, `r2`) × two regions (`A`, `B`).
pub fn test_catalog() -> Arc<Catalog> {
    let resource = |id: &str, category| ResourceDefinition {
        id: id.into(),
        name: format!("Resource {id}"),
        category,
        unit: format!("units-{id}"),
        description: format!("Test resource {id}"),
        source_url: "https://example.org/".into(),
        indicator: format!("IND.{}", id.to_uppercase()),
    };
    let region = |code: &str| Region {
        code: code.into(),
        name: format!("Region {code}"),
    };

    Arc::new(Catalog::new(
        vec![resource("r1", Category::Energy), resource("r2", Category::Mineral)],
        vec![region("A"), region("B")],
    ))
}

/// Installs the rustls provider once for tests building HTTP clients.
pub fn init_tls() {
    let _ = rustls::crypto::CryptoProvider::install_default(rustls::crypto::ring::default_provider());
}

/// Serves `router` on an ephemeral local port; returns its base URL.
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}
