//! # intake-api server binary
//!
//! Boots the API server with a sample `contacts` resource mounted at
//! `/contacts`. The resource exercises the whole pipeline: a list-query
//! specification with defaults, create/update specifications over
//! common field shapes, and enveloped responses with pagination meta.

use std::collections::BTreeMap;

use async_trait::async_trait;
use axum::routing::get;
use axum::Router;
use tokio::sync::RwLock;
use uuid::Uuid;

use intake_api::{
    openapi, rest_resource, with_middleware, ApiResponse, AppConfig, Outcome, Problem, Resource,
};
use intake_core::{CallerIdentity, Value};
use intake_schema::{catalog, GroupSpec, LengthBounds, SchemaNode};

/// In-memory contacts store; persistence is the downstream's business,
/// this binary just demonstrates the pipeline.
#[derive(Default)]
struct ContactsResource {
    store: RwLock<BTreeMap<String, serde_json::Value>>,
}

const PAGE_SIZE: i64 = 25;

#[async_trait]
impl Resource for ContactsResource {
    fn query_spec(&self) -> Option<SchemaNode> {
        Some(
            GroupSpec::new()
                .field(catalog::with_integer_default(
                    catalog::integer("page", false, Some(1)),
                    1,
                ))
                .field(catalog::string("q", false, None))
                .into(),
        )
    }

    fn create_spec(&self) -> Option<SchemaNode> {
        Some(
            GroupSpec::new()
                .field(catalog::string("name", true, Some(LengthBounds::between(1, 120))))
                .field(catalog::email("email", true))
                .field(catalog::integer("age", false, Some(0)))
                .into(),
        )
    }

    fn update_spec(&self) -> Option<SchemaNode> {
        self.create_spec()
    }

    async fn fetch(&self, id: &str, _caller: &CallerIdentity) -> Outcome {
        let store = self.store.read().await;
        match store.get(id) {
            Some(contact) => Ok(ApiResponse::ok(contact.clone())),
            None => Err(Problem::new(format!("contact '{id}' not found"), 404)),
        }
    }

    async fn fetch_all(&self, query: &Value, _caller: &CallerIdentity) -> Outcome {
        let page = match query.get("page") {
            Some(Value::Int(page)) => *page,
            _ => 1,
        };
        let needle = query.get("q").and_then(Value::as_str).map(str::to_lowercase);

        let store = self.store.read().await;
        let matching: Vec<&serde_json::Value> = store
            .values()
            .filter(|contact| match &needle {
                Some(needle) => contact["name"]
                    .as_str()
                    .is_some_and(|name| name.to_lowercase().contains(needle)),
                None => true,
            })
            .collect();
        let total = matching.len() as i64;
        let offset = ((page - 1).max(0) as usize) * PAGE_SIZE as usize;
        let items: Vec<serde_json::Value> =
            matching.into_iter().skip(offset).take(PAGE_SIZE as usize).cloned().collect();

        Ok(ApiResponse::ok(serde_json::Value::Array(items))
            .with_pagination(total, page, PAGE_SIZE))
    }

    async fn create(&self, data: &Value, _caller: &CallerIdentity) -> Outcome {
        let id = Uuid::new_v4().to_string();
        let mut contact = data.to_json();
        contact["id"] = serde_json::Value::String(id.clone());
        self.store.write().await.insert(id, contact.clone());
        Ok(ApiResponse::created(contact))
    }

    async fn update(&self, id: &str, data: &Value, _caller: &CallerIdentity) -> Outcome {
        let mut store = self.store.write().await;
        if !store.contains_key(id) {
            return Err(Problem::new(format!("contact '{id}' not found"), 404));
        }
        let mut contact = data.to_json();
        contact["id"] = serde_json::Value::String(id.to_string());
        store.insert(id.to_string(), contact.clone());
        Ok(ApiResponse::ok(contact))
    }

    async fn delete(&self, id: &str, _caller: &CallerIdentity) -> Outcome {
        match self.store.write().await.remove(id) {
            Some(_) => Ok(ApiResponse::ok(serde_json::json!({ "deleted": id }))),
            None => Err(Problem::new(format!("contact '{id}' not found"), 404)),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let app = with_middleware(
        Router::new()
            .merge(rest_resource("contacts", ContactsResource::default()))
            .route("/health/liveness", get(|| async { "ok" }))
            .route("/openapi.json", get(openapi::openapi_json)),
    );

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "intake-api listening");
    axum::serve(listener, app).await?;
    Ok(())
}
