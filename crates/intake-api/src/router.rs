//! # REST Router
//!
//! Mounts a [`Resource`] at `/{path}` and `/{path}/{id}` and drives the
//! full per-request pipeline: decode → intent resolution → input filter
//! → handler → envelope. All verbs land in one handler pair; the
//! dispatcher decides what they mean.

use std::sync::Arc;

use axum::extract::{Path, Request, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;

use intake_core::CallerIdentity;
use intake_schema::{Engine, SpecRegistry};

use crate::decode;
use crate::dispatch::{run_input_filter, Intent, SpecSet};
use crate::problem::Problem;
use crate::resource::{method_not_implemented, Resource};

/// Body size limit: 2 MiB. Prevents OOM from oversized request bodies.
const BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Per-resource router state: the resource, the engine with its
/// translator, and the specification factory registry.
pub struct RestState<R> {
    resource: Arc<R>,
    engine: Engine,
    registry: Arc<SpecRegistry>,
}

impl<R> Clone for RestState<R> {
    fn clone(&self) -> Self {
        Self {
            resource: Arc::clone(&self.resource),
            engine: self.engine.clone(),
            registry: Arc::clone(&self.registry),
        }
    }
}

/// Mount a resource with the identity translator and an empty factory
/// registry.
pub fn rest_resource<R: Resource>(path: &str, resource: R) -> Router {
    rest_resource_with(path, resource, Engine::new(), SpecRegistry::new())
}

/// Mount a resource with an explicit engine (translator injection) and
/// factory registry.
pub fn rest_resource_with<R: Resource>(
    path: &str,
    resource: R,
    engine: Engine,
    registry: SpecRegistry,
) -> Router {
    let state =
        RestState { resource: Arc::new(resource), engine, registry: Arc::new(registry) };
    let collection = format!("/{}", path.trim_matches('/'));
    let item = format!("{collection}/{{id}}");
    Router::new()
        .route(&collection, any(collection_handler::<R>))
        .route(&item, any(item_handler::<R>))
        .with_state(state)
}

async fn collection_handler<R: Resource>(
    State(state): State<RestState<R>>,
    request: Request,
) -> Response {
    serve(state, None, request).await
}

async fn item_handler<R: Resource>(
    State(state): State<RestState<R>>,
    Path(id): Path<String>,
    request: Request,
) -> Response {
    serve(state, Some(id), request).await
}

/// The per-request pipeline, shared by both route shapes.
async fn serve<R: Resource>(state: RestState<R>, id: Option<String>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    // Identity is whatever the host's auth layer put into extensions;
    // absent means anonymous.
    let caller = parts.extensions.get::<CallerIdentity>().cloned().unwrap_or_default();

    let Some(intent) = Intent::resolve(&parts.method, id.is_some()) else {
        return method_not_implemented().into_response();
    };
    tracing::debug!(method = %parts.method, intent = %intent, path = %parts.uri.path(), "rest dispatch");

    let mut query = decode::parse_form(parts.uri.query().unwrap_or("").as_bytes());

    let bytes = match axum::body::to_bytes(body, BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::debug!(error = %err, "request body exceeds limit or failed to read");
            return Problem::new("Request Entity Too Large", 413).into_response();
        }
    };
    let content_type =
        parts.headers.get(header::CONTENT_TYPE).and_then(|value| value.to_str().ok());
    let mut data = match decode::decode(&bytes, content_type) {
        Ok(decoded) => decoded.into_value(),
        Err(err) => return Problem::from(err).into_response(),
    };

    let specs = SpecSet {
        query: state.resource.query_spec(),
        create: state.resource.create_spec(),
        update: state.resource.update_spec(),
    };
    if let Err(problem) =
        run_input_filter(intent, &specs, &state.engine, &state.registry, &mut query, &mut data)
    {
        return problem.into_response();
    }

    let id = id.unwrap_or_default();
    let outcome = match intent {
        Intent::Fetch => state.resource.fetch(&id, &caller).await,
        Intent::FetchAll => state.resource.fetch_all(&query, &caller).await,
        Intent::Create => state.resource.create(&data, &caller).await,
        Intent::Update => state.resource.update(&id, &data, &caller).await,
        Intent::Patch => state.resource.patch(&id, &data, &caller).await,
        Intent::Delete => state.resource.delete(&id, &caller).await,
    };
    match outcome {
        Ok(response) => response.into_response(),
        Err(problem) => problem.into_response(),
    }
}
