//! # OpenAPI Document
//!
//! Component schemas for the shared envelope types, served at
//! `/openapi.json` by the server binary.

use axum::Json;
use utoipa::OpenApi;

use crate::response::PaginationMeta;

/// The API document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "intake",
        description = "Schema-driven request validation pipeline for REST resources."
    ),
    components(schemas(PaginationMeta))
)]
pub struct ApiDoc;

/// GET /openapi.json — serve the generated document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_builds_and_carries_components() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components present");
        assert!(components.schemas.contains_key("PaginationMeta"));
    }
}
