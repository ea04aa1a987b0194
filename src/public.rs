use axum::{
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use crate::state::AppState;

const OPENAPI: &str = include_str!("../docs/openapi.json");

// Swagger UI from the CDN, pointed at the document served by `openapi`.
const API_DOCS_PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <title>otaQku tasks API</title>
  <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    window.ui = SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
  </script>
</body>
</html>
"##;

#[derive(Debug, Serialize)]
pub struct Welcome {
    pub message: &'static str,
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(|| async { "ok" }))
        .route("/openapi.json", get(openapi))
        .route("/api-docs", get(api_docs))
}

pub async fn home() -> Json<Welcome> {
    info!("root endpoint accessed");
    Json(Welcome {
        message: "Welcome to otaQku tasks management API",
    })
}

pub async fn openapi() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], OPENAPI)
}

pub async fn api_docs() -> Html<&'static str> {
    Html(API_DOCS_PAGE)
}
