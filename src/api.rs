//! REST API dispatcher mounted under `/api`.

use axum::{
    extract::OriginalUri,
    http::StatusCode,
    routing::get,
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    api_error, fetch_feed, get_api_status, list_feeds, register_feed, ApiFailure, AppState,
};

/// Resource groups the dispatcher can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiResource {
    Status,
    Feeds,
}

impl ApiResource {
    pub fn path(&self) -> &'static str {
        match self {
            ApiResource::Status => "/status",
            ApiResource::Feeds => "/gtfs-rt-feed",
        }
    }
}

/// Providers and resources of the dispatcher. Fixed at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Media types the API produces.
    pub providers: Vec<String>,
    pub resources: Vec<ApiResource>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            providers: vec!["application/json".to_string()],
            resources: vec![ApiResource::Status, ApiResource::Feeds],
        }
    }
}

/// Builds the dispatcher. Paths are relative to the `/api` mount point;
/// anything unmatched gets a JSON 404 from here, never static content.
pub fn router(config: &ApiConfig) -> Router<Arc<AppState>> {
    let mut router = Router::new();
    for resource in &config.resources {
        router = match resource {
            ApiResource::Status => router.route(resource.path(), get(get_api_status)),
            ApiResource::Feeds => router
                .route(resource.path(), get(list_feeds).post(register_feed))
                .route("/gtfs-rt-feed/{id}", get(fetch_feed)),
        };
    }
    router.fallback(api_not_found)
}

async fn api_not_found(OriginalUri(uri): OriginalUri) -> ApiFailure {
    api_error(
        StatusCode::NOT_FOUND,
        format!("No API resource at {}", uri.path()),
    )
}
