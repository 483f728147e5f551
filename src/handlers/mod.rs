use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ApiConfig;
use crate::storage::StorageLayer;

pub mod feeds;
pub mod get_feed;
pub mod status;

pub use feeds::{fetch_feed, list_feeds, register_feed};
pub use get_feed::get_feed;
pub use status::get_api_status;

pub struct AppState {
    pub storage: Arc<dyn StorageLayer>,
    /// Generated validation output, also served as static content.
    pub output_root: PathBuf,
    pub api: ApiConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

pub type ApiFailure = (StatusCode, Json<ApiError>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiFailure {
    (
        status,
        Json(ApiError {
            error: message.into(),
        }),
    )
}

pub fn internal_error(err: impl std::fmt::Display) -> ApiFailure {
    tracing::error!("Request failed: {}", err);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
