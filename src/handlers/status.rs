use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiStatus {
    pub status: String,
    pub version: String,
    pub providers: Vec<String>,
    pub resources: Vec<String>,
}

pub async fn get_api_status(State(state): State<Arc<AppState>>) -> Json<ApiStatus> {
    Json(ApiStatus {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        providers: state.api.providers.clone(),
        resources: state
            .api
            .resources
            .iter()
            .map(|r| r.path().to_string())
            .collect(),
    })
}
