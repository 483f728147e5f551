use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{api_error, internal_error, ApiFailure, AppState};
use crate::storage::Feed;

#[derive(Debug, Deserialize)]
pub struct RegisterFeedRequest {
    pub url: String,
    pub name: Option<String>,
}

pub async fn list_feeds(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Feed>>, ApiFailure> {
    let feeds = state.storage.list_feeds().map_err(internal_error)?;
    Ok(Json(feeds))
}

pub async fn register_feed(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterFeedRequest>,
) -> Result<(StatusCode, Json<Feed>), ApiFailure> {
    let url = req.url.trim();
    match url::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
        _ => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                format!("Feed URL must be an http(s) URL: {}", req.url),
            ))
        }
    }

    let feed = Feed::new(url, req.name.filter(|n| !n.trim().is_empty()));
    state.storage.add_feed(&feed).map_err(internal_error)?;
    info!("Registered feed {} ({})", feed.id, feed.url);

    Ok((StatusCode::CREATED, Json(feed)))
}

pub async fn fetch_feed(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Feed>, ApiFailure> {
    match state.storage.get_feed(&id).map_err(internal_error)? {
        Some(feed) => Ok(Json(feed)),
        None => Err(api_error(
            StatusCode::NOT_FOUND,
            format!("No feed with id {}", id),
        )),
    }
}
