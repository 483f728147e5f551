//! `GET /getFeed`: validation results written to the output root.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

use super::{api_error, internal_error, ApiFailure, AppState};
use crate::resources::read_file_as_string;

#[derive(Debug, Deserialize)]
pub struct GetFeedQuery {
    pub file: Option<String>,
}

/// Without `file`: the sorted names of the JSON results available.
/// With `file`: that result document.
pub async fn get_feed(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GetFeedQuery>,
) -> Result<Response, ApiFailure> {
    match query.file {
        None => {
            let names = list_results(&state.output_root).map_err(internal_error)?;
            Ok(Json(names).into_response())
        }
        Some(name) => {
            if !is_plain_file_name(&name) {
                return Err(api_error(
                    StatusCode::BAD_REQUEST,
                    format!("Invalid result file name: {}", name),
                ));
            }
            let path = state.output_root.join(&name);
            if !path.is_file() {
                return Err(api_error(
                    StatusCode::NOT_FOUND,
                    format!("No result file named {}", name),
                ));
            }
            let body = read_file_as_string(&path);
            Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
        }
    }
}

fn list_results(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}
