use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::domain::Article;
use crate::server::AppState;
use crate::sources::PageFetcher;

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub articles: Vec<Article>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
pub enum ApiError {
    RateLimited { limit: u32, window_secs: u64 },
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::RateLimited { limit, window_secs } => (
                StatusCode::TOO_MANY_REQUESTS,
                format!("Rate limit exceeded: {} per {} seconds", limit, window_secs),
            ),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Handler for GET /news
pub async fn get_news<F: PageFetcher + 'static>(
    State(state): State<Arc<AppState<F>>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Json<NewsResponse>, ApiError> {
    if !state.limiter.try_acquire(addr.ip(), Instant::now()) {
        warn!(client = %addr.ip(), "Rate limit exceeded");
        return Err(ApiError::RateLimited {
            limit: state.limiter.limit(),
            window_secs: state.limiter.window().as_secs(),
        });
    }

    let fetch = Arc::clone(&state.fetch);
    let articles = tokio::task::spawn_blocking(move || fetch.fetch_all())
        .await
        .map_err(|e| {
            error!(error = %e, "Fetch task failed");
            ApiError::Internal("Failed to fetch news".to_string())
        })?;

    info!(client = %addr.ip(), count = articles.len(), "Served news");
    Ok(Json(NewsResponse { articles }))
}
