use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::FeederResult;
use crate::services::FetchService;
use crate::sources::PageFetcher;

pub mod handlers;
pub mod rate_limit;

pub use rate_limit::RateLimiter;

/// Shared by every request. The fetch service is reference-counted so the
/// caller can keep it alive outside the async runtime.
pub struct AppState<F: PageFetcher> {
    pub fetch: Arc<FetchService<F>>,
    pub limiter: RateLimiter,
}

impl<F: PageFetcher> AppState<F> {
    pub fn new(fetch: Arc<FetchService<F>>) -> Self {
        Self {
            fetch,
            limiter: RateLimiter::default(),
        }
    }

    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }
}

pub fn create_app<F: PageFetcher + 'static>(state: AppState<F>) -> Router {
    Router::new()
        .route("/news", get(handlers::get_news::<F>))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Serve until ctrl-c
pub async fn serve<F: PageFetcher + 'static>(port: u16, state: AppState<F>) -> FeederResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "Listening");

    axum::serve(
        listener,
        create_app(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown requested");
    }
}
