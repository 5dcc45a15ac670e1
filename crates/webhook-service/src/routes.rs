//! 路由配置模块

use axum::{
    Router, middleware,
    routing::{get, post},
};
use router_shared::observability::middleware as obs_middleware;

use crate::{handlers, state::AppState};

/// 构建完整的应用路由
///
/// 只有 `POST /webhook` 与 `GET /health` 是有效端点，其余方法或路径统一返回 400。
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/webhook",
            post(handlers::webhook::receive_webhook).fallback(handlers::invalid_url),
        )
        .route(
            "/health",
            get(handlers::health::health_check).fallback(handlers::invalid_url),
        )
        .fallback(handlers::invalid_url)
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
