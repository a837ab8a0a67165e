//! HTTP 接口

mod dto;
mod extract;
mod handlers;

pub use dto::*;
pub use extract::{ApiJson, BearerToken};

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::trace::TraceLayer;

use crate::container::ServiceContainer;

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<ServiceContainer>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(services: ServiceContainer) -> Self {
        Self {
            services: Arc::new(services),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/otp/send", post(handlers::send_otp))
        .route("/api/otp/verify", post(handlers::verify_otp))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/password", post(handlers::change_password))
        .route("/api/auth/logout", post(handlers::logout))
        .route(
            "/api/member/profile",
            get(handlers::get_member_profile).post(handlers::save_member_profile),
        )
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::render_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
