//! API routes

pub mod health;
pub mod subscriptions;

use axum::{http::StatusCode, routing::get, Router};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::state::AppState;

/// Create all API routes
pub fn create_router(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout;

    // Health check routes (at root level for infrastructure monitoring)
    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    let subscription_routes = Router::new()
        .route(
            "/subscriptions",
            get(subscriptions::list_subscriptions).post(subscriptions::create_subscription),
        )
        .route(
            "/subscriptions/aggregate",
            get(subscriptions::aggregate_subscriptions),
        )
        .route(
            "/subscriptions/:id",
            get(subscriptions::get_subscription)
                .put(subscriptions::update_subscription)
                .delete(subscriptions::delete_subscription),
        );

    Router::new()
        .merge(health_routes)
        .merge(subscription_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .with_state(state)
}
