// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Provides liveness and readiness endpoints for load balancers and App Service health checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check routes for service monitoring

use super::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(state: AppState) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
            .with_state(state)
    }
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": crate::constants::service_names::ENTRA_GATE,
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn ready_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ready",
        "sessions": state.sessions.len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
