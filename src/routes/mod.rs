// ABOUTME: Route module organization for the Entra Gate HTTP host
// ABOUTME: Shared application state and the assembled axum router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for Entra Gate
//!
//! Handlers stay thin: they resolve the session from the cookie, hand the
//! request to [`AuthFlowController`] and translate the outcome into HTTP.

/// Sign-in, profile and logout routes
pub mod auth;
/// Health check and readiness routes
pub mod health;

pub use auth::AuthRoutes;
pub use health::HealthRoutes;

use crate::auth::AuthFlowController;
use crate::session::SessionRegistry;
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Sign-in orchestration
    pub controller: Arc<AuthFlowController>,
    /// Interactive contexts keyed by session cookie
    pub sessions: SessionRegistry,
}

impl AppState {
    /// State with an empty session registry
    #[must_use]
    pub fn new(controller: Arc<AuthFlowController>) -> Self {
        Self {
            controller,
            sessions: SessionRegistry::new(),
        }
    }
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(AuthRoutes::routes(state.clone()))
        .merge(HealthRoutes::routes(state))
        .layer(TraceLayer::new_for_http())
}
