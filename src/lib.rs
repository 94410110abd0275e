// ABOUTME: Main library entry point for the Entra Gate sign-in gate
// ABOUTME: Azure AD authorization-code flow restricted to an allow-list of tenants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Entra Gate
//!
//! Gates an interactive web application behind Microsoft Entra ID (Azure AD)
//! sign-in and admits only users whose home tenant is on a configured
//! allow-list.
//!
//! ## Architecture
//!
//! - **Config**: typed settings loaded once at startup
//! - **`OAuth2` client**: authorization URL and code exchange against the authority
//! - **Auth**: unverified claim decoding, tenant policy and the flow controller
//! - **External**: Microsoft Graph `/me` profile lookup
//! - **Session**: per-context authenticated state and the session registry
//! - **Routes**: axum handlers driving the controller per request
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use entra_gate::auth::AuthFlowController;
//! use entra_gate::config::AppConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = AppConfig::from_env()?;
//! let controller = AuthFlowController::from_config(&config.auth)?;
//! println!("Sign in at {}", controller.sign_in_url());
//! # Ok(())
//! # }
//! ```

/// Sign-in flow, token decoding and tenant policy
pub mod auth;

/// Configuration management
pub mod config;

/// Application constants and environment keys
pub mod constants;

/// Unified error handling
pub mod errors;

/// Microsoft Graph client
pub mod external;

/// Production logging with structured output
pub mod logging;

/// `OAuth2` client for the Azure AD authority
pub mod oauth2_client;

/// HTTP routes
pub mod routes;

/// Session state and registry
pub mod session;

/// Shared utilities
pub mod utils;
