// ABOUTME: Unified error types for configuration, HTTP hosting, and the sign-in flow
// ABOUTME: Defines ErrorCode/AppError for infrastructure and AuthError for flow outcomes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Two families of errors live here:
//! - [`AppError`] with an [`ErrorCode`] for infrastructure faults (configuration,
//!   server startup). These propagate with `?` up to the binary.
//! - [`AuthError`] for the four ways a sign-in attempt can fail. These never
//!   escape the flow controller; they are folded into an
//!   [`AuthResult`](crate::auth::AuthResult).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication & Authorization (1000-1999)
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired = 1000,
    #[serde(rename = "AUTH_INVALID")]
    AuthInvalid = 1001,
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied = 1004,

    // External Services (5000-5999)
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,

    // Configuration (6000-6999)
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(self) -> u16 {
        match self {
            Self::AuthRequired | Self::AuthInvalid => 401,
            Self::PermissionDenied => 403,
            Self::ExternalServiceError => 502,
            Self::ConfigMissing | Self::ConfigInvalid => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AuthRequired => "Authentication is required to access this resource",
            Self::AuthInvalid => "The provided authentication credentials are invalid",
            Self::PermissionDenied => "You do not have permission to perform this action",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ConfigMissing => "Required configuration is missing",
            Self::ConfigInvalid => "Configuration is invalid",
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Required configuration key is absent
    pub fn config_missing(key: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ConfigMissing,
            format!("Configuration setting '{}' not found", key.into()),
        )
    }

    /// Configuration value failed validation
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Ways a sign-in attempt can fail, in the order the flow checks them
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The identity provider rejected the authorization code or was unreachable
    #[error("token exchange failed")]
    TokenExchangeFailed,
    /// The access token could not be decoded or carried no `tid` claim
    #[error("tenant claim could not be extracted from the access token")]
    ClaimExtractionFailed,
    /// The signed-in account belongs to a tenant outside the allow-list
    #[error("tenant '{0}' is not allowed")]
    TenantNotAllowed(String),
    /// The user directory did not return a profile
    #[error("user profile could not be retrieved")]
    ProfileFetchFailed,
}

impl AuthError {
    /// Policy rejections are actionable by the user; the rest are technical
    #[must_use]
    pub const fn is_policy_rejection(&self) -> bool {
        matches!(self, Self::TenantNotAllowed(_))
    }

    /// Message safe to show the person signing in
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::TenantNotAllowed(_) => {
                "Your account is not authorized to access this application. \
                 It is only available to specific Microsoft tenants."
            }
            Self::TokenExchangeFailed | Self::ClaimExtractionFailed | Self::ProfileFetchFailed => {
                "Authentication failed."
            }
        }
    }

    /// Error code used when the rejection is reported over HTTP
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::TenantNotAllowed(_) => ErrorCode::PermissionDenied,
            Self::TokenExchangeFailed | Self::ClaimExtractionFailed => ErrorCode::AuthInvalid,
            Self::ProfileFetchFailed => ErrorCode::ExternalServiceError,
        }
    }
}
