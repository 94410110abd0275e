// ABOUTME: System-wide constants for the sign-in gate
// ABOUTME: Environment keys, identity provider endpoints, defaults, and cookie names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Hardcoded values shared by the configuration loader, the OAuth client,
//! and the HTTP host.

/// Environment variable names read at startup
pub mod env_keys {
    /// Application (client) id registered with Azure AD
    pub const APP_CLIENT_ID: &str = "APP_CLIENT_ID";
    /// Client secret for the confidential client
    pub const APP_CLIENT_SECRET: &str = "APP_CLIENT_SECRET";
    /// Authority URL, e.g. `https://login.microsoftonline.com/common`
    pub const MSAL_AUTHORITY: &str = "MSAL_AUTHORITY";
    /// Explicit redirect URI override
    pub const MSAL_REDIRECT_URI: &str = "MSAL_REDIRECT_URI";
    /// Redirect URI used when hosted in Azure App Service
    pub const MSAL_REDIRECT_AZURE_URI: &str = "MSAL_REDIRECT_AZURE_URI";
    /// Redirect URI used everywhere else
    pub const MSAL_REDIRECT_LOCAL_URI: &str = "MSAL_REDIRECT_LOCAL_URI";
    /// Comma-separated OAuth scopes
    pub const MSAL_SCOPES: &str = "MSAL_SCOPES";
    /// Comma-separated tenant ids allowed to sign in
    pub const ALLOWED_TENANTS: &str = "ALLOWED_TENANTS";
    /// Base URL of the Microsoft Graph API
    pub const GRAPH_API_BASE: &str = "GRAPH_API_BASE";
    /// Port for the HTTP host
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Log level
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    /// Full tracing filter directive, wins over `LOG_LEVEL`
    pub const RUST_LOG: &str = "RUST_LOG";
    /// Log output format: json, pretty or compact
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    /// Idle seconds before a session is evicted
    pub const SESSION_IDLE_TIMEOUT_SECS: &str = "SESSION_IDLE_TIMEOUT_SECS";
    /// Deployment environment name
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Set by Azure App Service on every instance
    pub const WEBSITE_INSTANCE_ID: &str = "WEBSITE_INSTANCE_ID";
}

/// Azure AD v2.0 endpoint paths, relative to the authority
pub mod identity {
    /// Authorization endpoint path
    pub const AUTHORIZE_PATH: &str = "oauth2/v2.0/authorize";
    /// Token endpoint path
    pub const TOKEN_PATH: &str = "oauth2/v2.0/token";
    /// Scopes Azure AD always grants for interactive sign-in
    pub const RESERVED_SCOPES: [&str; 3] = ["openid", "profile", "offline_access"];
    /// Token claim carrying the tenant id
    pub const TENANT_CLAIM: &str = "tid";
}

/// Defaults applied when optional settings are absent
pub mod defaults {
    /// Microsoft Graph v1.0
    pub const GRAPH_API_BASE: &str = "https://graph.microsoft.com/v1.0";
    /// HTTP host port
    pub const HTTP_PORT: u16 = 8501;
    /// Sessions idle for eight hours are evicted
    pub const SESSION_IDLE_TIMEOUT_SECS: u64 = 8 * 60 * 60;
    /// How often the registry sweeps idle sessions
    pub const SESSION_SWEEP_INTERVAL_SECS: u64 = 300;
}

/// Names used by the HTTP host
pub mod http {
    /// Cookie carrying the interactive session id
    pub const SESSION_COOKIE: &str = "entra_gate_session";
    /// Query parameter the identity provider uses to return the code
    pub const CODE_PARAM: &str = "code";
}

/// Service identity for structured logs
pub mod service_names {
    /// Service name
    pub const ENTRA_GATE: &str = "entra-gate";
}
