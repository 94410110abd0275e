// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses client credentials, authority, redirect URI, scopes, and allowed tenants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management
//!
//! [`AppConfig::from_env`] loads an optional `.env` file and then reads the
//! process environment. [`AppConfig::from_lookup`] does the same parsing over
//! any key lookup, which keeps tests away from global process state.

use crate::auth::tenant_policy::AllowedTenants;
use crate::constants::{defaults, env_keys};
use crate::errors::{AppError, AppResult};
use crate::logging::LogFormat;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use tracing::{info, warn};
use url::Url;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Normal operation
    #[default]
    Info,
    /// Flow steps and redirects
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Where the process is running, which decides the redirect URI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostingRuntime {
    /// Azure App Service (detected by `WEBSITE_INSTANCE_ID`)
    AzureAppService,
    /// Anything else, typically a developer machine
    Local,
}

impl HostingRuntime {
    /// Detect the runtime from the presence of the App Service instance marker
    pub fn detect(lookup: impl Fn(&str) -> Option<String>) -> Self {
        if lookup(env_keys::WEBSITE_INSTANCE_ID).is_some() {
            Self::AzureAppService
        } else {
            Self::Local
        }
    }

    /// Key holding the redirect URI for this runtime
    #[must_use]
    pub const fn redirect_uri_key(self) -> &'static str {
        match self {
            Self::AzureAppService => env_keys::MSAL_REDIRECT_AZURE_URI,
            Self::Local => env_keys::MSAL_REDIRECT_LOCAL_URI,
        }
    }
}

impl fmt::Display for HostingRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AzureAppService => write!(f, "azure-app-service"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// Client secret that never shows up in `Debug` output or logs
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecret(String);

impl ClientSecret {
    /// Wrap a secret value
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret for the token endpoint form body
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(***)")
    }
}

/// Everything the sign-in flow needs from configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Application (client) id
    pub client_id: String,
    /// Confidential client secret
    pub client_secret: ClientSecret,
    /// Authority base URL, always ending in `/`
    pub authority: Url,
    /// Redirect URI registered for this deployment
    pub redirect_uri: String,
    /// Requested scopes, in configured order
    pub scopes: Vec<String>,
    /// Tenants whose accounts may sign in
    pub allowed_tenants: AllowedTenants,
    /// Microsoft Graph base URL without trailing slash
    pub graph_api_base: String,
}

/// Top-level application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP host port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Full `RUST_LOG` filter; takes precedence over `log_level`
    pub log_filter: Option<String>,
    /// Log output format
    pub log_format: LogFormat,
    /// Deployment environment
    pub environment: Environment,
    /// Seconds a session may stay idle before the registry evicts it
    pub session_idle_timeout_secs: u64,
    /// Detected hosting runtime
    pub hosting: HostingRuntime,
    /// Sign-in configuration
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Load configuration from a `.env` file (if any) and the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a required setting is missing or malformed
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");

        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Parse configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns an error if a required setting is missing or malformed
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let hosting = HostingRuntime::detect(&lookup);

        let redirect_uri = lookup(env_keys::MSAL_REDIRECT_URI)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| lookup(hosting.redirect_uri_key()))
            .map(|v| v.trim().to_owned())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| AppError::config_missing(hosting.redirect_uri_key()))?;

        let auth = AuthConfig {
            client_id: required(&lookup, env_keys::APP_CLIENT_ID)?,
            client_secret: ClientSecret::new(required(&lookup, env_keys::APP_CLIENT_SECRET)?),
            authority: parse_authority(&required(&lookup, env_keys::MSAL_AUTHORITY)?)?,
            redirect_uri,
            scopes: parse_list(&lookup(env_keys::MSAL_SCOPES).unwrap_or_default()),
            allowed_tenants: AllowedTenants::new(parse_list(
                &lookup(env_keys::ALLOWED_TENANTS).unwrap_or_default(),
            )),
            graph_api_base: lookup(env_keys::GRAPH_API_BASE)
                .unwrap_or_else(|| defaults::GRAPH_API_BASE.to_owned())
                .trim()
                .trim_end_matches('/')
                .to_owned(),
        };

        let http_port = match lookup(env_keys::HTTP_PORT) {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| {
                AppError::config_invalid(format!("Invalid {} value '{raw}'", env_keys::HTTP_PORT))
                    .with_source(e)
            })?,
            None => defaults::HTTP_PORT,
        };

        let session_idle_timeout_secs = match lookup(env_keys::SESSION_IDLE_TIMEOUT_SECS) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                AppError::config_invalid(format!(
                    "Invalid {} value '{raw}'",
                    env_keys::SESSION_IDLE_TIMEOUT_SECS
                ))
                .with_source(e)
            })?,
            None => defaults::SESSION_IDLE_TIMEOUT_SECS,
        };

        let config = Self {
            http_port,
            log_level: LogLevel::from_str_or_default(
                &lookup(env_keys::LOG_LEVEL).unwrap_or_default(),
            ),
            log_filter: lookup(env_keys::RUST_LOG)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty()),
            log_format: LogFormat::from_str_or_default(
                &lookup(env_keys::LOG_FORMAT).unwrap_or_default(),
            ),
            environment: Environment::from_str_or_default(
                &lookup(env_keys::ENVIRONMENT).unwrap_or_default(),
            ),
            session_idle_timeout_secs,
            hosting,
            auth,
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect URI or Graph base URL is not an absolute URL
    pub fn validate(&self) -> AppResult<()> {
        Url::parse(&self.auth.redirect_uri).map_err(|e| {
            AppError::config_invalid(format!(
                "Redirect URI '{}' is not a valid URL",
                self.auth.redirect_uri
            ))
            .with_source(e)
        })?;

        Url::parse(&self.auth.graph_api_base).map_err(|e| {
            AppError::config_invalid(format!(
                "{} '{}' is not a valid URL",
                env_keys::GRAPH_API_BASE,
                self.auth.graph_api_base
            ))
            .with_source(e)
        })?;

        if self.session_idle_timeout_secs == 0 {
            return Err(AppError::config_invalid(format!(
                "{} must be greater than zero",
                env_keys::SESSION_IDLE_TIMEOUT_SECS
            )));
        }

        if self.auth.allowed_tenants.is_empty() {
            warn!("ALLOWED_TENANTS is empty; every sign-in will be denied");
        }

        if self.auth.scopes.is_empty() {
            warn!("MSAL_SCOPES is empty; only the reserved OpenID scopes will be requested");
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Entra Gate Configuration:\n\
             - HTTP Port: {}\n\
             - Log Level: {}\n\
             - Environment: {}\n\
             - Hosting Runtime: {}\n\
             - Session Idle Timeout: {}s\n\
             - Authority: {}\n\
             - Redirect URI: {}\n\
             - Scopes: {}\n\
             - Allowed Tenants: {}",
            self.http_port,
            self.log_level,
            self.environment,
            self.hosting,
            self.session_idle_timeout_secs,
            self.auth.authority,
            self.auth.redirect_uri,
            self.auth.scopes.join(" "),
            self.auth.allowed_tenants.len(),
        )
    }
}

/// Read a required, non-blank setting
fn required(lookup: impl Fn(&str) -> Option<String>, key: &str) -> AppResult<String> {
    lookup(key)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::config_missing(key))
}

/// Parse the authority URL so endpoint paths can be joined onto it
fn parse_authority(raw: &str) -> AppResult<Url> {
    let mut normalized = raw.trim().to_owned();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }

    let url = Url::parse(&normalized).map_err(|e| {
        AppError::config_invalid(format!(
            "Invalid {} value '{raw}'",
            env_keys::MSAL_AUTHORITY
        ))
        .with_source(e)
    })?;

    if url.cannot_be_a_base() {
        return Err(AppError::config_invalid(format!(
            "{} must be an absolute http(s) URL",
            env_keys::MSAL_AUTHORITY
        )));
    }

    Ok(url)
}

/// Parse a comma-separated list, trimming items and dropping empty ones
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
