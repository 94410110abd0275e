// ABOUTME: OAuth2 client implementation for Azure AD authorization-code sign-in
// ABOUTME: Builds authorize URLs and exchanges codes at the v2.0 token endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::config::{AuthConfig, ClientSecret};
use crate::constants::identity::{AUTHORIZE_PATH, RESERVED_SCOPES, TOKEN_PATH};
use crate::utils::http_client::oauth_client;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// OAuth 2.0 client configuration
#[derive(Debug, Clone)]
pub struct OAuth2Config {
    /// OAuth client ID from the app registration
    pub client_id: String,
    /// OAuth client secret from the app registration
    pub client_secret: ClientSecret,
    /// Authorization endpoint URL
    pub auth_url: Url,
    /// Token endpoint URL
    pub token_url: Url,
    /// Redirect URI for OAuth callbacks
    pub redirect_uri: String,
    /// OAuth scopes to request
    pub scopes: Vec<String>,
}

impl OAuth2Config {
    /// Derive the v2.0 endpoints from the configured authority
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint paths cannot be joined onto the authority
    pub fn from_auth_config(auth: &AuthConfig) -> Result<Self> {
        Ok(Self {
            client_id: auth.client_id.clone(),
            client_secret: auth.client_secret.clone(),
            auth_url: auth
                .authority
                .join(AUTHORIZE_PATH)
                .context("Invalid authorize endpoint")?,
            token_url: auth
                .authority
                .join(TOKEN_PATH)
                .context("Invalid token endpoint")?,
            redirect_uri: auth.redirect_uri.clone(),
            scopes: auth.scopes.clone(),
        })
    }

    /// Configured scopes followed by the reserved `OpenID` scopes, without duplicates
    #[must_use]
    pub fn request_scope(&self) -> String {
        let mut scopes: Vec<&str> = Vec::with_capacity(self.scopes.len() + RESERVED_SCOPES.len());
        for scope in self.scopes.iter().map(String::as_str).chain(RESERVED_SCOPES) {
            if !scopes.contains(&scope) {
                scopes.push(scope);
            }
        }
        scopes.join(" ")
    }
}

/// Interactive prompt behavior requested from the authorization endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Show the account picker even if a single account is signed in
    SelectAccount,
}

impl Prompt {
    const fn as_str(self) -> &'static str {
        match self {
            Self::SelectAccount => "select_account",
        }
    }
}

/// OAuth 2.0 access token returned by the token endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuth2Token {
    /// The access token string
    pub access_token: String,
    /// Token type (usually "Bearer")
    pub token_type: String,
    /// Expiration timestamp (UTC)
    pub expires_at: Option<DateTime<Utc>>,
    /// Granted OAuth scopes
    pub scope: Option<String>,
}

/// Identity provider seam used by the sign-in flow
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL that starts interactive sign-in
    fn authorization_url(&self, prompt: Option<Prompt>) -> String;

    /// Exchange a single-use authorization code for tokens
    async fn exchange_code(&self, code: &str) -> Result<OAuth2Token>;
}

/// Confidential OAuth 2.0 client for an Azure AD authority
pub struct AzureAdClient {
    config: OAuth2Config,
    client: reqwest::Client,
}

impl AzureAdClient {
    /// Create a new client with the shared OAuth HTTP settings
    #[must_use]
    pub fn new(config: OAuth2Config) -> Self {
        Self {
            config,
            client: oauth_client(),
        }
    }

    #[must_use]
    fn token_from_response(response: TokenResponse) -> OAuth2Token {
        let expires_at = response
            .expires_in
            .and_then(|seconds| i64::try_from(seconds).ok())
            .map(|seconds| Utc::now() + Duration::seconds(seconds));

        OAuth2Token {
            access_token: response.access_token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_owned()),
            expires_at,
            scope: response.scope,
        }
    }
}

#[async_trait]
impl IdentityProvider for AzureAdClient {
    fn authorization_url(&self, prompt: Option<Prompt>) -> String {
        let mut url = self.config.auth_url.clone();

        {
            let mut query_pairs = url.query_pairs_mut();
            query_pairs
                .append_pair("client_id", &self.config.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", &self.config.redirect_uri)
                .append_pair("response_mode", "query")
                .append_pair("scope", &self.config.request_scope());

            if let Some(prompt) = prompt {
                query_pairs.append_pair("prompt", prompt.as_str());
            }
        }

        url.into()
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuth2Token> {
        let scope = self.config.request_scope();
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("scope", scope.as_str()),
        ];

        let response = self
            .client
            .post(self.config.token_url.clone())
            .form(&params)
            .send()
            .await
            .context("Token endpoint request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body: TokenErrorResponse = response.json().await.unwrap_or_default();
            return Err(anyhow!(
                "Token endpoint returned {status}: {} {}",
                body.error.unwrap_or_default(),
                body.error_description.unwrap_or_default()
            ));
        }

        let response: TokenResponse = response
            .json()
            .await
            .context("Token endpoint returned an unreadable body")?;

        Ok(Self::token_from_response(response))
    }
}

/// OAuth 2.0 token response from the authority
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: Option<String>,
    expires_in: Option<u64>,
    scope: Option<String>,
}

/// OAuth 2.0 error response (RFC 6749 section 5.2)
#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}
