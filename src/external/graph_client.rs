// ABOUTME: Microsoft Graph client for resolving the signed-in user's profile
// ABOUTME: Calls GET /me with the bearer token and returns the JSON body as a Profile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Microsoft Graph `/me` client
//!
//! # API Reference
//! <https://learn.microsoft.com/graph/api/user-get>

use crate::constants::defaults;
use crate::utils::http_client::api_client;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Graph client configuration
#[derive(Debug, Clone)]
pub struct GraphClientConfig {
    /// Base URL without trailing slash (default: <https://graph.microsoft.com/v1.0>)
    pub base_url: String,
}

impl Default for GraphClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::GRAPH_API_BASE.to_owned(),
        }
    }
}

/// User profile as returned by the directory
///
/// The shape is not validated; accessors read the common Graph fields when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Profile(Map<String, Value>);

impl Profile {
    /// Wrap a raw JSON object
    #[must_use]
    pub const fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Raw field lookup
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// `displayName`
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.get("displayName").and_then(Value::as_str)
    }

    /// `userPrincipalName`, falling back to a plain `username` field
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.get("userPrincipalName")
            .or_else(|| self.get("username"))
            .and_then(Value::as_str)
    }

    /// Directory object id
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get("id").and_then(Value::as_str)
    }

    /// All fields
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// User directory seam used by the sign-in flow
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Resolve an access token to the user's profile
    async fn fetch_profile(&self, access_token: &str) -> Result<Profile>;
}

/// Microsoft Graph API client
pub struct GraphClient {
    config: GraphClientConfig,
    client: reqwest::Client,
}

impl GraphClient {
    /// Create a new Graph client with the shared API HTTP settings
    #[must_use]
    pub fn new(config: GraphClientConfig) -> Self {
        Self {
            config,
            client: api_client(),
        }
    }

    fn me_url(&self) -> String {
        format!("{}/me", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl UserDirectory for GraphClient {
    async fn fetch_profile(&self, access_token: &str) -> Result<Profile> {
        let response = self
            .client
            .get(self.me_url())
            .bearer_auth(access_token)
            .send()
            .await
            .context("Graph /me request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Graph /me returned {status}: {body}"));
        }

        response
            .json::<Profile>()
            .await
            .context("Graph /me returned a body that is not a JSON object")
    }
}
