// ABOUTME: Shared test utilities and fakes for integration tests
// ABOUTME: Provides counting identity provider and directory fakes plus token minting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `entra_gate`

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use entra_gate::{
    auth::{AllowedTenants, AuthFlowController},
    config::{AuthConfig, ClientSecret},
    external::{Profile, UserDirectory},
    oauth2_client::{AzureAdClient, IdentityProvider, OAuth2Config, OAuth2Token, Prompt},
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use url::Url;

static INIT_LOGGER: Once = Once::new();

pub const CLIENT_ID: &str = "test-client-id";
pub const REDIRECT_URI: &str = "http://localhost:8501/";

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// Auth configuration pointing at a fake authority
pub fn test_auth_config(allowed: &[&str]) -> AuthConfig {
    AuthConfig {
        client_id: CLIENT_ID.into(),
        client_secret: ClientSecret::new("test-secret"),
        authority: Url::parse("https://login.microsoftonline.com/common/").unwrap(),
        redirect_uri: REDIRECT_URI.into(),
        scopes: vec!["User.Read".into()],
        allowed_tenants: AllowedTenants::new(allowed.iter().copied()),
        graph_api_base: "https://graph.microsoft.com/v1.0".into(),
    }
}

/// Mint an HS256 access token with the given tenant claim
pub fn mint_token(tenant_id: Option<&str>) -> String {
    let mut claims = json!({
        "aud": "00000003-0000-0000-c000-000000000000",
        "name": "Alice",
        "exp": 4_102_444_800_u64,
    });
    if let Some(tid) = tenant_id {
        claims["tid"] = Value::String(tid.to_owned());
    }
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"test-signing-key"),
    )
    .unwrap()
}

pub fn alice_profile() -> Value {
    json!({
        "displayName": "Alice",
        "userPrincipalName": "alice@contoso.com",
        "id": "user-1"
    })
}

/// Identity provider that builds real authorization URLs but fakes the exchange
pub struct FakeIdentityProvider {
    urls: AzureAdClient,
    exchange: Result<String, String>,
    pub exchanges: AtomicUsize,
    pub codes: Mutex<Vec<String>>,
}

impl FakeIdentityProvider {
    pub fn new(auth: &AuthConfig, exchange: Result<String, String>) -> Self {
        Self {
            urls: AzureAdClient::new(OAuth2Config::from_auth_config(auth).unwrap()),
            exchange,
            exchanges: AtomicUsize::new(0),
            codes: Mutex::new(Vec::new()),
        }
    }

    pub fn exchange_count(&self) -> usize {
        self.exchanges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn authorization_url(&self, prompt: Option<Prompt>) -> String {
        self.urls.authorization_url(prompt)
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuth2Token> {
        self.exchanges.fetch_add(1, Ordering::SeqCst);
        self.codes.lock().unwrap().push(code.to_owned());
        match &self.exchange {
            Ok(access_token) => Ok(OAuth2Token {
                access_token: access_token.clone(),
                token_type: "Bearer".into(),
                expires_at: None,
                scope: None,
            }),
            Err(message) => Err(anyhow!("{message}")),
        }
    }
}

/// Directory returning a canned profile, or failing when none is set
pub struct FakeDirectory {
    profile: Option<Value>,
    pub calls: AtomicUsize,
}

impl FakeDirectory {
    pub fn new(profile: Option<Value>) -> Self {
        Self {
            profile,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserDirectory for FakeDirectory {
    async fn fetch_profile(&self, _access_token: &str) -> Result<Profile> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.profile {
            Some(value) => Ok(serde_json::from_value(value.clone())?),
            None => Err(anyhow!("Graph /me returned 500 Internal Server Error")),
        }
    }
}

/// Controller wired to fakes, with handles to inspect them
pub struct Harness {
    pub controller: Arc<AuthFlowController>,
    pub identity: Arc<FakeIdentityProvider>,
    pub directory: Arc<FakeDirectory>,
}

impl Harness {
    pub fn new(allowed: &[&str], exchange: Result<String, String>, profile: Option<Value>) -> Self {
        init_test_logging();
        let auth = test_auth_config(allowed);
        let identity = Arc::new(FakeIdentityProvider::new(&auth, exchange));
        let directory = Arc::new(FakeDirectory::new(profile));
        let controller = Arc::new(AuthFlowController::new(
            Arc::clone(&identity) as Arc<dyn IdentityProvider>,
            Arc::clone(&directory) as Arc<dyn UserDirectory>,
            auth.allowed_tenants,
        ));
        Self {
            controller,
            identity,
            directory,
        }
    }

    /// Harness where the token carries `tenant-1` and the directory knows Alice
    pub fn tenant_one(allowed: &[&str]) -> Self {
        Self::new(
            allowed,
            Ok(mint_token(Some("tenant-1"))),
            Some(alice_profile()),
        )
    }
}
