// ABOUTME: Integration tests for the Azure AD token client and the Graph profile client
// ABOUTME: Runs an in-process axum server standing in for the authority and Microsoft Graph
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use common::{alice_profile, init_test_logging, mint_token, test_auth_config};
use entra_gate::{
    auth::{AuthFlowController, AuthResult, InteractionContext},
    config::AuthConfig,
    errors::AuthError,
    external::{GraphClient, GraphClientConfig, UserDirectory},
    oauth2_client::{AzureAdClient, IdentityProvider, OAuth2Config},
    session::{InMemorySessionStore, SessionStore},
};
use serde_json::json;
use std::collections::HashMap;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use url::Url;

const GOOD_CODE: &str = "good-code";

#[derive(Clone, Default)]
struct StubState {
    access_token: String,
    last_form: Arc<Mutex<Option<HashMap<String, String>>>>,
}

async fn token_endpoint(
    State(state): State<StubState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let code = form.get("code").cloned().unwrap_or_default();
    *state.last_form.lock().unwrap() = Some(form);

    if code == GOOD_CODE {
        Json(json!({
            "access_token": state.access_token,
            "token_type": "Bearer",
            "expires_in": 3600,
            "scope": "User.Read openid profile offline_access"
        }))
        .into_response()
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_grant",
                "error_description": "AADSTS70008: The provided authorization code has expired."
            })),
        )
            .into_response()
    }
}

async fn me_endpoint(State(state): State<StubState>, headers: HeaderMap) -> Response {
    let expected = format!("Bearer {}", state.access_token);
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Json(alice_profile()).into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"code": "InvalidAuthenticationToken"}})),
        )
            .into_response(),
    }
}

async fn spawn_stub(state: StubState) -> Result<SocketAddr, Box<dyn Error>> {
    let app = Router::new()
        .route("/common/oauth2/v2.0/token", post(token_endpoint))
        .route("/v1.0/me", get(me_endpoint))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok(addr)
}

fn stub_auth_config(addr: SocketAddr, allowed: &[&str]) -> AuthConfig {
    AuthConfig {
        authority: Url::parse(&format!("http://{addr}/common/")).unwrap(),
        graph_api_base: format!("http://{addr}/v1.0"),
        ..test_auth_config(allowed)
    }
}

fn stub_state(access_token: String) -> StubState {
    StubState {
        access_token,
        ..StubState::default()
    }
}

#[tokio::test]
async fn test_code_exchange_posts_form_and_parses_token() -> Result<(), Box<dyn Error>> {
    init_test_logging();
    let state = stub_state("opaque-token".into());
    let addr = spawn_stub(state.clone()).await?;
    let client = AzureAdClient::new(OAuth2Config::from_auth_config(&stub_auth_config(
        addr,
        &[],
    ))?);

    let token = client.exchange_code(GOOD_CODE).await?;

    assert_eq!(token.access_token, "opaque-token");
    assert_eq!(token.token_type, "Bearer");
    assert!(token.expires_at.is_some_and(|at| at > chrono::Utc::now()));
    assert_eq!(
        token.scope.as_deref(),
        Some("User.Read openid profile offline_access")
    );

    let form = state.last_form.lock().unwrap().clone().unwrap();
    assert_eq!(form["grant_type"], "authorization_code");
    assert_eq!(form["client_id"], "test-client-id");
    assert_eq!(form["client_secret"], "test-secret");
    assert_eq!(form["redirect_uri"], "http://localhost:8501/");
    assert_eq!(form["scope"], "User.Read openid profile offline_access");

    Ok(())
}

#[tokio::test]
async fn test_code_exchange_surfaces_oauth_error() -> Result<(), Box<dyn Error>> {
    init_test_logging();
    let addr = spawn_stub(stub_state("unused".into())).await?;
    let client = AzureAdClient::new(OAuth2Config::from_auth_config(&stub_auth_config(
        addr,
        &[],
    ))?);

    let err = client.exchange_code("expired-code").await.unwrap_err();
    let message = format!("{err:#}");

    assert!(message.contains("400"), "{message}");
    assert!(message.contains("invalid_grant"), "{message}");

    Ok(())
}

#[tokio::test]
async fn test_graph_me_returns_profile() -> Result<(), Box<dyn Error>> {
    init_test_logging();
    let addr = spawn_stub(stub_state("graph-token".into())).await?;
    let graph = GraphClient::new(GraphClientConfig {
        base_url: format!("http://{addr}/v1.0"),
    });

    let profile = graph.fetch_profile("graph-token").await?;

    assert_eq!(profile.display_name(), Some("Alice"));
    assert_eq!(profile.username(), Some("alice@contoso.com"));
    assert_eq!(profile.id(), Some("user-1"));

    Ok(())
}

#[tokio::test]
async fn test_graph_me_rejects_bad_token() -> Result<(), Box<dyn Error>> {
    init_test_logging();
    let addr = spawn_stub(stub_state("graph-token".into())).await?;
    let graph = GraphClient::new(GraphClientConfig {
        base_url: format!("http://{addr}/v1.0/"),
    });

    let err = graph.fetch_profile("someone-else").await.unwrap_err();

    assert!(err.to_string().contains("401"));
    assert!(err.to_string().contains("InvalidAuthenticationToken"));

    Ok(())
}

#[tokio::test]
async fn test_controller_from_config_end_to_end() -> Result<(), Box<dyn Error>> {
    init_test_logging();
    let addr = spawn_stub(stub_state(mint_token(Some("tenant-1")))).await?;
    let controller = AuthFlowController::from_config(&stub_auth_config(addr, &["tenant-1"]))?;
    let session = InMemorySessionStore::new();

    let mut ctx = InteractionContext::with_code(GOOD_CODE);
    let result = controller.ensure_authenticated(&mut ctx, &session).await;

    assert_eq!(result, AuthResult::Authenticated);
    assert_eq!(
        session.get_profile().unwrap().display_name(),
        Some("Alice")
    );
    assert_eq!(
        session.log_info().unwrap().user_id.as_deref(),
        Some("alice@contoso.com")
    );

    Ok(())
}

#[tokio::test]
async fn test_controller_reports_expired_code() -> Result<(), Box<dyn Error>> {
    init_test_logging();
    let addr = spawn_stub(stub_state(mint_token(Some("tenant-1")))).await?;
    let controller = AuthFlowController::from_config(&stub_auth_config(addr, &["tenant-1"]))?;
    let session = InMemorySessionStore::new();

    let mut ctx = InteractionContext::with_code("expired-code");
    let result = controller.ensure_authenticated(&mut ctx, &session).await;

    assert_eq!(result, AuthResult::Denied(AuthError::TokenExchangeFailed));
    assert!(!session.is_authenticated());

    Ok(())
}
