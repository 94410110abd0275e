// ABOUTME: Sign-in route handlers driving the auth flow controller per request
// ABOUTME: Maps AuthResult to redirects and JSON, and manages the session cookie
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Authentication routes
//!
//! The session cookie identifies one interactive context. Each request to `/`
//! holds that context's flow guard while the controller runs, so a refresh
//! racing the identity provider's redirect cannot redeem the same code twice.
//!
//! A request that arrives with a `code` never gets a page back directly: once
//! the code is spent (or ignored because the context is already signed in)
//! the browser is sent to the same URL without it. A failed attempt is kept
//! on the session so the follow-up `GET /` can still show why.

use super::AppState;
use crate::auth::{AuthResult, InteractionContext};
use crate::constants::http::{CODE_PARAM, SESSION_COOKIE};
use crate::errors::{AuthError, ErrorCode};
use crate::logging::AppLogger;
use crate::session::{SessionHandle, SessionStore};
use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use axum_extra::{headers::Cookie, TypedHeader};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Authentication routes implementation
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create the sign-in, profile and logout routes
    pub fn routes(state: AppState) -> Router {
        Router::new()
            .route("/", get(handle_entry))
            .route("/me", get(handle_me))
            .route("/logout", get(handle_logout))
            .with_state(state)
    }
}

fn session_id(cookies: Option<&TypedHeader<Cookie>>) -> Option<Uuid> {
    cookies
        .and_then(|TypedHeader(cookie)| cookie.get(SESSION_COOKIE))
        .and_then(|value| Uuid::parse_str(value).ok())
}

fn session_cookie(id: Uuid) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax")
}

fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn set_cookie(response: &mut Response, cookie: &str) {
    match HeaderValue::from_str(cookie) {
        Ok(value) => {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
        Err(e) => warn!("Could not build session cookie: {e}"),
    }
}

/// Location to send the browser to once the code is out of play
fn location_without_code(ctx: &InteractionContext) -> String {
    let mut remaining = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in ctx.query().iter().filter(|(key, _)| *key != CODE_PARAM) {
        remaining.append_pair(key, value);
        any = true;
    }
    if any {
        format!("/?{}", remaining.finish())
    } else {
        "/".to_owned()
    }
}

async fn handle_entry(
    State(state): State<AppState>,
    cookies: Option<TypedHeader<Cookie>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let known = session_id(cookies.as_ref())
        .and_then(|id| state.sessions.get(&id).map(|handle| (id, handle)));
    let (mut id, handle) = known.map_or_else(
        || (None, Arc::new(SessionHandle::default())),
        |(id, handle)| (Some(id), handle),
    );

    let mut ctx = InteractionContext::new(query);
    let result = {
        let _flow = handle.lock_flow().await;
        state
            .controller
            .ensure_authenticated(&mut ctx, handle.store())
            .await
    };

    // Anonymous visitors only get a registry entry once there is something to remember
    let mut issued = None;
    if id.is_none() && matches!(result, AuthResult::Authenticated | AuthResult::Denied(_)) {
        let new_id = state.sessions.insert(Arc::clone(&handle));
        issued = Some(new_id);
        id = Some(new_id);
    }

    let session_label = id.map_or_else(|| "anonymous".to_owned(), |id| format!("{id}"));
    let mut response = match result {
        AuthResult::Authenticated => {
            handle.record_denial(None);
            if ctx.code_consumed() {
                AppLogger::log_auth_event(&session_label, "sign_in", true, None);
                Redirect::to(&location_without_code(&ctx)).into_response()
            } else if ctx.code().is_some() {
                debug!(session.id = %session_label, "Ignoring code for signed-in session");
                Redirect::to(&location_without_code(&ctx)).into_response()
            } else {
                (
                    StatusCode::OK,
                    Json(json!({
                        "status": "authenticated",
                        "user": handle.store().get_profile(),
                    })),
                )
                    .into_response()
            }
        }
        AuthResult::AwaitingSignIn(url) => handle.last_denial().map_or_else(
            || {
                debug!(session.id = %session_label, "Redirecting to identity provider");
                (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
            },
            |reason| denied_response(&state, &reason),
        ),
        AuthResult::Denied(reason) => {
            AppLogger::log_auth_event(&session_label, "sign_in", false, Some(&reason.to_string()));
            handle.record_denial(Some(reason));
            Redirect::to(&location_without_code(&ctx)).into_response()
        }
    };

    if let Some(new_id) = issued {
        set_cookie(&mut response, &session_cookie(new_id));
    }
    response
}

fn denied_response(state: &AppState, reason: &AuthError) -> Response {
    let (status, sign_in_url) = if reason.is_policy_rejection() {
        (StatusCode::FORBIDDEN, state.controller.account_selection_url())
    } else {
        (StatusCode::UNAUTHORIZED, state.controller.sign_in_url())
    };

    (
        status,
        Json(json!({
            "status": "denied",
            "error": reason.code(),
            "message": reason.user_message(),
            "sign_in_url": sign_in_url,
        })),
    )
        .into_response()
}

async fn handle_me(
    State(state): State<AppState>,
    cookies: Option<TypedHeader<Cookie>>,
) -> Response {
    let profile = session_id(cookies.as_ref())
        .and_then(|id| state.sessions.get(&id))
        .filter(|handle| handle.store().is_authenticated())
        .and_then(|handle| handle.store().get_profile());

    match profile {
        Some(profile) => (StatusCode::OK, Json(profile)).into_response(),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "status": "unauthenticated",
                "error": ErrorCode::AuthRequired,
                "sign_in_url": state.controller.sign_in_url(),
            })),
        )
            .into_response(),
    }
}

async fn handle_logout(
    State(state): State<AppState>,
    cookies: Option<TypedHeader<Cookie>>,
) -> Response {
    if let Some(handle) = session_id(cookies.as_ref()).and_then(|id| state.sessions.remove(&id)) {
        let _flow = handle.lock_flow().await;
        state.controller.logout(handle.store());
        handle.record_denial(None);
    }

    let mut response = Redirect::to("/").into_response();
    set_cookie(&mut response, &expired_session_cookie());
    response
}
