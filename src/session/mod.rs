// ABOUTME: Per-interaction session state for authenticated users
// ABOUTME: SessionStore contract plus an in-memory implementation with atomic updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Session Management
//!
//! A session holds the authenticated flag, the access token and the user
//! profile for one interactive context. The flow controller only touches it
//! through [`SessionStore`], so an in-memory store can be swapped for a
//! shared one without changing flow logic.
//!
//! Every mutation replaces the whole [`Session`] under one lock acquisition;
//! no reader can observe a token without its profile or the flag without both.

/// Session id to store mapping for the HTTP host
pub mod registry;

pub use registry::{SessionHandle, SessionRegistry};

use crate::external::Profile;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{PoisonError, RwLock};
use tracing::info;
use uuid::Uuid;

/// Login bookkeeping emitted when a session is initialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionLogInfo {
    /// Username of the signed-in user, if the profile had one
    pub user_id: Option<String>,
    /// `<username>_<uuid>` identifier for correlating log lines
    pub session_id: String,
    /// When the session started
    pub session_start: DateTime<Utc>,
}

impl SessionLogInfo {
    /// Build log info for a freshly authenticated profile
    #[must_use]
    pub fn for_profile(profile: &Profile) -> Self {
        let username = profile.username().map(str::to_owned);
        Self {
            session_id: format!(
                "{}_{}",
                username.as_deref().unwrap_or("unknown"),
                Uuid::new_v4()
            ),
            user_id: username,
            session_start: Utc::now(),
        }
    }
}

/// Snapshot of one interactive context's authentication state
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// True only after a complete, successful sign-in
    pub is_authenticated: bool,
    /// Bearer token obtained from the identity provider
    pub access_token: Option<String>,
    /// Profile from the user directory
    pub user_info: Option<Profile>,
    /// Login bookkeeping
    pub log_info: Option<SessionLogInfo>,
}

/// Contract between the flow controller and session storage
pub trait SessionStore: Send + Sync {
    /// Commit a successful sign-in in one update
    fn initialize(&self, access_token: String, profile: Profile);

    /// Drop everything, returning to the unauthenticated state
    fn clear(&self);

    /// Whether the context completed sign-in
    fn is_authenticated(&self) -> bool;

    /// Profile of the signed-in user
    fn get_profile(&self) -> Option<Profile>;

    /// Access token of the signed-in user
    fn access_token(&self) -> Option<String>;

    /// Login bookkeeping of the current session
    fn log_info(&self) -> Option<SessionLogInfo>;
}

/// Process-local session store for a single interactive context
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    state: RwLock<Session>,
}

impl InMemorySessionStore {
    /// Create an unauthenticated session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consistent copy of the whole session
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace(&self, session: Session) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = session;
    }
}

impl SessionStore for InMemorySessionStore {
    fn initialize(&self, access_token: String, profile: Profile) {
        let log_info = SessionLogInfo::for_profile(&profile);

        info!(
            event = "User_Login",
            user.id = log_info.user_id.as_deref().unwrap_or("unknown"),
            session.id = %log_info.session_id,
            session.start = %log_info.session_start.to_rfc3339(),
            "User authenticated"
        );

        self.replace(Session {
            is_authenticated: true,
            access_token: Some(access_token),
            user_info: Some(profile),
            log_info: Some(log_info),
        });
    }

    fn clear(&self) {
        self.replace(Session::default());
    }

    fn is_authenticated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_authenticated
    }

    fn get_profile(&self) -> Option<Profile> {
        self.snapshot().user_info
    }

    fn access_token(&self) -> Option<String> {
        self.snapshot().access_token
    }

    fn log_info(&self) -> Option<SessionLogInfo> {
        self.snapshot().log_info
    }
}
