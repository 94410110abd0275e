// ABOUTME: Sign-in flow controller turning an authorization code into an authenticated session
// ABOUTME: Fail-fast exchange, tenant check, profile fetch, then one atomic session commit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::tenant_policy::{is_allowed, AllowedTenants};
use super::token_decoder::{decode, get_tenant_claim};
use crate::config::AuthConfig;
use crate::constants::http::CODE_PARAM;
use crate::errors::AuthError;
use crate::external::{GraphClient, GraphClientConfig, Profile, UserDirectory};
use crate::oauth2_client::{AzureAdClient, IdentityProvider, OAuth2Config, Prompt};
use crate::session::SessionStore;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Query parameters of the current interaction
#[derive(Debug, Clone, Default)]
pub struct InteractionContext {
    query: HashMap<String, String>,
    code_consumed: bool,
}

impl InteractionContext {
    /// Wrap the interaction's query parameters
    #[must_use]
    pub fn new(query: HashMap<String, String>) -> Self {
        Self {
            query,
            code_consumed: false,
        }
    }

    /// Context carrying only an authorization code
    #[must_use]
    pub fn with_code(code: impl Into<String>) -> Self {
        Self::new(HashMap::from([(CODE_PARAM.to_owned(), code.into())]))
    }

    /// Authorization code returned by the identity provider, if any
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.query.get(CODE_PARAM).map(String::as_str)
    }

    /// Remove the code so a rerun never replays it
    fn take_code(&mut self) -> Option<String> {
        let code = self.query.remove(CODE_PARAM);
        if code.is_some() {
            self.code_consumed = true;
        }
        code
    }

    /// True when the flow spent the code; the caller should drop it from its URL
    #[must_use]
    pub const fn code_consumed(&self) -> bool {
        self.code_consumed
    }

    /// Remaining query parameters
    #[must_use]
    pub const fn query(&self) -> &HashMap<String, String> {
        &self.query
    }
}

/// Outcome of [`AuthFlowController::ensure_authenticated`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    /// The session is signed in
    Authenticated,
    /// Nobody is signed in; send the user to this URL
    AwaitingSignIn(String),
    /// A sign-in attempt failed
    Denied(AuthError),
}

impl AuthResult {
    /// Whether the interaction may proceed to the application
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated)
    }

    /// Message for the person signing in, when there is something to say
    #[must_use]
    pub const fn user_message(&self) -> Option<&'static str> {
        match self {
            Self::Denied(reason) => Some(reason.user_message()),
            Self::Authenticated | Self::AwaitingSignIn(_) => None,
        }
    }
}

/// States the flow moves through for one interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// No session and no code
    Unauthenticated,
    /// A code is being redeemed
    PendingCode,
    /// Session committed
    Authenticated,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => write!(f, "unauthenticated"),
            Self::PendingCode => write!(f, "pending_code"),
            Self::Authenticated => write!(f, "authenticated"),
        }
    }
}

/// Orchestrates identity provider, token decoder, tenant policy and user
/// directory into a single sign-in decision
pub struct AuthFlowController {
    identity: Arc<dyn IdentityProvider>,
    directory: Arc<dyn UserDirectory>,
    allowed_tenants: AllowedTenants,
}

impl AuthFlowController {
    /// Create a controller over explicit collaborators
    #[must_use]
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        directory: Arc<dyn UserDirectory>,
        allowed_tenants: AllowedTenants,
    ) -> Self {
        Self {
            identity,
            directory,
            allowed_tenants,
        }
    }

    /// Wire the Azure AD and Microsoft Graph clients from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the OAuth endpoints cannot be derived from the authority
    pub fn from_config(auth: &AuthConfig) -> anyhow::Result<Self> {
        let identity = AzureAdClient::new(OAuth2Config::from_auth_config(auth)?);
        let directory = GraphClient::new(GraphClientConfig {
            base_url: auth.graph_api_base.clone(),
        });

        Ok(Self::new(
            Arc::new(identity),
            Arc::new(directory),
            auth.allowed_tenants.clone(),
        ))
    }

    /// URL that starts interactive sign-in
    #[must_use]
    pub fn sign_in_url(&self) -> String {
        self.identity.authorization_url(None)
    }

    /// Sign-in URL that forces the account picker, for retrying with another account
    #[must_use]
    pub fn account_selection_url(&self) -> String {
        self.identity.authorization_url(Some(Prompt::SelectAccount))
    }

    /// Decide whether this interaction is authenticated and what to do if not.
    ///
    /// Never fails: every error is folded into [`AuthResult::Denied`]. When a
    /// code is present it is removed from `ctx` whatever the outcome.
    pub async fn ensure_authenticated(
        &self,
        ctx: &mut InteractionContext,
        session: &dyn SessionStore,
    ) -> AuthResult {
        if session.is_authenticated() {
            debug!(state = %FlowState::Authenticated, "Session already authenticated");
            return AuthResult::Authenticated;
        }

        let Some(code) = ctx.take_code() else {
            debug!(state = %FlowState::Unauthenticated, "No authorization code, awaiting sign-in");
            return AuthResult::AwaitingSignIn(self.sign_in_url());
        };

        debug!(state = %FlowState::PendingCode, "Redeeming authorization code");
        match self.handle_auth_code(&code, session).await {
            Ok(profile) => {
                info!(
                    state = %FlowState::Authenticated,
                    user.name = profile.username().unwrap_or("unknown"),
                    "Sign-in completed"
                );
                AuthResult::Authenticated
            }
            Err(reason) => {
                debug!(state = %FlowState::Unauthenticated, error = %reason, "Sign-in failed");
                AuthResult::Denied(reason)
            }
        }
    }

    /// Redeem an authorization code and commit the session on full success.
    ///
    /// Steps run in order and the first failure stops the rest. The session
    /// is written exactly once, after every step succeeded.
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] of the first step that failed
    pub async fn handle_auth_code(
        &self,
        code: &str,
        session: &dyn SessionStore,
    ) -> Result<Profile, AuthError> {
        let token = self.identity.exchange_code(code).await.map_err(|e| {
            error!("Error getting token from code: {e:#}");
            AuthError::TokenExchangeFailed
        })?;
        debug!(
            token.kind = %token.token_type,
            token.expires_at = ?token.expires_at,
            token.scope = token.scope.as_deref().unwrap_or(""),
            "Authorization code redeemed"
        );

        let claims = decode(&token.access_token).map_err(|e| {
            error!("Error decoding access token: {e}");
            AuthError::ClaimExtractionFailed
        })?;

        let tenant_id = get_tenant_claim(&claims).ok_or_else(|| {
            error!("Access token carries no tenant claim");
            AuthError::ClaimExtractionFailed
        })?;

        if !is_allowed(Some(&tenant_id), &self.allowed_tenants) {
            warn!(tenant.id = %tenant_id, "Sign-in rejected for tenant outside the allow-list");
            return Err(AuthError::TenantNotAllowed(tenant_id));
        }

        let profile = self
            .directory
            .fetch_profile(&token.access_token)
            .await
            .map_err(|e| {
                error!("Error fetching user info: {e:#}");
                AuthError::ProfileFetchFailed
            })?;

        session.initialize(token.access_token, profile.clone());
        Ok(profile)
    }

    /// Sign the current context out
    pub fn logout(&self, session: &dyn SessionStore) {
        session.clear();
        info!("Session cleared");
    }
}
