// ABOUTME: Azure AD sign-in and tenant authorization
// ABOUTME: Flow controller, unverified token decoding, and tenant allow-list policy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Authentication and Tenant Authorization
//!
//! An interaction is authenticated once an authorization code has been
//! exchanged for a token, the token's tenant is on the allow-list, and the
//! user's profile has been fetched. [`AuthFlowController`] runs that sequence
//! and reports one of three outcomes through [`AuthResult`].

/// Sign-in flow controller
pub mod flow;
/// Tenant allow-list predicate
pub mod tenant_policy;
/// Unverified JWT claim decoding
pub mod token_decoder;

pub use flow::{AuthFlowController, AuthResult, FlowState, InteractionContext};
pub use tenant_policy::{is_allowed, AllowedTenants};
pub use token_decoder::{decode, get_tenant_claim, ClaimSet, DecodeError};
