// ABOUTME: OAuth 2.0 client for signing users in against Azure AD
// ABOUTME: Authorization URL construction and authorization-code exchange
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # OAuth 2.0 Client Module
//!
//! The gate acts as a confidential OAuth 2.0 client of an Azure AD
//! (Microsoft Entra ID) authority. This module handles:
//! - Building the interactive sign-in URL
//! - Exchanging the returned authorization code for an access token
//!
//! The flow controller only sees the [`IdentityProvider`] trait, so tests
//! and alternative providers can stand in for Azure AD.

/// Core OAuth 2.0 client implementation
pub mod client;

pub use client::{AzureAdClient, IdentityProvider, OAuth2Config, OAuth2Token, Prompt};
