// ABOUTME: Unverified JWT claim decoding for tokens received from the token endpoint
// ABOUTME: Reads the declared algorithm from the header and extracts the tenant claim
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Token Decoder
//!
//! Access tokens are decoded **without signature verification**. That is only
//! acceptable because the token is read immediately after it arrives in the
//! token-exchange response from the identity provider over TLS. Do not use
//! this module for tokens that arrive from any other channel.

use crate::constants::identity::TENANT_CLAIM;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::Algorithm;
use serde_json::{Map, Value};
use thiserror::Error;

/// Reasons a token could not be turned into a claim set
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Header segment missing, not base64url, or an unknown `alg`
    #[error("invalid token header: {0}")]
    Header(#[from] jsonwebtoken::errors::Error),
    /// Token does not have the three `header.payload.signature` segments
    #[error("token is not a three-segment JWT")]
    Structure,
    /// Payload segment is not base64url
    #[error("payload is not base64url: {0}")]
    Encoding(#[from] base64::DecodeError),
    /// Payload is not a JSON object
    #[error("payload is not a JSON object: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decoded payload claims plus the algorithm the header declared
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSet {
    algorithm: Algorithm,
    claims: Map<String, Value>,
}

impl ClaimSet {
    /// Signing algorithm declared in the token header (not verified)
    #[must_use]
    pub const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Raw claim lookup
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.claims.get(name)
    }
}

/// Decode a token's claims without verifying its signature
///
/// # Errors
///
/// Returns an error if the header cannot be parsed, the token is not three
/// segments, or the payload is not a base64url-encoded JSON object
pub fn decode(token: &str) -> Result<ClaimSet, DecodeError> {
    let header = jsonwebtoken::decode_header(token)?;

    let mut segments = token.split('.');
    let (Some(_), Some(payload), Some(_), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(DecodeError::Structure);
    };

    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('='))?;
    let claims: Map<String, Value> = serde_json::from_slice(&bytes)?;

    Ok(ClaimSet {
        algorithm: header.alg,
        claims,
    })
}

/// Read the `tid` claim. Absence is not an error at this layer.
#[must_use]
pub fn get_tenant_claim(claims: &ClaimSet) -> Option<String> {
    claims
        .get(TENANT_CLAIM)
        .and_then(Value::as_str)
        .map(str::to_owned)
}
