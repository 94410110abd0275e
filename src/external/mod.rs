// ABOUTME: External API client modules (Microsoft Graph)
// ABOUTME: Resolves access tokens to user profiles
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! External API Clients

pub mod graph_client;

pub use graph_client::{GraphClient, GraphClientConfig, Profile, UserDirectory};
