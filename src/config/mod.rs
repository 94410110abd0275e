// ABOUTME: Configuration management module for startup settings
// ABOUTME: Re-exports the environment-backed application and sign-in configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module
//!
//! Settings are read once at startup into strongly typed structs and never
//! looked up by name afterwards. A missing or malformed value fails the load.

/// Environment and server configuration
pub mod environment;

pub use environment::{AppConfig, AuthConfig, ClientSecret, Environment, HostingRuntime, LogLevel};
