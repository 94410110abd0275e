// ABOUTME: Unit tests for config environment functionality
// ABOUTME: Validates required keys, redirect URI selection, list parsing, and defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use entra_gate::config::{AppConfig, Environment, HostingRuntime, LogLevel};
use entra_gate::errors::ErrorCode;
use entra_gate::logging::{LogFormat, LoggingConfig};
use std::collections::HashMap;
use std::error::Error;

fn base_env() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("APP_CLIENT_ID", "client-123"),
        ("APP_CLIENT_SECRET", "shh"),
        ("MSAL_AUTHORITY", "https://login.microsoftonline.com/common"),
        ("MSAL_REDIRECT_LOCAL_URI", "http://localhost:8501/"),
        ("MSAL_REDIRECT_AZURE_URI", "https://gate.azurewebsites.net/"),
        ("MSAL_SCOPES", "User.Read"),
        ("ALLOWED_TENANTS", " tenant-1 , tenant-2,, "),
    ])
}

fn load(env: &HashMap<&'static str, &'static str>) -> entra_gate::errors::AppResult<AppConfig> {
    AppConfig::from_lookup(|key| env.get(key).map(|v| (*v).to_owned()))
}

#[test]
fn test_log_level_parsing() {
    assert_eq!(LogLevel::from_str_or_default("WARN"), LogLevel::Warn);
    assert_eq!(LogLevel::from_str_or_default("Debug"), LogLevel::Debug);
    assert_eq!(LogLevel::from_str_or_default("invalid"), LogLevel::Info);
}

#[test]
fn test_environment_parsing() {
    assert_eq!(
        Environment::from_str_or_default("PROD"),
        Environment::Production
    );
    assert_eq!(
        Environment::from_str_or_default("unknown"),
        Environment::Development
    );
}

#[test]
fn test_local_runtime_uses_local_redirect() {
    let config = load(&base_env()).unwrap();

    assert_eq!(config.hosting, HostingRuntime::Local);
    assert_eq!(config.auth.redirect_uri, "http://localhost:8501/");
    assert_eq!(config.http_port, 8501);
    assert_eq!(
        config.auth.graph_api_base,
        "https://graph.microsoft.com/v1.0"
    );
}

#[test]
fn test_app_service_marker_selects_azure_redirect() {
    let mut env = base_env();
    env.insert("WEBSITE_INSTANCE_ID", "abc123");
    let config = load(&env).unwrap();

    assert_eq!(config.hosting, HostingRuntime::AzureAppService);
    assert_eq!(config.auth.redirect_uri, "https://gate.azurewebsites.net/");
}

#[test]
fn test_explicit_redirect_overrides_runtime_choice() {
    let mut env = base_env();
    env.insert("WEBSITE_INSTANCE_ID", "abc123");
    env.insert("MSAL_REDIRECT_URI", "https://gate.contoso.com/");
    let config = load(&env).unwrap();

    assert_eq!(config.auth.redirect_uri, "https://gate.contoso.com/");
}

#[test]
fn test_allowed_tenants_are_trimmed_and_blank_entries_dropped() {
    let config = load(&base_env()).unwrap();

    assert_eq!(config.auth.allowed_tenants.len(), 2);
    assert!(config.auth.allowed_tenants.contains("tenant-1"));
    assert!(config.auth.allowed_tenants.contains("tenant-2"));
    assert!(!config.auth.allowed_tenants.contains(""));
}

#[test]
fn test_missing_allow_list_loads_as_empty() {
    let mut env = base_env();
    env.remove("ALLOWED_TENANTS");
    let config = load(&env).unwrap();

    assert!(config.auth.allowed_tenants.is_empty());
}

#[test]
fn test_authority_gets_trailing_slash() {
    let config = load(&base_env()).unwrap();

    assert_eq!(
        config.auth.authority.as_str(),
        "https://login.microsoftonline.com/common/"
    );
}

#[test]
fn test_missing_required_keys_fail_fast() {
    for key in ["APP_CLIENT_ID", "APP_CLIENT_SECRET", "MSAL_AUTHORITY"] {
        let mut env = base_env();
        env.remove(key);
        let err = load(&env).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigMissing, "key {key}");
        assert!(err.message.contains(key), "key {key}: {}", err.message);
    }
}

#[test]
fn test_missing_redirect_names_runtime_key() {
    let mut env = base_env();
    env.insert("WEBSITE_INSTANCE_ID", "abc123");
    env.remove("MSAL_REDIRECT_AZURE_URI");
    let err = load(&env).unwrap_err();

    assert_eq!(err.code, ErrorCode::ConfigMissing);
    assert!(err.message.contains("MSAL_REDIRECT_AZURE_URI"));
}

#[test]
fn test_invalid_port_is_rejected() {
    let mut env = base_env();
    env.insert("HTTP_PORT", "not-a-port");
    let err = load(&env).unwrap_err();

    assert_eq!(err.code, ErrorCode::ConfigInvalid);
    assert!(err.source().is_some());
}

#[test]
fn test_session_idle_timeout_defaults_to_eight_hours() {
    let config = load(&base_env()).unwrap();
    assert_eq!(config.session_idle_timeout_secs, 8 * 60 * 60);

    let mut env = base_env();
    env.insert("SESSION_IDLE_TIMEOUT_SECS", " 600 ");
    assert_eq!(load(&env).unwrap().session_idle_timeout_secs, 600);
}

#[test]
fn test_session_idle_timeout_must_be_positive_number() {
    for raw in ["0", "soon"] {
        let mut env = base_env();
        env.insert("SESSION_IDLE_TIMEOUT_SECS", raw);
        let err = load(&env).unwrap_err();
        assert_eq!(err.code, ErrorCode::ConfigInvalid, "value {raw}");
        assert!(err.message.contains("SESSION_IDLE_TIMEOUT_SECS"));
    }
}

#[test]
fn test_logging_follows_loaded_config() {
    let mut env = base_env();
    env.insert("LOG_LEVEL", "warn");
    env.insert("LOG_FORMAT", "json");
    env.insert("ENVIRONMENT", "production");
    let logging = LoggingConfig::from_app_config(&load(&env).unwrap());

    assert_eq!(logging.level, "warn");
    assert_eq!(logging.format, LogFormat::Json);
    assert_eq!(logging.environment, "production");
    assert!(logging.include_location);
}

#[test]
fn test_rust_log_overrides_log_level() {
    let mut env = base_env();
    env.insert("LOG_LEVEL", "warn");
    env.insert("RUST_LOG", "entra_gate=debug");
    let logging = LoggingConfig::from_app_config(&load(&env).unwrap());

    assert_eq!(logging.level, "entra_gate=debug");
    assert_eq!(logging.format, LogFormat::Pretty);
    assert!(!logging.include_location);
}

#[test]
fn test_summary_hides_secret() {
    let config = load(&base_env()).unwrap();
    let summary = config.summary();

    assert!(summary.contains("Authority: https://login.microsoftonline.com/common/"));
    assert!(!summary.contains("shh"));
    assert!(!format!("{:?}", config.auth).contains("shh"));
}
