//! Helpers shared by the integration tests.

#![allow(dead_code)]

use base64::{engine::general_purpose, Engine};
use neptune_lib::Credentials;
use serde_json::json;

pub const API_KEY: &str = "92a78b9d-e776-489a-b9c1-74dbb5ded302";

/// Encode an API token pointing at `api_address`
pub fn token(api_address: &str, namespace: Option<&str>) -> String {
    let mut payload = json!({
        "api_address": api_address,
        "api_key": API_KEY,
    });
    if let Some(namespace) = namespace {
        payload["namespace"] = json!(namespace);
    }
    general_purpose::STANDARD.encode(payload.to_string())
}

/// Credentials for a mock server, with a default namespace
pub fn credentials(api_address: &str, namespace: &str) -> Credentials {
    Credentials::from_token(token(api_address, Some(namespace))).unwrap()
}
