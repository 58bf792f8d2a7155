//! HTTP utilities for the Neptune client.
//!
//! Thin wrapper around `reqwest` that applies authentication and default
//! headers, and maps every failure onto [`ApiError`]. Each call issues exactly
//! one request; nothing is retried or cached.

use crate::client::ApiError;
use crate::configuration::Configuration;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, trace};
use url::Url;

/// HTTP client bound to one API base address
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: Url,
    configuration: Configuration,
}

impl HttpClient {
    /// Create a new HTTP client for the given base address
    pub fn new(base_url: &str, configuration: Configuration) -> Result<Self, ApiError> {
        let base_url = parse_base_url(base_url)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(configuration.timeout_secs))
            .user_agent(configuration.user_agent.clone())
            .build()
            .map_err(ApiError::HttpError)?;

        Ok(Self {
            client,
            base_url,
            configuration,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Build the full URL of an API path.
    ///
    /// Each segment is percent-encoded on its own, so identifiers containing
    /// `/`, `?` or `#` stay within their segment.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Make a GET request to the specified path and decode the JSON response
    pub async fn get<T>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
        auth_token: Option<&str>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let url = self.url(segments)?;
        debug!("GET {}", url);

        let mut request = self.client.get(url.as_str());
        if !query.is_empty() {
            request = request.query(query);
        }

        // Add authorization header if available
        if let Some(token) = auth_token {
            request = request.bearer_auth(token);
        }

        // Add default headers
        for (key, value) in &self.configuration.default_headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(ApiError::HttpError)?;
        let status = response.status();
        let response_text = response.text().await.map_err(ApiError::HttpError)?;
        trace!("Raw response text from {}: {}", url, response_text);

        if !status.is_success() {
            debug!("Request to {} failed with status {}", url, status);
            return Err(status_error(status, &response_text));
        }

        serde_json::from_str::<T>(&response_text).map_err(|e| {
            error!(
                "Failed to deserialize response from {}: {}. Raw response: {}",
                url, e, response_text
            );
            ApiError::JsonError(e)
        })
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, ApiError> {
    let url = Url::parse(base_url)
        .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ApiError::InvalidUrl(format!(
            "URL must use http or https, got {:?} in {}",
            scheme, base_url
        ))),
    }
}

/// Turn an unsuccessful response into an error, preferring the server's own
/// message when the body is a JSON error document
fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = match serde_json::from_str::<serde_json::Value>(body) {
        Ok(json) => json["message"]
            .as_str()
            .or_else(|| json["error"].as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    };

    let message = if message.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        message
    };

    ApiError::StatusError {
        status: status.as_u16(),
        message,
    }
}
