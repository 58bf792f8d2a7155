//! Credentials for authenticating calls to the Neptune API.
//!
//! A Neptune API token is a base64-encoded JSON document carrying the address
//! of the API and the user's key:
//!
//! ```json
//! {"api_address": "https://app.neptune.ml", "api_key": "92a78b9d-...", "namespace": "neptune-ml"}
//! ```
//!
//! The `namespace` key is optional. The token itself is what gets sent to the
//! server; the decoded fields only tell us where to send it.

use base64::{
    alphabet,
    engine::{self, general_purpose, DecodePaddingMode},
    Engine,
};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

/// Environment variable holding the encoded API token
pub const API_TOKEN_ENV_VAR: &str = "NEPTUNE_API_TOKEN";

/// Environment variable overriding the default namespace
pub const NAMESPACE_ENV_VAR: &str = "NEPTUNE_NAMESPACE";

const LENIENT_STANDARD: engine::GeneralPurpose = engine::GeneralPurpose::new(
    &alphabet::STANDARD,
    general_purpose::PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const LENIENT_URL_SAFE: engine::GeneralPurpose = engine::GeneralPurpose::new(
    &alphabet::URL_SAFE,
    general_purpose::PAD.with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Errors raised while obtaining credentials.
///
/// Every variant is a "missing credentials" condition: the caller has no
/// usable way to authenticate and retrying will not help.
#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("environment variable {0} is not set")]
    EnvVarNotSet(String),
    #[error("API token is not valid base64: {0}")]
    InvalidEncoding(String),
    #[error("API token does not contain a valid JSON document: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("API token is missing the {0:?} field")]
    MissingField(&'static str),
    #[error("no namespace was given and none could be derived from the credentials")]
    MissingNamespace,
}

/// Anything able to authenticate a Neptune session.
///
/// Implemented by [`Credentials`]; tests and demos can implement it on plain
/// structs holding a fixed address and token.
pub trait ApiCredentials {
    /// Base address of the Neptune API, e.g. `https://app.neptune.ml`
    fn api_address(&self) -> &str;

    /// Token sent with every request
    fn api_token(&self) -> &str;

    /// Namespace used when a call does not name one explicitly
    fn namespace(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Deserialize)]
struct TokenPayload {
    api_address: Option<String>,
    api_key: Option<String>,
    namespace: Option<String>,
}

/// Contents of a decoded API token.
#[derive(Clone, PartialEq, Eq)]
pub struct DecodedToken {
    pub api_address: String,
    pub api_key: String,
    pub namespace: Option<String>,
}

impl fmt::Debug for DecodedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedToken")
            .field("api_address", &self.api_address)
            .field("api_key", &"***")
            .field("namespace", &self.namespace)
            .finish()
    }
}

/// Decode an encoded API token.
///
/// Accepts the standard and the URL-safe base64 alphabets, padded or not.
/// Surrounding whitespace is ignored.
pub fn decode_token(token: &str) -> Result<DecodedToken, CredentialsError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CredentialsError::InvalidEncoding("token is empty".to_string()));
    }

    let bytes = LENIENT_STANDARD
        .decode(token)
        .or_else(|_| LENIENT_URL_SAFE.decode(token))
        .map_err(|e| CredentialsError::InvalidEncoding(e.to_string()))?;
    let json = String::from_utf8(bytes)
        .map_err(|e| CredentialsError::InvalidEncoding(e.to_string()))?;

    let payload: TokenPayload = serde_json::from_str(&json)?;

    let api_address = payload
        .api_address
        .filter(|a| !a.is_empty())
        .ok_or(CredentialsError::MissingField("api_address"))?;
    let api_key = payload
        .api_key
        .filter(|k| !k.is_empty())
        .ok_or(CredentialsError::MissingField("api_key"))?;

    Ok(DecodedToken {
        api_address,
        api_key,
        namespace: payload.namespace.filter(|n| !n.is_empty()),
    })
}

/// Credentials of a Neptune user: where the API lives, the token to present
/// and the namespace used by default.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_address: String,
    api_token: String,
    api_key: String,
    namespace: Option<String>,
}

impl Credentials {
    /// Build credentials for an explicit API address.
    ///
    /// The token is still decoded, since it carries the default namespace.
    pub fn new(
        api_address: impl Into<String>,
        api_token: impl Into<String>,
    ) -> Result<Credentials, CredentialsError> {
        let api_token = api_token.into();
        let decoded = decode_token(&api_token)?;

        Ok(Credentials {
            api_address: api_address.into(),
            api_token: api_token.trim().to_string(),
            api_key: decoded.api_key,
            namespace: decoded.namespace,
        })
    }

    /// Build credentials from an encoded token alone, taking the API address
    /// from the token.
    pub fn from_token(api_token: impl Into<String>) -> Result<Credentials, CredentialsError> {
        let api_token = api_token.into();
        let decoded = decode_token(&api_token)?;

        Ok(Credentials {
            api_address: decoded.api_address,
            api_token: api_token.trim().to_string(),
            api_key: decoded.api_key,
            namespace: decoded.namespace,
        })
    }

    /// Read credentials from the `NEPTUNE_API_TOKEN` environment variable.
    ///
    /// `NEPTUNE_NAMESPACE`, when set, takes precedence over the namespace
    /// embedded in the token.
    pub fn from_env() -> Result<Credentials, CredentialsError> {
        Self::from_env_var(API_TOKEN_ENV_VAR)
    }

    /// Read credentials from the given environment variable.
    pub fn from_env_var(name: &str) -> Result<Credentials, CredentialsError> {
        debug!("Reading Neptune API token from {}...", name);

        let token = match std::env::var(name) {
            Ok(token) if !token.trim().is_empty() => token,
            _ => return Err(CredentialsError::EnvVarNotSet(name.to_string())),
        };

        let credentials = Self::from_token(token)?;
        match std::env::var(NAMESPACE_ENV_VAR) {
            Ok(namespace) if !namespace.trim().is_empty() => {
                Ok(credentials.with_namespace(namespace.trim()))
            }
            _ => Ok(credentials),
        }
    }

    /// Replace the default namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn api_address(&self) -> &str {
        &self.api_address
    }

    /// The encoded token, exactly as supplied.
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// The key embedded in the token.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl ApiCredentials for Credentials {
    fn api_address(&self) -> &str {
        &self.api_address
    }

    fn api_token(&self) -> &str {
        &self.api_token
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_address", &self.api_address)
            .field("api_token", &"***")
            .field("namespace", &self.namespace)
            .finish()
    }
}
