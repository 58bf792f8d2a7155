use thiserror::Error;

use crate::{
    client::ApiError, configuration::ConfigurationError, credentials::CredentialsError,
};

/// Requested entity is absent from what the server returned
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("project '{full_id}' not found")]
    ProjectNotFound { full_id: String },
    #[error("experiment '{id}' not found in project '{project}'")]
    ExperimentNotFound { project: String, id: String },
    /// Also raised for channels that exist but are not numeric
    #[error("numeric channel '{name}' not found in experiment '{experiment}'")]
    ChannelNotFound { experiment: String, name: String },
    #[error("'{0}' is not a project id of the form namespace/name")]
    InvalidProjectId(String),
}

/// Error types that can occur while talking to Neptune
///
/// The three kinds stay distinguishable so callers can tell "no credentials"
/// from "couldn't ask" from "asked, but it isn't there".
#[derive(Debug, Error)]
pub enum NeptuneError {
    #[error("missing credentials: {0}")]
    MissingCredentials(#[from] CredentialsError),
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Lookup(#[from] LookupError),
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl NeptuneError {
    pub fn is_missing_credentials(&self) -> bool {
        matches!(self, NeptuneError::MissingCredentials(_))
    }

    pub fn is_api_error(&self) -> bool {
        matches!(self, NeptuneError::Api(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NeptuneError::Lookup(_))
    }
}

pub type Result<T> = std::result::Result<T, NeptuneError>;
