use crate::configuration::Configuration;
use crate::http_utils::HttpClient;
use crate::model::{
    ChannelDto, ChannelValueDto, ChannelValuesResponse, EntriesResponse, ExperimentDto, MemberDto,
    ProjectDto,
};
use std::fmt;
use tracing::debug;

const BACKEND_PATH: [&str; 3] = ["api", "backend", "v1"];

/// Error emitted by the Neptune API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("API error (status {status}): {message}")]
    StatusError { status: u16, message: String },
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("invalid API address: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// HTTP status returned by the server, if the request got that far
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::StatusError { status, .. } => Some(*status),
            ApiError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Narrows the experiment and leaderboard listings.
///
/// Every field left empty places no constraint. Values within one field are
/// alternatives; fields combine as a conjunction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentFilter {
    pub ids: Vec<String>,
    pub states: Vec<String>,
    pub owners: Vec<String>,
    pub tags: Vec<String>,
    /// Minimal running time, in seconds
    pub min_running_time: Option<u64>,
}

impl ExperimentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.ids.push(id.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.states.push(state.into());
        self
    }

    #[must_use]
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owners.push(owner.into());
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    #[must_use]
    pub fn min_running_time(mut self, seconds: u64) -> Self {
        self.min_running_time = Some(seconds);
        self
    }

    /// Query parameters, one pair per value
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        query.extend(self.ids.iter().map(|v| ("id", v.clone())));
        query.extend(self.states.iter().map(|v| ("state", v.clone())));
        query.extend(self.owners.iter().map(|v| ("owner", v.clone())));
        query.extend(self.tags.iter().map(|v| ("tag", v.clone())));
        if let Some(seconds) = self.min_running_time {
            query.push(("minRunningTime", seconds.to_string()));
        }
        query
    }
}

/// Authenticated handle to the Neptune API.
///
/// Every method issues a single request and returns the raw wire types.
/// Nothing is cached between calls and failed calls are not retried.
pub struct Client {
    http: HttpClient,
    api_token: String,
}

impl Client {
    pub fn new(api_address: &str, api_token: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_configuration(api_address, api_token, Configuration::default())
    }

    pub fn with_configuration(
        api_address: &str,
        api_token: impl Into<String>,
        configuration: Configuration,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            http: HttpClient::new(api_address, configuration)?,
            api_token: api_token.into(),
        })
    }

    pub fn api_address(&self) -> &str {
        self.http.base_url().as_str()
    }

    /// GET a backend resource. Path segments are escaped individually, so
    /// ids may contain any character.
    async fn get<T>(&self, segments: &[&str], query: &[(&str, String)]) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let segments: Vec<&str> = BACKEND_PATH.iter().chain(segments).copied().collect();
        self.http.get(&segments, query, Some(&self.api_token)).await
    }

    /// List the projects of a namespace visible to the caller
    pub async fn get_projects(&self, namespace: &str) -> Result<Vec<ProjectDto>, ApiError> {
        debug!("Listing projects in namespace {}", namespace);
        let response: EntriesResponse<ProjectDto> = self
            .get(&["projects"], &[("namespace", namespace.to_string())])
            .await?;
        Ok(response.entries)
    }

    pub async fn get_project_members(&self, project_id: &str) -> Result<Vec<MemberDto>, ApiError> {
        debug!("Listing members of project {}", project_id);
        self.get(&["projects", project_id, "members"], &[]).await
    }

    pub async fn get_experiments(
        &self,
        project_id: &str,
        filter: &ExperimentFilter,
    ) -> Result<Vec<ExperimentDto>, ApiError> {
        debug!("Listing experiments of project {}", project_id);
        let response: EntriesResponse<ExperimentDto> = self
            .get(
                &["projects", project_id, "experiments"],
                &filter.to_query(),
            )
            .await?;
        Ok(response.entries)
    }

    pub async fn get_leaderboard(
        &self,
        project_id: &str,
        filter: &ExperimentFilter,
    ) -> Result<Vec<ExperimentDto>, ApiError> {
        debug!("Fetching leaderboard of project {}", project_id);
        let response: EntriesResponse<ExperimentDto> = self
            .get(
                &["projects", project_id, "leaderboard"],
                &filter.to_query(),
            )
            .await?;
        Ok(response.entries)
    }

    pub async fn get_experiment(&self, experiment_id: &str) -> Result<ExperimentDto, ApiError> {
        debug!("Fetching experiment {}", experiment_id);
        self.get(&["experiments", experiment_id], &[]).await
    }

    pub async fn get_channels(&self, experiment_id: &str) -> Result<Vec<ChannelDto>, ApiError> {
        debug!("Listing channels of experiment {}", experiment_id);
        self.get(&["experiments", experiment_id, "channels"], &[]).await
    }

    pub async fn get_channel_values(
        &self,
        channel_id: &str,
    ) -> Result<Vec<ChannelValueDto>, ApiError> {
        debug!("Fetching values of channel {}", channel_id);
        let response: ChannelValuesResponse = self
            .get(&["channels", channel_id, "values"], &[])
            .await?;
        Ok(response.values)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_address", &self.api_address())
            .finish_non_exhaustive()
    }
}
