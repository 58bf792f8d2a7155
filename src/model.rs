//! Wire types of the Neptune backend API and the small value types built
//! from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use strum::{Display, EnumString};

/// Envelope of list endpoints: `{"entries": [...]}`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EntriesResponse<T> {
    #[serde(default = "Vec::new")]
    pub entries: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDto {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredMemberInfo {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberDto {
    #[serde(default)]
    pub registered_member_info: Option<RegisteredMemberInfo>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValueDto {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDto {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub parameter_type: Option<String>,
}

/// Kind of data a channel carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChannelType {
    Numeric,
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelDto {
    pub id: String,
    pub name: String,
    pub channel_type: ChannelType,
    #[serde(default)]
    pub last_x: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelLastValueDto {
    pub channel_name: String,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChannelValueDto {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChannelValuesResponse {
    #[serde(default)]
    pub values: Vec<ChannelValueDto>,
}

/// An experiment as returned by the experiment and leaderboard endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentDto {
    pub id: String,
    pub name: String,
    pub state: String,
    pub owner: String,
    #[serde(default)]
    pub time_of_creation: Option<String>,
    #[serde(default)]
    pub time_of_completion: Option<String>,
    #[serde(default)]
    pub running_time: Option<u64>,
    #[serde(default)]
    pub storage_size: Option<u64>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub properties: Vec<KeyValueDto>,
    #[serde(default)]
    pub parameters: Vec<ParameterDto>,
    #[serde(default)]
    pub channels_last_values: Vec<ChannelLastValueDto>,
}

/// Value of an experiment parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Double(f64),
    String(String),
}

impl From<&ParameterDto> for ParameterValue {
    fn from(parameter: &ParameterDto) -> Self {
        let numeric = matches!(parameter.parameter_type.as_deref(), Some("double"));
        match parameter.value.parse::<f64>() {
            Ok(value) if numeric => ParameterValue::Double(value),
            _ => ParameterValue::String(parameter.value.clone()),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Double(value) => write!(f, "{}", value),
            ParameterValue::String(value) => write!(f, "{}", value),
        }
    }
}

/// Properties the backend records for every experiment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemProperties {
    pub id: String,
    pub name: String,
    pub state: String,
    pub owner: String,
    pub created: Option<String>,
    pub finished: Option<String>,
    pub running_time: Option<u64>,
    pub size: Option<u64>,
    pub hostname: Option<String>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

impl From<&ExperimentDto> for SystemProperties {
    fn from(dto: &ExperimentDto) -> Self {
        SystemProperties {
            id: dto.id.clone(),
            name: dto.name.clone(),
            state: dto.state.clone(),
            owner: dto.owner.clone(),
            created: dto.time_of_creation.clone(),
            finished: dto.time_of_completion.clone(),
            running_time: dto.running_time,
            size: dto.storage_size,
            hostname: dto.hostname.clone(),
            tags: dto.tags.clone(),
            notes: dto.description.clone(),
        }
    }
}

/// A named series logged during an experiment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub channel_type: ChannelType,
    pub last_x: Option<f64>,
}

impl From<ChannelDto> for Channel {
    fn from(dto: ChannelDto) -> Self {
        Channel {
            id: dto.id,
            name: dto.name,
            channel_type: dto.channel_type,
            last_x: dto.last_x,
        }
    }
}

pub(crate) fn properties_map(properties: &[KeyValueDto]) -> BTreeMap<String, String> {
    properties
        .iter()
        .map(|p| (p.key.clone(), p.value.clone()))
        .collect()
}

pub(crate) fn parameters_map(parameters: &[ParameterDto]) -> BTreeMap<String, ParameterValue> {
    parameters
        .iter()
        .map(|p| (p.name.clone(), ParameterValue::from(p)))
        .collect()
}
