//! Projects and their leaderboards.

use crate::client::{Client, ExperimentFilter};
use crate::error::{LookupError, Result};
use crate::experiment::Experiment;
use crate::format::{optional_cell, CsvRecordProducer};
use crate::model::{
    parameters_map, properties_map, ExperimentDto, ParameterValue, SystemProperties,
};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A project in a namespace.
///
/// Two projects are equal when they share id, namespace and name and were
/// built on the same client handle.
#[derive(Clone)]
pub struct Project {
    client: Arc<Client>,
    id: String,
    namespace: String,
    name: String,
}

impl Project {
    pub fn new(
        client: Arc<Client>,
        id: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Project {
        Project {
            client,
            id: id.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `namespace/name`
    pub fn full_id(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    /// Usernames of the project's members
    pub async fn get_members(&self) -> Result<Vec<String>> {
        let members = self.client.get_project_members(&self.id).await?;
        Ok(members
            .into_iter()
            .filter_map(|m| m.registered_member_info.map(|info| info.username))
            .collect())
    }

    pub async fn get_experiments(&self, filter: &ExperimentFilter) -> Result<Vec<Experiment>> {
        let experiments = self.client.get_experiments(&self.id, filter).await?;
        debug!(
            "Found {} experiments in project {}",
            experiments.len(),
            self.full_id()
        );
        Ok(experiments
            .into_iter()
            .map(|dto| Experiment::new(Arc::clone(&self.client), dto))
            .collect())
    }

    /// Look up a single experiment of this project by id
    pub async fn get_experiment(&self, id: &str) -> Result<Experiment> {
        let filter = ExperimentFilter::new().id(id);
        self.get_experiments(&filter)
            .await?
            .into_iter()
            .find(|e| e.id() == id)
            .ok_or_else(|| {
                LookupError::ExperimentNotFound {
                    project: self.full_id(),
                    id: id.to_string(),
                }
                .into()
            })
    }

    pub async fn get_leaderboard(&self, filter: &ExperimentFilter) -> Result<Leaderboard> {
        let entries = self.client.get_leaderboard(&self.id, filter).await?;
        Ok(Leaderboard::from_entries(entries))
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.client, &other.client)
            && self.id == other.id
            && self.namespace == other.namespace
            && self.name == other.name
    }
}

impl Eq for Project {}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("id", &self.id)
            .field("full_id", &self.full_id())
            .finish()
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Project({})", self.full_id())
    }
}

/// One leaderboard row: an experiment with its latest channel values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardRow {
    #[serde(flatten)]
    pub system: SystemProperties,
    pub channels: BTreeMap<String, Value>,
    pub parameters: BTreeMap<String, ParameterValue>,
    pub properties: BTreeMap<String, String>,
}

/// Tabular summary of a project's experiments.
///
/// Columns are the system properties followed by one column per channel,
/// parameter and property seen in any row, prefixed `channel_`,
/// `parameter_` and `property_`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaderboard {
    pub rows: Vec<LeaderboardRow>,
}

const SYSTEM_COLUMNS: [&str; 10] = [
    "id",
    "name",
    "state",
    "owner",
    "created",
    "finished",
    "running_time",
    "size",
    "hostname",
    "tags",
];

impl Leaderboard {
    pub fn from_entries(entries: Vec<ExperimentDto>) -> Leaderboard {
        let rows = entries
            .iter()
            .map(|entry| LeaderboardRow {
                system: SystemProperties::from(entry),
                channels: entry
                    .channels_last_values
                    .iter()
                    .map(|c| (c.channel_name.clone(), c.y.clone().unwrap_or(Value::Null)))
                    .collect(),
                parameters: parameters_map(&entry.parameters),
                properties: properties_map(&entry.properties),
            })
            .collect();

        Leaderboard { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn channel_names(&self) -> BTreeSet<&String> {
        self.rows.iter().flat_map(|r| r.channels.keys()).collect()
    }

    fn parameter_names(&self) -> BTreeSet<&String> {
        self.rows.iter().flat_map(|r| r.parameters.keys()).collect()
    }

    fn property_names(&self) -> BTreeSet<&String> {
        self.rows.iter().flat_map(|r| r.properties.keys()).collect()
    }
}

fn value_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl CsvRecordProducer for Leaderboard {
    fn csv_header(&self) -> Vec<String> {
        let mut header: Vec<String> = SYSTEM_COLUMNS.iter().map(|c| c.to_string()).collect();
        header.extend(self.channel_names().iter().map(|n| format!("channel_{}", n)));
        header.extend(self.parameter_names().iter().map(|n| format!("parameter_{}", n)));
        header.extend(self.property_names().iter().map(|n| format!("property_{}", n)));
        header
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        let channel_names = self.channel_names();
        let parameter_names = self.parameter_names();
        let property_names = self.property_names();

        self.rows
            .iter()
            .map(|row| {
                let system = &row.system;
                let mut record = vec![
                    system.id.clone(),
                    system.name.clone(),
                    system.state.clone(),
                    system.owner.clone(),
                    optional_cell(system.created.as_ref()),
                    optional_cell(system.finished.as_ref()),
                    optional_cell(system.running_time),
                    optional_cell(system.size),
                    optional_cell(system.hostname.as_ref()),
                    system.tags.join(" "),
                ];
                record.extend(
                    channel_names
                        .iter()
                        .map(|n| value_cell(row.channels.get(*n))),
                );
                record.extend(
                    parameter_names
                        .iter()
                        .map(|n| optional_cell(row.parameters.get(*n))),
                );
                record.extend(
                    property_names
                        .iter()
                        .map(|n| optional_cell(row.properties.get(*n))),
                );
                record
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{Formattable, OutputFormat, OutputFormatOptions};

    fn new_client() -> Arc<Client> {
        Arc::new(Client::new("https://app.neptune.ml", "token").unwrap())
    }

    #[test]
    fn test_full_id() {
        let project = Project::new(new_client(), "p-1", "neptune-ml", "sandbox");
        assert_eq!(project.full_id(), "neptune-ml/sandbox");
        assert_eq!(project.to_string(), "Project(neptune-ml/sandbox)");
    }

    #[test]
    fn test_project_equality() {
        let client = new_client();
        let a = Project::new(Arc::clone(&client), "p-1", "ns", "name");
        let b = Project::new(Arc::clone(&client), "p-1", "ns", "name");
        assert_eq!(a, b);

        let other_id = Project::new(Arc::clone(&client), "p-2", "ns", "name");
        assert_ne!(a, other_id);

        // same fields, different client handle
        let elsewhere = Project::new(new_client(), "p-1", "ns", "name");
        assert_ne!(a, elsewhere);
    }

    fn entry(json: serde_json::Value) -> ExperimentDto {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_leaderboard_csv() {
        let leaderboard = Leaderboard::from_entries(vec![
            entry(serde_json::json!({
                "id": "SAN-1", "name": "baseline", "state": "succeeded", "owner": "jane",
                "runningTime": 120, "tags": ["a", "b"],
                "parameters": [{"name": "lr", "value": "0.1", "parameterType": "double"}],
                "channelsLastValues": [{"channelName": "loss", "x": 9.0, "y": 0.5}]
            })),
            entry(serde_json::json!({
                "id": "SAN-2", "name": "tuned", "state": "running", "owner": "joe",
                "properties": [{"key": "gpu", "value": "v100"}]
            })),
        ]);
        assert_eq!(leaderboard.len(), 2);

        let csv = leaderboard
            .format(&OutputFormat::Csv(OutputFormatOptions {
                with_headers: true,
                pretty: false,
            }))
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "id,name,state,owner,created,finished,running_time,size,hostname,tags,\
             channel_loss,parameter_lr,property_gpu"
        );
        assert_eq!(lines[1], "SAN-1,baseline,succeeded,jane,,,120,,,a b,0.5,0.1,");
        assert_eq!(lines[2], "SAN-2,tuned,running,joe,,,,,,,,,v100");
    }
}
