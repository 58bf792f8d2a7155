//! Experiments and their channel data.

use crate::client::Client;
use crate::error::{LookupError, Result};
use crate::format::{optional_cell, CsvRecordProducer};
use crate::model::{
    parameters_map, properties_map, Channel, ChannelType, ExperimentDto, ParameterValue,
    SystemProperties,
};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// An experiment within a project.
///
/// Holds the summary it was listed with. The accessors returning properties,
/// parameters and channels go back to the server on every call; keep the
/// returned value if you need a stable snapshot.
#[derive(Debug, Clone)]
pub struct Experiment {
    client: Arc<Client>,
    summary: ExperimentDto,
}

impl Experiment {
    pub(crate) fn new(client: Arc<Client>, summary: ExperimentDto) -> Experiment {
        Experiment { client, summary }
    }

    pub fn id(&self) -> &str {
        &self.summary.id
    }

    pub fn name(&self) -> &str {
        &self.summary.name
    }

    pub fn state(&self) -> &str {
        &self.summary.state
    }

    pub fn owner(&self) -> &str {
        &self.summary.owner
    }

    pub fn tags(&self) -> &[String] {
        &self.summary.tags
    }

    /// Client handle this experiment fetches through
    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    /// Fetch the backend-maintained properties. Not cached.
    pub async fn system_properties(&self) -> Result<SystemProperties> {
        let experiment = self.client.get_experiment(self.id()).await?;
        Ok(SystemProperties::from(&experiment))
    }

    /// Fetch user-defined properties. Not cached.
    pub async fn properties(&self) -> Result<BTreeMap<String, String>> {
        let experiment = self.client.get_experiment(self.id()).await?;
        Ok(properties_map(&experiment.properties))
    }

    /// Fetch the experiment's parameters. Not cached.
    pub async fn parameters(&self) -> Result<BTreeMap<String, ParameterValue>> {
        let experiment = self.client.get_experiment(self.id()).await?;
        Ok(parameters_map(&experiment.parameters))
    }

    /// Fetch the experiment's channels keyed by name. Not cached.
    pub async fn channels(&self) -> Result<BTreeMap<String, Channel>> {
        let channels = self.client.get_channels(self.id()).await?;
        Ok(channels
            .into_iter()
            .map(|c| (c.name.clone(), Channel::from(c)))
            .collect())
    }

    /// Fetch the values of the named numeric channels, aligned on `x`.
    ///
    /// Every name must denote a numeric channel of this experiment. A name
    /// given more than once yields a single column, placed where it first
    /// appears. Series are fetched one after another; the first failure
    /// aborts the call.
    pub async fn get_numeric_channels_values(&self, names: &[&str]) -> Result<ChannelValues> {
        let channels = self.channels().await?;

        let mut seen = HashSet::with_capacity(names.len());
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            if !seen.insert(*name) {
                continue;
            }
            match channels.get(*name) {
                Some(channel) if channel.channel_type == ChannelType::Numeric => {
                    resolved.push(channel)
                }
                _ => {
                    return Err(LookupError::ChannelNotFound {
                        experiment: self.id().to_string(),
                        name: name.to_string(),
                    }
                    .into())
                }
            }
        }

        let mut series: Vec<(String, Vec<(f64, f64)>)> = Vec::with_capacity(resolved.len());
        for channel in resolved {
            let values = self.client.get_channel_values(&channel.id).await?;
            debug!(
                "Fetched {} values of channel {} in experiment {}",
                values.len(),
                channel.name,
                self.id()
            );
            series.push((
                channel.name.clone(),
                values.into_iter().map(|v| (v.x, v.y)).collect(),
            ));
        }

        Ok(ChannelValues::align(series))
    }
}

/// Values of several channels joined on their `x` coordinate.
///
/// Rows are sorted by `x`; a cell is `None` when its channel has no value at
/// that `x`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelValues {
    pub channels: Vec<String>,
    pub rows: Vec<ChannelValuesRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelValuesRow {
    pub x: f64,
    pub values: Vec<Option<f64>>,
}

impl ChannelValues {
    /// Outer-join series of `(x, y)` points on `x`.
    ///
    /// When a series repeats an `x`, its last point wins.
    pub fn align(series: Vec<(String, Vec<(f64, f64)>)>) -> ChannelValues {
        let width = series.len();
        let mut by_x: HashMap<u64, ChannelValuesRow> = HashMap::new();

        for (column, (_, points)) in series.iter().enumerate() {
            for &(x, y) in points {
                let row = by_x.entry(normalize(x).to_bits()).or_insert_with(|| ChannelValuesRow {
                    x: normalize(x),
                    values: vec![None; width],
                });
                row.values[column] = Some(y);
            }
        }

        let mut rows: Vec<ChannelValuesRow> = by_x.into_values().collect();
        rows.sort_by(|a, b| a.x.total_cmp(&b.x));

        ChannelValues {
            channels: series.into_iter().map(|(name, _)| name).collect(),
            rows,
        }
    }

    /// Column of values for one channel, in row order
    pub fn column(&self, channel: &str) -> Option<Vec<Option<f64>>> {
        let index = self.channels.iter().position(|c| c == channel)?;
        Some(self.rows.iter().map(|r| r.values[index]).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// -0.0 and 0.0 land on the same row
fn normalize(x: f64) -> f64 {
    if x == 0.0 {
        0.0
    } else {
        x
    }
}

impl CsvRecordProducer for ChannelValues {
    fn csv_header(&self) -> Vec<String> {
        let mut header = vec!["x".to_string()];
        header.extend(self.channels.iter().cloned());
        header
    }

    fn as_csv_records(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut record = vec![row.x.to_string()];
                record.extend(row.values.iter().map(|v| optional_cell(*v)));
                record
            })
            .collect()
    }
}
