//! Client library for the Neptune experiment tracking service.
//!
//! This crate authenticates with a Neptune API token, lists the projects of
//! a namespace and reads experiment metadata and channel data.
//!
//! # Modules
//!
//! - `credentials`: API token decoding and environment lookup
//! - `configuration`: HTTP transport settings
//! - `client`: raw calls to the Neptune REST API
//! - `session`: entry point composing credentials and client
//! - `project`: projects, members and leaderboards
//! - `experiment`: experiment properties, parameters and channel values
//! - `format`: CSV and JSON rendering of tabular results
//! - `model`: wire types of the REST API
//!
//! # Example
//!
//! ```no_run
//! use neptune_lib::{ExperimentFilter, Session};
//!
//! # async fn example() -> Result<(), neptune_lib::NeptuneError> {
//! let session = Session::from_env()?;
//! let projects = session.get_projects(Some("neptune-ml")).await?;
//!
//! if let Some(project) = projects.get("neptune-ml/sandbox") {
//!     let experiments = project.get_experiments(&ExperimentFilter::new()).await?;
//!     for experiment in &experiments {
//!         let values = experiment.get_numeric_channels_values(&["loss"]).await?;
//!         println!("{}: {} points", experiment.id(), values.rows.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod configuration;
pub mod credentials;
pub mod error;
pub mod experiment;
pub mod format;
pub mod http_utils;
pub mod model;
pub mod project;
pub mod session;

pub use client::{ApiError, Client, ExperimentFilter};
pub use configuration::Configuration;
pub use credentials::{ApiCredentials, Credentials, CredentialsError};
pub use error::{LookupError, NeptuneError, Result};
pub use experiment::{ChannelValues, Experiment};
pub use project::{Leaderboard, Project};
pub use session::Session;
