//! Entry point of the library: an authenticated session.

use crate::client::Client;
use crate::configuration::Configuration;
use crate::credentials::{ApiCredentials, Credentials, CredentialsError};
use crate::error::{LookupError, Result};
use crate::project::Project;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// An authenticated session with the Neptune API.
///
/// Every lookup goes to the server; nothing is cached between calls.
///
/// ```no_run
/// # async fn example() -> Result<(), neptune_lib::NeptuneError> {
/// use neptune_lib::Session;
///
/// let session = Session::from_env()?;
/// let projects = session.get_projects(Some("neptune-ml")).await?;
/// for full_id in projects.keys() {
///     println!("{}", full_id);
/// }
/// # Ok(())
/// # }
/// ```
pub struct Session<C = Credentials> {
    credentials: C,
    client: Arc<Client>,
}

impl Session<Credentials> {
    /// Open a session with credentials read from the environment.
    ///
    /// The environment is read on every call.
    pub fn from_env() -> Result<Session<Credentials>> {
        let credentials = Credentials::from_env()?;
        Session::with_configuration(credentials, Configuration::from_env()?)
    }
}

impl<C: ApiCredentials> Session<C> {
    /// Open a session with the given credentials.
    pub fn new(credentials: C) -> Result<Session<C>> {
        Self::with_configuration(credentials, Configuration::default())
    }

    pub fn with_configuration(credentials: C, configuration: Configuration) -> Result<Session<C>> {
        debug!(
            "Opening Neptune session against {}",
            credentials.api_address()
        );
        let client = Client::with_configuration(
            credentials.api_address(),
            credentials.api_token(),
            configuration,
        )?;

        Ok(Session {
            credentials,
            client: Arc::new(client),
        })
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    /// Client handle shared by every project this session returns
    pub fn client(&self) -> &Arc<Client> {
        &self.client
    }

    /// Projects of a namespace, keyed by `namespace/name`.
    ///
    /// Without a namespace, the one carried by the credentials is used.
    pub async fn get_projects(&self, namespace: Option<&str>) -> Result<HashMap<String, Project>> {
        let namespace = match namespace {
            Some(namespace) => namespace,
            None => self
                .credentials
                .namespace()
                .ok_or(CredentialsError::MissingNamespace)?,
        };

        let projects = self.client.get_projects(namespace).await?;
        debug!(
            "Found {} projects in namespace {}",
            projects.len(),
            namespace
        );

        Ok(projects
            .into_iter()
            .map(|p| Project::new(Arc::clone(&self.client), p.id, namespace, p.name))
            .map(|p| (p.full_id(), p))
            .collect())
    }

    /// Look up a project by its `namespace/name` identifier.
    pub async fn get_project(&self, full_id: &str) -> Result<Project> {
        let (namespace, _) = match full_id.split_once('/') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
                (namespace, name)
            }
            _ => return Err(LookupError::InvalidProjectId(full_id.to_string()).into()),
        };

        self.get_projects(Some(namespace))
            .await?
            .remove(full_id)
            .ok_or_else(|| {
                LookupError::ProjectNotFound {
                    full_id: full_id.to_string(),
                }
                .into()
            })
    }
}

impl<C: std::fmt::Debug> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("credentials", &self.credentials)
            .field("client", &self.client)
            .finish()
    }
}
