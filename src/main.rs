use neptune_lib::{
    format::{Formattable, FormattingError, OutputFormat, OutputFormatOptions},
    ExperimentFilter, NeptuneError, Session,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Neptune(#[from] NeptuneError),
    #[error(transparent)]
    Formatting(#[from] FormattingError),
}

impl DemoError {
    fn exit_code(&self) -> exitcode::ExitCode {
        match self {
            DemoError::Neptune(e) if e.is_missing_credentials() => exitcode::CONFIG,
            DemoError::Neptune(NeptuneError::Configuration(_)) => exitcode::CONFIG,
            DemoError::Neptune(e) if e.is_api_error() => exitcode::UNAVAILABLE,
            DemoError::Neptune(e) if e.is_not_found() => exitcode::NOINPUT,
            _ => exitcode::SOFTWARE,
        }
    }
}

/// Print the leaderboard of every project in a namespace as CSV.
///
/// The namespace is the first argument; without it the namespace of the API
/// token is used.
#[tokio::main]
async fn main() {
    // Initialize the logging subsystem
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let namespace = std::env::args().nth(1);

    if let Err(e) = run(namespace.as_deref()).await {
        eprintln!("ERROR: {}", e);
        ::std::process::exit(e.exit_code());
    }
}

async fn run(namespace: Option<&str>) -> Result<(), DemoError> {
    let session = Session::from_env()?;

    let projects = session.get_projects(namespace).await?;
    let mut full_ids: Vec<&String> = projects.keys().collect();
    full_ids.sort();

    let format = OutputFormat::Csv(OutputFormatOptions {
        with_headers: true,
        pretty: false,
    });

    for full_id in full_ids {
        let project = &projects[full_id];
        let members = project.get_members().await?;
        let leaderboard = project.get_leaderboard(&ExperimentFilter::new()).await?;

        println!("# {} (members: {})", full_id, members.join(", "));
        print!("{}", leaderboard.format(&format)?);
        println!();
    }

    Ok(())
}
