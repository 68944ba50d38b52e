use std::{io, path::PathBuf};

use jira::JiraError;
use secure_credentials::CredentialError;
use thiserror::Error;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum WorklogError {
    #[error("Invalid date period '{0}'. Use e.g. '2020 Q3', '2020-06', 'June 2020' or '2020-06-17'")]
    InvalidPeriod(String),
    #[error("Unsupported predefined filter '{0}'. Use SupportRequests or ExternalBugs")]
    UnsupportedFilter(String),
    #[error("Unsupported sort order '{0}'. Use username or duration")]
    UnsupportedOrder(String),
    #[error("No Jira user matches '{0}'")]
    UnknownUser(String),
    #[error(transparent)]
    Jira(#[from] JiraError),
    #[error("Unable to create the Jira client: {0}")]
    JiraClient(String),
    #[error("Interactive input failed: {0}")]
    Prompt(String),
    #[error("Credential store failure: {0}")]
    Credentials(#[from] CredentialError),
    #[error("Unable to load the application configuration file {path:?}")]
    ApplicationConfig { path: PathBuf, source: io::Error },
    #[error("Unable to parse contents of {}", path.display())]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Unable to create configuration file {}", path.display())]
    ConfigFileCreation { path: PathBuf },
    #[error("Unable to determine the configuration directory of this platform")]
    ConfigDirUnavailable,
    #[error("Missing setting '{0}'. Supply it on the command line or with 'worklog-report config update'")]
    MissingSetting(&'static str),
    #[error("Unable to write the report: {0}")]
    Output(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<jira::builder::JiraBuilderError> for WorklogError {
    fn from(err: jira::builder::JiraBuilderError) -> Self {
        WorklogError::JiraClient(format!("{err}"))
    }
}
