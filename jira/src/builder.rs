//!
//! ```rust,ignore
//! let jira = Jira::builder()
//!     .host("https://jira.example.com")
//!     .basic_auth("jdoe", "secret")
//!     .timeout(30)
//!     .build()?;
//! ```
use crate::{Credentials, Jira, API_PATH};
use log::debug;
use reqwest::Client;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Error type for `JiraBuilder` operations
#[derive(Error, Debug)]
pub enum JiraBuilderError {
    #[error("No Jira host URL has been supplied")]
    MissingHost,

    #[error("URL parsing error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Jira client initialization error: {0}")]
    ClientInitError(String),
}

/// Builder for creating Jira client instances
#[derive(Default)]
pub struct JiraBuilder {
    host: Option<String>,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,
}

impl JiraBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Jira host URL, including the context path if Jira is not served from the root
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    #[must_use]
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::Basic(username.into(), password.into()));
        self
    }

    /// Sets a request timeout in seconds
    #[must_use]
    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(Duration::from_secs(seconds));
        self
    }

    /// Builds a Jira client instance with the configured parameters.
    /// Without credentials the client starts out anonymous.
    ///
    /// # Errors
    /// If the host is missing or malformed, or the HTTP client could not be created
    pub fn build(self) -> Result<Jira, JiraBuilderError> {
        let host = self.host.ok_or(JiraBuilderError::MissingHost)?;
        let host = Url::parse(host.trim())?;

        let mut client_builder = Client::builder();
        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }
        let client = client_builder
            .build()
            .map_err(|e| JiraBuilderError::ClientInitError(e.to_string()))?;

        let jira = Jira {
            host,
            api: API_PATH.to_string(),
            credentials: Arc::new(Mutex::new(
                self.credentials.unwrap_or(Credentials::Anonymous),
            )),
            client,
        };
        debug!("Created Jira client: {:#?}", jira);

        Ok(jira)
    }
}
