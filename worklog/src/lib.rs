use crate::error::WorklogError;
use config::AppConfiguration;
use gate::{CredentialGate, PromptCredentialProvider};
use jira::models::core::IssueKey;
use jira::{Credentials, Jira};
use log::debug;
use operation::report::Report;
use prompt::TerminalPrompt;
use report::WorklogReport;
use secure_credentials::{CredentialStore, KeychainStore};
use std::sync::Arc;

pub mod aggregate;
pub mod config;
pub mod error;
pub mod fetch;
pub mod gate;
pub mod operation;
pub mod period;
pub mod prompt;
pub mod query;
pub mod report;
pub mod tracker;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

/// Identifies the secrets of this application in the credential store
pub const KEYCHAIN_SERVICE_NAME: &str = "com.norn.worklog-report";

const HTTP_TIMEOUT_SECONDS: u64 = 120;

type GatedJira = CredentialGate<Jira, PromptCredentialProvider<TerminalPrompt>>;

/// Everything a run needs: the configuration, and a Jira client which asks the operator
/// for new credentials whenever Jira refuses the current ones.
pub struct ApplicationRuntime {
    config: AppConfiguration,
    tracker: GatedJira,
    prompt: TerminalPrompt,
}

impl ApplicationRuntime {
    /// Creates a new instance of `ApplicationRuntime`.
    ///
    /// `url` and `user` take precedence over the configuration file. The secret of the user
    /// is taken from the credential store, and asked for if there is none.
    ///
    /// # Errors
    ///
    /// - Returns an error if the configuration fails to load.
    /// - Returns an error if neither the arguments nor the configuration hold a url and a user.
    /// - Returns an error if the creation of the Jira client fails.
    /// - Returns an error if the credential store fails or the operator aborts the prompt.
    pub fn new(url: Option<&str>, user: Option<&str>) -> Result<Self, WorklogError> {
        let mut config = config::load()?;
        if let Some(url) = url {
            config.jira.url = url.to_string();
        }
        if let Some(user) = user {
            config.jira.user = user.to_string();
        }
        if config.jira.url.trim().is_empty() {
            return Err(WorklogError::MissingSetting("url"));
        }
        if config.jira.user.trim().is_empty() {
            return Err(WorklogError::MissingSetting("user"));
        }

        let client = Jira::builder()
            .host(&config.jira.url)
            .credentials(Credentials::Anonymous)
            .timeout(HTTP_TIMEOUT_SECONDS)
            .build()?;
        let prompt = TerminalPrompt;
        let tracker = CredentialGate::new(
            client,
            PromptCredentialProvider::new(prompt),
            Arc::new(KeychainStore),
            KEYCHAIN_SERVICE_NAME,
        );
        tracker.load_or_request(&config.jira.user)?;
        debug!("Connecting to {} as {}", config.jira.url, config.jira.user);

        Ok(ApplicationRuntime {
            config,
            tracker,
            prompt,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AppConfiguration {
        &self.config
    }

    /// Link to the page of the issue in Jira
    #[must_use]
    pub fn issue_url(&self, key: &IssueKey) -> String {
        self.tracker.inner().view_url_for(key)
    }

    /// Executes the report
    ///
    /// # Errors
    /// See [`operation::report::execute`]
    pub async fn report(&self, request: &Report) -> Result<WorklogReport, WorklogError> {
        operation::report::execute(&self.tracker, &self.prompt, request).await
    }
}

/// Keeps the secret of `user` in the credential store of the operating system
///
/// # Errors
/// If the credential store refuses it
pub fn store_secret(user: &str, secret: &str) -> Result<(), WorklogError> {
    Ok(KeychainStore.save(KEYCHAIN_SERVICE_NAME, user, secret)?)
}

/// Removes the secret of `user` from the credential store, if there is one
///
/// # Errors
/// If the credential store fails
pub fn forget_secret(user: &str) -> Result<(), WorklogError> {
    Ok(KeychainStore.delete(KEYCHAIN_SERVICE_NAME, user)?)
}
