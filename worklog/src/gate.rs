//! Renews the credentials whenever Jira refuses them.
//!
//! Every call going through the [`CredentialGate`] is repeated until Jira stops answering
//! with 401 or 403. Between attempts the rejected secret is removed from the credential
//! store, the [`CredentialProvider`] is asked for a new pair, and the new pair is installed
//! in the client. There is no upper limit on the number of attempts; the operator ends the
//! loop by supplying valid credentials or aborting the prompt.
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use jira::models::{core::IssueKey, issue::Issue, user::User, worklog::WorklogPage};
use jira::{Credentials, JiraError, SearchFields};
use log::{debug, info, warn};
use secure_credentials::CredentialStore;

use crate::error::WorklogError;
use crate::prompt::Prompt;
use crate::tracker::IssueTracker;

/// Supplies a new set of credentials, either at start-up (`cause` is `None`) or after the
/// tracker refused the current ones.
pub trait CredentialProvider: Send + Sync {
    ///
    /// # Errors
    /// If no credentials could be obtained, for instance because the operator aborted
    fn request_credentials(
        &self,
        rejected: &Credentials,
        cause: Option<&JiraError>,
    ) -> Result<Credentials, WorklogError>;
}

/// Asks the operator for a user name and a password
pub struct PromptCredentialProvider<P: Prompt> {
    prompt: P,
}

impl<P: Prompt> PromptCredentialProvider<P> {
    pub fn new(prompt: P) -> Self {
        Self { prompt }
    }
}

impl<P: Prompt> CredentialProvider for PromptCredentialProvider<P> {
    fn request_credentials(
        &self,
        rejected: &Credentials,
        cause: Option<&JiraError>,
    ) -> Result<Credentials, WorklogError> {
        let question = match cause {
            Some(cause) => format!("{cause}\nUsername"),
            None => "Username".to_string(),
        };
        let user = self.prompt.ask_text(&question, rejected.username())?;
        let password = self.prompt.ask_masked(&format!("Password for {user}"))?;
        Ok(Credentials::Basic(user, password))
    }
}

#[derive(Debug, Default)]
struct RetryState {
    renewals: u32,
    /// Installed by the gate, but not yet accepted by the tracker
    unconfirmed: Option<Credentials>,
}

pub struct CredentialGate<T, P> {
    tracker: T,
    provider: P,
    store: Arc<dyn CredentialStore>,
    service: String,
    state: Mutex<RetryState>,
}

impl<T, P> CredentialGate<T, P>
where
    T: IssueTracker,
    P: CredentialProvider,
{
    /// `service` identifies the application in the credential store
    pub fn new(
        tracker: T,
        provider: P,
        store: Arc<dyn CredentialStore>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            tracker,
            provider,
            store,
            service: service.into(),
            state: Mutex::new(RetryState::default()),
        }
    }

    pub fn inner(&self) -> &T {
        &self.tracker
    }

    /// Number of times the credentials have been renewed so far
    pub fn renewals(&self) -> u32 {
        self.state().renewals
    }

    fn state(&self) -> std::sync::MutexGuard<'_, RetryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Installs the secret stored for `username`, asking the provider when there is none
    ///
    /// # Errors
    /// If the store could not be read or the provider failed
    pub fn load_or_request(&self, username: &str) -> Result<(), WorklogError> {
        if let Some(secret) = self.store.load(&self.service, username)? {
            debug!("Found stored credentials for {username}");
            self.tracker
                .install_credentials(Credentials::Basic(username.to_string(), secret));
            return Ok(());
        }
        let unknown = Credentials::Basic(username.to_string(), String::new());
        let fresh = self.provider.request_credentials(&unknown, None)?;
        self.tracker.install_credentials(fresh.clone());
        self.state().unconfirmed = Some(fresh);
        Ok(())
    }

    /// Runs `request` until it gets past authorization. Credentials are only kept once Jira
    /// has answered with something other than a refusal.
    async fn call<R, F, Fut>(&self, request: F) -> Result<R, WorklogError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<R, WorklogError>>,
    {
        loop {
            match request().await {
                Err(WorklogError::Jira(cause)) if cause.is_authorization_failure() => {
                    self.renew(&cause)?;
                }
                Err(WorklogError::Jira(cause)) if !cause.is_response() => {
                    debug!("No answer from Jira, credentials remain unconfirmed: {cause}");
                    return Err(WorklogError::Jira(cause));
                }
                outcome => {
                    self.confirm();
                    return outcome;
                }
            }
        }
    }

    fn renew(&self, cause: &JiraError) -> Result<(), WorklogError> {
        let rejected = self.tracker.credentials();
        warn!("Jira refused the credentials {rejected:?}: {cause}");

        if let Some(user) = rejected.username() {
            if let Err(e) = self.store.delete(&self.service, user) {
                warn!("Unable to remove the rejected credentials of {user}: {e}");
            }
        }

        let fresh = self.provider.request_credentials(&rejected, Some(cause))?;
        self.tracker.install_credentials(fresh.clone());

        let mut state = self.state();
        state.renewals += 1;
        state.unconfirmed = Some(fresh);
        debug!("Credentials renewed {} time(s)", state.renewals);
        Ok(())
    }

    /// The tracker accepted the installed credentials, keep them for the next run
    fn confirm(&self) {
        let Some(accepted) = self.state().unconfirmed.take() else {
            return;
        };
        if let Credentials::Basic(user, secret) = &accepted {
            match self.store.save(&self.service, user, secret) {
                Ok(()) => info!("Credentials for {user} stored"),
                Err(e) => warn!("Unable to store the credentials of {user}: {e}"),
            }
        }
    }
}

#[async_trait]
impl<T, P> IssueTracker for CredentialGate<T, P>
where
    T: IssueTracker,
    P: CredentialProvider,
{
    async fn get_issue(&self, key: &IssueKey) -> Result<Issue, WorklogError> {
        self.call(|| self.tracker.get_issue(key)).await
    }

    async fn get_full_worklog(&self, key: &IssueKey) -> Result<WorklogPage, WorklogError> {
        self.call(|| self.tracker.get_full_worklog(key)).await
    }

    async fn search(&self, jql: &str, fields: SearchFields) -> Result<Vec<Issue>, WorklogError> {
        self.call(|| self.tracker.search(jql, fields)).await
    }

    async fn search_users(&self, text: &str) -> Result<Vec<User>, WorklogError> {
        self.call(|| self.tracker.search_users(text)).await
    }

    fn credentials(&self) -> Credentials {
        self.tracker.credentials()
    }

    fn install_credentials(&self, credentials: Credentials) {
        self.tracker.install_credentials(credentials);
    }
}
