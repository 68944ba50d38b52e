//! The operations the aggregation needs from the issue tracker.
//!
//! `Jira` implements them directly, `CredentialGate` wraps any implementation and
//! renews the credentials when the tracker refuses them.
use async_trait::async_trait;
use jira::models::{core::IssueKey, issue::Issue, user::User, worklog::WorklogPage};
use jira::{Credentials, Jira, SearchFields};

use crate::error::WorklogError;

#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn get_issue(&self, key: &IssueKey) -> Result<Issue, WorklogError>;
    async fn get_full_worklog(&self, key: &IssueKey) -> Result<WorklogPage, WorklogError>;
    async fn search(&self, jql: &str, fields: SearchFields) -> Result<Vec<Issue>, WorklogError>;
    async fn search_users(&self, text: &str) -> Result<Vec<User>, WorklogError>;

    /// The credentials currently used for every call
    fn credentials(&self) -> Credentials;
    fn install_credentials(&self, credentials: Credentials);
}

#[async_trait]
impl IssueTracker for Jira {
    async fn get_issue(&self, key: &IssueKey) -> Result<Issue, WorklogError> {
        Ok(Jira::get_issue(self, key).await?)
    }

    async fn get_full_worklog(&self, key: &IssueKey) -> Result<WorklogPage, WorklogError> {
        Ok(Jira::get_full_worklog(self, key).await?)
    }

    async fn search(&self, jql: &str, fields: SearchFields) -> Result<Vec<Issue>, WorklogError> {
        Ok(Jira::search(self, jql, fields).await?)
    }

    async fn search_users(&self, text: &str) -> Result<Vec<User>, WorklogError> {
        Ok(Jira::search_users(self, text).await?)
    }

    fn credentials(&self) -> Credentials {
        Jira::credentials(self)
    }

    fn install_credentials(&self, credentials: Credentials) {
        self.set_credentials(credentials);
    }
}
