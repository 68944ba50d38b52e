//! An in-memory Jira holding a fixed set of users and issues
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use jira::models::core::IssueKey;
use jira::models::issue::Issue;
use jira::models::user::User;
use jira::models::worklog::{Worklog, WorklogPage};
use jira::{Credentials, JiraError, SearchFields};
use worklog::error::WorklogError;
use worklog::prompt::Prompt;
use worklog::tracker::IssueTracker;

pub struct FakeTracker {
    users: Vec<User>,
    issues: Vec<Issue>,
    credentials: Mutex<Credentials>,
    queries: Mutex<Vec<String>>,
}

impl FakeTracker {
    pub fn new(users: Vec<User>, issues: Vec<Issue>) -> Self {
        FakeTracker {
            users,
            issues,
            credentials: Mutex::new(Credentials::Anonymous),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueTracker for FakeTracker {
    async fn get_issue(&self, key: &IssueKey) -> Result<Issue, WorklogError> {
        self.issues
            .iter()
            .find(|i| &i.key == key)
            .cloned()
            .ok_or_else(|| WorklogError::Jira(JiraError::NotFound(key.to_string())))
    }

    async fn get_full_worklog(&self, key: &IssueKey) -> Result<WorklogPage, WorklogError> {
        let issue = self.get_issue(key).await?;
        Ok(issue.fields.worklog.unwrap_or_default())
    }

    async fn search(&self, jql: &str, _fields: SearchFields) -> Result<Vec<Issue>, WorklogError> {
        self.queries.lock().unwrap().push(jql.to_string());
        Ok(self.issues.clone())
    }

    async fn search_users(&self, text: &str) -> Result<Vec<User>, WorklogError> {
        Ok(self
            .users
            .iter()
            .filter(|u| u.name.contains(text) || u.email_address.contains(text))
            .cloned()
            .collect())
    }

    fn credentials(&self) -> Credentials {
        self.credentials.lock().unwrap().clone()
    }

    fn install_credentials(&self, credentials: Credentials) {
        *self.credentials.lock().unwrap() = credentials;
    }
}

/// Fails the test if anything is asked
pub struct SilentPrompt;

impl Prompt for SilentPrompt {
    fn ask_text(&self, question: &str, _default: Option<&str>) -> Result<String, WorklogError> {
        panic!("unexpected question: {question}")
    }

    fn ask_masked(&self, question: &str) -> Result<String, WorklogError> {
        panic!("unexpected question: {question}")
    }

    fn ask_number(&self, question: &str, _min: usize, _max: usize) -> Result<usize, WorklogError> {
        panic!("unexpected question: {question}")
    }
}

pub fn user(login: &str) -> User {
    User {
        key: login.to_string(),
        name: login.to_string(),
        email_address: format!("{login}@norn.no"),
        display_name: login.to_uppercase(),
    }
}

/// `started` is local time, formatted as `2020-06-10T09:00:00`
pub fn worklog(author: &str, started: &str, seconds: i64) -> Worklog {
    Worklog {
        id: String::new(),
        author: user(author),
        started: local(started),
        time_spent_seconds: seconds,
    }
}

pub fn issue(key: &str, worklogs: Vec<Worklog>) -> Issue {
    let mut issue = Issue {
        key: IssueKey::from(key),
        ..Issue::default()
    };
    issue.fields.worklog = Some(WorklogPage {
        start_at: 0,
        max_results: worklogs.len(),
        total: worklogs.len(),
        worklogs,
    });
    issue
}

fn local(s: &str) -> DateTime<FixedOffset> {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap();
    Local
        .from_local_datetime(&naive)
        .earliest()
        .unwrap()
        .fixed_offset()
}
