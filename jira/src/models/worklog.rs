use super::{core::deserialize_jira_timestamp, user::User};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A page of worklog entries, either inlined in an issue or from the worklog resource
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorklogPage {
    #[serde(rename = "startAt", default)]
    pub start_at: usize,
    #[serde(rename = "maxResults", default)]
    pub max_results: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub worklogs: Vec<Worklog>,
}

impl WorklogPage {
    /// Jira inlines at most one page of entries, the rest has to be fetched separately
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.total > self.max_results
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Worklog {
    #[serde(default)]
    pub id: String,
    pub author: User,
    #[serde(deserialize_with = "deserialize_jira_timestamp")]
    pub started: DateTime<FixedOffset>,
    #[serde(rename = "timeSpentSeconds")]
    pub time_spent_seconds: i64,
}
