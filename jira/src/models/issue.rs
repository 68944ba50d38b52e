use super::{core::IssueKey, worklog::WorklogPage};
use serde::{Deserialize, Serialize};

/// Represents a page of Jira issues returned by a JQL search
#[derive(Debug, Deserialize, Serialize)]
pub struct SearchPage {
    #[serde(rename = "startAt", default)]
    pub start_at: usize,
    #[serde(rename = "maxResults", default)]
    pub max_results: usize,
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// Represents a jira issue. Subtasks returned inline are issues too, although
/// Jira only hands out stubs for them, without any worklog.
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct Issue {
    /// Numeric id of the jira issue
    #[serde(default)]
    pub id: String,
    /// The key of the jira issue, typically used and referenced by the user.
    pub key: IssueKey,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct IssueFields {
    #[serde(default)]
    pub worklog: Option<WorklogPage>,
    #[serde(default)]
    pub subtasks: Vec<Issue>,
}

impl Issue {
    #[must_use]
    pub fn has_worklog(&self) -> bool {
        self.fields.worklog.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtasks_are_stubs() {
        let issue: Issue = serde_json::from_str(
            r#"{"id": "100", "key": "TIME-1", "fields": {
                "worklog": {"startAt": 0, "maxResults": 20, "total": 0, "worklogs": []},
                "subtasks": [{"id": "101", "key": "TIME-2", "self": "x",
                              "fields": {"summary": "child", "status": {"name": "Open"}}}]}}"#,
        )
        .unwrap();
        assert!(issue.has_worklog());
        assert_eq!(issue.fields.subtasks.len(), 1);
        assert!(!issue.fields.subtasks[0].has_worklog());
    }
}
