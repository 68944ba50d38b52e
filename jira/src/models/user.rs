use serde::{Deserialize, Serialize};

/// A user as returned by the user directory, and as the author of a worklog entry.
/// Jira Server identifies users by `key`, Jira Cloud by `accountId`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct User {
    #[serde(alias = "accountId")]
    pub key: String,
    /// The login name, absent on Jira Cloud
    #[serde(default)]
    pub name: String,
    #[serde(rename = "emailAddress", default)]
    pub email_address: String,
    #[serde(rename = "displayName", default)]
    pub display_name: String,
}

impl User {
    /// The name to use in JQL, falls back to the key when no login name is known
    #[must_use]
    pub fn login_name(&self) -> &str {
        if self.name.is_empty() {
            &self.key
        } else {
            &self.name
        }
    }
}
