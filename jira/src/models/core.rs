use std::fmt::{self, Formatter};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// Represents a Jira issue key like for instance `TIME-148`
/// This struct is typically known as a "value object" in other programming languages.
#[derive(Debug, Serialize, Default, Eq, PartialEq, Hash, Clone, PartialOrd, Ord)]
#[serde(transparent)]
pub struct IssueKey {
    value: String,
}

impl IssueKey {
    #[must_use]
    pub fn new(input: &str) -> Self {
        IssueKey {
            value: input.trim().to_uppercase(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl From<String> for IssueKey {
    fn from(s: String) -> Self {
        IssueKey::new(&s)
    }
}

impl From<&str> for IssueKey {
    fn from(value: &str) -> Self {
        IssueKey::new(value)
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<'de> Deserialize<'de> for IssueKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(IssueKey::from)
    }
}

/// Jira writes timestamps like `2020-07-01T10:00:00.000+0200`, i.e. without the colon
/// in the offset that RFC 3339 requires.
pub(crate) fn deserialize_jira_timestamp<'de, D>(
    deserializer: D,
) -> Result<DateTime<FixedOffset>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    DateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(&s))
        .map_err(serde::de::Error::custom)
}
