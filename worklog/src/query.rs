//! Composes the JQL predicate selecting the issues holding worklog entries of the requested
//! users. Nothing here talks to Jira, it only produces text.
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use jira::models::user::User;
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::WorklogError;
use crate::period::TimePeriod;

/// The predefined item type filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    SupportRequests,
    ExternalBugs,
}

impl ItemType {
    #[must_use]
    pub fn predicate(self) -> &'static str {
        match self {
            ItemType::SupportRequests => "Type = SupportRequest",
            ItemType::ExternalBugs => "Type = Bug and 'How Found' = External",
        }
    }
}

impl FromStr for ItemType {
    type Err = WorklogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "supportrequests" => Ok(ItemType::SupportRequests),
            "externalbugs" => Ok(ItemType::ExternalBugs),
            _ => Err(WorklogError::UnsupportedFilter(s.to_string())),
        }
    }
}

/// The JQL text for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogQuery {
    base: String,
}

impl WorklogQuery {
    /// The plain predicate
    #[must_use]
    pub fn text(&self) -> &str {
        &self.base
    }

    /// The predicate widened to the subtasks of every matching issue, using the
    /// `subtasksOf` function of ScriptRunner. Jira rejects it with a 400 if the
    /// function is not installed.
    #[must_use]
    pub fn with_subtasks(&self) -> String {
        format!(
            "({}) OR issueFunction in subtasksOf({})",
            self.base,
            quote_nested(&self.base)
        )
    }
}

impl Display for WorklogQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base)
    }
}

#[derive(Debug, Default)]
pub struct QueryBuilder<'a> {
    authors: Vec<&'a User>,
    period: Option<&'a TimePeriod>,
    item_type: Option<ItemType>,
    filter: Option<&'a str>,
}

impl<'a> QueryBuilder<'a> {
    #[must_use]
    pub fn new(authors: impl IntoIterator<Item = &'a User>) -> Self {
        QueryBuilder {
            authors: authors.into_iter().collect(),
            ..QueryBuilder::default()
        }
    }

    #[must_use]
    pub fn period(mut self, period: Option<&'a TimePeriod>) -> Self {
        self.period = period;
        self
    }

    #[must_use]
    pub fn item_type(mut self, item_type: Option<ItemType>) -> Self {
        self.item_type = item_type;
        self
    }

    /// Raw JQL supplied by the user, blank input is ignored
    #[must_use]
    pub fn filter(mut self, filter: Option<&'a str>) -> Self {
        self.filter = filter.filter(|f| !f.trim().is_empty());
        self
    }

    #[must_use]
    pub fn build(self) -> WorklogQuery {
        let authors: Vec<String> = self
            .authors
            .iter()
            .map(|u| jql_value(u.login_name()))
            .collect();
        let mut base = format!("worklogAuthor in ({})", authors.join(", "));

        if let Some(period) = self.period {
            base.push_str(&format!(
                " AND worklogDate >= {} AND worklogDate <= {}",
                period.first_day().format("%Y-%m-%d"),
                period.last_day().format("%Y-%m-%d")
            ));
        }
        if let Some(item_type) = self.item_type {
            base.push_str(&format!(" AND ({})", item_type.predicate()));
        }
        if let Some(filter) = self.filter {
            base.push_str(&format!(" AND ({})", filter.trim()));
        }
        WorklogQuery { base }
    }
}

/// Plain names go in as-is, anything else is quoted
fn jql_value(value: &str) -> String {
    lazy_static! {
        static ref BARE_VALUE: Regex = Regex::new(r"^[A-Za-z0-9_.\-]+$").unwrap();
    }
    if BARE_VALUE.is_match(value) {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// Quotes a JQL text so it can be passed as a string argument. Prefers `'`, uses `"` if the
/// text contains `'`, and escapes when both occur.
fn quote_nested(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{text}'")
    } else if !text.contains('"') {
        format!("\"{text}\"")
    } else {
        format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
    }
}
