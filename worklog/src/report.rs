//! Orders the aggregated buckets for presentation.
use std::str::FromStr;

use icu_collator::{Collator, CollatorOptions, Strength};
use jira::models::core::IssueKey;
use log::warn;

use crate::aggregate::Bucket;
use crate::error::WorklogError;
use crate::users::Assignee;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    /// Ascending login name in English alphabetical order, ignoring case
    #[default]
    Username,
    /// Most time spent first
    Duration,
}

impl FromStr for OrderBy {
    type Err = WorklogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "username" => Ok(OrderBy::Username),
            "duration" => Ok(OrderBy::Duration),
            _ => Err(WorklogError::UnsupportedOrder(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueTime {
    pub key: IssueKey,
    pub seconds: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserReport {
    pub assignee: Assignee,
    pub total_seconds: i64,
    /// Most time spent first
    pub issues: Vec<IssueTime>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorklogReport {
    pub users: Vec<UserReport>,
    pub total_seconds: i64,
}

impl WorklogReport {
    /// Orders `buckets` by `order_by`. Ties keep the order of `buckets`.
    #[must_use]
    pub fn new(buckets: Vec<Bucket>, order_by: OrderBy) -> Self {
        let mut users: Vec<UserReport> = buckets.into_iter().map(UserReport::from).collect();
        match order_by {
            OrderBy::Username => sort_by_login_name(&mut users),
            OrderBy::Duration => users.sort_by(|a, b| b.total_seconds.cmp(&a.total_seconds)),
        }
        let total_seconds = users.iter().map(|u| u.total_seconds).sum();
        WorklogReport {
            users,
            total_seconds,
        }
    }
}

/// Stable sort comparing base letters and accents, but not case. English collates like
/// the root locale.
fn sort_by_login_name(users: &mut [UserReport]) {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Secondary);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => users.sort_by(|a, b| {
            collator.compare(a.assignee.user.login_name(), b.assignee.user.login_name())
        }),
        Err(e) => {
            warn!("No collation data, ordering login names by code point: {e}");
            users.sort_by_cached_key(|u| u.assignee.user.login_name().to_lowercase());
        }
    }
}

impl From<Bucket> for UserReport {
    fn from(bucket: Bucket) -> Self {
        let mut issues: Vec<IssueTime> = bucket
            .per_issue_seconds
            .into_iter()
            .map(|(key, seconds)| IssueTime { key, seconds })
            .collect();
        issues.sort_by(|a, b| b.seconds.cmp(&a.seconds));
        UserReport {
            assignee: bucket.assignee,
            total_seconds: bucket.total_seconds,
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jira::models::user::User;
    use std::collections::BTreeMap;

    fn bucket(name: &str, issues: &[(&str, i64)]) -> Bucket {
        let per_issue_seconds: BTreeMap<IssueKey, i64> = issues
            .iter()
            .map(|(k, s)| (IssueKey::from(*k), *s))
            .collect();
        Bucket {
            assignee: Assignee {
                token: name.to_string(),
                user: User {
                    key: name.to_lowercase(),
                    name: name.to_string(),
                    ..User::default()
                },
            },
            total_seconds: per_issue_seconds.values().sum(),
            per_issue_seconds,
        }
    }

    fn names(report: &WorklogReport) -> Vec<&str> {
        report.users.iter().map(|u| u.assignee.token.as_str()).collect()
    }

    #[test]
    fn order_by_username_ignores_case() {
        let report = WorklogReport::new(
            vec![bucket("carl", &[]), bucket("Bea", &[]), bucket("anna", &[])],
            OrderBy::Username,
        );
        assert_eq!(names(&report), ["anna", "Bea", "carl"]);
    }

    #[test]
    fn order_by_username_follows_the_alphabet_for_accented_names() {
        let report = WorklogReport::new(
            vec![
                bucket("fred", &[]),
                bucket("Émile", &[]),
                bucket("zoe", &[]),
                bucket("Øystein", &[]),
                bucket("ola", &[]),
            ],
            OrderBy::Username,
        );
        assert_eq!(names(&report), ["Émile", "fred", "ola", "Øystein", "zoe"]);
    }

    #[test]
    fn order_by_username_keeps_names_differing_in_case_in_input_order() {
        let report = WorklogReport::new(
            vec![bucket("Mia", &[("TIME-1", 60)]), bucket("mia", &[("TIME-2", 60)])],
            OrderBy::Username,
        );
        let keys: Vec<String> = report
            .users
            .iter()
            .map(|u| u.issues[0].key.to_string())
            .collect();
        assert_eq!(keys, ["TIME-1", "TIME-2"]);
    }

    #[test]
    fn order_by_duration_is_descending_and_stable() {
        let report = WorklogReport::new(
            vec![
                bucket("a", &[("TIME-1", 60)]),
                bucket("b", &[("TIME-1", 120)]),
                bucket("c", &[("TIME-2", 60)]),
            ],
            OrderBy::Duration,
        );
        assert_eq!(names(&report), ["b", "a", "c"]);
        assert_eq!(report.total_seconds, 240);
    }

    #[test]
    fn issues_are_ordered_by_duration_whatever_the_user_order() {
        let report = WorklogReport::new(
            vec![bucket("a", &[("TIME-1", 60), ("TIME-2", 600), ("TIME-3", 300)])],
            OrderBy::Username,
        );
        let keys: Vec<String> = report.users[0]
            .issues
            .iter()
            .map(|i| i.key.to_string())
            .collect();
        assert_eq!(keys, ["TIME-2", "TIME-3", "TIME-1"]);
    }

    #[test]
    fn order_names() {
        assert_eq!("Duration".parse::<OrderBy>().unwrap(), OrderBy::Duration);
        assert_eq!(" username".parse::<OrderBy>().unwrap(), OrderBy::Username);
        assert!(matches!(
            "size".parse::<OrderBy>(),
            Err(WorklogError::UnsupportedOrder(_))
        ));
    }
}
