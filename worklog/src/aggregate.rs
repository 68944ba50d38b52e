//! Accumulates the time spent by every assignee, in total and per issue.
use std::collections::BTreeMap;

use jira::models::core::IssueKey;
use jira::models::issue::Issue;
use jira::models::worklog::Worklog;

use crate::period::TimePeriod;
use crate::users::Assignee;

/// The time credited to one assignee
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub assignee: Assignee,
    pub total_seconds: i64,
    pub per_issue_seconds: BTreeMap<IssueKey, i64>,
}

impl Bucket {
    fn new(assignee: &Assignee) -> Self {
        Bucket {
            assignee: assignee.clone(),
            total_seconds: 0,
            per_issue_seconds: BTreeMap::new(),
        }
    }

    fn credit(&mut self, key: &IssueKey, seconds: i64) {
        self.total_seconds += seconds;
        *self.per_issue_seconds.entry(key.clone()).or_insert(0) += seconds;
    }
}

/// One bucket per assignee, in the order of `assignees`, even when nothing was credited.
/// With a `period`, entries are clipped to it and entries outside of it are ignored.
#[must_use]
pub fn aggregate(
    issues: &[Issue],
    assignees: &[Assignee],
    period: Option<&TimePeriod>,
) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = assignees.iter().map(Bucket::new).collect();
    let keys: Vec<String> = assignees.iter().map(|a| normalized(&a.user.key)).collect();

    for issue in issues {
        let Some(worklog) = &issue.fields.worklog else {
            continue;
        };
        for entry in &worklog.worklogs {
            let author = normalized(&entry.author.key);
            let seconds = credited_seconds(entry, period);
            if seconds <= 0 {
                continue;
            }
            for (bucket, key) in buckets.iter_mut().zip(&keys) {
                if *key == author {
                    bucket.credit(&issue.key, seconds);
                }
            }
        }
    }
    buckets
}

fn normalized(key: &str) -> String {
    key.trim().to_lowercase()
}

/// The part of the entry falling within `period`, both intervals being closed
fn credited_seconds(entry: &Worklog, period: Option<&TimePeriod>) -> i64 {
    let Some(period) = period else {
        return entry.time_spent_seconds;
    };
    let start = entry.started.timestamp();
    let end = start + entry.time_spent_seconds;
    let (first, last) = (period.start.timestamp(), period.end.timestamp());
    if start > last || end < first {
        return 0;
    }
    end.min(last) - start.max(first)
}
