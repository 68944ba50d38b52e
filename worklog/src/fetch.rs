//! Retrieves the issues matching a query, with every worklog entry they hold.
//!
//! Jira inlines at most one page of worklog entries per issue and returns subtasks as
//! stubs without any worklog. The issues handed out from here have their complete
//! worklog, subtasks appear as issues of their own, and every key occurs once.
use std::collections::HashSet;

use jira::models::issue::Issue;
use jira::{JiraError, SearchFields};
use log::{debug, info};

use crate::error::WorklogError;
use crate::query::WorklogQuery;
use crate::tracker::IssueTracker;

/// Executes `query`, optionally widened to the subtasks of the matching issues.
///
/// Subtasks are first requested with the `subtasksOf` JQL function. If Jira rejects that
/// query as malformed, which it does when the function is not installed, the plain query is
/// executed instead, asking Jira to inline the subtasks of every hit.
///
/// # Errors
/// Any failure from the tracker, apart from the rejected subtask expansion
pub async fn fetch_issues<T>(
    tracker: &T,
    query: &WorklogQuery,
    include_subtasks: bool,
) -> Result<Vec<Issue>, WorklogError>
where
    T: IssueTracker + ?Sized,
{
    let found = search(tracker, query, include_subtasks).await?;
    debug!("Search returned {} issue(s)", found.len());

    let mut issues = deduplicate(flatten(found));
    debug!("{} issue(s) after flattening subtasks", issues.len());

    for issue in &mut issues {
        complete_worklog(tracker, issue).await?;
    }
    Ok(issues)
}

async fn search<T>(
    tracker: &T,
    query: &WorklogQuery,
    include_subtasks: bool,
) -> Result<Vec<Issue>, WorklogError>
where
    T: IssueTracker + ?Sized,
{
    if !include_subtasks {
        return tracker.search(query.text(), SearchFields::worklog()).await;
    }

    let expanded = query.with_subtasks();
    debug!("Executing query: {expanded}");
    match tracker.search(&expanded, SearchFields::worklog()).await {
        Err(WorklogError::Jira(JiraError::BadRequest(reason))) => {
            info!("Subtask expansion is not available ({reason}), using inline subtasks");
            tracker
                .search(query.text(), SearchFields::worklog_and_subtasks())
                .await
        }
        outcome => outcome,
    }
}

/// Moves the inline subtasks of every issue into the list, right after their parent
fn flatten(issues: Vec<Issue>) -> Vec<Issue> {
    let mut flat = Vec::with_capacity(issues.len());
    for mut issue in issues {
        let subtasks = std::mem::take(&mut issue.fields.subtasks);
        flat.push(issue);
        flat.extend(flatten(subtasks));
    }
    flat
}

/// Keeps one issue per key, preferring a copy carrying worklog data over a stub
fn deduplicate(mut issues: Vec<Issue>) -> Vec<Issue> {
    issues.sort_by_key(|issue| !issue.has_worklog());
    let mut seen = HashSet::new();
    issues.retain(|issue| seen.insert(issue.key.clone()));
    issues
}

async fn complete_worklog<T>(tracker: &T, issue: &mut Issue) -> Result<(), WorklogError>
where
    T: IssueTracker + ?Sized,
{
    if !issue.has_worklog() {
        debug!("Retrieving {} which came without worklog", issue.key);
        let fetched = tracker.get_issue(&issue.key).await?;
        issue.fields.worklog = fetched.fields.worklog;
    }
    let truncated = issue
        .fields
        .worklog
        .as_ref()
        .is_some_and(jira::models::worklog::WorklogPage::is_truncated);
    if truncated {
        issue.fields.worklog = Some(tracker.get_full_worklog(&issue.key).await?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryBuilder;
    use crate::testing::MockTracker;
    use chrono::DateTime;
    use jira::models::core::IssueKey;
    use jira::models::user::User;
    use jira::models::worklog::{Worklog, WorklogPage};
    use mockall::predicate::{always, eq};

    fn entry(seconds: i64) -> Worklog {
        Worklog {
            id: String::new(),
            author: User {
                key: "jdoe".into(),
                ..User::default()
            },
            started: DateTime::parse_from_rfc3339("2020-07-10T09:00:00+02:00").unwrap(),
            time_spent_seconds: seconds,
        }
    }

    fn page(entries: usize, total: usize) -> WorklogPage {
        WorklogPage {
            start_at: 0,
            max_results: entries,
            total,
            worklogs: (0..entries).map(|_| entry(60)).collect(),
        }
    }

    fn issue(key: &str, worklog: Option<WorklogPage>, subtasks: Vec<Issue>) -> Issue {
        let mut issue = Issue {
            key: IssueKey::from(key),
            ..Issue::default()
        };
        issue.fields.worklog = worklog;
        issue.fields.subtasks = subtasks;
        issue
    }

    fn query() -> WorklogQuery {
        let users = [User {
            key: "jdoe".into(),
            ..User::default()
        }];
        QueryBuilder::new(&users).build()
    }

    fn keys(issues: &[Issue]) -> Vec<String> {
        issues.iter().map(|i| i.key.to_string()).collect()
    }

    #[tokio::test]
    async fn plain_search_without_subtasks() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_search()
            .with(eq("worklogAuthor in (jdoe)"), eq(SearchFields::worklog()))
            .times(1)
            .returning(|_, _| Ok(vec![issue("TIME-1", Some(page(1, 1)), vec![])]));

        let issues = fetch_issues(&tracker, &query(), false).await.unwrap();

        assert_eq!(keys(&issues), ["TIME-1"]);
    }

    #[tokio::test]
    async fn truncated_worklog_is_replaced() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_search()
            .returning(|_, _| Ok(vec![issue("TIME-1", Some(page(20, 45)), vec![])]));
        tracker
            .expect_get_full_worklog()
            .with(eq(IssueKey::from("TIME-1")))
            .times(1)
            .returning(|_| Ok(page(45, 45)));

        let issues = fetch_issues(&tracker, &query(), false).await.unwrap();

        assert_eq!(issues[0].fields.worklog.as_ref().unwrap().worklogs.len(), 45);
    }

    #[tokio::test]
    async fn expansion_is_used_when_available() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_search()
            .withf(|jql, _| jql.contains("subtasksOf"))
            .times(1)
            .returning(|_, _| {
                Ok(vec![
                    issue("TIME-1", Some(page(1, 1)), vec![]),
                    issue("TIME-2", Some(page(2, 2)), vec![]),
                ])
            });

        let issues = fetch_issues(&tracker, &query(), true).await.unwrap();

        assert_eq!(keys(&issues), ["TIME-1", "TIME-2"]);
    }

    #[tokio::test]
    async fn rejected_expansion_falls_back_to_inline_subtasks() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_search()
            .withf(|jql, _| jql.contains("subtasksOf"))
            .times(1)
            .returning(|_, _| {
                Err(WorklogError::Jira(JiraError::BadRequest(
                    "Unable to find JQL function 'subtasksOf'".into(),
                )))
            });
        tracker
            .expect_search()
            .withf(|jql, fields| !jql.contains("subtasksOf") && fields.subtasks)
            .times(1)
            .returning(|_, _| {
                Ok(vec![issue(
                    "TIME-1",
                    Some(page(1, 1)),
                    vec![issue("TIME-2", None, vec![])],
                )])
            });
        tracker
            .expect_get_issue()
            .with(eq(IssueKey::from("TIME-2")))
            .times(1)
            .returning(|_| Ok(issue("TIME-2", Some(page(3, 3)), vec![])));

        let issues = fetch_issues(&tracker, &query(), true).await.unwrap();

        assert_eq!(keys(&issues), ["TIME-1", "TIME-2"]);
        assert_eq!(issues[1].fields.worklog.as_ref().unwrap().worklogs.len(), 3);
    }

    #[tokio::test]
    async fn other_rejections_propagate() {
        let mut tracker = MockTracker::new();
        tracker
            .expect_search()
            .with(always(), always())
            .times(1)
            .returning(|_, _| Err(WorklogError::Jira(JiraError::NotFound("search".into()))));

        let result = fetch_issues(&tracker, &query(), true).await;

        assert!(matches!(result, Err(WorklogError::Jira(JiraError::NotFound(_)))));
    }

    #[test]
    fn deduplication_keeps_the_copy_with_worklog() {
        let issues = vec![
            issue("TIME-2", None, vec![]),
            issue("TIME-1", Some(page(1, 1)), vec![]),
            issue("TIME-2", Some(page(2, 2)), vec![]),
        ];

        let unique = deduplicate(issues);

        assert_eq!(keys(&unique), ["TIME-1", "TIME-2"]);
        assert_eq!(unique[1].fields.worklog.as_ref().unwrap().worklogs.len(), 2);
    }

    #[test]
    fn subtasks_follow_their_parent() {
        let issues = vec![
            issue(
                "TIME-1",
                Some(page(0, 0)),
                vec![issue("TIME-3", None, vec![]), issue("TIME-4", None, vec![])],
            ),
            issue("TIME-2", Some(page(0, 0)), vec![]),
        ];

        let flat = flatten(issues);

        assert_eq!(keys(&flat), ["TIME-1", "TIME-3", "TIME-4", "TIME-2"]);
        assert!(flat.iter().all(|i| i.fields.subtasks.is_empty()));
    }
}
