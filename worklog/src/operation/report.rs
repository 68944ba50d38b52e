//! Produces the worklog report: who spent how much time on what.
use log::{debug, info};

use crate::aggregate::aggregate;
use crate::error::WorklogError;
use crate::fetch::fetch_issues;
use crate::period::TimePeriod;
use crate::prompt::Prompt;
use crate::query::{ItemType, QueryBuilder};
use crate::report::{OrderBy, WorklogReport};
use crate::tracker::IssueTracker;
use crate::users::resolve_assignees;

/// What to report on. The expressions are validated before anything is sent to Jira.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Free text identifying the users, i.e. login names or email addresses
    pub assignees: Vec<String>,
    /// `2020 Q3`, `2020-06`, `June 2020`, `2020-06-17` and similar
    pub period: Option<String>,
    /// `SupportRequests` or `ExternalBugs`
    pub item_type: Option<String>,
    /// Additional JQL
    pub filter: Option<String>,
    /// `username` or `duration`
    pub order_by: String,
    pub include_subtasks: bool,
}

/// Executes the report against `tracker`, asking the operator through `prompt` whenever
/// an assignee is ambiguous.
///
/// # Errors
/// If the request holds an invalid expression, no assignee, a blank or unknown assignee, or
/// the tracker fails
pub async fn execute<T, P>(
    tracker: &T,
    prompt: &P,
    request: &Report,
) -> Result<WorklogReport, WorklogError>
where
    T: IssueTracker + ?Sized,
    P: Prompt + ?Sized,
{
    let period = request
        .period
        .as_deref()
        .map(TimePeriod::resolve)
        .transpose()?;
    let item_type = request
        .item_type
        .as_deref()
        .map(str::parse::<ItemType>)
        .transpose()?;
    let order_by: OrderBy = request.order_by.parse()?;

    let tokens: Vec<String> = request
        .assignees
        .iter()
        .map(|a| a.trim().to_string())
        .collect();
    if tokens.is_empty() {
        return Err(WorklogError::MissingSetting("assignees"));
    }
    if let Some(blank) = tokens.iter().find(|t| t.is_empty()) {
        return Err(WorklogError::UnknownUser(blank.clone()));
    }
    if let Some(period) = &period {
        info!("Reporting on the period {period}");
    }

    let assignees = resolve_assignees(tracker, prompt, &tokens).await?;

    let query = QueryBuilder::new(assignees.iter().map(|a| &a.user))
        .period(period.as_ref())
        .item_type(item_type)
        .filter(request.filter.as_deref())
        .build();
    debug!("Query: {query}");

    let issues = fetch_issues(tracker, &query, request.include_subtasks).await?;
    let buckets = aggregate(&issues, &assignees, period.as_ref());
    Ok(WorklogReport::new(buckets, order_by))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTracker, ScriptedPrompt};

    fn request() -> Report {
        Report {
            assignees: vec!["jdoe".to_string()],
            order_by: "username".to_string(),
            ..Report::default()
        }
    }

    #[tokio::test]
    async fn invalid_expressions_fail_before_any_call() {
        let tracker = MockTracker::new();
        let prompt = ScriptedPrompt::new([]);

        let bad_period = Report {
            period: Some("sometime".into()),
            ..request()
        };
        let bad_type = Report {
            item_type: Some("Epics".into()),
            ..request()
        };
        let bad_order = Report {
            order_by: "size".into(),
            ..request()
        };

        assert!(matches!(
            execute(&tracker, &prompt, &bad_period).await,
            Err(WorklogError::InvalidPeriod(_))
        ));
        assert!(matches!(
            execute(&tracker, &prompt, &bad_type).await,
            Err(WorklogError::UnsupportedFilter(_))
        ));
        assert!(matches!(
            execute(&tracker, &prompt, &bad_order).await,
            Err(WorklogError::UnsupportedOrder(_))
        ));
    }

    #[tokio::test]
    async fn missing_assignees_are_rejected() {
        let tracker = MockTracker::new();
        let prompt = ScriptedPrompt::new([]);
        let nobody = Report {
            assignees: vec![],
            ..request()
        };

        assert!(matches!(
            execute(&tracker, &prompt, &nobody).await,
            Err(WorklogError::MissingSetting("assignees"))
        ));
    }

    #[tokio::test]
    async fn blank_assignee_is_rejected_before_any_call() {
        let tracker = MockTracker::new();
        let prompt = ScriptedPrompt::new([]);
        let blank = Report {
            assignees: vec!["jdoe".to_string(), " ".to_string(), "mia".to_string()],
            ..request()
        };

        assert!(matches!(
            execute(&tracker, &prompt, &blank).await,
            Err(WorklogError::UnknownUser(t)) if t.is_empty()
        ));
    }
}
