//! Maps the assignee tokens given by the operator to Jira users.
use jira::models::user::User;
use log::debug;

use crate::error::WorklogError;
use crate::prompt::Prompt;
use crate::tracker::IssueTracker;

/// A requested assignee: the token as typed, and the user it resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignee {
    pub token: String,
    pub user: User,
}

/// Resolves every token to exactly one user, keeping the order and the duplicates of
/// `tokens`. When the directory returns several candidates and none of them is an exact
/// match, the operator picks one.
///
/// # Errors
/// `WorklogError::UnknownUser` if a token is blank or the directory has no match for it,
/// `WorklogError::Prompt` if the operator picks a number outside the list, or any failure
/// from the tracker or the prompt
pub async fn resolve_assignees<T, P>(
    tracker: &T,
    prompt: &P,
    tokens: &[String],
) -> Result<Vec<Assignee>, WorklogError>
where
    T: IssueTracker + ?Sized,
    P: Prompt + ?Sized,
{
    let mut assignees = Vec::with_capacity(tokens.len());
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            return Err(WorklogError::UnknownUser(token.to_string()));
        }
        let candidates = tracker.search_users(token).await?;
        debug!("'{token}' matches {} user(s)", candidates.len());

        let user = pick(token, candidates, prompt)?;
        assignees.push(Assignee {
            token: token.to_string(),
            user,
        });
    }
    Ok(assignees)
}

fn pick<P>(token: &str, mut candidates: Vec<User>, prompt: &P) -> Result<User, WorklogError>
where
    P: Prompt + ?Sized,
{
    match candidates.len() {
        0 => return Err(WorklogError::UnknownUser(token.to_string())),
        1 => return Ok(candidates.remove(0)),
        _ => {}
    }

    let exact: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, u)| u.email_address == token || u.key == token || u.name == token)
        .map(|(i, _)| i)
        .collect();
    if let [only] = exact[..] {
        return Ok(candidates.swap_remove(only));
    }

    let mut question = format!("Several users match '{token}':\n");
    for (i, u) in candidates.iter().enumerate() {
        question.push_str(&format!(
            "  {}) {} ({}, {})\n",
            i + 1,
            u.display_name,
            u.login_name(),
            u.email_address
        ));
    }
    question.push_str("Which one did you mean");

    let choice = prompt.ask_number(&question, 1, candidates.len())?;
    match choice.checked_sub(1).filter(|i| *i < candidates.len()) {
        Some(i) => Ok(candidates.swap_remove(i)),
        None => Err(WorklogError::Prompt(format!(
            "{choice} is not one of 1 to {}",
            candidates.len()
        ))),
    }
}
