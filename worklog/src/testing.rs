//! Test doubles shared by the unit tests
use std::collections::VecDeque;
use std::sync::Mutex;

use jira::models::{core::IssueKey, issue::Issue, user::User, worklog::WorklogPage};
use jira::{Credentials, SearchFields};

use crate::error::WorklogError;
use crate::prompt::Prompt;

/// Answers the questions from a script and records them
pub(crate) struct ScriptedPrompt {
    answers: Mutex<VecDeque<String>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub(crate) fn new<const N: usize>(answers: [&str; N]) -> Self {
        ScriptedPrompt {
            answers: Mutex::new(answers.iter().map(ToString::to_string).collect()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }

    fn next(&self, question: &str) -> Result<String, WorklogError> {
        self.questions.lock().unwrap().push(question.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| WorklogError::Prompt("end of input".into()))
    }
}

impl Prompt for ScriptedPrompt {
    fn ask_text(&self, question: &str, default: Option<&str>) -> Result<String, WorklogError> {
        let answer = self.next(question)?;
        match default {
            Some(default) if answer.is_empty() => Ok(default.to_string()),
            _ => Ok(answer),
        }
    }

    fn ask_masked(&self, question: &str) -> Result<String, WorklogError> {
        self.next(question)
    }

    /// Hands out the scripted number as is, in range or not
    fn ask_number(&self, question: &str, _min: usize, _max: usize) -> Result<usize, WorklogError> {
        Ok(self.next(question)?.parse().expect("scripted answer is a number"))
    }
}

mockall::mock! {
    pub Tracker {}

    #[async_trait::async_trait]
    impl crate::tracker::IssueTracker for Tracker {
        async fn get_issue(&self, key: &IssueKey) -> Result<Issue, WorklogError>;
        async fn get_full_worklog(&self, key: &IssueKey) -> Result<WorklogPage, WorklogError>;
        async fn search(&self, jql: &str, fields: SearchFields) -> Result<Vec<Issue>, WorklogError>;
        async fn search_users(&self, text: &str) -> Result<Vec<User>, WorklogError>;
        fn credentials(&self) -> Credentials;
        fn install_credentials(&self, credentials: Credentials);
    }
}
