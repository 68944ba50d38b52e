//!
//! `jira` is a thin client for the parts of the official Jira REST interface needed to
//! compute worklog totals: issue search with inlined worklogs, full worklog retrieval,
//! single issue lookup and the user directory search.
//!
//! Every call either returns the decoded payload or a [`JiraError`]. The three categories
//! a caller may want to recover from (`BadRequest`, `InvalidCredentials` and `AccessDenied`)
//! are distinct variants, everything else is reported as [`ErrorKind::Other`].
use std::{
    collections::BTreeMap,
    fmt::{self, Formatter},
    sync::{Arc, Mutex, PoisonError},
};

use log::debug;
use models::{
    core::IssueKey,
    issue::{Issue, SearchPage},
    user::User,
    worklog::WorklogPage,
};
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, RequestBuilder, StatusCode,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use url::{ParseError, Url};

pub mod builder;
pub mod models;

pub use builder::JiraBuilder;

type Result<T> = std::result::Result<T, JiraError>;

/// Jira silently caps this, we simply keep asking until everything has been returned
const SEARCH_PAGE_SIZE: usize = 1000;
const WORKLOG_PAGE_SIZE: usize = 5000;
const USER_SEARCH_LIMIT: usize = 1000;

const API_PATH: &str = "rest/api/latest";

const DEFAULT_BAD_REQUEST: &str =
    "The request to the Jira API is invalid. Please contact the administrator.";

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct Errors {
    #[serde(rename = "errorMessages", default)]
    pub error_messages: Vec<String>,
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}

/// The coarse classification callers match on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    InvalidCredentials,
    AccessDenied,
    Other,
}

#[derive(Debug, Error)]
pub enum JiraError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid credentials. Please check that your username and password are correct.")]
    InvalidCredentials,
    #[error("You do not have access to the entities you're querying. Please contact the Jira administrator or try other credentials.")]
    AccessDenied,
    #[error("Not found: '{0}'")]
    NotFound(String),
    #[error("Jira Client Error ({code}):\n{errors:#?}")]
    Fault { code: StatusCode, errors: Errors },
    #[error("Internal error in reqwest library: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Could not serialize/deserialize: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Could not connect to Jira: {0}")]
    ParseError(#[from] ParseError),
}

impl JiraError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            JiraError::BadRequest(_) => ErrorKind::BadRequest,
            JiraError::InvalidCredentials => ErrorKind::InvalidCredentials,
            JiraError::AccessDenied => ErrorKind::AccessDenied,
            _ => ErrorKind::Other,
        }
    }

    /// True for failures that fresh credentials may cure
    #[must_use]
    pub fn is_authorization_failure(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidCredentials | ErrorKind::AccessDenied
        )
    }

    /// True when Jira answered, false when the request never got a response
    #[must_use]
    pub fn is_response(&self) -> bool {
        !matches!(self, JiraError::RequestError(_) | JiraError::ParseError(_))
    }

    fn from_status(status: StatusCode, url: &Url, body: &str) -> JiraError {
        match status {
            StatusCode::BAD_REQUEST => {
                let messages = serde_json::from_str::<Errors>(body)
                    .map(|e| e.error_messages)
                    .unwrap_or_default();
                if messages.is_empty() {
                    JiraError::BadRequest(DEFAULT_BAD_REQUEST.to_string())
                } else {
                    JiraError::BadRequest(messages.join("\n"))
                }
            }
            StatusCode::UNAUTHORIZED => JiraError::InvalidCredentials,
            StatusCode::FORBIDDEN => JiraError::AccessDenied,
            StatusCode::NOT_FOUND => JiraError::NotFound(url.to_string()),
            code => JiraError::Fault {
                code,
                errors: serde_json::from_str::<Errors>(body).unwrap_or_default(),
            },
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Anonymous,
    Basic(String, String),
}

impl Credentials {
    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Credentials::Anonymous => request,
            Credentials::Basic(ref user, ref pass) => {
                request.basic_auth(user.to_owned(), Some(pass.to_owned()))
            }
        }
    }

    /// The account name the credentials belong to, if they carry one
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match self {
            Credentials::Basic(user, _) => Some(user),
            Credentials::Anonymous => None,
        }
    }
}

// Secrets stay out of the logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Anonymous => write!(f, "Anonymous"),
            Credentials::Basic(user, _) => write!(f, "Basic({user}, ***)"),
        }
    }
}

/// Which fields a search should inline for every hit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchFields {
    pub worklog: bool,
    pub subtasks: bool,
}

impl SearchFields {
    #[must_use]
    pub fn worklog() -> Self {
        SearchFields {
            worklog: true,
            subtasks: false,
        }
    }

    #[must_use]
    pub fn worklog_and_subtasks() -> Self {
        SearchFields {
            worklog: true,
            subtasks: true,
        }
    }

    fn as_param(self) -> String {
        let mut fields = Vec::new();
        if self.worklog {
            fields.push("worklog");
        }
        if self.subtasks {
            fields.push("subtasks");
        }
        fields.join(",")
    }
}

#[derive(Clone, Debug)]
pub struct Jira {
    host: Url,
    api: String,
    credentials: Arc<Mutex<Credentials>>,
    client: Client,
}

impl Jira {
    #[allow(clippy::missing_errors_doc)]
    pub fn new<H>(host: H, credentials: Credentials) -> Result<Jira>
    where
        H: Into<String>,
    {
        let host = Url::parse(&host.into())?;

        Ok(Jira {
            host,
            api: API_PATH.to_string(),
            client: Client::new(),
            credentials: Arc::new(Mutex::new(credentials)),
        })
    }

    #[must_use]
    pub fn builder() -> JiraBuilder {
        JiraBuilder::new()
    }

    #[must_use]
    pub fn credentials(&self) -> Credentials {
        self.credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the credentials used by every subsequent request
    pub fn set_credentials(&self, credentials: Credentials) {
        *self
            .credentials
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = credentials;
    }

    /// The human facing link to an issue, i.e. `https://jira.example.com/browse/TIME-40`
    #[must_use]
    pub fn view_url_for(&self, key: &IssueKey) -> String {
        let mut base = self.host.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base.join(&format!("browse/{key}"))
            .map_or_else(|_| format!("{}browse/{key}", self.host), |u| u.to_string())
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let mut base = self.host.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Ok(base.join(&format!("{}{endpoint}", self.api))?)
    }

    #[allow(clippy::missing_errors_doc)]
    pub async fn get<D>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<D>
    where
        D: DeserializeOwned,
    {
        let url = self.endpoint_url(endpoint)?;

        let mut request = self
            .client
            .get(url.clone())
            .query(query)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        request = self.credentials().apply(request);

        let response = request.send().await?;
        let status = response.status();
        let uri = response.url().to_string();
        let body = response.text().await?;
        debug!("HTTP request completed: GET {uri} {status}");

        if status.is_success() {
            let data = if body.is_empty() { "null" } else { &body };
            Ok(serde_json::from_str::<D>(data)?)
        } else {
            debug!("status {status:?} body '{body:?}'");
            Err(JiraError::from_status(status, &url, &body))
        }
    }

    /// Retrieves a single issue with its inline worklog page
    #[allow(clippy::missing_errors_doc)]
    pub async fn get_issue(&self, key: &IssueKey) -> Result<Issue> {
        self.get::<Issue>(
            &format!("/issue/{key}"),
            &[("fields", SearchFields::worklog().as_param())],
        )
        .await
    }

    /// Retrieves every worklog entry of an issue, following the pages until `total` is reached
    #[allow(clippy::missing_errors_doc)]
    pub async fn get_full_worklog(&self, key: &IssueKey) -> Result<WorklogPage> {
        let resource = format!("/issue/{key}/worklog");
        let mut start_at = 0;
        let mut worklog = WorklogPage::default();

        debug!("Retrieving full worklog for {key}");
        loop {
            let mut page = self
                .get::<WorklogPage>(
                    &resource,
                    &[
                        ("startAt", start_at.to_string()),
                        ("maxResults", WORKLOG_PAGE_SIZE.to_string()),
                    ],
                )
                .await?;
            let received = page.worklogs.len();
            worklog.worklogs.append(&mut page.worklogs);
            start_at += received;
            if received == 0 || start_at >= page.total {
                break;
            }
        }
        worklog.total = worklog.worklogs.len();
        worklog.max_results = worklog.total;
        debug!("Issue {} has {} worklog entries", key, worklog.total);
        Ok(worklog)
    }

    /// Executes a JQL search and collects the hits of every page
    #[allow(clippy::missing_errors_doc)]
    pub async fn search(&self, jql: &str, fields: SearchFields) -> Result<Vec<Issue>> {
        let mut start_at = 0;
        let mut issues = Vec::<Issue>::new();
        loop {
            let mut page = self
                .get::<SearchPage>(
                    "/search",
                    &[
                        ("jql", jql.to_string()),
                        ("fields", fields.as_param()),
                        ("startAt", start_at.to_string()),
                        ("maxResults", SEARCH_PAGE_SIZE.to_string()),
                    ],
                )
                .await?;
            let received = page.issues.len();
            issues.append(&mut page.issues);
            start_at += received;
            if received == 0 || start_at >= page.total {
                break;
            }
        }
        Ok(issues)
    }

    /// Free text search of the user directory
    #[allow(clippy::missing_errors_doc)]
    pub async fn search_users(&self, text: &str) -> Result<Vec<User>> {
        self.get::<Vec<User>>(
            "/user/search",
            &[
                ("username", text.to_string()),
                ("maxResults", USER_SEARCH_LIMIT.to_string()),
            ],
        )
        .await
    }
}
