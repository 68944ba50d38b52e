use std::fmt::{self, Formatter};

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
pub(crate) enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Parser)]
/// Jira worklog report - how much time did a group of people log, and on what
///
/// Periods are given as a quarter (`2020 Q3`, `Q3 2020`), a month (`2020-06`, `June 2020`)
/// or a day (`2020-06-17`), in local time.
///
/// Durations are reported in working days, using the number of working hours in a day.
#[command(author, version, about)] // Read from Cargo.toml
pub(crate) struct Opts {
    #[command(subcommand)]
    pub cmd: Command,

    #[arg(global = true, short, long)]
    pub verbosity: Option<LogLevel>,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Reports the time logged by the assignees
    Report(Report),
    /// Subcommands for configuration
    Config(Config),
}

#[derive(Args)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct Report {
    /// The base url of your Jira, i.e. <https://jira.yourcompany.com>
    #[arg(short = 'j', long)]
    pub url: Option<String>,
    /// The user to log in as, the password is taken from the keychain or asked for
    #[arg(short, long)]
    pub user: Option<String>,
    /// Additional JQL narrowing down the issues, i.e. "project = TIME"
    #[arg(short, long)]
    pub query: Option<String>,
    /// Comma separated list of the people to report on: -a jdoe,mia@norn.no
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub assignees: Vec<String>,
    /// Limit the report to a quarter, a month or a day
    #[arg(short = 't', long)]
    pub period: Option<String>,
    /// Working hours in a day [default: 6]
    #[arg(long)]
    pub hours_per_day: Option<f64>,
    /// Working days in a year [default: 247]
    #[arg(long)]
    pub days_per_year: Option<f64>,
    /// List the time spent on every issue
    #[arg(short, long)]
    pub detailed: bool,
    /// One of the predefined filters: SupportRequests or ExternalBugs
    #[arg(short, long)]
    pub item_type: Option<String>,
    /// username or duration [default: username]
    #[arg(short, long)]
    pub order_by: Option<String>,
    /// Separates the name and the duration [default: tab]
    #[arg(long)]
    pub delimiter: Option<String>,
    /// Durations in years, months, weeks, days, hours and minutes
    #[arg(long)]
    pub humanize: bool,
    /// Print the durations without the unit
    #[arg(long)]
    pub no_units: bool,
    #[arg(long)]
    pub no_color: bool,
    #[arg(long)]
    pub hide_total: bool,
    /// Show the display names instead of the login names
    #[arg(long)]
    pub display_names: bool,
    /// Include the subtasks of the matching issues
    #[arg(long)]
    pub subtasks: bool,
}

#[derive(Args)]
pub(crate) struct Config {
    #[command(subcommand)]
    pub cmd: ConfigCommand,
}

/// Create, modify or list the configuration file.
#[derive(Subcommand, Clone)]
pub(crate) enum ConfigCommand {
    /// Update the configuration file
    Update(UpdateConfiguration),
    /// write current configuration to standard output
    List,
    /// Remove the current configuration and the stored password
    Remove,
}

#[derive(Args, Clone)]
pub(crate) struct UpdateConfiguration {
    /// Password or personal access token, kept in the keychain of your computer
    #[arg(short, long)]
    pub token: Option<String>,
    /// Your login name
    #[arg(short, long)]
    pub user: Option<String>,
    /// The base url of your Jira, i.e. <https://jira.yourcompany.com>
    #[arg(long)]
    pub url: Option<String>,
}
