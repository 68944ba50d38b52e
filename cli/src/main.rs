//! # The Jira Worklog Report
//!
//! Reports how much time a group of people logged in Jira, in total and per issue.
//!
//! ## Configuration
//! Store the url of your Jira, your login name and your password once:
//! ```bash
//! worklog-report config update --url https://jira.yourcompany.com --user jdoe --token YOUR_PASSWORD
//! ```
//! The password goes into the keychain of your computer. Without it, you will be asked for it.
//!
//! ## Usage Examples
//!
//! Time logged by two people in the third quarter of 2020:
//! ```bash
//! worklog-report report -a jdoe,mia -t "2020 Q3"
//! ```
//!
//! Per issue, including subtasks, the busiest first:
//! ```bash
//! worklog-report report -a jdoe,mia -t 2020-06 --detailed --subtasks --order-by duration
//! ```
//!
//! Support requests of a project, in hours and minutes:
//! ```bash
//! worklog-report report -a jdoe -q "project = TIME" --item-type SupportRequests --humanize
//! ```
use clap::Parser;
use cli::{Command, LogLevel, Opts};
use commands::{configuration, report};
use env_logger::Env;
use log::{debug, error};
use std::env;
use std::fs::File;
use std::process::exit;

mod cli;
mod commands;
mod render;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let opts: Opts = Opts::parse();

    configure_logging(&opts); // Handles the -v option

    let outcome = match opts.cmd {
        Command::Report(report) => report::execute(report).await,
        Command::Config(config) => configuration::execute(config.cmd),
    };

    if let Err(err) = outcome {
        error!("{err}");
        eprintln!("ERROR: {err}");
        exit(1);
    }
}

fn configure_logging(opts: &Opts) {
    let mut tmp_dir = env::temp_dir();
    tmp_dir.push("worklog-report.log");

    if opts.verbosity.is_some() {
        eprintln!("Logging to {}", &tmp_dir.to_string_lossy());
    }

    // If nothing else was specified in RUST_LOG, use 'warn'
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(
        opts.verbosity.map_or("warn", |lvl| match lvl {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }),
    ));
    match File::create(&tmp_dir) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => eprintln!("Unable to log to {}: {e}", tmp_dir.to_string_lossy()),
    }
    builder.init();
    debug!("Logging started");
}
