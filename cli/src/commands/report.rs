use std::io::{self, IsTerminal};

use log::debug;
use worklog::error::WorklogError;
use worklog::operation::report::Report;
use worklog::ApplicationRuntime;

use crate::cli;
use crate::render::{DurationFormat, Renderer};

/// Runs the report and prints it to stdout. Settings missing from the command line are
/// taken from the configuration file.
pub async fn execute(args: cli::Report) -> Result<(), WorklogError> {
    let runtime = ApplicationRuntime::new(args.url.as_deref(), args.user.as_deref())?;
    let settings = &runtime.config().report;

    let request = Report {
        assignees: args.assignees,
        period: args.period,
        item_type: args.item_type,
        filter: args.query,
        order_by: args.order_by.unwrap_or_else(|| settings.order_by.clone()),
        include_subtasks: args.subtasks,
    };
    debug!("Executing {request:?}");
    let report = runtime.report(&request).await?;

    let renderer = Renderer {
        durations: DurationFormat {
            hours_per_day: args.hours_per_day.unwrap_or(settings.hours_per_day),
            days_per_year: args.days_per_year.unwrap_or(settings.days_per_year),
            humanize: args.humanize,
            units: !args.no_units,
        },
        delimiter: args
            .delimiter
            .unwrap_or_else(|| settings.delimiter.clone()),
        detailed: args.detailed,
        hide_total: args.hide_total,
        display_names: args.display_names,
        color: !args.no_color && io::stdout().is_terminal(),
    };

    let mut stdout = io::stdout().lock();
    renderer
        .render(&report, |key| runtime.issue_url(key), &mut stdout)
        .map_err(|e| WorklogError::Output(e.to_string()))
}
