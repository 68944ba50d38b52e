//! Writes the report as lines of text
use std::io::{self, Write};

use crossterm::style::{StyledContent, Stylize};
use jira::models::core::IssueKey;
use worklog::report::{UserReport, WorklogReport};

/// How durations are written
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct DurationFormat {
    pub hours_per_day: f64,
    pub days_per_year: f64,
    pub humanize: bool,
    pub units: bool,
}

impl DurationFormat {
    pub(crate) fn format(&self, seconds: i64) -> String {
        if self.humanize {
            return self.humanized(seconds);
        }
        #[allow(clippy::cast_precision_loss)]
        let days = seconds as f64 / 3600.0 / self.hours_per_day;
        if self.units {
            format!("{days:.2}d")
        } else {
            format!("{days:.2}")
        }
    }

    /// Working time units, a day being `hours_per_day` long, rounded to whole minutes
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    fn humanized(&self, seconds: i64) -> String {
        let day = self.hours_per_day * 60.0;
        let year = day * self.days_per_year;
        let units = [
            ("year", year),
            ("month", year / 12.0),
            ("week", day * self.days_per_year / (365.25 / 7.0)),
            ("day", day),
            ("hour", 60.0),
        ];

        let mut remaining = (seconds as f64 / 60.0).round();
        let mut parts = Vec::new();
        for (name, minutes) in units {
            let count = (remaining / minutes).floor();
            if count >= 1.0 {
                remaining -= count * minutes;
                parts.push(plural(count as i64, name));
            }
        }
        let minutes = remaining.round() as i64;
        if minutes > 0 || parts.is_empty() {
            parts.push(plural(minutes, "minute"));
        }
        parts.join(", ")
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

#[allow(clippy::struct_excessive_bools)]
pub(crate) struct Renderer {
    pub durations: DurationFormat,
    pub delimiter: String,
    pub detailed: bool,
    pub hide_total: bool,
    pub display_names: bool,
    pub color: bool,
}

impl Renderer {
    pub(crate) fn render<W, U>(
        &self,
        report: &WorklogReport,
        issue_url: U,
        out: &mut W,
    ) -> io::Result<()>
    where
        W: Write,
        U: Fn(&IssueKey) -> String,
    {
        let delimiter = &self.delimiter;
        for user in &report.users {
            let name = self.paint(self.name_of(user), |s| s.bold().blue());
            let duration = self.paint(self.durations.format(user.total_seconds), |s| s.green());
            writeln!(out, "{name}{delimiter}{duration}")?;

            if self.detailed {
                for issue in &user.issues {
                    let url = issue_url(&issue.key);
                    let key = self.paint(issue.key.to_string(), |s| s.bold().cyan());
                    let duration = self.paint(self.durations.format(issue.seconds), |s| s.green());
                    writeln!(out, "\t{key} ({url}){delimiter}{duration}")?;
                }
                writeln!(out)?;
            }
        }

        if !self.hide_total {
            if !self.detailed {
                writeln!(out)?;
            }
            let title = self.paint("Total".to_string(), |s| s.bold().underlined().blue());
            let total = self.paint(self.durations.format(report.total_seconds), |s| {
                s.bold().green()
            });
            writeln!(out, "{title}{delimiter}{total}")?;
        }
        Ok(())
    }

    fn name_of(&self, user: &UserReport) -> String {
        let u = &user.assignee.user;
        if self.display_names && !u.display_name.is_empty() {
            u.display_name.clone()
        } else {
            u.login_name().to_string()
        }
    }

    fn paint<F>(&self, text: String, style: F) -> String
    where
        F: FnOnce(String) -> StyledContent<String>,
    {
        if self.color {
            style(text).to_string()
        } else {
            text
        }
    }
}
