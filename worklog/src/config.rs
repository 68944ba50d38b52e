use crate::error::WorklogError;
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Application configuration struct
/// Holds what we need to connect to Jira and the defaults of the report. The secret
/// belonging to `jira.user` is kept in the credential store, never in this file.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
pub struct AppConfiguration {
    pub jira: JiraClientConfiguration,

    /// Older files may lack the `report` section
    #[serde(default)]
    pub report: ReportSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Default)]
pub struct JiraClientConfiguration {
    pub url: String,
    pub user: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(default)]
pub struct ReportSettings {
    pub hours_per_day: f64,
    pub days_per_year: f64,
    /// `username` or `duration`
    pub order_by: String,
    pub delimiter: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        ReportSettings {
            hours_per_day: 6.0,
            days_per_year: 247.0,
            order_by: "username".to_string(),
            delimiter: "\t".to_string(),
        }
    }
}

/// Filename holding the application configuration parameters
///
/// # Errors
/// If the platform has no notion of a home directory
pub fn configuration_file() -> Result<PathBuf, WorklogError> {
    Ok(project_dirs()?.preference_dir().join("config.toml"))
}

/// Loads the configuration file, an absent file yields the defaults
///
/// # Errors
/// If the file exists, but could not be read or parsed
pub fn load() -> Result<AppConfiguration, WorklogError> {
    let config_path = configuration_file()?;
    if !config_path.exists() {
        return Ok(AppConfiguration::default());
    }
    read(&config_path)
}

#[allow(clippy::missing_errors_doc)]
pub fn save(cfg: &AppConfiguration) -> Result<()> {
    create_configuration_file(cfg, &configuration_file()?)
}

#[allow(clippy::missing_errors_doc)]
pub fn remove() -> Result<()> {
    match fs::remove_file(configuration_file()?) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

#[allow(clippy::missing_errors_doc)]
pub fn application_config_to_string(cfg: &AppConfiguration) -> Result<String> {
    Ok(toml::to_string::<AppConfiguration>(cfg)?)
}

fn project_dirs() -> Result<ProjectDirs, WorklogError> {
    ProjectDirs::from("com", "norn", "worklog-report").ok_or(WorklogError::ConfigDirUnavailable)
}

/// Reads the `Application` configuration struct from the supplied TOML file
fn read(path: &Path) -> Result<AppConfiguration, WorklogError> {
    let mut file = File::open(path).map_err(|source| WorklogError::ApplicationConfig {
        path: path.into(),
        source,
    })?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|source| WorklogError::ApplicationConfig {
            path: path.into(),
            source,
        })?;
    toml::from_str::<AppConfiguration>(&contents).map_err(|source| WorklogError::TomlParse {
        path: path.into(),
        source,
    })
}

fn create_configuration_file(cfg: &AppConfiguration, path: &Path) -> Result<()> {
    let directory = path
        .parent()
        .ok_or_else(|| WorklogError::ConfigFileCreation { path: path.into() })?;
    if !directory.try_exists()? {
        fs::create_dir_all(directory)?;
    }

    let mut file = File::create(path)?;
    let toml = application_config_to_string(cfg)?;
    file.write_all(toml.as_bytes())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_parsing() {
        let toml_str = r#"
        [jira]
        url = "https://jira.norn.no"
        user = "steinar"

        [report]
        hours_per_day = 7.5
        days_per_year = 230
        order_by = "duration"
        delimiter = ";"
        "#;

        let app_config: AppConfiguration = toml::from_str(toml_str).unwrap();
        assert_eq!(app_config.jira.user, "steinar");
        assert!((app_config.report.hours_per_day - 7.5).abs() < f64::EPSILON);
        assert_eq!(app_config.report.order_by, "duration");
        assert_eq!(app_config.report.delimiter, ";");
    }

    /// The `report` section, or parts of it, may be missing from files on disk
    #[test]
    fn test_toml_parsing_with_defaults_generated() {
        let toml_str = r#"
        [jira]
        url = "http"
        user = "steinar"
        "#;
        let app_config: AppConfiguration = toml::from_str(toml_str).unwrap();
        assert_eq!(app_config.report, ReportSettings::default());

        let toml_str = r#"
        [jira]
        url = "http"
        user = "steinar"

        [report]
        hours_per_day = 8.0
        "#;
        let app_config: AppConfiguration = toml::from_str(toml_str).unwrap();
        assert!((app_config.report.days_per_year - 247.0).abs() < f64::EPSILON);
        assert_eq!(app_config.report.delimiter, "\t");
    }

    #[test]
    fn test_write_and_read_toml_file() -> Result<()> {
        let tmp_config_file = std::env::temp_dir()
            .join("worklog-report-test")
            .join("config.toml");
        let cfg = AppConfiguration {
            jira: JiraClientConfiguration {
                url: "http".to_string(),
                user: "steinar".to_string(),
            },
            report: ReportSettings::default(),
        };

        create_configuration_file(&cfg, &tmp_config_file)?;
        let result = read(&tmp_config_file)?;

        assert_eq!(cfg, result);
        Ok(())
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let path = std::env::temp_dir().join("worklog-report-test-does-not-exist.toml");
        match read(&path) {
            Err(WorklogError::ApplicationConfig { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected a configuration error, got {other:?}"),
        }
    }
}
