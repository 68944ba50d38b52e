use worklog::config::{self, AppConfiguration};
use worklog::error::WorklogError;

use crate::cli::{ConfigCommand, UpdateConfiguration};

fn config_path() -> String {
    config::configuration_file().map_or_else(|e| e.to_string(), |p| p.to_string_lossy().to_string())
}

fn list() -> Result<(), WorklogError> {
    println!("Configuration file {}:\n", config_path());

    let app_config = config::load()?;
    let toml_as_string = config::application_config_to_string(&app_config)?;
    println!("{toml_as_string}");
    Ok(())
}

fn update(settings: UpdateConfiguration) -> Result<(), WorklogError> {
    let mut app_config: AppConfiguration = config::load()?;
    if let Some(user) = settings.user {
        app_config.jira.user = user;
    }
    if let Some(url) = settings.url {
        app_config.jira.url = url;
    }
    if let Some(token) = settings.token {
        if app_config.jira.user.is_empty() {
            return Err(WorklogError::MissingSetting("user"));
        }
        worklog::store_secret(&app_config.jira.user, &token)?;
        println!("Password of {} stored in the keychain", app_config.jira.user);
    }

    config::save(&app_config)?;
    println!("Configuration saved to {}", config_path());
    Ok(())
}

fn remove() -> Result<(), WorklogError> {
    let app_config = config::load()?;
    if !app_config.jira.user.is_empty() {
        worklog::forget_secret(&app_config.jira.user)?;
    }
    config::remove()?;
    println!("Configuration file {} removed", config_path());
    Ok(())
}

pub fn execute(command: ConfigCommand) -> Result<(), WorklogError> {
    match command {
        ConfigCommand::Update(settings) => update(settings),
        ConfigCommand::List => list(),
        ConfigCommand::Remove => remove(),
    }
}
