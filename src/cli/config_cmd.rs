//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::CONFIG_KEYS;
use crate::domain::error::ConfigError;

use super::args::ConfigAction;
use super::presenter::Presenter;

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: String,
) -> Result<(), ConfigError> {
    let mut config = store.load().await?;
    if !config.set(key, value) {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }
    store.save(&config).await?;
    presenter.success(&format!("Set {}", key));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    let config = store.load().await?;
    match config.get(key) {
        Some(Some(value)) => presenter.output(value),
        Some(None) => presenter.output("(auto-detect)"),
        None => return Err(ConfigError::UnknownKey(key.to_string())),
    }
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in CONFIG_KEYS {
        let value = config.get(key).flatten().unwrap_or("(auto-detect)");
        presenter.output(&format!("{} = {}", key, value));
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().display().to_string());
    Ok(())
}
