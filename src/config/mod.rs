use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigPathError {
    MissingHomeDirectory,
}

const APP_DIR: &str = "themevars";
const APP_CONFIG_FILE: &str = "config.json";

/// Application-level settings from `config.json`.
///
/// Every field is optional; the defaults point at files inside the
/// `themevars` config directory itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct AppConfig {
    /// Stylesheet holding the `:root` block with the embedded schema.
    #[serde(default)]
    pub(crate) css_file: Option<PathBuf>,
    /// Output file for the projected `--{varId}` custom properties.
    #[serde(default)]
    pub(crate) vars_file: Option<PathBuf>,
    /// Custom property carrying the schema JSON, when the host renames it.
    #[serde(default)]
    pub(crate) style_property: Option<String>,
}

pub(crate) fn load_app_config() -> AppConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_app_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_app_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> AppConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(p) => p,
        Err(_) => return AppConfig::default(),
    };
    if !path.exists() {
        return AppConfig::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|err| {
            tracing::warn!(?err, ?path, "failed to parse config.json; using defaults");
            AppConfig::default()
        }),
        Err(err) => {
            tracing::warn!(?err, ?path, "failed to read config.json; using defaults");
            AppConfig::default()
        }
    }
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

/// Resolve a data file inside the app config directory, honoring an
/// absolute or relative override from `config.json`.
pub(crate) fn app_data_path(
    file_name: &str,
    override_path: Option<&Path>,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    match override_path {
        Some(path) if path.is_absolute() => Ok(path.to_path_buf()),
        Some(path) => {
            let mut resolved = config_root(xdg_config_home, home)?;
            resolved.push(APP_DIR);
            resolved.push(path);
            Ok(resolved)
        }
        None => app_config_path(APP_DIR, file_name, xdg_config_home, home),
    }
}

fn config_root(
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> Result<PathBuf, ConfigPathError> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigPathError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
