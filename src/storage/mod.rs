use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::{self, AppConfig, ConfigPathError};
use crate::store::SettingsStore;

const SETTINGS_FILE: &str = "settings.json";
const STYLESHEET_FILE: &str = "custom.css";
const VARS_FILE: &str = "theme-vars.css";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read settings: {path}")]
    ReadSettings {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write settings: {path}")]
    WriteSettings {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode settings")]
    EncodeSettings(#[from] serde_json::Error),
    #[error("failed to read stylesheet: {path}")]
    ReadStylesheet {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write stylesheet: {path}")]
    WriteStylesheet {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write generated variables: {path}")]
    WriteVars {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// External persistence collaborator. The engine calls `save` fire-and-
/// forget after every store mutation; debouncing, if any, belongs to the
/// implementation.
pub trait SettingsPersistence {
    fn load(&self) -> StorageResult<SettingsStore>;
    fn save(&self, store: &SettingsStore) -> StorageResult<()>;
}

/// File-backed persistence: settings JSON, the host stylesheet carrying the
/// schema, and the generated variables stylesheet.
#[derive(Debug, Clone)]
pub struct FileSettingsStorage {
    settings_path: PathBuf,
    stylesheet_path: PathBuf,
    vars_path: PathBuf,
}

impl FileSettingsStorage {
    pub const fn with_paths(
        settings_path: PathBuf,
        stylesheet_path: PathBuf,
        vars_path: PathBuf,
    ) -> Self {
        Self {
            settings_path,
            stylesheet_path,
            vars_path,
        }
    }

    pub fn with_default_paths() -> StorageResult<Self> {
        Self::from_app_config(&AppConfig::default())
    }

    pub(crate) fn from_app_config(app_config: &AppConfig) -> StorageResult<Self> {
        let (xdg_config_home, home) = config::config_env_dirs();
        let resolve = |file_name: &str, override_path: Option<&Path>| {
            config::app_data_path(
                file_name,
                override_path,
                xdg_config_home.as_deref(),
                home.as_deref(),
            )
            .map_err(|error| match error {
                ConfigPathError::MissingHomeDirectory => StorageError::MissingHomeDirectory,
            })
        };

        Ok(Self::with_paths(
            resolve(SETTINGS_FILE, None)?,
            resolve(STYLESHEET_FILE, app_config.css_file.as_deref())?,
            resolve(VARS_FILE, app_config.vars_file.as_deref())?,
        ))
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn stylesheet_path(&self) -> &Path {
        &self.stylesheet_path
    }

    pub fn vars_path(&self) -> &Path {
        &self.vars_path
    }

    /// Missing file yields an empty store; a file that fails to parse is
    /// logged and also yields an empty store rather than failing startup.
    pub fn load_settings(&self) -> StorageResult<SettingsStore> {
        if !self.settings_path.exists() {
            return Ok(SettingsStore::new());
        }
        let serialized =
            fs::read_to_string(&self.settings_path).map_err(|source| StorageError::ReadSettings {
                path: self.settings_path.clone(),
                source,
            })?;
        Ok(serde_json::from_str(&serialized).unwrap_or_else(|err| {
            tracing::warn!(
                ?err,
                path = %self.settings_path.display(),
                "failed to parse persisted settings; starting from an empty store"
            );
            SettingsStore::new()
        }))
    }

    pub fn save_settings(&self, store: &SettingsStore) -> StorageResult<()> {
        if let Some(parent) = self.settings_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::WriteSettings {
                path: self.settings_path.clone(),
                source,
            })?;
        }
        let serialized = serde_json::to_string_pretty(store)?;
        fs::write(&self.settings_path, serialized).map_err(|source| {
            StorageError::WriteSettings {
                path: self.settings_path.clone(),
                source,
            }
        })
    }

    /// A missing stylesheet is the "no fields" case, not an error.
    pub fn read_stylesheet(&self) -> StorageResult<String> {
        if !self.stylesheet_path.exists() {
            tracing::debug!(
                path = %self.stylesheet_path.display(),
                "stylesheet missing; treating as empty"
            );
            return Ok(String::new());
        }
        fs::read_to_string(&self.stylesheet_path).map_err(|source| StorageError::ReadStylesheet {
            path: self.stylesheet_path.clone(),
            source,
        })
    }

    pub fn write_stylesheet(&self, css: &str) -> StorageResult<()> {
        write_with_parents(&self.stylesheet_path, css)
            .map_err(|source| StorageError::WriteStylesheet {
                path: self.stylesheet_path.clone(),
                source,
            })
    }

    pub fn write_vars(&self, css: &str) -> StorageResult<()> {
        write_with_parents(&self.vars_path, css).map_err(|source| StorageError::WriteVars {
            path: self.vars_path.clone(),
            source,
        })
    }
}

fn write_with_parents(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

impl SettingsPersistence for FileSettingsStorage {
    fn load(&self) -> StorageResult<SettingsStore> {
        self.load_settings()
    }

    fn save(&self, store: &SettingsStore) -> StorageResult<()> {
        self.save_settings(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SettingValue;

    fn fixture_root() -> PathBuf {
        let mut path = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());
        let pid = std::process::id();
        path.push(format!("themevars-storage-{pid}-{nanos}"));
        path
    }

    fn with_temp_root<F: FnOnce(&Path)>(f: F) {
        let root = fixture_root();
        fs::create_dir_all(&root).unwrap();
        f(&root);
        let _ = fs::remove_dir_all(&root);
    }

    fn storage_at(root: &Path) -> FileSettingsStorage {
        FileSettingsStorage::with_paths(
            root.join("settings.json"),
            root.join("custom.css"),
            root.join("theme-vars.css"),
        )
    }

    #[test]
    fn load_settings_defaults_to_empty_store_when_missing() {
        with_temp_root(|root| {
            let store = storage_at(root).load_settings().unwrap();
            assert!(store.is_empty());
        });
    }

    #[test]
    fn settings_round_trip_through_the_filesystem() {
        with_temp_root(|root| {
            let storage = storage_at(root);
            let mut store = SettingsStore::new();
            store.insert("size", SettingValue::text("12"));
            store.insert("rounded", SettingValue::Flag(true));

            storage.save_settings(&store).unwrap();
            let restored = storage.load_settings().unwrap();

            assert_eq!(store, restored);
        });
    }

    #[test]
    fn corrupt_settings_degrade_to_an_empty_store() {
        with_temp_root(|root| {
            let storage = storage_at(root);
            fs::write(storage.settings_path(), "{ not json").unwrap();

            let store = storage.load_settings().unwrap();
            assert!(store.is_empty());
        });
    }

    #[test]
    fn missing_stylesheet_reads_as_empty_text() {
        with_temp_root(|root| {
            let css = storage_at(root).read_stylesheet().unwrap();
            assert!(css.is_empty());
        });
    }

    #[test]
    fn stylesheet_write_and_read_round_trip() {
        with_temp_root(|root| {
            let storage = storage_at(root);
            storage.write_stylesheet(":root { --a: 1; }").unwrap();
            assert_eq!(storage.read_stylesheet().unwrap(), ":root { --a: 1; }");
        });
    }

    #[test]
    fn write_vars_creates_missing_parent_directories() {
        with_temp_root(|root| {
            let storage = FileSettingsStorage::with_paths(
                root.join("settings.json"),
                root.join("custom.css"),
                root.join("generated/theme-vars.css"),
            );

            storage.write_vars(":root {\n  --a: 1;\n}\n").unwrap();
            let written = fs::read_to_string(storage.vars_path()).unwrap();
            assert!(written.contains("--a: 1;"));
        });
    }

    #[test]
    fn save_settings_creates_missing_parent_directories() {
        with_temp_root(|root| {
            let storage = FileSettingsStorage::with_paths(
                root.join("nested/settings.json"),
                root.join("custom.css"),
                root.join("theme-vars.css"),
            );

            storage.save_settings(&SettingsStore::new()).unwrap();
            assert!(storage.settings_path().exists());
        });
    }
}
