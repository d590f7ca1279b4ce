use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::schema::{ControlKind, FieldDescriptor};

const UNDEFINED_KEY: &str = "undefined";

/// A persisted scalar setting. Numbers are carried as text; only checkbox
/// state is a real boolean.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Flag(bool),
    Text(String),
}

impl SettingValue {
    pub fn text(value: impl Into<String>) -> Self {
        SettingValue::Text(value.into())
    }

    /// Rendering used for CSS custom-property values.
    pub fn as_css_value(&self) -> String {
        match self {
            SettingValue::Flag(flag) => flag.to_string(),
            SettingValue::Text(text) => text.clone(),
        }
    }

    /// Only the empty string counts as empty; `Flag(false)` is a value.
    pub fn is_empty(&self) -> bool {
        matches!(self, SettingValue::Text(text) if text.is_empty())
    }
}

impl<'de> Deserialize<'de> for SettingValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Bool(flag) => Ok(SettingValue::Flag(flag)),
            serde_json::Value::String(text) => Ok(SettingValue::Text(text)),
            serde_json::Value::Number(number) => Ok(SettingValue::Text(number.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "unsupported setting value: {other}"
            ))),
        }
    }
}

/// Keys removed and seeded by one reconciliation pass.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ReconcileReport {
    pub removed: Vec<String>,
    pub seeded: Vec<String>,
}

impl ReconcileReport {
    pub fn changed(&self) -> bool {
        !self.removed.is_empty() || !self.seeded.is_empty()
    }
}

/// The persisted mapping from `varId` to its current value. The single
/// source of truth for user edits; the schema is re-derived from CSS text
/// and never persisted itself.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsStore {
    #[serde(default)]
    entries: BTreeMap<String, SettingValue>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var_id: &str) -> Option<&SettingValue> {
        self.entries.get(var_id)
    }

    pub fn insert(&mut self, var_id: impl Into<String>, value: SettingValue) {
        self.entries.insert(var_id.into(), value);
    }

    pub fn remove(&mut self, var_id: &str) -> Option<SettingValue> {
        self.entries.remove(var_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.entries.iter()
    }

    /// Drop every entry, returning the keys that were present.
    pub fn clear(&mut self) -> Vec<String> {
        let removed = self.entries.keys().cloned().collect();
        self.entries.clear();
        removed
    }

    /// Align the store with the current schema: prune entries whose key no
    /// longer appears in it (or was never a real key), then seed defaults
    /// for descriptors that have no stored value yet. Entries that survive
    /// are left untouched; only explicit edits or a reset overwrite them.
    ///
    /// Running this twice with the same schema is a no-op the second time.
    pub fn reconcile(&mut self, schema: &[FieldDescriptor]) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        let current_ids: Vec<&str> = schema.iter().map(|entry| entry.var_id.as_str()).collect();
        let obsolete: Vec<String> = self
            .entries
            .keys()
            .filter(|key| {
                key.is_empty()
                    || key.as_str() == UNDEFINED_KEY
                    || !current_ids.contains(&key.as_str())
            })
            .cloned()
            .collect();
        for key in obsolete {
            tracing::debug!(var_id = %key, "pruning obsolete settings entry");
            self.entries.remove(&key);
            report.removed.push(key);
        }

        for entry in schema {
            if entry.var_id.is_empty() || entry.var_id == UNDEFINED_KEY {
                continue;
            }
            if self.entries.contains_key(&entry.var_id) {
                continue;
            }
            self.entries
                .insert(entry.var_id.clone(), seeded_value(entry));
            report.seeded.push(entry.var_id.clone());
        }

        report
    }
}

/// Default stored value for a field that has never been edited.
fn seeded_value(entry: &FieldDescriptor) -> SettingValue {
    match &entry.control {
        ControlKind::Checkbox { checked } => SettingValue::Flag(*checked),
        ControlKind::Select { options } => {
            let chosen = options
                .iter()
                .find(|option| Some(option.value.as_str()) == entry.default.as_deref())
                .or_else(|| options.first());
            SettingValue::Text(chosen.map(|option| option.value.clone()).unwrap_or_default())
        }
        _ => SettingValue::Text(entry.default.clone().unwrap_or_default()),
    }
}
