use std::collections::BTreeMap;

use crate::store::SettingsStore;

const UNDEFINED_KEY: &str = "undefined";

/// Seam between the engine and the host document: wherever document-level
/// custom properties actually live (a DOM bridge, a generated stylesheet),
/// the engine only ever sets and clears them through this trait.
pub trait CssVariableWriter {
    fn set_property(&mut self, name: &str, value: &str);
    fn clear_property(&mut self, name: &str);
}

/// In-memory variable writer for hosts that consume a generated stylesheet
/// instead of a live document. Tracks the full projected set so obsolete
/// properties can be cleared on the next render.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DocumentVariables {
    properties: BTreeMap<String, String>,
}

impl DocumentVariables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn property_names(&self) -> impl Iterator<Item = &String> {
        self.properties.keys()
    }

    pub fn clear_all(&mut self) {
        self.properties.clear();
    }

    /// Render the projected set as a `:root` declaration block.
    pub fn to_root_block(&self) -> String {
        let mut block = String::from(":root {\n");
        for (name, value) in &self.properties {
            block.push_str(&format!("  {name}: {value};\n"));
        }
        block.push('}');
        block.push('\n');
        block
    }
}

impl CssVariableWriter for DocumentVariables {
    fn set_property(&mut self, name: &str, value: &str) {
        self.properties.insert(name.to_string(), value.to_string());
    }

    fn clear_property(&mut self, name: &str) {
        self.properties.remove(name);
    }
}

/// Project every store entry as a `--{varId}` custom property.
pub fn project_store<W: CssVariableWriter + ?Sized>(writer: &mut W, store: &SettingsStore) {
    for (var_id, _) in store.iter() {
        project_entry(writer, store, var_id);
    }
}

/// Project a single store entry. A non-empty `{varId}-unit` companion entry
/// is appended as a suffix. Keys that are empty or `"undefined"` and values
/// that render as the empty string are skipped: the property is left unset
/// rather than set to empty.
pub fn project_entry<W: CssVariableWriter + ?Sized>(
    writer: &mut W,
    store: &SettingsStore,
    var_id: &str,
) {
    if var_id.is_empty() || var_id == UNDEFINED_KEY {
        return;
    }
    let Some(value) = store.get(var_id) else {
        return;
    };

    let mut css_value = value.as_css_value();
    let unit = store
        .get(&format!("{var_id}-unit"))
        .map(|unit| unit.as_css_value())
        .unwrap_or_default();
    if !unit.is_empty() {
        css_value.push_str(&unit);
    }

    if css_value.is_empty() {
        return;
    }

    writer.set_property(&format!("--{var_id}"), &css_value);
}
