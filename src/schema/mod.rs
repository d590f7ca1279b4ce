use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder key produced by broken host templating; never a real id.
const UNDEFINED_KEY: &str = "undefined";

/// One choice of a select control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

/// Control-specific payload of a field, discriminated by the JSON `type` tag.
///
/// Decoding is exhaustive per type: a slider without `min`/`max` or a select
/// without `options` fails to decode and the entry is dropped by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ControlKind {
    Slider {
        min: f64,
        max: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    Color,
    Text,
    Checkbox {
        #[serde(default)]
        checked: bool,
    },
    Select { options: Vec<SelectOption> },
}

impl ControlKind {
    /// Stable name used for logging and render dispatch.
    pub fn name(&self) -> &'static str {
        match self {
            ControlKind::Slider { .. } => "slider",
            ControlKind::Color => "color",
            ControlKind::Text => "text",
            ControlKind::Checkbox { .. } => "checkbox",
            ControlKind::Select { .. } => "select",
        }
    }
}

/// A validated schema entry describing one user-configurable style variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub var_id: String,
    pub display_text: String,
    #[serde(
        default,
        deserialize_with = "deserialize_scalar_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<String>,
    #[serde(flatten)]
    pub control: ControlKind,
}

impl FieldDescriptor {
    fn is_well_formed(&self) -> bool {
        if self.var_id.trim().is_empty() || self.var_id == UNDEFINED_KEY {
            return false;
        }
        if self.display_text.trim().is_empty() {
            return false;
        }
        if let ControlKind::Select { options } = &self.control {
            if options.is_empty() {
                return false;
            }
        }
        true
    }
}

/// Defaults arrive as strings, numbers, or booleans; normalize everything to
/// the store's number-as-string model.
fn deserialize_scalar_default<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(text)) => Ok(Some(text)),
        Some(serde_json::Value::Number(number)) => Ok(Some(number.to_string())),
        Some(serde_json::Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "default must be a scalar, got {other}"
        ))),
    }
}

/// Parse the raw value of the style-inputs custom property into an ordered
/// list of validated descriptors.
///
/// Absent/empty/`none`/empty-quoted input, invalid JSON, and non-array JSON
/// all yield an empty list; parse problems are never fatal. Invalid entries
/// are dropped individually, and among entries sharing a `varId` only the
/// first survives. Source order is preserved; it drives display layout.
pub fn parse_style_inputs(raw: &str) -> Vec<FieldDescriptor> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "none" || trimmed == "\"\"" || trimmed == "''" {
        return Vec::new();
    }

    let decoded: serde_json::Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(?err, "style inputs property is not valid JSON");
            return Vec::new();
        }
    };

    let serde_json::Value::Array(items) = decoded else {
        tracing::debug!("style inputs property is not a JSON array");
        return Vec::new();
    };

    let mut seen_var_ids = HashSet::new();
    let mut fields = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        let entry = match serde_json::from_value::<FieldDescriptor>(item) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(index, %err, "skipping style input entry that failed to decode");
                continue;
            }
        };

        if !entry.is_well_formed() {
            tracing::warn!(
                index,
                var_id = %entry.var_id,
                kind = entry.control.name(),
                "skipping style input entry with missing required fields"
            );
            continue;
        }

        if !seen_var_ids.insert(entry.var_id.clone()) {
            tracing::warn!(
                var_id = %entry.var_id,
                "duplicate varId; only the first occurrence is used"
            );
            continue;
        }

        fields.push(entry);
    }

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slider_json(var_id: &str) -> String {
        format!(
            r#"{{"type":"slider","varId":"{var_id}","displayText":"{var_id}","default":"5","min":0,"max":10}}"#
        )
    }

    #[test]
    fn parse_returns_empty_for_absent_or_sentinel_values() {
        assert!(parse_style_inputs("").is_empty());
        assert!(parse_style_inputs("   ").is_empty());
        assert!(parse_style_inputs("none").is_empty());
        assert!(parse_style_inputs("\"\"").is_empty());
        assert!(parse_style_inputs("''").is_empty());
    }

    #[test]
    fn parse_returns_empty_for_invalid_json_and_non_arrays() {
        assert!(parse_style_inputs("{ not json").is_empty());
        assert!(parse_style_inputs(r#"{"type":"text"}"#).is_empty());
        assert!(parse_style_inputs("42").is_empty());
    }

    #[test]
    fn parse_keeps_well_formed_entries_in_source_order() {
        let raw = format!("[{},{}]", slider_json("a"), slider_json("b"));
        let fields = parse_style_inputs(&raw);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].var_id, "a");
        assert_eq!(fields[1].var_id, "b");
        assert_eq!(fields[0].default.as_deref(), Some("5"));
        assert!(matches!(
            fields[0].control,
            ControlKind::Slider {
                min,
                max,
                step: None
            } if min == 0.0 && max == 10.0
        ));
    }

    #[test]
    fn parse_drops_entries_missing_required_fields() {
        let raw = r#"[
            {"varId":"no-type","displayText":"No type"},
            {"type":"text","displayText":"No varId"},
            {"type":"text","varId":"no-display"},
            {"type":"text","varId":"kept","displayText":"Kept"}
        ]"#;
        let fields = parse_style_inputs(raw);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].var_id, "kept");
    }

    #[test]
    fn parse_drops_sliders_without_bounds() {
        let raw = r#"[{"type":"slider","varId":"x","displayText":"X","default":"1"}]"#;
        assert!(parse_style_inputs(raw).is_empty());
    }

    #[test]
    fn parse_drops_selects_without_options() {
        let raw = r#"[
            {"type":"select","varId":"empty","displayText":"Empty","options":[]},
            {"type":"select","varId":"missing","displayText":"Missing"}
        ]"#;
        assert!(parse_style_inputs(raw).is_empty());
    }

    #[test]
    fn parse_drops_unknown_control_types() {
        let raw = r#"[{"type":"dial","varId":"x","displayText":"X"}]"#;
        assert!(parse_style_inputs(raw).is_empty());
    }

    #[test]
    fn parse_keeps_first_occurrence_of_duplicate_var_ids() {
        let raw = r#"[
            {"type":"text","varId":"dup","displayText":"First","default":"one"},
            {"type":"text","varId":"dup","displayText":"Second","default":"two"},
            {"type":"text","varId":"other","displayText":"Other"}
        ]"#;
        let fields = parse_style_inputs(raw);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].var_id, "dup");
        assert_eq!(fields[0].default.as_deref(), Some("one"));
        assert_eq!(fields[1].var_id, "other");
    }

    #[test]
    fn parse_rejects_undefined_and_blank_var_ids() {
        let raw = r#"[
            {"type":"text","varId":"undefined","displayText":"Broken"},
            {"type":"text","varId":"  ","displayText":"Blank"}
        ]"#;
        assert!(parse_style_inputs(raw).is_empty());
    }

    #[test]
    fn numeric_and_boolean_defaults_normalize_to_strings() {
        let raw = r#"[
            {"type":"slider","varId":"size","displayText":"Size","default":12,"min":0,"max":32},
            {"type":"text","varId":"flag","displayText":"Flag","default":true}
        ]"#;
        let fields = parse_style_inputs(raw);

        assert_eq!(fields[0].default.as_deref(), Some("12"));
        assert_eq!(fields[1].default.as_deref(), Some("true"));
    }

    #[test]
    fn structured_defaults_fail_the_entry_decode() {
        let raw = r#"[{"type":"text","varId":"x","displayText":"X","default":{"nested":1}}]"#;
        assert!(parse_style_inputs(raw).is_empty());
    }

    #[test]
    fn checkbox_and_select_payloads_decode() {
        let raw = r#"[
            {"type":"checkbox","varId":"tick","displayText":"Tick","checked":true},
            {"type":"select","varId":"vis","displayText":"Visibility","default":"hidden",
             "options":[{"label":"visible","value":"visible"},{"label":"hidden","value":"hidden"}]}
        ]"#;
        let fields = parse_style_inputs(raw);

        assert!(matches!(
            fields[0].control,
            ControlKind::Checkbox { checked: true }
        ));
        let ControlKind::Select { options } = &fields[1].control else {
            panic!("expected select control");
        };
        assert_eq!(options.len(), 2);
        assert_eq!(options[1].value, "hidden");
    }

    #[test]
    fn descriptor_round_trips_through_json() {
        let raw = format!("[{}]", slider_json("round"));
        let fields = parse_style_inputs(&raw);
        let serialized = serde_json::to_string(&fields).expect("serialize");
        let reparsed = parse_style_inputs(&serialized);

        assert_eq!(fields, reparsed);
    }
}
