//! Explicit control-to-store wiring. The registry maps every rendered
//! control id to its store key, is rebuilt whenever the schema changes, and
//! is cleared on UI teardown so stale handlers cannot leak across rebuilds.

use std::collections::HashMap;

use crate::schema::{ControlKind, FieldDescriptor};

/// Which rendered control a binding belongs to. Slider fields register two
/// controls (range + number) that the host keeps visually in sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlRole {
    Slider,
    SliderNumber,
    Color,
    Text,
    Checkbox,
    Select,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub var_id: String,
    pub role: ControlRole,
}

#[derive(Debug, Default)]
pub struct BindingRegistry {
    by_control: HashMap<String, Binding>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the registry from a schema, replacing all prior bindings.
    pub fn rebuild(&mut self, schema: &[FieldDescriptor]) {
        self.by_control.clear();
        for entry in schema {
            match &entry.control {
                ControlKind::Slider { .. } => {
                    self.register(
                        format!("cts-slider-{}", entry.var_id),
                        &entry.var_id,
                        ControlRole::Slider,
                    );
                    self.register(
                        format!("cts-number-{}", entry.var_id),
                        &entry.var_id,
                        ControlRole::SliderNumber,
                    );
                }
                ControlKind::Color => {
                    self.register(format!("cts-{}", entry.var_id), &entry.var_id, ControlRole::Color);
                }
                ControlKind::Text => {
                    self.register(format!("cts-{}", entry.var_id), &entry.var_id, ControlRole::Text);
                }
                ControlKind::Checkbox { .. } => {
                    self.register(
                        format!("cts-{}", entry.var_id),
                        &entry.var_id,
                        ControlRole::Checkbox,
                    );
                }
                ControlKind::Select { .. } => {
                    self.register(
                        format!("cts-{}", entry.var_id),
                        &entry.var_id,
                        ControlRole::Select,
                    );
                }
            }
        }
    }

    fn register(&mut self, control_id: String, var_id: &str, role: ControlRole) {
        self.by_control.insert(
            control_id,
            Binding {
                var_id: var_id.to_string(),
                role,
            },
        );
    }

    pub fn resolve(&self, control_id: &str) -> Option<&Binding> {
        self.by_control.get(control_id)
    }

    /// Drop a single binding; the unsubscribe analog for one control.
    pub fn unregister(&mut self, control_id: &str) -> bool {
        self.by_control.remove(control_id).is_some()
    }

    /// Drop everything; called on UI teardown.
    pub fn clear(&mut self) {
        self.by_control.clear();
    }

    pub fn len(&self) -> usize {
        self.by_control.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_control.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::parse_style_inputs;

    const SCHEMA: &str = r##"[
        {"type":"slider","varId":"size","displayText":"Size","default":"5","min":0,"max":32},
        {"type":"color","varId":"bg","displayText":"Background","default":"#fff"},
        {"type":"checkbox","varId":"tick","displayText":"Tick"}
    ]"##;

    #[test]
    fn rebuild_registers_both_slider_controls() {
        let mut registry = BindingRegistry::new();
        registry.rebuild(&parse_style_inputs(SCHEMA));

        assert_eq!(registry.len(), 4);
        let slider = registry.resolve("cts-slider-size").expect("slider binding");
        assert_eq!(slider.var_id, "size");
        assert_eq!(slider.role, ControlRole::Slider);
        let number = registry.resolve("cts-number-size").expect("number binding");
        assert_eq!(number.role, ControlRole::SliderNumber);
    }

    #[test]
    fn rebuild_replaces_prior_bindings() {
        let mut registry = BindingRegistry::new();
        registry.rebuild(&parse_style_inputs(SCHEMA));
        registry.rebuild(&parse_style_inputs(
            r#"[{"type":"text","varId":"only","displayText":"Only"}]"#,
        ));

        assert_eq!(registry.len(), 1);
        assert!(registry.resolve("cts-slider-size").is_none());
        assert!(registry.resolve("cts-only").is_some());
    }

    #[test]
    fn unknown_controls_do_not_resolve() {
        let mut registry = BindingRegistry::new();
        registry.rebuild(&parse_style_inputs(SCHEMA));

        assert!(registry.resolve("cts-missing").is_none());
        assert!(registry.resolve("cts-slider-bg").is_none());
    }

    #[test]
    fn unregister_reports_whether_a_binding_existed() {
        let mut registry = BindingRegistry::new();
        registry.rebuild(&parse_style_inputs(SCHEMA));

        assert!(registry.unregister("cts-tick"));
        assert!(!registry.unregister("cts-tick"));
        assert!(registry.resolve("cts-tick").is_none());
    }

    #[test]
    fn clear_empties_the_registry() {
        let mut registry = BindingRegistry::new();
        registry.rebuild(&parse_style_inputs(SCHEMA));
        registry.clear();

        assert!(registry.is_empty());
    }
}
