use crate::bindings::BindingRegistry;
use crate::clipboard::ClipboardBackend;
use crate::config;
use crate::css;
use crate::error::AppResult;
use crate::render;
use crate::schema::{self, ControlKind, FieldDescriptor};
use crate::state::{LifecycleMachine, SyncEvent};
use crate::storage::{FileSettingsStorage, SettingsPersistence};
use crate::store::{ReconcileReport, SettingValue, SettingsStore};
use crate::vars::{self, CssVariableWriter, DocumentVariables};

/// Result of a full rebuild: the drawer HTML the host injects, plus what
/// reconciliation did to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub panel_html: String,
    pub report: ReconcileReport,
}

/// The settings-synchronization manager.
///
/// Owns the injected store and the projected variable set; everything else
/// (persistence, clipboard, the document itself) is an external
/// collaborator. All methods are synchronous and run on the host's single
/// logical thread.
pub struct SettingsSync {
    store: SettingsStore,
    vars: DocumentVariables,
    bindings: BindingRegistry,
    lifecycle: LifecycleMachine,
    last_schema: Option<Vec<FieldDescriptor>>,
    persistence: Box<dyn SettingsPersistence>,
    style_property: String,
}

impl SettingsSync {
    pub fn new(store: SettingsStore, persistence: Box<dyn SettingsPersistence>) -> Self {
        Self {
            store,
            vars: DocumentVariables::new(),
            bindings: BindingRegistry::new(),
            lifecycle: LifecycleMachine::new(),
            last_schema: None,
            persistence,
            style_property: css::STYLE_INPUTS_PROPERTY.to_string(),
        }
    }

    pub fn with_style_property(mut self, property: impl Into<String>) -> Self {
        self.style_property = property.into();
        self
    }

    pub fn store(&self) -> &SettingsStore {
        &self.store
    }

    pub fn vars(&self) -> &DocumentVariables {
        &self.vars
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle.is_ready()
    }

    pub fn field_count(&self) -> usize {
        self.last_schema.as_ref().map_or(0, Vec::len)
    }

    fn parse_schema(&self, css_text: &str) -> Vec<FieldDescriptor> {
        css::extract_property(css_text, &self.style_property)
            .map(|raw| schema::parse_style_inputs(&raw))
            .unwrap_or_default()
    }

    /// Host signal: the application finished booting. Parses the schema out
    /// of the CSS text, reconciles the store, projects every variable
    /// (freshly seeded defaults included), and returns the drawer HTML.
    pub fn handle_app_ready(&mut self, css_text: &str) -> SyncOutcome {
        self.lifecycle.apply(SyncEvent::HostReady);
        let current = self.parse_schema(css_text);
        let outcome = self.rebuild(&current);
        self.last_schema = Some(current);
        outcome
    }

    /// Host signal: settings changed externally. Suppressed until the ready
    /// signal has been seen; after that, a structural diff against the
    /// last-seen schema decides whether anything is rebuilt.
    pub fn handle_settings_updated(&mut self, css_text: &str) -> Option<SyncOutcome> {
        if !self.lifecycle.apply(SyncEvent::SettingsChanged) {
            return None;
        }

        let current = self.parse_schema(css_text);
        if self.last_schema.as_deref() == Some(current.as_slice()) {
            tracing::debug!("style inputs unchanged; skipping rebuild");
            return None;
        }

        tracing::info!("style inputs changed; regenerating settings UI");
        let outcome = self.rebuild(&current);
        self.last_schema = Some(current);
        Some(outcome)
    }

    fn rebuild(&mut self, current: &[FieldDescriptor]) -> SyncOutcome {
        if current.is_empty() {
            let removed = self.store.clear();
            self.vars.clear_all();
            self.bindings.clear();
            if !removed.is_empty() {
                self.request_save();
            }
            tracing::info!("no style inputs found; rendering empty state");
            return SyncOutcome {
                panel_html: render::render_empty_state(),
                report: ReconcileReport {
                    removed,
                    seeded: Vec::new(),
                },
            };
        }

        let report = self.store.reconcile(current);
        for key in &report.removed {
            self.vars.clear_property(&format!("--{key}"));
        }
        vars::project_store(&mut self.vars, &self.store);
        self.bindings.rebuild(current);
        if report.changed() {
            self.request_save();
        }
        tracing::debug!(
            fields = current.len(),
            seeded = report.seeded.len(),
            removed = report.removed.len(),
            "reconciled settings against schema"
        );

        SyncOutcome {
            panel_html: render::render_panel(current, &self.store),
            report,
        }
    }

    /// Route a control input event into the store. Unknown control ids are
    /// dropped with a warning; they are a host wiring problem, not ours.
    pub fn apply_input(&mut self, control_id: &str, value: SettingValue) -> bool {
        let Some(binding) = self.bindings.resolve(control_id) else {
            tracing::warn!(control_id, "input from unbound control ignored");
            return false;
        };

        let var_id = binding.var_id.clone();
        tracing::debug!(control_id, var_id = %var_id, "applying control input");
        self.store.insert(var_id.clone(), value);
        self.request_save();

        vars::project_entry(&mut self.vars, &self.store, &var_id);
        // A `-unit` companion changes how its base variable renders.
        if let Some(base) = var_id.strip_suffix("-unit") {
            vars::project_entry(&mut self.vars, &self.store, base);
        }
        true
    }

    /// Clear every stored value and reseed from the current schema.
    pub fn reset_to_defaults(&mut self, css_text: &str) -> SyncOutcome {
        tracing::info!("resetting settings to schema defaults");
        self.store.clear();
        self.vars.clear_all();

        let current = self.parse_schema(css_text);
        let outcome = self.rebuild(&current);
        self.last_schema = Some(current);
        self.request_save();
        outcome
    }

    /// Regenerate the `:root` schema block: last-seen field metadata with
    /// each default/checked replaced by the current stored value. `None`
    /// until a schema has been seen.
    pub fn generate_css_content(&self) -> Option<String> {
        let current = self.last_schema.as_ref()?;
        let entries: Vec<FieldDescriptor> = current
            .iter()
            .map(|entry| self.with_current_value(entry))
            .collect();
        let json = match serde_json::to_string_pretty(&entries) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!(?err, "failed to serialize style inputs");
                return None;
            }
        };
        Some(css::format_style_inputs_block(&self.style_property, &json))
    }

    fn with_current_value(&self, entry: &FieldDescriptor) -> FieldDescriptor {
        let mut updated = entry.clone();
        match self.store.get(&entry.var_id) {
            Some(SettingValue::Flag(flag)) => {
                if let ControlKind::Checkbox { checked } = &mut updated.control {
                    *checked = *flag;
                } else {
                    updated.default = Some(flag.to_string());
                }
            }
            Some(SettingValue::Text(text)) => {
                if let ControlKind::Checkbox { checked } = &mut updated.control {
                    *checked = text == "true";
                } else {
                    updated.default = Some(text.clone());
                }
            }
            None => {}
        }
        updated
    }

    /// Splice the regenerated schema block over the existing `:root` block.
    /// Text without a balanced `:root` block comes back unchanged.
    pub fn update_stylesheet_text(&self, existing: &str) -> String {
        match self.generate_css_content() {
            Some(content) => css::splice_root_block(existing, &content),
            None => existing.to_string(),
        }
    }

    /// Copy the regenerated schema block to the clipboard collaborator.
    /// Failures are logged; there is no user-facing recovery.
    pub fn copy_css(&self, backend: &dyn ClipboardBackend) -> bool {
        let Some(content) = self.generate_css_content() else {
            tracing::warn!("nothing to copy; no schema has been seen yet");
            return false;
        };
        match backend.copy_text(&content) {
            Ok(()) => {
                tracing::info!("generated CSS copied to clipboard");
                true
            }
            Err(err) => {
                tracing::warn!(?err, "failed to copy generated CSS to clipboard");
                false
            }
        }
    }

    /// Current drawer HTML without mutating anything.
    pub fn panel_html(&self) -> String {
        match self.last_schema.as_deref() {
            None | Some([]) => render::render_empty_state(),
            Some(current) => render::render_panel(current, &self.store),
        }
    }

    /// UI teardown: drop every control binding.
    pub fn teardown(&mut self) {
        tracing::debug!(bindings = self.bindings.len(), "tearing down settings UI bindings");
        self.bindings.clear();
    }

    fn request_save(&self) {
        if let Err(err) = self.persistence.save(&self.store) {
            tracing::warn!(?err, "failed to persist settings");
        }
    }
}

/// Counts reported by a startup sync pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    pub fields: usize,
    pub seeded: usize,
    pub removed: usize,
}

/// File-backed host binding: reads the stylesheet carrying the schema,
/// drives the manager through the ready signal, and materializes the
/// projected variables as a generated stylesheet.
pub struct App {
    sync: SettingsSync,
    storage: FileSettingsStorage,
}

impl App {
    pub fn new() -> AppResult<Self> {
        let app_config = config::load_app_config();
        let storage = FileSettingsStorage::from_app_config(&app_config)?;
        let store = storage.load_settings()?;

        let mut sync = SettingsSync::new(store, Box::new(storage.clone()));
        if let Some(property) = app_config.style_property {
            sync = sync.with_style_property(property);
        }

        Ok(Self { sync, storage })
    }

    pub fn with_storage(storage: FileSettingsStorage) -> AppResult<Self> {
        let store = storage.load_settings()?;
        let sync = SettingsSync::new(store, Box::new(storage.clone()));
        Ok(Self { sync, storage })
    }

    pub fn sync(&self) -> &SettingsSync {
        &self.sync
    }

    pub fn sync_mut(&mut self) -> &mut SettingsSync {
        &mut self.sync
    }

    /// The "application ready" pass: parse, reconcile, project, and write
    /// the generated variables stylesheet.
    pub fn start(&mut self) -> AppResult<SyncSummary> {
        let css_text = self.storage.read_stylesheet()?;
        let outcome = self.sync.handle_app_ready(&css_text);
        self.storage.write_vars(&self.sync.vars().to_root_block())?;

        Ok(SyncSummary {
            fields: self.sync.field_count(),
            seeded: outcome.report.seeded.len(),
            removed: outcome.report.removed.len(),
        })
    }

    /// The "settings changed externally" pass. Returns whether a rebuild
    /// happened.
    pub fn refresh(&mut self) -> AppResult<bool> {
        let css_text = self.storage.read_stylesheet()?;
        match self.sync.handle_settings_updated(&css_text) {
            Some(_) => {
                self.storage.write_vars(&self.sync.vars().to_root_block())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Splice the regenerated schema block into the stylesheet on disk.
    pub fn update_stylesheet(&mut self) -> AppResult<()> {
        let existing = self.storage.read_stylesheet()?;
        let updated = self.sync.update_stylesheet_text(&existing);
        self.storage.write_stylesheet(&updated)?;
        Ok(())
    }

    /// Prepend the starter template to the stylesheet on disk.
    pub fn insert_default_template(&mut self) -> AppResult<()> {
        let existing = self.storage.read_stylesheet()?;
        self.storage
            .write_stylesheet(&css::insert_default_template(&existing))?;
        Ok(())
    }
}
