//! HTML fragment generation for the host settings drawer. Pure text
//! templates: the host owns the DOM, injects these fragments, and routes
//! input events back through the binding registry. The control-id contract
//! (`cts-slider-{varId}`, `cts-number-{varId}`, `cts-{varId}`) is load-
//! bearing; `bindings` resolves the same ids.

use crate::schema::{ControlKind, FieldDescriptor, SelectOption};
use crate::store::{SettingValue, SettingsStore};

const DEFAULT_SLIDER_STEP: f64 = 1.0;

/// Minimal escaping for text and attribute positions.
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Format a slider bound without a trailing `.0` for whole numbers.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Render one field with its current value (stored value when present,
/// otherwise the descriptor default).
pub fn render_field(entry: &FieldDescriptor, value: Option<&SettingValue>) -> String {
    let current = value
        .map(SettingValue::as_css_value)
        .or_else(|| entry.default.clone())
        .unwrap_or_default();

    match &entry.control {
        ControlKind::Slider { min, max, step } => render_slider(entry, *min, *max, *step, &current),
        ControlKind::Color => render_color(entry, &current),
        ControlKind::Text => render_text(entry, &current),
        ControlKind::Checkbox { checked } => {
            let is_checked = match value {
                Some(SettingValue::Flag(flag)) => *flag,
                Some(SettingValue::Text(text)) => text == "true",
                None => *checked,
            };
            render_checkbox(entry, is_checked)
        }
        ControlKind::Select { options } => render_select(entry, options, &current),
    }
}

fn render_slider(entry: &FieldDescriptor, min: f64, max: f64, step: Option<f64>, value: &str) -> String {
    let var_id = escape_html(&entry.var_id);
    let display_text = escape_html(&entry.display_text);
    let value = escape_html(value);
    let min = format_number(min);
    let max = format_number(max);
    let step = format_number(step.unwrap_or(DEFAULT_SLIDER_STEP));

    format!(
        r#"<div class="flex-container alignitemscenter">
  <span>{display_text}</span><br>
  <div class="alignitemscenter flex-container flexFlowColumn flexBasis48p flexGrow flexShrink gap0">
    <input class="neo-range-slider" type="range" id="cts-slider-{var_id}" name="{var_id}" min="{min}" max="{max}" value="{value}" step="{step}">
    <input class="neo-range-input" type="number" id="cts-number-{var_id}" name="{var_id}" min="{min}" max="{max}" value="{value}" step="{step}">
  </div>
</div>"#
    )
}

fn render_color(entry: &FieldDescriptor, value: &str) -> String {
    let var_id = escape_html(&entry.var_id);
    let display_text = escape_html(&entry.display_text);
    let value = escape_html(value);

    format!(
        r#"<div class="flex-container alignItemsBaseline">
  <span>{display_text}</span>
  <toolcool-color-picker id="cts-{var_id}" color="{value}"></toolcool-color-picker>
</div>"#
    )
}

fn render_text(entry: &FieldDescriptor, value: &str) -> String {
    let var_id = escape_html(&entry.var_id);
    let display_text = escape_html(&entry.display_text);
    let value = escape_html(value);

    format!(
        r#"<label class="flex-container alignItemsBaseline">
  <span>{display_text}</span><br>
  <input type="text" class="text_pole wide100p widthNatural flex1 margin0" id="cts-{var_id}" value="{value}" />
</label>"#
    )
}

fn render_checkbox(entry: &FieldDescriptor, checked: bool) -> String {
    let var_id = escape_html(&entry.var_id);
    let display_text = escape_html(&entry.display_text);
    let checked_attr = if checked { " checked" } else { "" };

    format!(
        r#"<label class="checkbox_label alignItemsBaseline">
  <span>{display_text}</span>
  <input id="cts-{var_id}" type="checkbox"{checked_attr}>
</label>"#
    )
}

fn render_select(entry: &FieldDescriptor, options: &[SelectOption], value: &str) -> String {
    let var_id = escape_html(&entry.var_id);
    let display_text = escape_html(&entry.display_text);

    let rendered_options = options
        .iter()
        .map(|option| {
            let selected_attr = if option.value == value { " selected" } else { "" };
            format!(
                r#"    <option value="{}"{selected_attr}>{}</option>"#,
                escape_html(&option.value),
                escape_html(&option.label)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<div class="flex-container alignItemsBaseline">
  <span>{display_text}</span>
  <select class="widthNatural flex1 margin0" id="cts-{var_id}">
{rendered_options}
  </select>
</div>"#
    )
}

/// Render the full settings drawer with both field columns populated. The
/// first half of the schema order lands in row 1, the rest in row 2.
pub fn render_panel(schema: &[FieldDescriptor], store: &SettingsStore) -> String {
    let mut row_1 = String::new();
    let mut row_2 = String::new();

    for (index, entry) in schema.iter().enumerate() {
        let fragment = render_field(entry, store.get(&entry.var_id));
        let target = if index * 2 < schema.len() {
            &mut row_1
        } else {
            &mut row_2
        };
        target.push_str(&fragment);
        target.push('\n');
    }

    drawer_shell(&row_1, &row_2)
}

/// Render the drawer with the empty-state prompt and the insert-template
/// button in place of the field columns.
pub fn render_empty_state() -> String {
    let row_1 = concat!(
        r#"<div class="flex-container flexFlowColumn"><p class="alert-message">"#,
        "No custom theme styles found. Click \"Insert Default CSS Template\" to add example styles.",
        "</p></div>\n"
    );
    let row_2 = concat!(
        r#"<button id="insert-css" class="menu_button menu_button_icon interactable flex1">"#,
        "Insert Default CSS Template</button>\n"
    );

    drawer_shell(row_1, row_2)
}

fn drawer_shell(row_1: &str, row_2: &str) -> String {
    format!(
        r#"<div id="ctsi-drawer" class="inline-drawer wide100p flexFlowColumn">
  <div class="inline-drawer-toggle inline-drawer-header userSettingsInnerExpandable">
    <b>Custom Theme Inputs</b>
    <div class="inline-drawer-icon fa-solid fa-circle-chevron-down down"></div>
  </div>
  <div id="ctsi-drawer-content" style="font-size:small;">
    <div class="flex-container ctsi-container inline-drawer-content flexFlowColumn">
      <div class="flex-container ctsi-flex-container">
        <div id="cts-row-1" class="flex-container flexFlowColumn" style="flex: 1; flex-direction: column;">
{row_1}        </div>
        <div id="cts-row-2" class="flex-container flexFlowColumn" style="flex: 1; flex-direction: column;">
{row_2}        </div>
      </div>
      <div class="flex-container ctsi-button-container">
        <div id="ctsi-copy-to-clipboard" title="Copy to Clipboard" class="menu_button margin0 interactable" tabindex="0">
          <i class="fa-solid fa-copy"></i>
        </div>
        <div id="ctsi-update-customCSS" title="Update customCSS" class="menu_button margin0 interactable" tabindex="0">
          <i class="fa-solid fa-save"></i>
        </div>
        <div id="ctsi-reset-defaults" title="Reset to Defaults" class="menu_button margin0 interactable" tabindex="0">
          <i class="fa-solid fa-undo"></i>
        </div>
      </div>
    </div>
  </div>
</div>"#
    )
}
