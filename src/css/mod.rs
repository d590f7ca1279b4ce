//! Single top-level block scanner for free-form CSS text. Not a CSS parser:
//! it only locates the first `:root { ... }` block by brace counting, reads
//! one custom property out of it, and splices replacement content over it.

/// Opening marker of the block the engine owns.
pub const ROOT_BLOCK_MARKER: &str = ":root {";

/// Custom property carrying the embedded schema JSON.
pub const STYLE_INPUTS_PROPERTY: &str = "--custom-theme-style-inputs";

/// Byte offsets of a located `:root` block. `end` points one past the
/// closing brace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RootBlock {
    start: usize,
    body_start: usize,
    body_end: usize,
    end: usize,
}

/// Locate the first `:root { ... }` block: find the marker, then scan
/// forward with a brace-depth counter starting at 1 until it returns to 0.
/// Returns `None` when the marker is absent or the braces never balance
/// (malformed CSS is treated as "no block"; the caller must not splice).
fn locate_root_block(css: &str) -> Option<RootBlock> {
    let start = css.find(ROOT_BLOCK_MARKER)?;
    let body_start = start + ROOT_BLOCK_MARKER.len();

    let mut depth: usize = 1;
    for (offset, ch) in css[body_start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let body_end = body_start + offset;
                    return Some(RootBlock {
                        start,
                        body_start,
                        body_end,
                        end: body_end + 1,
                    });
                }
            }
            _ => {}
        }
    }

    tracing::debug!("root block marker found but braces never balance; treating as absent");
    None
}

/// Replace the first `:root` block with `replacement`: the block is removed,
/// the remainder's tail is trimmed, and the replacement is prepended. When
/// no balanced block exists the input is returned unchanged.
pub fn splice_root_block(css: &str, replacement: &str) -> String {
    let Some(block) = locate_root_block(css) else {
        return css.to_string();
    };

    let mut remainder = String::with_capacity(css.len());
    remainder.push_str(&css[..block.start]);
    remainder.push_str(css[block.end..].trim());

    format!("{replacement}\n{remainder}")
}

/// Read the raw value of `name` from inside the first `:root` block.
///
/// The value runs from the colon to the first `;` outside brackets, or to
/// the end of the block. This keeps multi-line JSON array values intact.
pub fn extract_property(css: &str, name: &str) -> Option<String> {
    let block = locate_root_block(css)?;
    let body = &css[block.body_start..block.body_end];

    let mut search_from = 0;
    while let Some(found) = body[search_from..].find(name) {
        let name_start = search_from + found;
        let name_end = name_start + name.len();
        search_from = name_end;

        // Reject matches embedded in a longer identifier.
        let boundary_before = body[..name_start]
            .chars()
            .next_back()
            .is_none_or(|ch| ch.is_whitespace() || ch == ';');
        if !boundary_before {
            continue;
        }

        let after = body[name_end..].trim_start();
        let Some(value_text) = after.strip_prefix(':') else {
            continue;
        };

        let mut depth: usize = 0;
        let mut value_end = value_text.len();
        for (offset, ch) in value_text.char_indices() {
            match ch {
                '[' | '{' | '(' => depth += 1,
                ']' | '}' | ')' => depth = depth.saturating_sub(1),
                ';' if depth == 0 => {
                    value_end = offset;
                    break;
                }
                _ => {}
            }
        }

        return Some(value_text[..value_end].trim().to_string());
    }

    None
}

/// Wrap serialized schema JSON as the `:root` block the host stylesheet
/// carries.
pub fn format_style_inputs_block(property: &str, json: &str) -> String {
    format!(":root {{\n  {property}: {json}\n}}")
}

/// Starter stylesheet offered when no schema is present yet: an example
/// schema block plus rules consuming the projected variables.
pub const DEFAULT_CSS_TEMPLATE: &str = r#":root {
  --custom-theme-style-inputs: [
  {
    "type": "slider",
    "varId": "panel-font-size",
    "displayText": "Panel font size",
    "default": "14",
    "min": 8,
    "max": 32,
    "step": 1
  },
  {
    "type": "color",
    "varId": "panel-background",
    "displayText": "Panel background",
    "default": "rgba(149, 78, 178, 0.4)"
  },
  {
    "type": "text",
    "varId": "panel-animation-duration",
    "displayText": "Animation duration",
    "default": "0.1s"
  },
  {
    "type": "select",
    "varId": "panel-visibility",
    "displayText": "Panel visibility",
    "default": "visible",
    "options": [
      {
        "label": "visible",
        "value": "visible"
      },
      {
        "label": "hidden",
        "value": "hidden"
      }
    ]
  }
]
}

/* Sliders are unitless; multiply by the unit where the variable is used. */
.themed-panel {
  background: var(--panel-background);
  font-size: calc(var(--panel-font-size) * 1px);
  visibility: var(--panel-visibility);
  transition-duration: var(--panel-animation-duration);
}
"#;

/// Prepend the starter template to existing CSS text.
pub fn insert_default_template(css: &str) -> String {
    format!("{DEFAULT_CSS_TEMPLATE}\n{css}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_removes_the_root_block_and_prepends_replacement() {
        let css = ":root { --a: 1; --b: 2; }\n.foo{color:red}";
        let spliced = splice_root_block(css, ":root { --c: 3; }");

        assert_eq!(spliced, ":root { --c: 3; }\n.foo{color:red}");
    }

    #[test]
    fn splice_without_marker_returns_input_unchanged() {
        let css = ".foo{color:red}\n.bar{color:blue}";
        assert_eq!(splice_root_block(css, ":root { --c: 3; }"), css);
    }

    #[test]
    fn splice_with_unbalanced_braces_returns_input_unchanged() {
        let css = ":root { --a: 1; .broken {\n.foo{color:red}";
        assert_eq!(splice_root_block(css, ":root { --c: 3; }"), css);
    }

    #[test]
    fn splice_handles_nested_braces_inside_the_block() {
        let css = ":root { --data: { \"nested\": 1 }; }\n.foo{color:red}";
        let spliced = splice_root_block(css, "NEW");

        assert_eq!(spliced, "NEW\n.foo{color:red}");
    }

    #[test]
    fn splice_keeps_text_before_the_marker() {
        let css = "/* header */\n:root { --a: 1; }\n.foo{color:red}";
        let spliced = splice_root_block(css, "NEW");

        assert_eq!(spliced, "NEW\n/* header */\n.foo{color:red}");
    }

    #[test]
    fn extract_reads_a_simple_property_value() {
        let css = ":root { --accent: #ff00aa; --other: 3px; }";
        assert_eq!(
            extract_property(css, "--accent").as_deref(),
            Some("#ff00aa")
        );
        assert_eq!(extract_property(css, "--other").as_deref(), Some("3px"));
    }

    #[test]
    fn extract_keeps_multi_line_bracketed_values_intact() {
        let css = ":root {\n  --custom-theme-style-inputs: [\n  { \"type\": \"text\", \"varId\": \"x\", \"displayText\": \"X\" }\n]\n}\n.foo{color:red}";
        let value = extract_property(css, STYLE_INPUTS_PROPERTY).expect("value");

        let parsed: serde_json::Value = serde_json::from_str(&value).expect("valid JSON");
        assert!(parsed.is_array());
    }

    #[test]
    fn extract_stops_at_the_first_top_level_semicolon() {
        let css = ":root { --inputs: [1, 2]; --next: 3; }";
        assert_eq!(extract_property(css, "--inputs").as_deref(), Some("[1, 2]"));
    }

    #[test]
    fn extract_skips_longer_identifiers_sharing_a_prefix_suffix() {
        let css = ":root { --size-unit: px; --size: 4; }";
        assert_eq!(extract_property(css, "--size").as_deref(), Some("4"));
    }

    #[test]
    fn extract_returns_none_outside_a_root_block() {
        assert_eq!(extract_property(".foo { --a: 1; }", "--a"), None);
        assert_eq!(extract_property(":root { --b: 2; }", "--a"), None);
    }

    #[test]
    fn format_wraps_json_in_a_root_block() {
        let block = format_style_inputs_block(STYLE_INPUTS_PROPERTY, "[]");
        assert_eq!(block, ":root {\n  --custom-theme-style-inputs: []\n}");
    }

    #[test]
    fn default_template_round_trips_through_extract_and_parse() {
        let value =
            extract_property(DEFAULT_CSS_TEMPLATE, STYLE_INPUTS_PROPERTY).expect("template value");
        let fields = crate::schema::parse_style_inputs(&value);

        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].var_id, "panel-font-size");
    }

    #[test]
    fn insert_default_template_prepends_existing_css() {
        let combined = insert_default_template(".foo{color:red}");
        assert!(combined.starts_with(":root {"));
        assert!(combined.ends_with(".foo{color:red}"));
    }
}
