//! Table API style query parameters.

use problemflow_engine::{DisplayValueMode, RenderOptions};
use serde::Deserialize;

/// Query string of a transition request. Every parameter is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TransitionQuery {
    pub(crate) sysparm_display_value: Option<String>,
    pub(crate) sysparm_exclude_reference_link: Option<String>,
    pub(crate) sysparm_fields: Option<String>,
}

impl TransitionQuery {
    pub(crate) fn render_options(&self) -> RenderOptions {
        let display_value = self
            .sysparm_display_value
            .as_deref()
            .and_then(|v| v.parse::<DisplayValueMode>().ok())
            .unwrap_or_default();

        RenderOptions {
            display_value,
            exclude_reference_link: self
                .sysparm_exclude_reference_link
                .as_deref()
                .is_some_and(parse_flag),
            fields: self.sysparm_fields.as_deref().and_then(parse_field_list),
        }
    }
}

/// `true` and `1` (any case) are set; everything else is unset.
pub(crate) fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1")
}

/// Comma separated field names. An empty list means every field.
pub(crate) fn parse_field_list(raw: &str) -> Option<Vec<String>> {
    let fields: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    if fields.is_empty() {
        None
    } else {
        Some(fields)
    }
}
