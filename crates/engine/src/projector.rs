//! Response projection: renders a record as a field -> value mapping.
//!
//! The shape of each rendered field depends on the display-value mode and on
//! whether a reference link was produced:
//!
//! | mode  | link | shape                          |
//! |-------|------|--------------------------------|
//! | false | no   | raw value                      |
//! | false | yes  | `{link, value}`                |
//! | true  | no   | `{display_value}`              |
//! | true  | yes  | `{display_value, link}`        |
//! | all   | no   | `{display_value, value}`       |
//! | all   | yes  | `{display_value, link, value}` |

use std::str::FromStr;

use problemflow_storage::{Field, ProblemRecord};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Which representation of each field value to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayValueMode {
    /// Raw values only.
    #[default]
    False,
    /// Display values only.
    True,
    /// Both.
    All,
}

impl FromStr for DisplayValueMode {
    type Err = std::convert::Infallible;

    /// Case-insensitive; anything unrecognized means raw values.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "true" => DisplayValueMode::True,
            "all" => DisplayValueMode::All,
            _ => DisplayValueMode::False,
        })
    }
}

/// Caller-controlled response shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub display_value: DisplayValueMode,
    pub exclude_reference_link: bool,
    /// Fields to render. `None` renders every record field.
    pub fields: Option<Vec<String>>,
}

/// Renders records, building reference links against an instance URL.
#[derive(Debug, Clone)]
pub struct Projector {
    instance_url: String,
}

impl Projector {
    /// `instance_url` is used verbatim as the link prefix, so it should end
    /// with `/`.
    pub fn new(instance_url: impl Into<String>) -> Self {
        Self {
            instance_url: instance_url.into(),
        }
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    pub fn render(&self, record: &ProblemRecord, options: &RenderOptions) -> Map<String, Value> {
        let mut result = Map::new();

        match &options.fields {
            Some(names) => {
                for name in names {
                    match record.field(name) {
                        Some(field) => {
                            result.insert(name.clone(), self.render_field(field, options));
                        }
                        None => tracing::debug!(field = %name, "requested field not on record"),
                    }
                }
            }
            None => {
                for (name, field) in record.fields() {
                    result.insert(name.to_string(), self.render_field(field, options));
                }
            }
        }

        result
    }

    fn render_field(&self, field: &Field, options: &RenderOptions) -> Value {
        let link = if options.exclude_reference_link {
            None
        } else {
            self.link(field)
        };
        let value = field.value();
        let display_value = field.display_value();

        match (options.display_value, link) {
            (DisplayValueMode::False, None) => json!(value),
            (DisplayValueMode::False, Some(link)) => json!({
                "link": link,
                "value": value,
            }),
            (DisplayValueMode::True, None) => json!({
                "display_value": display_value,
            }),
            (DisplayValueMode::True, Some(link)) => json!({
                "display_value": display_value,
                "link": link,
            }),
            (DisplayValueMode::All, None) => json!({
                "display_value": display_value,
                "value": value,
            }),
            (DisplayValueMode::All, Some(link)) => json!({
                "display_value": display_value,
                "link": link,
                "value": value,
            }),
        }
    }

    /// Table API URL of the referenced record. Empty references get no link.
    fn link(&self, field: &Field) -> Option<String> {
        let table = field.reference_table()?;
        if field.is_nil() {
            return None;
        }
        Some(format!(
            "{}api/now/table/{}/{}",
            self.instance_url,
            table,
            field.value()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.service-now.com/";

    fn problem() -> ProblemRecord {
        ProblemRecord::new("PRB0040001")
            .with_field(
                "assigned_to",
                Field::reference("sys_user", "abc123").with_display_value("Beth Anglin"),
            )
            .with_field("duplicate_of", Field::reference("problem", ""))
            .with_field("short_description", Field::text("Email slow"))
    }

    fn render(mode: DisplayValueMode, exclude: bool, field: &str) -> Value {
        let options = RenderOptions {
            display_value: mode,
            exclude_reference_link: exclude,
            fields: Some(vec![field.to_string()]),
        };
        Projector::new(BASE).render(&problem(), &options)[field].clone()
    }

    #[test]
    fn mode_parsing_is_lenient() {
        assert_eq!("ALL".parse::<DisplayValueMode>(), Ok(DisplayValueMode::All));
        assert_eq!("True".parse::<DisplayValueMode>(), Ok(DisplayValueMode::True));
        assert_eq!("false".parse::<DisplayValueMode>(), Ok(DisplayValueMode::False));
        assert_eq!("yes please".parse::<DisplayValueMode>(), Ok(DisplayValueMode::False));
    }

    #[test]
    fn shapes_without_link() {
        let f = "short_description";
        assert_eq!(render(DisplayValueMode::False, false, f), json!("Email slow"));
        assert_eq!(
            render(DisplayValueMode::True, false, f),
            json!({"display_value": "Email slow"})
        );
        assert_eq!(
            render(DisplayValueMode::All, false, f),
            json!({"display_value": "Email slow", "value": "Email slow"})
        );
    }

    #[test]
    fn shapes_with_link() {
        let link = format!("{BASE}api/now/table/sys_user/abc123");
        let f = "assigned_to";
        assert_eq!(
            render(DisplayValueMode::False, false, f),
            json!({"link": link, "value": "abc123"})
        );
        assert_eq!(
            render(DisplayValueMode::True, false, f),
            json!({"display_value": "Beth Anglin", "link": link})
        );
        assert_eq!(
            render(DisplayValueMode::All, false, f),
            json!({"display_value": "Beth Anglin", "link": link, "value": "abc123"})
        );
    }

    #[test]
    fn excluded_links_fall_back_to_linkless_shapes() {
        let f = "assigned_to";
        assert_eq!(render(DisplayValueMode::False, true, f), json!("abc123"));
        assert_eq!(
            render(DisplayValueMode::True, true, f),
            json!({"display_value": "Beth Anglin"})
        );
        assert_eq!(
            render(DisplayValueMode::All, true, f),
            json!({"display_value": "Beth Anglin", "value": "abc123"})
        );
    }

    #[test]
    fn empty_reference_has_no_link() {
        assert_eq!(render(DisplayValueMode::False, false, "duplicate_of"), json!(""));
    }

    #[test]
    fn default_renders_every_field_in_name_order() {
        let rendered = Projector::new(BASE).render(&problem(), &RenderOptions::default());
        let names: Vec<&str> = rendered.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            ["assigned_to", "duplicate_of", "number", "short_description"]
        );
    }

    #[test]
    fn unknown_requested_fields_are_skipped() {
        let options = RenderOptions {
            fields: Some(vec!["number".to_string(), "nonsense".to_string()]),
            ..RenderOptions::default()
        };
        let rendered = Projector::new(BASE).render(&problem(), &options);
        assert_eq!(Value::Object(rendered), json!({"number": "PRB0040001"}));
    }
}
