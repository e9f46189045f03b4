use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Name of the field that mirrors the record's business key.
pub const NUMBER_FIELD: &str = "number";

fn default_true() -> bool {
    true
}

/// The underlying type of a record field, as far as rendering cares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Free text; the display value is the raw value.
    #[default]
    Text,
    /// Foreign key into `table`; the display value is resolved by the store.
    Reference { table: String },
    /// Enumerated value with a label per raw value.
    Choice { labels: BTreeMap<String, String> },
}

/// A single named field on a problem record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Raw value. The empty string is the nil value.
    #[serde(default)]
    value: String,
    /// Resolved display value for reference fields. `None` until the store
    /// resolves it; ignored for text and choice fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    display_value: Option<String>,
    #[serde(default)]
    kind: FieldKind,
    #[serde(default = "default_true")]
    writable: bool,
}

impl Field {
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display_value: None,
            kind: FieldKind::Text,
            writable: true,
        }
    }

    pub fn reference(table: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display_value: None,
            kind: FieldKind::Reference {
                table: table.into(),
            },
            writable: true,
        }
    }

    pub fn choice(labels: BTreeMap<String, String>, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display_value: None,
            kind: FieldKind::Choice { labels },
            writable: true,
        }
    }

    /// Mark the field as not writable by the caller's ACL.
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    /// Attach an already-resolved display value (reference fields only).
    pub fn with_display_value(mut self, display_value: impl Into<String>) -> Self {
        self.display_value = Some(display_value.into());
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Human-readable rendering of the value.
    pub fn display_value(&self) -> &str {
        match &self.kind {
            FieldKind::Text => &self.value,
            FieldKind::Choice { labels } => labels
                .get(&self.value)
                .map(String::as_str)
                .unwrap_or(&self.value),
            FieldKind::Reference { .. } => self.display_value.as_deref().unwrap_or(&self.value),
        }
    }

    pub fn is_nil(&self) -> bool {
        self.value.is_empty()
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_reference(&self) -> bool {
        matches!(self.kind, FieldKind::Reference { .. })
    }

    /// Table the reference points into, `None` for non-reference fields.
    pub fn reference_table(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Reference { table } => Some(table),
            _ => None,
        }
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub(crate) fn set_resolved_display(&mut self, display_value: Option<String>) {
        self.display_value = display_value;
    }

    fn set(&mut self, value: String) {
        // A new reference key invalidates the previously resolved label.
        if self.is_reference() && self.value != value {
            self.display_value = None;
        }
        self.value = value;
    }
}

/// One problem ticket as held by a record store.
///
/// The record is an owned snapshot: changes made through [`set_value`]
/// become visible to other readers only once the record is persisted.
///
/// [`set_value`]: ProblemRecord::set_value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRecord {
    number: String,
    #[serde(default = "default_true")]
    can_read: bool,
    #[serde(default = "default_true")]
    can_write: bool,
    #[serde(default)]
    fields: BTreeMap<String, Field>,
}

impl ProblemRecord {
    /// Create a readable, writable record carrying only its `number` field.
    pub fn new(number: impl Into<String>) -> Self {
        let mut record = Self {
            number: number.into(),
            can_read: true,
            can_write: true,
            fields: BTreeMap::new(),
        };
        record.ensure_number_field();
        record
    }

    pub fn with_field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn with_access(mut self, can_read: bool, can_write: bool) -> Self {
        self.can_read = can_read;
        self.can_write = can_write;
        self
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn can_read(&self) -> bool {
        self.can_read
    }

    pub fn can_write(&self) -> bool {
        self.can_write
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Raw value of `name`, `None` when the record has no such field.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(Field::value)
    }

    /// All fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub(crate) fn fields_mut(&mut self) -> impl Iterator<Item = &mut Field> {
        self.fields.values_mut()
    }

    /// Overwrite the raw value of an existing field.
    ///
    /// Returns `false` (and changes nothing) if the record has no field with
    /// that name. Writability is not enforced here; callers decide.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.get_mut(name) {
            Some(field) => {
                field.set(value.into());
                true
            }
            None => false,
        }
    }

    /// The key field always mirrors `number` as a read-only text field.
    /// Seeded records may omit it or carry a stale value; both are replaced.
    pub(crate) fn ensure_number_field(&mut self) {
        let field = Field::text(self.number.clone()).read_only();
        self.fields.insert(NUMBER_FIELD.to_string(), field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_labels() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("101".to_string(), "New".to_string()),
            ("102".to_string(), "Assigned".to_string()),
        ])
    }

    #[test]
    fn new_record_carries_read_only_number_field() {
        let record = ProblemRecord::new("PRB0040001");
        let number = record.field("number").unwrap();
        assert_eq!(number.value(), "PRB0040001");
        assert!(!number.is_writable());
        assert!(record.can_read() && record.can_write());
    }

    #[test]
    fn set_value_on_unknown_field_is_a_no_op() {
        let mut record = ProblemRecord::new("PRB0040001");
        assert!(!record.set_value("no_such_field", "x"));
        assert!(!record.has_field("no_such_field"));
    }

    #[test]
    fn choice_display_value_uses_label() {
        let field = Field::choice(state_labels(), "102");
        assert_eq!(field.display_value(), "Assigned");
        let unknown = Field::choice(state_labels(), "999");
        assert_eq!(unknown.display_value(), "999");
    }

    #[test]
    fn reference_display_value_falls_back_to_key() {
        let field = Field::reference("sys_user", "abc123");
        assert_eq!(field.display_value(), "abc123");
        assert_eq!(field.reference_table(), Some("sys_user"));

        let field = field.with_display_value("Beth Anglin");
        assert_eq!(field.display_value(), "Beth Anglin");
    }

    #[test]
    fn changing_reference_key_drops_resolved_label() {
        let mut record = ProblemRecord::new("PRB0040001").with_field(
            "assigned_to",
            Field::reference("sys_user", "abc123").with_display_value("Beth Anglin"),
        );
        record.set_value("assigned_to", "def456");
        assert_eq!(record.field("assigned_to").unwrap().display_value(), "def456");
    }

    #[test]
    fn deserializes_seed_shape_with_defaults() {
        let record: ProblemRecord = serde_json::from_value(serde_json::json!({
            "number": "PRB0040002",
            "fields": {
                "short_description": {"value": "Printer on fire"},
                "assigned_to": {"value": "abc123", "kind": {"type": "reference", "table": "sys_user"}},
                "sys_id": {"value": "f00", "writable": false}
            }
        }))
        .unwrap();

        assert!(record.can_read() && record.can_write());
        assert!(record.field("assigned_to").unwrap().is_reference());
        assert!(!record.field("sys_id").unwrap().is_writable());
        assert!(record.field("short_description").unwrap().is_writable());
    }

    #[test]
    fn stale_number_field_is_replaced_by_key() {
        let mut record: ProblemRecord = serde_json::from_value(serde_json::json!({
            "number": "PRB0040002",
            "fields": {"number": {"value": "PRB0049999"}}
        }))
        .unwrap();
        record.ensure_number_field();

        let number = record.field("number").unwrap();
        assert_eq!(number.value(), "PRB0040002");
        assert!(!number.is_writable());
    }
}
