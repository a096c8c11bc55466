//! Schema-driven property mapping.
//!
//! [`map_properties`] walks the remote database schema (never the front-matter)
//! and builds one typed payload entry per declared property. Front-matter keys
//! the schema does not declare are ignored; declared properties missing from
//! the front-matter are mapped from the empty string. Property types this
//! crate does not know are left out of the payload.
//!
//! Nothing here validates values against what the remote will accept. A
//! non-numeric `number` input is carried as [`NumberValue::NotANumber`] and
//! only fails when the payload is serialised for the create request.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::{Error as _, Serializer};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use tracing::debug;

use crate::document::FrontMatter;

/// Remote property type tag, as reported by the database schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyType {
    Title,
    RichText,
    Date,
    Number,
    PhoneNumber,
    Email,
    Url,
    Files,
    Checkbox,
    Select,
    MultiSelect,
    /// Any tag without a mapping rule (formula, relation, people...).
    Unsupported(String),
}

impl From<&str> for PropertyType {
    fn from(tag: &str) -> Self {
        match tag {
            "title" => PropertyType::Title,
            "rich_text" => PropertyType::RichText,
            "date" => PropertyType::Date,
            "number" => PropertyType::Number,
            "phone_number" => PropertyType::PhoneNumber,
            "email" => PropertyType::Email,
            "url" => PropertyType::Url,
            "files" => PropertyType::Files,
            "checkbox" => PropertyType::Checkbox,
            "select" => PropertyType::Select,
            "multi_select" => PropertyType::MultiSelect,
            other => PropertyType::Unsupported(other.to_string()),
        }
    }
}

impl PropertyType {
    pub fn as_str(&self) -> &str {
        match self {
            PropertyType::Title => "title",
            PropertyType::RichText => "rich_text",
            PropertyType::Date => "date",
            PropertyType::Number => "number",
            PropertyType::PhoneNumber => "phone_number",
            PropertyType::Email => "email",
            PropertyType::Url => "url",
            PropertyType::Files => "files",
            PropertyType::Checkbox => "checkbox",
            PropertyType::Select => "select",
            PropertyType::MultiSelect => "multi_select",
            PropertyType::Unsupported(tag) => tag,
        }
    }

    /// Build the payload for one property, or `None` when the type has no rule.
    fn coerce(&self, value: &Value, now: &DateTime<Utc>) -> Option<PropertyValue> {
        let mapped = match self {
            PropertyType::Title => PropertyValue::Title(vec![RichText::plain(stringify(value))]),
            PropertyType::RichText => {
                PropertyValue::RichText(vec![RichText::plain(stringify(value))])
            }
            PropertyType::Date => {
                let start = match stringify(value) {
                    s if s.is_empty() => now.to_rfc3339_opts(SecondsFormat::Millis, true),
                    s => s,
                };
                PropertyValue::Date(DateValue { start })
            }
            PropertyType::Number => PropertyValue::Number(to_number(value)),
            PropertyType::PhoneNumber => PropertyValue::PhoneNumber(stringify(value)),
            PropertyType::Email => PropertyValue::Email(stringify(value)),
            PropertyType::Url => PropertyValue::Url(stringify(value)),
            PropertyType::Files => PropertyValue::Files(
                each_element(value)
                    .into_iter()
                    .map(FileReference::external)
                    .collect(),
            ),
            PropertyType::Checkbox => PropertyValue::Checkbox(to_bool(value)),
            PropertyType::Select => PropertyValue::Select(SelectOption {
                name: stringify(value),
            }),
            PropertyType::MultiSelect => PropertyValue::MultiSelect(
                each_element(value)
                    .into_iter()
                    .map(|name| SelectOption { name })
                    .collect(),
            ),
            PropertyType::Unsupported(_) => return None,
        };
        Some(mapped)
    }
}

/// Property name → type, for one remote database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteSchema {
    properties: BTreeMap<String, PropertyType>,
}

impl RemoteSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, kind: PropertyType) {
        self.properties.insert(name.into(), kind);
    }

    pub fn get(&self, name: &str) -> Option<&PropertyType> {
        self.properties.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyType)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<S: Into<String>> FromIterator<(S, PropertyType)> for RemoteSchema {
    fn from_iter<I: IntoIterator<Item = (S, PropertyType)>>(iter: I) -> Self {
        RemoteSchema {
            properties: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A single text run: `{"type": "text", "text": {"content": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RichText {
    Text { text: TextContent },
}

impl RichText {
    pub fn plain(content: impl Into<String>) -> Self {
        RichText::Text {
            text: TextContent {
                content: content.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateValue {
    pub start: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub name: String,
}

/// `{"name": ..., "type": "external", "external": {"url": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FileReference {
    External { name: String, external: ExternalUrl },
}

impl FileReference {
    /// Name and url are both the raw front-matter element.
    pub fn external(value: String) -> Self {
        FileReference::External {
            name: value.clone(),
            external: ExternalUrl { url: value },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExternalUrl {
    pub url: String,
}

/// Result of numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberValue {
    Finite(f64),
    /// The raw input did not coerce to a finite number. Serialising this fails.
    NotANumber(String),
}

impl Serialize for NumberValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NumberValue::Finite(n) => serializer.serialize_f64(*n),
            NumberValue::NotANumber(raw) => {
                Err(S::Error::custom(format!("not a number: {raw:?}")))
            }
        }
    }
}

/// One typed property value, serialised in the remote's externally tagged shape
/// (`{"select": {"name": "x"}}`, `{"checkbox": true}`, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    Title(Vec<RichText>),
    RichText(Vec<RichText>),
    Date(DateValue),
    Number(NumberValue),
    PhoneNumber(String),
    Email(String),
    Url(String),
    Files(Vec<FileReference>),
    Checkbox(bool),
    Select(SelectOption),
    MultiSelect(Vec<SelectOption>),
}

/// Property name → typed value, ready to send as the `properties` of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PropertyPayload(BTreeMap<String, PropertyValue>);

impl PropertyPayload {
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Map front-matter onto the schema, using the current time for empty dates.
pub fn map_properties(front_matter: &FrontMatter, schema: &RemoteSchema) -> PropertyPayload {
    map_properties_at(front_matter, schema, Utc::now())
}

/// Same as [`map_properties`] with an explicit "now".
pub fn map_properties_at(
    front_matter: &FrontMatter,
    schema: &RemoteSchema,
    now: DateTime<Utc>,
) -> PropertyPayload {
    let empty = Value::String(String::new());
    let mut payload = BTreeMap::new();
    for (name, kind) in schema.iter() {
        let value = front_matter.get(name).unwrap_or(&empty);
        match kind.coerce(value, &now) {
            Some(mapped) => {
                payload.insert(name.to_string(), mapped);
            }
            None => {
                debug!(property = name, kind = kind.as_str(), "Skipping unsupported property type");
            }
        }
    }
    PropertyPayload(payload)
}

/// Text form of a front-matter value. Sequences join with commas.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Sequence(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        Value::Mapping(_) => serde_yaml::to_string(value)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
        Value::Tagged(tagged) => stringify(&tagged.value),
    }
}

/// A sequence yields one string per element; anything else yields itself.
fn each_element(value: &Value) -> Vec<String> {
    match value {
        Value::Sequence(items) => items.iter().map(stringify).collect(),
        Value::Tagged(tagged) => each_element(&tagged.value),
        other => vec![stringify(other)],
    }
}

fn to_number(value: &Value) -> NumberValue {
    match value {
        Value::Null => NumberValue::Finite(0.0),
        Value::Bool(b) => NumberValue::Finite(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => NumberValue::Finite(f),
            _ => NumberValue::NotANumber(n.to_string()),
        },
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return NumberValue::Finite(0.0);
            }
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => NumberValue::Finite(f),
                _ => NumberValue::NotANumber(s.clone()),
            }
        }
        Value::Tagged(tagged) => to_number(&tagged.value),
        other => NumberValue::NotANumber(stringify(other)),
    }
}

fn to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "yes" | "on" | "1"
        ),
        Value::Tagged(tagged) => to_bool(&tagged.value),
        _ => false,
    }
}
