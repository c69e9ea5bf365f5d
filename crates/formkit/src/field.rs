// File: src/field.rs
// Purpose: Field descriptors, field types and the attribute bags callers pass through

use maud::Render;
use once_cell::sync::Lazy;
use regex::Regex;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use crate::controller::ValueKind;

static HYPHEN_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

// Keys we are willing to emit verbatim into a tag
static ATTR_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_:@][A-Za-z0-9_:.@-]*$").unwrap());

/// Derive the DOM id used to tie a label to its control.
///
/// Lower-cases the name, turns spaces into hyphens, drops periods and
/// collapses hyphen runs: `"Full.Name  X"` becomes `"field-fullname-x"`.
/// A trailing hyphen is dropped.
pub fn field_id(name: &str) -> String {
    let slug = name.to_lowercase().replace(' ', "-").replace('.', "");
    let id = format!("field-{}", slug);
    HYPHEN_RUNS
        .replace_all(&id, "-")
        .trim_end_matches('-')
        .to_string()
}

/// Which control a field renders as
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Text,
    Textarea,
    Checkbox,
    RadioList,
    /// Anything else; renders no control
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Checkbox => "checkbox",
            FieldType::RadioList => "radio-list",
            FieldType::Other(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FieldType::Other(_))
    }

    /// How the controller should read this field out of a submission
    pub fn value_kind(&self) -> ValueKind {
        match self {
            FieldType::Checkbox => ValueKind::Flag,
            _ => ValueKind::Text,
        }
    }
}

impl FromStr for FieldType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "text" => FieldType::Text,
            "textarea" => FieldType::Textarea,
            "checkbox" => FieldType::Checkbox,
            "radio-list" | "radio_list" | "radiolist" => FieldType::RadioList,
            other => FieldType::Other(other.to_string()),
        })
    }
}

impl From<&str> for FieldType {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(field_type) => field_type,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered HTML attribute bag.
///
/// Setting a key that is already present replaces its value in place, so a
/// bag applied after generated attributes overrides them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs {
    entries: Vec<(String, Option<String>)>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key="value"`
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(key.into(), Some(value.into()));
    }

    /// Set a bare boolean attribute such as `disabled`
    pub fn flag(&mut self, key: impl Into<String>) {
        self.put(key.into(), None);
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn with_flag(mut self, key: impl Into<String>) -> Self {
        self.flag(key);
        self
    }

    /// Apply every entry of `other` on top of this bag
    pub fn merge(&mut self, other: &Attrs) {
        for (key, value) in &other.entries {
            self.put(key.clone(), value.clone());
        }
    }

    pub fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn put(&mut self, key: String, value: Option<String>) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attrs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attrs::new();
        for (key, value) in iter {
            attrs.set(key, value);
        }
        attrs
    }
}

impl Render for Attrs {
    /// Renders as ` key="value"` pairs with escaped values
    fn render_to(&self, buffer: &mut String) {
        for (key, value) in &self.entries {
            if !ATTR_NAME.is_match(key) {
                tracing::warn!("Skipping invalid attribute name: {:?}", key);
                continue;
            }
            buffer.push(' ');
            buffer.push_str(key);
            if let Some(value) = value {
                buffer.push_str("=\"");
                value.as_str().render_to(buffer);
                buffer.push('"');
            }
        }
    }
}

/// One option of a radio list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
}

impl Choice {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Static declaration of one form input.
///
/// `label` and `required` are explicit overrides; when left unset the
/// composition pass derives them from the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    pub label: Option<String>,
    pub required: Option<bool>,
    pub choices: Vec<Choice>,
    pub input_options: Attrs,
    pub label_options: Attrs,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, field_type: impl Into<FieldType>) -> Self {
        Self {
            name: name.into(),
            field_type: field_type.into(),
            label: None,
            required: None,
            choices: Vec::new(),
            input_options: Attrs::new(),
            label_options: Attrs::new(),
        }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    pub fn textarea(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Textarea)
    }

    pub fn checkbox(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Checkbox)
    }

    pub fn radio_list(name: impl Into<String>, choices: impl IntoIterator<Item = Choice>) -> Self {
        let mut descriptor = Self::new(name, FieldType::RadioList);
        descriptor.choices = choices.into_iter().collect();
        descriptor
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn choice(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.choices.push(Choice::new(value, label));
        self
    }

    pub fn input_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.input_options.set(key, value);
        self
    }

    pub fn label_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.label_options.set(key, value);
        self
    }

    pub fn id(&self) -> String {
        field_id(&self.name)
    }
}
