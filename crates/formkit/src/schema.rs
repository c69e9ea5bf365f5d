// File: src/schema.rs
// Purpose: Validation schema model: per-field metadata, casting and whole-object validation

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;

use crate::error::{ErrorKind, FieldError, FieldErrors};
use crate::FormValues;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static URL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap());

/// Metadata a schema exposes for one path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMeta {
    pub required: bool,
    pub label: Option<String>,
}

/// Anything that can describe fields and validate a set of values.
///
/// `validate` returns the cast values on success, or the first error of
/// every offending field.
pub trait Schema: fmt::Debug + Send + Sync {
    /// Metadata for a dotted path, `None` if the schema does not know it
    fn describe(&self, path: &str) -> Option<FieldMeta>;

    fn validate(&self, values: &FormValues) -> Result<FormValues, FieldErrors>;
}

/// A node in an object schema
#[derive(Debug, Clone)]
pub enum SchemaNode {
    String(StringSchema),
    Boolean(BooleanSchema),
    Object(ObjectSchema),
}

impl SchemaNode {
    pub fn meta(&self) -> FieldMeta {
        match self {
            SchemaNode::String(s) => FieldMeta {
                required: s.required,
                label: s.label.clone(),
            },
            SchemaNode::Boolean(b) => FieldMeta {
                required: b.required,
                label: b.label.clone(),
            },
            SchemaNode::Object(o) => FieldMeta {
                required: false,
                label: o.label.clone(),
            },
        }
    }
}

impl From<StringSchema> for SchemaNode {
    fn from(schema: StringSchema) -> Self {
        SchemaNode::String(schema)
    }
}

impl From<BooleanSchema> for SchemaNode {
    fn from(schema: BooleanSchema) -> Self {
        SchemaNode::Boolean(schema)
    }
}

impl From<ObjectSchema> for SchemaNode {
    fn from(schema: ObjectSchema) -> Self {
        SchemaNode::Object(schema)
    }
}

/// Name used in messages: the label when set, otherwise the path
fn display_name<'a>(label: &'a Option<String>, path: &'a str) -> &'a str {
    label.as_deref().unwrap_or(path)
}

fn required_error(label: &Option<String>, path: &str) -> FieldError {
    FieldError::new(
        ErrorKind::Required,
        format!("{} is a required field", display_name(label, path)),
    )
}

#[derive(Debug, Clone)]
enum StringRule {
    Email,
    Url,
    Matches {
        regex: Regex,
        message: Option<String>,
    },
}

/// String field schema
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    label: Option<String>,
    required: bool,
    trim: bool,
    min_length: Option<usize>,
    max_length: Option<usize>,
    rules: Vec<StringRule>,
}

impl StringSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value must be present and non-empty
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Strip surrounding whitespace before any check
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn email(mut self) -> Self {
        self.rules.push(StringRule::Email);
        self
    }

    pub fn url(mut self) -> Self {
        self.rules.push(StringRule::Url);
        self
    }

    /// Value must match `regex`. An invalid pattern is a programming error
    /// and is logged and skipped.
    pub fn matches(mut self, pattern: &str, message: Option<&str>) -> Self {
        match Regex::new(pattern) {
            Ok(regex) => self.rules.push(StringRule::Matches {
                regex,
                message: message.map(str::to_string),
            }),
            Err(e) => tracing::error!("Ignoring invalid pattern {:?}: {}", pattern, e),
        }
        self
    }

    fn cast(&self, value: &Value) -> Option<Result<String, ()>> {
        let raw = match value {
            Value::Null => return None,
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Array(_) | Value::Object(_) => return Some(Err(())),
        };
        Some(Ok(if self.trim { raw.trim().to_string() } else { raw }))
    }

    pub fn check(&self, path: &str, value: &Value) -> Result<Value, FieldError> {
        let name = display_name(&self.label, path);

        let s = match self.cast(value) {
            None if self.required => return Err(required_error(&self.label, path)),
            None => return Ok(Value::Null),
            Some(Err(())) => {
                return Err(FieldError::new(
                    ErrorKind::Type,
                    format!("{} must be a `string` type", name),
                ))
            }
            Some(Ok(s)) => s,
        };

        if self.required && s.is_empty() {
            return Err(required_error(&self.label, path));
        }

        let len = s.chars().count();
        if let Some(min) = self.min_length {
            if len < min {
                return Err(FieldError::new(
                    ErrorKind::MinLength,
                    format!("{} must be at least {} characters", name, min),
                ));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Err(FieldError::new(
                    ErrorKind::MaxLength,
                    format!("{} must be at most {} characters", name, max),
                ));
            }
        }

        // Format rules leave empty optional strings alone
        if !s.is_empty() {
            for rule in &self.rules {
                match rule {
                    StringRule::Email if !EMAIL_REGEX.is_match(&s) => {
                        return Err(FieldError::new(
                            ErrorKind::Email,
                            format!("{} must be a valid email", name),
                        ))
                    }
                    StringRule::Url if !URL_REGEX.is_match(&s) => {
                        return Err(FieldError::new(
                            ErrorKind::Url,
                            format!("{} must be a valid URL", name),
                        ))
                    }
                    StringRule::Matches { regex, message } if !regex.is_match(&s) => {
                        let message = message.clone().unwrap_or_else(|| {
                            format!("{} must match the following: \"{}\"", name, regex.as_str())
                        });
                        return Err(FieldError::new(ErrorKind::Pattern, message));
                    }
                    _ => {}
                }
            }
        }

        Ok(Value::String(s))
    }
}

/// Boolean field schema, as backed by a checkbox.
///
/// `required` means the box must be ticked.
#[derive(Debug, Clone, Default)]
pub struct BooleanSchema {
    label: Option<String>,
    required: bool,
}

impl BooleanSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Coerce submitted text into a boolean
    pub fn cast(value: &Value) -> Option<bool> {
        match value {
            Value::Null => Some(false),
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_f64().map(|n| n != 0.0),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "on" | "true" | "1" | "yes" => Some(true),
                "" | "off" | "false" | "0" | "no" => Some(false),
                _ => None,
            },
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn check(&self, path: &str, value: &Value) -> Result<Value, FieldError> {
        match Self::cast(value) {
            Some(false) if self.required => Err(required_error(&self.label, path)),
            Some(b) => Ok(Value::Bool(b)),
            None => Err(FieldError::new(
                ErrorKind::Type,
                format!("{} must be a `boolean` type", display_name(&self.label, path)),
            )),
        }
    }
}

/// Object schema: named child nodes, addressed by dotted paths.
///
/// Values are flat: the value for `address.city` lives under that exact key.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    label: Option<String>,
    fields: Vec<(String, SchemaNode)>,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a child node
    pub fn field(mut self, name: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        let name = name.into();
        let node = node.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = node,
            None => self.fields.push((name, node)),
        }
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Walk a dotted path down to its node
    pub fn reach(&self, path: &str) -> Option<&SchemaNode> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let node = self
            .fields
            .iter()
            .find(|(name, _)| name == head)
            .map(|(_, node)| node)?;

        match (rest, node) {
            (None, node) => Some(node),
            (Some(rest), SchemaNode::Object(child)) => child.reach(rest),
            (Some(_), _) => None,
        }
    }

    /// Every non-object node with its full dotted path
    pub fn leaves(&self) -> Vec<(String, &SchemaNode)> {
        let mut out = Vec::new();
        self.collect_leaves("", &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a SchemaNode)>) {
        for (name, node) in &self.fields {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", prefix, name)
            };
            match node {
                SchemaNode::Object(child) => child.collect_leaves(&path, out),
                leaf => out.push((path, leaf)),
            }
        }
    }
}

impl Schema for ObjectSchema {
    fn describe(&self, path: &str) -> Option<FieldMeta> {
        self.reach(path).map(SchemaNode::meta)
    }

    fn validate(&self, values: &FormValues) -> Result<FormValues, FieldErrors> {
        let mut parsed = values.clone();
        let mut errors = FieldErrors::new();

        for (path, node) in self.leaves() {
            let present = values.get(&path);
            let value = present.unwrap_or(&Value::Null);
            let checked = match node {
                SchemaNode::String(s) => s.check(&path, value),
                SchemaNode::Boolean(b) => b.check(&path, value),
                SchemaNode::Object(_) => continue,
            };
            match checked {
                Ok(cast) if present.is_some() => {
                    parsed.insert(path, cast);
                }
                Ok(_) => {}
                Err(error) => {
                    errors.insert(path, error);
                }
            }
        }

        if errors.is_empty() {
            Ok(parsed)
        } else {
            tracing::debug!("Schema validation failed for {} field(s)", errors.len());
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn values(v: Value) -> FormValues {
        match v {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn profile_schema() -> ObjectSchema {
        ObjectSchema::new()
            .field("name", StringSchema::new().required().label("Name"))
            .field("summary", StringSchema::new().label("Summary"))
            .field(
                "address",
                ObjectSchema::new()
                    .label("Address")
                    .field("city", StringSchema::new().required().label("City")),
            )
    }

    #[test]
    fn test_describe_paths() {
        let schema = profile_schema();

        assert_eq!(
            schema.describe("name"),
            Some(FieldMeta { required: true, label: Some("Name".to_string()) })
        );
        assert_eq!(
            schema.describe("summary"),
            Some(FieldMeta { required: false, label: Some("Summary".to_string()) })
        );
        assert_eq!(
            schema.describe("address.city"),
            Some(FieldMeta { required: true, label: Some("City".to_string()) })
        );
        assert_eq!(schema.describe("address").and_then(|m| m.label), Some("Address".to_string()));
        assert_eq!(schema.describe("foo"), None);
        assert_eq!(schema.describe("name.first"), None);
    }

    #[test]
    fn test_validate_reports_every_offending_field() {
        let schema = profile_schema();
        let errors = schema
            .validate(&values(json!({ "name": "", "summary": "x" })))
            .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors["name"].message, "Name is a required field");
        assert_eq!(errors["name"].kind, ErrorKind::Required);
        assert_eq!(errors["address.city"].message, "City is a required field");
    }

    #[test]
    fn test_validate_keeps_only_given_keys() {
        let schema = ObjectSchema::new()
            .field("name", StringSchema::new().required().trim())
            .field("summary", StringSchema::new());

        let parsed = schema
            .validate(&values(json!({ "name": "  Ada ", "extra": 1 })))
            .unwrap();

        assert_eq!(Value::Object(parsed), json!({ "name": "Ada", "extra": 1 }));
    }

    #[test]
    fn test_message_falls_back_to_path() {
        let schema = ObjectSchema::new().field("email", StringSchema::new().required());
        let errors = schema.validate(&FormValues::new()).unwrap_err();
        assert_eq!(errors["email"].message, "email is a required field");
    }

    #[rstest]
    #[case(StringSchema::new().min_length(3), "ab", Some(ErrorKind::MinLength))]
    #[case(StringSchema::new().min_length(3), "abc", None)]
    #[case(StringSchema::new().max_length(2), "abc", Some(ErrorKind::MaxLength))]
    #[case(StringSchema::new().email(), "ada@example.com", None)]
    #[case(StringSchema::new().email(), "not-an-email", Some(ErrorKind::Email))]
    #[case(StringSchema::new().email(), "", None)]
    #[case(StringSchema::new().url(), "https://example.com", None)]
    #[case(StringSchema::new().url(), "example", Some(ErrorKind::Url))]
    #[case(StringSchema::new().matches(r"^\d+$", None), "12a", Some(ErrorKind::Pattern))]
    #[case(StringSchema::new().matches(r"^\d+$", None), "123", None)]
    fn test_string_rules(
        #[case] schema: StringSchema,
        #[case] input: &str,
        #[case] expected: Option<ErrorKind>,
    ) {
        let result = schema.check("field", &json!(input));
        assert_eq!(result.err().map(|e| e.kind), expected);
    }

    #[test]
    fn test_custom_pattern_message() {
        let schema = StringSchema::new().matches(r"^[a-z]+$", Some("Lowercase letters only"));
        let error = schema.check("slug", &json!("ABC")).unwrap_err();
        assert_eq!(error.message, "Lowercase letters only");
    }

    #[test]
    fn test_string_rejects_structured_values() {
        let error = StringSchema::new().check("tags", &json!(["a"])).unwrap_err();
        assert_eq!(error.kind, ErrorKind::Type);
    }

    #[rstest]
    #[case(json!("on"), Some(true))]
    #[case(json!("true"), Some(true))]
    #[case(json!("off"), Some(false))]
    #[case(json!(""), Some(false))]
    #[case(json!(null), Some(false))]
    #[case(json!(true), Some(true))]
    #[case(json!("maybe"), None)]
    fn test_boolean_cast(#[case] input: Value, #[case] expected: Option<bool>) {
        assert_eq!(BooleanSchema::cast(&input), expected);
    }

    #[test]
    fn test_required_boolean_must_be_ticked() {
        let schema = BooleanSchema::new().required().label("Terms");
        assert_eq!(
            schema.check("terms", &json!(false)).unwrap_err().message,
            "Terms is a required field"
        );
        assert_eq!(schema.check("terms", &json!("on")).unwrap(), json!(true));
    }

    #[test]
    fn test_field_replaces_existing_node() {
        let schema = ObjectSchema::new()
            .field("name", StringSchema::new())
            .field("name", StringSchema::new().required());
        assert_eq!(schema.leaves().len(), 1);
        assert!(schema.describe("name").unwrap().required);
    }
}
