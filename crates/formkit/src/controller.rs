// File: src/controller.rs
// Purpose: Form controller - owns values, errors and the submitting flag

use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::FormOptions;
use crate::error::{FieldError, FieldErrors};
use crate::schema::{BooleanSchema, Schema};
use crate::FormValues;

/// How a registered field is read out of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    /// Submitted text; a missing entry keeps the current value
    #[default]
    Text,
    /// Checkbox; a missing entry means `false`
    Flag,
}

impl ValueKind {
    fn initial(self) -> Value {
        match self {
            ValueKind::Text => Value::String(String::new()),
            ValueKind::Flag => Value::Bool(false),
        }
    }
}

/// Binding a control uses to read its value from form state
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    name: String,
    kind: ValueKind,
    value: Value,
}

impl Registration {
    pub fn new(name: impl Into<String>, kind: ValueKind, value: Value) -> Self {
        Self {
            name: name.into(),
            kind,
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Current value as text, for `value` attributes and textarea bodies
    pub fn text(&self) -> String {
        match &self.value {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_checked(&self) -> bool {
        BooleanSchema::cast(&self.value).unwrap_or(false)
    }
}

/// Snapshot of one form instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    pub values: FormValues,
    pub errors: FieldErrors,
    pub is_submitting: bool,
}

impl FormState {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// The submission that triggered a submit: raw name/value pairs in the order
/// they were posted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitEvent {
    fields: Vec<(String, String)>,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Last posted value for `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubmitEvent {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Result of [`FormController::submit`]
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome<T = ()> {
    /// Validation passed and the callback ran to completion
    Submitted(T),
    /// Validation failed; the callback was not called
    Invalid,
}

impl<T> SubmitOutcome<T> {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: FormState,
    registered: Vec<(String, ValueKind)>,
}

/// Lets a submit callback attach errors to fields after the fact,
/// e.g. for failures only the server can detect
#[derive(Debug, Clone)]
pub struct ErrorSetter {
    inner: Arc<Mutex<Inner>>,
}

impl ErrorSetter {
    pub fn set(&self, name: impl Into<String>, error: FieldError) {
        let name = name.into();
        tracing::debug!("Field error reported for {}: {}", name, error.message);
        lock(&self.inner).state.errors.insert(name, error);
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Owns the state of one form.
///
/// Cloning yields another handle to the same form, which is how a submit
/// button or a callback observes `is_submitting` while a submit is running.
#[derive(Debug, Clone)]
pub struct FormController {
    schema: Option<Arc<dyn Schema>>,
    options: Arc<FormOptions>,
    inner: Arc<Mutex<Inner>>,
}

impl FormController {
    /// Controller without a schema: nothing is required, nothing is labelled
    pub fn new(options: FormOptions) -> Self {
        Self::build(None, options)
    }

    pub fn with_schema(schema: impl Schema + 'static, options: FormOptions) -> Self {
        let schema: Arc<dyn Schema> = Arc::new(schema);
        Self::build(Some(schema), options)
    }

    pub fn with_shared_schema(schema: Arc<dyn Schema>, options: FormOptions) -> Self {
        Self::build(Some(schema), options)
    }

    fn build(schema: Option<Arc<dyn Schema>>, options: FormOptions) -> Self {
        let state = FormState {
            values: options.default_values.clone(),
            ..FormState::default()
        };
        Self {
            schema,
            options: Arc::new(options),
            inner: Arc::new(Mutex::new(Inner {
                state,
                registered: Vec::new(),
            })),
        }
    }

    pub fn schema(&self) -> Option<&dyn Schema> {
        self.schema.as_deref()
    }

    pub fn options(&self) -> &FormOptions {
        &self.options
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    /// Register a text field
    pub fn register(&self, name: &str) -> Registration {
        self.register_as(name, ValueKind::Text)
    }

    /// Bind `name` to form state. Re-registering on a later render pass
    /// returns the current binding.
    pub fn register_as(&self, name: &str, kind: ValueKind) -> Registration {
        let mut inner = self.lock();
        match inner.registered.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = kind,
            None => {
                tracing::debug!("Registering field {} as {:?}", name, kind);
                inner.registered.push((name.to_string(), kind));
            }
        }
        let value = inner
            .state
            .values
            .entry(name.to_string())
            .or_insert_with(|| kind.initial())
            .clone();
        Registration::new(name, kind, value)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.lock().registered.iter().any(|(n, _)| n == name)
    }

    /// Registered field names in registration order
    pub fn registered(&self) -> Vec<String> {
        self.lock()
            .registered
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }

    pub fn set_value(&self, name: &str, value: impl Into<Value>) {
        self.lock()
            .state
            .values
            .insert(name.to_string(), value.into());
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        self.lock().state.values.get(name).cloned()
    }

    pub fn values(&self) -> FormValues {
        self.lock().state.values.clone()
    }

    pub fn error(&self, name: &str) -> Option<FieldError> {
        self.lock().state.errors.get(name).cloned()
    }

    pub fn errors(&self) -> FieldErrors {
        self.lock().state.errors.clone()
    }

    pub fn set_field_error(&self, name: &str, error: FieldError) {
        self.error_setter().set(name, error);
    }

    pub fn clear_error(&self, name: &str) {
        self.lock().state.errors.remove(name);
    }

    pub fn clear_errors(&self) {
        self.lock().state.errors.clear();
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().state.is_submitting
    }

    pub fn state(&self) -> FormState {
        self.lock().state.clone()
    }

    pub fn error_setter(&self) -> ErrorSetter {
        ErrorSetter {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Back to the default values with no errors. Registrations are kept.
    pub fn reset(&self) {
        let mut inner = self.lock();
        let mut values = self.options.default_values.clone();
        for (name, kind) in &inner.registered {
            values
                .entry(name.clone())
                .or_insert_with(|| kind.initial());
        }
        inner.state = FormState {
            values,
            ..FormState::default()
        };
    }

    /// Copy the registered fields out of a submission into form state
    fn read_event(&self, event: &SubmitEvent) {
        let mut inner = self.lock();
        let Inner { state, registered } = &mut *inner;
        for (name, kind) in registered.iter() {
            let posted = event.get(name);
            match (kind, posted) {
                (ValueKind::Text, Some(raw)) => {
                    state.values.insert(name.clone(), Value::String(raw.to_string()));
                }
                (ValueKind::Text, None) => {}
                (ValueKind::Flag, raw) => {
                    let checked = raw
                        .map(|raw| BooleanSchema::cast(&Value::String(raw.to_string())).unwrap_or(true))
                        .unwrap_or(false);
                    state.values.insert(name.clone(), Value::Bool(checked));
                }
            }
        }
    }

    fn registered_values(&self) -> FormValues {
        let inner = self.lock();
        inner
            .registered
            .iter()
            .map(|(name, kind)| {
                let value = inner
                    .state
                    .values
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| kind.initial());
                (name.clone(), value)
            })
            .collect()
    }

    /// Validate the submission and, when valid, hand the parsed values to
    /// `on_valid`.
    ///
    /// `is_submitting` stays true until `on_valid` settles. If the returned
    /// future is dropped before then, the flag is never cleared.
    pub async fn submit<F, Fut, T>(&self, event: SubmitEvent, on_valid: F) -> SubmitOutcome<T>
    where
        F: FnOnce(FormValues, ErrorSetter, SubmitEvent) -> Fut,
        Fut: Future<Output = T>,
    {
        self.read_event(&event);
        self.lock().state.is_submitting = true;

        let candidate = self.registered_values();
        let parsed = match &self.schema {
            Some(schema) => schema.validate(&candidate),
            None => Ok(candidate),
        };

        match parsed {
            Err(errors) => {
                tracing::info!("Form submission rejected: {} invalid field(s)", errors.len());
                let mut inner = self.lock();
                inner.state.errors = errors;
                inner.state.is_submitting = false;
                SubmitOutcome::Invalid
            }
            Ok(values) => {
                {
                    let mut inner = self.lock();
                    inner.state.errors.clear();
                    for (name, value) in &values {
                        inner.state.values.insert(name.clone(), value.clone());
                    }
                }
                tracing::debug!("Form submission valid with {} field(s)", values.len());
                let output = on_valid(values, self.error_setter(), event).await;
                self.lock().state.is_submitting = false;
                SubmitOutcome::Submitted(output)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::schema::{ObjectSchema, StringSchema};
    use serde_json::json;

    fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .field("name", StringSchema::new().required().label("Name"))
            .field("summary", StringSchema::new().label("Summary"))
    }

    fn controller() -> FormController {
        let controller = FormController::with_schema(schema(), FormOptions::default());
        controller.register("name");
        controller.register("summary");
        controller
    }

    #[test]
    fn test_register_seeds_from_defaults() {
        let options = FormOptions::new().default_value("name", "Ada");
        let controller = FormController::new(options);

        assert_eq!(controller.register("name").text(), "Ada");
        assert_eq!(controller.register("summary").value(), &json!(""));
        assert_eq!(controller.register_as("subscribe", ValueKind::Flag).value(), &json!(false));
        assert_eq!(controller.registered(), vec!["name", "summary", "subscribe"]);
    }

    #[test]
    fn test_register_is_idempotent() {
        let controller = FormController::new(FormOptions::default());
        controller.register("name");
        controller.set_value("name", "Grace");

        let again = controller.register("name");
        assert_eq!(again.text(), "Grace");
        assert_eq!(controller.registered().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_valid_calls_back_once_with_registered_fields() {
        let controller = controller();
        let event = SubmitEvent::new()
            .field("name", "Ada")
            .field("summary", "x")
            .field("unregistered", "ignored");

        let mut calls = Vec::new();
        let outcome = controller
            .submit(event, |values, _errors, _event| {
                calls.push(values);
                async {}
            })
            .await;

        assert!(outcome.is_submitted());
        assert_eq!(calls.len(), 1);
        assert_eq!(
            Value::Object(calls.remove(0)),
            json!({ "name": "Ada", "summary": "x" })
        );
        assert!(!controller.is_submitting());
    }

    #[tokio::test]
    async fn test_submit_invalid_skips_callback() {
        let controller = controller();
        let event = SubmitEvent::new().field("name", "").field("summary", "x");

        let mut called = false;
        let outcome = controller
            .submit(event, |_, _, _| {
                called = true;
                async {}
            })
            .await;

        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert!(!called);
        let error = controller.error("name").unwrap();
        assert_eq!(error.kind, ErrorKind::Required);
        assert!(!error.message.is_empty());
        assert!(controller.error("summary").is_none());
        assert!(!controller.is_submitting());
        // posted values survive for the re-render
        assert_eq!(controller.value("summary"), Some(json!("x")));
    }

    #[tokio::test]
    async fn test_successful_submit_clears_previous_errors() {
        let controller = controller();
        controller
            .submit(SubmitEvent::new().field("name", ""), |_, _, _| async {})
            .await;
        assert!(controller.error("name").is_some());

        controller
            .submit(SubmitEvent::new().field("name", "Ada"), |_, _, _| async {})
            .await;
        assert!(controller.errors().is_empty());
    }

    #[tokio::test]
    async fn test_is_submitting_while_callback_runs() {
        let controller = controller();
        let observer = controller.clone();

        let seen = controller
            .submit(SubmitEvent::new().field("name", "Ada"), |_, _, _| async move {
                observer.is_submitting()
            })
            .await;

        assert_eq!(seen, SubmitOutcome::Submitted(true));
        assert!(!controller.is_submitting());
    }

    #[tokio::test]
    async fn test_callback_can_report_field_errors() {
        let controller = controller();

        controller
            .submit(SubmitEvent::new().field("name", "admin"), |values, errors, _| async move {
                if values["name"] == "admin" {
                    errors.set("name", FieldError::custom("Name is already taken"));
                }
            })
            .await;

        assert_eq!(
            controller.error("name"),
            Some(FieldError::custom("Name is already taken"))
        );
    }

    #[tokio::test]
    async fn test_submit_without_schema_passes_values_through() {
        let controller = FormController::new(FormOptions::default());
        controller.register("note");
        controller.register_as("agree", ValueKind::Flag);

        let outcome = controller
            .submit(SubmitEvent::new().field("note", "hi"), |values, _, _| async move { values })
            .await;

        assert_eq!(
            outcome,
            SubmitOutcome::Submitted(
                json!({ "note": "hi", "agree": false }).as_object().cloned().unwrap()
            )
        );
    }

    #[test]
    fn test_checkbox_values_from_event() {
        let controller = FormController::new(FormOptions::default());
        controller.register_as("agree", ValueKind::Flag);

        controller.read_event(&SubmitEvent::new().field("agree", "on"));
        assert_eq!(controller.value("agree"), Some(json!(true)));

        controller.read_event(&SubmitEvent::new());
        assert_eq!(controller.value("agree"), Some(json!(false)));
    }

    #[test]
    fn test_reset_restores_defaults() {
        let options = FormOptions::new().default_value("name", "Ada");
        let controller = FormController::new(options);
        controller.register("name");
        controller.register("summary");
        controller.set_value("name", "Grace");
        controller.set_field_error("name", FieldError::custom("nope"));

        controller.reset();

        let state = controller.state();
        assert!(!state.has_errors());
        assert!(!state.is_submitting);
        assert_eq!(Value::Object(state.values), json!({ "name": "Ada", "summary": "" }));
    }

    #[tokio::test]
    async fn test_parsed_values_are_kept_in_state() {
        let schema = ObjectSchema::new()
            .field("name", StringSchema::new().required().trim().label("Name"));
        let controller = FormController::with_schema(schema, FormOptions::default());
        controller.register("name");

        controller
            .submit(SubmitEvent::new().field("name", "  admin "), |_, errors, _| async move {
                errors.set("name", FieldError::custom("Name is already taken"));
            })
            .await;

        assert_eq!(controller.value("name"), Some(json!("admin")));
        assert_eq!(controller.register("name").text(), "admin");
        assert!(controller.error("name").is_some());
    }

    #[test]
    fn test_submit_event_last_value_wins() {
        let event: SubmitEvent = vec![("a", "1"), ("a", "2")].into_iter().collect();
        assert_eq!(event.get("a"), Some("2"));
        assert_eq!(event.get("b"), None);
    }
}
