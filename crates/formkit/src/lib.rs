//! # formkit
//!
//! Declarative forms on top of maud: declare the fields, hand over a schema,
//! and get labelled, validated markup plus parsed values on submit.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use formkit::{Child, Form, FormController, FormOptions, ObjectSchema, StringSchema, SubmitButton};
//!
//! let schema = ObjectSchema::new()
//!     .field("name", StringSchema::new().required().label("Name"))
//!     .field("summary", StringSchema::new().label("Summary"));
//!
//! let controller = FormController::with_schema(schema, FormOptions::default());
//! let form = Form::new(vec![
//!     Child::text("name"),
//!     Child::textarea("summary"),
//!     SubmitButton::new().label("Save").into(),
//! ]);
//!
//! let markup = form.render(&controller)?;
//!
//! // Later, with the posted fields:
//! let outcome = controller
//!     .submit(event, |values, errors, _event| async move { /* persist */ })
//!     .await;
//! ```
//!
//! ## Architecture
//!
//! - **`schema`** / **`adapter`** - schema model and the required/label queries
//! - **`render`** - field renderer (inputs, labels, inline feedback, buttons)
//! - **`controller`** - form state, registration and submission
//! - **`compose`** - walks declared children and injects bindings

pub mod adapter;
pub mod compose;
pub mod config;
pub mod controller;
pub mod element;
pub mod error;
pub mod field;
pub mod render;
pub mod schema;

pub use adapter::{describe, is_required, label_for};
pub use compose::{compose, resolve, Child, Composed, Form, Role};
pub use config::{FormOptions, UnknownFieldPolicy};
pub use controller::{
    ErrorSetter, FormController, FormState, Registration, SubmitEvent, SubmitOutcome, ValueKind,
};
pub use element::Element;
pub use error::{ErrorKind, FieldError, FieldErrors, FormError};
pub use field::{field_id, Attrs, Choice, FieldDescriptor, FieldType};
pub use render::{render_control, render_field, Bindings, ResetButton, SubmitButton};
pub use schema::{BooleanSchema, FieldMeta, ObjectSchema, Schema, SchemaNode, StringSchema};

// Re-export Maud so callers can build passthrough children
pub use maud::{html, Markup, PreEscaped};

/// Submitted values keyed by field name
pub type FormValues = serde_json::Map<String, serde_json::Value>;
