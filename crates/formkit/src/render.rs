// File: src/render.rs
// Purpose: Field renderer - controls, labels, inline feedback and buttons

use maud::{html, Markup, Render};

use crate::compose::resolve;
use crate::controller::Registration;
use crate::element::Element;
use crate::error::FieldError;
use crate::field::{field_id, Attrs, Choice, FieldDescriptor, FieldType};

/// Everything the composition pass injects into a field
#[derive(Debug, Clone)]
pub struct Bindings {
    pub label: Option<String>,
    pub required: bool,
    pub registration: Registration,
    pub error: Option<FieldError>,
}

impl Bindings {
    pub fn new(registration: Registration) -> Self {
        Self {
            label: None,
            required: false,
            registration,
            error: None,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn error(mut self, error: Option<FieldError>) -> Self {
        self.error = error;
        self
    }

    fn is_invalid(&self) -> bool {
        self.error.is_some()
    }
}

fn state_class(base: &str, invalid: bool) -> String {
    if invalid {
        format!("{} is-invalid", base)
    } else {
        base.to_string()
    }
}

fn group_class(base: &str, required: bool) -> String {
    if required {
        format!("{} required", base)
    } else {
        base.to_string()
    }
}

/// The input control for a field, or `None` for a type with no renderer
pub fn render_control(descriptor: &FieldDescriptor, bindings: &Bindings) -> Option<Markup> {
    let control = match &descriptor.field_type {
        FieldType::Text => text_input(descriptor, bindings),
        FieldType::Textarea => textarea(descriptor, bindings),
        FieldType::Checkbox => checkbox(descriptor, bindings),
        FieldType::RadioList => radio_list(descriptor, bindings),
        FieldType::Other(_) => return None,
    };
    Some(control)
}

fn text_input(descriptor: &FieldDescriptor, bindings: &Bindings) -> Markup {
    Element::void("input")
        .attr("type", "text")
        .attr("class", state_class("form-control", bindings.is_invalid()))
        .attr("id", descriptor.id())
        .attr("name", &descriptor.name)
        .attr("value", bindings.registration.text())
        .attrs(&descriptor.input_options)
        .render()
}

fn textarea(descriptor: &FieldDescriptor, bindings: &Bindings) -> Markup {
    Element::new("textarea")
        .attr("class", state_class("form-control", bindings.is_invalid()))
        .attr("id", descriptor.id())
        .attr("name", &descriptor.name)
        .attrs(&descriptor.input_options)
        .body(bindings.registration.text())
        .render()
}

fn checkbox(descriptor: &FieldDescriptor, bindings: &Bindings) -> Markup {
    Element::void("input")
        .attr("type", "checkbox")
        .attr("class", state_class("form-check-input", bindings.is_invalid()))
        .attr("id", descriptor.id())
        .attr("name", &descriptor.name)
        .attr("value", "true")
        .flag_if("checked", bindings.registration.is_checked())
        .attrs(&descriptor.input_options)
        .render()
}

fn choice_id(descriptor: &FieldDescriptor, choice: &Choice) -> String {
    field_id(&format!("{} {}", descriptor.name, choice.value))
}

fn radio_list(descriptor: &FieldDescriptor, bindings: &Bindings) -> Markup {
    let current = bindings.registration.text();
    html! {
        @for choice in &descriptor.choices {
            @let id = choice_id(descriptor, choice);
            div class="form-check" {
                (Element::void("input")
                    .attr("type", "radio")
                    .attr("class", state_class("form-check-input", bindings.is_invalid()))
                    .attr("id", id.as_str())
                    .attr("name", &descriptor.name)
                    .attr("value", &choice.value)
                    .flag_if("checked", choice.value == current)
                    .attrs(&descriptor.input_options))
                label class="form-check-label" for=(id) { (choice.label) }
            }
        }
    }
}

/// `<label for=...>` tied to the control; nothing when there is no label
pub fn render_label(id: &str, label: Option<&str>, base: &Attrs) -> Option<Markup> {
    let label = label?;
    let mut attrs = Attrs::new().with("for", id);
    attrs.merge(base);
    Some(Element::new("label").attrs(&attrs).body(label).render())
}

/// Inline error message; rendered only while the field has an error
pub fn invalid_feedback(error: Option<&FieldError>) -> Option<Markup> {
    error.map(|error| {
        html! {
            div class="invalid-feedback d-block" { (error.message) }
        }
    })
}

/// A complete field: wrapper, label, control and inline feedback.
///
/// A field whose type has no renderer keeps its label and feedback slot
/// but gets no control.
pub fn render_field(descriptor: &FieldDescriptor, bindings: &Bindings) -> Markup {
    let id = descriptor.id();
    let control = render_control(descriptor, bindings);
    let feedback = invalid_feedback(bindings.error.as_ref());
    let label = bindings.label.as_deref();

    match descriptor.field_type {
        FieldType::Checkbox => {
            let mut label_attrs = Attrs::new().with("class", "form-check-label");
            label_attrs.merge(&descriptor.label_options);
            html! {
                div class=(group_class("form-group form-check", bindings.required)) {
                    @if let Some(control) = control { (control) }
                    @if let Some(label) = render_label(&id, label, &label_attrs) { (label) }
                    @if let Some(feedback) = feedback { (feedback) }
                }
            }
        }
        FieldType::RadioList => html! {
            fieldset class=(group_class("form-group", bindings.required)) id=(id) {
                @if let Some(label) = label {
                    (Element::new("legend").attrs(&descriptor.label_options).body(label))
                }
                @if let Some(control) = control { (control) }
                @if let Some(feedback) = feedback { (feedback) }
            }
        },
        _ => html! {
            div class=(group_class("form-group", bindings.required)) {
                @if let Some(label) = render_label(&id, label, &descriptor.label_options) { (label) }
                @if let Some(control) = control { (control) }
                @if let Some(feedback) = feedback { (feedback) }
            }
        },
    }
}

/// Submit control; disables itself while the form is submitting
#[derive(Debug, Clone, Default)]
pub struct SubmitButton {
    pub label: Option<String>,
    pub attrs: Attrs,
}

impl SubmitButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(key, value);
        self
    }

    pub fn render(&self, is_submitting: bool) -> Markup {
        Element::new("button")
            .attr("type", "submit")
            .attr("class", "btn btn-block btn-primary")
            .flag_if("disabled", is_submitting)
            .attrs(&self.attrs)
            .body(resolve(self.label.clone(), None, "Submit".to_string()))
            .render()
    }
}

/// Reset control. Needs no form state, so it composes as passthrough.
#[derive(Debug, Clone, Default)]
pub struct ResetButton {
    pub label: Option<String>,
    pub attrs: Attrs,
}

impl ResetButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(key, value);
        self
    }
}

impl Render for ResetButton {
    fn render(&self) -> Markup {
        Element::new("button")
            .attr("type", "reset")
            .attr("class", "btn btn-block btn-primary")
            .attrs(&self.attrs)
            .body(resolve(self.label.clone(), None, "Reset".to_string()))
            .render()
    }
}
