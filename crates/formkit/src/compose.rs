// File: src/compose.rs
// Purpose: Composition layer - classify declared children and inject bindings

use maud::{Markup, Render};
use std::collections::HashSet;

use crate::config::UnknownFieldPolicy;
use crate::controller::FormController;
use crate::element::Element;
use crate::error::FormError;
use crate::field::{Attrs, Choice, FieldDescriptor, FieldType};
use crate::render::{render_field, Bindings, ResetButton, SubmitButton};
use crate::adapter;

/// Layered default: the caller's explicit value, else the derived one,
/// else the fallback
pub fn resolve<T>(explicit: Option<T>, derived: Option<T>, fallback: T) -> T {
    explicit.or(derived).unwrap_or(fallback)
}

/// A declared child of a form, tagged with its role when it is declared
#[derive(Debug, Clone)]
pub enum Child {
    Field(FieldDescriptor),
    Checkbox(FieldDescriptor),
    RadioList(FieldDescriptor),
    Submit(SubmitButton),
    /// Rendered untouched
    Passthrough(Markup),
}

/// What the composition pass does with a child
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Input,
    Submit,
    Passthrough,
}

impl Child {
    pub fn text(name: impl Into<String>) -> Self {
        Child::Field(FieldDescriptor::text(name))
    }

    pub fn textarea(name: impl Into<String>) -> Self {
        Child::Field(FieldDescriptor::textarea(name))
    }

    pub fn checkbox(name: impl Into<String>) -> Self {
        Child::Checkbox(FieldDescriptor::checkbox(name))
    }

    pub fn radio_list(name: impl Into<String>, choices: impl IntoIterator<Item = Choice>) -> Self {
        Child::RadioList(FieldDescriptor::radio_list(name, choices))
    }

    pub fn passthrough(markup: impl Render) -> Self {
        Child::Passthrough(markup.render())
    }

    pub fn role(&self) -> Role {
        match self {
            Child::Field(_) | Child::Checkbox(_) | Child::RadioList(_) => Role::Input,
            Child::Submit(_) => Role::Submit,
            Child::Passthrough(_) => Role::Passthrough,
        }
    }

    pub fn descriptor(&self) -> Option<&FieldDescriptor> {
        match self {
            Child::Field(d) | Child::Checkbox(d) | Child::RadioList(d) => Some(d),
            Child::Submit(_) | Child::Passthrough(_) => None,
        }
    }
}

impl From<FieldDescriptor> for Child {
    fn from(descriptor: FieldDescriptor) -> Self {
        match descriptor.field_type {
            FieldType::Checkbox => Child::Checkbox(descriptor),
            FieldType::RadioList => Child::RadioList(descriptor),
            _ => Child::Field(descriptor),
        }
    }
}

impl From<SubmitButton> for Child {
    fn from(button: SubmitButton) -> Self {
        Child::Submit(button)
    }
}

impl From<ResetButton> for Child {
    fn from(button: ResetButton) -> Self {
        Child::Passthrough(button.render())
    }
}

impl From<Markup> for Child {
    fn from(markup: Markup) -> Self {
        Child::Passthrough(markup)
    }
}

/// A child after bindings have been injected
#[derive(Debug, Clone)]
pub enum Composed {
    Field {
        descriptor: FieldDescriptor,
        bindings: Bindings,
    },
    Submit {
        button: SubmitButton,
        is_submitting: bool,
    },
    Passthrough(Markup),
}

impl Render for Composed {
    fn render(&self) -> Markup {
        match self {
            Composed::Field { descriptor, bindings } => render_field(descriptor, bindings),
            Composed::Submit { button, is_submitting } => button.render(*is_submitting),
            Composed::Passthrough(markup) => markup.clone(),
        }
    }
}

fn bind_field(descriptor: &FieldDescriptor, controller: &FormController) -> Bindings {
    let meta = adapter::describe(controller.schema(), &descriptor.name);
    let registration = controller.register_as(&descriptor.name, descriptor.field_type.value_kind());

    Bindings {
        label: resolve(descriptor.label.clone().map(Some), meta.label.map(Some), None),
        required: resolve(descriptor.required, Some(meta.required), false),
        registration,
        error: controller.error(&descriptor.name),
    }
}

/// One synchronous pass over the declared children, in order.
///
/// Input children are registered with the controller and receive their
/// label, required flag, registration and current error. The submit child
/// receives the submitting flag. Everything else passes through.
pub fn compose(children: &[Child], controller: &FormController) -> Result<Vec<Composed>, FormError> {
    let mut seen = HashSet::new();
    let mut composed = Vec::with_capacity(children.len());

    for child in children {
        let item = match child {
            Child::Field(descriptor) | Child::Checkbox(descriptor) | Child::RadioList(descriptor) => {
                if !seen.insert(descriptor.name.as_str()) {
                    return Err(FormError::DuplicateField(descriptor.name.clone()));
                }
                if !descriptor.field_type.is_known() {
                    match controller.options().unknown_fields {
                        UnknownFieldPolicy::Reject => {
                            return Err(FormError::UnknownFieldType {
                                name: descriptor.name.clone(),
                                field_type: descriptor.field_type.to_string(),
                            })
                        }
                        UnknownFieldPolicy::Ignore => tracing::warn!(
                            "Field {} has unknown type {}; rendering without a control",
                            descriptor.name,
                            descriptor.field_type
                        ),
                    }
                }
                Composed::Field {
                    descriptor: descriptor.clone(),
                    bindings: bind_field(descriptor, controller),
                }
            }
            Child::Submit(button) => Composed::Submit {
                button: button.clone(),
                is_submitting: controller.is_submitting(),
            },
            Child::Passthrough(markup) => Composed::Passthrough(markup.clone()),
        };
        composed.push(item);
    }

    tracing::debug!("Composed {} form children", composed.len());
    Ok(composed)
}

/// Declarative form: the declared children plus attributes for `<form>`
#[derive(Debug, Clone, Default)]
pub struct Form {
    children: Vec<Child>,
    attrs: Attrs,
}

impl Form {
    pub fn new(children: impl IntoIterator<Item = Child>) -> Self {
        Self {
            children: children.into_iter().collect(),
            attrs: Attrs::new(),
        }
    }

    pub fn child(mut self, child: impl Into<Child>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(key, value);
        self
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    /// Register every input child without rendering, e.g. before handling a
    /// submission
    pub fn register(&self, controller: &FormController) -> Result<(), FormError> {
        compose(&self.children, controller).map(|_| ())
    }

    pub fn render(&self, controller: &FormController) -> Result<Markup, FormError> {
        let composed = compose(&self.children, controller)?;
        let body = maud::html! {
            @for item in &composed { (item) }
        };
        Ok(Element::new("form")
            .attr("method", "post")
            .attrs(&self.attrs)
            .body(body)
            .render())
    }
}
