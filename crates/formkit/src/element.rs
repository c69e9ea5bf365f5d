// File: src/element.rs
// Purpose: Minimal element builder for tags whose attributes come from caller bags

use maud::{Markup, PreEscaped, Render};

use crate::field::Attrs;

/// A single HTML element with an ordered attribute bag.
///
/// maud's `html!` cannot spread arbitrary attributes, so controls are built
/// with this and spliced into templates as `(element)`.
#[derive(Debug, Clone)]
pub struct Element {
    name: &'static str,
    attrs: Attrs,
    body: Option<Markup>,
}

impl Element {
    /// Element with a closing tag
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            attrs: Attrs::new(),
            body: Some(PreEscaped(String::new())),
        }
    }

    /// Void element such as `input`
    pub fn void(name: &'static str) -> Self {
        Self {
            name,
            attrs: Attrs::new(),
            body: None,
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.set(key, value);
        self
    }

    pub fn flag_if(mut self, key: impl Into<String>, on: bool) -> Self {
        if on {
            self.attrs.flag(key);
        }
        self
    }

    /// Layer a caller bag over what has been set so far
    pub fn attrs(mut self, attrs: &Attrs) -> Self {
        self.attrs.merge(attrs);
        self
    }

    pub fn body(mut self, content: impl Render) -> Self {
        if self.body.is_some() {
            self.body = Some(content.render());
        }
        self
    }

    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key)
    }
}

impl Render for Element {
    fn render_to(&self, buffer: &mut String) {
        buffer.push('<');
        buffer.push_str(self.name);
        self.attrs.render_to(buffer);
        buffer.push('>');
        if let Some(body) = &self.body {
            buffer.push_str(&body.0);
            buffer.push_str("</");
            buffer.push_str(self.name);
            buffer.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_void_element() {
        let input = Element::void("input").attr("name", "email").flag_if("required", true);
        assert_eq!(input.render().into_string(), r#"<input name="email" required>"#);
    }

    #[test]
    fn test_body_is_escaped() {
        let textarea = Element::new("textarea").attr("name", "bio").body("<script>");
        assert_eq!(
            textarea.render().into_string(),
            r#"<textarea name="bio">&lt;script&gt;</textarea>"#
        );
    }

    #[test]
    fn test_caller_attrs_win() {
        let button = Element::new("button")
            .attr("class", "btn")
            .attrs(&Attrs::new().with("class", "btn btn-success"))
            .body("Save");
        assert_eq!(
            button.render().into_string(),
            r#"<button class="btn btn-success">Save</button>"#
        );
    }
}
