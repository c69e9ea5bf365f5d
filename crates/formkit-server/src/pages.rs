// File: src/pages.rs
// Purpose: Page layout and the profile form declaration

use formkit::{Child, Form, ObjectSchema, StringSchema, SubmitButton};
use maud::{html, Markup, DOCTYPE};

/// Schema for the profile form
pub fn profile_schema() -> ObjectSchema {
    ObjectSchema::new()
        .field("name", StringSchema::new().required().trim().label("Name"))
        .field("summary", StringSchema::new().max_length(500).label("Summary"))
}

/// The profile form as declared markup
pub fn profile_form() -> Form {
    Form::new(vec![
        Child::text("name"),
        Child::textarea("summary"),
        SubmitButton::new()
            .label("Save")
            .attr("class", "btn btn-block btn-success")
            .into(),
    ])
    .attr("novalidate", "")
}

pub fn layout(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/bootstrap@4.6.2/dist/css/bootstrap.min.css";
            }
            body {
                div class="container-fluid" {
                    div class="jumbotron m-5" { (content) }
                }
            }
        }
    }
}

/// Confirmation shown after a successful save
pub fn saved(data: &str) -> Markup {
    html! {
        div class="alert alert-success" role="alert" { "Saved" }
        pre id="submitted" { (data) }
        a href="/" class="btn btn-link" { "Back" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formkit::{FormController, FormOptions};

    #[test]
    fn test_profile_form_renders() {
        let controller = FormController::with_schema(profile_schema(), FormOptions::default());
        let html = profile_form().render(&controller).unwrap().into_string();

        assert!(html.starts_with(r#"<form method="post" novalidate="">"#));
        assert!(html.contains(r#"<div class="form-group required"><label for="field-name">Name</label>"#));
        assert!(html.contains(r#"<label for="field-summary">Summary</label>"#));
        assert!(html.contains(">Save</button>"));
    }

    #[test]
    fn test_saved_escapes_payload() {
        let html = saved(r#"{"name":"<b>"}"#).into_string();
        assert!(html.contains("&quot;name&quot;:&quot;&lt;b&gt;&quot;"));
    }
}
