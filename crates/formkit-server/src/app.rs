// File: src/app.rs
// Purpose: Router and handlers for the profile form

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::get,
    Form as Posted, Router,
};
use formkit::{FieldError, FormController, FormOptions, Schema, SubmitEvent, SubmitOutcome};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::AppError;
use crate::pages::{layout, profile_form, profile_schema, saved};

/// Names that belong to the system and cannot be claimed by a profile
const RESERVED_NAMES: &[&str] = &["admin", "root"];

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    schema: Arc<dyn Schema>,
    options: Arc<FormOptions>,
}

impl AppState {
    pub fn new(options: FormOptions) -> Self {
        Self {
            schema: Arc::new(profile_schema()),
            options: Arc::new(options),
        }
    }

    /// Fresh controller per request; the schema snapshot is shared
    fn controller(&self) -> FormController {
        FormController::with_shared_schema(Arc::clone(&self.schema), (*self.options).clone())
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(show_form).post(submit_form))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn show_form(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let controller = state.controller();
    let form = profile_form().render(&controller)?;
    Ok(Html(layout("Profile", form).into_string()))
}

async fn submit_form(
    State(state): State<AppState>,
    Posted(fields): Posted<Vec<(String, String)>>,
) -> Result<(StatusCode, Html<String>), AppError> {
    let controller = state.controller();
    let form = profile_form();
    form.register(&controller)?;

    let event: SubmitEvent = fields.into_iter().collect();
    let outcome = controller
        .submit(event, |values, errors, _event| async move {
            let name = values
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_default();
            if RESERVED_NAMES.contains(&name.to_lowercase().as_str()) {
                errors.set("name", FieldError::custom("Name is already taken"));
                return None;
            }
            Some(values)
        })
        .await;

    match outcome {
        SubmitOutcome::Submitted(Some(values)) => {
            info!("Profile saved for {:?}", values.get("name"));
            let data = serde_json::to_string_pretty(&values)?;
            Ok((StatusCode::OK, Html(layout("Saved", saved(&data)).into_string())))
        }
        SubmitOutcome::Submitted(None) | SubmitOutcome::Invalid => {
            let markup = form.render(&controller)?;
            Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(layout("Profile", markup).into_string()),
            ))
        }
    }
}
