//! Request handlers: form, predict, report download, health, fallback.
//!
//! Each handler is a single pass: presence validation, sanitizer,
//! adapter or renderer, response. Failures map onto HTTP statuses
//! (400 validation, 500 unavailable/internal); internal detail is
//! logged server-side and never returned to the caller.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::{Form, Json};
use chrono::{Local, Utc};
use colored::Colorize;

use crate::error::CultivarError;
use crate::report;
use crate::sanitize::{sanitize_text, FeatureVector, MAX_CROP_LEN};

use super::pages;
use super::types::{AppState, HealthResponse};

/// Form bodies are taken as a raw string map so presence checks can
/// run field by field in declaration order.
type FormBody = Result<Form<HashMap<String, String>>, FormRejection>;

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// GET / - static input form
pub(crate) async fn home() -> Html<&'static str> {
    Html(pages::INDEX)
}

/// POST /predict - validate, infer, render the result view
pub(crate) async fn predict(State(state): State<Arc<AppState>>, form: FormBody) -> Response {
    let response = predict_inner(&state, form);
    state.metrics.record(response.status());
    response
}

fn predict_inner(state: &AppState, form: FormBody) -> Response {
    let Ok(Form(fields)) = form else {
        return error_response(StatusCode::BAD_REQUEST, "Bad request - Invalid input data");
    };

    let features = match FeatureVector::from_form(&fields) {
        Ok(features) => features,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let Some(models) = state.models.as_ref() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &CultivarError::ModelsUnavailable.to_string(),
        );
    };

    match models.recommend(&features) {
        Ok(label) => Html(pages::result_page(&label, &features.echo_params())).into_response(),
        Err(e) => {
            eprintln!(
                "{}",
                format!("Prediction error: {}", e.internal_detail()).red()
            );
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

/// POST /download_report - validate, lay out the PDF, stream it back
pub(crate) async fn download_report(
    State(state): State<Arc<AppState>>,
    form: FormBody,
) -> Response {
    let response = download_report_inner(form);
    state.metrics.record(response.status());
    response
}

fn download_report_inner(form: FormBody) -> Response {
    let Ok(Form(fields)) = form else {
        return error_response(StatusCode::BAD_REQUEST, "Bad request - Invalid input data");
    };

    // The crop label is checked first, then the seven numeric fields.
    // The label is caller-supplied display text; no inference is rerun
    // on this path.
    let crop_raw = match fields.get("crop") {
        Some(crop) if !crop.trim().is_empty() => crop.clone(),
        _ => {
            return error_response(StatusCode::BAD_REQUEST, "Missing required field: crop");
        }
    };

    let features = match FeatureVector::from_form(&fields) {
        Ok(features) => features,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let crop = sanitize_text(&crop_raw, MAX_CROP_LEN);
    let now = Local::now();

    let bytes = match report::render_report(&crop, &features.report_params(), now) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!(
                "{}",
                format!("PDF generation error: {}", e.internal_detail()).red()
            );
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    let disposition = format!(
        "attachment; filename=\"{}\"",
        report::report_filename(&crop, now)
    );
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

/// GET /health - model-load status and timestamp; always 200
pub(crate) async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    use std::sync::atomic::Ordering;

    Json(HealthResponse {
        status: if state.models_loaded() {
            "healthy".to_string()
        } else {
            "degraded".to_string()
        },
        models_loaded: state.models_loaded(),
        timestamp: Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.metrics.uptime_seconds(),
        requests_total: state.metrics.requests_total.load(Ordering::Relaxed),
    })
}

/// Fallback for unknown routes
pub(crate) async fn fallback() -> Response {
    error_response(StatusCode::NOT_FOUND, "Endpoint not found")
}
