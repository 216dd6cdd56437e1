//! End-to-end tests for the HTTP surface: routing, validation,
//! degraded-state behavior, and the PDF download path.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use cultivar::model::{
    CropClassifier, DecisionTree, LabelDecoder, ModelBundle, TreeNode, N_FEATURES,
};
use cultivar::server::{self, AppState, HealthResponse};

/// Forest of stumps: rainfall (feature 6) above 150 mm votes "rice",
/// otherwise "maize".
fn test_bundle() -> ModelBundle {
    let stump = DecisionTree {
        nodes: vec![
            TreeNode::Split {
                feature: 6,
                threshold: 150.0,
                left: 1,
                right: 2,
            },
            TreeNode::Leaf { class: 0 },
            TreeNode::Leaf { class: 1 },
        ],
    };
    ModelBundle {
        classifier: CropClassifier {
            n_features: N_FEATURES,
            trees: vec![stump.clone(), stump.clone(), stump],
        },
        decoder: LabelDecoder {
            classes: vec!["maize".to_string(), "rice".to_string()],
        },
    }
}

fn app() -> Router {
    server::router(Arc::new(AppState::with_bundle(Some(test_bundle()))))
}

fn degraded_app() -> Router {
    server::router(Arc::new(AppState::with_bundle(None)))
}

fn rice_fields() -> Vec<(&'static str, String)> {
    vec![
        ("N", "90".to_string()),
        ("P", "42".to_string()),
        ("K", "43".to_string()),
        ("temperature", "20.8".to_string()),
        ("humidity", "82".to_string()),
        ("ph", "6.5".to_string()),
        ("rainfall", "202.9".to_string()),
    ]
}

fn encode_form(fields: &[(&str, String)]) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

fn form_post(uri: &str, fields: &[(&str, String)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(encode_form(fields)))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn error_message(response: axum::response::Response) -> String {
    let bytes = body_bytes(response).await;
    let json: serde_json::Value = serde_json::from_slice(&bytes).expect("error body is JSON");
    json["error"].as_str().expect("error field present").to_string()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// ============================================================================
// A. Home and unknown routes
// ============================================================================

#[tokio::test]
async fn test_home_serves_form() {
    let response = app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    assert!(contains(&body, b"name=\"rainfall\""));
}

#[tokio::test]
async fn test_unknown_route_returns_json_404() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(response).await, "Endpoint not found");
}

// ============================================================================
// B. /predict validation
// ============================================================================

#[tokio::test]
async fn test_predict_valid_vector_returns_result_view() {
    let response = app()
        .oneshot(form_post("/predict", &rice_fields()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    assert!(contains(&body, b"Recommended crop: rice"));
    assert!(contains(&body, b"202.9"));
}

#[tokio::test]
async fn test_predict_deterministic_across_requests() {
    let first = app()
        .oneshot(form_post("/predict", &rice_fields()))
        .await
        .unwrap();
    let second = app()
        .oneshot(form_post("/predict", &rice_fields()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_bytes(first).await, body_bytes(second).await);
}

#[tokio::test]
async fn test_predict_missing_each_field_is_400_never_500() {
    for (name, _) in rice_fields() {
        let fields: Vec<_> = rice_fields().into_iter().filter(|(k, _)| *k != name).collect();
        let response = app().oneshot(form_post("/predict", &fields)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "field {name}");
        let msg = error_message(response).await;
        assert!(
            msg.contains("Missing required field"),
            "unexpected message for {name}: {msg}"
        );
    }
}

#[tokio::test]
async fn test_predict_out_of_range_names_the_field() {
    let cases = [
        ("N", "201", "Nitrogen (N)"),
        ("P", "-3", "Phosphorus (P)"),
        ("K", "200.5", "Potassium (K)"),
        ("temperature", "-60", "Temperature"),
        ("humidity", "101", "Humidity"),
        ("ph", "14.5", "pH Level"),
        ("rainfall", "1001", "Rainfall"),
    ];
    for (name, bad, label) in cases {
        let fields: Vec<_> = rice_fields()
            .into_iter()
            .map(|(k, v)| (k, if k == name { bad.to_string() } else { v }))
            .collect();
        let response = app().oneshot(form_post("/predict", &fields)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "field {name}");
        let msg = error_message(response).await;
        assert!(msg.contains(label), "message for {name} should name {label}: {msg}");
    }
}

#[tokio::test]
async fn test_predict_accepts_exact_bounds() {
    // Every field at its minimum, then every field at its maximum;
    // both vectors are in range so validation must pass.
    for fields in [
        vec![
            ("N", "0".to_string()),
            ("P", "0".to_string()),
            ("K", "0".to_string()),
            ("temperature", "-50".to_string()),
            ("humidity", "0".to_string()),
            ("ph", "0".to_string()),
            ("rainfall", "0".to_string()),
        ],
        vec![
            ("N", "200".to_string()),
            ("P", "200".to_string()),
            ("K", "200".to_string()),
            ("temperature", "100".to_string()),
            ("humidity", "100".to_string()),
            ("ph", "14".to_string()),
            ("rainfall", "1000".to_string()),
        ],
    ] {
        let response = app().oneshot(form_post("/predict", &fields)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn test_predict_letters_only_is_field_specific_400() {
    let fields: Vec<_> = rice_fields()
        .into_iter()
        .map(|(k, v)| (k, if k == "humidity" { "soggy".to_string() } else { v }))
        .collect();
    let response = app().oneshot(form_post("/predict", &fields)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let msg = error_message(response).await;
    assert!(msg.contains("Humidity"));
}

#[tokio::test]
async fn test_predict_non_form_body_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"N\": 90}"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// C. Degraded state (artifacts absent)
// ============================================================================

#[tokio::test]
async fn test_predict_without_models_is_500_unavailable() {
    let response = degraded_app()
        .oneshot(form_post("/predict", &rice_fields()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let msg = error_message(response).await;
    assert!(msg.contains("Models not loaded"), "{msg}");
}

#[tokio::test]
async fn test_health_reports_degraded_state_with_200() {
    let response = degraded_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert!(!health.models_loaded);
    assert_eq!(health.status, "degraded");
}

// ============================================================================
// D. /health
// ============================================================================

#[tokio::test]
async fn test_health_well_formed_timestamp_and_status() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_bytes(response).await;
    let health: HealthResponse = serde_json::from_slice(&body).unwrap();
    assert!(health.models_loaded);
    assert_eq!(health.status, "healthy");
    assert!(
        chrono::DateTime::parse_from_rfc3339(&health.timestamp).is_ok(),
        "timestamp not RFC 3339: {}",
        health.timestamp
    );
}

// ============================================================================
// E. /download_report
// ============================================================================

fn report_fields() -> Vec<(&'static str, String)> {
    let mut fields = rice_fields();
    fields.insert(0, ("crop", "rice".to_string()));
    fields
}

#[tokio::test]
async fn test_download_report_returns_pdf_attachment() {
    let response = app()
        .oneshot(form_post("/download_report", &report_fields()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"crop_recommendation_rice_"));
    assert!(disposition.ends_with(".pdf\""));

    let body = body_bytes(response).await;
    assert!(body.starts_with(b"%PDF"));
    assert!(contains(&body, b"RICE"));
    for label in [
        "Nitrogen (N)",
        "Phosphorus (P)",
        "Potassium (K)",
        "Temperature",
        "Humidity",
        "pH Level",
        "Rainfall",
    ] {
        assert!(contains(&body, label.as_bytes()), "missing line {label}");
    }
}

#[tokio::test]
async fn test_download_report_missing_crop_is_400() {
    let response = app()
        .oneshot(form_post("/download_report", &rice_fields()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(response).await, "Missing required field: crop");
}

#[tokio::test]
async fn test_download_report_out_of_range_field_is_400() {
    let fields: Vec<_> = report_fields()
        .into_iter()
        .map(|(k, v)| (k, if k == "ph" { "99".to_string() } else { v }))
        .collect();
    let response = app()
        .oneshot(form_post("/download_report", &fields))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(error_message(response).await.contains("pH Level"));
}

#[tokio::test]
async fn test_download_report_works_without_models() {
    // The report path echoes the submitted label; it performs no
    // inference, so it must work even in the degraded state.
    let response = degraded_app()
        .oneshot(form_post("/download_report", &report_fields()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// F. End-to-end: artifacts on disk through AppState::initialize
// ============================================================================

#[tokio::test]
async fn test_state_initialized_from_artifact_files() {
    let dir = tempfile::tempdir().unwrap();
    let bundle = test_bundle();
    bundle
        .classifier
        .save(dir.path().join(cultivar::model::CLASSIFIER_FILE))
        .unwrap();
    bundle
        .decoder
        .save(dir.path().join(cultivar::model::DECODER_FILE))
        .unwrap();

    let config = server::ServerConfig {
        model_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let state = AppState::initialize(&config);
    assert!(state.models_loaded());

    let response = server::router(Arc::new(state))
        .oneshot(form_post("/predict", &rice_fields()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
