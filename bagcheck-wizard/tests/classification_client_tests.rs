//! Classification Client Integration Tests
//!
//! Runs the real HTTP strategies against in-process mock endpoints.

mod helpers;

use axum::http::StatusCode;
use bagcheck_wizard::models::{ImageUpload, ScoreSource};
use bagcheck_wizard::services::{ClassificationClient, ClassificationError};
use helpers::{sample_image, spawn_mock_endpoint, UNREACHABLE_URL};
use std::time::Duration;

fn material_photo() -> ImageUpload {
    ImageUpload::new(sample_image(), "image/jpeg").with_file_name("material.jpg")
}

#[tokio::test]
async fn test_primary_real_prediction_is_biased() {
    // Given: primary answers Real with 0.85
    let primary = spawn_mock_endpoint(
        StatusCode::OK,
        r#"{"predicted_label":"Real","confidence":0.85}"#,
        Duration::ZERO,
    )
    .await;
    let secondary = spawn_mock_endpoint(StatusCode::OK, r#"{"accuracy":10}"#, Duration::ZERO).await;
    let client = ClassificationClient::new(&primary.url, &secondary.url).unwrap();

    // When: classifying
    let classification = client.classify(&material_photo()).await.unwrap();

    // Then: 0.85 + 0.07 = 92, secondary never contacted
    assert_eq!(classification.score, 92);
    assert_eq!(classification.source, ScoreSource::Primary);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 0);
}

#[tokio::test]
async fn test_image_sent_as_multipart_file_field() {
    let primary = spawn_mock_endpoint(
        StatusCode::OK,
        r#"{"predicted_label":"Fake","confidence":0.30}"#,
        Duration::ZERO,
    )
    .await;
    let client = ClassificationClient::new(&primary.url, UNREACHABLE_URL).unwrap();

    let classification = client.classify(&material_photo()).await.unwrap();
    assert_eq!(classification.score, 70);

    let body = primary.last_body().unwrap();
    assert!(body.contains(r#"name="file""#), "multipart body: {}", body);
    assert!(body.contains("material.jpg"));
    assert!(body.contains("image/jpeg"));
}

#[tokio::test]
async fn test_primary_server_error_falls_back_to_secondary() {
    // Given: primary returns 500, secondary returns accuracy 64
    let primary = spawn_mock_endpoint(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"detail":"model not loaded"}"#,
        Duration::ZERO,
    )
    .await;
    let secondary = spawn_mock_endpoint(StatusCode::OK, r#"{"accuracy":64}"#, Duration::ZERO).await;
    let client = ClassificationClient::new(&primary.url, &secondary.url).unwrap();

    let classification = client.classify(&material_photo()).await.unwrap();

    // Then: secondary score taken as-is, no bias
    assert_eq!(classification.score, 64);
    assert_eq!(classification.source, ScoreSource::Secondary);
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_unparseable_primary_response_falls_back() {
    let primary = spawn_mock_endpoint(StatusCode::OK, "not json", Duration::ZERO).await;
    let secondary = spawn_mock_endpoint(StatusCode::OK, r#"{"accuracy":81}"#, Duration::ZERO).await;
    let client = ClassificationClient::new(&primary.url, &secondary.url).unwrap();

    let classification = client.classify(&material_photo()).await.unwrap();
    assert_eq!(classification.score, 81);
    assert_eq!(classification.source, ScoreSource::Secondary);
}

#[tokio::test]
async fn test_unreachable_primary_falls_back() {
    let secondary = spawn_mock_endpoint(StatusCode::OK, r#"{"accuracy":77}"#, Duration::ZERO).await;
    let client = ClassificationClient::new(UNREACHABLE_URL, &secondary.url).unwrap();

    let classification = client.classify(&material_photo()).await.unwrap();
    assert_eq!(classification.score, 77);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_both_endpoints_failing_is_all_endpoints_unavailable() {
    let primary = spawn_mock_endpoint(StatusCode::SERVICE_UNAVAILABLE, "{}", Duration::ZERO).await;
    let secondary = spawn_mock_endpoint(StatusCode::BAD_GATEWAY, "{}", Duration::ZERO).await;
    let client = ClassificationClient::new(&primary.url, &secondary.url).unwrap();

    let err = client.classify(&material_photo()).await.unwrap_err();

    match err {
        ClassificationError::AllEndpointsUnavailable { attempts } => {
            assert_eq!(attempts.len(), 2);
            assert!(attempts[0].contains("503"));
            assert!(attempts[1].contains("502"));
        }
        other => panic!("unexpected error: {}", other),
    }
    // One attempt each, no retry
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}
