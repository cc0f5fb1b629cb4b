//! End-to-end submission tests against a mocked generation endpoint.

use pixsynth::{PixsynthError, Session, SubmissionPhase, SynthesisClient, SynthesisRequest};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemini-2.5-flash-image:generateContent";

fn client_for(server: &MockServer) -> SynthesisClient {
    SynthesisClient::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .build()
        .expect("client builds with explicit key")
}

fn write_png(dir: &TempDir, name: &str, body: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut content = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    content.extend_from_slice(body);
    fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn submission_returns_image_and_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}},
                        {"text": "A blended scene"}
                    ]
                }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut session = Session::new(client_for(&server));
    session.tray_mut().add([
        write_png(&dir, "first.png", b"one"),
        write_png(&dir, "second.png", b"two"),
    ]);

    let result = session.submit("Blend these").await.unwrap();

    assert_eq!(
        result.image_data_url.as_deref(),
        Some("data:image/png;base64,iVBORw0KGgo=")
    );
    assert_eq!(result.text.as_deref(), Some("A blended scene"));
    assert_eq!(session.result(), Some(&result));
    assert_eq!(session.phase(), SubmissionPhase::Success);
}

#[tokio::test]
async fn request_carries_image_parts_then_prompt_and_both_modalities() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "ok"}]}}]
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut session = Session::new(client_for(&server));
    session
        .tray_mut()
        .add([write_png(&dir, "ref.png", b"reference")]);

    session.submit("Describe the reference").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();

    let parts = body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 2);
    assert_eq!(parts[0]["inline_data"]["mimeType"], "image/png");
    assert_eq!(parts[1]["text"], "Describe the reference");
    assert_eq!(
        body["generationConfig"]["responseModalities"],
        serde_json::json!(["IMAGE", "TEXT"])
    );
}

#[tokio::test]
async fn text_only_response_counts_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "only words"}]}}]
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut session = Session::new(client_for(&server));
    session.tray_mut().add([write_png(&dir, "a.png", b"x")]);

    let result = session.submit("What is this?").await.unwrap();
    assert!(result.image_data_url.is_none());
    assert_eq!(result.text.as_deref(), Some("only words"));
}

#[tokio::test]
async fn zero_candidates_is_empty_response_not_a_crash() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let req = SynthesisRequest::new(
        "a prompt",
        vec![pixsynth::EncodedImage {
            media_type: "image/png".into(),
            data: "AAAA".into(),
        }],
    );

    let err = client.synthesize(&req).await.unwrap_err();
    assert!(matches!(err, PixsynthError::EmptyResponse(_)));
}

#[tokio::test]
async fn server_error_is_transport_failure_distinct_from_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let req = SynthesisRequest::new(
        "a prompt",
        vec![pixsynth::EncodedImage {
            media_type: "image/png".into(),
            data: "AAAA".into(),
        }],
    );

    let err = client.synthesize(&req).await.unwrap_err();
    let transport_msg = match &err {
        PixsynthError::Transport(msg) => msg.clone(),
        other => panic!("expected Transport, got {other:?}"),
    };

    let empty_msg = PixsynthError::EmptyResponse("no candidates in response".into()).to_string();
    assert_ne!(err.to_string(), empty_msg);
    assert!(transport_msg.contains("500"));
}

#[tokio::test]
async fn blocked_prompt_maps_to_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [],
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut session = Session::new(client_for(&server));
    session.tray_mut().add([write_png(&dir, "a.png", b"x")]);

    let err = session.submit("something filtered").await.unwrap_err();
    assert!(matches!(err, PixsynthError::EmptyResponse(_)));
    assert!(session.result().is_none());
}

#[tokio::test]
async fn validation_rejects_before_any_request_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);

    let blank = SynthesisRequest::new(
        "",
        vec![pixsynth::EncodedImage {
            media_type: "image/png".into(),
            data: "AAAA".into(),
        }],
    );
    assert!(matches!(
        client.synthesize(&blank).await.unwrap_err(),
        PixsynthError::Validation(_)
    ));

    let no_images = SynthesisRequest::new("a prompt", vec![]);
    assert!(matches!(
        client.synthesize(&no_images).await.unwrap_err(),
        PixsynthError::Validation(_)
    ));
}

#[tokio::test]
async fn failed_submission_clears_previous_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "first run"}]}}]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut session = Session::new(client_for(&server));
    session.tray_mut().add([write_png(&dir, "a.png", b"x")]);

    session.submit("first").await.unwrap();
    assert!(session.result().is_some());

    let err = session.submit("second").await.unwrap_err();
    assert!(matches!(err, PixsynthError::Transport(_)));
    assert!(session.result().is_none());
    assert_eq!(session.phase(), SubmissionPhase::Failed);
}

#[tokio::test]
async fn validation_rejection_keeps_previous_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "kept"}]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut session = Session::new(client_for(&server));
    session.tray_mut().add([write_png(&dir, "a.png", b"x")]);

    session.submit("first").await.unwrap();
    assert_eq!(session.phase(), SubmissionPhase::Success);

    // A pre-flight rejection starts no submission: the stored result and
    // terminal phase stay as they were.
    let err = session.submit("   ").await.unwrap_err();
    assert!(matches!(err, PixsynthError::Validation(_)));
    assert_eq!(session.result().and_then(|r| r.text.as_deref()), Some("kept"));
    assert_eq!(session.phase(), SubmissionPhase::Success);
}
