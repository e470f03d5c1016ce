//! GeminiService and HttpImageSource against a mock HTTP server.

use base64::Engine;
use stylefuse::{
    EncodedImage, FuseError, FusionService, GeminiService, GenerationRequest, HttpImageSource,
    ImageSource,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-2.5-flash-image:generateContent";
const PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn service(server: &MockServer) -> GeminiService {
    GeminiService::builder()
        .api_key("test-key")
        .base_url(server.uri())
        .build()
        .unwrap()
}

fn request() -> GenerationRequest {
    let subject = EncodedImage::from_bytes(&JPEG, "image/jpeg").unwrap();
    GenerationRequest::assemble(Some(&subject), None, "pencil sketch").unwrap()
}

fn image_body() -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [
                    {"text": "A sketch of your photo."},
                    {"inlineData": {"mimeType": "image/png", "data": b64(&PNG)}}
                ]
            },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn generate_sends_parts_and_parses_candidates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "contents": [{
                "parts": [
                    {"inlineData": {"mimeType": "image/jpeg", "data": b64(&JPEG)}},
                    {"text": "pencil sketch"}
                ]
            }],
            "generationConfig": {"responseModalities": ["TEXT", "IMAGE"]}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(image_body()))
        .expect(1)
        .mount(&server)
        .await;

    let response = service(&server).generate(&request()).await.unwrap();

    let image = response.first_image().unwrap();
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.decode().unwrap(), PNG.to_vec());
    assert_eq!(response.first_text(), Some("A sketch of your photo."));
}

#[tokio::test]
async fn generate_maps_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "12")
                .set_body_string("quota exhausted"),
        )
        .mount(&server)
        .await;

    let err = service(&server).generate(&request()).await.unwrap_err();
    match err {
        FuseError::RateLimited { retry_after } => {
            assert_eq!(retry_after, Some(std::time::Duration::from_secs(12)));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn generate_maps_auth_and_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("  internal\n error "))
        .mount(&server)
        .await;

    let svc = service(&server);
    assert!(matches!(
        svc.generate(&request()).await.unwrap_err(),
        FuseError::Auth(ref msg) if msg == "API key not valid"
    ));
    match svc.generate(&request()).await.unwrap_err() {
        FuseError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "internal error");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn generate_reports_prompt_block() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "promptFeedback": {"blockReason": "PROHIBITED_CONTENT"}
        })))
        .mount(&server)
        .await;

    let err = service(&server).generate(&request()).await.unwrap_err();
    assert!(matches!(
        err,
        FuseError::ContentBlocked(ref msg) if msg.contains("PROHIBITED_CONTENT")
    ));
}

#[tokio::test]
async fn generate_rejects_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = service(&server).generate(&request()).await.unwrap_err();
    assert!(matches!(err, FuseError::Network(_)));
}

#[tokio::test]
async fn health_check_statuses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models/gemini-2.5-flash-image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "models/gemini-2.5-flash-image"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models/missing-model"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(service(&server).health_check().await.is_ok());

    let missing = GeminiService::builder()
        .api_key("test-key")
        .model_id("missing-model")
        .base_url(server.uri())
        .build()
        .unwrap();
    assert!(matches!(
        missing.health_check().await,
        Err(FuseError::InvalidRequest(_))
    ));
}

#[tokio::test]
async fn image_source_uses_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/styles/wave.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(JPEG.to_vec()),
        )
        .mount(&server)
        .await;

    let image = HttpImageSource::new()
        .fetch(&format!("{}/styles/wave.jpg", server.uri()))
        .await
        .unwrap();
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!(image.decode().unwrap(), JPEG.to_vec());
}

#[tokio::test]
async fn image_source_sniffs_octet_stream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/styles/blob"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/octet-stream")
                .set_body_bytes(PNG.to_vec()),
        )
        .mount(&server)
        .await;

    let image = HttpImageSource::new()
        .fetch(&format!("{}/styles/blob", server.uri()))
        .await
        .unwrap();
    assert_eq!(image.mime_type, "image/png");
}

#[tokio::test]
async fn image_source_rejects_non_images_and_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/styles/page"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string("<html></html>"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/styles/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let source = HttpImageSource::new();
    assert!(matches!(
        source
            .fetch(&format!("{}/styles/page", server.uri()))
            .await,
        Err(FuseError::InvalidRequest(_))
    ));
    assert!(matches!(
        source
            .fetch(&format!("{}/styles/gone.png", server.uri()))
            .await,
        Err(FuseError::Api { status: 404, .. })
    ));
}

#[tokio::test]
async fn image_source_content_type_is_case_insensitive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/styles/s.jpg"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "Image/JPEG; charset=binary")
                .set_body_bytes(JPEG.to_vec()),
        )
        .mount(&server)
        .await;

    let image = HttpImageSource::new()
        .fetch(&format!("{}/styles/s.jpg", server.uri()))
        .await
        .unwrap();
    assert_eq!(image.mime_type, "image/jpeg");
    assert_eq!(image.decode().unwrap(), JPEG.to_vec());
}
