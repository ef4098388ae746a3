//! Test helpers: stand-in upstream services and tiny images.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode, header::CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Value, json};

/// Encodes a solid-colour PNG of the given size.
pub(crate) fn png_bytes(width: u32, height: u32, shade: u8) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([shade, 64, 128, 255]));
    let mut output = Cursor::new(Vec::new());
    image
        .write_to(&mut output, image::ImageFormat::Png)
        .expect("encode test png");
    output.into_inner()
}

/// One multipart request received by the fake image service.
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordedForm {
    pub(crate) fields: Vec<(String, String)>,
    pub(crate) authorization: Option<String>,
    pub(crate) accept: Option<String>,
}

impl RecordedForm {
    pub(crate) fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// What the fake services answer and what they saw.
#[derive(Clone, Debug)]
pub(crate) struct FakeUpstream {
    pub(crate) image_status: u16,
    pub(crate) image_body: Vec<u8>,
    pub(crate) chat_status: u16,
    pub(crate) chat_reply: String,
    pub(crate) image_requests: Arc<Mutex<Vec<RecordedForm>>>,
    pub(crate) chat_requests: Arc<Mutex<Vec<Value>>>,
}

impl FakeUpstream {
    pub(crate) fn ok() -> Self {
        Self {
            image_status: 200,
            image_body: png_bytes(8, 8, 200),
            chat_status: 200,
            chat_reply: "an enhanced prompt".to_string(),
            image_requests: Arc::new(Mutex::new(Vec::new())),
            chat_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn image_requests(&self) -> Vec<RecordedForm> {
        self.image_requests.lock().expect("lock image requests").clone()
    }

    pub(crate) fn chat_requests(&self) -> Vec<Value> {
        self.chat_requests.lock().expect("lock chat requests").clone()
    }
}

async fn fake_image_handler(
    State(upstream): State<FakeUpstream>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut recorded = RecordedForm {
        authorization: headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        accept: headers
            .get("accept")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned),
        ..Default::default()
    };
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.unwrap_or_default();
        recorded.fields.push((name, value));
    }
    upstream
        .image_requests
        .lock()
        .expect("lock image requests")
        .push(recorded);

    let status = StatusCode::from_u16(upstream.image_status).expect("valid status");
    if status == StatusCode::OK {
        ([(CONTENT_TYPE, "image/png")], upstream.image_body.clone()).into_response()
    } else {
        (status, r#"{"errors":["upstream said no"]}"#).into_response()
    }
}

async fn fake_chat_handler(
    State(upstream): State<FakeUpstream>,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    upstream
        .chat_requests
        .lock()
        .expect("lock chat requests")
        .push(body);
    let status = StatusCode::from_u16(upstream.chat_status).expect("valid status");
    if status != StatusCode::OK {
        return (status, r#"{"error":{"message":"chat unavailable"}}"#).into_response();
    }
    axum::Json(json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": {"role": "assistant", "content": upstream.chat_reply},
                "finish_reason": "stop"
            }
        ]
    }))
    .into_response()
}

/// Starts both fake services on an ephemeral port and returns the base URL.
pub(crate) async fn spawn_upstream(upstream: FakeUpstream) -> String {
    let app = Router::new()
        .route("/v2beta/stable-image/generate/core", post(fake_image_handler))
        .route("/v1/chat/completions", post(fake_chat_handler))
        .with_state(upstream);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake upstream");
    let addr = listener.local_addr().expect("fake upstream address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}
