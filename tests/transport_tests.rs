//! Tests for the reqwest transport and the client facade, against a mock
//! HTTP server.

use std::sync::Arc;

use futures::StreamExt;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rivulet::config::RivuletConfig;
use rivulet::error::RivuletError;
use rivulet::transport::{HttpTransport, StreamRequest, StreamTransport};
use rivulet::types::Vendor;
use rivulet::Rivulet;

const SSE_BODY: &str = concat!(
    "data: {\"model\":\"gpt-4o\",\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\n",
    "data: {\"choices\":[],\"usage\":{\"prompt_tokens\":3,\"completion_tokens\":2}}\n\n",
    "data: [DONE]\n\n",
);

fn sse_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(SSE_BODY, "text/event-stream")
}

#[tokio::test]
async fn http_transport_reports_status_and_streams_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(sse_response())
        .mount(&server)
        .await;

    let request = StreamRequest {
        url: format!("{}/v1/chat/completions", server.uri()),
        headers: reqwest::header::HeaderMap::new(),
        body: serde_json::json!({"model": "gpt-4o", "stream": true}),
    };

    let response = HttpTransport.open(&request).await.unwrap();
    assert_eq!(response.status, 200);

    let mut collected = Vec::new();
    let mut bytes = response.bytes;
    while let Some(fragment) = bytes.next().await {
        collected.extend(fragment.unwrap());
    }
    assert_eq!(String::from_utf8_lossy(&collected), SSE_BODY);
}

#[tokio::test]
async fn client_streams_end_to_end_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o",
            "stream": true,
        })))
        .respond_with(sse_response())
        .mount(&server)
        .await;

    let config = RivuletConfig::new();
    config.set_api_key("openai", "sk-test".into());
    config.set_base_url("openai", server.uri());

    let client = Rivulet::new().with_config(config);
    let message = client
        .stream(
            Vendor::OpenAi,
            "gpt-4o",
            serde_json::json!({"messages": [{"role": "user", "content": "hi"}]}),
        )
        .await
        .unwrap();

    assert_eq!(message.content, "Hello world");
    assert_eq!(message.model_id.as_deref(), Some("gpt-4o"));
    assert_eq!(message.input_tokens, Some(3));
    assert_eq!(message.output_tokens, Some(2));
}

#[tokio::test]
async fn client_observer_runs_before_final_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(sse_response())
        .mount(&server)
        .await;

    let config = RivuletConfig::new();
    config.set_api_key("openai", "sk-test".into());
    config.set_base_url("openai", server.uri());

    let seen = Arc::new(std::sync::Mutex::new(String::new()));
    let sink = seen.clone();

    let client = Rivulet::new().with_config(config);
    let message = client
        .stream_with_observer(
            Vendor::OpenAi,
            "gpt-4o",
            serde_json::json!({"messages": []}),
            move |chunk| sink.lock().unwrap().push_str(&chunk.content),
        )
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), message.content);
}

#[tokio::test]
async fn error_status_with_json_body_is_classified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_raw(
            r#"{"error": {"message": "The server had an error"}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let config = RivuletConfig::new();
    config.set_api_key("openai", "sk-test".into());
    config.set_base_url("openai", server.uri());

    let client = Rivulet::new().with_config(config);
    let err = client
        .stream(Vendor::OpenAi, "gpt-4o", serde_json::json!({"messages": []}))
        .await
        .unwrap_err();

    match err {
        RivuletError::Api { status, ref message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "The server had an error");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert!(err.is_retryable());
}
