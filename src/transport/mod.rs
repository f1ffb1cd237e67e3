//! Transport boundary: opening streaming HTTP requests.
//!
//! The session consumes an ordered byte-fragment sequence plus the response
//! status; everything HTTP-specific lives behind [`StreamTransport`] so tests
//! can script byte streams without a network. Retry execution also belongs
//! here, on the far side of the boundary: the core only labels failures as
//! retryable.

use std::sync::OnceLock;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;

use crate::config::RivuletConfig;
use crate::error::{Result, RivuletError};
use crate::types::Vendor;

/// A fully-built streaming request. Assembly beyond the [`StreamRequest::chat`]
/// helper (custom headers, extra body fields) is the caller's concern.
#[derive(Debug, Clone)]
pub struct StreamRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// An open streaming response: status known up front, body still arriving.
pub struct StreamResponse {
    pub status: u16,
    pub bytes: BoxStream<'static, Result<Vec<u8>>>,
}

/// Opens one streaming request and hands back the raw byte sequence.
#[async_trait]
pub trait StreamTransport: Send + Sync {
    async fn open(&self, request: &StreamRequest) -> Result<StreamResponse>;
}

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// reqwest-backed transport used by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

#[async_trait]
impl StreamTransport for HttpTransport {
    async fn open(&self, request: &StreamRequest) -> Result<StreamResponse> {
        debug!(url = %request.url, "opening stream");

        let resp = shared_client()
            .post(&request.url)
            .headers(request.headers.clone())
            .json(&request.body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let byte_stream = resp.bytes_stream();

        let bytes = async_stream::stream! {
            futures::pin_mut!(byte_stream);
            while let Some(item) = byte_stream.next().await {
                match item {
                    Ok(fragment) => yield Ok(fragment.to_vec()),
                    Err(e) => {
                        yield Err(RivuletError::Network(e));
                        break;
                    }
                }
            }
        };

        Ok(StreamResponse {
            status,
            bytes: Box::pin(bytes),
        })
    }
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Build Anthropic-style headers (x-api-key).
pub fn anthropic_headers(api_key: &str, version: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(api_key) {
        headers.insert("x-api-key", val);
    }
    if let Ok(val) = HeaderValue::from_str(version) {
        headers.insert("anthropic-version", val);
    }
    headers
}

/// Classify a non-2xx transport response.
pub fn status_to_error(status: u16, message: String, raw_body: &str) -> RivuletError {
    match status {
        401 | 403 => RivuletError::Authentication(message),
        429 => RivuletError::RateLimited {
            retry_after_ms: extract_retry_after(raw_body),
        },
        _ => RivuletError::Api { status, message },
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("retry_after"))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}

const ANTHROPIC_VERSION: &str = "2023-06-01";

impl StreamRequest {
    /// Build a streaming chat request for a vendor, resolving credentials
    /// and base URLs from config. The body gains `model` and, where the
    /// vendor expects it, `stream: true`.
    pub fn chat(
        vendor: Vendor,
        model: &str,
        mut body: serde_json::Value,
        config: &RivuletConfig,
    ) -> Result<Self> {
        let vendor_name = vendor.to_string();
        let api_key = config
            .get_api_key(&vendor_name)
            .ok_or_else(|| RivuletError::Configuration(format!("Missing API key for {vendor}")))?;

        if !body.is_object() {
            body = serde_json::json!({});
        }
        if body.get("model").is_none() {
            body["model"] = model.into();
        }

        let request = match vendor {
            #[cfg(feature = "openai")]
            Vendor::OpenAi => {
                body["stream"] = true.into();
                let base = config
                    .get_base_url(&vendor_name)
                    .unwrap_or_else(|| "https://api.openai.com/v1".to_string());
                Self {
                    url: format!("{base}/chat/completions"),
                    headers: bearer_headers(&api_key),
                    body,
                }
            }
            #[cfg(feature = "deepseek")]
            Vendor::DeepSeek => {
                body["stream"] = true.into();
                let base = config
                    .get_base_url(&vendor_name)
                    .unwrap_or_else(|| "https://api.deepseek.com".to_string());
                Self {
                    url: format!("{base}/chat/completions"),
                    headers: bearer_headers(&api_key),
                    body,
                }
            }
            #[cfg(feature = "anthropic")]
            Vendor::Anthropic => {
                body["stream"] = true.into();
                let base = config
                    .get_base_url(&vendor_name)
                    .unwrap_or_else(|| "https://api.anthropic.com".to_string());
                Self {
                    url: format!("{base}/v1/messages"),
                    headers: anthropic_headers(&api_key, ANTHROPIC_VERSION),
                    body,
                }
            }
            #[cfg(feature = "gemini")]
            Vendor::Gemini => {
                // Gemini takes the model in the path, not the body.
                body.as_object_mut().unwrap().remove("model");
                let base = config.get_base_url(&vendor_name).unwrap_or_else(|| {
                    "https://generativelanguage.googleapis.com/v1beta".to_string()
                });
                let mut headers = HeaderMap::new();
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                Self {
                    url: format!(
                        "{base}/models/{model}:streamGenerateContent?alt=sse&key={api_key}"
                    ),
                    headers,
                    body,
                }
            }
            #[cfg(feature = "bedrock")]
            Vendor::Bedrock => {
                body.as_object_mut().unwrap().remove("model");
                let base = config.get_base_url(&vendor_name).ok_or_else(|| {
                    RivuletError::Configuration("Missing base URL for bedrock".into())
                })?;
                Self {
                    url: format!("{base}/model/{model}/invoke-with-response-stream"),
                    headers: bearer_headers(&api_key),
                    body,
                }
            }
        };

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(vendor: &str, key: &str) -> RivuletConfig {
        let config = RivuletConfig::new();
        config.set_api_key(vendor, key.to_string());
        config
    }

    #[test]
    #[cfg(feature = "openai")]
    fn openai_request_sets_stream_flag_and_bearer_auth() {
        let config = config_with("openai", "sk-test");
        let request = StreamRequest::chat(
            Vendor::OpenAi,
            "gpt-4o",
            serde_json::json!({"messages": []}),
            &config,
        )
        .unwrap();
        assert_eq!(request.url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(request.body["stream"], true);
        assert_eq!(request.body["model"], "gpt-4o");
        assert_eq!(
            request.headers[AUTHORIZATION].to_str().unwrap(),
            "Bearer sk-test"
        );
    }

    #[test]
    #[cfg(feature = "gemini")]
    fn gemini_request_puts_model_and_key_in_url() {
        let config = config_with("gemini", "g-key");
        let request = StreamRequest::chat(
            Vendor::Gemini,
            "gemini-2.0-flash",
            serde_json::json!({"contents": []}),
            &config,
        )
        .unwrap();
        assert!(request.url.contains("models/gemini-2.0-flash:streamGenerateContent"));
        assert!(request.url.contains("alt=sse"));
        assert!(request.url.contains("key=g-key"));
        assert!(request.body.get("model").is_none());
    }

    #[test]
    #[cfg(feature = "anthropic")]
    fn anthropic_request_uses_api_key_header() {
        let config = config_with("anthropic", "ant-key");
        let request = StreamRequest::chat(
            Vendor::Anthropic,
            "claude-sonnet-4",
            serde_json::json!({"messages": [], "max_tokens": 1024}),
            &config,
        )
        .unwrap();
        assert_eq!(request.url, "https://api.anthropic.com/v1/messages");
        assert_eq!(request.headers["x-api-key"].to_str().unwrap(), "ant-key");
        assert_eq!(
            request.headers["anthropic-version"].to_str().unwrap(),
            ANTHROPIC_VERSION
        );
    }

    #[test]
    #[cfg(feature = "openai")]
    fn missing_api_key_is_configuration_error() {
        let config = RivuletConfig::new();
        let err = StreamRequest::chat(
            Vendor::OpenAi,
            "gpt-4o",
            serde_json::json!({}),
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, RivuletError::Configuration(_)));
    }

    #[test]
    fn retry_after_extracted_from_error_body() {
        let err = status_to_error(
            429,
            "slow down".into(),
            r#"{"error": {"retry_after": 1.5, "message": "slow down"}}"#,
        );
        match err {
            RivuletError::RateLimited { retry_after_ms } => {
                assert_eq!(retry_after_ms, Some(1500));
            }
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[test]
    fn auth_statuses_map_to_authentication() {
        let err = status_to_error(401, "bad key".into(), "{}");
        assert!(matches!(err, RivuletError::Authentication(_)));
        assert!(!err.is_retryable());
    }
}
