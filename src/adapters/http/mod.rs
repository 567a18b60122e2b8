//! Metadata provider clients.
//!
//! Each client issues exactly one GET per call and folds every failure
//! (transport, non-2xx, malformed body, empty match list) into the single
//! domain error its port reports. Clients hold no per-call state and can be
//! shared across concurrent requests.

pub mod genius;
pub mod musixmatch;

pub use genius::GeniusClient;
pub use musixmatch::MusixmatchClient;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// 單次 provider 呼叫的失敗原因，只用於日誌，對外一律轉成領域錯誤
#[derive(Debug, Error)]
pub(crate) enum ProviderFailure {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status code: {status}, body: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("response contained no matches")]
    Empty,

    #[error("unresolved parameters in endpoint: {0}")]
    Endpoint(String),

    #[error("invalid release date components: {0}")]
    InvalidDate(String),
}

/// 與 `url.QueryEscape` 相同：空白轉成 `+`
pub(crate) fn escape(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// 以 `{key}` 佔位符建構端點，值需事先 escape
pub(crate) fn build_endpoint(
    base_url: &str,
    template: &str,
    params: &[(&str, &str)],
) -> Result<String, ProviderFailure> {
    let mut path = template.to_string();
    for (key, value) in params {
        path = path.replace(&format!("{{{}}}", key), value);
    }

    if let (Some(open), Some(close)) = (path.find('{'), path.rfind('}')) {
        if open < close {
            return Err(ProviderFailure::Endpoint(path));
        }
    }

    Ok(format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    ))
}

/// 送出請求並把 2xx 的 body 解成 `T`
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
) -> Result<T, ProviderFailure> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(ProviderFailure::Status { status, body });
    }

    Ok(serde_json::from_str(&body)?)
}
