//! The HTTP seam. [`HttpClient`] talks to the real API; anything implementing
//! [`ApiClient`] can stand in for it.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;

use crate::options::{ApiKey, Options};

use std::future::Future;



/// A decoded API response. Non-success responses still carry whatever JSON
/// body the API sent back (usually `{"reason": ..., "message": ...}`), or
/// [`Value::Null`] if there was none.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
  pub status: u16,
  pub body: Value
}

impl ApiResponse {
  pub fn new(status: u16, body: Value) -> Self {
    ApiResponse { status, body }
  }

  #[inline]
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// The `reason` field of an API error body, if present.
  pub fn reason(&self) -> Option<String> {
    self.body.get("reason").and_then(Value::as_str).map(str::to_owned)
  }
}

/// Issues authenticated GET requests. `path` is relative to the API root and
/// already escaped, e.g. `/clans/%23YQY9R8PP/members`.
pub trait ApiClient {
  fn get(&self, path: &str) -> impl Future<Output = Result<ApiResponse, crate::Error>>;
}

/// [`ApiClient`] backed by `reqwest`, sending the bearer token from [`Options`].
#[derive(Debug, Clone)]
pub struct HttpClient {
  inner: reqwest::Client,
  base_url: String,
  api_key: ApiKey
}

impl HttpClient {
  pub fn new(options: &Options) -> Result<Self, crate::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    let inner = reqwest::Client::builder()
      .default_headers(headers)
      .build()?;

    Ok(HttpClient {
      inner,
      base_url: options.base_url.clone(),
      api_key: options.api_key.clone()
    })
  }
}

impl ApiClient for HttpClient {
  async fn get(&self, path: &str) -> Result<ApiResponse, crate::Error> {
    let url = format!("{}{path}", self.base_url);
    debug!("GET {url}");
    let response = self.inner.get(&url)
      .bearer_auth(self.api_key.expose())
      .send().await?;
    let status = response.status().as_u16();
    let bytes = response.bytes().await?;

    let body = if bytes.is_empty() {
      Value::Null
    } else if (200..300).contains(&status) {
      serde_json::from_slice(&bytes)?
    } else {
      // error bodies are informational only
      serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    Ok(ApiResponse { status, body })
  }
}
