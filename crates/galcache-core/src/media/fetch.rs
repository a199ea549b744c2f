//! The wrapped transport: request/response types and the fetcher seam the
//! interceptor sits on. `HttpFetcher` is the real reqwest-backed transport;
//! tests substitute counting or failing fakes.

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};

use crate::error::FetchError;

/// HTTP request timeout in seconds.
/// 30s allows for slow media downloads while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Full request identity: method plus URL. This is the cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaRequest {
    pub method: Method,
    pub url: Url,
}

impl MediaRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self { method, url }
    }

    pub fn get(url: Url) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// A fully buffered response. Cloneable so one copy can be returned to the
/// caller while another is persisted.
#[derive(Debug, Clone)]
pub struct MediaResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl MediaResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Rebuild a response from stored parts. Malformed stored headers are
    /// skipped rather than failing replay.
    pub fn from_parts(status: StatusCode, headers: Vec<(String, String)>, body: Vec<u8>) -> Self {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                map.insert(name, value);
            }
        }
        Self {
            status,
            headers: map,
            body,
        }
    }
}

/// The transport the interceptor wraps.
pub trait MediaFetcher: Send + Sync {
    fn fetch<'a>(
        &'a self,
        request: &'a MediaRequest,
    ) -> BoxFuture<'a, Result<MediaResponse, FetchError>>;
}

/// reqwest-backed fetcher.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }
}

impl MediaFetcher for HttpFetcher {
    fn fetch<'a>(
        &'a self,
        request: &'a MediaRequest,
    ) -> BoxFuture<'a, Result<MediaResponse, FetchError>> {
        Box::pin(async move {
            let response = self
                .client
                .request(request.method.clone(), request.url.clone())
                .send()
                .await?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await?.to_vec();

            Ok(MediaResponse {
                status,
                headers,
                body,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_includes_method_and_url() {
        let url = Url::parse("https://cdn.example.com/a.jpg").expect("Failed to parse test URL");
        let request = MediaRequest::get(url);
        assert_eq!(request.cache_key(), "GET https://cdn.example.com/a.jpg");
    }

    #[test]
    fn test_from_parts_skips_malformed_headers() {
        let response = MediaResponse::from_parts(
            StatusCode::OK,
            vec![
                ("content-type".to_string(), "image/jpeg".to_string()),
                ("bad header name".to_string(), "x".to_string()),
            ],
            vec![1, 2, 3],
        );
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.headers.len(), 1);
        assert_eq!(response.body, vec![1, 2, 3]);
    }
}
