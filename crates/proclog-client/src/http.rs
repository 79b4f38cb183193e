//! HTTP implementation of [`LogService`] over the process REST API.
//!
//! Endpoints (relative to the configured base URL):
//! - `GET api/v1/process/{id}` - process resource as JSON
//! - `GET api/v1/process/{id}/log` - raw log bytes, windowed with `Range`

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, RANGE};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tracing::debug;
use url::Url;

use proclog_core::prelude::*;
use proclog_core::{InstanceId, LogChunk, LogRange, ProcessEntry};

use crate::range::{parse_content_range, range_header, ContentRange};
use crate::service::LogService;

/// Longest server error body kept in an error message
const MAX_ERROR_BODY: usize = 200;

/// Process API client
#[derive(Debug, Clone)]
pub struct HttpLogService {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl HttpLogService {
    /// Create a client for the server at `base_url`.
    ///
    /// `api_key` is sent verbatim in the `Authorization` header when present.
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("proclog/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {e}")))?;

        Self::with_client(client, base_url, api_key)
    }

    fn with_client(client: Client, base_url: &str, api_key: Option<String>) -> Result<Self> {
        Ok(Self {
            client,
            base_url: normalize_base_url(base_url)?,
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    fn process_url(&self, instance_id: InstanceId) -> Result<Url> {
        self.endpoint(&format!("api/v1/process/{instance_id}"))
    }

    fn log_url(&self, instance_id: InstanceId) -> Result<Url> {
        self.endpoint(&format!("api/v1/process/{instance_id}/log"))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::config(format!("Invalid endpoint '{path}': {e}")))
    }

    fn get(&self, url: Url) -> RequestBuilder {
        let request = self.client.get(url);
        match &self.api_key {
            Some(key) => request.header(AUTHORIZATION, key),
            None => request,
        }
    }
}

impl LogService for HttpLogService {
    async fn fetch_process(&self, instance_id: InstanceId) -> Result<ProcessEntry> {
        let url = self.process_url(instance_id)?;
        debug!("GET {}", url);

        let response = self.get(url).send().await.map_err(transport_error)?;
        let response = error_for_status(response).await?;
        let body = response.bytes().await.map_err(transport_error)?;

        Ok(serde_json::from_slice(&body)?)
    }

    async fn fetch_log(&self, instance_id: InstanceId, range: LogRange) -> Result<LogChunk> {
        let url = self.log_url(instance_id)?;
        let mut request = self.get(url.clone());
        if let Some(value) = range_header(&range) {
            debug!("GET {} ({})", url, value);
            request = request.header(RANGE, value);
        } else {
            debug!("GET {} (whole log)", url);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let response = if status == StatusCode::RANGE_NOT_SATISFIABLE {
            response
        } else {
            error_for_status(response).await?
        };

        let content_range = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let data = response.bytes().await.map_err(transport_error)?.to_vec();

        build_chunk(status.as_u16(), content_range.as_deref(), &range, data)
    }
}

/// Parse the base URL and make sure relative joins keep its path
fn normalize_base_url(base_url: &str) -> Result<Url> {
    let mut url = Url::parse(base_url.trim())
        .map_err(|e| Error::config(format!("Invalid server URL '{base_url}': {e}")))?;

    if url.cannot_be_a_base() {
        return Err(Error::config(format!("Invalid server URL '{base_url}'")));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Assemble a chunk from the parts of a log response
fn build_chunk(
    status: u16,
    content_range: Option<&str>,
    requested: &LogRange,
    data: Vec<u8>,
) -> Result<LogChunk> {
    let parsed = match content_range {
        Some(value) => Some(
            parse_content_range(value)
                .ok_or_else(|| Error::protocol(format!("Invalid Content-Range header: {value}")))?,
        ),
        None => None,
    };

    let chunk = match parsed {
        Some(content_range) => LogChunk::new(data, content_range.to_log_range(requested)),
        None if status == StatusCode::RANGE_NOT_SATISFIABLE.as_u16() => LogChunk::new(
            Vec::new(),
            ContentRange::Unsatisfied { length: None }.to_log_range(requested),
        ),
        // Range ignored by the server: the body is the whole log.
        None => {
            let len = data.len() as u64;
            LogChunk::new(data, LogRange::span(0, len, Some(len)))
        }
    };
    Ok(chunk)
}

async fn error_for_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(Error::http(status.as_u16(), error_message(status, &body)))
}

fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }

    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::transport(format!("request timed out: {err}"))
    } else if err.is_decode() {
        Error::protocol(err.to_string())
    } else {
        Error::transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn service(base: &str) -> HttpLogService {
        HttpLogService::new(base, None, Duration::from_secs(5)).unwrap()
    }

    fn id() -> InstanceId {
        "0b9f7c1e-5f0a-4a4e-9a47-3c1d2e4f5a6b".parse().unwrap()
    }

    /// Serve one canned response on a local port.
    ///
    /// Returns the base URL and a handle resolving to the lowercased request head.
    async fn serve_once(response: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_lowercase()
        });

        (base, handle)
    }

    fn local_service(base: &str, api_key: Option<&str>) -> HttpLogService {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        let api_key = api_key.map(str::to_owned);
        HttpLogService::with_client(client, base, api_key).unwrap()
    }

    #[test]
    fn test_endpoints_without_trailing_slash() {
        let svc = service("http://localhost:8001");
        assert_eq!(
            svc.log_url(id()).unwrap().as_str(),
            "http://localhost:8001/api/v1/process/0b9f7c1e-5f0a-4a4e-9a47-3c1d2e4f5a6b/log"
        );
    }

    #[test]
    fn test_endpoints_keep_base_path() {
        let svc = service("https://ci.example.com/concord");
        assert_eq!(
            svc.process_url(id()).unwrap().as_str(),
            "https://ci.example.com/concord/api/v1/process/0b9f7c1e-5f0a-4a4e-9a47-3c1d2e4f5a6b"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpLogService::new("not a url", None, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));

        let err = HttpLogService::new("mailto:ops@example.com", None, Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_empty_api_key_is_dropped() {
        let svc = HttpLogService::new(
            "http://localhost:8001",
            Some(String::new()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(svc.api_key.is_none());
    }

    #[test]
    fn test_build_chunk_partial_content() {
        let chunk = build_chunk(
            206,
            Some("bytes 1900-2048/2048"),
            &LogRange::tail(2048),
            b"L1\nL2\n".to_vec(),
        )
        .unwrap();
        assert_eq!(chunk.range, LogRange::span(1900, 2048, Some(2048)));
        assert_eq!(chunk.data, b"L1\nL2\n");
    }

    #[test]
    fn test_build_chunk_whole_log_without_header() {
        let chunk = build_chunk(200, None, &LogRange::starting_at(0), b"ALL".to_vec()).unwrap();
        assert_eq!(chunk.range, LogRange::span(0, 3, Some(3)));
    }

    #[test]
    fn test_build_chunk_range_not_satisfiable() {
        let chunk = build_chunk(
            416,
            Some("bytes */2048"),
            &LogRange::starting_at(2048),
            Vec::new(),
        )
        .unwrap();
        assert!(chunk.is_empty());
        assert_eq!(chunk.range, LogRange::span(2048, 2048, Some(2048)));
    }

    #[test]
    fn test_build_chunk_bad_header_is_protocol_error() {
        let err = build_chunk(206, Some("lines 1-2"), &LogRange::tail(10), Vec::new()).unwrap_err();
        assert!(matches!(err, Error::Protocol { .. }));
        assert!(err.is_transport());
    }

    #[test]
    fn test_error_message_uses_reason_for_empty_body() {
        assert_eq!(error_message(StatusCode::NOT_FOUND, "  "), "Not Found");
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, "no access\n"),
            "no access"
        );
    }

    #[test]
    fn test_error_message_truncates_long_body() {
        let body = "x".repeat(500);
        let msg = error_message(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert_eq!(msg.len(), MAX_ERROR_BODY + 3);
        assert!(msg.ends_with("..."));
    }

    #[tokio::test]
    async fn test_fetch_log_sends_range_and_reads_partial_content() {
        let (base, server) = serve_once(
            "HTTP/1.1 206 Partial Content\r\n\
             Content-Range: bytes 1900-1906/2048\r\n\
             Content-Length: 6\r\n\
             Connection: close\r\n\r\n\
             L1\nL2\n",
        )
        .await;
        let svc = local_service(&base, Some("secret"));

        let chunk = svc.fetch_log(id(), LogRange::tail(2048)).await.unwrap();
        assert_eq!(chunk.range, LogRange::span(1900, 1906, Some(2048)));
        assert_eq!(chunk.data, b"L1\nL2\n");

        let request = server.await.unwrap();
        assert!(request.starts_with(
            "get /api/v1/process/0b9f7c1e-5f0a-4a4e-9a47-3c1d2e4f5a6b/log http/1.1"
        ));
        assert!(request.contains("range: bytes=-2048\r\n"));
        assert!(request.contains("authorization: secret\r\n"));
    }

    #[tokio::test]
    async fn test_fetch_log_range_not_satisfiable_is_empty_chunk() {
        let (base, server) = serve_once(
            "HTTP/1.1 416 Range Not Satisfiable\r\n\
             Content-Range: bytes */2048\r\n\
             Content-Length: 0\r\n\
             Connection: close\r\n\r\n",
        )
        .await;
        let svc = local_service(&base, None);

        let chunk = svc
            .fetch_log(id(), LogRange::starting_at(2048))
            .await
            .unwrap();
        assert!(chunk.is_empty());
        assert_eq!(chunk.range, LogRange::span(2048, 2048, Some(2048)));

        let request = server.await.unwrap();
        assert!(request.contains("range: bytes=2048-\r\n"));
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_fetch_log_server_error_keeps_status() {
        let (base, _server) = serve_once(
            "HTTP/1.1 503 Service Unavailable\r\n\
             Content-Length: 11\r\n\
             Connection: close\r\n\r\n\
             maintenance",
        )
        .await;
        let svc = local_service(&base, None);

        let err = svc
            .fetch_log(id(), LogRange::starting_at(0))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), Some(503));
        assert!(err.to_string().contains("maintenance"));
    }
}
