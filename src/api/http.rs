use super::{ExecutionBackend, FileStore};
use crate::error::{ApiError, ApiResult};
use crate::model::{
    ClientConfig, ErrorBody, ExecutionRequest, ExecutionResponse, FileListing, HealthResponse,
    LoadedFile, MessageResponse, SavedFile,
};
use anyhow::{Context, Result};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::{Duration, Instant};

const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// reqwest-backed client for every endpoint under the configured base URL.
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base: Url,
    request_timeout: Duration,
    file_timeout: Duration,
}

impl HttpClient {
    pub fn new(cfg: &ClientConfig) -> Result<Self> {
        let base = Url::parse(&cfg.base_url)
            .with_context(|| format!("invalid base URL: {}", cfg.base_url))?;
        if base.cannot_be_a_base() {
            anyhow::bail!("base URL cannot carry paths: {}", cfg.base_url);
        }
        let http = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(cfg.file_timeout.min(MAX_CONNECT_TIMEOUT))
            .build()
            .context("build HTTP client")?;
        Ok(Self {
            http,
            base,
            request_timeout: cfg.request_timeout,
            file_timeout: cfg.file_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `base` + one encoded segment per element; filenames may contain `/` or spaces.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        label: &str,
        after: Duration,
    ) -> ApiResult<T> {
        let started = Instant::now();
        tracing::debug!("{label}: dispatch");
        let res = with_timeout(after, async {
            let resp = request.send().await?;
            decode_response::<T>(resp).await
        })
        .await;
        match &res {
            Ok(_) => tracing::info!("{label}: ok in {:?}", started.elapsed()),
            Err(e) => tracing::warn!("{label}: failed after {:?}: {e}", started.elapsed()),
        }
        res
    }
}

async fn with_timeout<T>(
    after: Duration,
    fut: impl Future<Output = ApiResult<T>>,
) -> ApiResult<T> {
    match tokio::time::timeout(after, fut).await {
        Ok(r) => r,
        Err(_) => Err(ApiError::Timeout { after }),
    }
}

async fn decode_response<T: DeserializeOwned>(resp: reqwest::Response) -> ApiResult<T> {
    let status = resp.status();
    if !status.is_success() {
        // Body is best-effort; a missing or malformed detail falls back to the status code.
        let detail = resp
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|b| b.detail_text());
        return Err(ApiError::Status {
            status: status.as_u16(),
            detail,
        });
    }
    let body = resp.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ApiError::decode(e.to_string()))
}

impl ExecutionBackend for HttpClient {
    async fn execute(&self, request: ExecutionRequest) -> ApiResult<ExecutionResponse> {
        let url = self.endpoint(&["execute"]);
        let builder = self.http.request(Method::POST, url).json(&request);
        self.send(builder, "execute", self.request_timeout).await
    }
}

impl FileStore for HttpClient {
    async fn list_files(&self) -> ApiResult<FileListing> {
        let url = self.endpoint(&["files"]);
        self.send(self.http.get(url), "list files", self.file_timeout)
            .await
    }

    async fn save(&self, code: &str, filename: &str) -> ApiResult<SavedFile> {
        let mut url = self.endpoint(&["save"]);
        url.query_pairs_mut()
            .append_pair("code", code)
            .append_pair("filename", filename);
        self.send(self.http.post(url), "save", self.file_timeout)
            .await
    }

    async fn load(&self, filename: &str) -> ApiResult<LoadedFile> {
        let url = self.endpoint(&["load", filename]);
        self.send(self.http.get(url), "load", self.file_timeout)
            .await
    }

    async fn delete(&self, filename: &str) -> ApiResult<MessageResponse> {
        let url = self.endpoint(&["delete", filename]);
        self.send(self.http.delete(url), "delete", self.file_timeout)
            .await
    }

    async fn health(&self) -> ApiResult<HealthResponse> {
        let url = self.endpoint(&["health"]);
        self.send(self.http.get(url), "health", self.file_timeout)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Language;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn config(base_url: &str) -> ClientConfig {
        ClientConfig {
            base_url: base_url.to_string(),
            language: Language::Python,
            request_timeout: Duration::from_secs(5),
            file_timeout: Duration::from_secs(5),
            user_agent: "playground-cli/test".into(),
            theme_path: std::path::PathBuf::from("theme"),
        }
    }

    /// Serve one canned HTTP response and hand back the raw request head.
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 16 * 1024];
            let mut read = 0;
            loop {
                let n = sock.read(&mut buf[read..]).await.unwrap();
                read += n;
                if n == 0 || buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            let head = String::from_utf8_lossy(&buf[..read]).to_string();
            let resp = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            sock.write_all(resp.as_bytes()).await.unwrap();
            sock.shutdown().await.ok();
            head
        });
        (format!("http://{addr}/api"), handle)
    }

    #[test]
    fn test_endpoint_encodes_filename_segment() {
        let c = HttpClient::new(&config("http://localhost:5000/api")).unwrap();
        let url = c.endpoint(&["load", "my file.py"]);
        assert_eq!(url.as_str(), "http://localhost:5000/api/load/my%20file.py");

        let c = HttpClient::new(&config("http://localhost:5000/api/")).unwrap();
        assert_eq!(
            c.endpoint(&["files"]).as_str(),
            "http://localhost:5000/api/files"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(HttpClient::new(&config("not a url")).is_err());
    }

    #[tokio::test]
    async fn test_connection_refused_is_connect_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let c = HttpClient::new(&config(&format!("http://{addr}/api"))).unwrap();
        let err = c
            .execute(ExecutionRequest::new("print(1)", Language::Python, ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Connect), "got {err:?}");
    }

    #[tokio::test]
    async fn test_execute_decodes_payload() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"output":"hi\n","error":null,"execution_time":0.125}"#,
        )
        .await;
        let c = HttpClient::new(&config(&base)).unwrap();
        let resp = c
            .execute(ExecutionRequest::new("print('hi')", Language::Python, ""))
            .await
            .unwrap();
        assert_eq!(resp.output.as_deref(), Some("hi\n"));
        assert_eq!(resp.execution_time, Some(0.125));

        let head = server.await.unwrap();
        assert!(head.starts_with("POST /api/execute "));
    }

    #[tokio::test]
    async fn test_non_success_uses_detail() {
        let (base, _server) = serve_once("404 Not Found", r#"{"detail":"File not found"}"#).await;
        let c = HttpClient::new(&config(&base)).unwrap();
        let err = c.load("missing.py").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.user_message(), "File not found");
    }

    #[tokio::test]
    async fn test_unexpected_shape_is_decode_error() {
        let (base, _server) = serve_once("200 OK", r#"{"unexpected":true}"#).await;
        let c = HttpClient::new(&config(&base)).unwrap();
        let err = c.load("a.py").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_save_sends_query_parameters() {
        let (base, server) =
            serve_once("200 OK", r#"{"message":"saved","filename":"a b.py"}"#).await;
        let c = HttpClient::new(&config(&base)).unwrap();
        let saved = c.save("x = 1", "a b.py").await.unwrap();
        assert_eq!(saved.filename, "a b.py");

        let head = server.await.unwrap();
        let request_line = head.lines().next().unwrap();
        assert!(request_line.starts_with("POST /api/save?code=x+%3D+1&filename=a+b.py "));
    }

    #[tokio::test]
    async fn test_silent_backend_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let (_sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let mut cfg = config(&format!("http://{addr}/api"));
        cfg.file_timeout = Duration::from_millis(200);
        let c = HttpClient::new(&cfg).unwrap();
        let err = c.list_files().await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout { .. }), "got {err:?}");
    }
}
