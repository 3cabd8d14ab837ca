//! HTTP Dashboard Server
//!
//! Lightweight HTTP/1.1 server for the SmartClass dashboard pages.
//! Uses tokio for async I/O without external web framework dependencies.
//!
//! ## Running the Server
//!
//! ```bash
//! # Against the remote device store
//! smartclass serve --port 8080
//!
//! # Sandbox with in-memory sample classrooms
//! smartclass serve --bind 0.0.0.0 --port 8080 --demo
//! ```

use crate::api::handlers::{route, AppState};
use crate::api::models::ApiError;
use crate::error::{DashboardError, Result};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info};

/// Dashboard server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub bind: String,
    /// Port
    pub port: u16,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            max_body_size: 64 * 1024,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// Parsed HTTP request
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub method: String,
    /// Path without the query string, still percent-encoded
    pub path: String,
    pub query: HashMap<String, String>,
    /// Fields of an `application/x-www-form-urlencoded` body
    pub form: HashMap<String, String>,
}

impl Request {
    /// Build a request from a method and a target such as `/api/logs?limit=5`
    pub fn new(method: &str, target: &str) -> Self {
        let (path, query) = target.split_once('?').unwrap_or((target, ""));
        Self {
            method: method.to_string(),
            path: path.to_string(),
            query: parse_query_string(query),
            form: HashMap::new(),
        }
    }

    /// Attach form fields from an urlencoded body
    pub fn with_form(mut self, body: &str) -> Self {
        self.form = parse_query_string(body);
        self
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn form_field(&self, key: &str) -> Option<&str> {
        self.form.get(key).map(String::as_str)
    }

    /// Decoded path segments
    pub fn segments(&self) -> Vec<String> {
        self.path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(urlencoding_decode)
            .collect()
    }
}

/// HTTP response ready to be written
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    pub fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }

    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            body: body.into(),
        }
    }

    pub fn svg(body: &str) -> Self {
        Self {
            status: 200,
            content_type: "image/svg+xml",
            body: body.to_string(),
        }
    }

    pub fn json<T: serde::Serialize>(status: u16, data: &T) -> Self {
        match serde_json::to_string(data) {
            Ok(body) => Self {
                status,
                content_type: "application/json",
                body,
            },
            Err(e) => Self::error(&ApiError::internal_error(e.to_string())),
        }
    }

    pub fn error(error: &ApiError) -> Self {
        let body = serde_json::to_string(error).unwrap_or_else(|_| {
            format!(r#"{{"code":"{}","message":"","details":null}}"#, error.code)
        });
        Self {
            status: error.status(),
            content_type: "application/json",
            body,
        }
    }

    /// Serialized HTTP/1.1 response
    pub fn to_bytes(&self) -> Vec<u8> {
        let status_text = match self.status {
            200 => "OK",
            400 => "Bad Request",
            404 => "Not Found",
            413 => "Payload Too Large",
            500 => "Internal Server Error",
            502 => "Bad Gateway",
            _ => "Unknown",
        };

        let mut out = format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             Cache-Control: no-store\r\n\
             Connection: close\r\n\r\n",
            self.status,
            status_text,
            self.content_type,
            self.body.len(),
        )
        .into_bytes();
        out.extend_from_slice(self.body.as_bytes());
        out
    }
}

/// Dashboard HTTP server
pub struct DashboardServer {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl DashboardServer {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            state: Arc::new(state),
        }
    }

    /// Get shared state
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn run(&self, shutdown: impl Future<Output = ()>) -> Result<()> {
        let addr = self.config.addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| DashboardError::Io(e).with_context(format!("Binding {}", addr)))?;
        self.serve(listener, shutdown).await
    }

    /// Serve connections from an already bound listener
    pub async fn serve(&self, listener: TcpListener, shutdown: impl Future<Output = ()>) -> Result<()> {
        let local = listener.local_addr()?;
        info!(addr = %local, "Dashboard listening on http://{}", local);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        let state = Arc::clone(&self.state);
                        let max_body = self.config.max_body_size;
                        tokio::spawn(async move {
                            if let Err(e) = handle_connection(stream, peer, &state, max_body).await {
                                error!(peer = %peer, error = %e, "Connection error");
                            }
                        });
                    }
                    Err(e) => error!(error = %e, "Accept error"),
                },
            }
        }

        info!("Dashboard server shutting down");
        Ok(())
    }
}

/// Handle a single HTTP connection
async fn handle_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    state: &AppState,
    max_body_size: usize,
) -> Result<()> {
    let (reader, mut writer) = stream.split();
    let mut reader = BufReader::new(reader);

    let response = match read_request(&mut reader, max_body_size).await {
        Ok(request) => {
            debug!(peer = %peer, method = %request.method, path = %request.path, "Request");
            route(state, &request).await
        }
        Err(error) => Response::error(&error),
    };

    writer.write_all(&response.to_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one request (line, headers, body) from `reader`
pub async fn read_request<R>(
    reader: &mut BufReader<R>,
    max_body_size: usize,
) -> std::result::Result<Request, ApiError>
where
    R: AsyncRead + Unpin,
{
    let io_error = |e: std::io::Error| ApiError::bad_request(e.to_string());

    let mut request_line = String::new();
    reader.read_line(&mut request_line).await.map_err(io_error)?;

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(ApiError::bad_request("Malformed request line"));
    }
    let mut request = Request::new(parts[0], parts[1]);

    let mut content_length = 0usize;
    let mut is_form = false;
    loop {
        let mut line = String::new();
        let read = reader.read_line(&mut line).await.map_err(io_error)?;
        if read == 0 || line.trim().is_empty() {
            break;
        }

        if let Some((key, value)) = line.trim().split_once(':') {
            let key = key.trim().to_lowercase();
            let value = value.trim();
            match key.as_str() {
                "content-length" => content_length = value.parse().unwrap_or(0),
                "content-type" => is_form = value.starts_with("application/x-www-form-urlencoded"),
                _ => {}
            }
        }
    }

    if content_length > max_body_size {
        return Err(ApiError::payload_too_large(format!(
            "Request body exceeds {} bytes",
            max_body_size
        )));
    }
    if content_length > 0 {
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).await.map_err(io_error)?;
        if is_form {
            request.form = parse_query_string(&String::from_utf8_lossy(&body));
        }
    }

    Ok(request)
}

/// Parse query string into key-value pairs
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (urlencoding_decode(key), urlencoding_decode(value))
        })
        .collect()
}

/// URL decoding of `%XX` escapes (UTF-8) and `+`
pub fn urlencoding_decode(s: &str) -> String {
    let plus_decoded = s.replace('+', " ");
    let bytes = urlencoding::decode_binary(plus_decoded.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}
