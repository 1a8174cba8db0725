use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

/// Request method used by loaders and probes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// Full fetch.
    Get,
    /// Existence check without a body.
    Head,
}

/// Status plus body of a completed request. Non-2xx statuses are not errors at this level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status (emulated for non-HTTP transports).
    pub status: u16,
    /// Response body; empty for `HEAD`.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The request could not complete (connection refused, DNS, IO, ...).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Seam between loaders and the outside world.
///
/// Implementations must not retry; the HEAD→GET fallback for probes lives in the caller.
pub trait Transport {
    /// Issue one request.
    fn request(
        &self,
        method: Method,
        url: &str,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn request(
        &self,
        method: Method,
        url: &str,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> {
        (**self).request(method, url)
    }
}

/// HTTP(S) transport backed by `reqwest`. Timeouts are the client defaults.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Wrap an existing client.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
    ) -> Result<TransportResponse, TransportError> {
        let m = match method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
        };
        let resp = self
            .client
            .request(m, url)
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = match method {
            Method::Head => Vec::new(),
            Method::Get => resp
                .bytes()
                .await
                .map_err(|e| TransportError(e.to_string()))?
                .to_vec(),
        };
        Ok(TransportResponse { status, body })
    }
}

/// Serves paths from a static root directory, the way a web server serves `public/`.
///
/// A leading `/` (or `file://`) is relative to the root. Missing files answer 404 and paths that
/// try to leave the root answer 403.
#[derive(Clone, Debug)]
pub struct StaticTransport {
    root: PathBuf,
}

impl StaticTransport {
    /// Serve from `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, url: &str) -> Option<PathBuf> {
        let rel = url.strip_prefix("file://").unwrap_or(url);
        let rel = rel.split(['?', '#']).next().unwrap_or(rel);
        let rel = rel.trim_start_matches('/');
        let mut out = self.root.clone();
        for comp in Path::new(rel).components() {
            match comp {
                Component::Normal(part) => out.push(part),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(out)
    }
}

impl Transport for StaticTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
    ) -> Result<TransportResponse, TransportError> {
        let Some(path) = self.resolve(url) else {
            return Ok(TransportResponse {
                status: 403,
                body: Vec::new(),
            });
        };

        let result = match method {
            Method::Head => tokio::fs::metadata(&path).await.and_then(|m| {
                if m.is_file() {
                    Ok(Vec::new())
                } else {
                    Err(std::io::ErrorKind::NotFound.into())
                }
            }),
            Method::Get => tokio::fs::read(&path).await,
        };

        match result {
            Ok(body) => Ok(TransportResponse { status: 200, body }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TransportResponse {
                status: 404,
                body: Vec::new(),
            }),
            Err(e) => Err(TransportError(format!("{}: {e}", path.display()))),
        }
    }
}

/// Routes `http(s)://` URLs to [`HttpTransport`] and everything else to [`StaticTransport`].
#[derive(Clone, Debug)]
pub struct DefaultTransport {
    http: HttpTransport,
    files: StaticTransport,
}

impl DefaultTransport {
    /// Build a router serving non-HTTP locations from `static_root`.
    pub fn new(static_root: impl Into<PathBuf>) -> Self {
        Self {
            http: HttpTransport::default(),
            files: StaticTransport::new(static_root),
        }
    }
}

impl Transport for DefaultTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
    ) -> Result<TransportResponse, TransportError> {
        if is_remote(url) {
            self.http.request(method, url).await
        } else {
            self.files.request(method, url).await
        }
    }
}

/// In-memory transport for tests and offline use.
///
/// Unknown URLs answer 404. Every request is logged. A gated URL waits for
/// [`MemoryTransport::open_gate`] before answering, which lets callers stage in-flight fetches.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    routes: RefCell<HashMap<String, Result<TransportResponse, TransportError>>>,
    gates: RefCell<HashMap<String, Rc<tokio::sync::Notify>>>,
    log: RefCell<Vec<(Method, String)>>,
    head_fails: bool,
}

impl MemoryTransport {
    /// Empty transport: every URL answers 404.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` with status 200 at `url`.
    pub fn with_body(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.insert(
            url,
            Ok(TransportResponse {
                status: 200,
                body: body.into(),
            }),
        );
        self
    }

    /// Answer `url` with an empty body and `status`.
    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.insert(
            url,
            Ok(TransportResponse {
                status,
                body: Vec::new(),
            }),
        );
        self
    }

    /// Fail every request to `url` at the transport level.
    pub fn with_failure(self, url: &str, message: &str) -> Self {
        self.insert(url, Err(TransportError(message.to_string())));
        self
    }

    /// Make every `HEAD` request fail at the transport level (servers without HEAD support).
    pub fn with_failing_head(mut self) -> Self {
        self.head_fails = true;
        self
    }

    /// Replace the route for `url`.
    pub fn insert(&self, url: &str, response: Result<TransportResponse, TransportError>) {
        self.routes.borrow_mut().insert(url.to_string(), response);
    }

    /// Hold requests to `url` until [`MemoryTransport::open_gate`] is called for it.
    pub fn gate(&self, url: &str) {
        self.gates
            .borrow_mut()
            .insert(url.to_string(), Rc::new(tokio::sync::Notify::new()));
    }

    /// Release one pending (or the next) request held by the gate on `url`.
    pub fn open_gate(&self, url: &str) {
        if let Some(gate) = self.gates.borrow().get(url) {
            gate.notify_one();
        }
    }

    /// Every request issued so far, in order.
    pub fn requests(&self) -> Vec<(Method, String)> {
        self.log.borrow().clone()
    }

    /// Number of requests issued for `url` with any method.
    pub fn request_count(&self, url: &str) -> usize {
        self.log.borrow().iter().filter(|(_, u)| u == url).count()
    }
}

impl Transport for MemoryTransport {
    async fn request(
        &self,
        method: Method,
        url: &str,
    ) -> Result<TransportResponse, TransportError> {
        self.log.borrow_mut().push((method, url.to_string()));

        let gate = self.gates.borrow().get(url).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if method == Method::Head && self.head_fails {
            return Err(TransportError("HEAD not supported".to_string()));
        }

        let route = self.routes.borrow().get(url).cloned();
        match route {
            Some(Ok(mut resp)) => {
                if method == Method::Head {
                    resp.body.clear();
                }
                Ok(resp)
            }
            Some(Err(e)) => Err(e),
            None => Ok(TransportResponse {
                status: 404,
                body: Vec::new(),
            }),
        }
    }
}

/// `true` for `http://` and `https://` locations.
pub fn is_remote(url: &str) -> bool {
    let lower = url.get(..8).unwrap_or(url).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
#[path = "../../tests/unit/source/transport.rs"]
mod tests;
