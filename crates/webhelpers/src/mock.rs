//! In-process HTTP server answering one route with a canned response.
//!
//! Meant for tests: point a client at [`MockServer::url`] instead of the real
//! service endpoint.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::prelude::*;

/// Body written by a [`MockServer`]
#[derive(Debug, Clone, PartialEq)]
pub enum MockBody {
    /// Written byte-for-byte
    Text(String),
    /// Written as JSON
    Json(serde_json::Value),
    /// Written as `{}`
    Empty,
}

impl MockBody {
    /// Body from any serializable value.
    ///
    /// Records (JSON objects, or `null` for an absent one) are written as JSON
    /// and strings byte-for-byte. Anything else, including a value that fails
    /// to serialize, is written as `{}`.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => MockBody::from(value),
            Err(err) => {
                warn!("mock body is not serializable: {err}");
                MockBody::Empty
            }
        }
    }

    pub fn render(&self) -> Vec<u8> {
        match self {
            MockBody::Text(text) => text.as_bytes().to_vec(),
            MockBody::Json(value) => serde_json::to_vec(value).unwrap_or_default(),
            MockBody::Empty => b"{}".to_vec(),
        }
    }
}

impl From<&str> for MockBody {
    fn from(text: &str) -> Self {
        MockBody::Text(text.to_string())
    }
}

impl From<String> for MockBody {
    fn from(text: String) -> Self {
        MockBody::Text(text)
    }
}

impl From<serde_json::Value> for MockBody {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(_) | serde_json::Value::Null => MockBody::Json(value),
            serde_json::Value::String(text) => MockBody::Text(text),
            _ => MockBody::Empty,
        }
    }
}

/// A request received by a [`MockServer`]
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[cfg(test)]
impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug)]
struct Canned {
    status: StatusCode,
    body: Vec<u8>,
    #[cfg(test)]
    requests: std::sync::Mutex<Vec<RecordedRequest>>,
}

impl Canned {
    #[cfg(test)]
    fn record(&self, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) {
        let request = RecordedRequest {
            method,
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers,
            body: body.to_vec(),
        };
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request);
    }

    #[cfg(not(test))]
    fn record(&self, _method: Method, _uri: Uri, _headers: HeaderMap, _body: Bytes) {}
}

async fn canned_handler(
    State(canned): State<Arc<Canned>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    canned.record(method, uri, headers, body);
    (canned.status, canned.body.clone()).into_response()
}

/// Running mock server. Stops on [`MockServer::close`] or when dropped.
#[derive(Debug)]
pub struct MockServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
    #[cfg(test)]
    canned: Arc<Canned>,
}

impl MockServer {
    /// Start a server on an ephemeral local port answering `pattern`.
    ///
    /// A pattern ending in `/` also answers every path below it, so `/` answers
    /// any request. A pattern not starting with `/` is rejected with
    /// [`std::io::ErrorKind::InvalidInput`].
    pub async fn start(
        pattern: &str,
        status: StatusCode,
        body: impl Into<MockBody>,
    ) -> std::io::Result<Self> {
        if !pattern.starts_with('/') {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                f!("mock route pattern must start with '/': {pattern:?}"),
            ));
        }

        let canned = Arc::new(Canned {
            status,
            body: body.into().render(),
            #[cfg(test)]
            requests: Default::default(),
        });

        let mut router = Router::new().route(pattern, any(canned_handler));
        if pattern.ends_with('/') {
            router = router.route(&f!("{pattern}{{*rest}}"), any(canned_handler));
        }
        let router = router.with_state(canned.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        let (tx, rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = rx.await;
                })
                .await;
            if let Err(err) = result {
                warn!("mock server error: {err}");
            }
        });

        debug!("mock server for {pattern} listening on http://{addr}");

        Ok(Self {
            addr,
            shutdown: Some(tx),
            handle: Some(handle),
            #[cfg(test)]
            canned,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Base URL of the server, without a trailing slash
    pub fn url(&self) -> String {
        f!("http://{}", self.addr)
    }

    /// Requests received so far, oldest first.
    #[cfg(test)]
    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.canned
            .requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Stop the server and wait for it to finish.
    pub async fn close(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
