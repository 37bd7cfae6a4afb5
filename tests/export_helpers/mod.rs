//! Shared test helpers: a spy delivery sink and a stub HTTP server.

#![allow(dead_code)]

use figsnap_lib::config::FigmaConfig;
use figsnap_lib::delivery::{DeliveryReceipt, DeliverySink, PayloadFormat};
use figsnap_lib::{DeliveryError, ExportError, ExportStatus};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

// ── Spy sink ─────────────────────────────────────────────────────────

/// Records every delivery and answers from a scripted queue.
pub struct SpySink {
    format: PayloadFormat,
    config: Option<FigmaConfig>,
    delay: Option<Duration>,
    cancellable: bool,
    responses: Mutex<VecDeque<Result<DeliveryReceipt, DeliveryError>>>,
    calls: AtomicUsize,
    payloads: Mutex<Vec<String>>,
}

impl SpySink {
    pub fn svg() -> Self {
        Self {
            format: PayloadFormat::Svg,
            config: None,
            delay: None,
            cancellable: true,
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub fn figma(config: FigmaConfig) -> Self {
        Self {
            format: PayloadFormat::FigmaNodes,
            config: Some(config),
            ..Self::svg()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Behave like a sink whose delivery cannot be interrupted.
    pub fn uncancellable(mut self) -> Self {
        self.cancellable = false;
        self
    }

    pub fn respond_with(self, response: Result<DeliveryReceipt, DeliveryError>) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }
}

impl DeliverySink for SpySink {
    fn format(&self) -> PayloadFormat {
        self.format
    }

    fn check_config(&self) -> Result<(), ExportError> {
        match &self.config {
            Some(config) => config.validate(),
            None => Ok(()),
        }
    }

    fn cancellable(&self) -> bool {
        self.cancellable
    }

    async fn deliver(&self, payload: String) -> Result<DeliveryReceipt, DeliveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let chars = payload.chars().count();
        self.payloads.lock().unwrap().push(payload);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.responses.lock().unwrap().pop_front();
        scripted.unwrap_or(Ok(DeliveryReceipt::Clipboard { chars }))
    }
}

/// Observer that appends every transition to a shared list.
pub fn recorder() -> (
    Arc<Mutex<Vec<ExportStatus>>>,
    impl Fn(&ExportStatus) + Send + Sync + 'static,
) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (seen, move |status: &ExportStatus| {
        sink.lock().unwrap().push(status.clone())
    })
}

// ── Stub HTTP server ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: String,
}

pub struct StubServer {
    pub base_url: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Serve `status` + `body` to every request on a random local port.
pub async fn spawn_stub(status: u16, body: &'static str) -> StubServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let recorded = requests.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let recorded = recorded.clone();
            tokio::spawn(async move {
                if let Some(request) = read_request(&mut socket).await {
                    recorded.lock().unwrap().push(request);
                }
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    if status == 200 { "OK" } else { "Error" },
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    StubServer {
        base_url: format!("http://{}/v1", addr),
        requests,
    }
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Some(RecordedRequest {
        method,
        path,
        headers,
        body,
    })
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
