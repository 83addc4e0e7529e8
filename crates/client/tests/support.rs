#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use folio_client::{ClientConfig, FolioClient};
use serde_json::{json, Map, Value};
use tokio::runtime::Runtime;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const TENANT: &str = "diku";
pub const USERNAME: &str = "diku_admin";
pub const PASSWORD: &str = "s3cret-pw";

/// Stub FOLIO gateway.
///
/// The mock server is driven from a dedicated tokio runtime so the blocking
/// client can run on the plain test thread. Declare it before the client so
/// the client (and its logout) goes away first.
pub struct StubServer {
    server: MockServer,
    runtime: Runtime,
}

impl StubServer {
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("tokio runtime should start");
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    /// Stub server that accepts login and logout.
    pub fn with_auth() -> Self {
        let stub = Self::start();
        stub.mount_login(login_response("access-1", "refresh-1", Utc::now() + Duration::hours(1)));
        stub.mount_logout();
        stub
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    pub fn mount_login(&self, response: ResponseTemplate) {
        self.mount(
            Mock::given(method("POST"))
                .and(path("/authn/login-with-expiry"))
                .respond_with(response),
        );
    }

    pub fn mount_logout(&self) {
        self.mount(
            Mock::given(method("POST"))
                .and(path("/authn/logout"))
                .respond_with(ResponseTemplate::new(204)),
        );
    }

    pub fn requests(&self) -> Vec<Request> {
        self.runtime.block_on(self.server.received_requests()).unwrap_or_default()
    }

    /// Requests received on one path, in arrival order.
    pub fn requests_to(&self, endpoint: &str) -> Vec<Request> {
        self.requests().into_iter().filter(|r| r.url.path() == endpoint).collect()
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.uri(), TENANT, USERNAME, PASSWORD).with_timeout(5)
    }

    /// Open a client against the stub; login must be mounted.
    pub fn connect(&self) -> FolioClient {
        FolioClient::new(self.config()).expect("client should log in against the stub")
    }
}

/// Successful login/refresh answer: tokens as cookies, expiry in the body.
pub fn login_response(access: &str, refresh: &str, expires_at: DateTime<Utc>) -> ResponseTemplate {
    let refresh_expires_at = expires_at + Duration::days(7);
    ResponseTemplate::new(201)
        .append_header(
            "set-cookie",
            format!("folioAccessToken={}; Max-Age=600; Path=/; HttpOnly", access),
        )
        .append_header(
            "set-cookie",
            format!("folioRefreshToken={}; Max-Age=604800; Path=/authn; HttpOnly", refresh),
        )
        .set_body_json(json!({
            "accessTokenExpiration": expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            "refreshTokenExpiration": refresh_expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }))
}

/// Value of a query parameter on a received request.
pub fn query_value(request: &Request, name: &str) -> Option<String> {
    request.url.query_pairs().find(|(key, _)| key == name).map(|(_, value)| value.into_owned())
}

pub fn header_value(request: &Request, name: &str) -> Option<String> {
    request.headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

/// Zero-padded ids that sort the same lexically and numerically.
pub fn record_id(n: usize) -> String {
    format!("00000000-0000-0000-0000-{:012}", n)
}

pub fn records(count: usize) -> Vec<Value> {
    (1..=count).map(|n| json!({ "id": record_id(n), "seq": n })).collect()
}

/// Listing endpoint honouring `id>{cursor}` and `limit`, like the real
/// storage modules do for `sortBy id` queries.
pub struct CursorListing {
    key: String,
    records: Vec<Value>,
}

impl CursorListing {
    pub fn new(key: &str, records: Vec<Value>) -> Self {
        Self { key: key.to_string(), records }
    }
}

impl Respond for CursorListing {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let query = query_value(request, "query").unwrap_or_default();
        let cursor = query
            .strip_prefix("id>")
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap_or("")
            .to_string();
        let limit = query_value(request, "limit")
            .and_then(|l| l.parse::<usize>().ok())
            .unwrap_or(usize::MAX);

        let page: Vec<Value> = self
            .records
            .iter()
            .filter(|record| record["id"].as_str().map_or(true, |id| id > cursor.as_str()))
            .take(limit)
            .cloned()
            .collect();

        let mut body = Map::new();
        body.insert(self.key.clone(), Value::Array(page));
        body.insert("totalRecords".to_string(), json!(self.records.len()));
        ResponseTemplate::new(200).set_body_json(Value::Object(body))
    }
}

/// Captures formatted `tracing` output of the current thread.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().expect("log buffer poisoned").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter { buffer: Arc::clone(&self.buffer) }
    }
}

impl LogCapture {
    /// Run `f` with a subscriber writing into this capture.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().expect("log buffer poisoned")).into_owned()
    }

    /// Whether a line at `level` (e.g. `"WARN"`) contains `needle`.
    pub fn contains(&self, level: &str, needle: &str) -> bool {
        self.contents().lines().any(|line| line.contains(level) && line.contains(needle))
    }
}
