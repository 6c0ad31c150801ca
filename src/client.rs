//! Shared API client and the request pipeline every service goes through:
//! build, send, classify, decode.

use std::io::Write;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::context::Context;
use crate::error::{Error, Result, classify, sanitize_url};
use crate::query::add_options;
use crate::response::Response;
use crate::services::{
    ClientsService, CompanyService, EstimatesService, ExpensesService, InvoicesService,
    ProjectsService, RolesService, TasksService, TimesheetsService, UsersService,
};

pub const DEFAULT_BASE_URL: &str = "https://api.harvestapp.com/v2/";
pub const DEFAULT_USER_AGENT: &str = concat!("harvest-rs/", env!("CARGO_PKG_VERSION"));
pub const ACCOUNT_ID_HEADER: &str = "Harvest-Account-Id";

/// Bytes read from an unused body so the connection can go back to the pool.
const DRAIN_LIMIT: usize = 512;

/// Placeholder for requests without a body.
pub const NO_BODY: Option<&()> = None;

/// Harvest API client.
///
/// Holds the HTTP transport and the settings shared by every request. The
/// settings are fixed once the client is built, so one client can be shared
/// across tasks. Authorization belongs to the transport: pass a
/// `reqwest::Client` with default headers carrying the bearer token.
#[derive(Debug, Clone)]
pub struct HarvestClient {
    http: reqwest::Client,
    base_url: Url,
    user_agent: String,
    account_id: String,
}

impl HarvestClient {
    pub fn new(http: Option<reqwest::Client>) -> Self {
        Self {
            http: http.unwrap_or_default(),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            account_id: String::new(),
        }
    }

    /// Requests fail with [`Error::Config`] unless the path ends with `/`.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn clients(&self) -> ClientsService<'_> {
        ClientsService::new(self)
    }

    pub fn company(&self) -> CompanyService<'_> {
        CompanyService::new(self)
    }

    pub fn estimates(&self) -> EstimatesService<'_> {
        EstimatesService::new(self)
    }

    pub fn expenses(&self) -> ExpensesService<'_> {
        ExpensesService::new(self)
    }

    pub fn invoices(&self) -> InvoicesService<'_> {
        InvoicesService::new(self)
    }

    pub fn projects(&self) -> ProjectsService<'_> {
        ProjectsService::new(self)
    }

    pub fn roles(&self) -> RolesService<'_> {
        RolesService::new(self)
    }

    pub fn tasks(&self) -> TasksService<'_> {
        TasksService::new(self)
    }

    pub fn timesheets(&self) -> TimesheetsService<'_> {
        TimesheetsService::new(self)
    }

    pub fn users(&self) -> UsersService<'_> {
        UsersService::new(self)
    }

    /// Builds a request for `path`, resolved against the base URL. A body,
    /// when given, is sent as JSON.
    pub fn new_request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<reqwest::Request> {
        if !self.base_url.path().ends_with('/') {
            return Err(Error::Config(format!(
                "base URL must have a trailing slash, but {} does not",
                self.base_url
            )));
        }
        if path.starts_with('/') {
            return Err(Error::BuildRequest(format!(
                "endpoint path {path:?} must be relative to the base URL"
            )));
        }

        let url = self
            .base_url
            .join(path)
            .map_err(|err| Error::BuildRequest(format!("invalid endpoint path {path:?}: {err}")))?;

        let mut builder = self.http.request(method, url);
        if let Some(body) = body {
            let payload = serde_json::to_vec(body).map_err(Error::EncodeBody)?;
            builder = builder.header(CONTENT_TYPE, "application/json").body(payload);
        }
        if !self.user_agent.is_empty() {
            builder = builder.header(USER_AGENT, self.user_agent.as_str());
        }
        if !self.account_id.is_empty() {
            builder = builder.header(ACCOUNT_ID_HEADER, self.account_id.as_str());
        }
        builder
            .build()
            .map_err(|err| Error::BuildRequest(err.without_url().to_string()))
    }

    /// Sends `request` and decodes the JSON body. An empty body decodes to
    /// `T::default()`.
    pub async fn execute<T>(&self, ctx: &Context, request: reqwest::Request) -> Result<(T, Response)>
    where
        T: DeserializeOwned + Default,
    {
        let (snapshot, response) = self.send(ctx, request).await?;
        let body = read_body(ctx, response, &snapshot).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok((T::default(), snapshot));
        }
        match serde_json::from_slice(&body) {
            Ok(value) => Ok((value, snapshot)),
            Err(source) => Err(Error::Decode {
                source,
                response: Box::new(snapshot),
            }),
        }
    }

    /// Sends `request` for its status only; the body is drained and dropped.
    pub async fn execute_empty(&self, ctx: &Context, request: reqwest::Request) -> Result<Response> {
        let (snapshot, response) = self.send(ctx, request).await?;
        // The status is already known; a context firing mid-drain only costs the connection.
        if let Err(reason) = ctx.run(drain(response)).await {
            tracing::debug!(%reason, "stopped draining response body");
        }
        Ok(snapshot)
    }

    /// Sends `request` and copies the body verbatim into `writer`.
    pub async fn execute_raw<W>(
        &self,
        ctx: &Context,
        request: reqwest::Request,
        writer: &mut W,
    ) -> Result<Response>
    where
        W: Write + ?Sized,
    {
        let (snapshot, mut response) = self.send(ctx, request).await?;
        while let Some(chunk) = ctx
            .run(response.chunk())
            .await
            .and_then(|chunk| chunk.map_err(|err| transport_error(ctx, err)))
            .map_err(|err| Error::read_body(err, &snapshot))?
        {
            writer.write_all(&chunk)?;
        }
        writer.flush()?;
        Ok(snapshot)
    }

    async fn send(
        &self,
        ctx: &Context,
        request: reqwest::Request,
    ) -> Result<(Response, reqwest::Response)> {
        let method = request.method().clone();
        tracing::debug!(%method, url = %sanitize_url(request.url()), "sending request");

        let response = ctx
            .run(self.http.execute(request))
            .await?
            .map_err(|err| transport_error(ctx, err))?;

        let snapshot = Response::capture(method, &response);
        tracing::debug!(
            method = %snapshot.method,
            url = %sanitize_url(&snapshot.url),
            status = snapshot.status.as_u16(),
            "received response"
        );

        if snapshot.status.is_success() {
            return Ok((snapshot, response));
        }
        let body = read_body(ctx, response, &snapshot).await?;
        Err(classify(snapshot, &body))
    }

    pub(crate) async fn get<T, O>(&self, ctx: &Context, path: &str, opts: Option<&O>) -> Result<(T, Response)>
    where
        T: DeserializeOwned + Default,
        O: Serialize + ?Sized,
    {
        let path = add_options(path, opts)?;
        let request = self.new_request(Method::GET, &path, NO_BODY)?;
        self.execute(ctx, request).await
    }

    pub(crate) async fn post<T, B>(&self, ctx: &Context, path: &str, body: &B) -> Result<(T, Response)>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        let request = self.new_request(Method::POST, path, Some(body))?;
        self.execute(ctx, request).await
    }

    pub(crate) async fn patch<T, B>(&self, ctx: &Context, path: &str, body: &B) -> Result<(T, Response)>
    where
        T: DeserializeOwned + Default,
        B: Serialize + ?Sized,
    {
        let request = self.new_request(Method::PATCH, path, Some(body))?;
        self.execute(ctx, request).await
    }

    pub(crate) async fn delete(&self, ctx: &Context, path: &str) -> Result<Response> {
        let request = self.new_request(Method::DELETE, path, NO_BODY)?;
        self.execute_empty(ctx, request).await
    }
}

impl Default for HarvestClient {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Prefers the context's reason over the error it caused.
fn transport_error(ctx: &Context, err: reqwest::Error) -> Error {
    ctx.err().unwrap_or_else(|| Error::transport(err))
}

async fn read_body(
    ctx: &Context,
    response: reqwest::Response,
    snapshot: &Response,
) -> Result<Vec<u8>> {
    ctx.run(response.bytes())
        .await
        .and_then(|bytes| bytes.map_err(|err| transport_error(ctx, err)))
        .map(|bytes| bytes.to_vec())
        .map_err(|err| Error::read_body(err, snapshot))
}

async fn drain(mut response: reqwest::Response) {
    let mut drained = 0;
    while drained < DRAIN_LIMIT {
        match response.chunk().await {
            Ok(Some(chunk)) => drained += chunk.len(),
            _ => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde::Deserialize;
    use serde::ser::{self, Serializer};
    use serde_json::json;
    use std::io::Read;
    use std::net::{TcpListener, TcpStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, mpsc};
    use std::thread;
    use std::time::Duration;

    #[derive(Debug, Default, Deserialize)]
    struct Item {
        id: Option<i64>,
        name: Option<String>,
    }

    fn client_for(server: &MockServer) -> HarvestClient {
        HarvestClient::new(None)
            .with_base_url(Url::parse(&server.url("/v2/")).unwrap())
            .with_account_id("123456")
    }

    #[test]
    fn new_request_sets_headers_and_resolves_path() {
        let client = HarvestClient::new(None).with_account_id("42").with_user_agent("agent/1.0");
        let request = client
            .new_request(Method::POST, "clients", Some(&json!({"name": "a&b <c>"})))
            .unwrap();
        assert_eq!(request.url().as_str(), "https://api.harvestapp.com/v2/clients");
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers()[USER_AGENT], "agent/1.0");
        assert_eq!(request.headers()[ACCOUNT_ID_HEADER], "42");
        let body = request.body().and_then(|body| body.as_bytes()).unwrap();
        assert_eq!(body, br#"{"name":"a&b <c>"}"#);
    }

    #[test]
    fn empty_settings_omit_headers() {
        let client = HarvestClient::new(None).with_user_agent("");
        let request = client.new_request(Method::GET, "users/me", NO_BODY).unwrap();
        assert!(request.headers().get(USER_AGENT).is_none());
        assert!(request.headers().get(ACCOUNT_ID_HEADER).is_none());
        assert!(request.headers().get(CONTENT_TYPE).is_none());
        assert!(request.body().is_none());
    }

    #[test]
    fn base_url_without_trailing_slash_is_config_error() {
        let client = HarvestClient::new(None).with_base_url(Url::parse("https://api.harvestapp.com/v2").unwrap());
        let err = client.new_request(Method::GET, "clients", NO_BODY).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn absolute_path_is_rejected() {
        let err = HarvestClient::new(None)
            .new_request(Method::GET, "/clients", NO_BODY)
            .unwrap_err();
        assert!(matches!(err, Error::BuildRequest(_)));
    }

    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> std::result::Result<S::Ok, S::Error> {
            Err(ser::Error::custom("cannot encode"))
        }
    }

    #[test]
    fn unencodable_body_is_encode_body_error() {
        let err = HarvestClient::new(None)
            .new_request(Method::POST, "clients", Some(&Unencodable))
            .unwrap_err();
        assert!(matches!(err, Error::EncodeBody(_)));
    }

    #[tokio::test]
    async fn execute_decodes_json_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v2/clients/1")
                .header("harvest-account-id", "123456");
            then.status(200).json_body(json!({"id": 1, "name": "Client 1"}));
        });

        let client = client_for(&server);
        let (item, response): (Item, _) = client
            .get(&Context::background(), "clients/1", NO_BODY)
            .await
            .unwrap();
        mock.assert();
        assert_eq!(item.id, Some(1));
        assert_eq!(item.name.as_deref(), Some("Client 1"));
        assert_eq!(response.status.as_u16(), 200);
    }

    #[tokio::test]
    async fn empty_body_decodes_to_default() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2/clients/1");
            then.status(200);
        });

        let (item, _): (Item, _) = client_for(&server)
            .get(&Context::background(), "clients/1", NO_BODY)
            .await
            .unwrap();
        assert!(item.id.is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error_with_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2/clients/1");
            then.status(200).body("{not json");
        });

        let err = client_for(&server)
            .get::<Item, ()>(&Context::background(), "clients/1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert_eq!(err.status().map(|status| status.as_u16()), Some(200));
    }

    #[tokio::test]
    async fn failure_keeps_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/v2/clients/9");
            then.status(422)
                .header("content-type", "application/json")
                .json_body(json!({"message": "Client has projects"}));
        });

        let err = client_for(&server)
            .delete(&Context::background(), "clients/9")
            .await
            .unwrap_err();
        let response = err.response().unwrap();
        assert_eq!(response.status.as_u16(), 422);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert!(err.to_string().contains("Client has projects"));
    }

    #[tokio::test]
    async fn execute_raw_copies_body_verbatim() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2/invoices/1");
            then.status(200).body("%PDF-1.4 raw bytes");
        });

        let client = client_for(&server);
        let request = client.new_request(Method::GET, "invoices/1", NO_BODY).unwrap();
        let mut sink = Vec::new();
        let response = client
            .execute_raw(&Context::background(), request, &mut sink)
            .await
            .unwrap();
        assert_eq!(response.status.as_u16(), 200);
        assert_eq!(sink, b"%PDF-1.4 raw bytes");
    }

    #[tokio::test]
    async fn cancelled_context_skips_the_network() {
        // Nothing listens on the discard port, so any dispatch would surface
        // as a transport error instead.
        let client = HarvestClient::new(None).with_base_url(Url::parse("http://127.0.0.1:9/v2/").unwrap());
        let ctx = Context::background();
        ctx.cancel();
        let err = client
            .get::<Item, ()>(&ctx, "clients", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn deadline_interrupts_slow_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v2/clients");
            then.status(200).delay(Duration::from_secs(5)).json_body(json!({}));
        });

        let ctx = Context::with_timeout(Duration::from_millis(50));
        let err = client_for(&server)
            .get::<Item, ()>(&ctx, "clients", None)
            .await
            .unwrap_err();
        assert!(matches!(err.cause(), Error::DeadlineExceeded));
    }

    #[tokio::test]
    async fn connection_failure_is_transport_error_with_redacted_url() {
        let client = HarvestClient::new(None).with_base_url(Url::parse("http://127.0.0.1:9/v2/").unwrap());
        let err = client
            .get::<Item, _>(
                &Context::background(),
                "oauth2/token",
                Some(&vec![("client_secret", "abc")]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        let Error::Transport(inner) = &err else {
            unreachable!();
        };
        let url = inner.url().unwrap().as_str();
        assert!(url.contains("client_secret=REDACTED"));
        assert!(!url.contains("abc"));
    }

    /// HTTP/1.1 stub that answers every request with `reply` and keeps the
    /// connection open. Counts accepted connections and reports each one the
    /// client closes.
    struct Stub {
        base_url: Url,
        accepted: Arc<AtomicUsize>,
        closed: mpsc::Receiver<()>,
    }

    impl Stub {
        fn start(reply: &'static [u8]) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let addr = listener.local_addr().unwrap();
            let accepted = Arc::new(AtomicUsize::new(0));
            let (closed_tx, closed) = mpsc::channel();
            let counter = Arc::clone(&accepted);
            thread::spawn(move || {
                for stream in listener.incoming() {
                    let Ok(mut stream) = stream else { break };
                    counter.fetch_add(1, Ordering::SeqCst);
                    let closed_tx = closed_tx.clone();
                    thread::spawn(move || {
                        while read_request_head(&mut stream) {
                            if stream.write_all(reply).is_err() {
                                break;
                            }
                        }
                        let _ = closed_tx.send(());
                    });
                }
            });
            Self {
                base_url: Url::parse(&format!("http://{addr}/v2/")).unwrap(),
                accepted,
                closed,
            }
        }

        fn client(&self) -> HarvestClient {
            HarvestClient::new(None).with_base_url(self.base_url.clone())
        }

        fn accepted(&self) -> usize {
            self.accepted.load(Ordering::SeqCst)
        }

        async fn wait_closed(&self) -> bool {
            for _ in 0..40 {
                if self.closed.try_recv().is_ok() {
                    return true;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            false
        }
    }

    fn read_request_head(stream: &mut TcpStream) -> bool {
        let mut head = Vec::new();
        let mut byte = [0u8; 1];
        while !head.ends_with(b"\r\n\r\n") {
            match stream.read(&mut byte) {
                Ok(1) => head.push(byte[0]),
                _ => return false,
            }
        }
        true
    }

    #[tokio::test]
    async fn interrupted_body_keeps_response() {
        let stub = Stub::start(
            b"HTTP/1.1 503 Service Unavailable\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"message\":",
        );

        let ctx = Context::with_timeout(Duration::from_millis(300));
        let err = stub
            .client()
            .get::<Item, ()>(&ctx, "clients", None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::ReadBody { .. }), "{err:?}");
        assert!(matches!(err.cause(), Error::DeadlineExceeded));
        assert_eq!(err.status().map(|status| status.as_u16()), Some(503));
    }

    #[tokio::test]
    async fn drained_delete_reuses_connection() {
        let stub = Stub::start(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n{}");
        let client = stub.client();
        let ctx = Context::background();

        client.delete(&ctx, "roles/1").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.delete(&ctx, "roles/2").await.unwrap();

        assert_eq!(stub.accepted(), 1);
    }

    #[tokio::test]
    async fn error_body_is_consumed_before_reuse() {
        let stub = Stub::start(
            b"HTTP/1.1 404 Not Found\r\nContent-Type: application/json\r\nContent-Length: 30\r\n\r\n{\"message\":\"Client not found\"}",
        );
        let client = stub.client();
        let ctx = Context::background();

        for id in [1, 2] {
            let err = client
                .get::<Item, ()>(&ctx, &format!("clients/{id}"), None)
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Api(_)));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        assert_eq!(stub.accepted(), 1);
    }

    #[tokio::test]
    async fn oversized_delete_body_is_abandoned() {
        static REPLY: std::sync::LazyLock<Vec<u8>> = std::sync::LazyLock::new(|| {
            let mut reply = b"HTTP/1.1 200 OK\r\nContent-Length: 100000\r\n\r\n".to_vec();
            reply.extend(std::iter::repeat_n(b'x', DRAIN_LIMIT + 88));
            reply
        });
        let stub = Stub::start(REPLY.as_slice());

        let started = std::time::Instant::now();
        let response = stub
            .client()
            .delete(&Context::with_timeout(Duration::from_secs(5)), "roles/1")
            .await
            .unwrap();

        assert!(response.status.is_success());
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(stub.wait_closed().await);
    }
}
