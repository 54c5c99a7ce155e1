use std::sync::Arc;
use std::time::Duration;

use hyper::body::Bytes;
use hyper::Method;
use pilosa_common::protocol::error::{ErrorKind, PilosaError, Resource, Result};
use pilosa_common::{
    classify_server_error, encode_query_request, Database, DatabaseRequest, Frame, FrameRequest,
    QueryOptions, QueryResponse, Schema, Uri,
};
use serde_json::to_vec;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cluster::Cluster;
use crate::config::ClientConfig;
use crate::transport::{Codec, HttpRequest, HttpResponse, HyperTransport, Transport};

/// One logical call, built fresh for every operation.
struct OperationRequest {
    method: Method,
    path: &'static str,
    codec: Codec,
    body: Bytes,
    expects_body: bool,
}

/// Pilosa client.
///
/// Every operation picks the next host of the cluster round-robin, performs
/// a single HTTP exchange with it and classifies the outcome. Failed
/// requests are returned to the caller, never retried against another host.
///
/// Clones share the cluster, so rotation continues across clones.
/// [`with_timeout`](Self::with_timeout) and
/// [`with_cancellation`](Self::with_cancellation) return such clones to
/// scope a deadline or a cancellation token to some calls.
///
/// # Example
///
/// ```no_run
/// use pilosa_client::PilosaClient;
/// use pilosa_common::{Database, Uri};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = PilosaClient::with_address(Uri::from_address("http://127.0.0.1:10101")?);
/// let db = Database::new("repository")?;
/// client.ensure_database_exists(&db).await?;
///
/// let response = client.query(&db, "Bitmap(id=1, frame='stargazer')").await?;
/// println!("{:?}", response.result());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PilosaClient {
    cluster: Arc<RwLock<Cluster>>,
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    cancel: Option<CancellationToken>,
}

impl PilosaClient {
    /// Client for a single server at the default address (`http://localhost:10101`)
    pub fn new() -> Self {
        Self::with_address(Uri::default())
    }

    pub fn with_address(address: Uri) -> Self {
        Self::with_cluster(Cluster::with_host(address))
    }

    pub fn with_cluster(cluster: Cluster) -> Self {
        Self::with_config(cluster, ClientConfig::default())
    }

    pub fn with_config(cluster: Cluster, config: ClientConfig) -> Self {
        let transport = Arc::new(HyperTransport::new(config.max_response_size));
        Self::with_transport(cluster, config, transport)
    }

    /// Client exchanging requests through a caller-supplied transport.
    pub fn with_transport(
        cluster: Cluster,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        info!(
            "Pilosa client initialized with {} hosts, request timeout {:?}",
            cluster.host_count(),
            config.request_timeout
        );
        Self {
            cluster: Arc::new(RwLock::new(cluster)),
            transport,
            config,
            cancel: None,
        }
    }

    /// Clone of this client whose requests time out after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let mut client = self.clone();
        client.config.request_timeout = timeout;
        client
    }

    /// Clone of this client whose requests stop once `token` is cancelled.
    ///
    /// A request interrupted this way fails with [`PilosaError::Cancelled`].
    pub fn with_cancellation(&self, token: CancellationToken) -> Self {
        let mut client = self.clone();
        client.cancel = Some(token);
        client
    }

    /// Runs a query with default options.
    pub async fn query(&self, database: &Database, query: &str) -> Result<QueryResponse> {
        self.query_with_options(database, query, &QueryOptions::default())
            .await
    }

    /// Runs a query.
    ///
    /// A query the server rejected is still returned as a response with
    /// `success == false`; see [`QueryResponse::into_result`].
    pub async fn query_with_options(
        &self,
        database: &Database,
        query: &str,
        options: &QueryOptions,
    ) -> Result<QueryResponse> {
        let body = encode_query_request(database.name(), query, options);
        let buf = self
            .http_request(OperationRequest {
                method: Method::POST,
                path: "/query",
                codec: Codec::Protobuf,
                body: Bytes::from(body),
                expects_body: true,
            })
            .await?
            .unwrap_or_default();
        QueryResponse::decode(&buf)
    }

    pub async fn create_database(&self, database: &Database) -> Result<()> {
        self.database_request(Method::POST, database).await
    }

    /// Creates the database unless the server reports it already exists.
    pub async fn ensure_database_exists(&self, database: &Database) -> Result<()> {
        match self.create_database(database).await {
            Err(e) if e.is_already_exists(Resource::Database) => Ok(()),
            other => other,
        }
    }

    pub async fn delete_database(&self, database: &Database) -> Result<()> {
        self.database_request(Method::DELETE, database).await
    }

    pub async fn create_frame(&self, frame: &Frame) -> Result<()> {
        self.frame_request(Method::POST, frame).await
    }

    /// Creates the frame unless the server reports it already exists.
    pub async fn ensure_frame_exists(&self, frame: &Frame) -> Result<()> {
        match self.create_frame(frame).await {
            Err(e) if e.is_already_exists(Resource::Frame) => Ok(()),
            other => other,
        }
    }

    pub async fn delete_frame(&self, frame: &Frame) -> Result<()> {
        self.frame_request(Method::DELETE, frame).await
    }

    /// Fetches the databases and frames known to the server.
    pub async fn schema(&self) -> Result<Schema> {
        let buf = self
            .http_request(OperationRequest {
                method: Method::GET,
                path: "/schema",
                codec: Codec::Json,
                body: Bytes::new(),
                expects_body: true,
            })
            .await?
            .unwrap_or_default();
        Schema::decode(&buf)
    }

    pub async fn add_host(&self, host: Uri) {
        info!("Adding host {}", host);
        self.cluster.write().await.add_host(host);
    }

    /// Removes a host from the rotation; returns false if it was not present.
    pub async fn remove_host(&self, host: &Uri) -> bool {
        let removed = self.cluster.write().await.remove_host(host);
        if removed {
            info!("Removed host {}", host);
        }
        removed
    }

    pub async fn hosts(&self) -> Vec<Uri> {
        self.cluster.read().await.hosts()
    }

    async fn database_request(&self, method: Method, database: &Database) -> Result<()> {
        let body = encode_json(&DatabaseRequest::from(database))?;
        self.http_request(OperationRequest {
            method,
            path: "/db",
            codec: Codec::Json,
            body,
            expects_body: false,
        })
        .await?;
        Ok(())
    }

    async fn frame_request(&self, method: Method, frame: &Frame) -> Result<()> {
        let body = encode_json(&FrameRequest::from(frame))?;
        self.http_request(OperationRequest {
            method,
            path: "/frame",
            codec: Codec::Json,
            body,
            expects_body: false,
        })
        .await?;
        Ok(())
    }

    /// Selects a host, performs the exchange and classifies the outcome.
    ///
    /// Returns the body when the operation expects one, `None` otherwise.
    async fn http_request(&self, operation: OperationRequest) -> Result<Option<Bytes>> {
        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(PilosaError::Cancelled);
        }

        let host = {
            let mut cluster = self.cluster.write().await;
            cluster.next_host().ok_or(PilosaError::EmptyCluster)?
        };

        let url = format!("{}{}", host.normalized_address(), operation.path);
        debug!("{} {}", operation.method, url);

        let response = self
            .exchange(HttpRequest {
                method: operation.method,
                url,
                codec: operation.codec,
                body: operation.body,
            })
            .await?;

        interpret_response(response, operation.expects_body)
    }

    /// Runs the transport under the request timeout and cancellation token.
    async fn exchange(&self, request: HttpRequest) -> Result<HttpResponse> {
        let timeout = self.config.request_timeout;
        let exchange = tokio::time::timeout(timeout, self.transport.send(request));

        let outcome = match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(PilosaError::Cancelled),
                outcome = exchange => outcome,
            },
            None => exchange.await,
        };

        outcome.map_err(|_| timeout_error(timeout))?
    }
}

impl Default for PilosaClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Classifies a response that arrived in full.
///
/// Non-2xx statuses go through [`classify_server_error`]; a 2xx response to
/// an operation that expects a body must carry one.
fn interpret_response(response: HttpResponse, expects_body: bool) -> Result<Option<Bytes>> {
    let status = response.status;
    if !status.is_success() {
        let body = String::from_utf8_lossy(&response.body);
        let err = classify_server_error(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            &body,
        );
        if err.kind() == ErrorKind::AlreadyExists {
            debug!("{}", err);
        } else {
            warn!("{}", err);
        }
        return Err(err);
    }

    if !expects_body {
        return Ok(None);
    }
    if response.body.is_empty() {
        return Err(PilosaError::Decode("empty response body".to_string()));
    }
    Ok(Some(response.body))
}

fn timeout_error(timeout: Duration) -> PilosaError {
    PilosaError::Timeout(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    to_vec(value)
        .map(Bytes::from)
        .map_err(|e| PilosaError::Validation(format!("Failed to encode request body: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hyper::StatusCode;
    use pilosa_common::wire;
    use prost::Message;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Transport that records requests and replays one canned response.
    struct SpyTransport {
        calls: AtomicUsize,
        requests: Mutex<Vec<HttpRequest>>,
        status: StatusCode,
        body: Bytes,
        delay: Option<Duration>,
        fail: bool,
    }

    impl SpyTransport {
        fn respond(status: StatusCode, body: impl Into<Bytes>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                status,
                body: body.into(),
                delay: None,
                fail: false,
            })
        }

        fn ok() -> Arc<Self> {
            Self::respond(StatusCode::OK, Bytes::new())
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                status: StatusCode::OK,
                body: Bytes::new(),
                delay: Some(delay),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                requests: Mutex::new(Vec::new()),
                status: StatusCode::OK,
                body: Bytes::new(),
                delay: None,
                fail: true,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.url.clone())
                .collect()
        }

        fn last_request(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Transport for SpyTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().unwrap().push(request);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(PilosaError::Transport("connection refused".to_string()));
            }
            Ok(HttpResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn host(port: u16) -> Uri {
        Uri::from_host_port("localhost", port).unwrap()
    }

    fn client_with(transport: Arc<SpyTransport>, hosts: Vec<Uri>) -> PilosaClient {
        PilosaClient::with_transport(
            Cluster::with_hosts(hosts),
            ClientConfig::default(),
            transport,
        )
    }

    fn db() -> Database {
        Database::new("sample-db").unwrap()
    }

    #[tokio::test]
    async fn test_empty_cluster_query_makes_no_calls() {
        let spy = SpyTransport::ok();
        let client = client_with(spy.clone(), vec![]);

        let err = client.query(&db(), "Bitmap(id=1)").await.unwrap_err();
        assert!(matches!(err, PilosaError::EmptyCluster));
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_cluster_admin_and_schema() {
        let spy = SpyTransport::ok();
        let client = client_with(spy.clone(), vec![]);

        assert_eq!(
            client.create_database(&db()).await.unwrap_err().kind(),
            ErrorKind::EmptyCluster
        );
        assert_eq!(
            client.schema().await.unwrap_err().kind(),
            ErrorKind::EmptyCluster
        );
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn test_requests_rotate_across_hosts() {
        let spy = SpyTransport::ok();
        let client = client_with(spy.clone(), vec![host(1), host(2), host(3)]);

        for _ in 0..4 {
            client.create_database(&db()).await.unwrap();
        }

        assert_eq!(
            spy.urls(),
            vec![
                "http://localhost:1/db",
                "http://localhost:2/db",
                "http://localhost:3/db",
                "http://localhost:1/db",
            ]
        );
    }

    #[tokio::test]
    async fn test_clones_share_rotation() {
        let spy = SpyTransport::ok();
        let client = client_with(spy.clone(), vec![host(1), host(2)]);
        let scoped = client.with_timeout(Duration::from_secs(1));

        client.delete_database(&db()).await.unwrap();
        scoped.delete_database(&db()).await.unwrap();

        assert_eq!(
            spy.urls(),
            vec!["http://localhost:1/db", "http://localhost:2/db"]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_split_evenly() {
        const CALLERS: usize = 60;
        let spy = SpyTransport::ok();
        let client = client_with(spy.clone(), vec![host(1), host(2), host(3)]);

        let tasks: Vec<_> = (0..CALLERS)
            .map(|_| {
                let client = client.clone();
                tokio::spawn(async move { client.create_database(&db()).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let urls = spy.urls();
        assert_eq!(urls.len(), CALLERS);
        for port in 1..=3 {
            let expected = format!("http://localhost:{}/db", port);
            let hits = urls.iter().filter(|url| **url == expected).count();
            assert_eq!(hits, CALLERS / 3, "uneven share for {}", expected);
        }
    }

    #[test]
    fn test_timeout_error_saturates() {
        assert!(matches!(
            timeout_error(Duration::from_millis(250)),
            PilosaError::Timeout(250)
        ));
        assert!(matches!(timeout_error(Duration::MAX), PilosaError::Timeout(u64::MAX)));
    }

    #[tokio::test]
    async fn test_admin_requests_use_json() {
        let spy = SpyTransport::ok();
        let client = client_with(spy.clone(), vec![host(1)]);
        let frame = db().frame_with_row_label("stargazer", "repo").unwrap();

        client.create_frame(&frame).await.unwrap();
        let request = spy.last_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.codec, Codec::Json);
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"db": "sample-db", "frame": "stargazer", "options": {"rowLabel": "repo"}})
        );

        client.delete_frame(&frame).await.unwrap();
        assert_eq!(spy.last_request().method, Method::DELETE);
    }

    #[tokio::test]
    async fn test_query_uses_protobuf() {
        let response = wire::QueryResponse {
            results: vec![wire::QueryResult {
                n: 3,
                ..Default::default()
            }],
            ..Default::default()
        };
        let spy = SpyTransport::respond(StatusCode::OK, response.encode_to_vec());
        let client = client_with(spy.clone(), vec![host(1)]);

        let options = QueryOptions::default().with_profiles(true);
        let result = client
            .query_with_options(&db(), "Count(Bitmap(id=1))", &options)
            .await
            .unwrap();
        assert_eq!(result.result().unwrap().count, 3);

        let request = spy.last_request();
        assert_eq!(request.url, "http://localhost:1/query");
        assert_eq!(request.codec, Codec::Protobuf);
        let sent = wire::QueryRequest::decode(request.body.as_ref()).unwrap();
        assert_eq!(sent.db, "sample-db");
        assert_eq!(sent.query, "Count(Bitmap(id=1))");
        assert!(sent.profiles);
    }

    #[tokio::test]
    async fn test_database_already_exists() {
        let spy = SpyTransport::respond(StatusCode::CONFLICT, "database already exists\n");
        let client = client_with(spy, vec![host(1)]);

        let err = client.create_database(&db()).await.unwrap_err();
        assert!(err.is_already_exists(Resource::Database));
        client.ensure_database_exists(&db()).await.unwrap();
    }

    #[tokio::test]
    async fn test_frame_already_exists_is_not_database() {
        let spy = SpyTransport::respond(StatusCode::CONFLICT, "frame already exists\n");
        let client = client_with(spy, vec![host(1)]);
        let frame = db().frame("stargazer").unwrap();

        let err = client.create_frame(&frame).await.unwrap_err();
        assert!(err.is_already_exists(Resource::Frame));
        client.ensure_frame_exists(&frame).await.unwrap();

        // The database helper must not swallow a frame duplicate.
        let err = client.ensure_database_exists(&db()).await.unwrap_err();
        assert!(err.is_already_exists(Resource::Frame));
    }

    #[tokio::test]
    async fn test_server_error_carries_status_and_body() {
        let spy = SpyTransport::respond(StatusCode::BAD_REQUEST, "invalid frame name\n");
        let client = client_with(spy, vec![host(1)]);

        match client.create_database(&db()).await.unwrap_err() {
            PilosaError::Server {
                status,
                status_text,
                body,
            } => {
                assert_eq!(status, 400);
                assert_eq!(status_text, "Bad Request");
                assert_eq!(body, "invalid frame name\n");
            }
            other => panic!("Expected server error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_wins_over_decode() {
        let spy = SpyTransport::respond(StatusCode::INTERNAL_SERVER_ERROR, "garbage");
        let client = client_with(spy, vec![host(1)]);

        let err = client.query(&db(), "Bitmap(id=1)").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Server);
    }

    #[tokio::test]
    async fn test_query_empty_body_is_decode_error() {
        let spy = SpyTransport::respond(StatusCode::OK, Bytes::new());
        let client = client_with(spy, vec![host(1)]);

        let err = client.query(&db(), "Bitmap(id=1)").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_query_truncated_body_is_decode_error() {
        let spy = SpyTransport::respond(StatusCode::OK, vec![0x12u8, 0x05, 0x08]);
        let client = client_with(spy, vec![host(1)]);

        let err = client.query(&db(), "Bitmap(id=1)").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_admin_ignores_response_body() {
        let spy = SpyTransport::respond(StatusCode::OK, "{}");
        let client = client_with(spy, vec![host(1)]);
        client.create_database(&db()).await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let spy = SpyTransport::failing();
        let client = client_with(spy, vec![host(1)]);

        let err = client.schema().await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_timeout_is_transport_error() {
        let spy = SpyTransport::slow(Duration::from_secs(5));
        let client = client_with(spy, vec![host(1)]).with_timeout(Duration::from_millis(20));

        let err = client.create_database(&db()).await.unwrap_err();
        assert!(matches!(err, PilosaError::Timeout(20)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_cancelled_before_call_makes_no_calls() {
        let spy = SpyTransport::ok();
        let token = CancellationToken::new();
        token.cancel();
        let client = client_with(spy.clone(), vec![host(1)]).with_cancellation(token);

        let err = client.create_database(&db()).await.unwrap_err();
        assert!(matches!(err, PilosaError::Cancelled));
        assert_eq!(spy.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancel_during_exchange() {
        let spy = SpyTransport::slow(Duration::from_secs(5));
        let token = CancellationToken::new();
        let client = client_with(spy, vec![host(1)]).with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let err = client.schema().await.unwrap_err();
        assert!(matches!(err, PilosaError::Cancelled));
        assert!(err.is_transport());
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn test_host_management() {
        let spy = SpyTransport::ok();
        let client = client_with(spy.clone(), vec![host(1), host(2)]);

        client.add_host(host(3)).await;
        assert_eq!(client.hosts().await, vec![host(1), host(2), host(3)]);

        client.create_database(&db()).await.unwrap();
        assert!(client.remove_host(&host(2)).await);
        assert!(!client.remove_host(&host(2)).await);
        client.create_database(&db()).await.unwrap();

        assert_eq!(
            spy.urls(),
            vec!["http://localhost:1/db", "http://localhost:3/db"]
        );
    }

    #[tokio::test]
    async fn test_client_default_address() {
        let client = PilosaClient::new();
        assert_eq!(client.hosts().await, vec![Uri::default()]);
    }
}
