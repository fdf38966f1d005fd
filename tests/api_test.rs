use mini_query_engine::auth::Credentials;
use mini_query_engine::catalog::Catalog;
use mini_query_engine::config::ServerConfig;
use mini_query_engine::server::Server;
use mini_query_engine::service::QueryService;
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Start a server on an ephemeral port and return its address.
async fn start_server(config: ServerConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = QueryService::new(Arc::new(Catalog::builtin()), config.credentials.clone());
    let server = Server::new(service, &config);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

async fn send_raw(addr: SocketAddr, raw: &str) -> (u16, String, String) {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();

    let (head, body) = response.split_once("\r\n\r\n").unwrap();
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse().ok())
        .unwrap();
    (status, head.to_string(), body.to_string())
}

async fn post(
    addr: SocketAddr,
    path: &str,
    query: &str,
    creds: Option<&Credentials>,
) -> (u16, Value) {
    let body = serde_json::json!({ "query": query }).to_string();
    let mut raw = format!(
        "POST {} HTTP/1.1\r\nHost: localhost\r\n\
         Content-Type: application/json\r\nContent-Length: {}\r\n",
        path,
        body.len()
    );
    if let Some(creds) = creds {
        raw.push_str(&format!("Authorization: {}\r\n", creds.to_authorization_header()));
    }
    raw.push_str("\r\n");
    raw.push_str(&body);

    let (status, _, body) = send_raw(addr, &raw).await;
    (status, serde_json::from_str(&body).unwrap())
}

#[tokio::test]
async fn test_health_without_credentials() {
    let addr = start_server(ServerConfig::default()).await;
    let (status, _, body) = send_raw(addr, "GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n").await;
    assert_eq!(status, 200);
    assert_eq!(body, r#"{"status":"healthy"}"#);
}

#[tokio::test]
async fn test_query_returns_translation_and_rows() {
    let addr = start_server(ServerConfig::default()).await;
    let creds = Credentials::default();

    let (status, body) = post(addr, "/query", "Show me total sales", Some(&creds)).await;
    assert_eq!(status, 200);
    assert_eq!(body["original_query"], "Show me total sales");
    assert_eq!(body["translated_sql"], "SELECT SUM(amount) FROM sales");
    assert_eq!(body["results"][0]["region"], "North");
    assert_eq!(body["results"][1]["amount"], 1500);

    let (status, body) = post(addr, "/query", "customer count", Some(&creds)).await;
    assert_eq!(status, 200);
    assert_eq!(body["translated_sql"], "SELECT COUNT(*) FROM customers");
    assert_eq!(body["results"][1]["email"], "jane@example.com");
}

#[tokio::test]
async fn test_explain_endpoint() {
    let addr = start_server(ServerConfig::default()).await;
    let creds = Credentials::default();
    let (status, body) = post(addr, "/explain", "SALES BY REGION", Some(&creds)).await;
    assert_eq!(status, 200);
    assert_eq!(body["breakdown"]["detected_table"], "sales");
    assert_eq!(body["breakdown"]["query_type"], "aggregation");
    assert_eq!(
        body["breakdown"]["columns"],
        serde_json::json!(["date", "amount", "region", "product"])
    );
    assert_eq!(
        body["translated_sql"],
        "SELECT region, SUM(amount) FROM sales GROUP BY region"
    );
}

#[tokio::test]
async fn test_validate_endpoint() {
    let addr = start_server(ServerConfig::default()).await;
    let creds = Credentials::default();

    let (_, body) = post(addr, "/validate", "", Some(&creds)).await;
    assert_eq!(body["is_valid"], false);
    assert_eq!(body["message"], "Query cannot be empty");

    let (_, body) = post(addr, "/validate", "xyz abc", Some(&creds)).await;
    assert_eq!(body["is_valid"], false);
    assert_eq!(body["message"], "No valid table reference found");

    let (status, body) = post(addr, "/validate", "sales report", Some(&creds)).await;
    assert_eq!(status, 200);
    assert_eq!(body["query"], "sales report");
    assert_eq!(body["is_valid"], true);
}

#[tokio::test]
async fn test_protected_endpoints_reject_bad_credentials() {
    let addr = start_server(ServerConfig::default()).await;
    let wrong = Credentials::new("admin", "wrong");

    for path in ["/query", "/explain", "/validate"] {
        let (status, body) = post(addr, path, "sales", Some(&wrong)).await;
        assert_eq!(status, 401, "{}", path);
        assert_eq!(body["detail"], "Invalid credentials");

        let (status, _) = post(addr, path, "sales", None).await;
        assert_eq!(status, 401, "{}", path);
    }
}

#[tokio::test]
async fn test_configured_credentials_replace_defaults() {
    let config = ServerConfig {
        credentials: Credentials::new("ops", "hunter2"),
        ..ServerConfig::default()
    };
    let addr = start_server(config).await;

    let (status, _) = post(addr, "/query", "sales", Some(&Credentials::default())).await;
    assert_eq!(status, 401);
    let ops = Credentials::new("ops", "hunter2");
    let (status, _) = post(addr, "/query", "sales", Some(&ops)).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_unknown_route() {
    let addr = start_server(ServerConfig::default()).await;
    let (status, _, body) = send_raw(addr, "GET /tables HTTP/1.1\r\n\r\n").await;
    assert_eq!(status, 404);
    assert_eq!(body, r#"{"detail":"Not Found"}"#);
}

#[tokio::test]
async fn test_incomplete_request_times_out() {
    let config = ServerConfig {
        read_timeout: Duration::from_millis(200),
        ..ServerConfig::default()
    };
    let addr = start_server(config).await;

    let mut stream = TcpStream::connect(addr).await.unwrap();
    // Headers promise a body that never arrives.
    stream
        .write_all(b"POST /query HTTP/1.1\r\nContent-Length: 50\r\n\r\n{")
        .await
        .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 408 Request Timeout\r\n"));
}

#[tokio::test]
async fn test_oversized_request_is_rejected() {
    let config = ServerConfig {
        max_request_bytes: 64,
        ..ServerConfig::default()
    };
    let addr = start_server(config).await;
    let (status, _, _) = send_raw(
        addr,
        "POST /query HTTP/1.1\r\nContent-Length: 1000\r\n\r\n{\"query\": \"sales\"}",
    )
    .await;
    assert_eq!(status, 413);
}

#[tokio::test]
async fn test_oversized_body_still_gets_response() {
    let config = ServerConfig {
        max_request_bytes: 1024,
        ..ServerConfig::default()
    };
    let addr = start_server(config).await;

    // Far more than one read chunk, so most of it is still unread when the
    // server answers.
    let body = "x".repeat(64 * 1024);
    let raw = format!("POST /query HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}", body.len(), body);
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();

    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    assert!(response.starts_with("HTTP/1.1 413 Payload Too Large\r\n"));
    assert!(response.ends_with(r#"{"detail":"Payload Too Large"}"#));
}
