//! Minimal HTTP/1.1 handling: request parsing, JSON responses and routing.

use crate::error::{QueryError, Result};
use crate::service::QueryService;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    /// Header names are lower-cased
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpRequest {
    pub fn parse(raw: &str) -> Result<Self> {
        let (head, body) = match raw.find("\r\n\r\n") {
            Some(idx) => (&raw[..idx], &raw[idx + 4..]),
            None => (raw, ""),
        };

        let mut lines = head.lines();
        let request_line = lines
            .next()
            .ok_or_else(|| QueryError::InvalidRequest("empty request".to_string()))?;
        let parts: Vec<&str> = request_line.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(QueryError::InvalidRequest(format!(
                "malformed request line '{}'",
                request_line
            )));
        }

        let mut headers = HashMap::new();
        for line in lines {
            if line.is_empty() {
                break;
            }
            if let Some((key, value)) = line.split_once(':') {
                headers.insert(key.trim().to_lowercase(), value.trim().to_string());
            }
        }

        Ok(Self {
            method: parts[0].to_uppercase(),
            path: normalize_path(parts[1]),
            headers,
            body: body.to_string(),
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(|s| s.as_str())
    }
}

/// Drop the query string and any trailing slash (root stays `/`).
fn normalize_path(target: &str) -> String {
    let path = target.split('?').next().unwrap_or("");
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Value of the `Content-Length` header in a raw request head, if any.
pub fn content_length(head: &str) -> Option<usize> {
    head.lines()
        .find(|line| line.to_lowercase().starts_with("content-length:"))
        .and_then(|line| line.split(':').nth(1))
        .and_then(|value| value.trim().parse().ok())
}

#[derive(Debug, Clone, Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn json<T: Serialize>(status: u16, body: &T) -> Self {
        match serde_json::to_string(body) {
            Ok(json) => Self {
                status,
                headers: Vec::new(),
                body: json,
            },
            Err(e) => {
                warn!("Failed to serialize response body: {}", e);
                Self::detail(500, "Internal Server Error")
            }
        }
    }

    pub fn detail(status: u16, message: &str) -> Self {
        Self::json(status, &ErrorBody { detail: message })
    }

    pub fn from_error(err: &QueryError) -> Self {
        let response = Self::detail(err.status(), &err.to_string());
        match err {
            QueryError::Unauthorized => response.with_header("WWW-Authenticate", "Basic"),
            _ => response,
        }
    }

    pub fn preflight() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: application/json\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n\
             Access-Control-Allow-Headers: Content-Type, Authorization\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n",
            self.status,
            status_text(self.status),
            self.body.len()
        );
        for (name, value) in &self.headers {
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        head.push_str("\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(self.body.as_bytes());
        bytes
    }
}

pub fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        413 => "Payload Too Large",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

fn respond<T: Serialize>(result: Result<T>) -> HttpResponse {
    match result {
        Ok(body) => HttpResponse::json(200, &body),
        Err(err) => {
            debug!("Request failed: {}", err);
            HttpResponse::from_error(&err)
        }
    }
}

pub fn route(service: &QueryService, request: &HttpRequest) -> HttpResponse {
    let auth = request.header("authorization");
    let body = request.body.as_str();

    match (request.method.as_str(), request.path.as_str()) {
        ("GET", "/health") => HttpResponse::json(200, &service.health()),
        ("POST", "/query") => respond(service.process_query(body, auth)),
        ("POST", "/explain") => respond(service.explain_query(body, auth)),
        ("POST", "/validate") => respond(service.validate_query(body, auth)),
        ("OPTIONS", _) => HttpResponse::preflight(),
        (_, "/health" | "/query" | "/explain" | "/validate") => {
            HttpResponse::detail(405, "Method Not Allowed")
        }
        _ => HttpResponse::detail(404, "Not Found"),
    }
}
