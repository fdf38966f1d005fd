//! TCP server
//!
//! Plain tokio accept loop, one task per connection. A connection carries a
//! single request: read until the headers and the `Content-Length` body are
//! in, route it, write the response and close.

use crate::config::ServerConfig;
use crate::error::Result;
use crate::http::{content_length, route, HttpRequest, HttpResponse};
use crate::service::QueryService;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Upper bound on bytes discarded after rejecting a request.
const DRAIN_LIMIT: usize = 1 << 20;

enum ReadOutcome {
    Complete(Vec<u8>),
    TooLarge,
    TimedOut,
    Closed,
}

#[derive(Debug, Clone)]
pub struct Server {
    service: Arc<QueryService>,
    read_timeout: Duration,
    max_request_bytes: usize,
}

impl Server {
    pub fn new(service: QueryService, config: &ServerConfig) -> Self {
        Self {
            service: Arc::new(service),
            read_timeout: config.read_timeout,
            max_request_bytes: config.max_request_bytes,
        }
    }

    /// Accept connections until the listener fails.
    pub async fn run(self, listener: TcpListener) -> Result<()> {
        let server = Arc::new(self);
        if let Ok(addr) = listener.local_addr() {
            info!("Server listening on {}", addr);
        }

        loop {
            let (stream, addr) = listener.accept().await?;
            let server = server.clone();
            let span = info_span!("request", id = %Uuid::new_v4(), peer = %addr);
            tokio::spawn(
                async move {
                    if let Err(e) = server.handle_connection(stream).await {
                        error!("Connection error: {}", e);
                    }
                }
                .instrument(span),
            );
        }
    }

    async fn handle_connection(&self, mut stream: TcpStream) -> Result<()> {
        let outcome = self.read_request(&mut stream).await?;
        let unread_input = matches!(outcome, ReadOutcome::TooLarge);
        let response = match outcome {
            ReadOutcome::Complete(bytes) => {
                let raw = String::from_utf8_lossy(&bytes);
                match HttpRequest::parse(&raw) {
                    Ok(request) => {
                        debug!("{} {}", request.method, request.path);
                        let response = route(&self.service, &request);
                        info!("{} {} -> {}", request.method, request.path, response.status);
                        response
                    }
                    Err(e) => HttpResponse::detail(400, &e.to_string()),
                }
            }
            ReadOutcome::TooLarge => {
                warn!("Request exceeded {} bytes", self.max_request_bytes);
                HttpResponse::detail(413, "Payload Too Large")
            }
            ReadOutcome::TimedOut => {
                warn!("Request read timeout");
                HttpResponse::detail(408, "Request timeout")
            }
            ReadOutcome::Closed => return Ok(()),
        };

        stream.write_all(&response.to_bytes()).await?;
        stream.flush().await?;
        stream.shutdown().await?;

        // Closing with unread input makes the kernel reset the connection,
        // which can discard the response before the client reads it.
        if unread_input {
            self.drain(&mut stream).await;
        }
        Ok(())
    }

    async fn drain(&self, stream: &mut TcpStream) {
        let mut chunk = [0u8; 8192];
        let mut discarded = 0;
        let _ = timeout(self.read_timeout, async {
            while discarded < DRAIN_LIMIT {
                match stream.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => discarded += n,
                }
            }
        })
        .await;
        debug!("Discarded {} unread bytes", discarded);
    }

    async fn read_request(&self, stream: &mut TcpStream) -> Result<ReadOutcome> {
        match timeout(self.read_timeout, self.read_until_complete(stream)).await {
            Ok(outcome) => Ok(outcome?),
            Err(_) => Ok(ReadOutcome::TimedOut),
        }
    }

    async fn read_until_complete(&self, stream: &mut TcpStream) -> std::io::Result<ReadOutcome> {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 8192];

        loop {
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                // Peer closed; whatever arrived is all there is.
                return Ok(if buffer.is_empty() {
                    ReadOutcome::Closed
                } else {
                    ReadOutcome::Complete(buffer)
                });
            }
            buffer.extend_from_slice(&chunk[..n]);

            if buffer.len() > self.max_request_bytes {
                return Ok(ReadOutcome::TooLarge);
            }
            if let Some(headers_end) = find_headers_end(&buffer) {
                let body_len = content_length(&String::from_utf8_lossy(&buffer[..headers_end]));
                let request_len = headers_end + 4 + body_len.unwrap_or(0);
                if request_len > self.max_request_bytes {
                    return Ok(ReadOutcome::TooLarge);
                }
                if buffer.len() >= request_len {
                    return Ok(ReadOutcome::Complete(buffer));
                }
            }
        }
    }
}

fn find_headers_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(4).position(|w| w == b"\r\n\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_headers_end() {
        assert_eq!(find_headers_end(b"GET / HTTP/1.1\r\n\r\n"), Some(14));
        assert_eq!(find_headers_end(b"GET / HTTP/1.1\r\nHost: x\r\n"), None);
    }
}
