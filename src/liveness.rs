//! Startup liveness check against the Redis-protocol dependency.
//!
//! The service only requires the dependency to answer a `PING` once before
//! serving. Connection strings are either `host:port` or
//! `redis://host[:port]`; the port defaults to 6379.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};
use url::Url;

const DEFAULT_REDIS_PORT: u16 = 6379;
const PING_COMMAND: &[u8] = b"*1\r\n$4\r\nPING\r\n";

#[derive(Debug, thiserror::Error)]
pub enum LivenessError {
    #[error("invalid connection string \"{0}\"")]
    InvalidConnectionString(String),

    #[error("could not connect to {address}: {source}")]
    Connect {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error talking to {address}: {source}")]
    Io {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{address} did not answer within {timeout:?}")]
    Timeout { address: String, timeout: Duration },

    #[error("{address} replied with an error: {reply}")]
    ErrorReply { address: String, reply: String },

    #[error("{address} sent an unexpected reply: \"{reply}\"")]
    UnexpectedReply { address: String, reply: String },
}

/// One-shot `PING` probe for the liveness dependency.
#[derive(Debug, Clone)]
pub struct LivenessCheck {
    address: String,
    timeout: Duration,
}

impl LivenessCheck {
    pub fn new(connection_string: &str, timeout: Duration) -> Result<Self, LivenessError> {
        Ok(Self {
            address: parse_address(connection_string)?,
            timeout,
        })
    }

    /// Resolved `host:port` the probe connects to.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Connects, sends `PING` and expects `+PONG`.
    pub async fn ping(&self) -> Result<(), LivenessError> {
        debug!("Pinging liveness dependency at {}", self.address);
        match timeout(self.timeout, self.exchange()).await {
            Ok(result) => result,
            Err(_) => Err(LivenessError::Timeout {
                address: self.address.clone(),
                timeout: self.timeout,
            }),
        }
    }

    async fn exchange(&self) -> Result<(), LivenessError> {
        let mut stream =
            TcpStream::connect(&self.address)
                .await
                .map_err(|source| LivenessError::Connect {
                    address: self.address.clone(),
                    source,
                })?;

        let io_err = |source| LivenessError::Io {
            address: self.address.clone(),
            source,
        };

        stream.write_all(PING_COMMAND).await.map_err(io_err)?;
        stream.flush().await.map_err(io_err)?;

        let mut reply = String::new();
        BufReader::new(&mut stream)
            .read_line(&mut reply)
            .await
            .map_err(io_err)?;
        let reply = reply.trim_end().to_string();

        if reply == "+PONG" {
            info!("Liveness dependency at {} is reachable", self.address);
            Ok(())
        } else if let Some(message) = reply.strip_prefix('-') {
            Err(LivenessError::ErrorReply {
                address: self.address.clone(),
                reply: message.to_string(),
            })
        } else {
            Err(LivenessError::UnexpectedReply {
                address: self.address.clone(),
                reply,
            })
        }
    }
}

/// Normalizes a connection string into `host:port`.
fn parse_address(connection_string: &str) -> Result<String, LivenessError> {
    let raw = connection_string.trim();
    let invalid = || LivenessError::InvalidConnectionString(connection_string.to_string());

    if raw.is_empty() {
        return Err(invalid());
    }

    if raw.contains("://") {
        let url = Url::parse(raw).map_err(|_| invalid())?;
        if url.scheme() != "redis" {
            return Err(invalid());
        }
        let host = url.host_str().filter(|h| !h.is_empty()).ok_or_else(invalid)?;
        let port = url.port().unwrap_or(DEFAULT_REDIS_PORT);
        return Ok(format!("{host}:{port}"));
    }

    // Bracketed IPv6 literals carry their own port separator.
    let has_port = match raw.rfind(']') {
        Some(bracket) => raw[bracket..].contains(':'),
        None => raw.contains(':'),
    };
    if has_port {
        Ok(raw.to_string())
    } else {
        Ok(format!("{raw}:{DEFAULT_REDIS_PORT}"))
    }
}
