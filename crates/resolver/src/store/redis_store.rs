//! Redis-backed domain store
//!
//! Uses a `ConnectionManager`: one multiplexed connection shared by every
//! request, reconnecting in the background after failures. The connection is
//! established lazily so the service can boot while Redis is still down; until
//! then lookups fail with `StoreError::Unreachable` and readiness reports 503.
//!
//! Connecting and every command are bounded by [`RedisTimeouts`]. A Redis that
//! accepts connections but never answers is reported as unreachable instead of
//! stalling the request.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client, ConnectionInfo, RedisError, RedisResult};
use tokio::sync::OnceCell;

use super::{DomainStore, StoreError};

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 2;
const DEFAULT_RESPONSE_TIMEOUT_SECS: u64 = 2;

/// Upper bounds for talking to Redis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedisTimeouts {
    /// Establishing the connection, including the handshake
    pub connect: Duration,
    /// A single command round trip
    pub response: Duration,
}

impl Default for RedisTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            response: Duration::from_secs(DEFAULT_RESPONSE_TIMEOUT_SECS),
        }
    }
}

impl RedisTimeouts {
    /// Worst case for one lookup on a cold connection
    pub fn total(&self) -> Duration {
        self.connect + self.response
    }
}

pub struct RedisDomainStore {
    client: Client,
    timeouts: RedisTimeouts,
    connection: OnceCell<ConnectionManager>,
    closed: AtomicBool,
}

impl RedisDomainStore {
    /// Create a store for the given connection info. Does not connect.
    pub fn open(info: ConnectionInfo, timeouts: RedisTimeouts) -> Result<Self, StoreError> {
        let client = Client::open(info).map_err(StoreError::from)?;
        Ok(Self {
            client,
            timeouts,
            connection: OnceCell::new(),
            closed: AtomicBool::new(false),
        })
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Closed);
        }

        // No retries: a failed connect is reported to the caller right away and
        // the next call tries again.
        let manager = self
            .connection
            .get_or_try_init(|| async {
                let config = ConnectionManagerConfig::new()
                    .set_number_of_retries(0)
                    .set_connection_timeout(self.timeouts.connect)
                    .set_response_timeout(self.timeouts.response);
                let connect = self.client.get_connection_manager_with_config(config);

                match tokio::time::timeout(self.timeouts.connect, connect).await {
                    Ok(result) => result.map_err(StoreError::from),
                    Err(_) => Err(StoreError::Unreachable(format!(
                        "connect timed out after {:?}",
                        self.timeouts.connect
                    ))),
                }
            })
            .await?;

        Ok(manager.clone())
    }

    async fn bounded<T>(&self, command: impl Future<Output = RedisResult<T>>) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeouts.response, command).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Unreachable(format!(
                "no response within {:?}",
                self.timeouts.response
            ))),
        }
    }
}

#[async_trait]
impl DomainStore for RedisDomainStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = self.bounded(conn.get(key)).await?;
        Ok(value)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let _: String = self
            .bounded(redis::cmd("PING").query_async(&mut conn))
            .await?;
        Ok(())
    }

    async fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            tracing::info!("Redis store closed");
        }
    }
}

impl From<RedisError> for StoreError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
        {
            StoreError::Unreachable(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}
