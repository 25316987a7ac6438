//! Connection management for the relational store.
//!
//! The process owns one logical handle to `PostgreSQL`. It is established at
//! boot, and when a transport error is observed on a query the handle is
//! replaced wholesale by a background reconnect task. Callers never cache the
//! pool across calls; they either see the old handle (whose operation fails
//! and surfaces [`StoreError::Unavailable`]) or the new one.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;
use thiserror::Error;
use tokio::{sync::RwLock, time::sleep};
use tracing::{error, info, warn};

pub mod users;

/// Delay between reconnect attempts.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// Upper bound on waiting for a connection from the pool, so a wedged
/// database cannot hold a request indefinitely.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure, retried by the reconnect loop. The in-flight
    /// operation is not retried; callers surface this as a transient failure.
    #[error("storage temporarily unavailable")]
    Unavailable,

    /// A unique constraint rejected the write (signup race backstop).
    #[error("duplicate unique key")]
    Duplicate,

    /// Any other database error.
    #[error(transparent)]
    Query(sqlx::Error),
}

#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>,
}

struct Inner {
    dsn: String,
    pool: RwLock<PgPool>,
    reconnecting: AtomicBool,
}

impl Store {
    /// Connect to the database, retrying every [`RETRY_DELAY`] until the
    /// store is reachable.
    pub async fn connect(dsn: &str) -> Self {
        let pool = loop {
            match Self::open_pool(dsn).await {
                Ok(pool) => {
                    info!("Connected to database");

                    break pool;
                }

                Err(e) => {
                    warn!("Failed to connect to database: {e}, retrying");

                    sleep(RETRY_DELAY).await;
                }
            }
        };

        Self {
            inner: Arc::new(Inner {
                dsn: dsn.to_string(),
                pool: RwLock::new(pool),
                reconnecting: AtomicBool::new(false),
            }),
        }
    }

    async fn open_pool(dsn: &str) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .test_before_acquire(true)
            .connect(dsn)
            .await
    }

    /// Current handle. Callers must not hold this across requests; a
    /// reconnect swaps the handle out from under stale clones.
    pub(crate) async fn pool(&self) -> PgPool {
        self.inner.pool.read().await.clone()
    }

    /// Classify a query error, scheduling a reconnect when the transport is
    /// gone. The failed operation itself is not retried.
    pub(crate) fn observe(&self, err: sqlx::Error) -> StoreError {
        if is_disconnect(&err) {
            error!("Lost database connection: {err}");

            self.schedule_reconnect();

            return StoreError::Unavailable;
        }

        if err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            return StoreError::Duplicate;
        }

        StoreError::Query(err)
    }

    /// Single-flight reconnect loop. Concurrent observers of the same outage
    /// trigger at most one task; the handle swap is atomic from the
    /// perspective of `pool()`.
    fn schedule_reconnect(&self) {
        if self.inner.reconnecting.swap(true, Ordering::SeqCst) {
            return;
        }

        let store = self.clone();

        tokio::spawn(async move {
            loop {
                sleep(RETRY_DELAY).await;

                match Self::open_pool(&store.inner.dsn).await {
                    Ok(pool) => {
                        *store.inner.pool.write().await = pool;
                        store.inner.reconnecting.store(false, Ordering::SeqCst);

                        info!("Reconnected to database");

                        break;
                    }

                    Err(e) => {
                        warn!("Reconnect attempt failed: {e}");
                    }
                }
            }
        });
    }
}

fn is_disconnect(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnect_classification() {
        assert!(is_disconnect(&sqlx::Error::PoolTimedOut));
        assert!(is_disconnect(&sqlx::Error::PoolClosed));
        assert!(is_disconnect(&sqlx::Error::WorkerCrashed));
        assert!(is_disconnect(&sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset"
        ))));
        assert!(!is_disconnect(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn test_store_error_display() {
        assert_eq!(
            StoreError::Unavailable.to_string(),
            "storage temporarily unavailable"
        );
        assert_eq!(StoreError::Duplicate.to_string(), "duplicate unique key");
    }
}
