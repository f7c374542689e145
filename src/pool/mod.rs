// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Connection Pool
//!
//! Bounded pool of live RPC handles for a single endpoint.
//!
//! At most `capacity` handles exist at any instant (in use + idle). A handle
//! is borrowed for the duration of one call through a [`PooledConnection`]
//! guard; dropping the guard returns the handle to the idle set, unless the
//! call failed at the connection level, in which case the handle is closed
//! and a fresh one is dialed lazily on a later acquire.

pub mod registry;

use std::collections::VecDeque;
use std::future::Future;
use std::ops::Deref;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use tokio::sync::{Semaphore, SemaphorePermit};

use crate::error::SwapError;

pub use registry::{EndpointRegistry, DEFAULT_POOL_CAPACITY};

/// Future returned by the closure passed to [`ConnectionPool::with_connection`].
pub type ConnFuture<'c, T> = Pin<Box<dyn Future<Output = Result<T, SwapError>> + Send + 'c>>;

/// Factory that dials a new handle for a pool.
pub trait Connector: Send + Sync + 'static {
    type Conn: Send + Sync + 'static;

    /// Dial the endpoint. A failure surfaces as [`SwapError::Connection`].
    fn connect(&self) -> impl Future<Output = Result<Self::Conn, SwapError>> + Send;
}

/// Bounded connection pool for one endpoint.
pub struct ConnectionPool<K: Connector> {
    connector: K,
    capacity: usize,
    /// One permit per handle that may be in use. Guards create-vs-wait.
    permits: Semaphore,
    idle: Mutex<VecDeque<K::Conn>>,
    in_use: AtomicUsize,
    created: AtomicU64,
}

impl<K: Connector> ConnectionPool<K> {
    /// Create a pool that keeps at most `capacity` handles alive.
    pub fn new(capacity: usize, connector: K) -> Self {
        let capacity = capacity.max(1);
        Self {
            connector,
            capacity,
            permits: Semaphore::new(capacity),
            idle: Mutex::new(VecDeque::with_capacity(capacity)),
            in_use: AtomicUsize::new(0),
            created: AtomicU64::new(0),
        }
    }

    /// Borrow a handle, dialing a new one if none is idle and the pool is
    /// below capacity. Waits for a release when the pool is exhausted.
    pub async fn acquire(&self) -> Result<PooledConnection<'_, K>, SwapError> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| SwapError::Connection("connection pool closed".to_string()))?;

        let conn = match self.pop_idle() {
            Some(conn) => conn,
            None => {
                // Holding a permit with an empty idle set means the new handle
                // cannot push the pool past capacity.
                let conn = self.connector.connect().await?;
                let total = self.created.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!(total_created = total, "Dialed new pooled connection");
                conn
            }
        };

        self.in_use.fetch_add(1, Ordering::AcqRel);
        Ok(PooledConnection {
            pool: self,
            conn: Some(conn),
            discard: false,
            _permit: permit,
        })
    }

    /// Run `f` with a borrowed handle and release it exactly once afterwards.
    ///
    /// When `f` fails with a connection-level error the handle is closed
    /// instead of being returned. The result of `f` is passed through as is;
    /// nothing is retried here.
    pub async fn with_connection<T, F>(&self, f: F) -> Result<T, SwapError>
    where
        F: for<'c> FnOnce(&'c K::Conn) -> ConnFuture<'c, T>,
    {
        let mut conn = self.acquire().await?;
        let result = f(&conn).await;
        if let Err(e) = &result {
            if e.is_connection() {
                conn.discard();
            }
        }
        result
    }

    /// Maximum number of live handles.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Handles currently borrowed.
    pub fn in_use(&self) -> usize {
        self.in_use.load(Ordering::Acquire)
    }

    /// Handles currently parked in the idle set.
    pub fn idle(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Total handles dialed over the pool's lifetime.
    pub fn created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }

    fn pop_idle(&self) -> Option<K::Conn> {
        self.idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    /// Park a handle, or close it if the idle set is already full.
    fn put_idle(&self, conn: K::Conn) {
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.capacity {
            idle.push_back(conn);
        } else {
            drop(idle);
            tracing::warn!("Idle set full, closing pooled connection");
            drop(conn);
        }
    }
}

/// A handle borrowed from a [`ConnectionPool`].
///
/// Released when dropped. The permit is declared last so it is only handed
/// back after the handle has been parked or closed.
pub struct PooledConnection<'p, K: Connector> {
    pool: &'p ConnectionPool<K>,
    conn: Option<K::Conn>,
    discard: bool,
    _permit: SemaphorePermit<'p>,
}

impl<K: Connector> PooledConnection<'_, K> {
    /// Close the handle on release instead of returning it to the pool.
    pub fn discard(&mut self) {
        self.discard = true;
    }
}

impl<K: Connector> Deref for PooledConnection<'_, K> {
    type Target = K::Conn;

    fn deref(&self) -> &K::Conn {
        // Only taken in `drop`.
        self.conn.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<K: Connector> Drop for PooledConnection<'_, K> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if self.discard || std::thread::panicking() {
                tracing::debug!("Closing pooled connection after failure");
                drop(conn);
            } else {
                self.pool.put_idle(conn);
            }
        }
        self.pool.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}
