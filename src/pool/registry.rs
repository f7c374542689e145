// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Endpoint registry: one [`ConnectionPool`] per RPC URL.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::{ConnectionPool, Connector};

/// Capacity given to every pool the registry creates.
pub const DEFAULT_POOL_CAPACITY: usize = 2;

type ConnectorFactory<K> = Box<dyn Fn(&str) -> K + Send + Sync>;

/// Lazily populated map from endpoint URL to its pool.
///
/// Built once at startup and passed by reference to whatever needs a pool.
pub struct EndpointRegistry<K: Connector> {
    capacity: usize,
    make_connector: ConnectorFactory<K>,
    pools: Mutex<HashMap<String, Arc<ConnectionPool<K>>>>,
}

impl<K: Connector> EndpointRegistry<K> {
    /// Create a registry whose pools dial through `make_connector(url)`.
    pub fn new(make_connector: impl Fn(&str) -> K + Send + Sync + 'static) -> Self {
        Self::with_capacity(DEFAULT_POOL_CAPACITY, make_connector)
    }

    pub fn with_capacity(
        capacity: usize,
        make_connector: impl Fn(&str) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            capacity,
            make_connector: Box::new(make_connector),
            pools: Mutex::new(HashMap::new()),
        }
    }

    /// Return the pool for `url`, creating it on first use.
    pub fn pool(&self, url: &str) -> Arc<ConnectionPool<K>> {
        let mut pools = self.pools.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pool) = pools.get(url) {
            return Arc::clone(pool);
        }

        tracing::debug!(endpoint = %url, capacity = self.capacity, "Creating connection pool");
        let pool = Arc::new(ConnectionPool::new(
            self.capacity,
            (self.make_connector)(url),
        ));
        pools.insert(url.to_string(), Arc::clone(&pool));
        pool
    }

    /// Number of distinct endpoints with a pool.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.pools.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
