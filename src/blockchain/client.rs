// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RPC client handles and the connector pools use to dial them.

use alloy::{
    network::Ethereum,
    providers::{Provider, RootProvider},
};

use crate::error::SwapError;
use crate::pool::{Connector, EndpointRegistry};

/// Live RPC handle; the transport is picked from the URL scheme.
pub type RpcHandle = RootProvider<Ethereum>;

/// Registry of RPC pools keyed by endpoint URL.
pub type RpcRegistry = EndpointRegistry<RpcConnector>;

/// Dials one RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcConnector {
    url: String,
}

impl RpcConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Connector for RpcConnector {
    type Conn = RpcHandle;

    async fn connect(&self) -> Result<RpcHandle, SwapError> {
        let provider = RootProvider::<Ethereum>::connect(&self.url)
            .await
            .map_err(|e| SwapError::Connection(format!("dial {}: {e}", self.url)))?;

        // HTTP transports connect lazily; make sure the node actually answers.
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| SwapError::Connection(format!("dial {}: {e}", self.url)))?;

        tracing::debug!(endpoint = %self.url, chain_id, "RPC connection established");
        Ok(provider)
    }
}

/// Registry whose pools dial RPC endpoints.
pub fn rpc_registry(capacity: usize) -> RpcRegistry {
    EndpointRegistry::with_capacity(capacity, |url| RpcConnector::new(url))
}
