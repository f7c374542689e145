// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM integration.
//!
//! This module provides:
//! - Chain descriptors and the records passed to the SoDiamond contract
//! - Pooled RPC connections per endpoint
//! - Typed bindings for ERC-20, DEX routers and the SoDiamond
//! - Transaction signing, fee derivation and broadcasting

pub mod client;
pub mod diamond;
pub mod erc20;
pub mod gateway;
pub mod router;
pub mod signing;
pub mod transactions;
pub mod types;

pub use client::{rpc_registry, RpcConnector, RpcHandle, RpcRegistry};
pub use gateway::EvmGateway;
pub use transactions::TxSender;
pub use types::*;
