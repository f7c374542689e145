// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Error type shared by the pool, the contract adapters and the swap flow.

use alloy::{
    primitives::TxHash,
    transports::{RpcError, TransportErrorKind},
};

/// JSON-RPC error code geth (and most forks) use for rejected calls.
const SERVER_ERROR_CODE: i64 = -32000;

/// Message prefix of geth's `ErrInsufficientFunds`.
const INSUFFICIENT_FUNDS_PREFIX: &str = "insufficient funds";

/// Errors that can occur while quoting or executing a swap.
#[derive(Debug, thiserror::Error)]
pub enum SwapError {
    /// Dial failed or the transport broke mid-call. The handle is discarded.
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Estimation failed in {method}: {reason}")]
    Estimation { method: &'static str, reason: String },

    /// Gas estimation failed only because the sender cannot cover it.
    #[error("Gas estimation failed for lack of funds: {0}")]
    InsufficientFundsEstimation(String),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Transaction {0} reverted on-chain")]
    ConfirmationFailure(TxHash),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported chain: {0}")]
    UnsupportedChain(String),

    #[error("Unsupported token: {0}")]
    UnsupportedToken(String),

    #[error("Unsupported route: {0}")]
    UnsupportedRoute(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("Swap cancelled")]
    Cancelled,
}

impl SwapError {
    /// Whether the handle used for the failing call must be thrown away.
    pub fn is_connection(&self) -> bool {
        matches!(self, SwapError::Connection(_))
    }

    /// Classify an RPC failure raised by a read call or an estimate.
    pub fn from_rpc(method: &'static str, err: RpcError<TransportErrorKind>) -> Self {
        match err {
            RpcError::Transport(kind) => SwapError::Connection(format!("{method}: {kind}")),
            RpcError::SerError(e) => SwapError::Encoding(format!("{method}: {e}")),
            RpcError::ErrorResp(payload)
                if payload.code == SERVER_ERROR_CODE
                    && payload
                        .message
                        .to_ascii_lowercase()
                        .starts_with(INSUFFICIENT_FUNDS_PREFIX) =>
            {
                SwapError::InsufficientFundsEstimation(format!("{method}: {}", payload.message))
            }
            other => SwapError::Estimation {
                method,
                reason: other.to_string(),
            },
        }
    }

    /// Classify a failed `eth_sendRawTransaction`. A node rejection stays a
    /// submission failure; a broken transport must retire the handle.
    pub fn from_broadcast(err: RpcError<TransportErrorKind>) -> Self {
        match err {
            RpcError::Transport(kind) => {
                SwapError::Connection(format!("sendRawTransaction: {kind}"))
            }
            other => SwapError::Submission(format!("broadcast failed: {other}")),
        }
    }

    /// Classify a failure raised by an `alloy::sol!` contract binding.
    pub fn from_contract(method: &'static str, err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::TransportError(e) => Self::from_rpc(method, e),
            alloy::contract::Error::AbiError(e) => SwapError::Encoding(format!("{method}: {e}")),
            alloy::contract::Error::UnknownFunction(name) => {
                SwapError::Encoding(format!("{method}: unknown function {name}"))
            }
            other => SwapError::Estimation {
                method,
                reason: other.to_string(),
            },
        }
    }
}
