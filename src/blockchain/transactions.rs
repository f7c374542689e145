// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction building and broadcasting.
//!
//! Every state-changing contract call goes through [`TxSender::send`]:
//! pending nonce, gas estimate, fee derivation (EIP-1559 or legacy),
//! local signing and broadcast.

use alloy::{
    eips::BlockNumberOrTag,
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, Bytes, TxHash, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
    transports::RpcError,
};

use super::client::RpcHandle;
use super::types::{TxReceipt, TxStatus};
use crate::error::SwapError;

/// Gas limit used when estimation failed only for lack of funds.
pub const FALLBACK_GAS_LIMIT: u64 = 1_000_000;

/// Priority fee used when the node cannot suggest one (1.5 gwei).
const DEFAULT_PRIORITY_FEE: u128 = 1_500_000_000;

/// Fee parameters for one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeParams {
    Eip1559 {
        max_fee_per_gas: u128,
        max_priority_fee_per_gas: u128,
    },
    Legacy {
        gas_price: u128,
    },
}

/// Pad a gas estimate by 10 %.
pub fn pad_gas_limit(estimate: u64) -> u64 {
    estimate.saturating_add(estimate / 10)
}

/// Scale a node-suggested price by 1.2.
fn bump_price(price: u128) -> u128 {
    price.saturating_mul(12) / 10
}

/// Max fee = 2 * base fee + tip, with the suggested tip bumped by 1.2.
pub fn eip1559_fees(base_fee: u128, suggested_tip: u128) -> FeeParams {
    let tip = bump_price(suggested_tip);
    FeeParams::Eip1559 {
        max_fee_per_gas: base_fee.saturating_mul(2).saturating_add(tip),
        max_priority_fee_per_gas: tip,
    }
}

pub fn legacy_fees(suggested_price: u128) -> FeeParams {
    FeeParams::Legacy {
        gas_price: bump_price(suggested_price),
    }
}

/// Signs and broadcasts transactions for one account.
#[derive(Clone)]
pub struct TxSender {
    wallet: EthereumWallet,
    from: Address,
}

impl TxSender {
    pub fn new(wallet: EthereumWallet, from: Address) -> Self {
        Self { wallet, from }
    }

    /// Account transactions are sent from.
    pub fn address(&self) -> Address {
        self.from
    }

    /// Build, sign and broadcast a call to `to`, returning its hash.
    pub async fn send(
        &self,
        conn: &RpcHandle,
        to: Address,
        input: Bytes,
        value: U256,
    ) -> Result<TxHash, SwapError> {
        let tx = self.prepare(conn, to, input, value).await?;
        let (nonce, gas_limit) = (tx.nonce, tx.gas);

        let envelope = tx
            .build(&self.wallet)
            .await
            .map_err(|e| SwapError::Submission(format!("signing failed: {e}")))?;

        let pending = conn
            .send_tx_envelope(envelope)
            .await
            .map_err(SwapError::from_broadcast)?;

        let tx_hash = *pending.tx_hash();
        tracing::info!(%tx_hash, %to, ?nonce, ?gas_limit, "Transaction broadcast");
        Ok(tx_hash)
    }

    /// Fill nonce, chain id, gas limit and fees for a call from this account.
    async fn prepare(
        &self,
        conn: &RpcHandle,
        to: Address,
        input: Bytes,
        value: U256,
    ) -> Result<TransactionRequest, SwapError> {
        let nonce = conn
            .get_transaction_count(self.from)
            .pending()
            .await
            .map_err(|e| SwapError::from_rpc("getTransactionCount", e))?;
        let chain_id = conn
            .get_chain_id()
            .await
            .map_err(|e| SwapError::from_rpc("chainId", e))?;

        let tx = TransactionRequest::default()
            .from(self.from)
            .to(to)
            .input(input.into())
            .value(value)
            .nonce(nonce)
            .with_chain_id(chain_id);

        let gas_limit = match conn.estimate_gas(tx.clone()).await {
            Ok(estimate) => pad_gas_limit(estimate),
            Err(e) => match SwapError::from_rpc("estimateGas", e) {
                SwapError::InsufficientFundsEstimation(reason) => {
                    tracing::warn!(
                        from = %self.from,
                        %reason,
                        fallback = FALLBACK_GAS_LIMIT,
                        "Gas estimation short of funds, using fallback gas limit"
                    );
                    FALLBACK_GAS_LIMIT
                }
                other => return Err(other),
            },
        };

        let tx = match fee_params(conn).await? {
            FeeParams::Eip1559 {
                max_fee_per_gas,
                max_priority_fee_per_gas,
            } => tx
                .max_fee_per_gas(max_fee_per_gas)
                .max_priority_fee_per_gas(max_priority_fee_per_gas),
            FeeParams::Legacy { gas_price } => tx.gas_price(gas_price),
        };
        Ok(tx.gas_limit(gas_limit))
    }
}

/// Derive fees from the latest block: EIP-1559 when it carries a base fee,
/// legacy gas price otherwise.
async fn fee_params(conn: &RpcHandle) -> Result<FeeParams, SwapError> {
    let block = conn
        .get_block_by_number(BlockNumberOrTag::Latest)
        .await
        .map_err(|e| SwapError::from_rpc("getBlockByNumber", e))?
        .ok_or_else(|| SwapError::Estimation {
            method: "getBlockByNumber",
            reason: "no latest block".to_string(),
        })?;

    match block.header.base_fee_per_gas {
        Some(base_fee) => {
            let tip = match conn.get_max_priority_fee_per_gas().await {
                Ok(tip) => tip,
                Err(e @ RpcError::Transport(_)) => {
                    return Err(SwapError::from_rpc("maxPriorityFeePerGas", e))
                }
                Err(e) => {
                    tracing::debug!(error = %e, "No suggested tip, using default");
                    DEFAULT_PRIORITY_FEE
                }
            };
            Ok(eip1559_fees(base_fee as u128, tip))
        }
        None => {
            let price = conn
                .get_gas_price()
                .await
                .map_err(|e| SwapError::from_rpc("gasPrice", e))?;
            Ok(legacy_fees(price))
        }
    }
}

/// Check whether `tx_hash` is still pending and, once mined, read its receipt.
pub async fn transaction_status(conn: &RpcHandle, tx_hash: TxHash) -> Result<TxStatus, SwapError> {
    let tx = conn
        .get_transaction_by_hash(tx_hash)
        .await
        .map_err(|e| SwapError::from_rpc("getTransactionByHash", e))?;

    if tx.as_ref().and_then(|t| t.block_number).is_none() {
        return Ok(TxStatus::Pending);
    }

    let receipt = conn
        .get_transaction_receipt(tx_hash)
        .await
        .map_err(|e| SwapError::from_rpc("getTransactionReceipt", e))?;

    Ok(match receipt {
        Some(r) => TxStatus::Mined(TxReceipt {
            tx_hash,
            block_number: r.block_number.unwrap_or(0),
            gas_used: r.gas_used,
            success: r.status(),
        }),
        None => TxStatus::Pending,
    })
}

/// Parse a human-readable amount to wei (or token units).
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals (18 for native, 6 for USDC)
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, SwapError> {
    let parts: Vec<&str> = amount.trim().split('.').collect();

    if parts.len() > 2 || parts[0].is_empty() && parts.len() == 1 {
        return Err(SwapError::InvalidAmount(format!("`{amount}`")));
    }

    let whole = if parts[0].is_empty() {
        U256::ZERO
    } else {
        parts[0]
            .parse::<U256>()
            .map_err(|_| SwapError::InvalidAmount(format!("invalid whole number `{amount}`")))?
    };

    let decimal_part = if parts.len() == 2 {
        let dec_str = parts[1];
        if dec_str.len() > decimals as usize {
            return Err(SwapError::InvalidAmount(format!(
                "too many decimal places (max {decimals})"
            )));
        }
        if !dec_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(SwapError::InvalidAmount(format!("invalid decimal `{amount}`")));
        }
        // Pad with zeros to match decimals
        let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
        if padded.is_empty() {
            U256::ZERO
        } else {
            padded
                .parse::<U256>()
                .map_err(|_| SwapError::InvalidAmount(format!("invalid decimal `{amount}`")))?
        }
    } else {
        U256::ZERO
    };

    let multiplier = U256::from(10u64).pow(U256::from(decimals));
    whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or_else(|| SwapError::InvalidAmount("amount overflow".to_string()))
}

/// Format wei (or token units) to human-readable amount.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}
