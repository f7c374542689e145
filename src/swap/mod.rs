// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Quote-and-execute flow.
//!
//! The flow talks to the chains only through [`ChainReader`] (view calls and
//! estimates) and [`ChainWriter`] (transactions and receipts), implemented
//! over pooled RPC connections by [`crate::blockchain::EvmGateway`].

pub mod amounts;
pub mod orchestrator;
pub mod quote;

#[cfg(test)]
pub(crate) mod testing;

use alloy::primitives::{Address, TxHash, U256};

use crate::blockchain::{Chain, SoData, StargateData, SwapData, TxStatus};
use crate::error::SwapError;

pub use orchestrator::{Quote, SwapOrchestrator, SwapOutcome, SwapRequest};
pub use quote::{CrossChainQuote, QuotePipeline, SameChainQuote};

/// Read-only calls the quote pipeline depends on.
#[allow(async_fn_in_trait)]
pub trait ChainReader {
    /// Gas the destination diamond's `sgReceive` needs (an `eth_estimateGas`).
    async fn destination_gas(
        &self,
        dst: &Chain,
        so_data: &SoData,
        dst_swaps: &[SwapData],
    ) -> Result<u64, SwapError>;

    /// Native fee for bridging with the given parameters.
    async fn bridge_fee(
        &self,
        src: &Chain,
        so_data: &SoData,
        stargate: &StargateData,
        dst_swaps: &[SwapData],
    ) -> Result<U256, SwapError>;

    /// Amount the destination pool delivers for `amount` bridged.
    async fn bridge_final_amount(
        &self,
        src: &Chain,
        stargate: &StargateData,
        amount: U256,
    ) -> Result<U256, SwapError>;

    /// Protocol fee the diamond takes from `amount`.
    async fn so_fee(&self, chain: &Chain, amount: U256) -> Result<U256, SwapError>;

    /// Amount that leaves `amount` after the protocol fee.
    async fn amount_before_so_fee(&self, chain: &Chain, amount: U256) -> Result<U256, SwapError>;

    /// Expected DEX output for `amount_in` along `token_in -> token_out`.
    async fn amount_out(
        &self,
        chain: &Chain,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256, SwapError>;

    /// DEX input required for exactly `amount_out` along `token_in -> token_out`.
    async fn amount_in(
        &self,
        chain: &Chain,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
    ) -> Result<U256, SwapError>;

    /// Current ERC-20 allowance.
    async fn allowance(
        &self,
        chain: &Chain,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, SwapError>;
}

/// State-changing calls and confirmation lookups.
#[allow(async_fn_in_trait)]
pub trait ChainWriter {
    /// Account every transaction is sent from.
    fn sender(&self) -> Address;

    async fn approve(
        &self,
        chain: &Chain,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, SwapError>;

    async fn swap_generic(
        &self,
        chain: &Chain,
        so_data: &SoData,
        swaps: &[SwapData],
        value: U256,
    ) -> Result<TxHash, SwapError>;

    async fn swap_via_stargate(
        &self,
        chain: &Chain,
        so_data: &SoData,
        src_swaps: &[SwapData],
        stargate: &StargateData,
        dst_swaps: &[SwapData],
        value: U256,
    ) -> Result<TxHash, SwapError>;

    async fn transaction_status(&self, chain: &Chain, tx_hash: TxHash) -> Result<TxStatus, SwapError>;
}
