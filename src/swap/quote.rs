// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Quote Pipeline
//!
//! Computes gas, fees and slippage-bounded minimums for a route. Every step
//! awaits the previous one because its output feeds the next call:
//!
//! 1. source DEX leg (sending asset -> source stablecoin), minimum 0
//! 2. provisional destination leg (stablecoin -> receiving asset), amount 0
//! 3. destination gas for `sgReceive`, then a preview of the bridge fee
//! 4. no-slippage final amount: source quote -> bridge estimate -> rescale
//!    -> protocol fee -> destination quote
//! 5. slippage minimum, translated back into the bridge minimum
//! 6. destination leg rebuilt with that minimum
//! 7. final bridge fee and the native value to attach
//!
//! The bridge fee and the submitted transaction always use the values
//! produced by steps 6 and 7; earlier provisional values are dropped.

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::amounts::{minimum_amount, rescale, DEFAULT_SLIPPAGE};
use super::ChainReader;
use crate::blockchain::router::{build_swap_data, dex_pair};
use crate::blockchain::{Chain, SoData, StargateData, SwapData};
use crate::error::SwapError;

/// Destination gas budget used when estimation fails only for lack of funds.
pub const FALLBACK_DST_GAS: u64 = 500_000;

/// Priced single-chain swap.
#[derive(Debug, Clone, Serialize)]
pub struct SameChainQuote {
    pub so_data: SoData,
    pub swaps: Vec<SwapData>,
    /// DEX output with no slippage
    pub expected_amount: U256,
    /// Minimum output embedded in the swap payload
    pub min_amount: U256,
    /// Native value to attach
    pub value: U256,
}

/// Priced cross-chain swap, ready for submission.
#[derive(Debug, Clone, Serialize)]
pub struct CrossChainQuote {
    pub so_data: SoData,
    pub src_swaps: Vec<SwapData>,
    pub stargate: StargateData,
    pub dst_swaps: Vec<SwapData>,
    pub dst_gas: u64,
    /// Amount the receiver gets with no slippage, destination units
    pub final_amount: U256,
    /// Minimum the receiver accepts, destination units
    pub min_amount: U256,
    pub bridge_fee: U256,
    /// Native value to attach: bridge fee, plus the input when it is native
    pub value: U256,
}

/// Runs the ordered quote calls against a [`ChainReader`].
pub struct QuotePipeline<'a, R> {
    reader: &'a R,
    slippage: Decimal,
    deadline: u64,
    fallback_dst_gas: u64,
    cancel: CancellationToken,
}

impl<'a, R: ChainReader> QuotePipeline<'a, R> {
    /// `deadline` is the unix time after which DEX payloads revert.
    pub fn new(reader: &'a R, deadline: u64) -> Self {
        Self {
            reader,
            slippage: DEFAULT_SLIPPAGE,
            deadline,
            fallback_dst_gas: FALLBACK_DST_GAS,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_slippage(mut self, slippage: Decimal) -> Self {
        self.slippage = slippage;
        self
    }

    pub fn with_fallback_dst_gas(mut self, gas: u64) -> Self {
        self.fallback_dst_gas = gas;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    fn checkpoint(&self) -> Result<(), SwapError> {
        if self.cancel.is_cancelled() {
            return Err(SwapError::Cancelled);
        }
        Ok(())
    }

    /// Price a swap that stays on `chain`.
    pub async fn quote_same_chain(
        &self,
        chain: &Chain,
        so_data: SoData,
    ) -> Result<SameChainQuote, SwapError> {
        let sending = so_data.sending_asset_id;
        let receiving = so_data.receiving_asset_id;

        let (token_in, token_out) = dex_pair(chain, sending, receiving)?;

        self.checkpoint()?;
        let expected_amount = self
            .reader
            .amount_out(chain, token_in, token_out, so_data.amount)
            .await?;
        let min_amount = minimum_amount(expected_amount, self.slippage)?;

        let leg = build_swap_data(
            chain,
            sending,
            receiving,
            so_data.amount,
            min_amount,
            self.deadline,
        )?;
        let value = if sending.is_zero() {
            so_data.amount
        } else {
            U256::ZERO
        };

        info!(
            chain = %chain.name,
            %expected_amount,
            %min_amount,
            %value,
            "Same-chain quote ready"
        );

        Ok(SameChainQuote {
            so_data,
            swaps: vec![leg],
            expected_amount,
            min_amount,
            value,
        })
    }

    /// Price a swap from `src` to `dst` through the bridge.
    pub async fn quote_cross_chain(
        &self,
        src: &Chain,
        dst: &Chain,
        so_data: SoData,
    ) -> Result<CrossChainQuote, SwapError> {
        let sending = so_data.sending_asset_id;
        let receiving = so_data.receiving_asset_id;
        let src_leg = sending != src.usdc;
        let dst_leg = receiving != dst.usdc;

        // 1. Source leg, quoting only.
        let src_swaps = if src_leg {
            vec![build_swap_data(
                src,
                sending,
                src.usdc,
                so_data.amount,
                U256::ZERO,
                self.deadline,
            )?]
        } else {
            Vec::new()
        };

        // 2. Provisional destination leg; the diamond fills in the amount.
        let provisional_dst = self.destination_leg(dst, receiving, dst_leg, U256::ZERO)?;

        // 3. Destination gas sizes the bridge fee.
        self.checkpoint()?;
        let dst_gas = match self
            .reader
            .destination_gas(dst, &so_data, &provisional_dst)
            .await
        {
            Ok(gas) => gas,
            Err(SwapError::InsufficientFundsEstimation(reason)) => {
                warn!(
                    chain = %dst.name,
                    %reason,
                    fallback = self.fallback_dst_gas,
                    "Destination gas estimate short of funds, using fallback budget"
                );
                self.fallback_dst_gas
            }
            Err(e) => return Err(e),
        };
        let mut stargate = StargateData::new(src, dst, U256::ZERO, dst_gas);

        self.checkpoint()?;
        let preview_fee = self
            .reader
            .bridge_fee(src, &so_data, &stargate, &provisional_dst)
            .await?;
        info!(dst_gas, %preview_fee, "Destination gas estimated");

        // 4. Final amount with no slippage.
        self.checkpoint()?;
        let final_amount = self
            .estimate_final_amount(src, dst, &so_data, &stargate, src_leg, dst_leg)
            .await?;

        // 5. Slippage minimum and the bridge minimum it implies.
        self.checkpoint()?;
        let min_amount = minimum_amount(final_amount, self.slippage)?;
        let bridge_min = if dst_leg {
            let stable_needed = self
                .reader
                .amount_in(dst, dst.usdc, dst.routable(receiving), min_amount)
                .await?;
            self.reader.amount_before_so_fee(dst, stable_needed).await?
        } else {
            min_amount
        };
        stargate.min_amount = rescale(bridge_min, dst.stable_decimals, src.stable_decimals)?;

        // 6. Destination leg carrying the real minimum.
        let dst_swaps = self.destination_leg(dst, receiving, dst_leg, min_amount)?;

        // 7. Final fee with the frozen parameters.
        self.checkpoint()?;
        let bridge_fee = self
            .reader
            .bridge_fee(src, &so_data, &stargate, &dst_swaps)
            .await?;
        let value = if sending.is_zero() {
            bridge_fee.saturating_add(so_data.amount)
        } else {
            bridge_fee
        };

        info!(
            from = %src.name,
            to = %dst.name,
            %final_amount,
            %min_amount,
            bridge_min = %stargate.min_amount,
            %bridge_fee,
            %value,
            "Cross-chain quote ready"
        );

        Ok(CrossChainQuote {
            so_data,
            src_swaps,
            stargate,
            dst_swaps,
            dst_gas,
            final_amount,
            min_amount,
            bridge_fee,
            value,
        })
    }

    fn destination_leg(
        &self,
        dst: &Chain,
        receiving: Address,
        needed: bool,
        min_amount: U256,
    ) -> Result<Vec<SwapData>, SwapError> {
        if !needed {
            return Ok(Vec::new());
        }
        Ok(vec![build_swap_data(
            dst,
            dst.usdc,
            receiving,
            U256::ZERO,
            min_amount,
            self.deadline,
        )?])
    }

    async fn estimate_final_amount(
        &self,
        src: &Chain,
        dst: &Chain,
        so_data: &SoData,
        stargate: &StargateData,
        src_leg: bool,
        dst_leg: bool,
    ) -> Result<U256, SwapError> {
        let mut amount = so_data.amount;

        if src_leg {
            amount = self
                .reader
                .amount_out(src, src.routable(so_data.sending_asset_id), src.usdc, amount)
                .await?;
        }

        amount = self
            .reader
            .bridge_final_amount(src, stargate, amount)
            .await?;
        amount = rescale(amount, src.stable_decimals, dst.stable_decimals)?;

        let so_fee = self.reader.so_fee(dst, amount).await?;
        amount = amount.saturating_sub(so_fee);

        if dst_leg {
            amount = self
                .reader
                .amount_out(dst, dst.usdc, dst.routable(so_data.receiving_asset_id), amount)
                .await?;
        }

        Ok(amount)
    }
}
