// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Swap Orchestrator
//!
//! Drives one swap from a symbolic request to a confirmed receipt:
//! resolve chains and tokens, quote, grant the diamond an allowance when the
//! input is an ERC-20, submit, then poll until the transaction is mined.
//!
//! Steps never overlap. A failure at any step is returned as-is; nothing
//! already broadcast is rolled back.

use std::time::Duration;

use alloy::primitives::{TxHash, U256};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::amounts::DEFAULT_SLIPPAGE;
use super::quote::{CrossChainQuote, QuotePipeline, SameChainQuote};
use super::{ChainReader, ChainWriter};
use crate::blockchain::router::SWAP_DEADLINE_SECS;
use crate::blockchain::transactions::{format_amount, parse_amount};
use crate::blockchain::{Chain, SoData, TokenSymbol, TxReceipt, TxStatus};
use crate::config::Settings;
use crate::error::SwapError;

/// Interval between confirmation polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Input used for stablecoin swaps when no amount is given.
pub const DEFAULT_STABLE_AMOUNT: &str = "100";

/// Input used for native and wrapped-native swaps when no amount is given.
pub const DEFAULT_NATIVE_AMOUNT: &str = "0.0000000002";

/// A swap as the user asks for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub from_chain: String,
    pub to_chain: String,
    pub from_token: TokenSymbol,
    pub to_token: TokenSymbol,
    /// Input in the sending asset's smallest unit. `None` uses the default.
    pub amount: Option<U256>,
}

/// Priced route, as printed by a dry run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Quote {
    SameChain(SameChainQuote),
    CrossChain(CrossChainQuote),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    /// Same asset on the same chain: nothing to do.
    Noop,
    Completed {
        approve_tx: Option<TxHash>,
        swap_tx: TxHash,
        receipt: TxReceipt,
    },
}

struct Route<'s> {
    src: &'s Chain,
    dst: &'s Chain,
    so_data: SoData,
}

pub struct SwapOrchestrator<'a, G> {
    settings: &'a Settings,
    gateway: &'a G,
    slippage: Decimal,
    poll_interval: Duration,
    cancel: CancellationToken,
}

impl<'a, G> SwapOrchestrator<'a, G>
where
    G: ChainReader + ChainWriter,
{
    pub fn new(settings: &'a Settings, gateway: &'a G) -> Self {
        Self {
            settings,
            gateway,
            slippage: DEFAULT_SLIPPAGE,
            poll_interval: DEFAULT_POLL_INTERVAL,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_slippage(mut self, slippage: Decimal) -> Self {
        self.slippage = slippage;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
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

    fn pipeline(&self) -> QuotePipeline<'a, G> {
        let deadline = chrono::Utc::now().timestamp().saturating_add(SWAP_DEADLINE_SECS);
        QuotePipeline::new(self.gateway, deadline.max(0) as u64)
            .with_slippage(self.slippage)
            .with_cancellation(self.cancel.clone())
    }

    /// Resolve the request; `None` when it asks for the same asset on the
    /// same chain.
    fn resolve(&self, request: &SwapRequest) -> Result<Option<Route<'a>>, SwapError> {
        let src = self.settings.chain(&request.from_chain)?;
        let dst = self.settings.chain(&request.to_chain)?;

        if src.chain_id == dst.chain_id && request.from_token == request.to_token {
            return Ok(None);
        }

        let amount = match request.amount {
            Some(amount) => amount,
            None => default_amount(src, request.from_token)?,
        };
        if amount.is_zero() {
            return Err(SwapError::InvalidAmount("amount must be positive".to_string()));
        }

        let so_data = SoData::new(
            self.gateway.sender(),
            src.chain_id,
            src.token_address(request.from_token),
            dst.chain_id,
            dst.token_address(request.to_token),
            amount,
        );

        info!(
            from = %src.name,
            to = %dst.name,
            from_token = %request.from_token,
            to_token = %request.to_token,
            amount = %format_amount(amount, src.token_decimals(request.from_token)),
            transaction_id = %so_data.transaction_id,
            "Swap resolved"
        );

        Ok(Some(Route { src, dst, so_data }))
    }

    /// Price the request without sending anything.
    pub async fn quote(&self, request: &SwapRequest) -> Result<Option<Quote>, SwapError> {
        let Some(route) = self.resolve(request)? else {
            return Ok(None);
        };
        let pipeline = self.pipeline();

        let quote = if route.src.chain_id == route.dst.chain_id {
            Quote::SameChain(pipeline.quote_same_chain(route.src, route.so_data).await?)
        } else {
            Quote::CrossChain(
                pipeline
                    .quote_cross_chain(route.src, route.dst, route.so_data)
                    .await?,
            )
        };
        Ok(Some(quote))
    }

    /// Quote, approve if needed, submit and wait for confirmation.
    pub async fn swap(&self, request: &SwapRequest) -> Result<SwapOutcome, SwapError> {
        let Some(route) = self.resolve(request)? else {
            info!(chain = %request.from_chain, token = %request.from_token, "Same asset on the same chain, nothing to swap");
            return Ok(SwapOutcome::Noop);
        };
        let src = route.src;
        let pipeline = self.pipeline();

        if src.chain_id == route.dst.chain_id {
            let quote = pipeline.quote_same_chain(src, route.so_data).await?;
            let approve_tx = self.ensure_allowance(src, &quote.so_data).await?;

            self.checkpoint()?;
            let swap_tx = self
                .gateway
                .swap_generic(src, &quote.so_data, &quote.swaps, quote.value)
                .await?;
            info!(chain = %src.name, tx_hash = %swap_tx, value = %quote.value, "Same-chain swap submitted");

            let receipt = self.wait_for_confirmation(src, swap_tx).await?;
            return Ok(SwapOutcome::Completed {
                approve_tx,
                swap_tx,
                receipt,
            });
        }

        let quote = pipeline
            .quote_cross_chain(src, route.dst, route.so_data)
            .await?;
        let approve_tx = self.ensure_allowance(src, &quote.so_data).await?;

        self.checkpoint()?;
        let swap_tx = self
            .gateway
            .swap_via_stargate(
                src,
                &quote.so_data,
                &quote.src_swaps,
                &quote.stargate,
                &quote.dst_swaps,
                quote.value,
            )
            .await?;
        info!(
            from = %src.name,
            to = %route.dst.name,
            tx_hash = %swap_tx,
            value = %quote.value,
            "Cross-chain swap submitted"
        );

        let receipt = self.wait_for_confirmation(src, swap_tx).await?;
        Ok(SwapOutcome::Completed {
            approve_tx,
            swap_tx,
            receipt,
        })
    }

    /// Grant the source diamond `so_data.amount` of the sending token unless
    /// the input is native or the allowance already covers it.
    async fn ensure_allowance(
        &self,
        chain: &Chain,
        so_data: &SoData,
    ) -> Result<Option<TxHash>, SwapError> {
        let token = so_data.sending_asset_id;
        if token.is_zero() {
            return Ok(None);
        }

        self.checkpoint()?;
        let current = self
            .gateway
            .allowance(chain, token, self.gateway.sender(), chain.so_diamond)
            .await?;
        if current >= so_data.amount {
            debug!(chain = %chain.name, %token, allowance = %current, "Allowance sufficient, skipping approve");
            return Ok(None);
        }

        let tx_hash = self
            .gateway
            .approve(chain, token, chain.so_diamond, so_data.amount)
            .await?;
        info!(chain = %chain.name, %token, %tx_hash, amount = %so_data.amount, "Approve submitted");

        self.wait_for_confirmation(chain, tx_hash).await?;
        Ok(Some(tx_hash))
    }

    /// Poll until `tx_hash` is mined. A reverted receipt is an error; query
    /// failures are logged and polling continues.
    pub async fn wait_for_confirmation(
        &self,
        chain: &Chain,
        tx_hash: TxHash,
    ) -> Result<TxReceipt, SwapError> {
        info!(chain = %chain.name, %tx_hash, "Waiting for confirmation");

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(SwapError::Cancelled),
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            match self.gateway.transaction_status(chain, tx_hash).await {
                Ok(TxStatus::Pending) => debug!(%tx_hash, "Transaction pending"),
                Ok(TxStatus::Mined(receipt)) if receipt.success => {
                    info!(
                        chain = %chain.name,
                        %tx_hash,
                        block = receipt.block_number,
                        gas_used = receipt.gas_used,
                        "Transaction confirmed"
                    );
                    return Ok(receipt);
                }
                Ok(TxStatus::Mined(receipt)) => {
                    error!(chain = %chain.name, %tx_hash, block = receipt.block_number, "Transaction reverted");
                    return Err(SwapError::ConfirmationFailure(tx_hash));
                }
                Err(e) => warn!(chain = %chain.name, %tx_hash, error = %e, "Status query failed, retrying"),
            }
        }
    }
}

/// Input amount used when the request leaves it open.
pub fn default_amount(chain: &Chain, token: TokenSymbol) -> Result<U256, SwapError> {
    let human = match token {
        TokenSymbol::Stable => DEFAULT_STABLE_AMOUNT,
        TokenSymbol::Native | TokenSymbol::Wrapped => DEFAULT_NATIVE_AMOUNT,
    };
    parse_amount(human, chain.token_decimals(token))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::blockchain::router::IUniswapV2Router02;
    use crate::blockchain::types::fixtures::{chain_a, chain_b};
    use crate::swap::testing::{MockChain, Poll, Submission};
    use alloy::sol_types::SolCall;

    fn settings() -> Settings {
        let networks = [chain_a(), chain_b()]
            .into_iter()
            .map(|c| (c.name.clone(), c))
            .collect::<HashMap<_, _>>();
        Settings { networks }
    }

    fn request(from: &str, to: &str, ft: TokenSymbol, tt: TokenSymbol, amount: Option<u64>) -> SwapRequest {
        SwapRequest {
            from_chain: from.to_string(),
            to_chain: to.to_string(),
            from_token: ft,
            to_token: tt,
            amount: amount.map(U256::from),
        }
    }

    fn orchestrator<'a>(settings: &'a Settings, mock: &'a MockChain) -> SwapOrchestrator<'a, MockChain> {
        SwapOrchestrator::new(settings, mock).with_poll_interval(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn same_asset_same_chain_is_a_noop() {
        let settings = settings();
        let mock = MockChain::default();

        let outcome = orchestrator(&settings, &mock)
            .swap(&request("chain-a", "chain-a", TokenSymbol::Stable, TokenSymbol::Stable, None))
            .await
            .unwrap();

        assert_eq!(outcome, SwapOutcome::Noop);
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn same_chain_native_to_stable() {
        let settings = settings();
        let mock = MockChain::default();

        let outcome = orchestrator(&settings, &mock)
            .swap(&request("chain-a", "chain-a", TokenSymbol::Native, TokenSymbol::Stable, Some(100)))
            .await
            .unwrap();

        let SwapOutcome::Completed { approve_tx, receipt, .. } = outcome else {
            panic!("expected a completed swap");
        };
        assert!(approve_tx.is_none());
        assert!(receipt.success);
        assert_eq!(mock.calls(), vec!["amount_out", "swap_generic", "transaction_status"]);

        let submissions = mock.submissions();
        let [Submission::Generic { so_data, swaps, value }] = submissions.as_slice() else {
            panic!("expected one generic swap");
        };
        assert_eq!(so_data.receiving_asset_id, chain_a().usdc);
        assert_eq!(*value, U256::from(100));
        let call = IUniswapV2Router02::swapExactETHForTokensCall::abi_decode(&swaps[0].call_data).unwrap();
        assert_eq!(call.amountOutMin, U256::from(94));
    }

    #[tokio::test]
    async fn cross_chain_stable_approves_then_bridges() {
        let settings = settings();
        let mock = MockChain::default();

        let outcome = orchestrator(&settings, &mock)
            .swap(&request("chain-a", "chain-b", TokenSymbol::Stable, TokenSymbol::Stable, None))
            .await
            .unwrap();

        let SwapOutcome::Completed { approve_tx, swap_tx, .. } = outcome else {
            panic!("expected a completed swap");
        };
        assert!(approve_tx.is_some());
        assert_ne!(approve_tx, Some(swap_tx));

        let calls = mock.calls();
        let tail = &calls[calls.len() - 5..];
        assert_eq!(
            tail,
            ["allowance", "approve", "transaction_status", "swap_via_stargate", "transaction_status"]
        );

        let submissions = mock.submissions();
        let a = chain_a();
        match &submissions[0] {
            Submission::Approve { token, spender, amount } => {
                assert_eq!(*token, a.usdc);
                assert_eq!(*spender, a.so_diamond);
                // Default stable input: 100 USDC.
                assert_eq!(*amount, U256::from(100_000_000u64));
            }
            other => panic!("unexpected {other:?}"),
        }
        match &submissions[1] {
            Submission::Stargate {
                so_data,
                src_swaps,
                stargate,
                dst_swaps,
                value,
            } => {
                assert_eq!(so_data.receiving_asset_id, chain_b().usdc);
                assert!(src_swaps.is_empty() && dst_swaps.is_empty());
                assert_eq!(*value, U256::from(7));
                assert!(stargate.min_amount > U256::ZERO);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn sufficient_allowance_skips_approve() {
        let settings = settings();
        let mock = MockChain {
            allowance: U256::MAX,
            ..MockChain::default()
        };

        let outcome = orchestrator(&settings, &mock)
            .swap(&request("chain-a", "chain-b", TokenSymbol::Stable, TokenSymbol::Native, Some(1_000)))
            .await
            .unwrap();

        assert!(matches!(outcome, SwapOutcome::Completed { approve_tx: None, .. }));
        assert!(!mock.calls().contains(&"approve"));
    }

    #[tokio::test]
    async fn reverted_swap_is_a_confirmation_failure() {
        let settings = settings();
        let mock = MockChain::default().with_polls([Poll::Pending, Poll::Mined { success: false }]);

        let err = orchestrator(&settings, &mock)
            .swap(&request("chain-a", "chain-b", TokenSymbol::Native, TokenSymbol::Stable, None))
            .await
            .unwrap_err();

        let SwapError::ConfirmationFailure(hash) = err else {
            panic!("expected a confirmation failure, got {err:?}");
        };
        let submissions = mock.submissions();
        let [Submission::Stargate { value, .. }] = submissions.as_slice() else {
            panic!("expected one bridge submission");
        };
        // Default native input 2e-10 ETH plus the bridge fee.
        assert_eq!(*value, U256::from(200_000_007u64));
        assert_eq!(hash, alloy::primitives::B256::with_last_byte(1));
    }

    #[tokio::test]
    async fn transient_status_errors_keep_polling() {
        let settings = settings();
        let mock = MockChain::default().with_polls([
            Poll::Unreachable,
            Poll::Pending,
            Poll::Unreachable,
            Poll::Mined { success: true },
        ]);
        let chain = chain_a();

        let receipt = orchestrator(&settings, &mock)
            .wait_for_confirmation(&chain, alloy::primitives::B256::with_last_byte(9))
            .await
            .unwrap();

        assert!(receipt.success);
        assert_eq!(mock.calls().len(), 4);
    }

    #[tokio::test]
    async fn cancellation_stops_polling() {
        let settings = settings();
        let mock = MockChain::default().with_polls([Poll::Pending]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = orchestrator(&settings, &mock)
            .with_cancellation(cancel)
            .wait_for_confirmation(&chain_a(), alloy::primitives::B256::ZERO)
            .await
            .unwrap_err();

        assert!(matches!(err, SwapError::Cancelled));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_chain_is_rejected_before_any_call() {
        let settings = settings();
        let mock = MockChain::default();

        let err = orchestrator(&settings, &mock)
            .swap(&request("chain-a", "nowhere", TokenSymbol::Stable, TokenSymbol::Stable, None))
            .await
            .unwrap_err();

        assert!(matches!(err, SwapError::UnsupportedChain(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn dry_run_quotes_without_writes() {
        let settings = settings();
        let mock = MockChain::default();

        let quote = orchestrator(&settings, &mock)
            .quote(&request("chain-a", "chain-b", TokenSymbol::Stable, TokenSymbol::Stable, Some(1_000_000)))
            .await
            .unwrap()
            .unwrap();

        let Quote::CrossChain(quote) = &quote else {
            panic!("expected a cross-chain quote");
        };
        assert_eq!(quote.value, U256::from(7));
        assert!(mock.submissions().is_empty());

        let json = serde_json::to_value(Quote::CrossChain(quote.clone())).unwrap();
        assert_eq!(json["route"], "cross_chain");
    }

    #[test]
    fn default_amounts_follow_token_decimals() {
        let chain = chain_a();
        assert_eq!(
            default_amount(&chain, TokenSymbol::Stable).unwrap(),
            U256::from(100_000_000u64)
        );
        assert_eq!(
            default_amount(&chain, TokenSymbol::Native).unwrap(),
            U256::from(200_000_000u64)
        );
    }
}
