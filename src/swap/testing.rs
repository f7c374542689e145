// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory chain used by the swap tests.
//!
//! Quotes follow fixed ratios: the DEX pays 95 % of the input, the bridge
//! delivers 99.9 %. Every call is recorded by name in invocation order.

use std::collections::VecDeque;
use std::sync::Mutex;

use alloy::primitives::{Address, TxHash, B256, U256};

use super::{ChainReader, ChainWriter};
use crate::blockchain::{Chain, SoData, StargateData, SwapData, TxReceipt, TxStatus};
use crate::error::SwapError;

#[derive(Debug, Clone, Copy, Default)]
pub enum GasBehavior {
    #[default]
    Estimate,
    InsufficientFunds,
    Revert,
}

/// Scripted answer to one confirmation poll.
#[derive(Debug, Clone, Copy)]
pub enum Poll {
    Pending,
    Mined { success: bool },
    Unreachable,
}

/// A transaction the mock accepted.
#[derive(Debug, Clone)]
pub enum Submission {
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    Generic {
        so_data: SoData,
        swaps: Vec<SwapData>,
        value: U256,
    },
    Stargate {
        so_data: SoData,
        src_swaps: Vec<SwapData>,
        stargate: StargateData,
        dst_swaps: Vec<SwapData>,
        value: U256,
    },
}

pub struct MockChain {
    pub sender: Address,
    pub gas: GasBehavior,
    pub dst_gas: u64,
    pub bridge_fee: U256,
    pub so_fee: U256,
    pub allowance: U256,
    /// Consumed front to back; an empty script answers "mined, success".
    pub polls: Mutex<VecDeque<Poll>>,
    pub(crate) calls: Mutex<Vec<&'static str>>,
    pub(crate) submissions: Mutex<Vec<Submission>>,
}

impl Default for MockChain {
    fn default() -> Self {
        Self {
            sender: Address::repeat_byte(0x5e),
            gas: GasBehavior::default(),
            dst_gas: 180_000,
            bridge_fee: U256::from(7),
            so_fee: U256::ZERO,
            allowance: U256::ZERO,
            polls: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
        }
    }
}

impl MockChain {
    pub fn with_polls(self, polls: impl IntoIterator<Item = Poll>) -> Self {
        *self.polls.lock().unwrap() = polls.into_iter().collect();
        self
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    fn submit(&self, submission: Submission) -> TxHash {
        let mut submissions = self.submissions.lock().unwrap();
        submissions.push(submission);
        B256::with_last_byte(submissions.len() as u8)
    }
}

impl ChainReader for MockChain {
    async fn destination_gas(
        &self,
        _dst: &Chain,
        _so_data: &SoData,
        _dst_swaps: &[SwapData],
    ) -> Result<u64, SwapError> {
        self.record("destination_gas");
        match self.gas {
            GasBehavior::Estimate => Ok(self.dst_gas),
            GasBehavior::InsufficientFunds => Err(SwapError::InsufficientFundsEstimation(
                "insufficient funds for gas * price + value".to_string(),
            )),
            GasBehavior::Revert => Err(SwapError::Estimation {
                method: "sgReceiveForGas",
                reason: "execution reverted".to_string(),
            }),
        }
    }

    async fn bridge_fee(
        &self,
        _src: &Chain,
        _so_data: &SoData,
        _stargate: &StargateData,
        _dst_swaps: &[SwapData],
    ) -> Result<U256, SwapError> {
        self.record("bridge_fee");
        Ok(self.bridge_fee)
    }

    async fn bridge_final_amount(
        &self,
        _src: &Chain,
        _stargate: &StargateData,
        amount: U256,
    ) -> Result<U256, SwapError> {
        self.record("bridge_final_amount");
        Ok(amount * U256::from(999) / U256::from(1000))
    }

    async fn so_fee(&self, _chain: &Chain, _amount: U256) -> Result<U256, SwapError> {
        self.record("so_fee");
        Ok(self.so_fee)
    }

    async fn amount_before_so_fee(&self, _chain: &Chain, amount: U256) -> Result<U256, SwapError> {
        self.record("amount_before_so_fee");
        Ok(amount.saturating_add(self.so_fee))
    }

    async fn amount_out(
        &self,
        _chain: &Chain,
        _token_in: Address,
        _token_out: Address,
        amount_in: U256,
    ) -> Result<U256, SwapError> {
        self.record("amount_out");
        Ok(amount_in * U256::from(95) / U256::from(100))
    }

    async fn amount_in(
        &self,
        _chain: &Chain,
        _token_in: Address,
        _token_out: Address,
        amount_out: U256,
    ) -> Result<U256, SwapError> {
        self.record("amount_in");
        Ok((amount_out * U256::from(100) + U256::from(94)) / U256::from(95))
    }

    async fn allowance(
        &self,
        _chain: &Chain,
        _token: Address,
        _owner: Address,
        _spender: Address,
    ) -> Result<U256, SwapError> {
        self.record("allowance");
        Ok(self.allowance)
    }
}

impl ChainWriter for MockChain {
    fn sender(&self) -> Address {
        self.sender
    }

    async fn approve(
        &self,
        _chain: &Chain,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, SwapError> {
        self.record("approve");
        Ok(self.submit(Submission::Approve {
            token,
            spender,
            amount,
        }))
    }

    async fn swap_generic(
        &self,
        _chain: &Chain,
        so_data: &SoData,
        swaps: &[SwapData],
        value: U256,
    ) -> Result<TxHash, SwapError> {
        self.record("swap_generic");
        Ok(self.submit(Submission::Generic {
            so_data: so_data.clone(),
            swaps: swaps.to_vec(),
            value,
        }))
    }

    async fn swap_via_stargate(
        &self,
        _chain: &Chain,
        so_data: &SoData,
        src_swaps: &[SwapData],
        stargate: &StargateData,
        dst_swaps: &[SwapData],
        value: U256,
    ) -> Result<TxHash, SwapError> {
        self.record("swap_via_stargate");
        Ok(self.submit(Submission::Stargate {
            so_data: so_data.clone(),
            src_swaps: src_swaps.to_vec(),
            stargate: stargate.clone(),
            dst_swaps: dst_swaps.to_vec(),
            value,
        }))
    }

    async fn transaction_status(&self, _chain: &Chain, tx_hash: TxHash) -> Result<TxStatus, SwapError> {
        self.record("transaction_status");
        let next = self.polls.lock().unwrap().pop_front();
        match next {
            Some(Poll::Pending) => Ok(TxStatus::Pending),
            Some(Poll::Unreachable) => Err(SwapError::Connection("node went away".to_string())),
            Some(Poll::Mined { success }) => Ok(TxStatus::Mined(receipt(tx_hash, success))),
            None => Ok(TxStatus::Mined(receipt(tx_hash, true))),
        }
    }
}

fn receipt(tx_hash: TxHash, success: bool) -> TxReceipt {
    TxReceipt {
        tx_hash,
        block_number: 1,
        gas_used: 21_000,
        success,
    }
}
