// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 token contract interactions.

use std::sync::Arc;

use alloy::{
    primitives::{Address, TxHash, U256},
    sol,
    sol_types::SolCall,
};

use super::client::RpcConnector;
use super::transactions::TxSender;
use crate::error::SwapError;
use crate::pool::ConnectionPool;

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// ERC-20 contract wrapper.
pub struct Erc20Contract {
    pool: Arc<ConnectionPool<RpcConnector>>,
    address: Address,
}

impl Erc20Contract {
    pub fn new(pool: Arc<ConnectionPool<RpcConnector>>, address: Address) -> Self {
        Self { pool, address }
    }

    /// Amount `spender` may currently pull from `owner`.
    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, SwapError> {
        let address = self.address;
        self.pool
            .with_connection(move |conn| {
                Box::pin(async move {
                    IERC20::new(address, conn)
                        .allowance(owner, spender)
                        .call()
                        .await
                        .map_err(|e| SwapError::from_contract("allowance", e))
                })
            })
            .await
    }

    /// Grant `spender` an allowance of `amount`.
    pub async fn approve(
        &self,
        sender: &TxSender,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, SwapError> {
        let input = IERC20::approveCall { spender, amount }.abi_encode();
        let address = self.address;
        let sender = sender.clone();
        self.pool
            .with_connection(move |conn| {
                Box::pin(async move { sender.send(conn, address, input.into(), U256::ZERO).await })
            })
            .await
    }
}
