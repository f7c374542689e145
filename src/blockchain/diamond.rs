// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SoDiamond settlement contract: bridge quotes and swap entry points.

use std::sync::Arc;

use alloy::{
    primitives::{Address, TxHash, U256},
    sol,
    sol_types::SolCall,
};

use super::client::RpcConnector;
use super::transactions::TxSender;
use super::types::{SoData, StargateData, SwapData};
use crate::error::SwapError;
use crate::pool::ConnectionPool;

sol! {
    #[sol(rpc)]
    interface ISoDiamond {
        struct NormalizedSoData {
            bytes32 transactionId;
            address receiver;
            uint256 sourceChainId;
            address sendingAssetId;
            uint256 destinationChainId;
            address receivingAssetId;
            uint256 amount;
        }

        struct NormalizedSwapData {
            address callTo;
            address approveTo;
            address sendingAssetId;
            address receivingAssetId;
            uint256 fromAmount;
            bytes callData;
        }

        struct StargateData {
            uint256 srcStargatePoolId;
            uint16 dstStargateChainId;
            uint256 dstStargatePoolId;
            uint256 minAmount;
            uint256 dstGasForSgReceive;
            address dstSoDiamond;
        }

        function soSwapViaStargate(
            NormalizedSoData calldata soData,
            NormalizedSwapData[] calldata swapDataSrc,
            StargateData calldata stargateData,
            NormalizedSwapData[] calldata swapDataDst
        ) external payable;

        function soSwapGeneric(NormalizedSoData calldata soData, NormalizedSwapData[] calldata swapData) external payable;

        function sgReceiveForGas(
            NormalizedSoData calldata soData,
            uint256 stargatePoolId,
            NormalizedSwapData[] calldata swapDataDst
        ) external;

        function getStargateFee(
            NormalizedSoData calldata soData,
            StargateData calldata stargateData,
            NormalizedSwapData[] calldata swapDataDst
        ) external view returns (uint256);

        function estimateStargateFinalAmount(StargateData calldata stargateData, uint256 amount) external view returns (uint256);

        function getSoFee(uint256 amount) external view returns (uint256);

        function getAmountBeforeSoFee(uint256 amount) external view returns (uint256);
    }
}

impl From<&SoData> for ISoDiamond::NormalizedSoData {
    fn from(d: &SoData) -> Self {
        Self {
            transactionId: d.transaction_id,
            receiver: d.receiver,
            sourceChainId: d.source_chain_id,
            sendingAssetId: d.sending_asset_id,
            destinationChainId: d.destination_chain_id,
            receivingAssetId: d.receiving_asset_id,
            amount: d.amount,
        }
    }
}

impl From<&SwapData> for ISoDiamond::NormalizedSwapData {
    fn from(d: &SwapData) -> Self {
        Self {
            callTo: d.call_to,
            approveTo: d.approve_to,
            sendingAssetId: d.sending_asset_id,
            receivingAssetId: d.receiving_asset_id,
            fromAmount: d.from_amount,
            callData: d.call_data.clone(),
        }
    }
}

impl From<&StargateData> for ISoDiamond::StargateData {
    fn from(d: &StargateData) -> Self {
        Self {
            srcStargatePoolId: d.src_stargate_pool_id,
            dstStargateChainId: d.dst_stargate_chain_id,
            dstStargatePoolId: d.dst_stargate_pool_id,
            minAmount: d.min_amount,
            dstGasForSgReceive: d.dst_gas_for_sg_receive,
            dstSoDiamond: d.dst_so_diamond,
        }
    }
}

fn swap_list(swaps: &[SwapData]) -> Vec<ISoDiamond::NormalizedSwapData> {
    swaps.iter().map(Into::into).collect()
}

/// Calldata for `soSwapGeneric`.
pub fn encode_swap_generic(so_data: &SoData, swaps: &[SwapData]) -> Vec<u8> {
    ISoDiamond::soSwapGenericCall {
        soData: so_data.into(),
        swapData: swap_list(swaps),
    }
    .abi_encode()
}

/// Calldata for `soSwapViaStargate`.
pub fn encode_swap_via_stargate(
    so_data: &SoData,
    src_swaps: &[SwapData],
    stargate: &StargateData,
    dst_swaps: &[SwapData],
) -> Vec<u8> {
    ISoDiamond::soSwapViaStargateCall {
        soData: so_data.into(),
        swapDataSrc: swap_list(src_swaps),
        stargateData: stargate.into(),
        swapDataDst: swap_list(dst_swaps),
    }
    .abi_encode()
}

/// SoDiamond deployment on one chain.
pub struct DiamondContract {
    pool: Arc<ConnectionPool<RpcConnector>>,
    address: Address,
}

impl DiamondContract {
    pub fn new(pool: Arc<ConnectionPool<RpcConnector>>, address: Address) -> Self {
        Self { pool, address }
    }

    /// Gas `sgReceive` would burn on this (destination) chain.
    pub async fn sg_receive_for_gas(
        &self,
        so_data: &SoData,
        stargate_pool_id: u64,
        dst_swaps: &[SwapData],
    ) -> Result<u64, SwapError> {
        let address = self.address;
        let so_data = ISoDiamond::NormalizedSoData::from(so_data);
        let dst_swaps = swap_list(dst_swaps);
        self.pool
            .with_connection(move |conn| {
                Box::pin(async move {
                    ISoDiamond::new(address, conn)
                        .sgReceiveForGas(so_data, U256::from(stargate_pool_id), dst_swaps)
                        .estimate_gas()
                        .await
                        .map_err(|e| SwapError::from_contract("sgReceiveForGas", e))
                })
            })
            .await
    }

    /// Native fee Stargate charges for the transfer.
    pub async fn stargate_fee(
        &self,
        so_data: &SoData,
        stargate: &StargateData,
        dst_swaps: &[SwapData],
    ) -> Result<U256, SwapError> {
        let address = self.address;
        let so_data = ISoDiamond::NormalizedSoData::from(so_data);
        let stargate = ISoDiamond::StargateData::from(stargate);
        let dst_swaps = swap_list(dst_swaps);
        self.pool
            .with_connection(move |conn| {
                Box::pin(async move {
                    ISoDiamond::new(address, conn)
                        .getStargateFee(so_data, stargate, dst_swaps)
                        .call()
                        .await
                        .map_err(|e| SwapError::from_contract("getStargateFee", e))
                })
            })
            .await
    }

    /// Amount the destination pool would deliver for `amount` sent.
    pub async fn estimate_stargate_final_amount(
        &self,
        stargate: &StargateData,
        amount: U256,
    ) -> Result<U256, SwapError> {
        let address = self.address;
        let stargate = ISoDiamond::StargateData::from(stargate);
        self.pool
            .with_connection(move |conn| {
                Box::pin(async move {
                    ISoDiamond::new(address, conn)
                        .estimateStargateFinalAmount(stargate, amount)
                        .call()
                        .await
                        .map_err(|e| SwapError::from_contract("estimateStargateFinalAmount", e))
                })
            })
            .await
    }

    pub async fn so_fee(&self, amount: U256) -> Result<U256, SwapError> {
        let address = self.address;
        self.pool
            .with_connection(move |conn| {
                Box::pin(async move {
                    ISoDiamond::new(address, conn)
                        .getSoFee(amount)
                        .call()
                        .await
                        .map_err(|e| SwapError::from_contract("getSoFee", e))
                })
            })
            .await
    }

    /// Amount that leaves `amount` once the protocol fee is taken.
    pub async fn amount_before_so_fee(&self, amount: U256) -> Result<U256, SwapError> {
        let address = self.address;
        self.pool
            .with_connection(move |conn| {
                Box::pin(async move {
                    ISoDiamond::new(address, conn)
                        .getAmountBeforeSoFee(amount)
                        .call()
                        .await
                        .map_err(|e| SwapError::from_contract("getAmountBeforeSoFee", e))
                })
            })
            .await
    }

    /// Submit a single-chain swap.
    pub async fn so_swap_generic(
        &self,
        sender: &TxSender,
        so_data: &SoData,
        swaps: &[SwapData],
        value: U256,
    ) -> Result<TxHash, SwapError> {
        let input = encode_swap_generic(so_data, swaps);
        self.send(sender, input, value).await
    }

    /// Submit a bridge-mediated swap carrying `value` native currency.
    pub async fn so_swap_via_stargate(
        &self,
        sender: &TxSender,
        so_data: &SoData,
        src_swaps: &[SwapData],
        stargate: &StargateData,
        dst_swaps: &[SwapData],
        value: U256,
    ) -> Result<TxHash, SwapError> {
        let input = encode_swap_via_stargate(so_data, src_swaps, stargate, dst_swaps);
        self.send(sender, input, value).await
    }

    async fn send(&self, sender: &TxSender, input: Vec<u8>, value: U256) -> Result<TxHash, SwapError> {
        let address = self.address;
        let sender = sender.clone();
        self.pool
            .with_connection(move |conn| {
                Box::pin(async move { sender.send(conn, address, input.into(), value).await })
            })
            .await
    }
}
