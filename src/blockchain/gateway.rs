// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Live [`ChainReader`] / [`ChainWriter`] over pooled RPC connections.
//!
//! Each call picks the pool for the chain's RPC endpoint from the registry,
//! so every chain shares one bounded set of connections for the whole run.

use alloy::primitives::{Address, TxHash, U256};

use super::client::{rpc_registry, RpcRegistry};
use super::diamond::DiamondContract;
use super::erc20::Erc20Contract;
use super::router::RouterContract;
use super::transactions::{self, TxSender};
use super::types::{Chain, SoData, StargateData, SwapData, TxStatus};
use crate::error::SwapError;
use crate::swap::{ChainReader, ChainWriter};

pub struct EvmGateway {
    registry: RpcRegistry,
    sender: TxSender,
}

impl EvmGateway {
    pub fn new(registry: RpcRegistry, sender: TxSender) -> Self {
        Self { registry, sender }
    }

    /// Gateway with `capacity` connections per endpoint.
    pub fn with_capacity(capacity: usize, sender: TxSender) -> Self {
        Self::new(rpc_registry(capacity), sender)
    }

    fn diamond(&self, chain: &Chain) -> DiamondContract {
        DiamondContract::new(self.registry.pool(&chain.rpc), chain.so_diamond)
    }

    fn router(&self, chain: &Chain) -> Result<RouterContract, SwapError> {
        let route = chain.primary_route()?.clone();
        Ok(RouterContract::new(self.registry.pool(&chain.rpc), route))
    }

    fn token(&self, chain: &Chain, token: Address) -> Erc20Contract {
        Erc20Contract::new(self.registry.pool(&chain.rpc), token)
    }
}

impl ChainReader for EvmGateway {
    async fn destination_gas(
        &self,
        dst: &Chain,
        so_data: &SoData,
        dst_swaps: &[SwapData],
    ) -> Result<u64, SwapError> {
        self.diamond(dst)
            .sg_receive_for_gas(so_data, dst.stargate_pool_id, dst_swaps)
            .await
    }

    async fn bridge_fee(
        &self,
        src: &Chain,
        so_data: &SoData,
        stargate: &StargateData,
        dst_swaps: &[SwapData],
    ) -> Result<U256, SwapError> {
        self.diamond(src)
            .stargate_fee(so_data, stargate, dst_swaps)
            .await
    }

    async fn bridge_final_amount(
        &self,
        src: &Chain,
        stargate: &StargateData,
        amount: U256,
    ) -> Result<U256, SwapError> {
        self.diamond(src)
            .estimate_stargate_final_amount(stargate, amount)
            .await
    }

    async fn so_fee(&self, chain: &Chain, amount: U256) -> Result<U256, SwapError> {
        self.diamond(chain).so_fee(amount).await
    }

    async fn amount_before_so_fee(&self, chain: &Chain, amount: U256) -> Result<U256, SwapError> {
        self.diamond(chain).amount_before_so_fee(amount).await
    }

    async fn amount_out(
        &self,
        chain: &Chain,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256, SwapError> {
        self.router(chain)?
            .amount_out(token_in, token_out, amount_in)
            .await
    }

    async fn amount_in(
        &self,
        chain: &Chain,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
    ) -> Result<U256, SwapError> {
        self.router(chain)?
            .amount_in(token_in, token_out, amount_out)
            .await
    }

    async fn allowance(
        &self,
        chain: &Chain,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, SwapError> {
        self.token(chain, token).allowance(owner, spender).await
    }
}

impl ChainWriter for EvmGateway {
    fn sender(&self) -> Address {
        self.sender.address()
    }

    async fn approve(
        &self,
        chain: &Chain,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, SwapError> {
        self.token(chain, token)
            .approve(&self.sender, spender, amount)
            .await
    }

    async fn swap_generic(
        &self,
        chain: &Chain,
        so_data: &SoData,
        swaps: &[SwapData],
        value: U256,
    ) -> Result<TxHash, SwapError> {
        self.diamond(chain)
            .so_swap_generic(&self.sender, so_data, swaps, value)
            .await
    }

    async fn swap_via_stargate(
        &self,
        chain: &Chain,
        so_data: &SoData,
        src_swaps: &[SwapData],
        stargate: &StargateData,
        dst_swaps: &[SwapData],
        value: U256,
    ) -> Result<TxHash, SwapError> {
        self.diamond(chain)
            .so_swap_via_stargate(&self.sender, so_data, src_swaps, stargate, dst_swaps, value)
            .await
    }

    async fn transaction_status(&self, chain: &Chain, tx_hash: TxHash) -> Result<TxStatus, SwapError> {
        self.registry
            .pool(&chain.rpc)
            .with_connection(move |conn| Box::pin(transactions::transaction_status(conn, tx_hash)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::signing::{sender_from_signer, signer_from_hex};
    use crate::blockchain::types::fixtures::chain_a;

    fn gateway() -> EvmGateway {
        let signer = signer_from_hex("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80")
            .unwrap();
        EvmGateway::with_capacity(2, sender_from_signer(signer))
    }

    #[test]
    fn sender_is_the_signing_account() {
        let gw = gateway();
        assert_eq!(
            format!("{:?}", gw.sender()).to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_connection_error() {
        let gw = gateway();
        let mut chain = chain_a();
        chain.rpc = "http://127.0.0.1:1".to_string();

        let err = gw
            .allowance(&chain, chain.usdc, gw.sender(), chain.so_diamond)
            .await
            .unwrap_err();

        assert!(err.is_connection(), "{err:?}");
        assert_eq!(gw.registry.len(), 1);
        let pool = gw.registry.pool(&chain.rpc);
        assert_eq!(pool.in_use(), 0);
        assert_eq!(pool.idle(), 0);
    }

    #[tokio::test]
    async fn chains_sharing_an_endpoint_share_a_pool() {
        let gw = gateway();
        let a = chain_a();
        let mut b = chain_a();
        b.name = "alias".to_string();

        let _ = gw.diamond(&a);
        let _ = gw.token(&b, b.usdc);
        assert_eq!(gw.registry.len(), 1);
    }
}
