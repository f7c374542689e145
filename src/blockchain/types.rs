// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types: chain descriptors and per-swap records.

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{Address, Bytes, B256, U256};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::SwapError;

/// Decimals of every native currency and wrapped-native token we route.
pub const NATIVE_DECIMALS: u8 = 18;

/// Default decimals of the bridge stablecoin.
pub const DEFAULT_STABLE_DECIMALS: u8 = 6;

/// Default Uniswap v3 pool fee tier (0.3 %).
pub const DEFAULT_V3_FEE: u32 = 3000;

/// DEX router flavour, tagged by the interface name used in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouterKind {
    #[serde(rename = "IUniswapV2Router02")]
    V2,
    #[serde(rename = "ISwapRouter")]
    V3,
}

/// One DEX a chain can route through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DexRoute {
    pub router: Address,
    pub kind: RouterKind,
    /// QuoterV2 address, required for v3 routers.
    #[serde(default)]
    pub quoter: Option<Address>,
    /// v3 pool fee tier.
    #[serde(default)]
    pub fee: Option<u32>,
}

impl DexRoute {
    pub fn v3_fee(&self) -> u32 {
        self.fee.unwrap_or(DEFAULT_V3_FEE)
    }
}

/// Static descriptor of one network. Loaded once, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chain {
    /// Network name (the key under `networks:` in the config file).
    #[serde(default)]
    pub name: String,
    #[serde(alias = "chainid")]
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc: String,
    pub stargate_router: Address,
    pub so_diamond: Address,
    /// Stargate's own chain identifier, not the EVM chain id.
    #[serde(alias = "stargate_chainid")]
    pub stargate_chain_id: u16,
    #[serde(alias = "stargate_poolid")]
    pub stargate_pool_id: u64,
    pub usdc: Address,
    pub weth: Address,
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
    #[serde(default = "default_stable_decimals")]
    pub stable_decimals: u8,
    /// Ordered DEX routes; the first one is used.
    pub routers: Vec<DexRoute>,
}

fn default_native_symbol() -> String {
    "ETH".to_string()
}

fn default_stable_decimals() -> u8 {
    DEFAULT_STABLE_DECIMALS
}

impl Chain {
    /// The DEX route swaps on this chain go through.
    pub fn primary_route(&self) -> Result<&DexRoute, SwapError> {
        self.routers
            .first()
            .ok_or_else(|| SwapError::Config(format!("network `{}` has no DEX router", self.name)))
    }

    /// Address of `token` on this chain. Native currency is the zero address.
    pub fn token_address(&self, token: TokenSymbol) -> Address {
        match token {
            TokenSymbol::Native => Address::ZERO,
            TokenSymbol::Wrapped => self.weth,
            TokenSymbol::Stable => self.usdc,
        }
    }

    pub fn token_decimals(&self, token: TokenSymbol) -> u8 {
        match token {
            TokenSymbol::Native | TokenSymbol::Wrapped => NATIVE_DECIMALS,
            TokenSymbol::Stable => self.stable_decimals,
        }
    }

    /// Map the native placeholder to wrapped-native, as DEX paths require.
    pub fn routable(&self, asset: Address) -> Address {
        if asset.is_zero() {
            self.weth
        } else {
            asset
        }
    }
}

/// Tokens the client knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSymbol {
    Native,
    Wrapped,
    Stable,
}

impl FromStr for TokenSymbol {
    type Err = SwapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "eth" | "avax" | "matic" | "bnb" => Ok(TokenSymbol::Native),
            "wrapped" | "weth" | "wavax" | "wmatic" | "wbnb" => Ok(TokenSymbol::Wrapped),
            "stable" | "usdc" => Ok(TokenSymbol::Stable),
            other => Err(SwapError::UnsupportedToken(other.to_string())),
        }
    }
}

impl fmt::Display for TokenSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenSymbol::Native => "native",
            TokenSymbol::Wrapped => "wrapped",
            TokenSymbol::Stable => "usdc",
        };
        f.write_str(s)
    }
}

/// Cross-chain swap record, one per swap attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoData {
    pub transaction_id: B256,
    pub receiver: Address,
    pub source_chain_id: U256,
    pub sending_asset_id: Address,
    pub destination_chain_id: U256,
    pub receiving_asset_id: Address,
    /// Input amount in the sending asset's smallest unit
    pub amount: U256,
}

impl SoData {
    /// Build a record with a fresh random transaction id.
    pub fn new(
        receiver: Address,
        source_chain_id: u64,
        sending_asset_id: Address,
        destination_chain_id: u64,
        receiving_asset_id: Address,
        amount: U256,
    ) -> Self {
        let mut id = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut id);
        Self {
            transaction_id: B256::from(id),
            receiver,
            source_chain_id: U256::from(source_chain_id),
            sending_asset_id,
            destination_chain_id: U256::from(destination_chain_id),
            receiving_asset_id,
            amount,
        }
    }
}

/// One local DEX leg executed by the diamond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwapData {
    pub call_to: Address,
    pub approve_to: Address,
    /// Zero address for native currency.
    pub sending_asset_id: Address,
    /// Zero address for native on v2; wrapped-native on v3.
    pub receiving_asset_id: Address,
    pub from_amount: U256,
    /// Encoded router call. Embeds the amounts, so rebuild rather than patch.
    pub call_data: Bytes,
}

/// Stargate bridge parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StargateData {
    pub src_stargate_pool_id: U256,
    pub dst_stargate_chain_id: u16,
    pub dst_stargate_pool_id: U256,
    /// Minimum amount the destination pool must deliver, source decimals.
    pub min_amount: U256,
    pub dst_gas_for_sg_receive: U256,
    pub dst_so_diamond: Address,
}

impl StargateData {
    pub fn new(from: &Chain, to: &Chain, min_amount: U256, dst_gas: u64) -> Self {
        Self {
            src_stargate_pool_id: U256::from(from.stargate_pool_id),
            dst_stargate_chain_id: to.stargate_chain_id,
            dst_stargate_pool_id: U256::from(to.stargate_pool_id),
            min_amount,
            dst_gas_for_sg_receive: U256::from(dst_gas),
            dst_so_diamond: to.so_diamond,
        }
    }
}

/// Result of one confirmation poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    Pending,
    Mined(TxReceipt),
}

/// Transaction receipt after confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TxReceipt {
    pub tx_hash: B256,
    /// Block number where transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
    /// Whether the transaction was successful
    pub success: bool,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use alloy::primitives::address;

    pub fn chain_a() -> Chain {
        Chain {
            name: "chain-a".to_string(),
            chain_id: 4,
            rpc: "https://rpc.chain-a.test".to_string(),
            stargate_router: address!("0x00000000000000000000000000000000000000a1"),
            so_diamond: address!("0x00000000000000000000000000000000000000a2"),
            stargate_chain_id: 10001,
            stargate_pool_id: 1,
            usdc: address!("0x00000000000000000000000000000000000000a3"),
            weth: address!("0x00000000000000000000000000000000000000a4"),
            native_symbol: "ETH".to_string(),
            stable_decimals: 6,
            routers: vec![DexRoute {
                router: address!("0x00000000000000000000000000000000000000a5"),
                kind: RouterKind::V2,
                quoter: None,
                fee: None,
            }],
        }
    }

    pub fn chain_b() -> Chain {
        Chain {
            name: "chain-b".to_string(),
            chain_id: 80001,
            rpc: "https://rpc.chain-b.test".to_string(),
            stargate_router: address!("0x00000000000000000000000000000000000000b1"),
            so_diamond: address!("0x00000000000000000000000000000000000000b2"),
            stargate_chain_id: 10009,
            stargate_pool_id: 1,
            usdc: address!("0x00000000000000000000000000000000000000b3"),
            weth: address!("0x00000000000000000000000000000000000000b4"),
            native_symbol: "MATIC".to_string(),
            stable_decimals: 6,
            routers: vec![DexRoute {
                router: address!("0x00000000000000000000000000000000000000b5"),
                kind: RouterKind::V3,
                quoter: Some(address!("0x00000000000000000000000000000000000000b6")),
                fee: Some(500),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn parses_token_symbols() {
        assert_eq!("ETH".parse::<TokenSymbol>().unwrap(), TokenSymbol::Native);
        assert_eq!("wavax".parse::<TokenSymbol>().unwrap(), TokenSymbol::Wrapped);
        assert_eq!("usdc".parse::<TokenSymbol>().unwrap(), TokenSymbol::Stable);
        assert!(matches!(
            "dai".parse::<TokenSymbol>(),
            Err(SwapError::UnsupportedToken(_))
        ));
    }

    #[test]
    fn native_is_zero_and_routes_through_weth() {
        let chain = chain_a();
        let native = chain.token_address(TokenSymbol::Native);
        assert!(native.is_zero());
        assert_eq!(chain.routable(native), chain.weth);
        assert_eq!(chain.routable(chain.usdc), chain.usdc);
    }

    #[test]
    fn so_data_ids_are_random() {
        let chain = chain_a();
        let a = SoData::new(Address::ZERO, 4, chain.usdc, 80001, chain.usdc, U256::from(1));
        let b = SoData::new(Address::ZERO, 4, chain.usdc, 80001, chain.usdc, U256::from(1));
        assert_ne!(a.transaction_id, b.transaction_id);
        assert_eq!(a.destination_chain_id, U256::from(80001));
    }

    #[test]
    fn stargate_data_targets_destination_diamond() {
        let (a, b) = (chain_a(), chain_b());
        let data = StargateData::new(&a, &b, U256::ZERO, 250_000);
        assert_eq!(data.dst_so_diamond, b.so_diamond);
        assert_eq!(data.dst_stargate_chain_id, 10009);
        assert_eq!(data.dst_gas_for_sg_receive, U256::from(250_000));
    }
}
