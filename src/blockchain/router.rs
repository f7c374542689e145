// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! DEX router bindings: quoting and `SwapData` payload encoding.
//!
//! Two router flavours are supported:
//!
//! - **v2** (`IUniswapV2Router02`): quotes through `getAmountsOut` /
//!   `getAmountsIn` on the router itself. Chains whose native currency is
//!   AVAX use the `swapExactAVAX...` method family.
//! - **v3** (`ISwapRouter`): quotes through a QuoterV2 and swaps with
//!   `exactInputSingle` on the route's fee tier.

use std::sync::Arc;

use alloy::{
    primitives::{
        aliases::{U160, U24},
        Address, U256,
    },
    sol,
    sol_types::SolCall,
};

use super::client::RpcConnector;
use super::types::{Chain, DexRoute, RouterKind, SwapData};
use crate::error::SwapError;
use crate::pool::ConnectionPool;

/// Seconds a DEX call payload stays valid.
pub const SWAP_DEADLINE_SECS: i64 = 3600;

sol! {
    #[sol(rpc)]
    interface IUniswapV2Router02 {
        function getAmountsOut(uint256 amountIn, address[] calldata path) external view returns (uint256[] memory amounts);
        function getAmountsIn(uint256 amountOut, address[] calldata path) external view returns (uint256[] memory amounts);
        function swapExactETHForTokens(uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external payable returns (uint256[] memory amounts);
        function swapExactTokensForETH(uint256 amountIn, uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external returns (uint256[] memory amounts);
        function swapExactTokensForTokens(uint256 amountIn, uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external returns (uint256[] memory amounts);
    }
}

sol! {
    interface IUniswapV2Router02AVAX {
        function swapExactAVAXForTokens(uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external payable returns (uint256[] memory amounts);
        function swapExactTokensForAVAX(uint256 amountIn, uint256 amountOutMin, address[] calldata path, address to, uint256 deadline) external returns (uint256[] memory amounts);
    }
}

sol! {
    interface ISwapRouter {
        struct ExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint24 fee;
            address recipient;
            uint256 deadline;
            uint256 amountIn;
            uint256 amountOutMinimum;
            uint160 sqrtPriceLimitX96;
        }

        function exactInputSingle(ExactInputSingleParams calldata params) external payable returns (uint256 amountOut);
    }
}

sol! {
    #[sol(rpc)]
    interface IQuoterV2 {
        struct QuoteExactInputSingleParams {
            address tokenIn;
            address tokenOut;
            uint256 amountIn;
            uint24 fee;
            uint160 sqrtPriceLimitX96;
        }

        struct QuoteExactOutputSingleParams {
            address tokenIn;
            address tokenOut;
            uint256 amount;
            uint24 fee;
            uint160 sqrtPriceLimitX96;
        }

        function quoteExactInputSingle(QuoteExactInputSingleParams memory params)
            external
            returns (uint256 amountOut, uint160 sqrtPriceX96After, uint32 initializedTicksCrossed, uint256 gasEstimate);

        function quoteExactOutputSingle(QuoteExactOutputSingleParams memory params)
            external
            returns (uint256 amountIn, uint160 sqrtPriceX96After, uint32 initializedTicksCrossed, uint256 gasEstimate);
    }
}

/// Router-side token pair for a leg from `sending` to `receiving`.
///
/// Native and wrapped native resolve to the same token, so a leg between
/// them is rejected before anything is quoted.
pub fn dex_pair(
    chain: &Chain,
    sending: Address,
    receiving: Address,
) -> Result<(Address, Address), SwapError> {
    let token_in = chain.routable(sending);
    let token_out = chain.routable(receiving);
    if token_in == token_out {
        return Err(SwapError::UnsupportedRoute(format!(
            "{sending} -> {receiving} on {} needs no DEX leg",
            chain.name
        )));
    }
    Ok((token_in, token_out))
}

/// Encode the DEX leg swapping `from_amount` of `sending` into `receiving`
/// on `chain`'s primary router, paying out to the chain's diamond.
///
/// The zero address stands for the native currency on either side.
pub fn build_swap_data(
    chain: &Chain,
    sending: Address,
    receiving: Address,
    from_amount: U256,
    min_amount: U256,
    deadline: u64,
) -> Result<SwapData, SwapError> {
    let route = chain.primary_route()?;
    let (token_in, token_out) = dex_pair(chain, sending, receiving)?;

    let recipient = chain.so_diamond;
    let deadline = U256::from(deadline);
    let path = vec![token_in, token_out];

    let (call_data, receiving_asset_id) = match route.kind {
        RouterKind::V2 => {
            let avax = chain.native_symbol.eq_ignore_ascii_case("AVAX");
            let data = match (sending.is_zero(), receiving.is_zero(), avax) {
                (true, _, false) => IUniswapV2Router02::swapExactETHForTokensCall {
                    amountOutMin: min_amount,
                    path,
                    to: recipient,
                    deadline,
                }
                .abi_encode(),
                (true, _, true) => IUniswapV2Router02AVAX::swapExactAVAXForTokensCall {
                    amountOutMin: min_amount,
                    path,
                    to: recipient,
                    deadline,
                }
                .abi_encode(),
                (false, true, false) => IUniswapV2Router02::swapExactTokensForETHCall {
                    amountIn: from_amount,
                    amountOutMin: min_amount,
                    path,
                    to: recipient,
                    deadline,
                }
                .abi_encode(),
                (false, true, true) => IUniswapV2Router02AVAX::swapExactTokensForAVAXCall {
                    amountIn: from_amount,
                    amountOutMin: min_amount,
                    path,
                    to: recipient,
                    deadline,
                }
                .abi_encode(),
                (false, false, _) => IUniswapV2Router02::swapExactTokensForTokensCall {
                    amountIn: from_amount,
                    amountOutMin: min_amount,
                    path,
                    to: recipient,
                    deadline,
                }
                .abi_encode(),
            };
            (data, receiving)
        }
        RouterKind::V3 => {
            let data = ISwapRouter::exactInputSingleCall {
                params: ISwapRouter::ExactInputSingleParams {
                    tokenIn: token_in,
                    tokenOut: token_out,
                    fee: U24::from(route.v3_fee()),
                    recipient,
                    deadline,
                    amountIn: from_amount,
                    amountOutMinimum: min_amount,
                    sqrtPriceLimitX96: U160::ZERO,
                },
            }
            .abi_encode();
            // v3 pays out wrapped-native; it cannot report the zero address.
            (data, token_out)
        }
    };

    Ok(SwapData {
        call_to: route.router,
        approve_to: route.router,
        sending_asset_id: sending,
        receiving_asset_id,
        from_amount,
        call_data: call_data.into(),
    })
}

/// Read-side wrapper around one DEX route.
pub struct RouterContract {
    pool: Arc<ConnectionPool<RpcConnector>>,
    route: DexRoute,
}

impl RouterContract {
    pub fn new(pool: Arc<ConnectionPool<RpcConnector>>, route: DexRoute) -> Self {
        Self { pool, route }
    }

    fn quoter(&self) -> Result<Address, SwapError> {
        self.route.quoter.ok_or_else(|| {
            SwapError::Config(format!("v3 router {} has no quoter", self.route.router))
        })
    }

    /// Expected output of swapping `amount_in` along `token_in -> token_out`.
    pub async fn amount_out(
        &self,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
    ) -> Result<U256, SwapError> {
        match self.route.kind {
            RouterKind::V2 => {
                let router = self.route.router;
                let amounts = self
                    .pool
                    .with_connection(move |conn| {
                        Box::pin(async move {
                            IUniswapV2Router02::new(router, conn)
                                .getAmountsOut(amount_in, vec![token_in, token_out])
                                .call()
                                .await
                                .map_err(|e| SwapError::from_contract("getAmountsOut", e))
                        })
                    })
                    .await?;
                amounts.last().copied().ok_or_else(|| SwapError::Estimation {
                    method: "getAmountsOut",
                    reason: "empty amounts".to_string(),
                })
            }
            RouterKind::V3 => {
                let quoter = self.quoter()?;
                let params = IQuoterV2::QuoteExactInputSingleParams {
                    tokenIn: token_in,
                    tokenOut: token_out,
                    amountIn: amount_in,
                    fee: U24::from(self.route.v3_fee()),
                    sqrtPriceLimitX96: U160::ZERO,
                };
                self.pool
                    .with_connection(move |conn| {
                        Box::pin(async move {
                            IQuoterV2::new(quoter, conn)
                                .quoteExactInputSingle(params)
                                .call()
                                .await
                                .map(|r| r.amountOut)
                                .map_err(|e| SwapError::from_contract("quoteExactInputSingle", e))
                        })
                    })
                    .await
            }
        }
    }

    /// Input needed to receive exactly `amount_out` along `token_in -> token_out`.
    pub async fn amount_in(
        &self,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
    ) -> Result<U256, SwapError> {
        match self.route.kind {
            RouterKind::V2 => {
                let router = self.route.router;
                let amounts = self
                    .pool
                    .with_connection(move |conn| {
                        Box::pin(async move {
                            IUniswapV2Router02::new(router, conn)
                                .getAmountsIn(amount_out, vec![token_in, token_out])
                                .call()
                                .await
                                .map_err(|e| SwapError::from_contract("getAmountsIn", e))
                        })
                    })
                    .await?;
                amounts.first().copied().ok_or_else(|| SwapError::Estimation {
                    method: "getAmountsIn",
                    reason: "empty amounts".to_string(),
                })
            }
            RouterKind::V3 => {
                let quoter = self.quoter()?;
                let params = IQuoterV2::QuoteExactOutputSingleParams {
                    tokenIn: token_in,
                    tokenOut: token_out,
                    amount: amount_out,
                    fee: U24::from(self.route.v3_fee()),
                    sqrtPriceLimitX96: U160::ZERO,
                };
                self.pool
                    .with_connection(move |conn| {
                        Box::pin(async move {
                            IQuoterV2::new(quoter, conn)
                                .quoteExactOutputSingle(params)
                                .call()
                                .await
                                .map(|r| r.amountIn)
                                .map_err(|e| SwapError::from_contract("quoteExactOutputSingle", e))
                        })
                    })
                    .await
            }
        }
    }
}
