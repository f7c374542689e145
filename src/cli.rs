// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Command-line arguments.
//!
//! Usage:
//!   omnichain-swap --fc rinkeby --tc mumbai --ft eth --tt usdc
//!   omnichain-swap --fc rinkeby --tc rinkeby --ft usdc --tt eth --amount 25 --dry-run

use std::path::PathBuf;

use clap::Parser;
use rust_decimal::Decimal;

use crate::blockchain::transactions::parse_amount;
use crate::blockchain::TokenSymbol;
use crate::config::{Settings, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use crate::error::SwapError;
use crate::swap::amounts::DEFAULT_SLIPPAGE;
use crate::swap::SwapRequest;

#[derive(Parser, Debug)]
#[command(name = "omnichain-swap")]
#[command(about = "Quote and execute swaps through a SoDiamond, on one chain or across chains")]
#[command(version)]
pub struct Cli {
    /// Source network, as named in the config file
    #[arg(long = "from-chain", visible_alias = "fc")]
    pub from_chain: String,

    /// Destination network, as named in the config file
    #[arg(long = "to-chain", visible_alias = "tc")]
    pub to_chain: String,

    /// Token to send (native symbol or `native`, `weth`/`wrapped`, `usdc`/`stable`)
    #[arg(long = "from-token", visible_alias = "ft")]
    pub from_token: TokenSymbol,

    /// Token to receive
    #[arg(long = "to-token", visible_alias = "tt")]
    pub to_token: TokenSymbol,

    /// Input amount in whole units, e.g. `1.5`. Defaults to 100 for the
    /// stablecoin and 0.0000000002 for native tokens.
    #[arg(long)]
    pub amount: Option<String>,

    /// Slippage tolerance as a fraction
    #[arg(long, default_value_t = DEFAULT_SLIPPAGE)]
    pub slippage: Decimal,

    /// Network file
    #[arg(long, env = CONFIG_PATH_ENV, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Print the quote as JSON and stop before sending anything
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Turn the arguments into a request, converting `--amount` with the
    /// sending token's decimals on the source chain.
    pub fn request(&self, settings: &Settings) -> Result<SwapRequest, SwapError> {
        let amount = match &self.amount {
            Some(human) => {
                let src = settings.chain(&self.from_chain)?;
                Some(parse_amount(human, src.token_decimals(self.from_token))?)
            }
            None => None,
        };

        Ok(SwapRequest {
            from_chain: self.from_chain.clone(),
            to_chain: self.to_chain.clone(),
            from_token: self.from_token,
            to_token: self.to_token,
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::blockchain::types::fixtures::chain_a;
    use alloy::primitives::U256;
    use rust_decimal_macros::dec;

    #[test]
    fn short_aliases() {
        let cli = Cli::try_parse_from([
            "omnichain-swap", "--fc", "chain-a", "--tc", "chain-b", "--ft", "ETH", "--tt", "usdc",
        ])
        .unwrap();

        assert_eq!(cli.from_chain, "chain-a");
        assert_eq!(cli.to_chain, "chain-b");
        assert_eq!(cli.from_token, TokenSymbol::Native);
        assert_eq!(cli.to_token, TokenSymbol::Stable);
        assert_eq!(cli.slippage, DEFAULT_SLIPPAGE);
        assert!(cli.amount.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn long_names_and_options() {
        let cli = Cli::try_parse_from([
            "omnichain-swap",
            "--from-chain",
            "chain-a",
            "--to-chain",
            "chain-a",
            "--from-token",
            "usdc",
            "--to-token",
            "weth",
            "--amount",
            "2.5",
            "--slippage",
            "0.01",
            "--config",
            "/tmp/networks.yaml",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(cli.to_token, TokenSymbol::Wrapped);
        assert_eq!(cli.slippage, dec!(0.01));
        assert_eq!(cli.config, PathBuf::from("/tmp/networks.yaml"));
        assert!(cli.dry_run);

        let chain = chain_a();
        let settings = Settings {
            networks: HashMap::from([(chain.name.clone(), chain)]),
        };
        let request = cli.request(&settings).unwrap();
        assert_eq!(request.amount, Some(U256::from(2_500_000u64)));
    }

    #[test]
    fn rejects_unknown_tokens_and_missing_args() {
        assert!(Cli::try_parse_from([
            "omnichain-swap", "--fc", "a", "--tc", "b", "--ft", "dai", "--tt", "usdc",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["omnichain-swap", "--fc", "a"]).is_err());
    }

    #[test]
    fn amount_on_unknown_chain_fails() {
        let cli = Cli::try_parse_from([
            "omnichain-swap", "--fc", "nowhere", "--tc", "b", "--ft", "usdc", "--tt", "usdc", "--amount", "1",
        ])
        .unwrap();
        assert!(matches!(
            cli.request(&Settings::default()),
            Err(SwapError::UnsupportedChain(_))
        ));
    }
}
