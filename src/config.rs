// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Chain records come from a YAML file; the signing key and logging options
//! come from the environment. Everything is loaded once at startup and is
//! read-only afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SWAP_CONFIG` | Path of the network YAML file | `./config.yaml` |
//! | `SWAP_PRIVATE_KEY` | Hex private key of the sending account | Required unless `SWAP_KEY_PEM` is set |
//! | `SWAP_KEY_PEM` | Path of a PKCS#8 or SEC1 PEM private key | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |
//!
//! ## File Layout
//!
//! ```yaml
//! networks:
//!   rinkeby:
//!     chainid: 4
//!     rpc: https://rinkeby.example/v3/key
//!     stargate_router: "0x..."
//!     so_diamond: "0x..."
//!     stargate_chainid: 10001
//!     stargate_poolid: 1
//!     usdc: "0x..."
//!     weth: "0x..."
//!     routers:
//!       - { router: "0x...", kind: IUniswapV2Router02 }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::blockchain::signing::{sender_from_signer, signer_from_hex, signer_from_pem};
use crate::blockchain::transactions::TxSender;
use crate::blockchain::{Chain, RouterKind};
use crate::error::SwapError;

/// Environment variable name for the network file path.
pub const CONFIG_PATH_ENV: &str = "SWAP_CONFIG";

/// Network file used when neither `--config` nor `SWAP_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "./config.yaml";

/// Environment variable name for the hex-encoded private key.
///
/// Takes precedence over [`KEY_PEM_ENV`] when both are set.
pub const PRIVATE_KEY_ENV: &str = "SWAP_PRIVATE_KEY";

/// Environment variable name for the PEM key file path.
pub const KEY_PEM_ENV: &str = "SWAP_KEY_PEM";

/// Environment variable name for the logging format.
///
/// # Values
/// - `json`: structured JSON logs
/// - `pretty` (default): compact human-readable logs
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Environment variable name for the log filter.
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

/// Largest valid Uniswap v3 fee tier, in hundredths of a bip.
const MAX_V3_FEE: u32 = 1_000_000;

/// Upper bound on a stablecoin's decimals. Keeps `10^decimals` and the
/// rescaled bridge amounts well inside 256 bits.
const MAX_STABLE_DECIMALS: u8 = 36;

/// Parsed network file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub networks: HashMap<String, Chain>,
}

impl Settings {
    /// Read, parse and validate the network file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SwapError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SwapError::Config(format!("read {}: {e}", path.display())))?;
        let settings = Self::from_yaml(&raw)?;
        tracing::info!(
            path = %path.display(),
            networks = settings.networks.len(),
            "Network configuration loaded"
        );
        Ok(settings)
    }

    /// Parse and validate a network file. Each chain takes its map key as
    /// its name.
    pub fn from_yaml(raw: &str) -> Result<Self, SwapError> {
        let mut settings: Settings =
            serde_yaml::from_str(raw).map_err(|e| SwapError::Config(e.to_string()))?;
        for (name, chain) in settings.networks.iter_mut() {
            chain.name = name.clone();
        }
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SwapError> {
        if self.networks.is_empty() {
            return Err(SwapError::Config("no networks configured".to_string()));
        }

        for (name, chain) in &self.networks {
            let invalid = |what: &str| SwapError::Config(format!("network `{name}`: {what}"));

            url::Url::parse(&chain.rpc).map_err(|e| invalid(&format!("bad rpc url: {e}")))?;

            for (field, address) in [
                ("so_diamond", chain.so_diamond),
                ("usdc", chain.usdc),
                ("weth", chain.weth),
            ] {
                if address.is_zero() {
                    return Err(invalid(&format!("{field} is the zero address")));
                }
            }

            if chain.stable_decimals == 0 || chain.stable_decimals > MAX_STABLE_DECIMALS {
                return Err(invalid(&format!(
                    "stable_decimals must be in 1..={MAX_STABLE_DECIMALS}"
                )));
            }

            let route = chain.primary_route()?;
            if route.kind == RouterKind::V3 {
                if route.quoter.is_none() {
                    return Err(invalid("v3 router needs a quoter"));
                }
                if route.v3_fee() >= MAX_V3_FEE {
                    return Err(invalid("v3 fee tier out of range"));
                }
            }
        }
        Ok(())
    }

    /// Look up a network by name.
    pub fn chain(&self, name: &str) -> Result<&Chain, SwapError> {
        self.networks
            .get(name)
            .ok_or_else(|| SwapError::UnsupportedChain(name.to_string()))
    }
}

/// Build the transaction sender from `SWAP_PRIVATE_KEY` or `SWAP_KEY_PEM`.
pub fn load_sender() -> Result<TxSender, SwapError> {
    let signer = match std::env::var(PRIVATE_KEY_ENV) {
        Ok(hex) => signer_from_hex(&hex)?,
        Err(_) => {
            let path = std::env::var(KEY_PEM_ENV).map_err(|_| {
                SwapError::Config(format!("set {PRIVATE_KEY_ENV} or {KEY_PEM_ENV}"))
            })?;
            let pem = std::fs::read(&path)
                .map_err(|e| SwapError::Config(format!("read {path}: {e}")))?;
            signer_from_pem(&pem)?
        }
    };
    let sender = sender_from_signer(signer);
    tracing::info!(address = %sender.address(), "Signing key loaded");
    Ok(sender)
}
