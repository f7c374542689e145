// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Omnichain Swap - cross-chain swap client
//!
//! Quotes and executes swaps through a SoDiamond settlement contract, either
//! on one EVM network or from one network to another through the Stargate
//! bridge.
//!
//! ## Modules
//!
//! - `pool` - Bounded connection pools and the per-endpoint registry
//! - `blockchain` - Chain descriptors and typed contract bindings (alloy)
//! - `swap` - Quote pipeline and transaction orchestration
//! - `config` - Network file and environment
//! - `cli` - Command-line arguments (clap)

pub mod blockchain;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pool;
pub mod swap;

pub use error::SwapError;
