// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::process::ExitCode;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use omnichain_swap::blockchain::EvmGateway;
use omnichain_swap::cli::Cli;
use omnichain_swap::config::{load_sender, Settings};
use omnichain_swap::logging::init_logging;
use omnichain_swap::pool::DEFAULT_POOL_CAPACITY;
use omnichain_swap::swap::amounts::validate_slippage;
use omnichain_swap::swap::{SwapOrchestrator, SwapOutcome};
use omnichain_swap::SwapError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Swap failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), SwapError> {
    let settings = Settings::load(&cli.config)?;
    let slippage = validate_slippage(cli.slippage)?;
    let request = cli.request(&settings)?;
    let gateway = EvmGateway::with_capacity(DEFAULT_POOL_CAPACITY, load_sender()?);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling swap");
            on_interrupt.cancel();
        }
    });

    let orchestrator = SwapOrchestrator::new(&settings, &gateway)
        .with_slippage(slippage)
        .with_cancellation(cancel);

    if cli.dry_run {
        match orchestrator.quote(&request).await? {
            Some(quote) => {
                let json = serde_json::to_string_pretty(&quote)
                    .map_err(|e| SwapError::Encoding(e.to_string()))?;
                println!("{json}");
            }
            None => println!("nothing to swap: same token on the same chain"),
        }
        return Ok(());
    }

    match orchestrator.swap(&request).await? {
        SwapOutcome::Noop => println!("nothing to swap: same token on the same chain"),
        SwapOutcome::Completed {
            approve_tx,
            swap_tx,
            receipt,
        } => {
            if let Some(hash) = approve_tx {
                println!("approve tx: {hash}");
            }
            println!("swap tx:    {swap_tx}");
            println!(
                "status:     confirmed in block {} (gas used {})",
                receipt.block_number, receipt.gas_used
            );
        }
    }
    Ok(())
}
