// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Tracing subscriber setup.

use std::str::FromStr;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{LOG_FILTER_ENV, LOG_FORMAT_ENV};

/// Modules capped at `info` when the filter is a bare level.
const NOISY_MODULES: &str = "h2=info,hyper=info,hyper_util=info,reqwest=info,alloy_transport_http=info,alloy_rpc_client=info";

/// Expand a bare level such as `debug` with caps for noisy dependencies.
/// Directive lists (containing `,` or `=`) are kept as given.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim();
    if level.is_empty() {
        return format!("info,{NOISY_MODULES}");
    }
    if level.contains(',') || level.contains('=') {
        level.to_string()
    } else {
        format!("{level},{NOISY_MODULES}")
    }
}

/// Install the global subscriber from `RUST_LOG` and `LOG_FORMAT`.
pub fn init_logging() {
    let level = std::env::var(LOG_FILTER_ENV).unwrap_or_else(|_| "info".to_string());
    let json = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let directives = filter_directives(&level);
    let filter = EnvFilter::from_str(&directives).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    // Logs go to stderr; stdout carries results.
    if json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).compact().with_writer(std::io::stderr))
            .init();
    }

    tracing::debug!(filter = %directives, json, "Logging initialized");
}
