/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

mod capture;
mod checks;
mod config;

use crate::capture::CaptureTransport;
use crate::config::ScenarioConfig;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Replays a captured gNMI Subscribe stream through the mirror and runs the
/// checks of a scenario against it.
#[derive(Parser)]
#[command(version, about)]
struct ReplayArgs {
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let args = ReplayArgs::parse();
    let scenario = ScenarioConfig::load(&args.config)?;
    info!(
        scenario = %args.config.display(),
        capture = %scenario.capture.file_path.display(),
        checks = scenario.checks.len(),
        "Started mirror-replay"
    );

    let transport = Arc::new(CaptureTransport::from_file(
        &scenario.capture.file_path,
        scenario.capture.hold_open,
    )?);
    checks::run_scenario(&scenario, transport)?;

    info!("All checks passed");
    Ok(())
}
