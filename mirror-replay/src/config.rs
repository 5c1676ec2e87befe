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

use anyhow::Context;
use gnmi_mirror::{Encoding, ExpectedPaths, MirrorConfig, Path, StreamPolicy, SubscriptionMode};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path as FsPath, PathBuf};
use std::time::Duration;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    pub(crate) capture: CaptureConfig,
    pub(crate) subscription: SubscriptionConfig,
    #[serde(default)]
    pub(crate) mirror: MirrorConfig,
    pub(crate) checks: Vec<Check>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct CaptureConfig {
    /// Relative paths are resolved against the scenario file.
    pub(crate) file_path: PathBuf,
    /// Keep the stream open after the last captured response, like a live
    /// target, until the session shuts it down.
    #[serde(default)]
    pub(crate) hold_open: bool,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SubscriptionConfig {
    pub(crate) paths: Vec<Path>,
    #[serde(default)]
    pub(crate) mode: SubscriptionMode,
    #[serde(default)]
    pub(crate) encoding: Option<Encoding>,
    #[serde(default)]
    pub(crate) stream: Option<StreamPolicy>,
}

/// One step of a scenario. Timeouts are in milliseconds.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum Check {
    InitialSync {
        timeout_ms: u64,
    },
    OnChange {
        timeout_ms: u64,
        window_ms: u64,
        #[serde(default)]
        require_update: bool,
    },
    PeriodicCoverage {
        period_ms: u64,
        count: usize,
        timeout_ms: u64,
    },
    AnyUpdate {
        timeout_ms: u64,
    },
    StreamClosed {
        timeout_ms: u64,
    },
    NotAggregated {
        timeout_ms: u64,
    },
    ExpectedPaths {
        expected: ExpectedPaths,
    },
    Poll,
}

impl Check {
    pub fn name(&self) -> &'static str {
        match self {
            Check::InitialSync { .. } => "initial_sync",
            Check::OnChange { .. } => "on_change",
            Check::PeriodicCoverage { .. } => "periodic_coverage",
            Check::AnyUpdate { .. } => "any_update",
            Check::StreamClosed { .. } => "stream_closed",
            Check::NotAggregated { .. } => "not_aggregated",
            Check::ExpectedPaths { .. } => "expected_paths",
            Check::Poll => "poll",
        }
    }
}

pub(crate) fn millis(value: u64) -> Duration {
    Duration::from_millis(value)
}

impl ScenarioConfig {
    pub fn load(file: &FsPath) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(file)
            .with_context(|| format!("Unable to read scenario file {}", file.display()))?;
        let mut config: ScenarioConfig = json5::from_str(&contents)
            .with_context(|| format!("Unable to parse scenario file {}", file.display()))?;

        if config.capture.file_path.is_relative() {
            if let Some(dir) = file.parent() {
                config.capture.file_path = dir.join(&config.capture.file_path);
            }
        }
        Ok(config)
    }
}
