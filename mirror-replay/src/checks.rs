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

use crate::config::{millis, Check, ScenarioConfig};
use anyhow::{bail, Context};
use gnmi_mirror::{GnmiTransport, SubscriptionMirror};
use std::sync::Arc;
use tracing::info;

/// Subscribes once and runs every check in order, stopping at the first
/// failure.
pub fn run_scenario(
    scenario: &ScenarioConfig,
    transport: Arc<dyn GnmiTransport>,
) -> anyhow::Result<()> {
    let subscription = &scenario.subscription;
    let mut mirror = SubscriptionMirror::new(transport, scenario.mirror.clone());
    mirror
        .subscribe(
            &subscription.paths,
            subscription.mode,
            subscription.encoding,
            subscription.stream,
        )
        .context("Unable to subscribe")?;

    for (index, check) in scenario.checks.iter().enumerate() {
        run_check(&mut mirror, check)
            .with_context(|| format!("Check {} ({}) failed", index + 1, check.name()))?;
        info!(check = check.name(), index = index + 1, "check passed");
    }
    mirror.close();
    Ok(())
}

fn run_check(mirror: &mut SubscriptionMirror, check: &Check) -> anyhow::Result<()> {
    match *check {
        Check::InitialSync { timeout_ms } => {
            mirror.await_initial_sync(millis(timeout_ms))?;
        }
        Check::OnChange {
            timeout_ms,
            window_ms,
            require_update,
        } => {
            let observed = mirror.await_on_change(millis(timeout_ms), millis(window_ms))?;
            if require_update && !observed {
                bail!("no on-change update within {window_ms} ms");
            }
        }
        Check::PeriodicCoverage {
            period_ms,
            count,
            timeout_ms,
        } => {
            if !mirror.await_periodic_coverage(millis(period_ms), count, millis(timeout_ms))? {
                bail!("stream ended before {count} samples");
            }
        }
        Check::AnyUpdate { timeout_ms } => {
            if !mirror.await_any_update(millis(timeout_ms))? {
                bail!("stream ended without an update");
            }
        }
        Check::StreamClosed { timeout_ms } => {
            if !mirror.await_stream_closed(millis(timeout_ms))? {
                bail!("stream still open");
            }
        }
        Check::NotAggregated { timeout_ms } => {
            mirror.check_updates_not_aggregated(millis(timeout_ms))?;
        }
        Check::ExpectedPaths { ref expected } => {
            mirror.verify_expected_paths(expected)?;
        }
        Check::Poll => {
            mirror.poll()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::run_scenario;
    use crate::capture::{CaptureEntry, CaptureTransport};
    use crate::config::ScenarioConfig;
    use gnmi_mirror::{path::Path, Notification, SubscribeResponse, TypedValue, Update};
    use std::sync::Arc;

    fn update(at: &str, value: u64) -> CaptureEntry {
        let path: Path = at.parse().expect("valid test path");
        CaptureEntry::Response(SubscribeResponse::Update(Notification {
            updates: vec![Update::new(path, TypedValue::UintVal(value))],
            ..Notification::default()
        }))
    }

    fn scenario(checks: &str) -> ScenarioConfig {
        json5::from_str(&format!(
            r#"{{
                capture: {{ file_path: "unused.json5" }},
                subscription: {{ paths: ["/interfaces"] }},
                mirror: {{ close_grace_ms: 500 }},
                checks: {checks},
            }}"#
        ))
        .expect("scenario decodes")
    }

    fn capture() -> Vec<CaptureEntry> {
        vec![
            update("/interfaces/interface[name=eth0]/config/mtu", 1500),
            CaptureEntry::Response(SubscribeResponse::SyncResponse),
            update("/interfaces/interface[name=eth0]/config/mtu", 9000),
            update("/interfaces/interface[name=eth0]/config/mtu", 9000),
        ]
    }

    #[test]
    fn replayed_capture_passes_its_checks() {
        let scenario = scenario(
            r#"[
                { check: "initial_sync", timeout_ms: 1000 },
                { check: "expected_paths", expected: { "/interfaces/interface": ["config/mtu"] } },
                { check: "periodic_coverage", period_ms: 10, count: 2, timeout_ms: 1000 },
                { check: "stream_closed", timeout_ms: 1000 },
            ]"#,
        );
        let transport = Arc::new(CaptureTransport::new(capture(), false));

        run_scenario(&scenario, transport).expect("scenario passes");
    }

    #[test]
    fn failing_check_is_named() {
        let scenario = scenario(
            r#"[
                { check: "initial_sync", timeout_ms: 1000 },
                { check: "expected_paths", expected: { "/interfaces/interface": ["state/oper-status"] } },
            ]"#,
        );
        let transport = Arc::new(CaptureTransport::new(capture(), false));

        let err = run_scenario(&scenario, transport).expect_err("path is missing");
        assert_eq!(err.to_string(), "Check 2 (expected_paths) failed");
        assert!(format!("{err:#}").contains("/interfaces/interface/state"));
    }

    #[test]
    fn required_update_on_a_quiet_stream_fails() {
        let scenario = scenario(
            r#"[
                { check: "initial_sync", timeout_ms: 1000 },
                { check: "on_change", timeout_ms: 50, window_ms: 200, require_update: true },
            ]"#,
        );
        let transport = Arc::new(CaptureTransport::new(
            vec![CaptureEntry::Response(SubscribeResponse::SyncResponse)],
            true,
        ));

        let err = run_scenario(&scenario, transport).expect_err("nothing changes");
        assert_eq!(err.to_string(), "Check 2 (on_change) failed");
    }
}
