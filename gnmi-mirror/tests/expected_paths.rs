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

mod support;

use gnmi_mirror::{ExpectedPaths, MirrorError, StreamMode, SubscribeRequest, SubscriptionMirror};
use integration_test_utils::{notification, path, ScriptedTransport};
use std::sync::Arc;
use std::time::Duration;
use support::{config, mtu, text, SHORT_WAIT, WAIT};

const WINDOW: Duration = Duration::from_millis(300);

fn interfaces() -> ExpectedPaths {
    ExpectedPaths::new().with("/interfaces/interface", &["config/name", "config/mtu"])
}

fn complete_initial_state(transport: &ScriptedTransport) {
    transport.push_update(notification(&[
        ("/interfaces/interface[name=eth0]/config/name", text("eth0")),
        ("/interfaces/interface[name=eth0]/config/mtu", mtu(1500)),
        ("/interfaces/interface[name=eth1]/config/name", text("eth1")),
        ("/interfaces/interface[name=eth1]/config/mtu", mtu(9000)),
    ]));
    transport.push_sync();
}

fn mirror_for(transport: &Arc<ScriptedTransport>) -> SubscriptionMirror {
    integration_test_utils::init_logging();
    SubscriptionMirror::new(transport.clone(), config())
}

#[test]
fn covered_paths_with_an_update_pass() {
    let transport = Arc::new(ScriptedTransport::new());
    complete_initial_state(&transport);
    transport.push_update(notification(&[(
        "/interfaces/interface[name=eth0]/config/mtu",
        mtu(9000),
    )]));

    let mut mirror = mirror_for(&transport);
    mirror
        .check_expected_paths(&interfaces(), WAIT, WINDOW)
        .expect("paths are covered and an update arrives");

    assert!(transport.wait_for_requests(1, WAIT));
    let SubscribeRequest::Subscribe(list) = &transport.requests()[0] else {
        panic!("first request must be a subscription");
    };
    assert_eq!(list.subscriptions.len(), 1);
    assert_eq!(list.subscriptions[0].path, path("/interfaces/interface"));
    assert_eq!(list.subscriptions[0].mode, Some(StreamMode::OnChange));

    let eth0_mtu = mirror
        .mirror()
        .and_then(|tree| tree.lookup(&path("/interfaces/interface[name=eth0]/config/mtu")))
        .and_then(|node| node.value())
        .cloned();
    assert_eq!(eth0_mtu, Some(mtu(9000)));
}

#[test]
fn omitted_subpath_is_reported() {
    let transport = Arc::new(ScriptedTransport::new());
    transport.push_update(notification(&[
        ("/interfaces/interface[name=eth0]/config/name", text("eth0")),
        ("/interfaces/interface[name=eth0]/config/mtu", mtu(1500)),
        ("/interfaces/interface[name=eth1]/config/name", text("eth1")),
    ]));
    transport.push_sync();

    let mut mirror = mirror_for(&transport);
    let err = mirror
        .check_expected_paths(&interfaces(), WAIT, WINDOW)
        .expect_err("eth1 has no mtu");

    let MirrorError::MissingElements(report) = &err else {
        panic!("expected missing elements, got {err}");
    };
    assert_eq!(report.total(), 1);
    assert_eq!(report.listed(), ["/interfaces/interface/config/mtu".to_string()]);
}

#[test]
fn covered_paths_without_an_update_time_out() {
    let transport = Arc::new(ScriptedTransport::new());
    complete_initial_state(&transport);

    let mut mirror = mirror_for(&transport);
    let err = mirror
        .check_expected_paths(&interfaces(), SHORT_WAIT, WINDOW)
        .expect_err("no on-change update");

    assert!(matches!(
        err,
        MirrorError::Timeout { ref context, waited }
            if context == "no on-change update within window" && waited == WINDOW
    ));
}

#[test]
fn verification_needs_a_synchronized_mirror() {
    let transport = Arc::new(ScriptedTransport::new());
    let mirror = mirror_for(&transport);

    assert!(matches!(
        mirror.verify_expected_paths(&interfaces()),
        Err(MirrorError::NotSynchronized)
    ));
}

#[test]
fn expected_paths_load_from_json() {
    let expected: ExpectedPaths = serde_json::from_str(
        r#"{"/interfaces/interface": ["config/name", "config/mtu"]}"#,
    )
    .expect("expected paths decode");

    assert_eq!(expected, interfaces());
}
