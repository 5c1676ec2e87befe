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

use gnmi_mirror::{apply_update, ConfigNode, Path, TypedValue, UpdateOutcome};
use proptest::prelude::*;
use serde_json::{json, Map as JsonMap};
use std::collections::BTreeMap;

const LEAVES: [&str; 3] = ["mtu", "index", "speed"];

fn leaf_path(interface: usize, leaf: &str) -> Path {
    format!("/interfaces/interface[name=eth{interface}]/config/{leaf}")
        .parse()
        .expect("generated path is valid")
}

fn leaf_update() -> impl Strategy<Value = (Path, TypedValue)> {
    (0..4usize, 0..LEAVES.len(), 0..3u64).prop_map(|(interface, leaf, value)| {
        (leaf_path(interface, LEAVES[leaf]), TypedValue::UintVal(value))
    })
}

/// Final leaf values per interface, keyed by interface index and leaf name.
fn interface_leaves() -> impl Strategy<Value = BTreeMap<usize, BTreeMap<&'static str, i64>>> {
    prop::collection::btree_map(
        0..4usize,
        prop::collection::btree_map(prop::sample::select(LEAVES.to_vec()), 0..3i64, 1..=2),
        1..=3,
    )
}

fn build(updates: &[(Path, TypedValue)]) -> ConfigNode {
    let mut root = ConfigNode::default();
    for (path, value) in updates {
        apply_update(&mut root, path, value, UpdateOutcome::None).expect("update applies");
    }
    root
}

proptest! {
    #[test]
    fn replaying_the_last_values_changes_nothing(
        updates in prop::collection::vec(leaf_update(), 1..24)
    ) {
        let mut root = build(&updates);
        let before = root.clone();

        let last: BTreeMap<String, (Path, TypedValue)> = updates
            .iter()
            .map(|(path, value)| (path.to_string(), (path.clone(), value.clone())))
            .collect();
        for (path, value) in last.values() {
            let outcome = apply_update(&mut root, path, value, UpdateOutcome::None)
                .expect("update applies");
            prop_assert_eq!(outcome, UpdateOutcome::None);
        }
        prop_assert_eq!(root, before);
    }

    #[test]
    fn updating_existing_leaves_never_adds_structure(
        updates in prop::collection::vec(leaf_update(), 1..24),
        bump in 1..5u64,
    ) {
        let mut root = build(&updates);
        for (path, _) in &updates {
            let outcome = apply_update(&mut root, path, &TypedValue::UintVal(100 + bump), UpdateOutcome::None)
                .expect("update applies");
            prop_assert!(outcome <= UpdateOutcome::Value);
        }
    }

    #[test]
    fn a_mirror_is_covered_by_any_superset(
        updates in prop::collection::vec(leaf_update(), 1..24),
        extra in prop::collection::vec(leaf_update(), 0..8),
    ) {
        let base = build(&updates);
        let mut superset = updates.clone();
        superset.extend(extra);
        let larger = build(&superset);

        prop_assert!(base.covered_by(&base).expect("same shape"));
        prop_assert!(base.covered_by(&larger).expect("same shape"));
    }

    #[test]
    fn update_order_does_not_change_the_mirror(
        updates in prop::collection::vec(leaf_update(), 1..24)
    ) {
        let mut unique: BTreeMap<String, (Path, TypedValue)> = BTreeMap::new();
        for (path, value) in &updates {
            unique.entry(path.to_string()).or_insert_with(|| (path.clone(), value.clone()));
        }
        let forward: Vec<_> = unique.values().cloned().collect();
        let backward: Vec<_> = forward.iter().rev().cloned().collect();

        prop_assert_eq!(build(&forward), build(&backward));
    }

    #[test]
    fn a_mirror_is_not_covered_when_an_instance_is_missing(
        updates in prop::collection::vec((0..4usize, 0..LEAVES.len(), 0..3u64), 1..24),
        pick in any::<prop::sample::Index>(),
    ) {
        let removed = updates[pick.index(updates.len())].0;
        let to_updates = |keep: &dyn Fn(usize) -> bool| -> Vec<(Path, TypedValue)> {
            updates
                .iter()
                .filter(|(interface, _, _)| keep(*interface))
                .map(|(interface, leaf, value)| {
                    (leaf_path(*interface, LEAVES[*leaf]), TypedValue::UintVal(*value))
                })
                .collect()
        };

        let whole = build(&to_updates(&|_| true));
        let partial = build(&to_updates(&|interface| interface != removed));

        prop_assert!(!whole.covered_by(&partial).expect("same shape"));
        prop_assert!(partial.covered_by(&whole).expect("same shape"));
    }

    #[test]
    fn composite_and_flattened_updates_converge(interfaces in interface_leaves()) {
        let mut flattened = Vec::new();
        let mut composite = Vec::new();
        for (interface, leaves) in &interfaces {
            let mut config = JsonMap::new();
            for (leaf, value) in leaves {
                flattened.push((leaf_path(*interface, leaf), TypedValue::IntVal(*value)));
                config.insert(leaf.to_string(), json!(value));
            }
            let instance: Path = format!("/interfaces/interface[name=eth{interface}]")
                .parse()
                .expect("generated path is valid");
            composite.push((instance, TypedValue::JsonIetfVal(json!({ "config": config }))));
        }

        prop_assert_eq!(build(&composite), build(&flattened));
    }
}
