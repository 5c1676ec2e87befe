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

//! Mirror of the subscribed configuration, rebuilt from path-keyed updates.
//!
//! Nodes are created lazily by the first update reaching them and are never pruned.
//! Which variant a new node gets is decided by the [`cursor`] driving the update;
//! [`ConfigNode::apply`] only creates, delegates and combines outcomes.

pub mod coverage;
pub mod cursor;

use crate::error::Violation;
use crate::outcome::UpdateOutcome;
use crate::path::Path;
use crate::wire::TypedValue;
use cursor::{Branch, Selector, Step, UpdateCursor};
use indexmap::IndexMap;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum NodeKind {
    Tree,
    List,
    Value,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Tree => "tree",
            NodeKind::List => "list",
            NodeKind::Value => "value",
        })
    }
}

/// Keyed list: instances addressed by key values, positional per `key_fields`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigList {
    key_fields: Vec<String>,
    instances: BTreeMap<Vec<String>, ConfigNode>,
}

impl ConfigList {
    pub fn new(key_fields: Vec<String>) -> Self {
        Self {
            key_fields,
            instances: BTreeMap::new(),
        }
    }

    pub fn key_fields(&self) -> &[String] {
        &self.key_fields
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn instances(&self) -> impl Iterator<Item = (&[String], &ConfigNode)> {
        self.instances
            .iter()
            .map(|(key, instance)| (key.as_slice(), instance))
    }

    pub fn instance(&self, key: &[&str]) -> Option<&ConfigNode> {
        let key: Vec<String> = key.iter().map(|value| value.to_string()).collect();
        self.instances.get(&key)
    }

    /// Orders `keys` by this list's key fields; the field sets must be identical.
    pub(crate) fn key_tuple(
        &self,
        keys: &IndexMap<String, String>,
    ) -> Result<Vec<String>, Violation> {
        let mismatch = || Violation::KeyFieldMismatch {
            expected: self.key_fields.clone(),
            found: keys.keys().cloned().collect(),
        };
        if keys.len() != self.key_fields.len() {
            return Err(mismatch());
        }
        self.key_fields
            .iter()
            .map(|field| keys.get(field).cloned().ok_or_else(mismatch))
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigNode {
    Tree(BTreeMap<String, ConfigNode>),
    List(ConfigList),
    Value(TypedValue),
}

impl Default for ConfigNode {
    fn default() -> Self {
        ConfigNode::Tree(BTreeMap::new())
    }
}

impl ConfigNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            ConfigNode::Tree(_) => NodeKind::Tree,
            ConfigNode::List(_) => NodeKind::List,
            ConfigNode::Value(_) => NodeKind::Value,
        }
    }

    pub fn child(&self, name: &str) -> Option<&ConfigNode> {
        match self {
            ConfigNode::Tree(children) => children.get(name),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ConfigList> {
        match self {
            ConfigNode::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&TypedValue> {
        match self {
            ConfigNode::Value(value) => Some(value),
            _ => None,
        }
    }

    /// True for a tree without children.
    pub fn is_empty(&self) -> bool {
        matches!(self, ConfigNode::Tree(children) if children.is_empty())
    }

    /// Follows `path` from this node; keyed elements select a list instance.
    pub fn lookup(&self, path: &Path) -> Option<&ConfigNode> {
        let mut node = self;
        for element in path.elements() {
            node = node.child(&element.name)?;
            if element.is_keyed() {
                let list = node.as_list()?;
                let key = list.key_tuple(&element.keys).ok()?;
                node = list.instances.get(&key)?;
            }
        }
        Some(node)
    }

    /// Applies the update described by `cursor`, which must be positioned at this
    /// node, and returns the strongest outcome observed along the descent.
    pub fn apply<'u>(&mut self, cursor: &dyn UpdateCursor<'u>) -> Result<UpdateOutcome, Violation> {
        match cursor.step()? {
            Step::Store(payload) => match self {
                ConfigNode::Value(current) if *current == payload => Ok(UpdateOutcome::None),
                ConfigNode::Value(current) => {
                    *current = payload;
                    Ok(UpdateOutcome::Value)
                }
                other => Err(Violation::ShapeMismatch {
                    expected: NodeKind::Value,
                    found: other.kind(),
                }),
            },
            Step::Descend(branches) => {
                let mut outcome = UpdateOutcome::None;
                for branch in branches {
                    outcome = outcome.combine(self.descend(branch)?);
                }
                Ok(outcome)
            }
        }
    }

    fn descend(&mut self, branch: Branch<'_>) -> Result<UpdateOutcome, Violation> {
        let Branch { selector, cursor } = branch;
        let (child, created) = match (selector, self) {
            (Selector::Child(name), ConfigNode::Tree(children)) => {
                match children.entry(name.to_string()) {
                    Entry::Occupied(entry) => (entry.into_mut(), false),
                    Entry::Vacant(entry) => (entry.insert(cursor.blank()?), true),
                }
            }
            (Selector::Instance(keys), ConfigNode::List(list)) => {
                let key = list.key_tuple(keys)?;
                match list.instances.entry(key) {
                    Entry::Occupied(entry) => (entry.into_mut(), false),
                    Entry::Vacant(entry) => (entry.insert(cursor.blank()?), true),
                }
            }
            (Selector::Child(_), other) => {
                return Err(Violation::ShapeMismatch {
                    expected: NodeKind::Tree,
                    found: other.kind(),
                })
            }
            (Selector::Instance(_), other) => {
                return Err(Violation::ShapeMismatch {
                    expected: NodeKind::List,
                    found: other.kind(),
                })
            }
        };

        let outcome = child.apply(cursor.as_ref())?;
        Ok(if created {
            outcome.combine(UpdateOutcome::Structure)
        } else {
            outcome
        })
    }

    /// Structural containment: every tree child and list instance of `self` is
    /// present in `other` (recursively). Leaf values are ignored.
    pub fn covered_by(&self, other: &ConfigNode) -> Result<bool, Violation> {
        match (self, other) {
            (ConfigNode::Tree(mine), ConfigNode::Tree(theirs)) => {
                for (name, child) in mine {
                    match theirs.get(name) {
                        Some(their_child) if child.covered_by(their_child)? => {}
                        _ => return Ok(false),
                    }
                }
                Ok(true)
            }
            (ConfigNode::List(mine), ConfigNode::List(theirs)) => {
                if mine.key_fields != theirs.key_fields {
                    return Err(Violation::KeyFieldMismatch {
                        expected: mine.key_fields.clone(),
                        found: theirs.key_fields.clone(),
                    });
                }
                for (key, instance) in &mine.instances {
                    match theirs.instances.get(key) {
                        Some(their_instance) if instance.covered_by(their_instance)? => {}
                        _ => return Ok(false),
                    }
                }
                Ok(true)
            }
            (ConfigNode::Value(_), ConfigNode::Value(_)) => Ok(true),
            (mine, theirs) => Err(Violation::ShapeMismatch {
                expected: mine.kind(),
                found: theirs.kind(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigNode, NodeKind};
    use crate::error::{MirrorError, Violation};
    use crate::outcome::UpdateOutcome;
    use crate::path::Path;
    use crate::tree::cursor::apply_update;
    use crate::wire::TypedValue;
    use serde_json::json;

    fn path(text: &str) -> Path {
        text.parse().expect("valid test path")
    }

    fn string(text: &str) -> TypedValue {
        TypedValue::StringVal(text.to_string())
    }

    fn apply(root: &mut ConfigNode, at: &str, value: TypedValue) -> UpdateOutcome {
        apply_update(root, &path(at), &value, UpdateOutcome::None).expect("update applies")
    }

    fn violation(result: Result<UpdateOutcome, MirrorError>) -> Violation {
        match result {
            Err(MirrorError::ProtocolViolation { violation, .. }) => violation,
            other => panic!("expected a protocol violation, got {other:?}"),
        }
    }

    #[test]
    fn first_update_is_structural_then_none_then_value() {
        let mut root = ConfigNode::default();

        assert_eq!(apply(&mut root, "/a/b", string("x")), UpdateOutcome::Structure);
        assert_eq!(apply(&mut root, "/a/b", string("x")), UpdateOutcome::None);
        assert_eq!(apply(&mut root, "/a/b", string("y")), UpdateOutcome::Value);
        assert_eq!(
            root.lookup(&path("/a/b")).and_then(ConfigNode::value),
            Some(&string("y"))
        );
    }

    #[test]
    fn keyed_elements_build_one_list_with_instances() {
        let mut root = ConfigNode::default();
        apply(&mut root, "/list[name=eth0]/mtu", TypedValue::UintVal(1500));
        apply(&mut root, "/list[name=eth1]/mtu", TypedValue::UintVal(9000));

        let list = root
            .child("list")
            .and_then(ConfigNode::as_list)
            .expect("list node");
        assert_eq!(list.key_fields(), ["name".to_string()]);
        assert_eq!(list.len(), 2);
        assert!(list.instance(&["eth0"]).is_some());
        assert!(list.instance(&["eth1"]).is_some());

        let mut partial = ConfigNode::default();
        apply(&mut partial, "/list[name=eth0]/mtu", TypedValue::UintVal(1500));
        assert_eq!(root.covered_by(&partial), Ok(false));
        assert_eq!(partial.covered_by(&root), Ok(true));
    }

    #[test]
    fn new_instance_in_existing_list_is_structural() {
        let mut root = ConfigNode::default();
        apply(&mut root, "/list[name=eth0]/mtu", TypedValue::UintVal(1500));

        assert_eq!(
            apply(&mut root, "/list[name=eth1]/mtu", TypedValue::UintVal(1500)),
            UpdateOutcome::Structure
        );
    }

    #[test]
    fn multi_key_lists_are_order_independent() {
        let mut root = ConfigNode::default();
        apply(&mut root, "/route[prefix=10.0.0.0/8][vrf=red]/metric", TypedValue::IntVal(1));

        assert_eq!(
            apply(&mut root, "/route[vrf=red][prefix=10.0.0.0/8]/metric", TypedValue::IntVal(1)),
            UpdateOutcome::None
        );
        let list = root.child("route").and_then(ConfigNode::as_list).unwrap();
        assert_eq!(list.key_fields(), ["prefix".to_string(), "vrf".to_string()]);
        assert!(list.instance(&["10.0.0.0/8", "red"]).is_some());
    }

    #[test]
    fn list_key_fields_are_fixed_at_creation() {
        let mut root = ConfigNode::default();
        apply(&mut root, "/list[name=eth0]/mtu", TypedValue::UintVal(1500));

        let mismatch = violation(apply_update(
            &mut root,
            &path("/list[id=7]/mtu"),
            &TypedValue::UintVal(1500),
            UpdateOutcome::None,
        ));
        assert!(matches!(mismatch, Violation::KeyFieldMismatch { .. }));

        let extra = violation(apply_update(
            &mut root,
            &path("/list[name=eth0][id=7]/mtu"),
            &TypedValue::UintVal(1500),
            UpdateOutcome::None,
        ));
        assert!(matches!(extra, Violation::KeyFieldMismatch { .. }));
    }

    #[test]
    fn variant_at_a_position_is_stable() {
        let mut root = ConfigNode::default();
        apply(&mut root, "/a/b", string("x"));

        let below_leaf = violation(apply_update(
            &mut root,
            &path("/a/b/c"),
            &string("x"),
            UpdateOutcome::None,
        ));
        assert_eq!(
            below_leaf,
            Violation::ShapeMismatch {
                expected: NodeKind::Tree,
                found: NodeKind::Value
            }
        );

        let leaf_on_tree = violation(apply_update(
            &mut root,
            &path("/a"),
            &string("x"),
            UpdateOutcome::None,
        ));
        assert_eq!(
            leaf_on_tree,
            Violation::ShapeMismatch {
                expected: NodeKind::Value,
                found: NodeKind::Tree
            }
        );

        let keyed_on_tree = violation(apply_update(
            &mut root,
            &path("/a[name=x]/b"),
            &string("x"),
            UpdateOutcome::None,
        ));
        assert_eq!(
            keyed_on_tree,
            Violation::ShapeMismatch {
                expected: NodeKind::List,
                found: NodeKind::Tree
            }
        );
    }

    #[test]
    fn composite_values_converge_with_flattened_updates() {
        let mut composite = ConfigNode::default();
        let outcome = apply(
            &mut composite,
            "/interfaces/interface[name=eth0]",
            TypedValue::JsonIetfVal(json!({
                "config": {"name": "eth0", "mtu": 1500, "enabled": true}
            })),
        );
        assert_eq!(outcome, UpdateOutcome::Structure);

        let mut flattened = ConfigNode::default();
        apply(
            &mut flattened,
            "/interfaces/interface[name=eth0]/config/name",
            string("eth0"),
        );
        apply(
            &mut flattened,
            "/interfaces/interface[name=eth0]/config/mtu",
            TypedValue::IntVal(1500),
        );
        apply(
            &mut flattened,
            "/interfaces/interface[name=eth0]/config/enabled",
            TypedValue::JsonIetfVal(json!(true)),
        );

        assert_eq!(composite, flattened);
    }

    #[test]
    fn reapplying_an_equal_composite_is_a_no_op() {
        let mut root = ConfigNode::default();
        let value = TypedValue::JsonVal(json!({"state": {"oper-status": "UP"}}));
        apply(&mut root, "/interfaces/interface[name=eth0]", value.clone());

        assert_eq!(
            apply(&mut root, "/interfaces/interface[name=eth0]", value),
            UpdateOutcome::None
        );
        assert_eq!(
            apply(
                &mut root,
                "/interfaces/interface[name=eth0]",
                TypedValue::JsonVal(json!({"state": {"oper-status": "DOWN"}}))
            ),
            UpdateOutcome::Value
        );
    }

    #[test]
    fn module_qualified_members_are_stored_by_local_name() {
        let mut root = ConfigNode::default();
        apply(
            &mut root,
            "/",
            TypedValue::JsonIetfVal(json!({"openconfig-system:system": {"config": {"hostname": "r1"}}})),
        );

        assert!(root.lookup(&path("/system/config/hostname")).is_some());
    }

    #[test]
    fn arrays_are_never_unfolded() {
        let mut root = ConfigNode::default();
        let nested = violation(apply_update(
            &mut root,
            &path("/a"),
            &TypedValue::JsonIetfVal(json!({"b": {"c": [1, 2]}})),
            UpdateOutcome::None,
        ));
        assert_eq!(nested, Violation::UnfoldedArray);

        let top_level = violation(apply_update(
            &mut root,
            &path("/x"),
            &TypedValue::JsonVal(json!(["a", "b"])),
            UpdateOutcome::None,
        ));
        assert_eq!(top_level, Violation::UnfoldedArray);
    }

    #[test]
    fn weaker_outcome_than_required_is_a_violation() {
        let mut root = ConfigNode::default();
        apply(&mut root, "/a/b", string("x"));

        let repeated = violation(apply_update(
            &mut root,
            &path("/a/b"),
            &string("y"),
            UpdateOutcome::Structure,
        ));
        assert_eq!(
            repeated,
            Violation::WeakerOutcome {
                required: UpdateOutcome::Structure,
                observed: UpdateOutcome::Value,
                value: string("y").to_string(),
            }
        );

        let unchanged = violation(apply_update(
            &mut root,
            &path("/a/b"),
            &string("y"),
            UpdateOutcome::Value,
        ));
        assert!(matches!(
            unchanged,
            Violation::WeakerOutcome {
                observed: UpdateOutcome::None,
                ..
            }
        ));
    }

    #[test]
    fn coverage_ignores_values_but_not_shape() {
        let mut left = ConfigNode::default();
        apply(&mut left, "/a/b", string("x"));
        let mut right = ConfigNode::default();
        apply(&mut right, "/a/b", string("other"));
        apply(&mut right, "/a/c", string("extra"));

        assert_eq!(left.covered_by(&right), Ok(true));
        assert_eq!(right.covered_by(&left), Ok(false));
        assert_eq!(ConfigNode::default().covered_by(&left), Ok(true));
    }

    #[test]
    fn coverage_between_different_variants_is_an_error() {
        let mut left = ConfigNode::default();
        apply(&mut left, "/a/b", string("x"));
        let mut right = ConfigNode::default();
        apply(&mut right, "/a/b/c", string("x"));

        assert_eq!(
            left.covered_by(&right),
            Err(Violation::ShapeMismatch {
                expected: NodeKind::Value,
                found: NodeKind::Tree
            })
        );
    }
}
