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

//! Read-only positions within one incoming update.
//!
//! A [`PathCursor`] walks the update path element by element; once the path is
//! exhausted a composite value is continued by [`ValueCursor`]s over the decoded
//! JSON document. Each cursor knows which node variant belongs at its position,
//! so the tree never has to guess when it creates a node.

use crate::error::{MirrorError, Violation};
use crate::observability::events;
use crate::outcome::UpdateOutcome;
use crate::path::{Path, PathElement};
use crate::tree::{ConfigList, ConfigNode};
use crate::wire::{Notification, SubscribeResponse, TypedValue};
use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::trace;

const COMPONENT: &str = "tree_cursor";

pub trait UpdateCursor<'u> {
    /// Empty node of the variant this position requires.
    fn blank(&self) -> Result<ConfigNode, Violation>;

    /// What the node at this position has to do with the update.
    fn step(&self) -> Result<Step<'u>, Violation>;
}

pub enum Step<'u> {
    /// Store the payload in a value node.
    Store(TypedValue),
    /// Continue into the selected children.
    Descend(Vec<Branch<'u>>),
}

pub struct Branch<'u> {
    pub selector: Selector<'u>,
    pub cursor: Box<dyn UpdateCursor<'u> + 'u>,
}

#[derive(Clone, Copy, Debug)]
pub enum Selector<'u> {
    /// Named child of a tree node.
    Child(&'u str),
    /// Instance of a list node, by key values.
    Instance(&'u IndexMap<String, String>),
}

#[derive(Clone, Copy, Debug)]
enum Position {
    /// At a node whose child named by element `i` is next.
    Element(usize),
    /// At the list created for keyed element `i`.
    Instance(usize),
}

#[derive(Clone, Copy, Debug)]
pub struct PathCursor<'u> {
    elements: &'u [PathElement],
    value: &'u TypedValue,
    position: Position,
}

impl<'u> PathCursor<'u> {
    pub fn new(path: &'u Path, value: &'u TypedValue) -> Self {
        Self {
            elements: path.elements(),
            value,
            position: Position::Element(0),
        }
    }

    fn at(&self, position: Position) -> Box<dyn UpdateCursor<'u> + 'u> {
        Box::new(PathCursor { position, ..*self })
    }

    fn destination(&self) -> Option<ValueCursor<'u>> {
        let value: &'u TypedValue = self.value;
        value.composite().map(ValueCursor::new)
    }
}

impl<'u> UpdateCursor<'u> for PathCursor<'u> {
    fn blank(&self) -> Result<ConfigNode, Violation> {
        match self.position {
            Position::Instance(index) => Ok(ConfigNode::List(ConfigList::new(
                self.elements[index].keys.keys().cloned().collect(),
            ))),
            Position::Element(index) if index < self.elements.len() => Ok(ConfigNode::default()),
            Position::Element(_) => match self.destination() {
                Some(document) => document.blank(),
                None => Ok(ConfigNode::Value(self.value.normalized())),
            },
        }
    }

    fn step(&self) -> Result<Step<'u>, Violation> {
        let elements: &'u [PathElement] = self.elements;
        let branch = match self.position {
            Position::Instance(index) => Branch {
                selector: Selector::Instance(&elements[index].keys),
                cursor: self.at(Position::Element(index + 1)),
            },
            Position::Element(index) => match elements.get(index) {
                Some(element) if element.is_keyed() => Branch {
                    selector: Selector::Child(&element.name),
                    cursor: self.at(Position::Instance(index)),
                },
                Some(element) => Branch {
                    selector: Selector::Child(&element.name),
                    cursor: self.at(Position::Element(index + 1)),
                },
                None => {
                    return match self.destination() {
                        Some(document) => document.step(),
                        None => Ok(Step::Store(self.value.normalized())),
                    }
                }
            },
        };
        Ok(Step::Descend(vec![branch]))
    }
}

/// Position inside a decoded JSON document.
///
/// Objects are unfolded member by member; member names qualified with a YANG
/// module (`module:name`) are stored by their local name. Arrays are rejected.
#[derive(Clone, Copy, Debug)]
pub struct ValueCursor<'u> {
    json: &'u JsonValue,
}

impl<'u> ValueCursor<'u> {
    pub fn new(json: &'u JsonValue) -> Self {
        Self { json }
    }
}

fn local_name(member: &str) -> &str {
    member.rsplit_once(':').map_or(member, |(_, local)| local)
}

impl<'u> UpdateCursor<'u> for ValueCursor<'u> {
    fn blank(&self) -> Result<ConfigNode, Violation> {
        match self.json {
            JsonValue::Object(_) => Ok(ConfigNode::default()),
            JsonValue::Array(_) => Err(Violation::UnfoldedArray),
            scalar => Ok(ConfigNode::Value(TypedValue::from_json_scalar(scalar))),
        }
    }

    fn step(&self) -> Result<Step<'u>, Violation> {
        let json: &'u JsonValue = self.json;
        match json {
            JsonValue::Object(members) => Ok(Step::Descend(
                members
                    .iter()
                    .map(|(name, member)| Branch {
                        selector: Selector::Child(local_name(name)),
                        cursor: Box::new(ValueCursor::new(member)),
                    })
                    .collect(),
            )),
            JsonValue::Array(_) => Err(Violation::UnfoldedArray),
            scalar => Ok(Step::Store(TypedValue::from_json_scalar(scalar))),
        }
    }
}

/// Applies a single update at `path` and requires an outcome of at least `minimal`.
pub fn apply_update(
    root: &mut ConfigNode,
    path: &Path,
    value: &TypedValue,
    minimal: UpdateOutcome,
) -> Result<UpdateOutcome, MirrorError> {
    let outcome = root
        .apply(&PathCursor::new(path, value))
        .map_err(|violation| MirrorError::violation(path, violation))?;

    trace!(
        event = events::UPDATE_APPLIED,
        component = COMPONENT,
        path = %path,
        outcome = %outcome,
        "update applied"
    );

    if outcome < minimal {
        return Err(MirrorError::violation(
            path,
            Violation::WeakerOutcome {
                required: minimal,
                observed: outcome,
                value: value.to_string(),
            },
        ));
    }
    Ok(outcome)
}

/// Applies every update of `notification`, each relative to its prefix.
pub fn apply_notification(
    root: &mut ConfigNode,
    notification: &Notification,
    minimal: UpdateOutcome,
) -> Result<UpdateOutcome, MirrorError> {
    let prefix = notification.prefix.as_ref();
    notification
        .updates
        .iter()
        .try_fold(UpdateOutcome::None, |outcome, update| {
            let path = update.path.prefixed(prefix);
            Ok(outcome.combine(apply_update(root, &path, &update.value, minimal)?))
        })
}

/// Accumulated effect of one response on a mirror.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AppliedResponse {
    pub updates: usize,
    pub outcome: UpdateOutcome,
}

impl AppliedResponse {
    pub fn has_updates(&self) -> bool {
        self.updates > 0
    }
}

/// Applies a response; the sync marker applies nothing.
pub fn apply_response(
    root: &mut ConfigNode,
    response: &SubscribeResponse,
    minimal: UpdateOutcome,
) -> Result<AppliedResponse, MirrorError> {
    match response {
        SubscribeResponse::Update(notification) => Ok(AppliedResponse {
            updates: notification.updates.len(),
            outcome: apply_notification(root, notification, minimal)?,
        }),
        SubscribeResponse::SyncResponse => Ok(AppliedResponse::default()),
    }
}
