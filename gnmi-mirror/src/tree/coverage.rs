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

//! Checks that a mirror contains the elements a device is expected to report.

use crate::error::MirrorError;
use crate::observability::events;
use crate::path::{Path, PathElement, PathParseError};
use crate::tree::ConfigNode;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

/// Upper bound on the omissions listed by name in an [`OmissionReport`].
pub const MAX_REPORTED_OMISSIONS: usize = 10;

const COMPONENT: &str = "expected_paths";

/// Base paths mapped to subpaths that must exist below every instance the base
/// path resolves to. Unkeyed list elements resolve to all instances.
///
/// ```json5
/// {
///     "/interfaces/interface": ["config/name", "state/oper-status"],
///     "/system/config": [""],
/// }
/// ```
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExpectedPaths(BTreeMap<String, Vec<String>>);

impl ExpectedPaths {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, base: impl Into<String>, subpaths: &[&str]) -> Self {
        self.0
            .entry(base.into())
            .or_default()
            .extend(subpaths.iter().map(|subpath| subpath.to_string()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Base paths, suitable as subscription paths.
    pub fn base_paths(&self) -> Result<Vec<Path>, PathParseError> {
        self.0.keys().map(|base| base.parse()).collect()
    }

    /// Every missing element, labelled by the path walked so far.
    pub fn omissions(&self, mirror: &ConfigNode) -> Result<BTreeSet<String>, PathParseError> {
        let mut walk = Walk::default();
        for (base, subpaths) in &self.0 {
            let base: Path = base.parse()?;
            let subpaths = subpaths
                .iter()
                .map(|subpath| subpath.parse())
                .collect::<Result<Vec<Path>, _>>()?;

            let mut found = Vec::new();
            walk.resolve(String::new(), base.elements(), mirror, &mut found);
            debug!(
                event = events::EXPECTED_PATHS_RESOLVED,
                component = COMPONENT,
                base = %base,
                instances = found.len(),
                "resolved base path"
            );

            for (trail, instance) in found {
                for subpath in &subpaths {
                    walk.resolve(trail.clone(), subpath.elements(), instance, &mut Vec::new());
                }
            }
        }
        Ok(walk.missing)
    }

    /// Fails with a bounded report when anything is missing.
    pub fn verify(&self, mirror: &ConfigNode) -> Result<(), MirrorError> {
        let omissions = self.omissions(mirror)?;
        if omissions.is_empty() {
            return Ok(());
        }
        Err(MirrorError::MissingElements(OmissionReport::new(omissions)))
    }
}

#[derive(Default)]
struct Walk {
    missing: BTreeSet<String>,
}

impl Walk {
    fn resolve<'n>(
        &mut self,
        trail: String,
        elements: &[PathElement],
        node: &'n ConfigNode,
        found: &mut Vec<(String, &'n ConfigNode)>,
    ) {
        if let ConfigNode::List(list) = node {
            for (_, instance) in list.instances() {
                self.resolve(trail.clone(), elements, instance, found);
            }
            return;
        }
        let Some((element, rest)) = elements.split_first() else {
            found.push((trail, node));
            return;
        };

        let here = format!("{trail}/{}", element.name);
        let Some(child) = node.child(&element.name) else {
            self.missing.insert(here);
            return;
        };
        match child {
            ConfigNode::List(list) if element.is_keyed() => {
                match list
                    .key_tuple(&element.keys)
                    .ok()
                    .and_then(|key| list.instances.get(&key))
                {
                    Some(instance) => self.resolve(format!("{trail}/{element}"), rest, instance, found),
                    None => {
                        self.missing.insert(format!("{trail}/{element}"));
                    }
                }
            }
            _ if element.is_keyed() => {
                self.missing.insert(format!("{trail}/{element}"));
            }
            child => self.resolve(here, rest, child, found),
        }
    }
}

/// Missing elements, at most [`MAX_REPORTED_OMISSIONS`] of them listed by name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OmissionReport {
    listed: Vec<String>,
    total: usize,
}

impl OmissionReport {
    pub fn new(omissions: BTreeSet<String>) -> Self {
        let total = omissions.len();
        Self {
            listed: omissions.into_iter().take(MAX_REPORTED_OMISSIONS).collect(),
            total,
        }
    }

    pub fn listed(&self) -> &[String] {
        &self.listed
    }

    pub fn total(&self) -> usize {
        self.total
    }
}

impl fmt::Display for OmissionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.listed.join(", "))?;
        if self.total > self.listed.len() {
            write!(f, ", ... (in total {} elements missing)", self.total)?;
        }
        Ok(())
    }
}
