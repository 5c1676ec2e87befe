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

use crate::outcome::UpdateOutcome;
use crate::path::Path;
use crate::wire::Encoding;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CLOSE_GRACE_MS: u64 = 2000;

/// Settings threaded into a [`crate::SubscriptionMirror`]; every field is optional
/// in the serialized form.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields, default)]
pub struct MirrorConfig {
    /// Used when `subscribe` is not given an encoding.
    pub default_encoding: Encoding,
    /// Prefix of every subscription list; root means none.
    pub prefix: Path,
    /// Bound on joining the stream worker during `close`.
    pub close_grace_ms: u64,
    /// Minimum outcome of every update applied to a freshly built mirror.
    pub fresh_mirror_requirement: UpdateOutcome,
    pub on_change: OnChangePolicy,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            default_encoding: Encoding::JsonIetf,
            prefix: Path::root(),
            close_grace_ms: DEFAULT_CLOSE_GRACE_MS,
            fresh_mirror_requirement: UpdateOutcome::Structure,
            on_change: OnChangePolicy::default(),
        }
    }
}

impl MirrorConfig {
    pub fn close_grace(&self) -> Duration {
        Duration::from_millis(self.close_grace_ms)
    }

    pub(crate) fn subscription_prefix(&self) -> Option<Path> {
        (!self.prefix.is_root()).then(|| self.prefix.clone())
    }
}

/// Conformance demanded from updates received after the initial sync.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields, default)]
pub struct OnChangePolicy {
    pub minimum: UpdateOutcome,
    /// Reject updates that add nodes to the mirror.
    pub forbid_structure: bool,
}
