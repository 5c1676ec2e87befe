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

//! Classification of the effect an update had on the mirror.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What applying an update (or a whole response) did to the mirror.
///
/// Variants are ordered `None < Value < Structure`; combining two outcomes keeps
/// the stronger one, with `None` as the identity.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateOutcome {
    /// Nothing changed.
    #[default]
    None,
    /// An existing leaf received a different value.
    Value,
    /// A previously absent tree child, list instance or leaf was created.
    Structure,
}

impl UpdateOutcome {
    /// Strongest-wins combination.
    #[must_use]
    pub fn combine(self, other: UpdateOutcome) -> UpdateOutcome {
        self.max(other)
    }
}

impl fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            UpdateOutcome::None => "no update",
            UpdateOutcome::Value => "value update",
            UpdateOutcome::Structure => "structural update",
        };
        f.write_str(text)
    }
}

impl std::iter::Sum for UpdateOutcome {
    fn sum<I: Iterator<Item = UpdateOutcome>>(iter: I) -> Self {
        iter.fold(UpdateOutcome::None, UpdateOutcome::combine)
    }
}
