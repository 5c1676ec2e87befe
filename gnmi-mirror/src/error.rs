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
use crate::path::PathParseError;
use crate::transport::TransportError;
use crate::tree::coverage::OmissionReport;
use crate::tree::NodeKind;
use std::time::Duration;
use thiserror::Error;

/// A stream item that does not conform to the subscription protocol.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Violation {
    #[error("{}", weaker_outcome_message(.required, .observed, .value))]
    WeakerOutcome {
        required: UpdateOutcome,
        observed: UpdateOutcome,
        value: String,
    },
    #[error("array found where an object or a scalar was required")]
    UnfoldedArray,
    #[error("expected a {expected} node, found a {found} node")]
    ShapeMismatch { expected: NodeKind, found: NodeKind },
    #[error("list keyed by {expected:?} addressed with keys {found:?}")]
    KeyFieldMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("structural update received after sync: {value}")]
    StructuralChange { value: String },
    #[error("aggregated value received: {value}")]
    Aggregated { value: String },
    #[error("response carries {count} update(s); leaves must arrive separately")]
    SingleUpdateResponse { count: usize },
}

fn weaker_outcome_message(
    required: &UpdateOutcome,
    observed: &UpdateOutcome,
    value: &str,
) -> String {
    match required {
        UpdateOutcome::Structure => {
            format!("expected structural update, received {observed}: {value}")
        }
        _ => format!("received non-update: {value}"),
    }
}

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("protocol violation at {path}: {violation}")]
    ProtocolViolation { path: String, violation: Violation },
    #[error("timed out after {waited:?}: {context}")]
    Timeout { context: String, waited: Duration },
    #[error("stream ended without a sync marker: {context}")]
    SyncMissing { context: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("elements not covered by initial updates: {0}")]
    MissingElements(OmissionReport),
    #[error("no subscription is active")]
    NotSubscribed,
    #[error("initial sync has not completed")]
    NotSynchronized,
    #[error("subscription session is closed")]
    SessionClosed,
    #[error("unable to spawn the stream worker: {0}")]
    Spawn(#[from] std::io::Error),
    #[error(transparent)]
    InvalidPath(#[from] PathParseError),
}

impl MirrorError {
    pub(crate) fn violation(path: impl ToString, violation: Violation) -> Self {
        MirrorError::ProtocolViolation {
            path: path.to_string(),
            violation,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, MirrorError::Timeout { .. })
    }

    /// Relabels a timeout with the phase that was waiting.
    pub(crate) fn in_phase(self, phase: &str) -> Self {
        match self {
            MirrorError::Timeout { waited, .. } => MirrorError::Timeout {
                context: phase.to_string(),
                waited,
            },
            other => other,
        }
    }
}
