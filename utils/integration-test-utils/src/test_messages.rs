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

use gnmi_mirror::{Notification, Path, TypedValue, Update};

pub fn path(text: &str) -> Path {
    text.parse()
        .unwrap_or_else(|err| panic!("invalid test path {text:?}: {err}"))
}

/// Notification without prefix carrying one update per `(path, value)` pair.
pub fn notification(updates: &[(&str, TypedValue)]) -> Notification {
    Notification {
        timestamp: 0,
        prefix: None,
        updates: updates
            .iter()
            .map(|(at, value)| Update::new(path(at), value.clone()))
            .collect(),
    }
}

pub fn notification_with_prefix(prefix: &str, updates: &[(&str, TypedValue)]) -> Notification {
    Notification {
        prefix: Some(path(prefix)),
        ..notification(updates)
    }
}
