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

//! # gnmi-mirror
//!
//! `gnmi-mirror` consumes a gNMI Subscribe stream and rebuilds the subscribed
//! configuration as an in-memory tree, the *mirror*, so that a device's
//! streaming behavior can be checked for conformance: initial sync, on-change
//! updates, periodic samples and expected coverage.
//!
//! Typical usage goes through [`SubscriptionMirror`] with any [`GnmiTransport`]:
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use gnmi_mirror::{MirrorConfig, SubscriptionMirror, SubscriptionMode, TypedValue};
//! use integration_test_utils::{notification, ScriptedTransport};
//!
//! let transport = Arc::new(ScriptedTransport::new());
//! transport.push_update(notification(&[(
//!     "/system/config/hostname",
//!     TypedValue::StringVal("r1".to_string()),
//! )]));
//! transport.push_sync();
//!
//! let mut mirror = SubscriptionMirror::new(transport, MirrorConfig::default());
//! mirror
//!     .subscribe(&["/system".parse().unwrap()], SubscriptionMode::Stream, None, None)
//!     .unwrap();
//! let tree = mirror.await_initial_sync(Duration::from_secs(5)).unwrap();
//! assert!(tree.lookup(&"/system/config/hostname".parse().unwrap()).is_some());
//! mirror.close();
//! ```
//!
//! ## Layout
//!
//! - [`tree`] holds the mirror itself and the cursors that translate a path-keyed
//!   update into tree descent.
//! - [`session`] owns the stream: one worker thread per subscription, connected
//!   to the caller by two queues.
//! - [`SubscriptionMirror`] orchestrates the phases of one subscription.
//!
//! ## Observability
//!
//! The crate emits `tracing` events only and never installs a subscriber. Every
//! event carries `event` and `component`; names live in [`observability`].

pub mod config;
pub mod error;
pub mod mirror;
pub mod observability;
pub mod outcome;
pub mod path;
pub mod session;
pub mod transport;
pub mod tree;
pub mod wire;

pub use config::{MirrorConfig, OnChangePolicy};
pub use error::{MirrorError, Violation};
pub use mirror::SubscriptionMirror;
pub use outcome::UpdateOutcome;
pub use path::{Path, PathElement, PathParseError};
pub use session::{Responses, SessionState, StreamSession};
pub use transport::{GnmiTransport, RequestStream, ResponseStream, StatusCode, TransportError};
pub use tree::coverage::{ExpectedPaths, OmissionReport, MAX_REPORTED_OMISSIONS};
pub use tree::cursor::{apply_notification, apply_response, apply_update, AppliedResponse};
pub use tree::{ConfigList, ConfigNode, NodeKind};
pub use wire::{
    Encoding, Notification, StreamMode, StreamPolicy, SubscribeRequest, SubscribeResponse,
    Subscription, SubscriptionList, SubscriptionMode, TypedValue, Update,
};
