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

//! Subscription lifecycle over one [`StreamSession`].

use crate::config::{MirrorConfig, OnChangePolicy};
use crate::error::{MirrorError, Violation};
use crate::observability::events;
use crate::outcome::UpdateOutcome;
use crate::path::Path;
use crate::session::StreamSession;
use crate::transport::GnmiTransport;
use crate::tree::coverage::ExpectedPaths;
use crate::tree::cursor::{apply_response, apply_update};
use crate::tree::ConfigNode;
use crate::wire::{
    Encoding, StreamPolicy, SubscribeRequest, SubscribeResponse, SubscriptionList,
    SubscriptionMode, TypedValue,
};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const COMPONENT: &str = "subscription_mirror";

/// Drives one subscription at a time and keeps the mirror of its initial phase.
///
/// All waits are bounded by explicit timeouts. A timeout never cancels the
/// stream; only [`SubscriptionMirror::close`] (or a new `subscribe`) does.
pub struct SubscriptionMirror {
    transport: Arc<dyn GnmiTransport>,
    config: MirrorConfig,
    session: Option<StreamSession>,
    /// Encoding requested by the active subscription.
    encoding: Option<Encoding>,
    /// Belongs to the active session only.
    mirror: Option<ConfigNode>,
}

impl SubscriptionMirror {
    pub fn new(transport: Arc<dyn GnmiTransport>, config: MirrorConfig) -> Self {
        Self {
            transport,
            config,
            session: None,
            encoding: None,
            mirror: None,
        }
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Mirror built by the last completed initial phase.
    pub fn mirror(&self) -> Option<&ConfigNode> {
        self.mirror.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut StreamSession> {
        self.session.as_mut()
    }

    /// Opens a new stream, closing the previous one first. The mirror of the
    /// previous stream is discarded.
    ///
    /// `stream` only applies to [`SubscriptionMode::Stream`].
    pub fn subscribe(
        &mut self,
        paths: &[Path],
        mode: SubscriptionMode,
        encoding: Option<Encoding>,
        stream: Option<StreamPolicy>,
    ) -> Result<(), MirrorError> {
        self.close();
        self.mirror = None;
        self.encoding = None;

        let encoding = encoding.unwrap_or(self.config.default_encoding);
        let request = SubscribeRequest::Subscribe(SubscriptionList::new(
            self.config.subscription_prefix(),
            paths,
            mode,
            encoding,
            stream,
        ));
        let mut session = StreamSession::new(self.transport.clone(), self.config.close_grace());
        session.enqueue(request)?;
        session.start()?;

        info!(
            event = events::MIRROR_SUBSCRIBE,
            component = COMPONENT,
            session_id = session.session_id(),
            paths = paths.len(),
            mode = ?mode,
            encoding = ?encoding,
            "subscribed"
        );
        self.session = Some(session);
        self.encoding = Some(encoding);
        Ok(())
    }

    /// Asks the target for a fresh snapshot of a `POLL` subscription.
    pub fn poll(&mut self) -> Result<(), MirrorError> {
        let session = self.session.as_mut().ok_or(MirrorError::NotSubscribed)?;
        debug!(
            event = events::MIRROR_POLL,
            component = COMPONENT,
            session_id = session.session_id(),
            "polling"
        );
        session.enqueue(SubscribeRequest::Poll)
    }

    /// Builds the mirror from every response up to the sync marker.
    ///
    /// Each update must reach `fresh_mirror_requirement`. Responses after the
    /// marker stay queued.
    pub fn await_initial_sync(&mut self, timeout: Duration) -> Result<&ConfigNode, MirrorError> {
        let minimal = self.config.fresh_mirror_requirement;
        let session = self.session.as_mut().ok_or(MirrorError::NotSubscribed)?;

        let mut mirror = ConfigNode::default();
        let mut synced = false;
        for response in session.drain(timeout) {
            let response = response.map_err(|err| err.in_phase("no sync marker"))?;
            if response.is_sync() {
                synced = true;
                break;
            }
            apply_response(&mut mirror, &response, minimal)?;
        }
        if !synced {
            return Err(MirrorError::SyncMissing {
                context: "initial sync".to_string(),
            });
        }

        info!(
            event = events::MIRROR_INITIAL_SYNC_OK,
            component = COMPONENT,
            session_id = session.session_id(),
            "initial sync complete"
        );
        Ok(self.mirror.insert(mirror))
    }

    /// Applies incremental updates for `window`, stopping early when the stream
    /// ends or no response arrives within `timeout`. Returns whether any update
    /// was observed.
    pub fn await_on_change(
        &mut self,
        timeout: Duration,
        window: Duration,
    ) -> Result<bool, MirrorError> {
        if self.mirror.is_none() {
            self.await_initial_sync(timeout)?;
        }
        let policy = self.config.on_change;
        let (Some(session), Some(mirror)) = (self.session.as_mut(), self.mirror.as_mut()) else {
            return Err(MirrorError::NotSubscribed);
        };

        let deadline = Instant::now() + window;
        let mut observed = false;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let response = match session.drain(remaining.min(timeout)).next() {
                None => break,
                Some(Err(err)) if err.is_timeout() => break,
                Some(Err(err)) => return Err(err),
                Some(Ok(response)) => response,
            };
            if apply_incremental(mirror, &response, policy)? {
                observed = true;
                debug!(
                    event = events::MIRROR_ON_CHANGE_OBSERVED,
                    component = COMPONENT,
                    session_id = session.session_id(),
                    updates = response.updates().len(),
                    "on-change update observed"
                );
            }
        }
        Ok(observed)
    }

    /// Waits for `count` samples, each of which must (possibly across several
    /// responses) cover the initial mirror.
    ///
    /// Returns `false` when the stream ends cleanly before the last sample.
    pub fn await_periodic_coverage(
        &mut self,
        period: Duration,
        count: usize,
        timeout: Duration,
    ) -> Result<bool, MirrorError> {
        if self.mirror.is_none() {
            self.await_initial_sync(timeout)?;
        }
        let minimal = self.config.fresh_mirror_requirement;
        let (Some(session), Some(target)) = (self.session.as_mut(), self.mirror.as_ref()) else {
            return Err(MirrorError::NotSubscribed);
        };

        for sample in 1..=count {
            debug!(
                event = events::MIRROR_PERIODIC_SAMPLE_START,
                component = COMPONENT,
                session_id = session.session_id(),
                sample,
                "waiting for sample"
            );
            let mut candidate = ConfigNode::default();
            let mut wait = period + timeout;
            loop {
                let response = match session.drain(wait).next() {
                    None => return Ok(false),
                    Some(Err(err)) => {
                        let phase = if candidate.is_empty() {
                            format!("no sample {sample} within period")
                        } else {
                            format!("sample {sample} incomplete")
                        };
                        return Err(err.in_phase(&phase));
                    }
                    Some(Ok(response)) => response,
                };
                wait = timeout;
                if response.is_sync() {
                    continue;
                }
                apply_response(&mut candidate, &response, minimal)?;
                if target
                    .covered_by(&candidate)
                    .map_err(|violation| MirrorError::violation(Path::root(), violation))?
                {
                    break;
                }
            }
            debug!(
                event = events::MIRROR_PERIODIC_SAMPLE_COVERED,
                component = COMPONENT,
                session_id = session.session_id(),
                sample,
                "sample covers the initial mirror"
            );
        }
        Ok(true)
    }

    /// True once any response carrying updates arrives; false if the stream
    /// ends first.
    pub fn await_any_update(&mut self, timeout: Duration) -> Result<bool, MirrorError> {
        let session = self.session.as_mut().ok_or(MirrorError::NotSubscribed)?;
        for response in session.drain(timeout) {
            let response = response.map_err(|err| err.in_phase("no update"))?;
            if !response.updates().is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True if the stream ends without delivering anything else.
    pub fn await_stream_closed(&mut self, timeout: Duration) -> Result<bool, MirrorError> {
        let session = self.session.as_mut().ok_or(MirrorError::NotSubscribed)?;
        let closed = match session.drain(timeout).next() {
            None => true,
            Some(Ok(_)) => false,
            Some(Err(err)) if err.is_timeout() => false,
            Some(Err(err)) => return Err(err),
        };
        debug!(
            event = events::MIRROR_STREAM_CLOSED,
            component = COMPONENT,
            session_id = session.session_id(),
            closed,
            "checked for stream end"
        );
        Ok(closed)
    }

    /// Up to the sync marker, rejects updates whose value is an object (or an
    /// array holding objects) instead of a leaf, and responses carrying fewer
    /// than two updates. Only `JSON_IETF` subscriptions are checked.
    pub fn check_updates_not_aggregated(&mut self, timeout: Duration) -> Result<(), MirrorError> {
        let checked = self.encoding == Some(Encoding::JsonIetf);
        let session = self.session.as_mut().ok_or(MirrorError::NotSubscribed)?;
        for response in session.drain(timeout) {
            let response = match response {
                Err(err) if err.is_timeout() => break,
                other => other?,
            };
            let SubscribeResponse::Update(notification) = response else {
                break;
            };
            if !checked {
                continue;
            }
            let prefix = notification.prefix.as_ref();
            for update in &notification.updates {
                if is_aggregated(&update.value) {
                    return Err(MirrorError::violation(
                        update.path.prefixed(prefix),
                        Violation::Aggregated {
                            value: update.value.to_string(),
                        },
                    ));
                }
            }
            if notification.updates.len() < 2 {
                let at = prefix.cloned().unwrap_or_else(Path::root);
                return Err(MirrorError::violation(
                    at,
                    Violation::SingleUpdateResponse {
                        count: notification.updates.len(),
                    },
                ));
            }
        }
        Ok(())
    }

    pub fn verify_expected_paths(&self, expected: &ExpectedPaths) -> Result<(), MirrorError> {
        let mirror = self.mirror.as_ref().ok_or(MirrorError::NotSynchronized)?;
        expected.verify(mirror)
    }

    /// Subscribes on change to the expected base paths, verifies the initial
    /// mirror against them, then requires at least one update within `window`.
    pub fn check_expected_paths(
        &mut self,
        expected: &ExpectedPaths,
        timeout: Duration,
        window: Duration,
    ) -> Result<(), MirrorError> {
        let paths = expected.base_paths()?;
        self.subscribe(
            &paths,
            SubscriptionMode::Stream,
            None,
            Some(StreamPolicy::on_change()),
        )?;
        self.await_initial_sync(timeout)?;
        self.verify_expected_paths(expected)?;
        if !self.await_on_change(timeout, window)? {
            return Err(MirrorError::Timeout {
                context: "no on-change update within window".to_string(),
                waited: window,
            });
        }
        Ok(())
    }

    /// Closes the active session, if any. The last mirror is kept.
    pub fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.close();
        }
    }
}

impl Drop for SubscriptionMirror {
    fn drop(&mut self) {
        self.close();
    }
}

/// Applies one post-sync response; returns whether it carried updates.
fn apply_incremental(
    mirror: &mut ConfigNode,
    response: &SubscribeResponse,
    policy: OnChangePolicy,
) -> Result<bool, MirrorError> {
    let SubscribeResponse::Update(notification) = response else {
        return Ok(false);
    };
    let prefix = notification.prefix.as_ref();
    for update in &notification.updates {
        let path = update.path.prefixed(prefix);
        let outcome = apply_update(mirror, &path, &update.value, policy.minimum)?;
        if policy.forbid_structure && outcome == UpdateOutcome::Structure {
            return Err(MirrorError::violation(
                &path,
                Violation::StructuralChange {
                    value: update.value.to_string(),
                },
            ));
        }
    }
    Ok(!notification.updates.is_empty())
}

fn is_aggregated(value: &TypedValue) -> bool {
    match value.composite() {
        Some(JsonValue::Object(_)) => true,
        Some(JsonValue::Array(items)) => items.iter().any(JsonValue::is_object),
        _ => false,
    }
}
