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

//! Canonical structured field values and value-format helpers.

use crate::wire::{SubscribeRequest, SubscribeResponse};

pub const REASON_REQUESTS_CLOSED: &str = "requests_closed";
pub const REASON_INVALID_THREAD_NAME: &str = "invalid_thread_name";
pub const DEFAULT_WORKER_THREAD: &str = "unknown-thread";

/// Correlation fields attached to every record a session worker emits.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkerContext {
    pub session_id: String,
    pub worker_thread: String,
}

impl WorkerContext {
    pub fn new(session_id: impl Into<String>, worker_thread: Option<&str>) -> Self {
        Self {
            session_id: session_id.into(),
            worker_thread: thread_name_or_default(worker_thread),
        }
    }

    pub fn with_current_thread(session_id: impl Into<String>) -> Self {
        Self::new(session_id, std::thread::current().name())
    }
}

pub fn thread_name_or_default(thread_name: Option<&str>) -> String {
    thread_name.unwrap_or(DEFAULT_WORKER_THREAD).to_string()
}

pub fn format_request(request: &SubscribeRequest) -> &'static str {
    match request {
        SubscribeRequest::Subscribe(_) => "subscribe",
        SubscribeRequest::Poll => "poll",
    }
}

pub fn format_response(response: &SubscribeResponse) -> &'static str {
    match response {
        SubscribeResponse::Update(_) => "update",
        SubscribeResponse::SyncResponse => "sync_response",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        format_request, format_response, thread_name_or_default, WorkerContext,
        DEFAULT_WORKER_THREAD,
    };
    use crate::wire::{Notification, SubscribeRequest, SubscribeResponse};

    #[test]
    fn thread_name_or_default_falls_back_when_absent() {
        assert_eq!(thread_name_or_default(None), DEFAULT_WORKER_THREAD);
        assert_eq!(thread_name_or_default(Some("named-thread")), "named-thread");
    }

    #[test]
    fn worker_context_keeps_session_id() {
        let context = WorkerContext::new("3f2a", Some("gnmi-sub-3f2a"));
        assert_eq!(context.session_id, "3f2a");
        assert_eq!(context.worker_thread, "gnmi-sub-3f2a");
    }

    #[test]
    fn responses_are_labelled_by_kind() {
        assert_eq!(format_response(&SubscribeResponse::SyncResponse), "sync_response");
        assert_eq!(
            format_response(&SubscribeResponse::Update(Notification::default())),
            "update"
        );
    }

    #[test]
    fn requests_are_labelled_by_kind() {
        assert_eq!(format_request(&SubscribeRequest::Poll), "poll");
    }
}
