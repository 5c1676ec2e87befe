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

use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::future;
use futures::stream::{self, StreamExt};
use gnmi_mirror::{
    GnmiTransport, Notification, RequestStream, ResponseStream, StatusCode, SubscribeRequest,
    SubscribeResponse, TransportError,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// Details reported when the request stream of a call ends, like a gRPC client
/// cancelling the call.
pub const LOCAL_CANCEL_DETAILS: &str = "Locally cancelled by application!";

enum ScriptItem {
    Response(SubscribeResponse),
    Failure(TransportError),
    End,
}

enum Event {
    Script(ScriptItem),
    Request(SubscribeRequest),
    RequestsClosed,
}

/// In-process stand-in for a gNMI target.
///
/// Every `subscribe` call consumes the oldest prepared stream; items pushed
/// while a stream is live are delivered immediately. Requests pulled from the
/// caller are recorded. When the request stream ends the call reports a local
/// cancellation, unless `cancel_on_shutdown` was switched off.
pub struct ScriptedTransport {
    pending: Mutex<VecDeque<UnboundedReceiver<ScriptItem>>>,
    current: Mutex<UnboundedSender<ScriptItem>>,
    requests: Arc<Mutex<Vec<SubscribeRequest>>>,
    cancel_on_shutdown: bool,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded();
        Self {
            pending: Mutex::new(VecDeque::from([receiver])),
            current: Mutex::new(sender),
            requests: Arc::default(),
            cancel_on_shutdown: true,
        }
    }

    /// Ends streams cleanly instead of reporting a cancellation.
    #[must_use]
    pub fn without_cancel_on_shutdown(mut self) -> Self {
        self.cancel_on_shutdown = false;
        self
    }

    /// Starts scripting the stream of the next `subscribe` call.
    pub fn next_stream(&self) {
        let (sender, receiver) = mpsc::unbounded();
        self.pending
            .lock()
            .expect("pending streams lock")
            .push_back(receiver);
        *self.current.lock().expect("current stream lock") = sender;
    }

    fn push(&self, item: ScriptItem) {
        let _ = self
            .current
            .lock()
            .expect("current stream lock")
            .unbounded_send(item);
    }

    pub fn push_update(&self, notification: Notification) {
        self.push(ScriptItem::Response(SubscribeResponse::Update(notification)));
    }

    pub fn push_sync(&self) {
        self.push(ScriptItem::Response(SubscribeResponse::SyncResponse));
    }

    pub fn push_failure(&self, code: StatusCode, details: &str) {
        self.push(ScriptItem::Failure(TransportError::new(code, details)));
    }

    /// Ends the stream from the target side.
    pub fn push_end(&self) {
        self.push(ScriptItem::End);
    }

    /// Requests pulled so far, across all streams.
    pub fn requests(&self) -> Vec<SubscribeRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Polls until at least `count` requests were pulled.
    pub fn wait_for_requests(&self, count: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.requests.lock().expect("requests lock").len() >= count {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }
}

#[async_trait]
impl GnmiTransport for ScriptedTransport {
    async fn subscribe(&self, requests: RequestStream) -> Result<ResponseStream, TransportError> {
        let Some(script) = self.pending.lock().expect("pending streams lock").pop_front() else {
            return Err(TransportError::new(
                StatusCode::Unavailable,
                "no scripted stream left",
            ));
        };
        debug!("scripted stream opened");

        let recorded = self.requests.clone();
        let cancel_on_shutdown = self.cancel_on_shutdown;
        let pulls = requests
            .map(Event::Request)
            .chain(stream::once(future::ready(Event::RequestsClosed)));
        let events = stream::select(script.map(Event::Script), pulls);

        let responses = events
            .scan(false, move |finished, event| {
                let step = if *finished {
                    None
                } else {
                    match event {
                        Event::Script(ScriptItem::Response(response)) => Some(Some(Ok(response))),
                        Event::Script(ScriptItem::Failure(failure)) => {
                            *finished = true;
                            Some(Some(Err(failure)))
                        }
                        Event::Script(ScriptItem::End) => None,
                        Event::Request(request) => {
                            recorded.lock().expect("requests lock").push(request);
                            Some(None)
                        }
                        Event::RequestsClosed if cancel_on_shutdown => {
                            *finished = true;
                            Some(Some(Err(TransportError::new(
                                StatusCode::Cancelled,
                                LOCAL_CANCEL_DETAILS,
                            ))))
                        }
                        Event::RequestsClosed => None,
                    }
                };
                future::ready(step)
            })
            .filter_map(future::ready);

        Ok(responses.boxed())
    }
}
