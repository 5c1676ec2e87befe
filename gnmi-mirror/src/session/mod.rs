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

//! One Subscribe stream driven by a background worker.
//!
//! The caller and the worker share nothing but two queues: requests flow out
//! through a tokio channel pulled by the transport, responses flow back through
//! a crossbeam channel that the caller drains with a per-item timeout. The worker
//! always terminates the inbound queue with an end-of-stream sentinel, and a
//! transport failure it records is reported at the end of every later drain.

mod worker;

use crate::error::MirrorError;
use crate::observability::events;
use crate::transport::{GnmiTransport, TransportError};
use crate::wire::{SubscribeRequest, SubscribeResponse};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};
use uuid::Uuid;
use worker::StreamWorker;

const COMPONENT: &str = "stream_session";
const WAITING_FOR_RESPONSE: &str = "waiting for a response";

pub(crate) enum Outbound {
    Request(SubscribeRequest),
    Shutdown,
}

pub(crate) enum Inbound {
    Response(SubscribeResponse),
    EndOfStream,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SessionState {
    Idle,
    Running,
    Closed,
}

pub struct StreamSession {
    session_id: String,
    transport: Arc<dyn GnmiTransport>,
    state: SessionState,
    close_grace: Duration,
    requests: UnboundedSender<Outbound>,
    /// Handed to the worker on start.
    pending: Option<(UnboundedReceiver<Outbound>, Sender<Inbound>)>,
    responses: Receiver<Inbound>,
    worker: Option<StreamWorker>,
    worker_thread: Option<String>,
    failure: Option<TransportError>,
    ended: bool,
}

impl StreamSession {
    pub fn new(transport: Arc<dyn GnmiTransport>, close_grace: Duration) -> Self {
        let (requests, outbound) = mpsc::unbounded_channel();
        let (inbound, responses) = channel::unbounded();

        Self {
            session_id: Uuid::new_v4().to_string(),
            transport,
            state: SessionState::Idle,
            close_grace,
            requests,
            pending: Some((outbound, inbound)),
            responses,
            worker: None,
            worker_thread: None,
            failure: None,
            ended: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Name of the worker thread once started.
    pub fn worker_thread(&self) -> Option<&str> {
        self.worker_thread.as_deref()
    }

    /// Failure recorded by the worker, once it has been collected.
    pub fn failure(&self) -> Option<&TransportError> {
        self.failure.as_ref()
    }

    /// True once no further response can arrive.
    pub fn is_finished(&self) -> bool {
        match self.state {
            SessionState::Idle | SessionState::Closed => true,
            SessionState::Running => {
                self.ended || self.worker.as_ref().map_or(true, StreamWorker::is_finished)
            }
        }
    }

    /// Appends a request to the outbound queue. Requests queued before `start`
    /// are sent first.
    pub fn enqueue(&self, request: SubscribeRequest) -> Result<(), MirrorError> {
        if self.state == SessionState::Closed {
            return Err(MirrorError::SessionClosed);
        }
        if self.requests.send(Outbound::Request(request)).is_err() {
            debug!(
                event = events::SESSION_REQUEST_QUEUED,
                component = COMPONENT,
                session_id = self.session_id.as_str(),
                "stream already ended; request dropped"
            );
        }
        Ok(())
    }

    /// Spawns the worker; a running session is left untouched.
    pub fn start(&mut self) -> Result<(), MirrorError> {
        match self.state {
            SessionState::Running => return Ok(()),
            SessionState::Closed => return Err(MirrorError::SessionClosed),
            SessionState::Idle => {}
        }
        let Some((outbound, inbound)) = self.pending.take() else {
            return Err(MirrorError::SessionClosed);
        };

        let worker = worker::spawn_stream_worker(
            &self.session_id,
            self.transport.clone(),
            outbound,
            inbound,
        )?;
        info!(
            event = events::SESSION_OPEN,
            component = COMPONENT,
            session_id = self.session_id.as_str(),
            worker_thread = worker.thread_name(),
            "stream session started"
        );
        self.worker_thread = Some(worker.thread_name().to_string());
        self.worker = Some(worker);
        self.state = SessionState::Running;
        Ok(())
    }

    /// Responses in arrival order.
    ///
    /// While the worker runs, each item is awaited for at most `timeout`; a miss
    /// yields [`MirrorError::Timeout`] and ends the iteration without touching the
    /// stream. Once the worker has finished only the responses buffered at call
    /// time are replayed, without blocking.
    pub fn drain(&mut self, timeout: Duration) -> Responses<'_> {
        let mode = if self.is_finished() {
            DrainMode::Snapshot {
                remaining: self.responses.len(),
            }
        } else {
            DrainMode::Live
        };

        Responses {
            session: self,
            timeout,
            mode,
            exhausted: false,
        }
    }

    /// Stops the stream and joins the worker within the close grace period.
    /// Calling it again is a no-op.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        debug!(
            event = events::SESSION_CLOSE_START,
            component = COMPONENT,
            session_id = self.session_id.as_str(),
            "closing stream session"
        );

        let _ = self.requests.send(Outbound::Shutdown);
        self.pending = None;
        if let Some(worker) = self.worker.take() {
            let stopped = worker.done().recv_timeout(self.close_grace);
            match stopped {
                Err(RecvTimeoutError::Timeout) => {
                    warn!(
                        event = events::SESSION_CLOSE_TIMEOUT,
                        component = COMPONENT,
                        session_id = self.session_id.as_str(),
                        worker_thread = worker.thread_name(),
                        grace_ms = self.close_grace.as_millis() as u64,
                        "stream worker did not stop within the grace period; detaching"
                    );
                }
                _ => self.record(worker.join(&self.session_id)),
            }
        }
        self.state = SessionState::Closed;

        info!(
            event = events::SESSION_CLOSE_OK,
            component = COMPONENT,
            session_id = self.session_id.as_str(),
            "stream session closed"
        );
    }

    fn record(&mut self, failure: Option<TransportError>) {
        if self.failure.is_none() {
            self.failure = failure;
        }
    }

    /// Collects the worker after its end-of-stream sentinel.
    fn finish(&mut self) {
        self.ended = true;
        if let Some(worker) = self.worker.take() {
            let failure = worker.join(&self.session_id);
            self.record(failure);
        }
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.close();
    }
}

enum DrainMode {
    Live,
    Snapshot { remaining: usize },
}

/// Iterator returned by [`StreamSession::drain`].
pub struct Responses<'s> {
    session: &'s mut StreamSession,
    timeout: Duration,
    mode: DrainMode,
    exhausted: bool,
}

impl Responses<'_> {
    fn end_of_stream(&mut self) -> Option<Result<SubscribeResponse, MirrorError>> {
        self.session.finish();
        self.exhaust()
    }

    fn exhaust(&mut self) -> Option<Result<SubscribeResponse, MirrorError>> {
        self.exhausted = true;
        self.session
            .failure
            .clone()
            .map(|failure| Err(MirrorError::Transport(failure)))
    }
}

impl Iterator for Responses<'_> {
    type Item = Result<SubscribeResponse, MirrorError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        match &mut self.mode {
            DrainMode::Snapshot { remaining } => {
                if *remaining == 0 {
                    return self.exhaust();
                }
                *remaining -= 1;
                match self.session.responses.try_recv() {
                    Ok(Inbound::Response(response)) => Some(Ok(response)),
                    Ok(Inbound::EndOfStream) => self.end_of_stream(),
                    Err(_) => self.exhaust(),
                }
            }
            DrainMode::Live => match self.session.responses.recv_timeout(self.timeout) {
                Ok(Inbound::Response(response)) => Some(Ok(response)),
                Ok(Inbound::EndOfStream) | Err(RecvTimeoutError::Disconnected) => {
                    self.end_of_stream()
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.exhausted = true;
                    Some(Err(MirrorError::Timeout {
                        context: WAITING_FOR_RESPONSE.to_string(),
                        waited: self.timeout,
                    }))
                }
            },
        }
    }
}
