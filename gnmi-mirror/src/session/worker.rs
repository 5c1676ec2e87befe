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

//! Stream worker: one named thread per session running a current-thread runtime
//! that owns the bidirectional Subscribe call.

use super::{Inbound, Outbound};
use crate::observability::events;
use crate::observability::fields::{self, WorkerContext};
use crate::transport::{GnmiTransport, RequestStream, ResponseStream, StatusCode, TransportError};
use crossbeam::channel::{self, Receiver, Sender};
use futures::stream::{self, StreamExt};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::runtime::Builder;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Notify;
use tracing::{debug, info, trace, warn};

const STREAM_WORKER_THREAD_NAME_PREFIX: &str = "gnmi-sub-";
const STREAM_WORKER_THREAD_NAME_MAX_LEN: usize = 15;
pub(crate) const DEFAULT_STREAM_WORKER_THREAD_NAME: &str = "gnmi-sub-worker";
const COMPONENT: &str = "stream_worker";

/// Handle on a spawned worker.
pub(crate) struct StreamWorker {
    handle: JoinHandle<Option<TransportError>>,
    /// Disconnects once the worker thread has returned.
    done: Receiver<()>,
    thread_name: String,
}

impl StreamWorker {
    pub(crate) fn thread_name(&self) -> &str {
        &self.thread_name
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub(crate) fn done(&self) -> &Receiver<()> {
        &self.done
    }

    /// Joins the thread and returns the failure it recorded, if any.
    pub(crate) fn join(self, session_id: &str) -> Option<TransportError> {
        match self.handle.join() {
            Ok(failure) => failure,
            Err(_) => {
                warn!(
                    event = events::SESSION_WORKER_PANICKED,
                    component = COMPONENT,
                    session_id,
                    worker_thread = self.thread_name.as_str(),
                    "stream worker panicked"
                );
                Some(TransportError::new(
                    StatusCode::Internal,
                    "stream worker panicked",
                ))
            }
        }
    }
}

pub(crate) fn build_runtime_thread_name(session_id: &str) -> String {
    let suffix_len = STREAM_WORKER_THREAD_NAME_MAX_LEN - STREAM_WORKER_THREAD_NAME_PREFIX.len();
    let suffix: String = session_id
        .chars()
        .filter(|ch| ch.is_ascii_hexdigit())
        .take(suffix_len)
        .collect();

    if suffix.len() == suffix_len {
        format!("{STREAM_WORKER_THREAD_NAME_PREFIX}{suffix}")
    } else {
        debug!(
            event = events::RUNTIME_THREAD_NAME_FALLBACK,
            component = COMPONENT,
            session_id,
            reason = fields::REASON_INVALID_THREAD_NAME,
            "falling back to the default worker thread name"
        );
        DEFAULT_STREAM_WORKER_THREAD_NAME.to_string()
    }
}

/// Spawns the worker for one session.
pub(crate) fn spawn_stream_worker(
    session_id: &str,
    transport: Arc<dyn GnmiTransport>,
    outbound: UnboundedReceiver<Outbound>,
    inbound: Sender<Inbound>,
) -> io::Result<StreamWorker> {
    let thread_name = build_runtime_thread_name(session_id);
    let (done_signal, done) = channel::bounded::<()>(0);
    let worker_session_id = session_id.to_string();

    debug!(
        event = events::RUNTIME_SPAWN_START,
        component = COMPONENT,
        session_id,
        worker_thread = thread_name.as_str(),
        "spawning stream worker"
    );

    let spawned = thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            let _done_signal = done_signal;
            match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime.block_on(run_stream(
                    worker_session_id,
                    transport,
                    outbound,
                    inbound,
                )),
                Err(err) => {
                    let _ = inbound.send(Inbound::EndOfStream);
                    Some(TransportError::new(
                        StatusCode::Internal,
                        format!("stream worker runtime unavailable: {err}"),
                    ))
                }
            }
        });

    match spawned {
        Ok(handle) => {
            debug!(
                event = events::RUNTIME_SPAWN_OK,
                component = COMPONENT,
                session_id,
                worker_thread = thread_name.as_str(),
                "stream worker spawned"
            );
            Ok(StreamWorker {
                handle,
                done,
                thread_name,
            })
        }
        Err(err) => {
            warn!(
                event = events::RUNTIME_SPAWN_FAILED,
                component = COMPONENT,
                session_id,
                worker_thread = thread_name.as_str(),
                err = %err,
                "unable to spawn stream worker"
            );
            Err(err)
        }
    }
}

/// Opens the stream and forwards every response; always ends with `EndOfStream`.
pub(crate) async fn run_stream(
    session_id: String,
    transport: Arc<dyn GnmiTransport>,
    outbound: UnboundedReceiver<Outbound>,
    inbound: Sender<Inbound>,
) -> Option<TransportError> {
    let worker_context = WorkerContext::with_current_thread(session_id);
    let cancel = Arc::new(Notify::new());
    let requests = request_stream(outbound, cancel.clone(), worker_context.clone());

    info!(
        event = events::STREAM_SUBSCRIBE_START,
        component = COMPONENT,
        session_id = worker_context.session_id.as_str(),
        worker_thread = worker_context.worker_thread.as_str(),
        "opening subscribe stream"
    );

    let failure = match transport.subscribe(requests).await {
        Ok(responses) => consume_responses(responses, &cancel, &inbound, &worker_context).await,
        Err(err) => {
            debug!(
                event = events::STREAM_SUBSCRIBE_FAILED,
                component = COMPONENT,
                session_id = worker_context.session_id.as_str(),
                worker_thread = worker_context.worker_thread.as_str(),
                err = %err,
                "subscribe call rejected"
            );
            triage(err, &worker_context)
        }
    };

    // The caller may already be gone.
    let _ = inbound.send(Inbound::EndOfStream);
    failure
}

/// Pulls outbound requests until the shutdown sentinel, then signals `cancel`.
fn request_stream(
    outbound: UnboundedReceiver<Outbound>,
    cancel: Arc<Notify>,
    worker_context: WorkerContext,
) -> RequestStream {
    stream::unfold(outbound, move |mut outbound| {
        let cancel = cancel.clone();
        let worker_context = worker_context.clone();
        async move {
            match outbound.recv().await {
                Some(Outbound::Request(request)) => {
                    debug!(
                        event = events::STREAM_REQUEST_SENT,
                        component = COMPONENT,
                        session_id = worker_context.session_id.as_str(),
                        worker_thread = worker_context.worker_thread.as_str(),
                        request = fields::format_request(&request),
                        "sending request"
                    );
                    Some((request, outbound))
                }
                Some(Outbound::Shutdown) | None => {
                    debug!(
                        event = events::STREAM_CANCELLED,
                        component = COMPONENT,
                        session_id = worker_context.session_id.as_str(),
                        worker_thread = worker_context.worker_thread.as_str(),
                        reason = fields::REASON_REQUESTS_CLOSED,
                        "request stream closed; cancelling subscription"
                    );
                    cancel.notify_one();
                    None
                }
            }
        }
    })
    .boxed()
}

async fn consume_responses(
    mut responses: ResponseStream,
    cancel: &Notify,
    inbound: &Sender<Inbound>,
    worker_context: &WorkerContext,
) -> Option<TransportError> {
    loop {
        tokio::select! {
            _ = cancel.notified() => return None,
            item = responses.next() => match item {
                Some(Ok(response)) => {
                    trace!(
                        event = events::STREAM_RESPONSE_RECEIVED,
                        component = COMPONENT,
                        session_id = worker_context.session_id.as_str(),
                        worker_thread = worker_context.worker_thread.as_str(),
                        response = fields::format_response(&response),
                        updates = response.updates().len(),
                        "response received"
                    );
                    if inbound.send(Inbound::Response(response)).is_err() {
                        return None;
                    }
                }
                Some(Err(err)) => return triage(err, worker_context),
                None => {
                    debug!(
                        event = events::STREAM_ENDED,
                        component = COMPONENT,
                        session_id = worker_context.session_id.as_str(),
                        worker_thread = worker_context.worker_thread.as_str(),
                        "response stream ended"
                    );
                    return None;
                }
            }
        }
    }
}

/// Local cancellation and a remote EOF are expected terminations.
fn triage(err: TransportError, worker_context: &WorkerContext) -> Option<TransportError> {
    if err.is_local_cancellation() {
        debug!(
            event = events::STREAM_CANCELLED,
            component = COMPONENT,
            session_id = worker_context.session_id.as_str(),
            worker_thread = worker_context.worker_thread.as_str(),
            err = %err,
            "stream cancelled locally"
        );
        None
    } else if err.is_remote_eof() {
        debug!(
            event = events::STREAM_REMOTE_EOF,
            component = COMPONENT,
            session_id = worker_context.session_id.as_str(),
            worker_thread = worker_context.worker_thread.as_str(),
            err = %err,
            "stream closed by the target"
        );
        None
    } else {
        warn!(
            event = events::STREAM_FAILED,
            component = COMPONENT,
            session_id = worker_context.session_id.as_str(),
            worker_thread = worker_context.worker_thread.as_str(),
            err = %err,
            "stream failed"
        );
        Some(err)
    }
}
