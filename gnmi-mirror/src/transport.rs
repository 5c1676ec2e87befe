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

//! Seam towards the RPC client that performs the actual Subscribe call.

use crate::wire::{SubscribeRequest, SubscribeResponse};
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Lazily pulled outbound requests. Ends when the session shuts down.
pub type RequestStream = BoxStream<'static, SubscribeRequest>;

/// Inbound responses; a transport failure is delivered as an `Err` item.
pub type ResponseStream = BoxStream<'static, Result<SubscribeResponse, TransportError>>;

/// gRPC status codes a transport may report.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    Ok,
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            StatusCode::Ok => "OK",
            StatusCode::Cancelled => "CANCELLED",
            StatusCode::Unknown => "UNKNOWN",
            StatusCode::InvalidArgument => "INVALID_ARGUMENT",
            StatusCode::DeadlineExceeded => "DEADLINE_EXCEEDED",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::AlreadyExists => "ALREADY_EXISTS",
            StatusCode::PermissionDenied => "PERMISSION_DENIED",
            StatusCode::ResourceExhausted => "RESOURCE_EXHAUSTED",
            StatusCode::FailedPrecondition => "FAILED_PRECONDITION",
            StatusCode::Aborted => "ABORTED",
            StatusCode::OutOfRange => "OUT_OF_RANGE",
            StatusCode::Unimplemented => "UNIMPLEMENTED",
            StatusCode::Internal => "INTERNAL",
            StatusCode::Unavailable => "UNAVAILABLE",
            StatusCode::DataLoss => "DATA_LOSS",
            StatusCode::Unauthenticated => "UNAUTHENTICATED",
        };
        f.write_str(text)
    }
}

/// "Remote call failed" condition raised by the transport.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
#[error("remote call failed with {code}: {details}")]
pub struct TransportError {
    pub code: StatusCode,
    pub details: String,
}

impl TransportError {
    pub fn new(code: StatusCode, details: impl Into<String>) -> Self {
        Self {
            code,
            details: details.into(),
        }
    }

    /// Stream was cancelled on this side.
    pub fn is_local_cancellation(&self) -> bool {
        self.code == StatusCode::Cancelled
    }

    /// Some devices report EOF once the request stream is closed.
    pub fn is_remote_eof(&self) -> bool {
        self.details.contains("EOF")
    }
}

/// Client side of the bidirectional Subscribe RPC.
///
/// Dropping the returned [`ResponseStream`] cancels the call; implementations must
/// stop pulling `requests` once that happens.
#[async_trait]
pub trait GnmiTransport: Send + Sync {
    async fn subscribe(&self, requests: RequestStream) -> Result<ResponseStream, TransportError>;
}
