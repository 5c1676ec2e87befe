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

//! Decoded gNMI Subscribe RPC messages, as handed over by the transport.

use crate::path::Path;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::time::Duration;

/// Value carried by an [`Update`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypedValue {
    StringVal(String),
    IntVal(i64),
    UintVal(u64),
    BoolVal(bool),
    BytesVal(Vec<u8>),
    DoubleVal(f64),
    AsciiVal(String),
    JsonVal(JsonValue),
    JsonIetfVal(JsonValue),
}

impl TypedValue {
    /// The decoded JSON document when this value is an encoded composite
    /// (object or array).
    pub fn composite(&self) -> Option<&JsonValue> {
        match self {
            TypedValue::JsonVal(json) | TypedValue::JsonIetfVal(json)
                if json.is_object() || json.is_array() =>
            {
                Some(json)
            }
            _ => None,
        }
    }

    /// Scalar form used for storage in the mirror: JSON scalars are stored as the
    /// equivalent typed scalar so that composite and flattened encodings agree.
    pub fn normalized(&self) -> TypedValue {
        match self {
            TypedValue::JsonVal(json) | TypedValue::JsonIetfVal(json)
                if !json.is_object() && !json.is_array() =>
            {
                TypedValue::from_json_scalar(json)
            }
            other => other.clone(),
        }
    }

    /// Converts a JSON scalar into a typed scalar. `null` (and, defensively,
    /// composites) stay JSON.
    pub fn from_json_scalar(json: &JsonValue) -> TypedValue {
        match json {
            JsonValue::String(text) => TypedValue::StringVal(text.clone()),
            JsonValue::Bool(flag) => TypedValue::BoolVal(*flag),
            JsonValue::Number(number) => {
                if let Some(int) = number.as_i64() {
                    TypedValue::IntVal(int)
                } else if let Some(uint) = number.as_u64() {
                    TypedValue::UintVal(uint)
                } else {
                    TypedValue::DoubleVal(number.as_f64().unwrap_or(f64::NAN))
                }
            }
            other => TypedValue::JsonVal(other.clone()),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::StringVal(text) => write!(f, "string_val: {text:?}"),
            TypedValue::IntVal(int) => write!(f, "int_val: {int}"),
            TypedValue::UintVal(uint) => write!(f, "uint_val: {uint}"),
            TypedValue::BoolVal(flag) => write!(f, "bool_val: {flag}"),
            TypedValue::BytesVal(bytes) => write!(f, "bytes_val: {} bytes", bytes.len()),
            TypedValue::DoubleVal(double) => write!(f, "double_val: {double}"),
            TypedValue::AsciiVal(text) => write!(f, "ascii_val: {text:?}"),
            TypedValue::JsonVal(json) => write!(f, "json_val: {json}"),
            TypedValue::JsonIetfVal(json) => write!(f, "json_ietf_val: {json}"),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Update {
    pub path: Path,
    #[serde(rename = "val")]
    pub value: TypedValue,
}

impl Update {
    pub fn new(path: Path, value: TypedValue) -> Self {
        Self { path, value }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Notification {
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub prefix: Option<Path>,
    #[serde(default, rename = "update")]
    pub updates: Vec<Update>,
}

/// One message of the response stream.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeResponse {
    Update(Notification),
    /// End of the initial full-resync burst.
    SyncResponse,
}

impl SubscribeResponse {
    pub fn is_sync(&self) -> bool {
        matches!(self, SubscribeResponse::SyncResponse)
    }

    /// Updates carried by this response; empty for the sync marker.
    pub fn updates(&self) -> &[Update] {
        match self {
            SubscribeResponse::Update(notification) => &notification.updates,
            SubscribeResponse::SyncResponse => &[],
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionMode {
    #[default]
    Stream,
    Once,
    Poll,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamMode {
    #[default]
    TargetDefined,
    OnChange,
    Sample,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Encoding {
    Json,
    Bytes,
    Proto,
    Ascii,
    #[default]
    JsonIetf,
}

/// How each path of a `STREAM` subscription is to be streamed.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct StreamPolicy {
    pub mode: StreamMode,
    #[serde(default, with = "duration_ms")]
    pub sample_interval: Option<Duration>,
}

impl StreamPolicy {
    pub fn on_change() -> Self {
        Self {
            mode: StreamMode::OnChange,
            sample_interval: None,
        }
    }

    pub fn sample(interval: Duration) -> Self {
        Self {
            mode: StreamMode::Sample,
            sample_interval: Some(interval),
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Subscription {
    pub path: Path,
    #[serde(default)]
    pub mode: Option<StreamMode>,
    #[serde(default, with = "duration_ms")]
    pub sample_interval: Option<Duration>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SubscriptionList {
    pub prefix: Option<Path>,
    pub subscriptions: Vec<Subscription>,
    pub mode: SubscriptionMode,
    pub encoding: Encoding,
}

impl SubscriptionList {
    /// Builds a subscription list; the stream policy is only attached to
    /// `STREAM` subscriptions.
    pub fn new(
        prefix: Option<Path>,
        paths: &[Path],
        mode: SubscriptionMode,
        encoding: Encoding,
        stream: Option<StreamPolicy>,
    ) -> Self {
        let stream = stream.filter(|_| mode == SubscriptionMode::Stream);
        let subscriptions = paths
            .iter()
            .map(|path| Subscription {
                path: path.clone(),
                mode: stream.map(|policy| policy.mode),
                sample_interval: stream.and_then(|policy| policy.sample_interval),
            })
            .collect();

        Self {
            prefix,
            subscriptions,
            mode,
            encoding,
        }
    }
}

/// Outbound message of the request stream.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscribeRequest {
    Subscribe(SubscriptionList),
    Poll,
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub(super) fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
