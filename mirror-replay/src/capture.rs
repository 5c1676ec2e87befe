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

//! File-backed transport replaying a captured response stream.

use anyhow::Context;
use async_trait::async_trait;
use futures::future;
use futures::stream::{self, StreamExt};
use gnmi_mirror::{
    GnmiTransport, RequestStream, ResponseStream, StatusCode, SubscribeResponse, TransportError,
};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

/// One captured item: a response, or the failure that ended the stream.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum CaptureEntry {
    Failure { error: TransportError },
    Response(SubscribeResponse),
}

impl From<CaptureEntry> for Result<SubscribeResponse, TransportError> {
    fn from(entry: CaptureEntry) -> Self {
        match entry {
            CaptureEntry::Failure { error } => Err(error),
            CaptureEntry::Response(response) => Ok(response),
        }
    }
}

/// Serves the capture to the first `subscribe` call only.
pub struct CaptureTransport {
    entries: Mutex<Option<Vec<CaptureEntry>>>,
    hold_open: bool,
}

impl CaptureTransport {
    pub fn new(entries: Vec<CaptureEntry>, hold_open: bool) -> Self {
        Self {
            entries: Mutex::new(Some(entries)),
            hold_open,
        }
    }

    pub fn from_file(file: &Path, hold_open: bool) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(file)
            .with_context(|| format!("Unable to read capture file {}", file.display()))?;
        let entries: Vec<CaptureEntry> = json5::from_str(&contents)
            .with_context(|| format!("Unable to parse capture file {}", file.display()))?;
        debug!(entries = entries.len(), file = %file.display(), "capture loaded");
        Ok(Self::new(entries, hold_open))
    }
}

#[async_trait]
impl GnmiTransport for CaptureTransport {
    async fn subscribe(&self, requests: RequestStream) -> Result<ResponseStream, TransportError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| TransportError::new(StatusCode::Internal, "capture lock poisoned"))?
            .take()
            .ok_or_else(|| TransportError::new(StatusCode::Unavailable, "capture already replayed"))?;

        // A failure ends the stream; entries after it are never delivered.
        let failed_at = entries
            .iter()
            .position(|entry| matches!(entry, CaptureEntry::Failure { .. }));
        let replay_len = failed_at.map_or(entries.len(), |index| index + 1);
        let hold_open = self.hold_open && failed_at.is_none();
        let captured = stream::iter(entries.into_iter().take(replay_len).map(Into::into));

        if !hold_open {
            return Ok(captured.boxed());
        }
        let held = requests.filter_map(|request| {
            debug!(?request, "request after end of capture");
            future::ready(None)
        });
        Ok(captured.chain(held).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::{CaptureEntry, CaptureTransport};
    use futures::executor::block_on;
    use futures::stream::{self, StreamExt};
    use gnmi_mirror::{GnmiTransport, StatusCode, SubscribeRequest, SubscribeResponse};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const CAPTURE: &str = r#"[
        { update: { timestamp: 1, update: [
            { path: "/system/config/hostname", val: { string_val: "r1" } },
        ] } },
        "sync_response",
        { error: { code: "UNAVAILABLE", details: "connection reset" } },
        { update: { update: [] } },
    ]"#;

    fn capture_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(CAPTURE.as_bytes()).expect("capture written");
        file
    }

    #[test]
    fn capture_entries_decode() {
        let entries: Vec<CaptureEntry> = json5::from_str(CAPTURE).expect("capture decodes");

        assert_eq!(entries.len(), 4);
        assert!(matches!(&entries[0], CaptureEntry::Response(SubscribeResponse::Update(n)) if n.updates.len() == 1));
        assert_eq!(entries[1], CaptureEntry::Response(SubscribeResponse::SyncResponse));
        assert!(
            matches!(&entries[2], CaptureEntry::Failure { error } if error.code == StatusCode::Unavailable)
        );
    }

    #[test]
    fn replay_stops_at_the_first_failure() {
        let file = capture_file();
        let transport = CaptureTransport::from_file(file.path(), true).expect("capture loads");

        let responses = block_on(async {
            let requests = stream::iter([SubscribeRequest::Poll]).boxed();
            let stream = transport.subscribe(requests).await.expect("stream opens");
            stream.collect::<Vec<_>>().await
        });

        assert_eq!(responses.len(), 3);
        assert!(responses[0].is_ok());
        assert!(matches!(responses[1], Ok(SubscribeResponse::SyncResponse)));
        assert!(matches!(&responses[2], Err(err) if err.details == "connection reset"));
    }

    #[test]
    fn held_stream_ends_with_the_requests() {
        let transport = CaptureTransport::new(
            vec![CaptureEntry::Response(SubscribeResponse::SyncResponse)],
            true,
        );

        let responses = block_on(async {
            let requests = stream::iter([SubscribeRequest::Poll, SubscribeRequest::Poll]).boxed();
            let stream = transport.subscribe(requests).await.expect("stream opens");
            stream.collect::<Vec<_>>().await
        });
        assert_eq!(responses.len(), 1);
    }

    #[test]
    fn capture_is_replayed_once() {
        let transport = CaptureTransport::new(Vec::new(), false);

        block_on(async {
            assert!(transport.subscribe(stream::empty().boxed()).await.is_ok());
            let again = transport.subscribe(stream::empty().boxed()).await;
            assert!(matches!(again, Err(err) if err.code == StatusCode::Unavailable));
        });
    }

    #[test]
    fn unreadable_capture_is_reported() {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(b"[ { bogus: 1 } ]").expect("capture written");

        let err = CaptureTransport::from_file(file.path(), false)
            .err()
            .expect("invalid capture");
        assert!(err.to_string().starts_with("Unable to parse capture file"));
    }
}
