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

mod scripted_transport;
pub use scripted_transport::{ScriptedTransport, LOCAL_CANCEL_DETAILS};
mod test_messages;
pub use test_messages::{notification, notification_with_prefix, path};

use std::sync::Once;

static LOGGING: Once = Once::new();

/// Installs a `RUST_LOG` driven fmt subscriber once per test binary.
pub fn init_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
