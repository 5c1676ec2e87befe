use gnmi_mirror::{MirrorConfig, Path, SubscriptionMirror, SubscriptionMode, TypedValue};
use integration_test_utils::{path, ScriptedTransport};
use std::sync::Arc;
use std::time::Duration;

pub(crate) const WAIT: Duration = Duration::from_secs(5);
pub(crate) const SHORT_WAIT: Duration = Duration::from_millis(100);

pub(crate) fn config() -> MirrorConfig {
    MirrorConfig {
        close_grace_ms: 1000,
        ..MirrorConfig::default()
    }
}

pub(crate) fn subscribed(transport: &Arc<ScriptedTransport>, paths: &[&str]) -> SubscriptionMirror {
    integration_test_utils::init_logging();

    let paths: Vec<Path> = paths.iter().map(|at| path(at)).collect();
    let mut mirror = SubscriptionMirror::new(transport.clone(), config());
    mirror
        .subscribe(&paths, SubscriptionMode::Stream, None, None)
        .expect("subscribe should succeed");
    mirror
}

pub(crate) fn text(value: &str) -> TypedValue {
    TypedValue::StringVal(value.to_string())
}

#[allow(dead_code)]
pub(crate) fn mtu(value: u64) -> TypedValue {
    TypedValue::UintVal(value)
}
