//! Canonical structured event names used across `gnmi-mirror`.

// Session lifecycle events.
pub const SESSION_OPEN: &str = "session_open";
pub const SESSION_REQUEST_QUEUED: &str = "session_request_queued";
pub const SESSION_CLOSE_START: &str = "session_close_start";
pub const SESSION_CLOSE_OK: &str = "session_close_ok";
pub const SESSION_CLOSE_TIMEOUT: &str = "session_close_timeout";
pub const SESSION_WORKER_PANICKED: &str = "session_worker_panicked";

// Stream worker events.
pub const STREAM_SUBSCRIBE_START: &str = "stream_subscribe_start";
pub const STREAM_SUBSCRIBE_FAILED: &str = "stream_subscribe_failed";
pub const STREAM_REQUEST_SENT: &str = "stream_request_sent";
pub const STREAM_RESPONSE_RECEIVED: &str = "stream_response_received";
pub const STREAM_ENDED: &str = "stream_ended";
pub const STREAM_CANCELLED: &str = "stream_cancelled";
pub const STREAM_REMOTE_EOF: &str = "stream_remote_eof";
pub const STREAM_FAILED: &str = "stream_failed";

// Runtime events.
pub const RUNTIME_THREAD_NAME_FALLBACK: &str = "runtime_thread_name_fallback";
pub const RUNTIME_SPAWN_START: &str = "runtime_spawn_start";
pub const RUNTIME_SPAWN_OK: &str = "runtime_spawn_ok";
pub const RUNTIME_SPAWN_FAILED: &str = "runtime_spawn_failed";

// Mirror events.
pub const UPDATE_APPLIED: &str = "update_applied";
pub const MIRROR_SUBSCRIBE: &str = "mirror_subscribe";
pub const MIRROR_POLL: &str = "mirror_poll";
pub const MIRROR_INITIAL_SYNC_OK: &str = "mirror_initial_sync_ok";
pub const MIRROR_ON_CHANGE_OBSERVED: &str = "mirror_on_change_observed";
pub const MIRROR_PERIODIC_SAMPLE_START: &str = "mirror_periodic_sample_start";
pub const MIRROR_PERIODIC_SAMPLE_COVERED: &str = "mirror_periodic_sample_covered";
pub const MIRROR_STREAM_CLOSED: &str = "mirror_stream_closed";
pub const EXPECTED_PATHS_RESOLVED: &str = "expected_paths_resolved";
