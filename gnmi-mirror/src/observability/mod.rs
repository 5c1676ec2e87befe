//! Structured logging vocabulary.
//!
//! Every log record carries an `event` name from [`events`] and a `component`;
//! records emitted from a session worker also carry [`fields::WorkerContext`].

pub mod events;
pub mod fields;
