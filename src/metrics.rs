//! Metric helpers for `hl7-mllp`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Without the
//! `metrics` feature the helpers compile to nothing.

use crate::{ack::AckCode, request::ErrorKind};

/// Name of the gauge tracking active connections.
pub const CONNECTIONS_ACTIVE: &str = "mllp_connections_active";
/// Name of the counter tracking processed frames.
pub const FRAMES_PROCESSED: &str = "mllp_frames_processed_total";
/// Name of the counter tracking acknowledgments written.
pub const ACKS_SENT: &str = "mllp_acks_sent_total";
/// Name of the counter tracking failed frames.
pub const ERRORS_TOTAL: &str = "mllp_errors_total";
/// Name of the counter tracking panicking connection tasks.
pub const CONNECTION_PANICS: &str = "mllp_connection_panics_total";

/// Direction of frame processing.
#[derive(Clone, Copy, Debug)]
pub enum Direction {
    /// Inbound frames received from a client.
    Inbound,
    /// Outbound acknowledgments sent to a client.
    Outbound,
}

impl Direction {
    /// Label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

#[cfg(feature = "metrics")]
mod recorder {
    use metrics::{counter, gauge};

    use super::*;

    pub fn inc_connections() { gauge!(CONNECTIONS_ACTIVE).increment(1.0); }

    pub fn dec_connections() { gauge!(CONNECTIONS_ACTIVE).decrement(1.0); }

    pub fn inc_frames(direction: Direction) {
        counter!(FRAMES_PROCESSED, "direction" => direction.as_str()).increment(1);
    }

    pub fn inc_acks(code: AckCode) { counter!(ACKS_SENT, "code" => code.as_str()).increment(1); }

    pub fn inc_errors(kind: ErrorKind) {
        counter!(ERRORS_TOTAL, "kind" => kind.as_str()).increment(1);
    }

    pub fn inc_connection_panics() { counter!(CONNECTION_PANICS).increment(1); }
}

#[cfg(not(feature = "metrics"))]
mod recorder {
    use super::*;

    pub fn inc_connections() {}

    pub fn dec_connections() {}

    pub fn inc_frames(_: Direction) {}

    pub fn inc_acks(_: AckCode) {}

    pub fn inc_errors(_: ErrorKind) {}

    pub fn inc_connection_panics() {}
}

/// Increment the active connections gauge.
pub fn inc_connections() { recorder::inc_connections(); }

/// Decrement the active connections gauge.
pub fn dec_connections() { recorder::dec_connections(); }

/// Record a processed frame for the given direction.
pub fn inc_frames(direction: Direction) { recorder::inc_frames(direction); }

/// Record an acknowledgment written to a peer.
pub fn inc_acks(code: AckCode) { recorder::inc_acks(code); }

/// Record a failed frame.
pub fn inc_errors(kind: ErrorKind) { recorder::inc_errors(kind); }

/// Record a panicking connection task.
pub fn inc_connection_panics() { recorder::inc_connection_panics(); }
