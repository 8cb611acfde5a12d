//! Acknowledgment synthesis.
//!
//! A positive acknowledgment reverses the routing of the message it answers
//! and echoes its control id in `MSA-2`. A negative acknowledgment is built
//! without an inbound message, so its routing fields are empty and `MSA-2`
//! carries a timestamp instead.

use std::fmt;

use chrono::Local;

use crate::hl7::{Field, HeaderFields, Message};

/// `MSH-11` on every acknowledgment.
pub const PROCESSING_ID: &str = "P";
/// `MSH-12` on every acknowledgment.
pub const VERSION_ID: &str = "2.3";
/// `MSH-9` on every acknowledgment.
pub const ACK_MESSAGE_TYPE: &str = "ACK";
/// Segment carrying the acknowledgment code.
pub const ACK_SEGMENT: &str = "MSA";
/// `chrono` format for HL7 `TS` values, for example `20240101120000`.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Current local time formatted as an HL7 timestamp.
#[must_use]
pub fn timestamp() -> String { Local::now().format(TIMESTAMP_FORMAT).to_string() }

/// `MSA-1` acknowledgment code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AckCode {
    /// `AA`: the message was accepted.
    Accept,
    /// `AR`: the message was rejected.
    Reject,
}

impl AckCode {
    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "AA",
            Self::Reject => "AR",
        }
    }
}

impl fmt::Display for AckCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// An acknowledgment ready to be framed and sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Acknowledgment {
    message: Message,
    code: AckCode,
    append_cr: bool,
}

impl Acknowledgment {
    /// Accept `original`.
    #[must_use]
    pub fn from_message(original: &Message) -> Self {
        let mut message = Message::new(HeaderFields {
            sending_application: routing(original, 3),
            sending_facility: routing(original, 4),
            receiving_application: routing(original, 1),
            receiving_facility: routing(original, 2),
            ..header_template()
        });
        message.add_segment(ACK_SEGMENT, [AckCode::Accept.as_str().to_owned(), original.control_id()]);
        Self {
            message,
            code: AckCode::Accept,
            append_cr: false,
        }
    }

    /// Reject a frame that produced no message.
    #[must_use]
    pub fn from_failure() -> Self {
        let mut message = Message::new(header_template());
        message.add_segment(ACK_SEGMENT, [AckCode::Reject.as_str().to_owned(), timestamp()]);
        Self {
            message,
            code: AckCode::Reject,
            append_cr: false,
        }
    }

    /// Set whether a `CR` is written between the message and the trailer.
    #[must_use]
    pub fn with_append_cr(mut self, append_cr: bool) -> Self {
        self.append_cr = append_cr;
        self
    }

    /// Change the `append_cr` flag in place.
    pub fn set_append_cr(&mut self, append_cr: bool) { self.append_cr = append_cr; }

    /// Whether a `CR` precedes the trailer on the wire.
    #[must_use]
    pub fn append_cr(&self) -> bool { self.append_cr }

    /// `MSA-1`.
    #[must_use]
    pub fn code(&self) -> AckCode { self.code }

    /// `MSA-2`: the control id or timestamp this acknowledgment refers to.
    #[must_use]
    pub fn referenced_id(&self) -> String {
        self.message
            .segment_field(ACK_SEGMENT, 2)
            .map(|value| value.to_string())
            .unwrap_or_default()
    }

    /// The acknowledgment as an HL7 message.
    #[must_use]
    pub fn message(&self) -> &Message { &self.message }

    /// Mutable access, for handlers that add segments such as `ERR`.
    pub fn message_mut(&mut self) -> &mut Message { &mut self.message }
}

impl fmt::Display for Acknowledgment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Display::fmt(&self.message, f) }
}

// Copied structurally; the ack re-renders it with its own delimiters.
fn routing(original: &Message, n: usize) -> Field {
    original.header().field(n).cloned().unwrap_or_default()
}

// Each call stamps its own time, so the header and control id may straddle
// a second boundary.
fn header_template() -> HeaderFields {
    HeaderFields {
        timestamp: timestamp(),
        message_type: vec![ACK_MESSAGE_TYPE.to_owned()],
        control_id: format!("{ACK_MESSAGE_TYPE}{}", timestamp()),
        processing_id: PROCESSING_ID.to_owned(),
        version_id: VERSION_ID.to_owned(),
        ..HeaderFields::default()
    }
}
