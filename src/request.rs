//! Read-only views of inbound frames handed to the handler.

use std::{fmt, io};

use crate::{
    error::MllpError,
    hl7::{FieldValue, Message, ParseError},
};

/// Classification of a failed frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The payload did not parse.
    Parse,
    /// The transport failed.
    Socket,
}

impl ErrorKind {
    /// Tag as shown to handlers and in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Parse => "Parse",
            Self::Socket => "Socket",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A frame that parsed into a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    sender: FieldValue,
    facility: FieldValue,
    message_type: String,
    event: String,
    raw: String,
    message: Message,
}

impl Request {
    /// Snapshot the routing fields of `message`. `raw` is the decoded
    /// envelope, markers included.
    #[must_use]
    pub fn new(message: Message, raw: String) -> Self {
        Self {
            sender: message.sending_application(),
            facility: message.sending_facility(),
            message_type: message.message_type().to_owned(),
            event: message.trigger_event().to_owned(),
            raw,
            message,
        }
    }

    /// Sending application (MSH-3).
    #[must_use]
    pub fn sender(&self) -> &FieldValue { &self.sender }

    /// Sending facility (MSH-4).
    #[must_use]
    pub fn facility(&self) -> &FieldValue { &self.facility }

    /// Message type (MSH-9.1).
    #[must_use]
    pub fn message_type(&self) -> &str { &self.message_type }

    /// Trigger event (MSH-9.2).
    #[must_use]
    pub fn event(&self) -> &str { &self.event }

    /// Decoded envelope.
    #[must_use]
    pub fn raw(&self) -> &str { &self.raw }

    /// The parsed message.
    #[must_use]
    pub fn message(&self) -> &Message { &self.message }

    /// Consume the view, keeping the message.
    #[must_use]
    pub fn into_message(self) -> Message { self.message }
}

/// A frame that could not be delivered as a [`Request`].
#[derive(Debug)]
pub struct FailedRequest {
    raw: String,
    error: MllpError,
}

impl FailedRequest {
    /// Pair the bytes seen so far with the failure.
    #[must_use]
    pub fn new(raw: String, error: MllpError) -> Self { Self { raw, error } }

    /// Decoded bytes accumulated when the failure happened.
    #[must_use]
    pub fn raw(&self) -> &str { &self.raw }

    /// Error text.
    #[must_use]
    pub fn err(&self) -> String { self.error.detail() }

    /// `Parse` or `Socket`.
    #[must_use]
    pub fn err_type(&self) -> ErrorKind { self.error.kind() }

    /// The underlying error.
    #[must_use]
    pub fn error(&self) -> &MllpError { &self.error }

    /// Consume the view, keeping the error.
    #[must_use]
    pub fn into_error(self) -> MllpError { self.error }
}

/// What the session observed: one per frame, failure or close.
#[derive(Debug)]
pub enum RequestOutcome {
    /// A frame parsed; a positive acknowledgment is attached.
    Ok(Request),
    /// A frame failed to parse; a negative acknowledgment is attached.
    ParseFailure(FailedRequest),
    /// The transport failed; a negative acknowledgment is attached.
    SocketFailure(FailedRequest),
    /// The peer closed the connection. No acknowledgment is attached.
    BenignClose,
}

impl RequestOutcome {
    pub(crate) fn parse_failure(raw: String, error: ParseError) -> Self {
        Self::ParseFailure(FailedRequest::new(raw, error.into()))
    }

    pub(crate) fn socket_failure(raw: String, error: io::Error) -> Self {
        Self::SocketFailure(FailedRequest::new(raw, error.into()))
    }

    /// The parsed request, when there is one.
    #[must_use]
    pub fn request(&self) -> Option<&Request> {
        match self {
            Self::Ok(request) => Some(request),
            _ => None,
        }
    }

    /// The failure, when there is one.
    #[must_use]
    pub fn failure(&self) -> Option<&FailedRequest> {
        match self {
            Self::ParseFailure(failed) | Self::SocketFailure(failed) => Some(failed),
            _ => None,
        }
    }

    /// The error passed alongside the request, if any.
    #[must_use]
    pub fn error(&self) -> Option<&MllpError> { self.failure().map(FailedRequest::error) }

    /// Failure classification, if any.
    #[must_use]
    pub fn err_type(&self) -> Option<ErrorKind> { self.failure().map(FailedRequest::err_type) }

    /// Decoded bytes behind this outcome. `None` for a benign close.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        match self {
            Self::Ok(request) => Some(request.raw()),
            Self::ParseFailure(failed) | Self::SocketFailure(failed) => Some(failed.raw()),
            Self::BenignClose => None,
        }
    }

    /// Returns `true` for [`RequestOutcome::BenignClose`].
    #[must_use]
    pub fn is_close(&self) -> bool { matches!(self, Self::BenignClose) }
}
