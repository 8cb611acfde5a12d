//! Errors surfaced to the handler for failed frames.

use std::io;

use thiserror::Error;

use crate::{hl7::ParseError, request::ErrorKind};

/// Why a frame could not be delivered as a [`Request`](crate::request::Request).
#[derive(Debug, Error)]
pub enum MllpError {
    /// The payload did not parse.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    /// The transport failed while the frame was being read.
    #[error("socket error: {0}")]
    Socket(#[from] io::Error),
}

impl MllpError {
    /// Classification tag for this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse(_) => ErrorKind::Parse,
            Self::Socket(_) => ErrorKind::Socket,
        }
    }

    /// Message of the underlying error, without the classification prefix.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Parse(err) => err.to_string(),
            Self::Socket(err) => err.to_string(),
        }
    }
}
