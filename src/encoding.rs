//! Text encodings applied to inbound frames and outbound acknowledgments.

use std::{fmt, str::FromStr};

use bytes::Bytes;
use thiserror::Error;

/// Character encoding used to turn frame bytes into text and back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    /// UTF-8. Invalid sequences decode to `U+FFFD`.
    #[default]
    Utf8,
    /// ISO-8859-1; every byte maps to the code point of the same value.
    Latin1,
    /// 7-bit ASCII; the high bit of each byte is discarded.
    Ascii,
}

/// Error returned when an encoding label is not recognised.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown text encoding: {0}")]
pub struct UnknownEncoding(pub String);

impl TextEncoding {
    /// Canonical label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin1",
            Self::Ascii => "ascii",
        }
    }

    /// Decode `bytes` into a string.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Latin1 => bytes.iter().copied().map(char::from).collect(),
            Self::Ascii => bytes.iter().map(|b| char::from(b & 0x7f)).collect(),
        }
    }

    /// Encode `text`. Characters the encoding cannot represent become `?`.
    #[must_use]
    pub fn encode(self, text: &str) -> Bytes {
        match self {
            Self::Utf8 => Bytes::copy_from_slice(text.as_bytes()),
            Self::Latin1 => text
                .chars()
                .map(|c| u8::try_from(c).unwrap_or(b'?'))
                .collect::<Vec<u8>>()
                .into(),
            Self::Ascii => text
                .chars()
                .map(|c| if c.is_ascii() { c as u8 } else { b'?' })
                .collect::<Vec<u8>>()
                .into(),
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl FromStr for TextEncoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "latin1" | "binary" | "iso-8859-1" => Ok(Self::Latin1),
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            _ => Err(UnknownEncoding(s.to_owned())),
        }
    }
}
