//! MLLP envelope delimiters and the framing codec.
//!
//! An MLLP frame travels as `<SB> payload <EB><CR>`. [`MllpCodec`] buffers
//! inbound bytes until the buffer *ends* with `<EB><CR>` and then yields the
//! whole envelope, markers included. Only the tail of the buffer is
//! inspected: when a single read delivers two frames back to back they are
//! yielded as one envelope and the payload will not parse.

use std::io;

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Start-of-block marker (`VT`).
pub const START_BLOCK: u8 = 0x0b;
/// End-of-block marker (`FS`).
pub const END_BLOCK: u8 = 0x1c;
/// Segment terminator (`CR`).
pub const CARRIAGE_RETURN: u8 = 0x0d;
/// Sequence closing every frame.
pub const TRAILER: [u8; 2] = [END_BLOCK, CARRIAGE_RETURN];

/// Returns `true` when `buf` ends with the frame trailer.
#[must_use]
pub fn is_complete(buf: &[u8]) -> bool { buf.ends_with(&TRAILER) }

/// A complete inbound envelope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    raw: Bytes,
}

impl Frame {
    /// Wrap raw envelope bytes.
    #[must_use]
    pub fn new(raw: Bytes) -> Self { Self { raw } }

    /// Envelope bytes exactly as received.
    #[must_use]
    pub fn raw(&self) -> &[u8] { &self.raw }

    /// Envelope bytes without the leading start marker and the trailer.
    ///
    /// The first byte is dropped whatever its value. Envelopes shorter than
    /// three bytes have an empty payload.
    #[must_use]
    pub fn payload(&self) -> &[u8] {
        if self.raw.len() < 3 {
            return &[];
        }
        &self.raw[1..self.raw.len() - TRAILER.len()]
    }

    /// Consume the frame, returning the envelope bytes.
    #[must_use]
    pub fn into_raw(self) -> Bytes { self.raw }
}

/// Outbound envelope contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundFrame {
    payload: Bytes,
    append_cr: bool,
}

impl OutboundFrame {
    /// Frame `payload`, inserting an extra `CR` before the trailer when
    /// `append_cr` is set.
    #[must_use]
    pub fn new(payload: impl Into<Bytes>, append_cr: bool) -> Self {
        Self {
            payload: payload.into(),
            append_cr,
        }
    }

    /// Number of bytes this frame occupies on the wire.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        1 + self.payload.len() + usize::from(self.append_cr) + TRAILER.len()
    }
}

/// Tokio codec for MLLP envelopes.
#[derive(Clone, Copy, Debug, Default)]
pub struct MllpCodec;

impl Decoder for MllpCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !is_complete(src) {
            return Ok(None);
        }
        // `split` hands the bytes over and leaves `src` empty while keeping
        // its allocation for the next frame.
        Ok(Some(Frame::new(src.split().freeze())))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // A partial frame at end of stream is left in the buffer for the
        // session to report; it is not an error here.
        self.decode(src)
    }
}

impl Encoder<OutboundFrame> for MllpCodec {
    type Error = io::Error;

    fn encode(&mut self, item: OutboundFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(item.encoded_len());
        dst.put_u8(START_BLOCK);
        dst.extend_from_slice(&item.payload);
        if item.append_cr {
            dst.put_u8(CARRIAGE_RETURN);
        }
        dst.extend_from_slice(&TRAILER);
        Ok(())
    }
}
