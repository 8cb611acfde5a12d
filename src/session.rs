//! Per-connection framing state machine.
//!
//! A [`ConnectionSession`] owns the read buffer of exactly one connection.
//! Bytes accumulate until the buffer ends with the frame trailer; the
//! envelope is then decoded, parsed and dispatched to the handler, and the
//! buffer is emptied whether or not the payload parsed. The handler future
//! is awaited before the next read, so frames on one connection never
//! overlap.

use std::{
    fmt,
    io,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use bytes::BytesMut;
use futures::StreamExt;
use log::{debug, warn};
use tokio::{
    io::{AsyncRead, AsyncWrite, ReadHalf},
    time::timeout,
};
use tokio_util::codec::FramedRead;

use crate::{
    ack::Acknowledgment,
    encoding::TextEncoding,
    frame::{Frame, MllpCodec},
    handler::{BoxedHandler, Handler},
    hl7::{DefaultParser, Parser},
    metrics::{self, Direction},
    request::{ErrorKind, Request, RequestOutcome},
    response::{Response, SharedWriter, shared_writer},
};

/// Identifier assigned to a connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Create a new [`ConnectionId`] with the provided value.
    #[must_use]
    pub fn new(id: u64) -> Self { Self(id) }

    /// Allocate the next process-wide identifier.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Return the inner `u64` representation.
    #[must_use]
    pub fn as_u64(&self) -> u64 { self.0 }
}

impl From<u64> for ConnectionId {
    fn from(value: u64) -> Self { Self(value) }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConnectionId({})", self.0)
    }
}

/// Settings shared by every session a listener creates.
#[derive(Clone)]
pub struct SessionConfig {
    pub(crate) handler: BoxedHandler,
    pub(crate) parser: Arc<dyn Parser>,
    pub(crate) encoding: TextEncoding,
    pub(crate) append_cr: bool,
    pub(crate) read_timeout: Option<Duration>,
}

impl SessionConfig {
    /// Defaults: [`DefaultParser`], UTF-8, no extra `CR`, no read timeout.
    #[must_use]
    pub fn new<H: Handler>(handler: H) -> Self {
        Self {
            handler: Arc::new(handler),
            parser: Arc::new(DefaultParser),
            encoding: TextEncoding::default(),
            append_cr: false,
            read_timeout: None,
        }
    }

    /// Replace the payload parser.
    #[must_use]
    pub fn parser<P: Parser>(mut self, parser: P) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Encoding for inbound frames and outbound acknowledgments.
    #[must_use]
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Insert a `CR` before the trailer of every acknowledgment.
    #[must_use]
    pub fn append_cr(mut self, append_cr: bool) -> Self {
        self.append_cr = append_cr;
        self
    }

    /// Time allowed between reads before the session gives up.
    ///
    /// `None`, the default, waits indefinitely. When the limit elapses with
    /// a partial frame buffered, the session reports a socket failure with
    /// [`io::ErrorKind::TimedOut`] and ends. An idle connection with nothing
    /// buffered is closed as a benign close, so no acknowledgment is sent.
    #[must_use]
    pub fn read_timeout(mut self, limit: Option<Duration>) -> Self {
        self.read_timeout = limit;
        self
    }

    /// Configured encoding.
    #[must_use]
    pub fn text_encoding(&self) -> TextEncoding { self.encoding }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("encoding", &self.encoding)
            .field("append_cr", &self.append_cr)
            .field("read_timeout", &self.read_timeout)
            .finish_non_exhaustive()
    }
}

/// Drives one connection from first byte to close.
#[derive(Debug)]
pub struct ConnectionSession {
    id: ConnectionId,
    config: SessionConfig,
}

impl ConnectionSession {
    /// Create a session for connection `id`.
    #[must_use]
    pub fn new(id: ConnectionId, config: SessionConfig) -> Self { Self { id, config } }

    /// Identifier of the connection.
    #[must_use]
    pub fn id(&self) -> ConnectionId { self.id }

    /// Process `stream` until the peer closes it or the transport fails.
    pub async fn run<S>(self, stream: S)
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        let writer = shared_writer(Box::new(writer));
        let mut frames = FramedRead::new(reader, MllpCodec);

        loop {
            match self.next_frame(&mut frames).await {
                Some(Ok(frame)) => self.on_frame(&frame, &writer).await,
                Some(Err(err)) => {
                    self.on_socket_error(err, frames.read_buffer_mut(), &writer)
                        .await;
                    break;
                }
                None => {
                    self.on_close(frames.read_buffer_mut()).await;
                    break;
                }
            }
        }
    }

    async fn next_frame<R>(
        &self,
        frames: &mut FramedRead<ReadHalf<R>, MllpCodec>,
    ) -> Option<io::Result<Frame>>
    where
        R: AsyncRead,
    {
        let Some(limit) = self.config.read_timeout else {
            return frames.next().await;
        };
        match timeout(limit, frames.next()).await {
            Ok(next) => next,
            Err(_) if frames.read_buffer().is_empty() => {
                debug!("closing idle connection: connection={}", self.id);
                None
            }
            Err(_) => Some(Err(io::Error::new(
                io::ErrorKind::TimedOut,
                "frame not completed before read timeout",
            ))),
        }
    }

    async fn on_frame(&self, frame: &Frame, writer: &SharedWriter) {
        metrics::inc_frames(Direction::Inbound);
        let encoding = self.config.encoding;
        let raw = encoding.decode(frame.raw());
        let payload = encoding.decode(frame.payload());

        let (outcome, ack) = match self.config.parser.parse(&payload) {
            Ok(message) => {
                let ack = Acknowledgment::from_message(&message);
                (RequestOutcome::Ok(Request::new(message, raw)), ack)
            }
            Err(err) => {
                warn!("frame parse failed: connection={}, error={err}", self.id);
                metrics::inc_errors(ErrorKind::Parse);
                (
                    RequestOutcome::parse_failure(raw, err),
                    Acknowledgment::from_failure(),
                )
            }
        };
        self.dispatch(outcome, Some(self.respond(ack, writer)))
            .await;
    }

    async fn on_socket_error(&self, err: io::Error, buffer: &mut BytesMut, writer: &SharedWriter) {
        warn!("socket error: connection={}, error={err}", self.id);
        metrics::inc_errors(ErrorKind::Socket);
        let raw = self.config.encoding.decode(&buffer.split());
        let outcome = RequestOutcome::socket_failure(raw, err);
        let response = self.respond(Acknowledgment::from_failure(), writer);
        self.dispatch(outcome, Some(response)).await;
    }

    async fn on_close(&self, buffer: &mut BytesMut) {
        if !buffer.is_empty() {
            debug!(
                "dropping partial frame on close: connection={}, bytes={}",
                self.id,
                buffer.len()
            );
            buffer.clear();
        }
        self.dispatch(RequestOutcome::BenignClose, None).await;
    }

    fn respond(&self, ack: Acknowledgment, writer: &SharedWriter) -> Response {
        Response::new(
            ack.with_append_cr(self.config.append_cr),
            self.config.encoding,
            Arc::clone(writer),
        )
    }

    async fn dispatch(&self, outcome: RequestOutcome, response: Option<Response>) {
        self.config.handler.handle(outcome, response).await;
    }
}
