//! Single-use acknowledgment sender.

use std::{fmt, io, sync::Arc};

use futures::SinkExt;
use tokio::{io::AsyncWrite, sync::Mutex};
use tokio_util::codec::FramedWrite;

use crate::{
    ack::Acknowledgment,
    encoding::TextEncoding,
    frame::{MllpCodec, OutboundFrame},
    metrics::{self, Direction},
};

/// Write half of a connection, type-erased.
pub(crate) type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Framed writer shared by every response issued on one connection.
pub(crate) type SharedWriter = Arc<Mutex<FramedWrite<BoxedWriter, MllpCodec>>>;

pub(crate) fn shared_writer(writer: BoxedWriter) -> SharedWriter {
    Arc::new(Mutex::new(FramedWrite::new(writer, MllpCodec)))
}

/// Sends one acknowledgment back to the peer that sent the frame.
///
/// [`send`](Self::send) consumes the handle, so each frame is answered at
/// most once. Dropping the handle without sending leaves the frame
/// unacknowledged.
pub struct Response {
    ack: Acknowledgment,
    encoding: TextEncoding,
    writer: SharedWriter,
}

impl Response {
    pub(crate) fn new(ack: Acknowledgment, encoding: TextEncoding, writer: SharedWriter) -> Self {
        Self {
            ack,
            encoding,
            writer,
        }
    }

    /// The acknowledgment that will be sent.
    #[must_use]
    pub fn ack(&self) -> &Acknowledgment { &self.ack }

    /// Adjust the acknowledgment before sending it.
    pub fn ack_mut(&mut self) -> &mut Acknowledgment { &mut self.ack }

    /// Frame, write and flush the acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the peer has gone away.
    pub async fn send(self) -> io::Result<()> {
        let payload = self.encoding.encode(&self.ack.to_string());
        let frame = OutboundFrame::new(payload, self.ack.append_cr());
        self.writer.lock().await.send(frame).await?;
        metrics::inc_frames(Direction::Outbound);
        metrics::inc_acks(self.ack.code());
        Ok(())
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("ack", &self.ack)
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}
