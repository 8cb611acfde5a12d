//! Helpers shared by the integration tests.
#![allow(dead_code, reason = "each test crate uses a subset of the helpers")]

use futures::StreamExt;
use hl7_mllp::{
    Acknowledgment,
    DefaultParser,
    Handler,
    Message,
    MllpCodec,
    Parser,
    RequestOutcome,
    Response,
    frame::{START_BLOCK, TRAILER},
};
use tokio::{
    io::AsyncWriteExt,
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc::{UnboundedReceiver, unbounded_channel},
    time::{Duration, timeout},
};
use tokio_util::codec::FramedRead;

/// Minimal valid message with control id `MSG1`.
pub const SAMPLE: &str = "MSH|^~\\&|A|B|C|D|20240101120000||ADT^A01|MSG1|P|2.3";

/// Wrap `payload` in an MLLP envelope.
pub fn envelope(payload: impl AsRef<[u8]>) -> Vec<u8> {
    let mut wire = vec![START_BLOCK];
    wire.extend_from_slice(payload.as_ref());
    wire.extend_from_slice(&TRAILER);
    wire
}

/// `SAMPLE` with a different control id.
pub fn sample_with_id(id: &str) -> String { SAMPLE.replace("MSG1", id) }

/// One observed handler call.
#[derive(Debug)]
pub struct Call {
    pub outcome: RequestOutcome,
    pub ack: Option<Acknowledgment>,
}

/// Handler sending every acknowledgment and reporting each call.
pub fn recording_handler() -> (impl Handler, UnboundedReceiver<Call>) {
    let (tx, rx) = unbounded_channel();
    let handler = move |outcome: RequestOutcome, response: Option<Response>| {
        let tx = tx.clone();
        async move {
            let ack = response.as_ref().map(|r| r.ack().clone());
            if let Some(response) = response {
                let _ = response.send().await;
            }
            let _ = tx.send(Call { outcome, ack });
        }
    };
    (handler, rx)
}

/// Wait up to five seconds for the next handler call.
pub async fn next_call(rx: &mut UnboundedReceiver<Call>) -> Call {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("handler call in time")
        .expect("handler channel open")
}

/// Client side of one MLLP connection.
pub struct Client {
    acks: FramedRead<OwnedReadHalf, MllpCodec>,
    tx: Option<OwnedWriteHalf>,
}

impl Client {
    pub async fn connect(addr: std::net::SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let (rx, tx) = stream.into_split();
        Self {
            acks: FramedRead::new(rx, MllpCodec),
            tx: Some(tx),
        }
    }

    pub async fn write(&mut self, bytes: &[u8]) {
        self.tx
            .as_mut()
            .expect("write half open")
            .write_all(bytes)
            .await
            .expect("write");
    }

    /// Read the next acknowledgment and parse it.
    pub async fn ack(&mut self) -> Message {
        let frame = timeout(Duration::from_secs(5), self.acks.next())
            .await
            .expect("ack in time")
            .expect("ack frame")
            .expect("ack read");
        let text = String::from_utf8(frame.payload().to_vec()).expect("utf-8 ack");
        DefaultParser.parse(&text).expect("ack parses")
    }

    /// Close the write half; the server sees end of stream.
    pub async fn finish(&mut self) {
        if let Some(mut tx) = self.tx.take() {
            tx.shutdown().await.expect("shutdown");
        }
    }
}

/// `MSA-1` and `MSA-2` of an acknowledgment.
pub fn msa(ack: &Message) -> (String, String) {
    let field = |n| {
        ack.segment_field("MSA", n)
            .map(|v| v.to_string())
            .unwrap_or_default()
    };
    (field(1), field(2))
}
