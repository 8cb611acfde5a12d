//! Helpers shared by unit tests.

use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

use crate::{
    ack::Acknowledgment,
    frame::{START_BLOCK, TRAILER},
    handler::Handler,
    request::RequestOutcome,
    response::Response,
};

/// Minimal valid message with control id `MSG1`.
pub const SAMPLE: &str = "MSH|^~\\&|A|B|C|D|20240101120000||ADT^A01|MSG1|P|2.3";

/// Wrap `payload` in an MLLP envelope.
pub fn envelope(payload: impl AsRef<[u8]>) -> Vec<u8> {
    let mut wire = vec![START_BLOCK];
    wire.extend_from_slice(payload.as_ref());
    wire.extend_from_slice(&TRAILER);
    wire
}

/// One observed handler call.
#[derive(Debug)]
pub struct Invocation {
    pub outcome: RequestOutcome,
    pub ack: Option<Acknowledgment>,
}

/// Handler that sends every acknowledgment it is given and reports each
/// call on the returned channel.
pub fn recording_handler() -> (impl Handler, UnboundedReceiver<Invocation>) {
    let (tx, rx) = unbounded_channel();
    let handler = move |outcome: RequestOutcome, response: Option<Response>| {
        let tx = tx.clone();
        async move {
            let ack = response.as_ref().map(|r| r.ack().clone());
            if let Some(response) = response {
                let _ = response.send().await;
            }
            let _ = tx.send(Invocation { outcome, ack });
        }
    };
    (handler, rx)
}
