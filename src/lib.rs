#![doc(html_root_url = "https://docs.rs/hl7-mllp/latest")]
//! MLLP transport for HL7 v2 messages.
//!
//! The listener accepts TCP connections, reassembles the byte stream into
//! `<SB> payload <EB><CR>` frames, parses each payload into an HL7 message
//! and hands it to a caller-supplied [`Handler`] together with a
//! [`Response`] that writes a synthesised acknowledgment back to the peer.
//!
//! ```no_run
//! use hl7_mllp::{RequestOutcome, Response, server::MllpServer};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), hl7_mllp::server::ServerError> {
//! let handle = MllpServer::new(|outcome: RequestOutcome, response: Option<Response>| async move {
//!     if let Some(request) = outcome.request() {
//!         println!("{}^{} from {}", request.message_type(), request.event(), request.sender());
//!     }
//!     if let Some(response) = response {
//!         let _ = response.send().await;
//!     }
//! })
//! .start(2575)?;
//! handle.wait().await;
//! # Ok(())
//! # }
//! ```

pub mod ack;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod handler;
pub mod hl7;
pub mod metrics;
pub mod request;
pub mod response;
pub mod server;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use ack::{AckCode, Acknowledgment};
pub use encoding::{TextEncoding, UnknownEncoding};
pub use error::MllpError;
pub use frame::{Frame, MllpCodec};
pub use handler::Handler;
pub use hl7::{DefaultParser, FieldValue, Message, ParseError, Parser};
pub use metrics::{CONNECTIONS_ACTIVE, Direction, ERRORS_TOTAL, FRAMES_PROCESSED};
pub use request::{ErrorKind, FailedRequest, Request, RequestOutcome};
pub use response::Response;
pub use server::{ListenerHandle, MllpServer, ServerError};
pub use session::{ConnectionId, ConnectionSession, SessionConfig};
