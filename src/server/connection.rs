//! Connection task spawning for [`MllpServer`](super::MllpServer).

use std::{any::Any, fmt, net::SocketAddr};

use futures::FutureExt;
use log::{debug, error};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::task::TaskTracker;

use crate::{
    metrics,
    session::{ConnectionId, ConnectionSession, SessionConfig},
};

/// Spawn a task running one connection session, logging and discarding any
/// panics.
pub(super) fn spawn_connection_task<S>(
    stream: S,
    peer_addr: SocketAddr,
    session: SessionConfig,
    tracker: &TaskTracker,
) where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    let id = ConnectionId::next();
    debug!("connection accepted: connection={id}, peer_addr={peer_addr}");
    metrics::inc_connections();
    tracker.spawn(async move {
        let fut = std::panic::AssertUnwindSafe(ConnectionSession::new(id, session).run(stream))
            .catch_unwind();
        let result = fut.await;
        metrics::dec_connections();

        match result {
            Ok(()) => debug!("connection closed: connection={id}, peer_addr={peer_addr}"),
            Err(panic) => {
                metrics::inc_connection_panics();
                let panic_msg = PanicMessage(panic);
                // Emit via both `log` and `tracing` for tests that capture either.
                error!(
                    "connection task panicked: panic={panic_msg}, connection={id}, \
                     peer_addr={peer_addr}"
                );
                tracing::error!(panic = %panic_msg, %id, %peer_addr, "connection task panicked");
            }
        }
    });
}

/// Formats a panic payload as its message when it is a string.
struct PanicMessage(Box<dyn Any + Send>);

impl fmt::Display for PanicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(s) = self.0.downcast_ref::<String>() {
            f.write_str(s)
        } else if let Some(s) = self.0.downcast_ref::<&'static str>() {
            f.write_str(s)
        } else {
            write!(f, "{:?}", self.0)
        }
    }
}
