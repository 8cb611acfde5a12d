//! Test helpers shared across server modules.

use std::net::{Ipv4Addr, SocketAddr, TcpListener as StdTcpListener};

use rstest::fixture;

use super::{Bound, MllpServer, Unbound};
use crate::{handler::Handler, request::RequestOutcome, response::Response};

/// Handler that sends every acknowledgment it receives.
#[fixture]
pub fn acking_handler() -> impl Handler + Clone {
    |_: RequestOutcome, response: Option<Response>| async move {
        if let Some(response) = response {
            let _ = response.send().await;
        }
    }
}

#[fixture]
/// Returns a bound [`StdTcpListener`] on a free port for use in tests.
///
/// Keeping the listener bound prevents race conditions where another
/// process could claim the port between discovery and use.
pub fn free_listener() -> StdTcpListener {
    let addr = SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0);
    StdTcpListener::bind(addr).expect("Failed to bind free port listener")
}

/// Unbound server around `handler`.
pub fn server<H: Handler>(handler: H) -> MllpServer<Unbound> { MllpServer::new(handler) }

pub fn bind_server<H: Handler>(handler: H, listener: StdTcpListener) -> MllpServer<Bound> {
    MllpServer::new(handler)
        .bind_existing_listener(listener)
        .expect("Failed to bind")
}
