//! TCP listener that hands each accepted connection to a
//! [`ConnectionSession`](crate::session::ConnectionSession).
//!
//! `MllpServer` spawns accept tasks that share one listener. Every accepted
//! stream runs on its own tracked task, so a slow or panicking connection
//! never blocks the others.

use std::sync::Arc;

use tokio::{net::TcpListener, sync::oneshot};

use crate::session::SessionConfig;

/// MLLP listener with one handler slot.
///
/// The server carries a typestate `S` indicating whether it is [`Unbound`]
/// (not yet bound to a TCP listener) or [`Bound`]. New servers start
/// `Unbound` and must call [`MllpServer::bind`] or
/// [`MllpServer::bind_existing_listener`] before they can be spawned or run.
/// [`MllpServer::start`] binds and spawns in one step.
pub struct MllpServer<S = Unbound>
where
    S: ServerState,
{
    pub(crate) session: SessionConfig,
    pub(crate) workers: usize,
    pub(crate) backoff_config: BackoffConfig,
    /// Notified once every accept task has been spawned.
    ///
    /// A `oneshot::Sender` carries a single notification, so a fresh sender
    /// is needed for each start.
    pub(crate) ready_tx: Option<oneshot::Sender<()>>,
    pub(crate) state: S,
}

/// Marker indicating the server has not yet bound a listener.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbound;

/// Marker indicating the server is bound to a TCP listener.
#[derive(Debug, Clone)]
pub struct Bound {
    pub(crate) listener: Arc<TcpListener>,
}

/// Trait implemented by [`Unbound`] and [`Bound`] to model binding typestate.
pub trait ServerState: sealed::Sealed {}

mod sealed {
    //! Prevent external implementations of [`ServerState`].

    pub trait Sealed {}
    impl Sealed for super::Unbound {}
    impl Sealed for super::Bound {}
}

impl ServerState for Unbound {}
impl ServerState for Bound {}

impl<S: ServerState> std::fmt::Debug for MllpServer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MllpServer")
            .field("session", &self.session)
            .field("workers", &self.workers)
            .field("backoff_config", &self.backoff_config)
            .finish_non_exhaustive()
    }
}

mod config;
mod connection;
pub mod error;
mod runtime;

pub use error::ServerError;
pub use runtime::{BackoffConfig, ListenerHandle};

#[cfg(test)]
pub(crate) mod test_util;
