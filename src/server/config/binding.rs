//! Listener binding for [`MllpServer`].

use std::{
    net::{SocketAddr, TcpListener as StdTcpListener},
    sync::Arc,
};

use tokio::net::TcpListener;

use super::{ServerState, Unbound};
use crate::server::{Bound, MllpServer, ServerError};

impl<S: ServerState> MllpServer<S> {
    fn bind_to_listener(self, std_listener: StdTcpListener) -> Result<MllpServer<Bound>, ServerError> {
        let MllpServer {
            session,
            workers,
            backoff_config,
            ready_tx,
            ..
        } = self;

        std_listener
            .set_nonblocking(true)
            .map_err(ServerError::Bind)?;
        let tokio_listener = TcpListener::from_std(std_listener).map_err(ServerError::Bind)?;

        Ok(MllpServer {
            session,
            workers,
            backoff_config,
            ready_tx,
            state: Bound {
                listener: Arc::new(tokio_listener),
            },
        })
    }
}

impl MllpServer<Unbound> {
    /// Return `None` as the server is not bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use hl7_mllp::{RequestOutcome, Response, server::MllpServer};
    ///
    /// let server = MllpServer::new(|_: RequestOutcome, _: Option<Response>| async {});
    /// assert!(server.local_addr().is_none());
    /// ```
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> { None }

    /// Bind to a fresh address.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::net::{Ipv4Addr, SocketAddr};
    ///
    /// use hl7_mllp::{RequestOutcome, Response, server::MllpServer};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
    /// let server = MllpServer::new(|_: RequestOutcome, _: Option<Response>| async {})
    ///     .bind(addr)
    ///     .expect("bind failed");
    /// assert!(server.local_addr().is_some());
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns a [`ServerError`] if binding or configuring the listener fails.
    pub fn bind(self, addr: SocketAddr) -> Result<MllpServer<Bound>, ServerError> {
        let std_listener = StdTcpListener::bind(addr).map_err(ServerError::Bind)?;
        self.bind_existing_listener(std_listener)
    }

    /// Bind to an existing `StdTcpListener`.
    ///
    /// # Errors
    /// Returns a [`ServerError`] if configuring the listener fails.
    pub fn bind_existing_listener(
        self,
        std_listener: StdTcpListener,
    ) -> Result<MllpServer<Bound>, ServerError> {
        self.bind_to_listener(std_listener)
    }
}

impl MllpServer<Bound> {
    /// Returns the bound address, or `None` if retrieving it fails.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> { self.state.listener.local_addr().ok() }

    /// Rebind to a fresh address.
    ///
    /// # Errors
    /// Returns a [`ServerError`] if binding or configuring the listener fails.
    pub fn bind(self, addr: SocketAddr) -> Result<Self, ServerError> {
        let std_listener = StdTcpListener::bind(addr).map_err(ServerError::Bind)?;
        self.bind_existing_listener(std_listener)
    }

    /// Rebind using an existing `StdTcpListener`.
    ///
    /// # Errors
    /// Returns a [`ServerError`] if configuring the listener fails.
    pub fn bind_existing_listener(self, std_listener: StdTcpListener) -> Result<Self, ServerError> {
        self.bind_to_listener(std_listener)
    }
}
