//! Builder options for [`MllpServer`].

use std::time::Duration;

use tokio::sync::oneshot;

use super::{MllpServer, ServerState, Unbound};
use crate::{
    encoding::TextEncoding,
    handler::Handler,
    hl7::Parser,
    server::runtime::BackoffConfig,
    session::SessionConfig,
};

mod binding;


impl MllpServer<Unbound> {
    /// Create an unbound listener around `handler`.
    ///
    /// The worker count defaults to the number of available CPU cores (or 1
    /// if this cannot be determined). Frames are decoded as UTF-8 with the
    /// built-in parser and acknowledgments carry no extra `CR`.
    #[must_use]
    pub fn new<H: Handler>(handler: H) -> Self {
        let workers = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self {
            session: SessionConfig::new(handler),
            workers,
            backoff_config: BackoffConfig::default(),
            ready_tx: None,
            state: Unbound,
        }
    }
}

impl<S: ServerState> MllpServer<S> {
    /// Text encoding for inbound frames and outbound acknowledgments.
    #[must_use]
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.session = self.session.encoding(encoding);
        self
    }

    /// Replace the payload parser.
    #[must_use]
    pub fn parser<P: Parser>(mut self, parser: P) -> Self {
        self.session = self.session.parser(parser);
        self
    }

    /// Insert a `CR` before the trailer of every acknowledgment.
    #[must_use]
    pub fn append_cr(mut self, append_cr: bool) -> Self {
        self.session = self.session.append_cr(append_cr);
        self
    }

    /// Time allowed for a complete frame to arrive on a connection.
    #[must_use]
    pub fn read_timeout(mut self, limit: Option<Duration>) -> Self {
        self.session = self.session.read_timeout(limit);
        self
    }

    /// Set the number of accept tasks sharing the listener.
    #[must_use]
    pub fn workers(mut self, count: usize) -> Self {
        self.workers = count.max(1);
        self
    }

    /// Configure the back-off applied after failed `accept()` calls.
    #[must_use]
    pub fn accept_backoff(mut self, cfg: BackoffConfig) -> Self {
        self.backoff_config = cfg.normalized();
        self
    }

    /// Configure a channel used to signal when the listener is accepting.
    #[must_use]
    pub fn ready_signal(mut self, tx: oneshot::Sender<()>) -> Self {
        self.ready_tx = Some(tx);
        self
    }

    /// Returns the configured number of accept tasks.
    #[inline]
    #[must_use]
    pub const fn worker_count(&self) -> usize { self.workers }

    /// Settings handed to every connection session.
    #[must_use]
    pub fn session_config(&self) -> &SessionConfig { &self.session }
}
