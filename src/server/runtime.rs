//! Runtime control for [`MllpServer`].

mod accept;
mod backoff;

use std::{
    net::{Ipv4Addr, SocketAddr},
    sync::Arc,
};

#[cfg(test)]
pub(super) use accept::MockAcceptListener;
pub(super) use accept::{AcceptLoopOptions, accept_loop};
pub use backoff::BackoffConfig;
use futures::Future;
use log::{info, warn};
use tokio::{select, signal};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use super::{Bound, MllpServer, ServerError, Unbound};

/// Control handle for a listener started with [`MllpServer::spawn`] or
/// [`MllpServer::start`].
///
/// Clones control the same listener.
#[derive(Clone, Debug)]
pub struct ListenerHandle {
    shutdown: CancellationToken,
    tracker: TaskTracker,
    local_addr: Option<SocketAddr>,
}

impl ListenerHandle {
    /// Stop accepting new connections.
    ///
    /// Sessions that are already open keep running until their peers close
    /// them.
    pub fn stop(&self) { self.shutdown.cancel(); }

    /// Whether [`stop`](Self::stop) has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool { self.shutdown.is_cancelled() }

    /// Resolve once the accept tasks and every live session have finished.
    pub async fn wait(&self) { self.tracker.wait().await; }

    /// Address the listener is bound to.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> { self.local_addr }
}

impl MllpServer<Unbound> {
    /// Bind `0.0.0.0:port` and start accepting.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// Returns [`ServerError::Bind`] if the port cannot be bound.
    pub fn start(self, port: u16) -> Result<ListenerHandle, ServerError> {
        Ok(self
            .bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))?
            .spawn())
    }
}

impl MllpServer<Bound> {
    /// Spawn the accept tasks and return immediately.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(self) -> ListenerHandle {
        let local_addr = self.local_addr();
        let MllpServer {
            session,
            workers,
            backoff_config,
            ready_tx,
            state: Bound { listener },
        } = self;
        let shutdown = CancellationToken::new();
        let tracker = TaskTracker::new();

        for _ in 0..workers {
            tracker.spawn(accept_loop(
                Arc::clone(&listener),
                AcceptLoopOptions {
                    session: session.clone(),
                    shutdown: shutdown.clone(),
                    tracker: tracker.clone(),
                    backoff: backoff_config,
                },
            ));
        }
        // Closed trackers still accept sessions; `wait` resolves when empty.
        tracker.close();
        info!("listening: local_addr={local_addr:?}, workers={workers}");

        if let Some(tx) = ready_tx
            && tx.send(()).is_err()
        {
            warn!("Failed to send readiness signal: receiver dropped");
        }

        ListenerHandle {
            shutdown,
            tracker,
            local_addr,
        }
    }

    /// Run the listener until Ctrl-C is received.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use hl7_mllp::{RequestOutcome, Response, server::MllpServer};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), hl7_mllp::server::ServerError> {
    /// MllpServer::new(|_: RequestOutcome, response: Option<Response>| async move {
    ///     if let Some(response) = response {
    ///         let _ = response.send().await;
    ///     }
    /// })
    /// .bind(([127, 0, 0, 1], 2575).into())?
    /// .run()
    /// .await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// Attempting to run a server without binding fails to compile:
    ///
    /// ```compile_fail
    /// use hl7_mllp::{RequestOutcome, Response, server::MllpServer};
    ///
    /// async fn try_run() {
    ///     MllpServer::new(|_: RequestOutcome, _: Option<Response>| async {})
    ///         .run()
    ///         .await
    ///         .expect("unbound servers do not expose run()");
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// Accept failures are retried with exponential back-off and do not
    /// surface as errors.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(async {
            let _ = signal::ctrl_c().await;
        })
        .await
    }

    /// Run the listener until `shutdown` resolves, then wait for open
    /// sessions to finish.
    ///
    /// # Errors
    ///
    /// Accept failures are retried with exponential back-off and do not
    /// surface as errors.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let handle = self.spawn();

        select! {
            () = shutdown => handle.stop(),
            () = handle.wait() => {},
        }

        handle.wait().await;
        Ok(())
    }
}
