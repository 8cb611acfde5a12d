//! Accept loop shared by the listener's worker tasks.

use std::{io, net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use log::warn;
use tokio::{
    net::{TcpListener, TcpStream},
    select,
    time::{Duration, sleep},
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use super::backoff::BackoffConfig;
use crate::{
    server::{ServerError, connection::spawn_connection_task},
    session::SessionConfig,
};

/// Source of incoming connections consumed by the accept loop.
///
/// Dropping a pending `accept()` future must not leak resources.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub(in crate::server) trait AcceptListener: Send + Sync {
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)>;
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

#[async_trait]
impl AcceptListener for TcpListener {
    async fn accept(&self) -> io::Result<(TcpStream, SocketAddr)> {
        TcpListener::accept(self).await
    }

    fn local_addr(&self) -> io::Result<SocketAddr> { TcpListener::local_addr(self) }
}

#[derive(Debug, Clone)]
pub(in crate::server) struct AcceptLoopOptions {
    pub session: SessionConfig,
    pub shutdown: CancellationToken,
    pub tracker: TaskTracker,
    pub backoff: BackoffConfig,
}

/// Accept connections from `listener` until `options.shutdown` is cancelled.
///
/// Each accepted stream gets its own session task on `options.tracker`.
/// Failed accepts are logged and retried after an exponential back-off.
pub(in crate::server) async fn accept_loop<L>(listener: Arc<L>, options: AcceptLoopOptions)
where
    L: AcceptListener + 'static,
{
    let backoff = options.backoff.normalized();
    debug_assert!(
        backoff.initial_delay <= backoff.max_delay,
        "BackoffConfig invariant violated: initial_delay > max_delay"
    );
    let mut delay = backoff.initial_delay;
    while let Some(next_delay) = accept_iteration(listener.as_ref(), &options, &backoff, delay).await
    {
        delay = next_delay;
    }
}

async fn accept_iteration<L>(
    listener: &L,
    options: &AcceptLoopOptions,
    backoff: &BackoffConfig,
    delay: Duration,
) -> Option<Duration>
where
    L: AcceptListener,
{
    select! {
        biased;

        () = options.shutdown.cancelled() => None,
        res = listener.accept() => Some(match res {
            Ok((stream, peer_addr)) => {
                spawn_connection_task(stream, peer_addr, options.session.clone(), &options.tracker);
                backoff.initial_delay
            }
            Err(e) => {
                let local_addr = listener.local_addr().ok();
                let err = ServerError::Accept(e);
                warn!("{err}: local_addr={local_addr:?}, retry_in={delay:?}");
                sleep(delay).await;
                backoff.next_delay(delay)
            }
        }),
    }
}
