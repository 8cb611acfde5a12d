//! The handler slot invoked for every frame and connection close.

use std::{future::Future, sync::Arc};

use futures::{FutureExt, future::BoxFuture};

use crate::{request::RequestOutcome, response::Response};

/// Application logic driven by the listener.
///
/// Called once per completed frame, once per failed frame and once when a
/// peer closes its connection. A [`Response`] accompanies every outcome
/// except [`RequestOutcome::BenignClose`]. Calls on one connection are
/// sequential; calls on different connections may run in parallel.
///
/// Async closures taking `(RequestOutcome, Option<Response>)` implement this
/// trait.
///
/// ```
/// use hl7_mllp::{RequestOutcome, Response, server::MllpServer};
///
/// let _server = MllpServer::new(|outcome: RequestOutcome, response: Option<Response>| async move {
///     if let Some(request) = outcome.request() {
///         println!("{} from {}", request.message_type(), request.sender());
///     }
///     if let Some(response) = response {
///         let _ = response.send().await;
///     }
/// });
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Handle one outcome.
    fn handle(&self, outcome: RequestOutcome, response: Option<Response>) -> BoxFuture<'static, ()>;
}

impl<F, Fut> Handler for F
where
    F: Fn(RequestOutcome, Option<Response>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn handle(&self, outcome: RequestOutcome, response: Option<Response>) -> BoxFuture<'static, ()> {
        self(outcome, response).boxed()
    }
}

/// Shared handler reference held by the listener and every session.
pub type BoxedHandler = Arc<dyn Handler>;
