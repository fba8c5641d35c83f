use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;

use crate::error::{Outcome, PopulateError, PopulateFailure};

/// Create a linked resolver/completion pair.
pub fn channel() -> (Resolver, Completion) {
    let (tx, rx) = oneshot::channel();
    (Resolver { tx }, Completion { rx })
}

/// Write side of a [`Completion`]. Resolving consumes it, so an outcome is
/// delivered at most once.
#[derive(Debug)]
pub struct Resolver {
    tx: oneshot::Sender<Outcome>,
}

impl Resolver {
    /// Deliver `outcome`. Dropped silently if the completion is gone.
    pub fn resolve(self, outcome: Outcome) {
        let _ = self.tx.send(outcome);
    }
}

/// Eventual result of a populate call.
///
/// Await it, or call [`Completion::wait`] from synchronous code. If the
/// resolver is dropped without resolving, the outcome is a
/// [`PopulateError::Canceled`] failure.
#[derive(Debug)]
pub struct Completion {
    rx: oneshot::Receiver<Outcome>,
}

impl Completion {
    /// Block the current thread until the outcome is available.
    pub fn wait(self) -> Outcome {
        futures::executor::block_on(self)
    }

    /// Take the outcome if it is already available.
    pub fn try_take(&mut self) -> Option<Outcome> {
        match self.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::Canceled) => Some(Err(canceled())),
        }
    }
}

impl Future for Completion {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Outcome> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(canceled())))
    }
}

fn canceled() -> PopulateFailure {
    PopulateFailure::new(PopulateError::Canceled, Vec::new())
}
