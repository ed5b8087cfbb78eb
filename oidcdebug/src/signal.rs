use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use tracing::warn;

use crate::error::FlowError;

/// The terminal outcome of a flow run.
pub(crate) type Outcome = Result<(), FlowError>;

/// Single-slot completion signal of a flow run.
///
/// The slot can be claimed exactly once. Whoever claims it owns the right to
/// resolve the run; every later claim gets nothing.
#[derive(Debug, Clone)]
pub(crate) struct Completion {
    slot: Arc<Mutex<Option<oneshot::Sender<Outcome>>>>,
}

/// The claimed right to resolve a flow run.
#[derive(Debug)]
pub(crate) struct Resolver {
    tx: oneshot::Sender<Outcome>,
}

impl Completion {
    pub(crate) fn new() -> (Self, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let completion = Self {
            slot: Arc::new(Mutex::new(Some(tx))),
        };
        (completion, rx)
    }

    /// Claims the slot. Returns `None` if it was claimed before.
    pub(crate) fn claim(&self) -> Option<Resolver> {
        let tx = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if tx.is_none() {
            warn!("flow already completed");
        }
        tx.map(|tx| Resolver { tx })
    }

    /// Claims the slot and resolves it right away.
    /// Returns false if the slot was claimed before.
    pub(crate) fn complete(&self, outcome: Outcome) -> bool {
        match self.claim() {
            Some(resolver) => {
                resolver.resolve(outcome);
                true
            }
            None => false,
        }
    }
}

impl Resolver {
    pub(crate) fn resolve(self, outcome: Outcome) {
        if self.tx.send(outcome).is_err() {
            warn!("nobody is waiting for the flow to complete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completion_resolves_once() {
        // given
        let (completion, rx) = Completion::new();
        let other = completion.clone();

        // when
        let first = completion.complete(Ok(()));
        let second = other.complete(Err(FlowError::Aborted));

        // then
        assert!(first);
        assert!(!second);
        assert!(rx.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_claim_blocks_later_claims() {
        // given
        let (completion, rx) = Completion::new();
        let resolver = completion.claim().unwrap();

        // when
        let late = completion.claim();
        resolver.resolve(Err(FlowError::Aborted));

        // then
        assert!(late.is_none());
        assert!(matches!(rx.await.unwrap(), Err(FlowError::Aborted)));
    }

    #[tokio::test]
    async fn test_resolve_without_receiver() {
        let (completion, rx) = Completion::new();
        drop(rx);

        assert!(completion.complete(Ok(())));
    }
}
