//! Sequenced commit gate
//!
//! Workers finish their output work in any order, but events must be
//! acknowledged to the input side in the order their batches were sealed.
//! The gate keeps the next sequence number allowed to commit in a watch
//! channel: each worker waits for its batch's turn, commits, then advances
//! the value, which wakes every waiter so the successor can proceed.

use muster_event::Event;
use tokio::sync::watch;

/// Input-side collaborator receiving per-event acknowledgements
///
/// `commit` is invoked from inside the ordered-commit section: in sealed
/// order across batches and in append order within a batch, structural
/// entries included. Implementations should be quick - a slow commit
/// serialises all workers behind it.
pub trait CommitController: Send + Sync + 'static {
    /// Acknowledge one event back to the input side
    fn commit(&self, event: &Event);
}

/// Gate serialising batch commits by seal sequence
///
/// Invariant: a worker holding sequence S commits only after the worker
/// holding S−1 has finished its commit. Sequences are dense and every sealed
/// batch is held by exactly one worker, so the predecessor always exists and
/// progress follows by induction.
pub(crate) struct CommitGate {
    next: watch::Sender<u64>,
}

impl CommitGate {
    pub(crate) fn new() -> Self {
        let (next, _) = watch::channel(0);
        Self { next }
    }

    /// Subscribe a worker to gate updates
    pub(crate) fn subscribe(&self) -> watch::Receiver<u64> {
        self.next.subscribe()
    }

    /// Sequence number of the next batch allowed to commit
    pub(crate) fn next_seq(&self) -> u64 {
        *self.next.borrow()
    }

    /// Check whether `seq` could commit without waiting
    pub(crate) fn is_turn(&self, seq: u64) -> bool {
        self.next_seq() == seq
    }

    /// Wait until `seq` is allowed to commit
    ///
    /// Returns `false` if the gate was torn down while waiting.
    pub(crate) async fn wait_turn(&self, rx: &mut watch::Receiver<u64>, seq: u64) -> bool {
        rx.wait_for(|next| *next == seq).await.is_ok()
    }

    /// Mark the current sequence committed and wake all waiting workers
    ///
    /// Every waiter is looking for a different sequence value, so this must
    /// wake all of them, not just one.
    pub(crate) fn advance(&self) {
        self.next.send_modify(|next| *next += 1);
    }

    /// Wait until every sequence below `target` has committed
    pub(crate) async fn wait_drained(&self, target: u64) {
        let mut rx = self.subscribe();
        let _ = rx.wait_for(|next| *next >= target).await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn test_gate_starts_at_zero() {
        let gate = CommitGate::new();

        assert_eq!(gate.next_seq(), 0);
        assert!(gate.is_turn(0));
        assert!(!gate.is_turn(1));
    }

    #[tokio::test]
    async fn test_advance_wakes_successor() {
        let gate = Arc::new(CommitGate::new());

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move {
                let mut rx = gate.subscribe();
                gate.wait_turn(&mut rx, 1).await
            })
        };

        // seq 0 commits without waiting, which unblocks seq 1
        let mut rx = gate.subscribe();
        assert!(gate.wait_turn(&mut rx, 0).await);
        gate.advance();

        assert!(waiter.await.unwrap());
        assert_eq!(gate.next_seq(), 1);
    }

    #[tokio::test]
    async fn test_wait_drained() {
        let gate = CommitGate::new();

        gate.advance();
        gate.advance();
        gate.advance();

        gate.wait_drained(3).await;
        assert_eq!(gate.next_seq(), 3);
    }
}
