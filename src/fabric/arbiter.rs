//! Round-Robin Arbiter.
//!
//! The priority pointer names the initiator that wins the next tie. It only
//! moves when a grant actually completes its handshake, and then to the slot
//! just after the winner, so an initiator that keeps requesting is served
//! within `n` consecutive grants no matter what the others do.

/// Rotating-priority arbiter over `n` requesters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundRobinArbiter {
    n: usize,
    pointer: usize,
}

impl RoundRobinArbiter {
    /// Creates an arbiter over `n` requesters with priority at requester 0.
    pub fn new(n: usize) -> Self {
        Self { n, pointer: 0 }
    }

    /// Returns priority to requester 0.
    pub fn reset(&mut self) {
        self.pointer = 0;
    }

    /// Number of requesters.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Requester with the highest priority this cycle.
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Selects the first requesting index at or after the pointer.
    ///
    /// Pure: evaluating it any number of times within a cycle does not change
    /// the outcome.
    ///
    /// # Arguments
    ///
    /// * `requesting` - Predicate telling whether requester `i` is eligible.
    ///
    /// # Returns
    ///
    /// The selected requester, or `None` if nobody is eligible.
    pub fn pick(&self, requesting: impl Fn(usize) -> bool) -> Option<usize> {
        (0..self.n)
            .map(|offset| (self.pointer + offset) % self.n)
            .find(|&i| requesting(i))
    }

    /// Records a completed grant to `winner`, moving priority past it.
    pub fn advance(&mut self, winner: usize) {
        if self.n > 0 {
            self.pointer = (winner + 1) % self.n;
        }
    }
}
