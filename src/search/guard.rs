//! Request sequencing and cooperative cancellation.
//!
//! Cancellation only saves bandwidth. The sequence number is what keeps a
//! late response from overwriting newer state: a response is applied only if
//! the sequence captured when it was issued is still the latest one.

use tokio_util::sync::CancellationToken;

/// Handle for one issued fetch.
#[derive(Debug, Clone)]
pub struct FetchTicket {
    pub sequence: u64,
    pub cancel: CancellationToken,
}

#[derive(Debug, Default)]
pub struct RequestGuard {
    sequence: u64,
    in_flight: Option<CancellationToken>,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel whatever is in flight and start a new network request.
    pub fn issue(&mut self) -> FetchTicket {
        self.abort();
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());
        self.sequence += 1;
        FetchTicket {
            sequence: self.sequence,
            cancel,
        }
    }

    /// Advance the sequence without a network request, invalidating
    /// anything still in flight.
    pub fn supersede(&mut self) -> u64 {
        self.abort();
        self.sequence += 1;
        self.sequence
    }

    /// Fire the in-flight request's cancellation token, if any.
    pub fn abort(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }

    pub fn is_current(&self, sequence: u64) -> bool {
        self.sequence == sequence
    }

    /// Release the in-flight slot once the current request has resolved.
    pub fn finish(&mut self, sequence: u64) {
        if self.is_current(sequence) {
            self.in_flight = None;
        }
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_cancels_previous() {
        let mut guard = RequestGuard::new();
        let first = guard.issue();
        let second = guard.issue();

        assert!(first.cancel.is_cancelled());
        assert!(!second.cancel.is_cancelled());
        assert!(!guard.is_current(first.sequence));
        assert!(guard.is_current(second.sequence));
    }

    #[test]
    fn test_sequence_is_monotonic() {
        let mut guard = RequestGuard::new();
        let a = guard.issue().sequence;
        let b = guard.supersede();
        let c = guard.issue().sequence;
        assert!(a < b && b < c);
    }

    #[test]
    fn test_supersede_invalidates_in_flight() {
        let mut guard = RequestGuard::new();
        let ticket = guard.issue();
        guard.supersede();

        assert!(ticket.cancel.is_cancelled());
        assert!(!guard.is_current(ticket.sequence));
        assert!(!guard.has_in_flight());
    }

    #[test]
    fn test_finish_ignores_stale_sequence() {
        let mut guard = RequestGuard::new();
        let old = guard.issue();
        let new = guard.issue();

        guard.finish(old.sequence);
        assert!(guard.has_in_flight());
        guard.finish(new.sequence);
        assert!(!guard.has_in_flight());
    }

    #[test]
    fn test_abort_keeps_sequence() {
        let mut guard = RequestGuard::new();
        let ticket = guard.issue();
        guard.abort();

        assert!(ticket.cancel.is_cancelled());
        assert!(guard.is_current(ticket.sequence));
        assert_eq!(guard.sequence(), ticket.sequence);
    }
}
