//! Quote status machine.

use serde::{Deserialize, Serialize};

/// The status of a quote in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──┬──► Accepted
///           └──► Rejected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum QuoteStatus {
    /// Awaiting a decision.
    #[default]
    Pending,

    /// Approved by the business (terminal state).
    Accepted,

    /// Declined, optionally with a reason (terminal state).
    Rejected,
}

impl QuoteStatus {
    /// Returns true if the quote can be accepted from this status.
    pub fn can_accept(&self) -> bool {
        matches!(self, QuoteStatus::Pending)
    }

    /// Returns true if the quote can be rejected from this status.
    pub fn can_reject(&self) -> bool {
        matches!(self, QuoteStatus::Pending)
    }

    /// Returns true if this is a terminal status (no further transitions).
    pub fn is_terminal(&self) -> bool {
        matches!(self, QuoteStatus::Accepted | QuoteStatus::Rejected)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pending => "Pending",
            QuoteStatus::Accepted => "Accepted",
            QuoteStatus::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_pending() {
        assert_eq!(QuoteStatus::default(), QuoteStatus::Pending);
    }

    #[test]
    fn only_pending_can_accept() {
        assert!(QuoteStatus::Pending.can_accept());
        assert!(!QuoteStatus::Accepted.can_accept());
        assert!(!QuoteStatus::Rejected.can_accept());
    }

    #[test]
    fn only_pending_can_reject() {
        assert!(QuoteStatus::Pending.can_reject());
        assert!(!QuoteStatus::Accepted.can_reject());
        assert!(!QuoteStatus::Rejected.can_reject());
    }

    #[test]
    fn terminal_statuses() {
        assert!(!QuoteStatus::Pending.is_terminal());
        assert!(QuoteStatus::Accepted.is_terminal());
        assert!(QuoteStatus::Rejected.is_terminal());
    }

    #[test]
    fn display() {
        assert_eq!(QuoteStatus::Pending.to_string(), "Pending");
        assert_eq!(QuoteStatus::Accepted.to_string(), "Accepted");
        assert_eq!(QuoteStatus::Rejected.to_string(), "Rejected");
    }

    #[test]
    fn serialization_roundtrip() {
        let status = QuoteStatus::Accepted;
        let json = serde_json::to_string(&status).unwrap();
        let deserialized: QuoteStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(status, deserialized);
    }
}
