//! De-duplication of "verified" identity signals

use std::collections::HashSet;

/// Remembers which (session, student) pairs have already produced a
/// verified signal this page visit.
#[derive(Debug, Default)]
pub struct VerifiedLedger {
    seen: HashSet<(String, String)>,
}

impl VerifiedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// True exactly once per (session, student) pair
    pub fn first_sighting(&mut self, session_id: &str, student_id: &str) -> bool {
        self.seen
            .insert((session_id.to_string(), student_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_most_once_per_pair() {
        let mut ledger = VerifiedLedger::new();

        assert!(ledger.first_sighting("sess-1", "S1"));
        assert!(!ledger.first_sighting("sess-1", "S1"));
        assert!(!ledger.first_sighting("sess-1", "S1"));
    }

    #[test]
    fn test_new_session_or_student_counts_again() {
        let mut ledger = VerifiedLedger::new();

        assert!(ledger.first_sighting("sess-1", "S1"));
        assert!(ledger.first_sighting("sess-2", "S1"));
        assert!(ledger.first_sighting("sess-1", "S2"));
    }
}
