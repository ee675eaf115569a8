//! Intent heuristics and capability seams

use std::sync::Mutex;

/// Join/leave intent read off a clicked control's text or aria label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallIntent {
    Join,
    Leave,
}

/// Keywords seen on join controls across locales and UI revisions
const JOIN_KEYWORDS: [&str; 4] = ["join now", "ask to join", "join meeting", "sertai"];

/// Keywords seen on leave controls
const LEAVE_KEYWORDS: [&str; 3] = ["leave call", "leave meeting", "tinggalkan"];

/// Classify a clicked control's label. Case-insensitive substring match;
/// anything unrecognized is not an intent.
pub fn classify_intent(label: &str) -> Option<CallIntent> {
    let l = label.trim().to_lowercase();
    if l.is_empty() {
        return None;
    }
    if JOIN_KEYWORDS.iter().any(|k| l.contains(k)) {
        return Some(CallIntent::Join);
    }
    if LEAVE_KEYWORDS.iter().any(|k| l.contains(k)) {
        return Some(CallIntent::Leave);
    }
    None
}

/// Heuristic in-call detection, polled by the lifecycle controller.
/// Implementations inspect whatever call surface the host exposes.
pub trait CallProbe: Send {
    fn in_call(&self) -> bool;
}

/// Fixed-answer probe for wiring and tests
#[derive(Debug, Clone)]
pub struct StaticProbe(pub bool);

impl CallProbe for StaticProbe {
    fn in_call(&self) -> bool {
        self.0
    }
}

/// Persisted start intent that survives a full page navigation.
///
/// `persist` stores a wall-clock timestamp; `take` consumes it (at most
/// once). Validity is judged by the controller, not the store.
pub trait StartIntentStore: Send {
    fn persist(&self, ts_ms: i64);
    fn take(&self) -> Option<i64>;
}

/// In-memory store standing in for page-scoped storage
#[derive(Debug, Default)]
pub struct MemoryIntentStore {
    slot: Mutex<Option<i64>>,
}

impl MemoryIntentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StartIntentStore for MemoryIntentStore {
    fn persist(&self, ts_ms: i64) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(ts_ms);
        }
    }

    fn take(&self) -> Option<i64> {
        self.slot.lock().ok().and_then(|mut s| s.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_keywords() {
        for label in ["Join now", "ASK TO JOIN", "  Sertai sekarang ", "Join meeting"] {
            assert_eq!(classify_intent(label), Some(CallIntent::Join), "{label}");
        }
    }

    #[test]
    fn test_leave_keywords() {
        for label in ["Leave call", "leave meeting"] {
            assert_eq!(classify_intent(label), Some(CallIntent::Leave), "{label}");
        }
    }

    #[test]
    fn test_unrelated_labels() {
        for label in ["", "Turn off microphone", "Present now", "Settings"] {
            assert_eq!(classify_intent(label), None, "{label}");
        }
    }

    #[test]
    fn test_intent_store_consumes_once() {
        let store = MemoryIntentStore::new();
        store.persist(1_000);

        assert_eq!(store.take(), Some(1_000));
        assert_eq!(store.take(), None);
    }
}
