//! Synchronized accumulator for handler votes.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::warn;

/// Collects the votes of every handler invoked for one requirement.
///
/// Safe to share between handlers running on different threads. The final
/// tally does not depend on the order in which votes arrive.
#[derive(Debug, Default)]
pub struct Votes {
    denied: AtomicBool,
    successes: AtomicUsize,
    deny_reasons: Mutex<Vec<String>>,
}

/// The aggregated verdict over all votes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tally {
    Succeeded { successes: usize },
    /// At least one handler denied; its success votes do not count.
    Denied { reasons: Vec<String> },
    /// Every handler abstained.
    NoVotes,
}

impl Votes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the requirement satisfied.
    pub fn succeed(&self) {
        self.successes.fetch_add(1, Ordering::SeqCst);
    }

    /// Explicit deny. Overrides any success, from any handler.
    pub fn deny(&self, reason: impl Into<String>) {
        self.denied.store(true, Ordering::SeqCst);
        let mut reasons = self.deny_reasons.lock().unwrap_or_else(|poisoned| {
            warn!(event = "Vote", phase = "Deny", error = %poisoned);
            poisoned.into_inner()
        });
        reasons.push(reason.into());
    }

    pub fn has_denied(&self) -> bool {
        self.denied.load(Ordering::SeqCst)
    }

    pub fn successes(&self) -> usize {
        self.successes.load(Ordering::SeqCst)
    }

    pub fn tally(&self) -> Tally {
        if self.has_denied() {
            let mut reasons = match self.deny_reasons.lock() {
                Ok(reasons) => reasons.clone(),
                Err(poisoned) => poisoned.into_inner().clone(),
            };
            // Arrival order differs between sequential and parallel runs.
            reasons.sort();
            return Tally::Denied { reasons };
        }

        match self.successes() {
            0 => Tally::NoVotes,
            successes => Tally::Succeeded { successes },
        }
    }
}
