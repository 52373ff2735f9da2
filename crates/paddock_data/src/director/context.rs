//! Per-user load bookkeeping.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Progress of the latest load attempt chain of a user.
///
/// ```text
/// Idle ──► Pending ──► Retrying* ──┬──► Complete
///                                  ├──► TimedOut
///                                  └──► Failed
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// Queued, first attempt not run yet.
    Pending,
    /// At least one attempt missed an entity; retried next tick.
    Retrying,
    /// Every required entity is resident.
    Complete,
    /// The deadline passed before the graph resolved.
    TimedOut,
    /// The graph can never resolve.
    Failed,
}

impl LoadState {
    /// Whether the chain has ended.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Complete | Self::TimedOut | Self::Failed)
    }
}

#[derive(Debug)]
struct Progress {
    state: LoadState,
    deadline: Instant,
    debug_message: String,
}

/// Load bookkeeping of one user, shared between the director and the
/// attempt task in flight.
#[derive(Debug)]
pub struct UserDataContext {
    name: String,
    being_loaded: AtomicBool,
    user_data_loaded: AtomicBool,
    character_data_loaded: AtomicBool,
    attempts: AtomicU32,
    progress: Mutex<Progress>,
}

impl UserDataContext {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            being_loaded: AtomicBool::new(false),
            user_data_loaded: AtomicBool::new(false),
            character_data_loaded: AtomicBool::new(false),
            attempts: AtomicU32::new(0),
            progress: Mutex::new(Progress {
                state: LoadState::Idle,
                deadline: Instant::now(),
                debug_message: String::new(),
            }),
        }
    }

    /// User name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether an attempt chain is in flight.
    #[must_use]
    pub fn is_being_loaded(&self) -> bool {
        self.being_loaded.load(Ordering::Acquire)
    }

    /// Whether the user and its infractions are resident.
    #[must_use]
    pub fn is_user_data_loaded(&self) -> bool {
        self.user_data_loaded.load(Ordering::Acquire)
    }

    /// Whether the character graph is resident.
    #[must_use]
    pub fn is_character_data_loaded(&self) -> bool {
        self.character_data_loaded.load(Ordering::Acquire)
    }

    /// State of the latest chain.
    #[must_use]
    pub fn state(&self) -> LoadState {
        self.progress.lock().state
    }

    /// Attempts made by the latest chain.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Acquire)
    }

    /// Why the last attempt did not complete.
    #[must_use]
    pub fn debug_message(&self) -> String {
        self.progress.lock().debug_message.clone()
    }

    /// Claims the context for a new chain.
    ///
    /// Returns false if a chain is already in flight.
    pub(crate) fn begin(&self, timeout: Duration) -> bool {
        if self
            .being_loaded
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        self.attempts.store(0, Ordering::Release);
        let mut progress = self.progress.lock();
        progress.state = LoadState::Pending;
        progress.deadline = Instant::now() + timeout;
        progress.debug_message.clear();
        true
    }

    /// Counts an attempt, returning the new total.
    pub(crate) fn record_attempt(&self) -> u32 {
        self.attempts.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn set_debug_message(&self, message: String) {
        self.progress.lock().debug_message = message;
    }

    pub(crate) fn set_state(&self, state: LoadState) {
        self.progress.lock().state = state;
    }

    pub(crate) fn deadline_passed(&self) -> bool {
        Instant::now() >= self.progress.lock().deadline
    }

    /// Ends the chain and releases the in-flight flag.
    pub(crate) fn finish(&self, state: LoadState) {
        self.set_state(state);
        self.being_loaded.store(false, Ordering::Release);
    }

    pub(crate) fn mark_user_data_loaded(&self) {
        self.user_data_loaded.store(true, Ordering::Release);
    }

    pub(crate) fn mark_character_data_loaded(&self) {
        self.character_data_loaded.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_claim() {
        let context = UserDataContext::new("rider");
        assert_eq!(context.state(), LoadState::Idle);

        assert!(context.begin(Duration::from_secs(10)));
        assert!(!context.begin(Duration::from_secs(10)));
        assert_eq!(context.state(), LoadState::Pending);
        assert!(!context.deadline_passed());

        context.finish(LoadState::Complete);
        assert!(!context.is_being_loaded());
        assert!(context.state().is_finished());
        assert!(context.begin(Duration::ZERO));
        assert!(context.deadline_passed());
    }
}
