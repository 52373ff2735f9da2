//! # Load Attempts
//!
//! A load attempt resolves a user's entity graph against the caches. A
//! single miss aborts the attempt; the finalizer then either re-queues it
//! for the next tick or gives up once the deadline has passed.
//!
//! ## Character graph
//!
//! ```text
//! character ─┬─ guild?  pet?  settings?           (only when set)
//!            ├─ gifts + purchases ──► their items  (required)
//!            ├─ inventory + equipment items        (required)
//!            ├─ horses + mount ──► 2 generations   (ancestry best-effort)
//!            ├─ eggs, housing, pets                (required)
//!            └─ mail inbox + sent                  (required)
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::context::{LoadState, UserDataContext};
use super::DataStores;
use crate::error::{DataError, DataResult};
use crate::model::{Entity, Horse, Uid, INVALID_UID};
use crate::record::Record;
use crate::scheduler::Scheduler;
use crate::storage::Storage;

/// Generations of ancestors pulled into the cache.
const ANCESTRY_DEPTH: usize = 2;

/// What an attempt chain loads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoadScope {
    /// The user and its infractions.
    User,
    /// The character graph.
    Character(Uid),
}

enum Outcome {
    Complete,
    Retry(String),
    Fail(String),
}

/// One link of an attempt chain. Owns everything it needs so it can be
/// queued again.
pub(crate) struct LoadAttempt {
    scope: LoadScope,
    context: Arc<UserDataContext>,
    stores: Arc<DataStores>,
}

impl LoadAttempt {
    pub(crate) fn new(
        scope: LoadScope,
        context: Arc<UserDataContext>,
        stores: Arc<DataStores>,
    ) -> Self {
        Self {
            scope,
            context,
            stores,
        }
    }

    /// Queues this attempt for the next tick.
    pub(crate) fn schedule(self, scheduler: &mut Scheduler) {
        scheduler.queue(move |scheduler| self.run(scheduler));
    }

    fn run(self, scheduler: &mut Scheduler) -> DataResult<()> {
        let mut guard = AttemptGuard {
            scheduler,
            attempt: Some(self),
            outcome: None,
        };
        let Some(attempt) = guard.attempt.as_ref() else {
            return Ok(());
        };

        let attempt_number = attempt.context.record_attempt();
        let outcome = attempt.execute();
        let result = match &outcome {
            Outcome::Fail(reason) => Err(DataError::LoadFailed {
                user: attempt.context.name().to_owned(),
                reason: reason.clone(),
            }),
            Outcome::Complete => {
                debug!(
                    user = attempt.context.name(),
                    scope = ?attempt.scope,
                    attempts = attempt_number,
                    "data loaded"
                );
                Ok(())
            }
            Outcome::Retry(_) => Ok(()),
        };
        guard.outcome = Some(outcome);
        result
    }

    fn execute(&self) -> Outcome {
        let result = match self.scope {
            LoadScope::User => self.load_user(),
            LoadScope::Character(INVALID_UID) => {
                return Outcome::Fail("user has no character".to_owned());
            }
            LoadScope::Character(uid) => self.load_character(uid),
        };
        match result {
            Ok(()) => Outcome::Complete,
            Err(reason) => Outcome::Retry(reason),
        }
    }

    fn load_user(&self) -> Result<(), String> {
        let name = self.context.name().to_owned();
        let user = self
            .stores
            .users
            .get(&name)
            .ok_or_else(|| format!("user '{name}' unavailable"))?;
        let infractions = user
            .immutable(|user| user.infractions.clone())
            .map_err(|err| err.to_string())?;
        require(&self.stores.infractions, &infractions, "infractions")?;

        self.context.mark_user_data_loaded();
        Ok(())
    }

    fn load_character(&self, uid: Uid) -> Result<(), String> {
        let stores = &*self.stores;
        let character = stores
            .characters
            .get(&uid)
            .ok_or_else(|| format!("character {uid} unavailable"))?
            .immutable(Clone::clone)
            .map_err(|err| err.to_string())?;

        optional(&stores.guilds, character.guild_uid, "guild")?;
        optional(&stores.pets, character.pet_uid, "pet")?;
        optional(&stores.settings, character.settings_uid, "settings")?;

        let storage_uids: Vec<Uid> = character
            .gifts
            .iter()
            .chain(&character.purchases)
            .copied()
            .collect();
        let storage_items = require(&stores.storage_items, &storage_uids, "storage items")?;

        let mut item_uids: Vec<Uid> = character.item_uids().collect();
        for entry in &storage_items {
            let items = entry
                .immutable(|entry| entry.items.clone())
                .map_err(|err| err.to_string())?;
            item_uids.extend(items);
        }
        require(&stores.items, &item_uids, "items")?;

        let horse_uids: Vec<Uid> = character.horse_uids().collect();
        let horses = require(&stores.horses, &horse_uids, "horses")?;
        self.warm_ancestry(&horses);

        require(&stores.eggs, &character.eggs, "eggs")?;
        require(&stores.housing, &character.housing, "housing")?;
        require(&stores.pets, &character.pets, "pets")?;
        require(&stores.mail, &character.mailbox.inbox, "inbox")?;
        require(&stores.mail, &character.mailbox.sent, "sent mail")?;

        self.context.mark_character_data_loaded();
        Ok(())
    }

    /// Pulls parents and grandparents into the cache. Misses are ignored.
    fn warm_ancestry(&self, horses: &[Record<Horse>]) {
        let mut generation: Vec<Uid> = parents_of(horses.iter());
        for _ in 0..ANCESTRY_DEPTH {
            let mut resolved = Vec::with_capacity(generation.len());
            for uid in generation {
                match self.stores.horses.get(&uid) {
                    Some(ancestor) => resolved.push(ancestor),
                    None => debug!(
                        user = self.context.name(),
                        ancestor = uid,
                        "ancestor unavailable"
                    ),
                }
            }
            generation = parents_of(resolved.iter());
        }
    }
}

fn parents_of<'a>(horses: impl Iterator<Item = &'a Record<Horse>>) -> Vec<Uid> {
    horses
        .filter_map(|horse| horse.immutable(|horse| horse.ancestors.clone()).ok())
        .flatten()
        .filter(|uid| *uid != INVALID_UID)
        .collect()
}

/// Resolves every key or reports what is missing.
fn require<V: Entity>(
    storage: &Storage<V>,
    keys: &[V::Key],
    what: &str,
) -> Result<Vec<Record<V>>, String> {
    storage
        .get_many(keys)
        .ok_or_else(|| format!("{what} incomplete"))
}

/// Resolves `uid` unless it is unset.
fn optional<V: Entity<Key = Uid>>(
    storage: &Storage<V>,
    uid: Uid,
    what: &str,
) -> Result<(), String> {
    if uid == INVALID_UID || storage.get(&uid).is_some() {
        Ok(())
    } else {
        Err(format!("{what} {uid} unavailable"))
    }
}

/// Finalizer of one attempt. Runs on every exit path, unwinding included.
struct AttemptGuard<'s> {
    scheduler: &'s mut Scheduler,
    attempt: Option<LoadAttempt>,
    outcome: Option<Outcome>,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        let Some(attempt) = self.attempt.take() else {
            return;
        };
        let context = &attempt.context;

        match self.outcome.take() {
            Some(Outcome::Complete) => context.finish(LoadState::Complete),
            Some(Outcome::Fail(reason)) => {
                context.set_debug_message(reason);
                context.finish(LoadState::Failed);
            }
            pending => {
                if let Some(Outcome::Retry(reason)) = pending {
                    context.set_debug_message(reason);
                }
                if context.deadline_passed() {
                    warn!(
                        user = context.name(),
                        attempts = context.attempts(),
                        "data load timed out: {}",
                        context.debug_message()
                    );
                    context.finish(LoadState::TimedOut);
                } else {
                    context.set_state(LoadState::Retrying);
                    attempt.schedule(self.scheduler);
                }
            }
        }
    }
}

impl LoadScope {
    /// Log label.
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Character(_) => "character",
        }
    }
}

/// Starts a chain unless one is in flight.
pub(crate) fn start(
    scheduler: &mut Scheduler,
    scope: LoadScope,
    context: Arc<UserDataContext>,
    stores: Arc<DataStores>,
    timeout: std::time::Duration,
) -> bool {
    if !context.begin(timeout) {
        return false;
    }
    info!(user = context.name(), scope = scope.label(), "data load requested");
    LoadAttempt::new(scope, context, stores).schedule(scheduler);
    true
}
