//! Accounts and their sanctions.

use serde::{Deserialize, Serialize};

use super::Uid;

/// A player account, keyed by its login name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    /// Login name.
    pub name: String,
    /// Session token issued by the login service.
    pub token: String,
    /// The account's character, [`super::INVALID_UID`] before creation.
    pub character_uid: Uid,
    /// Infractions on record.
    pub infractions: Vec<Uid>,
}

/// Sanction applied by an infraction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Punishment {
    /// Warning only.
    #[default]
    None,
    /// Chat is disabled.
    Mute,
    /// Login is refused.
    Ban,
}

/// A recorded rule violation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Infraction {
    /// Infraction uid.
    pub uid: Uid,
    /// What happened.
    pub description: String,
    /// Sanction applied.
    pub punishment: Punishment,
    /// Sanction length in seconds.
    pub duration_secs: u64,
    /// Time of the infraction (unix seconds).
    pub created_at: u64,
}

impl Infraction {
    /// Whether the sanction is still running at `now` (unix seconds).
    #[must_use]
    pub const fn is_active(&self, now: u64) -> bool {
        !matches!(self.punishment, Punishment::None)
            && now < self.created_at.saturating_add(self.duration_secs)
    }
}
