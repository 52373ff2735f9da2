//! Guilds.

use serde::{Deserialize, Serialize};

use super::Uid;

/// A guild of characters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Guild {
    /// Guild uid.
    pub uid: Uid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Owning character.
    pub owner: Uid,
    /// Officer characters.
    pub officers: Vec<Uid>,
    /// Regular members.
    pub members: Vec<Uid>,
}

impl Guild {
    /// Owner, officers and members together.
    #[must_use]
    pub fn member_count(&self) -> usize {
        usize::from(self.owner != super::INVALID_UID) + self.officers.len() + self.members.len()
    }
}
