//! Player characters.

use serde::{Deserialize, Serialize};

use super::Uid;

/// Permission level of a character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    /// Regular player.
    #[default]
    User,
    /// Moderator.
    PageMaster,
    /// Administrator.
    GameMaster,
}

/// Body parts of a character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterParts {
    /// Body model.
    pub model_id: u8,
    /// Mouth.
    pub mouth_id: u8,
    /// Face.
    pub face_id: u8,
}

/// Proportions of a character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterAppearance {
    /// Voice.
    pub voice_id: u16,
    /// Head size.
    pub head_size: u16,
    /// Height.
    pub height: u16,
    /// Thigh volume.
    pub thigh_volume: u16,
    /// Leg volume.
    pub leg_volume: u16,
    /// Emblem.
    pub emblem_id: u16,
}

/// Received and sent mail.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mailbox {
    /// Received mail.
    pub inbox: Vec<Uid>,
    /// Sent mail.
    pub sent: Vec<Uid>,
}

/// A player character and everything it owns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Character {
    /// Character uid.
    pub uid: Uid,
    /// Name.
    pub name: String,
    /// Profile introduction.
    pub introduction: String,
    /// Level.
    pub level: u16,
    /// Soft currency.
    pub carrots: i32,
    /// Hard currency.
    pub cash: u32,
    /// Permission level.
    pub role: Role,
    /// Body parts.
    pub parts: CharacterParts,
    /// Proportions.
    pub appearance: CharacterAppearance,

    /// Guild, [`super::INVALID_UID`] when none.
    pub guild_uid: Uid,
    /// Active pet, [`super::INVALID_UID`] when none.
    pub pet_uid: Uid,
    /// Settings, [`super::INVALID_UID`] until first saved.
    pub settings_uid: Uid,

    /// Gift storage entries.
    pub gifts: Vec<Uid>,
    /// Purchase storage entries.
    pub purchases: Vec<Uid>,
    /// Inventory items.
    pub inventory: Vec<Uid>,
    /// Items worn by the character.
    pub character_equipment: Vec<Uid>,
    /// Items worn by the mount.
    pub mount_equipment: Vec<Uid>,

    /// Owned horses, mount excluded.
    pub horses: Vec<Uid>,
    /// Current mount.
    pub mount_uid: Uid,
    /// Eggs waiting to hatch.
    pub eggs: Vec<Uid>,
    /// Owned pets.
    pub pets: Vec<Uid>,
    /// Rented housing.
    pub housing: Vec<Uid>,
    /// Mail.
    pub mailbox: Mailbox,
}

impl Character {
    /// Every item uid the character references, storage contents excluded.
    pub fn item_uids(&self) -> impl Iterator<Item = Uid> + '_ {
        self.inventory
            .iter()
            .chain(&self.character_equipment)
            .chain(&self.mount_equipment)
            .copied()
    }

    /// Owned horses followed by the mount, when set.
    pub fn horse_uids(&self) -> impl Iterator<Item = Uid> + '_ {
        self.horses
            .iter()
            .copied()
            .chain((self.mount_uid != super::INVALID_UID).then_some(self.mount_uid))
    }
}
