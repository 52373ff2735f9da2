//! Items and the smaller things a character owns.

use serde::{Deserialize, Serialize};

use super::Uid;

/// An item stack.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    /// Item uid.
    pub uid: Uid,
    /// Item template id.
    pub tid: u32,
    /// Stack count.
    pub count: u32,
    /// Expiry (unix seconds, 0 = never).
    pub expires_at: u64,
}

/// A gift or purchase waiting to be claimed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageItem {
    /// Storage entry uid.
    pub uid: Uid,
    /// Items carried.
    pub items: Vec<Uid>,
    /// Sender name.
    pub sender: String,
    /// Attached message.
    pub message: String,
    /// Opened by the player.
    pub checked: bool,
    /// Past its claim window.
    pub expired: bool,
    /// Creation time (unix seconds).
    pub created_at: u64,
}

/// An egg incubating into a horse.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Egg {
    /// Egg uid.
    pub uid: Uid,
    /// Template of the egg item.
    pub item_tid: u32,
    /// Template of the horse it hatches into.
    pub horse_tid: u32,
    /// Hatch time (unix seconds).
    pub hatch_at: u64,
}

/// A pet.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pet {
    /// Pet uid.
    pub uid: Uid,
    /// Pet template id.
    pub pet_id: u32,
    /// Item the pet was summoned from.
    pub item_uid: Uid,
    /// Given name.
    pub name: String,
    /// Birth date (unix seconds).
    pub birth_date: u64,
}

/// Rented ranch housing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Housing {
    /// Housing uid.
    pub uid: Uid,
    /// Housing template id.
    pub housing_id: u16,
    /// Rent expiry (unix seconds).
    pub expires_at: u64,
    /// Remaining durability.
    pub durability: u32,
}
