//! Horses and stallion registrations.

use serde::{Deserialize, Serialize};

use super::Uid;

/// Cosmetic parts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorseParts {
    /// Skin template.
    pub skin_tid: u8,
    /// Mane template.
    pub mane_tid: u8,
    /// Tail template.
    pub tail_tid: u8,
    /// Face template.
    pub face_tid: u8,
}

/// Body proportions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorseAppearance {
    /// Overall scale.
    pub scale: u8,
    /// Leg length.
    pub leg_length: u8,
    /// Leg volume.
    pub leg_volume: u8,
    /// Body length.
    pub body_length: u8,
    /// Body volume.
    pub body_volume: u8,
}

/// Racing stats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorseStats {
    /// Agility.
    pub agility: u32,
    /// Control.
    pub control: u32,
    /// Speed.
    pub speed: u32,
    /// Strength.
    pub strength: u32,
    /// Spirit.
    pub spirit: u32,
}

/// Care state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorseCondition {
    /// Stamina.
    pub stamina: u16,
    /// Charm.
    pub charm: u16,
    /// Friendliness.
    pub friendliness: u16,
    /// Injury level.
    pub injury: u16,
    /// How fed the horse is.
    pub plenitude: u16,
    /// Body dirtiness.
    pub body_dirtiness: u16,
    /// Mane dirtiness.
    pub mane_dirtiness: u16,
    /// Tail dirtiness.
    pub tail_dirtiness: u16,
    /// Attachment to the owner.
    pub attachment: u16,
    /// Boredom.
    pub boredom: u16,
    /// Stop amends point.
    pub stop_amends_point: u16,
}

/// Riding mastery counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HorseMastery {
    /// Spur magic uses.
    pub spur_magic_count: u32,
    /// Jumps.
    pub jump_count: u32,
    /// Sliding time.
    pub sliding_time: u32,
    /// Gliding distance.
    pub gliding_distance: u32,
}

/// A horse.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Horse {
    /// Horse uid.
    pub uid: Uid,
    /// Horse template id.
    pub tid: u32,
    /// Given name.
    pub name: String,
    /// Cosmetic parts.
    pub parts: HorseParts,
    /// Body proportions.
    pub appearance: HorseAppearance,
    /// Racing stats.
    pub stats: HorseStats,
    /// Rating.
    pub rating: u32,
    /// Class.
    pub class: u8,
    /// Grade.
    pub grade: u8,
    /// Growth points.
    pub growth_points: u16,
    /// Care state.
    pub condition: HorseCondition,
    /// Mastery counters.
    pub mastery: HorseMastery,
    /// Parents, [`super::INVALID_UID`] for unknown.
    pub ancestors: Vec<Uid>,
    /// Birth date (unix seconds).
    pub date_of_birth: u64,
    /// Luck state.
    pub luck_state: u32,
    /// Emblem.
    pub emblem_uid: u32,
}

/// A horse registered for breeding.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Stallion {
    /// Registration uid.
    pub uid: Uid,
    /// Registered horse.
    pub horse_uid: Uid,
    /// Owning character.
    pub owner_uid: Uid,
    /// Carrots charged per breeding.
    pub breeding_charge: u32,
    /// Registration time (unix seconds).
    pub registered_at: u64,
    /// Expiry (unix seconds).
    pub expires_at: u64,
}
