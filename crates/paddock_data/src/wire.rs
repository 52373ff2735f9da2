//! # Wire Conversion
//!
//! Builds the client layouts of [`paddock_protocol::structures`] from
//! resident entities.
//!
//! Timestamps are kept as `u64` in the model and clamped to the client's
//! `u32` fields. Counts that exceed a wire field saturate.

use paddock_protocol::structures as wire;
use paddock_protocol::{CharacterProfile, HorseList, Inventory, KeyboardOptionsNotify, MailList};

use crate::director::DataDirector;
use crate::error::DataResult;
use crate::model::{
    Character, Egg, Guild, Horse, Item, Mail, MailType, Pet, Role, Settings, StorageItem, Uid,
    INVALID_UID,
};

/// Clamps a unix timestamp to the client's 32-bit field.
#[inline]
fn wire_time(secs: u64) -> u32 {
    u32::try_from(secs).unwrap_or(u32::MAX)
}

impl From<&Item> for wire::Item {
    fn from(item: &Item) -> Self {
        Self {
            uid: item.uid,
            tid: item.tid,
            expires_at: wire_time(item.expires_at),
            count: item.count,
        }
    }
}

impl From<&Horse> for wire::Horse {
    fn from(horse: &Horse) -> Self {
        let condition = &horse.condition;
        Self {
            uid: horse.uid,
            tid: horse.tid,
            name: horse.name.clone(),
            parts: wire::HorseParts {
                skin: horse.parts.skin_tid,
                mane: horse.parts.mane_tid,
                tail: horse.parts.tail_tid,
                face: horse.parts.face_tid,
            },
            appearance: wire::HorseAppearance {
                scale: horse.appearance.scale,
                leg_length: horse.appearance.leg_length,
                leg_volume: horse.appearance.leg_volume,
                body_length: horse.appearance.body_length,
                body_volume: horse.appearance.body_volume,
            },
            stats: wire::HorseStats {
                agility: horse.stats.agility,
                control: horse.stats.control,
                speed: horse.stats.speed,
                strength: horse.stats.strength,
                spirit: horse.stats.spirit,
            },
            rating: horse.rating,
            class: horse.class,
            grade: horse.grade,
            growth_points: horse.growth_points,
            condition: wire::HorseCondition {
                stamina: condition.stamina,
                charm: condition.charm,
                friendliness: condition.friendliness,
                injury: condition.injury,
                plenitude: condition.plenitude,
                body_dirtiness: condition.body_dirtiness,
                mane_dirtiness: condition.mane_dirtiness,
                tail_dirtiness: condition.tail_dirtiness,
                attachment: condition.attachment,
                boredom: condition.boredom,
                stop_amends_point: condition.stop_amends_point,
            },
            mastery: wire::HorseMastery {
                spur_magic_count: horse.mastery.spur_magic_count,
                jump_count: horse.mastery.jump_count,
                sliding_time: horse.mastery.sliding_time,
                gliding_distance: horse.mastery.gliding_distance,
            },
            luck_state: horse.luck_state,
            emblem: horse.emblem_uid,
        }
    }
}

impl From<Role> for wire::CharacterRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::PageMaster => Self::PageMaster,
            Role::GameMaster => Self::GameMaster,
        }
    }
}

/// Character layout, with the guild tag filled in when known.
#[must_use]
pub fn character(character: &Character, guild: Option<&Guild>) -> wire::Character {
    wire::Character {
        uid: character.uid,
        name: character.name.clone(),
        introduction: character.introduction.clone(),
        level: character.level,
        carrots: character.carrots,
        cash: character.cash,
        role: character.role.into(),
        parts: wire::CharacterParts {
            model: character.parts.model_id,
            mouth: character.parts.mouth_id,
            face: character.parts.face_id,
            reserved: 0,
        },
        appearance: wire::CharacterAppearance {
            voice: character.appearance.voice_id,
            head_size: character.appearance.head_size,
            height: character.appearance.height,
            thigh_volume: character.appearance.thigh_volume,
            leg_volume: character.appearance.leg_volume,
            emblem: character.appearance.emblem_id,
        },
        guild: guild.map_or_else(wire::GuildTag::default, |guild| wire::GuildTag {
            uid: guild.uid,
            name: guild.name.clone(),
        }),
        mount_uid: character.mount_uid,
    }
}

impl From<&Guild> for wire::Guild {
    fn from(guild: &Guild) -> Self {
        Self {
            uid: guild.uid,
            name: guild.name.clone(),
            description: guild.description.clone(),
            member_count: u16::try_from(guild.member_count()).unwrap_or(u16::MAX),
        }
    }
}

impl From<&Pet> for wire::Pet {
    fn from(pet: &Pet) -> Self {
        Self {
            uid: pet.uid,
            pet_id: pet.pet_id,
            name: pet.name.clone(),
            birth_date: wire_time(pet.birth_date),
        }
    }
}

impl From<&Egg> for wire::Egg {
    fn from(egg: &Egg) -> Self {
        Self {
            uid: egg.uid,
            item_tid: egg.item_tid,
            horse_tid: egg.horse_tid,
            hatch_at: wire_time(egg.hatch_at),
        }
    }
}

impl From<&Mail> for wire::MailHeader {
    fn from(mail: &Mail) -> Self {
        Self {
            uid: mail.uid,
            mail_type: match mail.mail_type {
                MailType::Regular => wire::MailType::Regular,
                MailType::System => wire::MailType::System,
            },
            read: mail.read,
            sender: mail.sender.clone(),
            subject: mail.subject.clone(),
            created_at: wire_time(mail.created_at),
        }
    }
}

impl From<&Settings> for wire::KeyboardOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            bindings: settings
                .keyboard_bindings
                .iter()
                .map(|binding| wire::KeyBinding {
                    action: binding.action,
                    primary: binding.primary,
                    secondary: binding.secondary,
                })
                .collect(),
        }
    }
}

/// Storage entry layout with its items resolved.
#[must_use]
pub fn stored_item(entry: &StorageItem, items: &[Item]) -> wire::StoredItem {
    wire::StoredItem {
        uid: entry.uid,
        items: items.iter().map(wire::Item::from).collect(),
        sender: entry.sender.clone(),
        message: entry.message.clone(),
        checked: entry.checked,
        expired: entry.expired,
        created_at: wire_time(entry.created_at),
    }
}

fn resident_character(director: &DataDirector, uid: Uid) -> DataResult<Character> {
    director.get::<Character>(&uid).immutable(Clone::clone)
}

/// Profile of a resident character and its mount.
///
/// # Errors
///
/// [`crate::DataError::Unavailable`] if the character, its guild or its
/// mount is not resident.
pub fn character_profile(director: &DataDirector, uid: Uid) -> DataResult<CharacterProfile> {
    let entity = resident_character(director, uid)?;
    let guild = if entity.guild_uid == INVALID_UID {
        None
    } else {
        Some(director.get::<Guild>(&entity.guild_uid).immutable(Clone::clone)?)
    };
    let mount = if entity.mount_uid == INVALID_UID {
        wire::Horse::default()
    } else {
        director
            .get::<Horse>(&entity.mount_uid)
            .immutable(|value| wire::Horse::from(value))?
    };

    Ok(CharacterProfile {
        character: character(&entity, guild.as_ref()),
        mount,
    })
}

/// Every horse of a resident character, mount included.
///
/// # Errors
///
/// [`crate::DataError::Unavailable`] if any of them is not resident.
pub fn horse_list(director: &DataDirector, uid: Uid) -> DataResult<HorseList> {
    let entity = resident_character(director, uid)?;
    let horses = entity
        .horse_uids()
        .map(|horse| director.get::<Horse>(&horse).immutable(|value| wire::Horse::from(value)))
        .collect::<DataResult<_>>()?;
    Ok(HorseList { horses })
}

/// Inventory of a resident character.
///
/// # Errors
///
/// [`crate::DataError::Unavailable`] if any item is not resident.
pub fn inventory(director: &DataDirector, uid: Uid) -> DataResult<Inventory> {
    let entity = resident_character(director, uid)?;
    let items = entity
        .inventory
        .iter()
        .map(|item| director.get::<Item>(item).immutable(|value| wire::Item::from(value)))
        .collect::<DataResult<_>>()?;
    Ok(Inventory { items })
}

/// Inbox of a resident character.
///
/// # Errors
///
/// [`crate::DataError::Unavailable`] if any mail is not resident.
pub fn mail_list(director: &DataDirector, uid: Uid) -> DataResult<MailList> {
    let entity = resident_character(director, uid)?;
    let mails = entity
        .mailbox
        .inbox
        .iter()
        .map(|mail| director.get::<Mail>(mail).immutable(|value| wire::MailHeader::from(value)))
        .collect::<DataResult<_>>()?;
    Ok(MailList { mails })
}

/// Keyboard bindings of a resident character; empty without settings.
///
/// # Errors
///
/// [`crate::DataError::Unavailable`] if the settings are not resident.
pub fn keyboard_options(director: &DataDirector, uid: Uid) -> DataResult<KeyboardOptionsNotify> {
    let entity = resident_character(director, uid)?;
    if entity.settings_uid == INVALID_UID {
        return Ok(KeyboardOptionsNotify::default());
    }
    let options = director
        .get::<Settings>(&entity.settings_uid)
        .immutable(|value| wire::KeyboardOptions::from(value))?;
    Ok(KeyboardOptionsNotify { options })
}
