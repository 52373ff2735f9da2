//! # Wire Structures
//!
//! Client-facing layouts of the game entities.
//!
//! Every `encode` issues its fields in the exact order the client reads
//! them, including reserved fields whose meaning is unknown. Do not reorder.
//!
//! Fixed-size all-byte parts are `Pod` and copied verbatim.

use bytemuck::{Pod, Zeroable};

use crate::error::{ProtocolError, ProtocolResult};
use crate::stream::{Decode, Encode, LengthPrefix, StreamReader, StreamWriter};

/// Identifier of an entity on the wire.
pub type WireUid = u32;

/// Item stack.
///
/// Size: 16 bytes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Item {
    /// Item uid.
    pub uid: WireUid,
    /// Item template id.
    pub tid: u32,
    /// Expiry (unix seconds, 0 = never).
    pub expires_at: u32,
    /// Stack count.
    pub count: u32,
}

impl Encode for Item {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.uid)?;
        writer.write(&self.tid)?;
        writer.write(&self.expires_at)?;
        writer.write(&self.count)
    }
}

impl Decode for Item {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            uid: reader.read()?,
            tid: reader.read()?,
            expires_at: reader.read()?,
            count: reader.read()?,
        })
    }
}

/// Gift or purchase waiting in the storage window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoredItem {
    /// Storage item uid.
    pub uid: WireUid,
    /// Items carried by this storage entry.
    pub items: Vec<Item>,
    /// Sender name.
    pub sender: String,
    /// Attached message.
    pub message: String,
    /// Whether the player opened it.
    pub checked: bool,
    /// Whether it expired.
    pub expired: bool,
    /// Creation time (unix seconds).
    pub created_at: u32,
}

impl Encode for StoredItem {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.uid)?;
        // Reserved.
        writer.write(&0u32)?;
        writer.write_seq(&self.items, LengthPrefix::U8)?;
        writer.write(&self.sender)?;
        writer.write(&self.message)?;
        writer.write(&self.checked)?;
        writer.write(&self.expired)?;
        writer.write(&self.created_at)
    }
}

impl Decode for StoredItem {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        let uid = reader.read()?;
        let _reserved: u32 = reader.read()?;
        Ok(Self {
            uid,
            items: reader.read_seq(LengthPrefix::U8)?,
            sender: reader.read()?,
            message: reader.read()?,
            checked: reader.read()?,
            expired: reader.read()?,
            created_at: reader.read()?,
        })
    }
}

/// Cosmetic parts of a horse.
///
/// Size: 4 bytes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct HorseParts {
    /// Skin template.
    pub skin: u8,
    /// Mane template.
    pub mane: u8,
    /// Tail template.
    pub tail: u8,
    /// Face template.
    pub face: u8,
}

/// Body proportions of a horse.
///
/// Size: 5 bytes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
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

/// Racing stats of a horse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
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

impl Encode for HorseStats {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.agility)?;
        writer.write(&self.control)?;
        writer.write(&self.speed)?;
        writer.write(&self.strength)?;
        writer.write(&self.spirit)
    }
}

impl Decode for HorseStats {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            agility: reader.read()?,
            control: reader.read()?,
            speed: reader.read()?,
            strength: reader.read()?,
            spirit: reader.read()?,
        })
    }
}

/// Care state of a horse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HorseCondition {
    /// Stamina.
    pub stamina: u16,
    /// Charm.
    pub charm: u16,
    /// Friendliness.
    pub friendliness: u16,
    /// Injury level.
    pub injury: u16,
    /// Plenitude (how fed the horse is).
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

impl Encode for HorseCondition {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        for value in [
            self.stamina,
            self.charm,
            self.friendliness,
            self.injury,
            self.plenitude,
            self.body_dirtiness,
            self.mane_dirtiness,
            self.tail_dirtiness,
            self.attachment,
            self.boredom,
            self.stop_amends_point,
        ] {
            writer.write(&value)?;
        }
        Ok(())
    }
}

impl Decode for HorseCondition {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            stamina: reader.read()?,
            charm: reader.read()?,
            friendliness: reader.read()?,
            injury: reader.read()?,
            plenitude: reader.read()?,
            body_dirtiness: reader.read()?,
            mane_dirtiness: reader.read()?,
            tail_dirtiness: reader.read()?,
            attachment: reader.read()?,
            boredom: reader.read()?,
            stop_amends_point: reader.read()?,
        })
    }
}

/// Riding mastery counters of a horse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
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

impl Encode for HorseMastery {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.spur_magic_count)?;
        writer.write(&self.jump_count)?;
        writer.write(&self.sliding_time)?;
        writer.write(&self.gliding_distance)
    }
}

impl Decode for HorseMastery {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            spur_magic_count: reader.read()?,
            jump_count: reader.read()?,
            sliding_time: reader.read()?,
            gliding_distance: reader.read()?,
        })
    }
}

/// Full horse layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Horse {
    /// Horse uid.
    pub uid: WireUid,
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
    /// Luck state.
    pub luck_state: u32,
    /// Emblem id.
    pub emblem: u32,
}

impl Horse {
    /// Value the client expects in the reserved byte after the class.
    pub const RESERVED_VAL0: u8 = 1;
}

impl Encode for Horse {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.uid)?;
        writer.write(&self.tid)?;
        writer.write(&self.name)?;
        writer.write_pod(&self.parts)?;
        writer.write_pod(&self.appearance)?;
        writer.write(&self.stats)?;
        writer.write(&self.rating)?;
        writer.write(&self.class)?;
        writer.write(&Self::RESERVED_VAL0)?;
        writer.write(&self.grade)?;
        writer.write(&self.growth_points)?;
        writer.write(&self.condition)?;
        // Reserved.
        writer.write(&0u32)?;
        writer.write(&self.mastery)?;
        writer.write(&self.luck_state)?;
        writer.write(&self.emblem)
    }
}

impl Decode for Horse {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        let uid = reader.read()?;
        let tid = reader.read()?;
        let name = reader.read()?;
        let parts = reader.read_pod()?;
        let appearance = reader.read_pod()?;
        let stats = reader.read()?;
        let rating = reader.read()?;
        let class = reader.read()?;
        let _val0: u8 = reader.read()?;
        let grade = reader.read()?;
        let growth_points = reader.read()?;
        let condition = reader.read()?;
        let _val16: u32 = reader.read()?;
        Ok(Self {
            uid,
            tid,
            name,
            parts,
            appearance,
            stats,
            rating,
            class,
            grade,
            growth_points,
            condition,
            mastery: reader.read()?,
            luck_state: reader.read()?,
            emblem: reader.read()?,
        })
    }
}

/// Character body parts.
///
/// Size: 4 bytes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct CharacterParts {
    /// Body model.
    pub model: u8,
    /// Mouth.
    pub mouth: u8,
    /// Face.
    pub face: u8,
    /// Reserved, always zero.
    pub reserved: u8,
}

/// Character proportions.
///
/// Size: 12 bytes, each field little-endian
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CharacterAppearance {
    /// Voice.
    pub voice: u16,
    /// Head size.
    pub head_size: u16,
    /// Height.
    pub height: u16,
    /// Thigh volume.
    pub thigh_volume: u16,
    /// Leg volume.
    pub leg_volume: u16,
    /// Emblem.
    pub emblem: u16,
}

impl Encode for CharacterAppearance {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.voice)?;
        writer.write(&self.head_size)?;
        writer.write(&self.height)?;
        writer.write(&self.thigh_volume)?;
        writer.write(&self.leg_volume)?;
        writer.write(&self.emblem)
    }
}

impl Decode for CharacterAppearance {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            voice: reader.read()?,
            head_size: reader.read()?,
            height: reader.read()?,
            thigh_volume: reader.read()?,
            leg_volume: reader.read()?,
            emblem: reader.read()?,
        })
    }
}

/// Permission level of a character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum CharacterRole {
    /// Regular player.
    #[default]
    User = 0,
    /// Page master (moderator).
    PageMaster = 1,
    /// Game master.
    GameMaster = 2,
}

impl Encode for CharacterRole {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&(*self as u8))
    }
}

impl Decode for CharacterRole {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        match reader.read::<u8>()? {
            0 => Ok(Self::User),
            1 => Ok(Self::PageMaster),
            2 => Ok(Self::GameMaster),
            value => Err(ProtocolError::InvalidEnum {
                field: "character role",
                value: u32::from(value),
            }),
        }
    }
}

/// Guild summary attached to a character.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuildTag {
    /// Guild uid, 0 when the character has no guild.
    pub uid: WireUid,
    /// Guild name.
    pub name: String,
}

impl Encode for GuildTag {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.uid)?;
        writer.write(&self.name)
    }
}

impl Decode for GuildTag {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            uid: reader.read()?,
            name: reader.read()?,
        })
    }
}

/// Full character layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Character {
    /// Character uid.
    pub uid: WireUid,
    /// Name.
    pub name: String,
    /// Profile introduction.
    pub introduction: String,
    /// Level.
    pub level: u16,
    /// Carrots (soft currency, may go negative on debt).
    pub carrots: i32,
    /// Cash (hard currency).
    pub cash: u32,
    /// Permission level.
    pub role: CharacterRole,
    /// Body parts.
    pub parts: CharacterParts,
    /// Proportions.
    pub appearance: CharacterAppearance,
    /// Guild summary.
    pub guild: GuildTag,
    /// Current mount uid.
    pub mount_uid: WireUid,
}

impl Encode for Character {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.uid)?;
        writer.write(&self.name)?;
        writer.write(&self.introduction)?;
        writer.write(&self.level)?;
        writer.write(&self.carrots)?;
        writer.write(&self.cash)?;
        writer.write(&self.role)?;
        writer.write_pod(&self.parts)?;
        writer.write(&self.appearance)?;
        writer.write(&self.guild)?;
        writer.write(&self.mount_uid)
    }
}

impl Decode for Character {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            uid: reader.read()?,
            name: reader.read()?,
            introduction: reader.read()?,
            level: reader.read()?,
            carrots: reader.read()?,
            cash: reader.read()?,
            role: reader.read()?,
            parts: reader.read_pod()?,
            appearance: reader.read()?,
            guild: reader.read()?,
            mount_uid: reader.read()?,
        })
    }
}

/// Guild layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Guild {
    /// Guild uid.
    pub uid: WireUid,
    /// Name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Number of members.
    pub member_count: u16,
}

impl Encode for Guild {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.uid)?;
        writer.write(&self.name)?;
        writer.write(&self.description)?;
        writer.write(&self.member_count)
    }
}

impl Decode for Guild {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            uid: reader.read()?,
            name: reader.read()?,
            description: reader.read()?,
            member_count: reader.read()?,
        })
    }
}

/// Pet layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pet {
    /// Pet uid.
    pub uid: WireUid,
    /// Pet template id.
    pub pet_id: u32,
    /// Given name.
    pub name: String,
    /// Birth date (unix seconds).
    pub birth_date: u32,
}

impl Encode for Pet {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.uid)?;
        writer.write(&self.pet_id)?;
        writer.write(&self.name)?;
        writer.write(&self.birth_date)
    }
}

impl Decode for Pet {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            uid: reader.read()?,
            pet_id: reader.read()?,
            name: reader.read()?,
            birth_date: reader.read()?,
        })
    }
}

/// Egg layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Egg {
    /// Egg uid.
    pub uid: WireUid,
    /// Template of the egg item.
    pub item_tid: u32,
    /// Template of the horse it hatches into.
    pub horse_tid: u32,
    /// Hatch time (unix seconds).
    pub hatch_at: u32,
}

impl Encode for Egg {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.uid)?;
        writer.write(&self.item_tid)?;
        writer.write(&self.horse_tid)?;
        writer.write(&self.hatch_at)
    }
}

impl Decode for Egg {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            uid: reader.read()?,
            item_tid: reader.read()?,
            horse_tid: reader.read()?,
            hatch_at: reader.read()?,
        })
    }
}

/// Kind of mail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[repr(u8)]
pub enum MailType {
    /// Sent by another player.
    #[default]
    Regular = 0,
    /// Sent by the server.
    System = 1,
}

impl Encode for MailType {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&(*self as u8))
    }
}

impl Decode for MailType {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        match reader.read::<u8>()? {
            0 => Ok(Self::Regular),
            1 => Ok(Self::System),
            value => Err(ProtocolError::InvalidEnum {
                field: "mail type",
                value: u32::from(value),
            }),
        }
    }
}

/// Mail list entry (the body is fetched separately).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MailHeader {
    /// Mail uid.
    pub uid: WireUid,
    /// Kind of mail.
    pub mail_type: MailType,
    /// Whether it was read.
    pub read: bool,
    /// Sender name.
    pub sender: String,
    /// Subject line.
    pub subject: String,
    /// Creation time (unix seconds).
    pub created_at: u32,
}

impl Encode for MailHeader {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.uid)?;
        writer.write(&self.mail_type)?;
        writer.write(&self.read)?;
        writer.write(&self.sender)?;
        writer.write(&self.subject)?;
        writer.write(&self.created_at)
    }
}

impl Decode for MailHeader {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            uid: reader.read()?,
            mail_type: reader.read()?,
            read: reader.read()?,
            sender: reader.read()?,
            subject: reader.read()?,
            created_at: reader.read()?,
        })
    }
}

/// One key binding.
///
/// Size: 4 bytes
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyBinding {
    /// Bound action.
    pub action: u16,
    /// Primary key.
    pub primary: u8,
    /// Secondary key.
    pub secondary: u8,
}

impl Encode for KeyBinding {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.action)?;
        writer.write(&self.primary)?;
        writer.write(&self.secondary)
    }
}

impl Decode for KeyBinding {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            action: reader.read()?,
            primary: reader.read()?,
            secondary: reader.read()?,
        })
    }
}

/// Keyboard options block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyboardOptions {
    /// Bindings, at most 255.
    pub bindings: Vec<KeyBinding>,
}

impl Encode for KeyboardOptions {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write_seq(&self.bindings, LengthPrefix::U8)
    }
}

impl Decode for KeyboardOptions {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            bindings: reader.read_seq(LengthPrefix::U8)?,
        })
    }
}
