//! # Entity Model
//!
//! Plain value aggregates persisted by the backing store.
//!
//! Relationships between entities are stored as uid fields or uid lists,
//! never as references. Resolving them is the job of the load graphs in
//! [`crate::director`].
//!
//! ## Keys
//!
//! | kind          | key      | sentinel      |
//! |---------------|----------|---------------|
//! | `User`        | `String` | empty name    |
//! | everything else | [`Uid`] | [`INVALID_UID`] |

mod character;
mod guild;
mod horse;
mod item;
mod mail;
mod settings;
mod user;

use std::fmt::{Debug, Display};
use std::hash::Hash;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use character::{Character, CharacterAppearance, CharacterParts, Mailbox, Role};
pub use guild::Guild;
pub use horse::{
    Horse, HorseAppearance, HorseCondition, HorseMastery, HorseParts, HorseStats, Stallion,
};
pub use item::{Egg, Housing, Item, Pet, StorageItem};
pub use mail::{Mail, MailType};
pub use settings::{GamepadBinding, KeyBinding, Settings};
pub use user::{Infraction, Punishment, User};

/// Identifier of a uid-keyed entity, assigned by the backing store.
pub type Uid = u32;

/// Uid that never names an entity.
pub const INVALID_UID: Uid = 0;

/// Key of an entity within its kind.
pub trait EntityKey:
    Clone + Default + Eq + Hash + Debug + Display + Send + Sync + 'static
{
    /// Whether this key is the "no entity" sentinel.
    fn is_sentinel(&self) -> bool;

    /// The key as a uid, for uid-keyed kinds.
    fn as_uid(&self) -> Option<Uid>;
}

impl EntityKey for Uid {
    #[inline]
    fn is_sentinel(&self) -> bool {
        *self == INVALID_UID
    }

    #[inline]
    fn as_uid(&self) -> Option<Uid> {
        Some(*self)
    }
}

impl EntityKey for String {
    #[inline]
    fn is_sentinel(&self) -> bool {
        self.is_empty()
    }

    #[inline]
    fn as_uid(&self) -> Option<Uid> {
        None
    }
}

/// A persistent game entity.
pub trait Entity:
    Clone + Default + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Key type.
    type Key: EntityKey;

    /// Kind name, used in logs and as the backing-store namespace.
    const KIND: &'static str;

    /// The entity's key.
    fn key(&self) -> Self::Key;

    /// Overwrites the entity's key.
    fn set_key(&mut self, key: Self::Key);
}

/// Implements [`Entity`] for kinds keyed by their `uid` field.
macro_rules! uid_entity {
    ($($entity:ty => $kind:literal),* $(,)?) => {
        $(
            impl $crate::model::Entity for $entity {
                type Key = $crate::model::Uid;
                const KIND: &'static str = $kind;

                #[inline]
                fn key(&self) -> Self::Key {
                    self.uid
                }

                #[inline]
                fn set_key(&mut self, key: Self::Key) {
                    self.uid = key;
                }
            }
        )*
    };
}

uid_entity!(
    Infraction => "infraction",
    Character => "character",
    Horse => "horse",
    Item => "item",
    StorageItem => "storage_item",
    Egg => "egg",
    Pet => "pet",
    Housing => "housing",
    Guild => "guild",
    Stallion => "stallion",
    Mail => "mail",
    Settings => "settings",
);

impl Entity for User {
    type Key = String;
    const KIND: &'static str = "user";

    fn key(&self) -> Self::Key {
        self.name.clone()
    }

    fn set_key(&mut self, key: Self::Key) {
        self.name = key;
    }
}
