//! # Message Definitions
//!
//! Server -> client notifications that carry the entity layouts from
//! [`crate::structures`]. Interpreting client commands is left to the
//! command handlers built on top of this crate.

use crate::error::ProtocolResult;
use crate::framing::Message;
use crate::stream::{Decode, Encode, LengthPrefix, StreamReader, StreamWriter};
use crate::structures::{Character, Horse, Item, KeyboardOptions, MailHeader, StoredItem};

/// Message ids understood by the client.
pub mod ids {
    /// Character profile with the current mount.
    pub const CHARACTER_PROFILE: u16 = 0x0101;
    /// Every horse in the character's stable.
    pub const HORSE_LIST: u16 = 0x0102;
    /// Inventory items.
    pub const INVENTORY: u16 = 0x0103;
    /// Gift or purchase storage page.
    pub const STORAGE_PAGE: u16 = 0x0104;
    /// Mailbox page.
    pub const MAIL_LIST: u16 = 0x0105;
    /// Keyboard bindings.
    pub const KEYBOARD_OPTIONS: u16 = 0x0106;
}

/// Character profile with the current mount.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharacterProfile {
    /// The character.
    pub character: Character,
    /// Current mount.
    pub mount: Horse,
}

impl Encode for CharacterProfile {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.character)?;
        writer.write(&self.mount)
    }
}

impl Decode for CharacterProfile {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self {
            character: reader.read()?,
            mount: reader.read()?,
        })
    }
}

impl Message for CharacterProfile {
    const ID: u16 = ids::CHARACTER_PROFILE;
}

/// Defines a message wrapping a single counted list.
macro_rules! list_message {
    ($(#[$meta:meta])* $name:ident, $field:ident: $element:ty, $prefix:expr, $id:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name {
            /// Listed entries, in display order.
            pub $field: Vec<$element>,
        }

        impl Encode for $name {
            fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
                writer.write_seq(&self.$field, $prefix)
            }
        }

        impl Decode for $name {
            fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
                Ok(Self {
                    $field: reader.read_seq($prefix)?,
                })
            }
        }

        impl Message for $name {
            const ID: u16 = $id;
        }
    };
}

list_message!(
    /// Every horse in the character's stable.
    HorseList, horses: Horse, LengthPrefix::U8, ids::HORSE_LIST
);

list_message!(
    /// Inventory items.
    Inventory, items: Item, LengthPrefix::U16, ids::INVENTORY
);

list_message!(
    /// One page of gifts or purchases.
    StoragePage, entries: StoredItem, LengthPrefix::U8, ids::STORAGE_PAGE
);

list_message!(
    /// One page of mail headers.
    MailList, mails: MailHeader, LengthPrefix::U8, ids::MAIL_LIST
);

/// Keyboard bindings of the character.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyboardOptionsNotify {
    /// The bindings block.
    pub options: KeyboardOptions,
}

impl Encode for KeyboardOptionsNotify {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&self.options)
    }
}

impl Decode for KeyboardOptionsNotify {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(Self { options: reader.read()? })
    }
}

impl Message for KeyboardOptionsNotify {
    const ID: u16 = ids::KEYBOARD_OPTIONS;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::{decode_message, encode_message, BufferKind, BUFFER_SIZE};

    #[test]
    fn test_inventory_uses_wide_count() {
        let inventory = Inventory {
            items: vec![Item { uid: 1, tid: 2, expires_at: 0, count: 1 }; 300],
        };
        let mut buffer = vec![0u8; BUFFER_SIZE * 4];
        let written = encode_message(&inventory, &mut buffer, BufferKind::Jumbo).unwrap();
        assert_eq!(written, 4 + 2 + 300 * 16);

        let decoded: Inventory = decode_message(&buffer[..written], BufferKind::Jumbo).unwrap();
        assert_eq!(decoded, inventory);
    }

    #[test]
    fn test_horse_list_cap() {
        let list = HorseList {
            horses: vec![Horse::default(); 256],
        };
        let mut buffer = vec![0u8; 64 * 1024];
        assert!(encode_message(&list, &mut buffer, BufferKind::Jumbo).is_err());
    }
}
