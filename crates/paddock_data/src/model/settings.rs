//! Per-character client settings.

use serde::{Deserialize, Serialize};

use super::Uid;

/// A keyboard binding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBinding {
    /// Bound action.
    pub action: u16,
    /// Primary key.
    pub primary: u8,
    /// Secondary key.
    pub secondary: u8,
}

/// A gamepad binding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamepadBinding {
    /// Bound action.
    pub action: u16,
    /// Button.
    pub button: u8,
}

/// Client settings saved by a character.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Settings uid.
    pub uid: Uid,
    /// Age shown on the profile.
    pub age: u8,
    /// Hide the age from other players.
    pub hide_age: bool,
    /// Keyboard bindings.
    pub keyboard_bindings: Vec<KeyBinding>,
    /// Gamepad bindings.
    pub gamepad_bindings: Vec<GamepadBinding>,
}
