//! Configuration type definitions
//!
//! Fixed-capacity building blocks shared by board descriptors, MCU profiles
//! and validation errors.

use heapless::String;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum label length (identifiers, feature names, roles, MCU names)
pub const MAX_LABEL_LEN: usize = 16;

/// Maximum length of a human-readable name or string value
pub const MAX_NAME_LEN: usize = 48;

/// Maximum feature flags per board
pub const MAX_FEATURES: usize = 8;

/// Maximum peripherals per board
pub const MAX_PERIPHERALS: usize = 8;

/// Maximum pin assignments per peripheral
pub const MAX_PINS_PER_PERIPHERAL: usize = 8;

/// Maximum reserved pins per MCU profile
pub const MAX_RESERVED_PINS: usize = 32;

/// Maximum boards held by a registry
pub const MAX_BOARDS: usize = 16;

/// Short identifier string
pub type Label = String<MAX_LABEL_LEN>;

/// Human-readable name or free-form string value
pub type Name = String<MAX_NAME_LEN>;

/// Errors raised while building configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// String does not fit its fixed-capacity buffer
    #[error("label exceeds its maximum length")]
    LabelTooLong,
    /// Too many items (exceeded heapless capacity)
    #[error("too many items")]
    TooManyItems,
    /// Two entries share a name that must be unique
    #[error("duplicate name")]
    DuplicateName,
    /// Peripheral kind or display controller is not recognized
    #[error("unknown kind")]
    UnknownKind,
}

/// Copy a `&str` into a label
pub fn label(s: &str) -> Result<Label, ConfigError> {
    Label::try_from(s).map_err(|_| ConfigError::LabelTooLong)
}

/// Copy a `&str` into a name
pub fn name(s: &str) -> Result<Name, ConfigError> {
    Name::try_from(s).map_err(|_| ConfigError::LabelTooLong)
}

/// Raw value of a feature flag as it was declared
///
/// Flags are meant to be booleans, but the declared value is kept as-is so
/// that the validator can report a mistyped flag instead of the loader
/// silently coercing it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FeatureValue {
    Bool(bool),
    Int(i32),
    Str(Name),
}

impl FeatureValue {
    /// The boolean value, if this is a boolean
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            FeatureValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<bool> for FeatureValue {
    fn from(b: bool) -> Self {
        FeatureValue::Bool(b)
    }
}

/// A named feature flag
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Feature {
    /// Feature name (e.g. "sdcard", "i2s")
    pub name: Label,
    /// Declared value
    pub value: FeatureValue,
}
