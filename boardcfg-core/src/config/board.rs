//! Board descriptor
//!
//! The complete declared hardware configuration for one board variant.

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::hardware::{DisplayParams, Peripheral};
use super::types::{
    label, name, ConfigError, Feature, FeatureValue, Label, Name, MAX_FEATURES, MAX_PERIPHERALS,
};

/// Board descriptor
///
/// Built once from a static table or a board file, validated, then handed
/// to the registry which owns it from there on.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardDescriptor {
    /// Unique board identifier (e.g. "SPOTPEARC3")
    pub identifier: Label,
    /// Human-readable board name
    pub board_name: Option<Name>,
    /// Target MCU name (e.g. "ESP32C3")
    pub mcu_name: Option<Label>,
    /// Feature flags in declaration order
    pub features: Vec<Feature, MAX_FEATURES>,
    /// Peripherals in declaration order
    pub peripherals: Vec<Peripheral, MAX_PERIPHERALS>,
    /// Display driver parameters
    pub display: Option<DisplayParams>,
}

impl BoardDescriptor {
    /// Create an empty descriptor
    pub fn new(identifier: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            identifier: label(identifier)?,
            board_name: None,
            mcu_name: None,
            features: Vec::new(),
            peripherals: Vec::new(),
            display: None,
        })
    }

    /// Set the human-readable board name
    pub fn set_board_name(&mut self, board_name: &str) -> Result<(), ConfigError> {
        self.board_name = Some(name(board_name)?);
        Ok(())
    }

    /// Set the target MCU name
    pub fn set_mcu_name(&mut self, mcu_name: &str) -> Result<(), ConfigError> {
        self.mcu_name = Some(label(mcu_name)?);
        Ok(())
    }

    /// Set a feature flag, replacing any previous value
    pub fn set_feature(
        &mut self,
        feature: &str,
        value: impl Into<FeatureValue>,
    ) -> Result<(), ConfigError> {
        let value = value.into();
        if let Some(slot) = self
            .features
            .iter_mut()
            .find(|f| f.name.as_str() == feature)
        {
            slot.value = value;
            return Ok(());
        }

        self.features
            .push(Feature {
                name: label(feature)?,
                value,
            })
            .map_err(|_| ConfigError::TooManyItems)
    }

    /// Add a peripheral; names must be unique within the board
    pub fn add_peripheral(&mut self, peripheral: Peripheral) -> Result<(), ConfigError> {
        if self.find_peripheral(peripheral.name()).is_some() {
            return Err(ConfigError::DuplicateName);
        }

        self.peripherals
            .push(peripheral)
            .map_err(|_| ConfigError::TooManyItems)
    }

    /// Board name, if declared
    pub fn board_name(&self) -> Option<&str> {
        self.board_name.as_ref().map(|n| n.as_str())
    }

    /// MCU name, if declared
    pub fn mcu_name(&self) -> Option<&str> {
        self.mcu_name.as_ref().map(|n| n.as_str())
    }

    /// Find a feature flag by name
    pub fn find_feature(&self, feature: &str) -> Option<&FeatureValue> {
        self.features
            .iter()
            .find(|f| f.name.as_str() == feature)
            .map(|f| &f.value)
    }

    /// Check if a feature is declared and set to `true`
    pub fn feature_enabled(&self, feature: &str) -> bool {
        self.find_feature(feature).and_then(FeatureValue::as_bool) == Some(true)
    }

    /// Find a peripheral by name
    pub fn find_peripheral(&self, peripheral: &str) -> Option<&Peripheral> {
        self.peripherals.iter().find(|p| p.name() == peripheral)
    }

    /// Peripherals that are switched on
    pub fn enabled_peripherals(&self) -> impl Iterator<Item = &Peripheral> {
        self.peripherals.iter().filter(|p| p.is_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PeripheralConfig, PeripheralKind};

    #[test]
    fn test_empty_descriptor() {
        let board = BoardDescriptor::new("SPOTPEARC3").unwrap();
        assert_eq!(board.identifier.as_str(), "SPOTPEARC3");
        assert!(board.board_name().is_none());
        assert!(board.mcu_name().is_none());
        assert!(board.features.is_empty());
        assert!(board.enabled_peripherals().next().is_none());
    }

    #[test]
    fn test_set_feature_replaces_value() {
        let mut board = BoardDescriptor::new("b").unwrap();
        board.set_feature("sdcard", true).unwrap();
        board.set_feature("sdcard", false).unwrap();

        assert_eq!(board.features.len(), 1);
        assert!(!board.feature_enabled("sdcard"));
        assert!(!board.feature_enabled("i2s"));
    }

    #[test]
    fn test_feature_capacity() {
        let mut board = BoardDescriptor::new("b").unwrap();
        for i in 0..MAX_FEATURES {
            let mut key: Label = Label::new();
            key.push_str("f").unwrap();
            key.push(char::from(b'a' + i as u8)).unwrap();
            board.set_feature(&key, true).unwrap();
        }
        assert_eq!(board.set_feature("extra", true), Err(ConfigError::TooManyItems));
    }

    #[test]
    fn test_duplicate_peripheral_name() {
        let mut board = BoardDescriptor::new("b").unwrap();
        let led = PeripheralConfig::new("led", PeripheralKind::Led).unwrap();

        board.add_peripheral(Peripheral::Enabled(led.clone())).unwrap();
        assert_eq!(
            board.add_peripheral(Peripheral::Disabled(led)),
            Err(ConfigError::DuplicateName)
        );
        assert_eq!(board.enabled_peripherals().count(), 1);
    }
}
