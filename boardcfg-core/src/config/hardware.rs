//! Hardware configuration types
//!
//! These types define the hardware-level facts of a board: pins,
//! peripherals, display parameters and the MCU they are checked against.

use core::ops::RangeInclusive;
use core::str::FromStr;

use heapless::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::types::{
    label, ConfigError, Label, MAX_PINS_PER_PERIPHERAL, MAX_RESERVED_PINS,
};

/// Pin configuration with optional inversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinConfig {
    /// GPIO pin number
    pub pin: u8,
    /// Pin is active-low (inverted)
    pub inverted: bool,
    /// Enable internal pull-up
    pub pull_up: bool,
}

impl PinConfig {
    /// Create a new pin config
    pub const fn new(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: false,
        }
    }

    /// Create an inverted (active-low) pin
    pub const fn inverted(pin: u8) -> Self {
        Self {
            pin,
            inverted: true,
            pull_up: false,
        }
    }

    /// Create a pin with pull-up enabled
    pub const fn with_pullup(pin: u8) -> Self {
        Self {
            pin,
            inverted: false,
            pull_up: true,
        }
    }
}

/// A peripheral role bound to a GPIO
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinAssignment {
    /// Role name within the peripheral (e.g. "cs", "sck")
    pub role: Label,
    /// Assigned pin
    pub pin: PinConfig,
}

/// Ordered role → pin map of one peripheral
pub type PinMap = Vec<PinAssignment, MAX_PINS_PER_PERIPHERAL>;

/// Peripheral families a board can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PeripheralKind {
    /// SPI display controller
    Display,
    /// SD card over SPI
    SdCard,
    /// I2S audio
    I2s,
    /// Status LED
    Led,
    /// Push button
    Button,
    /// UART port
    Uart,
    /// I2C bus
    I2c,
}

impl PeripheralKind {
    /// All kinds, in schema order
    pub const ALL: [PeripheralKind; 7] = [
        PeripheralKind::Display,
        PeripheralKind::SdCard,
        PeripheralKind::I2s,
        PeripheralKind::Led,
        PeripheralKind::Button,
        PeripheralKind::Uart,
        PeripheralKind::I2c,
    ];

    /// Key prefix used in the schema and in board files
    pub const fn as_str(self) -> &'static str {
        match self {
            PeripheralKind::Display => "display",
            PeripheralKind::SdCard => "sdcard",
            PeripheralKind::I2s => "i2s",
            PeripheralKind::Led => "led",
            PeripheralKind::Button => "button",
            PeripheralKind::Uart => "uart",
            PeripheralKind::I2c => "i2c",
        }
    }
}

impl FromStr for PeripheralKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PeripheralKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or(ConfigError::UnknownKind)
    }
}

/// Name, kind and wiring of one peripheral
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PeripheralConfig {
    /// Peripheral name, unique within a board
    pub name: Label,
    /// Peripheral family
    pub kind: PeripheralKind,
    /// Role → pin assignments, in declaration order
    pub pins: PinMap,
}

impl PeripheralConfig {
    /// Create a peripheral with no pins assigned
    pub fn new(name: &str, kind: PeripheralKind) -> Result<Self, ConfigError> {
        Ok(Self {
            name: label(name)?,
            kind,
            pins: Vec::new(),
        })
    }

    /// Assign a pin to a role, replacing any previous assignment
    pub fn set_pin(&mut self, role: &str, pin: PinConfig) -> Result<(), ConfigError> {
        if let Some(slot) = self.pins.iter_mut().find(|a| a.role.as_str() == role) {
            slot.pin = pin;
            return Ok(());
        }

        self.pins
            .push(PinAssignment {
                role: label(role)?,
                pin,
            })
            .map_err(|_| ConfigError::TooManyItems)
    }

    /// Remove a role's assignment (e.g. an unconnected reset line)
    pub fn clear_pin(&mut self, role: &str) {
        if let Some(idx) = self.pins.iter().position(|a| a.role.as_str() == role) {
            self.pins.remove(idx);
        }
    }

    /// Builder-style [`set_pin`](Self::set_pin)
    pub fn with_pin(mut self, role: &str, pin: u8) -> Result<Self, ConfigError> {
        self.set_pin(role, PinConfig::new(pin))?;
        Ok(self)
    }

    /// Pin assigned to a role
    pub fn pin(&self, role: &str) -> Option<&PinConfig> {
        self.pins
            .iter()
            .find(|a| a.role.as_str() == role)
            .map(|a| &a.pin)
    }
}

/// A peripheral that is either wired up or declared but switched off
///
/// The disabled state keeps its pin map so alternative wirings stay
/// visible, but it never takes part in pin checks.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Peripheral {
    Disabled(PeripheralConfig),
    Enabled(PeripheralConfig),
}

impl Peripheral {
    /// Wrap a config with the given state
    pub fn new(config: PeripheralConfig, enabled: bool) -> Self {
        if enabled {
            Peripheral::Enabled(config)
        } else {
            Peripheral::Disabled(config)
        }
    }

    /// Configuration regardless of state
    pub fn config(&self) -> &PeripheralConfig {
        match self {
            Peripheral::Disabled(c) | Peripheral::Enabled(c) => c,
        }
    }

    /// Check if this peripheral is active
    pub const fn is_enabled(&self) -> bool {
        matches!(self, Peripheral::Enabled(_))
    }

    /// Peripheral name
    pub fn name(&self) -> &str {
        self.config().name.as_str()
    }

    /// Peripheral kind
    pub fn kind(&self) -> PeripheralKind {
        self.config().kind
    }
}

/// Display controller chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DisplayController {
    #[default]
    St7735,
    St7789,
    Ili9341,
    Sh1106,
}

impl DisplayController {
    /// Highest SPI clock the controller is driven at, in Hz
    pub const fn max_spi_hz(self) -> u32 {
        match self {
            DisplayController::St7735 => 40_000_000,
            DisplayController::St7789 => 80_000_000,
            DisplayController::Ili9341 => 80_000_000,
            DisplayController::Sh1106 => 10_000_000,
        }
    }

    /// Name used in board files
    pub const fn as_str(self) -> &'static str {
        match self {
            DisplayController::St7735 => "st7735",
            DisplayController::St7789 => "st7789",
            DisplayController::Ili9341 => "ili9341",
            DisplayController::Sh1106 => "sh1106",
        }
    }
}

impl FromStr for DisplayController {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "st7735" | "ST7735" => Ok(DisplayController::St7735),
            "st7789" | "ST7789" => Ok(DisplayController::St7789),
            "ili9341" | "ILI9341" => Ok(DisplayController::Ili9341),
            "sh1106" | "SH1106" => Ok(DisplayController::Sh1106),
            _ => Err(ConfigError::UnknownKind),
        }
    }
}

/// Display driver parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayParams {
    /// Controller chip
    pub controller: DisplayController,
    /// Width in pixels
    pub width: u16,
    /// Height in pixels
    pub height: u16,
    /// Rotation in quarter turns (0-3)
    pub rotation: u8,
    /// SPI clock in Hz
    pub spi_hz: u32,
}

impl Default for DisplayParams {
    fn default() -> Self {
        Self {
            controller: DisplayController::St7735,
            width: 128,
            height: 128,
            rotation: 0,
            spi_hz: 40_000_000,
        }
    }
}

/// Pin constraints of a microcontroller family
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct McuProfile {
    /// MCU name as used by board descriptors (e.g. "ESP32C3")
    pub identifier: Label,
    /// Lowest valid GPIO number
    pub gpio_min: u8,
    /// Highest valid GPIO number
    pub gpio_max: u8,
    /// Pins inside the range that must not be assigned
    pub reserved: Vec<u8, MAX_RESERVED_PINS>,
}

impl McuProfile {
    /// Create a profile with no reserved pins
    pub fn new(identifier: &str, gpio: RangeInclusive<u8>) -> Result<Self, ConfigError> {
        Ok(Self {
            identifier: label(identifier)?,
            gpio_min: *gpio.start(),
            gpio_max: *gpio.end(),
            reserved: Vec::new(),
        })
    }

    /// Add reserved pins
    pub fn with_reserved(
        mut self,
        pins: impl IntoIterator<Item = u8>,
    ) -> Result<Self, ConfigError> {
        for pin in pins {
            if !self.reserved.contains(&pin) {
                self.reserved
                    .push(pin)
                    .map_err(|_| ConfigError::TooManyItems)?;
            }
        }
        Ok(self)
    }

    /// Check if a pin number exists on this MCU
    pub fn in_range(&self, pin: u8) -> bool {
        (self.gpio_min..=self.gpio_max).contains(&pin)
    }

    /// Check if a pin is reserved
    pub fn is_reserved(&self, pin: u8) -> bool {
        self.reserved.contains(&pin)
    }
}
