//! Built-in board definitions
//!
//! Boards compiled into the firmware. Each entry builds its descriptor on
//! demand; [`register_builtin`] runs them all through the registry at
//! startup.

use crate::config::{
    BoardDescriptor, ConfigError, DisplayController, DisplayParams, Peripheral, PeripheralConfig,
    PeripheralKind, PinConfig,
};
use crate::mcu;
use crate::registry::{Registry, RegistryError};

/// Errors while registering built-in boards
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BuiltinError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Board targets an MCU without a built-in profile
    #[error("no profile for the board's MCU")]
    UnknownMcu,
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Builder for one built-in board
pub type BoardFn = fn() -> Result<BoardDescriptor, ConfigError>;

/// All built-in boards
pub const BUILTIN: &[BoardFn] = &[spotpear_c3];

/// Spotpear C3-1.44 MiniTV
///
/// ESP32-C3 with a 128x128 ST7735 panel on SPI1, one LED and two buttons.
/// The display block is declared but switched off, matching the board
/// port that leaves the driver pins to user code.
pub fn spotpear_c3() -> Result<BoardDescriptor, ConfigError> {
    let mut board = BoardDescriptor::new("SPOTPEARC3")?;
    board.set_board_name("Spotpear C3-1.44 MiniTV")?;
    board.set_mcu_name("ESP32C3")?;
    board.set_feature("sdcard", false)?;
    board.set_feature("i2s", false)?;

    let display = PeripheralConfig::new("display", PeripheralKind::Display)?
        .with_pin("sck", 3)?
        .with_pin("mosi", 4)?
        .with_pin("cs", 2)?
        .with_pin("dc", 0)?
        .with_pin("rst", 5)?;
    board.add_peripheral(Peripheral::Disabled(display))?;

    let led = PeripheralConfig::new("led", PeripheralKind::Led)?.with_pin("pin", 11)?;
    board.add_peripheral(Peripheral::Enabled(led))?;

    for (name, pin) in [("button1", 8), ("button2", 10)] {
        let mut button = PeripheralConfig::new(name, PeripheralKind::Button)?;
        button.set_pin("pin", PinConfig::new(pin))?;
        board.add_peripheral(Peripheral::Enabled(button))?;
    }

    board.display = Some(DisplayParams {
        controller: DisplayController::St7735,
        width: 128,
        height: 128,
        rotation: 0,
        spi_hz: 40_000_000,
    });

    Ok(board)
}

/// Register every built-in board against its MCU profile
///
/// Stops at the first failure; built-in tables are expected to be valid.
pub fn register_builtin(registry: &mut Registry) -> Result<(), BuiltinError> {
    for build in BUILTIN {
        let board = build()?;
        let mcu = board
            .mcu_name()
            .and_then(mcu::profile)
            .ok_or(BuiltinError::UnknownMcu)?;
        registry.register(board, &mcu)?;
    }
    Ok(())
}
