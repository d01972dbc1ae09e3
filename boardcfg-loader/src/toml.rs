//! TOML board files
//!
//! Structured alternative to board headers:
//!
//! ```toml
//! identifier = "SPOTPEARC3"
//! board_name = "Spotpear C3-1.44 MiniTV"
//! mcu_name = "ESP32C3"
//!
//! [features]
//! sdcard = false
//!
//! [peripheral.display]
//! enabled = false
//! sck = "gpio3"
//! cs = 2
//!
//! [display]
//! controller = "st7735"
//! width = 128
//! ```
//!
//! Peripheral tables take an optional `kind` (defaults to the table name)
//! and `enabled` (defaults to true); every other key is a pin role. Pins
//! are written as `"gpioN"` with optional `!` (inverted) and `^` (pull-up)
//! modifiers, or as a bare integer. `-1` leaves the role unconnected.

use ::toml::{Table, Value};
use serde::Deserialize;

use boardcfg_core::config::{
    name, BoardDescriptor, DisplayController, DisplayParams, FeatureValue, Peripheral,
    PeripheralConfig, PeripheralKind, PinConfig,
};

use crate::error::ParseError;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBoard {
    identifier: Option<String>,
    board_name: Option<String>,
    mcu_name: Option<String>,
    #[serde(default)]
    features: Table,
    #[serde(default)]
    peripheral: Table,
    display: Option<RawDisplay>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDisplay {
    controller: Option<String>,
    width: Option<u16>,
    height: Option<u16>,
    rotation: Option<u8>,
    spi_hz: Option<u32>,
}

/// Parse a TOML board file
///
/// `default_identifier` is used when the file has no `identifier` key,
/// usually the file stem.
pub fn parse_board_toml(
    input: &str,
    default_identifier: &str,
) -> Result<BoardDescriptor, ParseError> {
    let raw: RawBoard = ::toml::from_str(input)?;

    let identifier = raw.identifier.as_deref().unwrap_or(default_identifier);
    let mut board =
        BoardDescriptor::new(identifier).map_err(ParseError::config("identifier"))?;

    if let Some(board_name) = &raw.board_name {
        board
            .set_board_name(board_name)
            .map_err(ParseError::config("board_name"))?;
    }
    if let Some(mcu_name) = &raw.mcu_name {
        board
            .set_mcu_name(mcu_name)
            .map_err(ParseError::config("mcu_name"))?;
    }

    for (key, value) in &raw.features {
        let value = feature_value(key, value)?;
        board
            .set_feature(key, value)
            .map_err(ParseError::config(key))?;
    }

    for (peripheral_name, value) in &raw.peripheral {
        let table = value
            .as_table()
            .ok_or_else(|| ParseError::invalid(peripheral_name, &format!("{:?}", value)))?;
        let peripheral = parse_peripheral(peripheral_name, table)?;
        board
            .add_peripheral(peripheral)
            .map_err(ParseError::config(peripheral_name))?;
    }

    if let Some(display) = raw.display {
        board.display = Some(parse_display(display)?);
    }

    Ok(board)
}

fn feature_value(key: &str, value: &Value) -> Result<FeatureValue, ParseError> {
    match value {
        Value::Boolean(b) => Ok(FeatureValue::Bool(*b)),
        Value::Integer(n) => i32::try_from(*n)
            .map(FeatureValue::Int)
            .map_err(|_| ParseError::invalid(key, &n.to_string())),
        Value::String(s) => Ok(FeatureValue::Str(name(s).map_err(ParseError::config(key))?)),
        other => Err(ParseError::invalid(key, &format!("{:?}", other))),
    }
}

fn parse_peripheral(peripheral_name: &str, table: &Table) -> Result<Peripheral, ParseError> {
    let kind_name = match table.get("kind") {
        Some(Value::String(kind)) => kind.as_str(),
        Some(other) => return Err(ParseError::invalid("kind", &format!("{:?}", other))),
        None => peripheral_name,
    };
    let kind: PeripheralKind = kind_name
        .parse()
        .map_err(|_| ParseError::UnknownKind(kind_name.into()))?;

    let enabled = match table.get("enabled") {
        Some(Value::Boolean(b)) => *b,
        Some(other) => return Err(ParseError::invalid("enabled", &format!("{:?}", other))),
        None => true,
    };

    let mut config =
        PeripheralConfig::new(peripheral_name, kind).map_err(ParseError::config(peripheral_name))?;

    for (role, value) in table {
        if role == "kind" || role == "enabled" {
            continue;
        }
        match parse_pin(value)? {
            Some(pin) => config.set_pin(role, pin).map_err(ParseError::config(role))?,
            None => config.clear_pin(role),
        }
    }

    Ok(Peripheral::new(config, enabled))
}

/// Parse a pin value; `None` means not connected
fn parse_pin(value: &Value) -> Result<Option<PinConfig>, ParseError> {
    match value {
        Value::Integer(-1) => Ok(None),
        Value::Integer(n) => u8::try_from(*n)
            .map(|pin| Some(PinConfig::new(pin)))
            .map_err(|_| ParseError::InvalidPin(n.to_string())),
        Value::String(s) => parse_pin_str(s).map(Some),
        other => Err(ParseError::InvalidPin(format!("{:?}", other))),
    }
}

/// Parse a pin string like "gpio11", "!gpio12", "^gpio4"
fn parse_pin_str(value: &str) -> Result<PinConfig, ParseError> {
    let mut inverted = false;
    let mut pull_up = false;
    let mut s = value;

    loop {
        if let Some(rest) = s.strip_prefix('!') {
            inverted = true;
            s = rest;
        } else if let Some(rest) = s.strip_prefix('^') {
            pull_up = true;
            s = rest;
        } else {
            break;
        }
    }

    let number = s
        .strip_prefix("gpio")
        .ok_or_else(|| ParseError::InvalidPin(value.into()))?;
    let pin: u8 = number
        .parse()
        .map_err(|_| ParseError::InvalidPin(value.into()))?;

    Ok(PinConfig {
        pin,
        inverted,
        pull_up,
    })
}

fn parse_display(raw: RawDisplay) -> Result<DisplayParams, ParseError> {
    let defaults = DisplayParams::default();
    let controller = match raw.controller.as_deref() {
        Some(controller) => controller
            .parse::<DisplayController>()
            .map_err(|_| ParseError::UnknownKind(controller.into()))?,
        None => defaults.controller,
    };

    Ok(DisplayParams {
        controller,
        width: raw.width.unwrap_or(defaults.width),
        height: raw.height.unwrap_or(defaults.height),
        rotation: raw.rotation.unwrap_or(defaults.rotation),
        spi_hz: raw.spi_hz.unwrap_or(defaults.spi_hz),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pin() {
        let pin = parse_pin_str("gpio11").unwrap();
        assert_eq!(pin.pin, 11);
        assert!(!pin.inverted);
        assert!(!pin.pull_up);

        let pin = parse_pin_str("!gpio12").unwrap();
        assert_eq!(pin.pin, 12);
        assert!(pin.inverted);

        let pin = parse_pin_str("^!gpio5").unwrap();
        assert_eq!(pin.pin, 5);
        assert!(pin.inverted);
        assert!(pin.pull_up);

        assert!(parse_pin_str("pin5").is_err());
        assert!(parse_pin_str("gpio300").is_err());
    }

    #[test]
    fn test_parse_pin_values() {
        assert_eq!(parse_pin(&Value::Integer(7)).unwrap(), Some(PinConfig::new(7)));
        assert_eq!(parse_pin(&Value::Integer(-1)).unwrap(), None);
        assert!(parse_pin(&Value::Integer(-2)).is_err());
        assert!(parse_pin(&Value::Boolean(true)).is_err());
    }

    #[test]
    fn test_parse_minimal_board() {
        let board = parse_board_toml(
            r#"
board_name = "Test"
mcu_name = "RP2040"

[peripheral.status]
kind = "led"
pin = "!gpio25"
"#,
            "fallback",
        )
        .unwrap();

        assert_eq!(board.identifier.as_str(), "fallback");
        let status = board.find_peripheral("status").unwrap();
        assert!(status.is_enabled());
        assert_eq!(status.kind(), PeripheralKind::Led);
        assert_eq!(status.config().pin("pin"), Some(&PinConfig::inverted(25)));
    }

    #[test]
    fn test_feature_values_kept_raw() {
        let board = parse_board_toml(
            r#"
identifier = "B"
[features]
sdcard = "yes"
i2s = 1
wifi = true
"#,
            "x",
        )
        .unwrap();

        assert_eq!(
            board.find_feature("sdcard"),
            Some(&FeatureValue::Str(name("yes").unwrap()))
        );
        assert_eq!(board.find_feature("i2s"), Some(&FeatureValue::Int(1)));
        assert!(board.feature_enabled("wifi"));
    }

    #[test]
    fn test_display_defaults() {
        let board = parse_board_toml(
            r#"
identifier = "B"
[display]
controller = "st7789"
width = 240
"#,
            "x",
        )
        .unwrap();

        let display = board.display.unwrap();
        assert_eq!(display.controller, DisplayController::St7789);
        assert_eq!(display.width, 240);
        assert_eq!(display.height, 128);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_board_toml("[peripheral.lcd]\ncs = 1", "x"),
            Err(ParseError::UnknownKind(_))
        ));
        assert!(matches!(
            parse_board_toml("[peripheral.led]\nenabled = \"no\"", "x"),
            Err(ParseError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse_board_toml("[display]\ncontroller = \"crt\"", "x"),
            Err(ParseError::UnknownKind(_))
        ));
        assert!(matches!(
            parse_board_toml("colour = \"red\"", "x"),
            Err(ParseError::Toml(_))
        ));
    }
}
