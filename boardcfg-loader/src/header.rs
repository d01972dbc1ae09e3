//! Board header parser
//!
//! Reads the `mpconfigboard.h` style of board definition: one
//! `#define KEY VALUE` per line. This is not a C preprocessor; it only
//! understands the subset board headers use.
//!
//! Supported features:
//! - Quoted strings (`"ESP32C3"`), decimal integers, `(0)`/`(1)` toggles
//! - Trailing `//` comments and `/* ... */` block comments, including
//!   blocks that span several lines
//! - Redefinition: a later `#define` of the same key wins
//! - Commented-out `//#define` pin blocks, kept as disabled peripherals
//!
//! Pin keys are grouped by prefix into peripherals:
//! - `TFT_*` → `display`
//! - `SDCARD_*` → `sdcard`
//! - `I2S_*` → `i2s`
//!
//! `TFT_WIDTH`, `TFT_HEIGHT` and `TFT_ROTATION` are display parameters, not
//! pins, and go to the board's display settings.
//!
//! A pin value of `-1` means "not connected". Symbolic values such as
//! `PIN_D8` cannot be resolved here and leave the role unassigned.

use boardcfg_core::config::{
    name, BoardDescriptor, DisplayParams, FeatureValue, Peripheral, PeripheralConfig,
    PeripheralKind, PinConfig,
};
use log::{debug, warn};

use crate::error::ParseError;

/// Key holding the human-readable board name
pub const BOARD_NAME_KEY: &str = "MICROPY_HW_BOARD_NAME";

/// Key holding the MCU name
pub const MCU_NAME_KEY: &str = "MICROPY_HW_MCU_NAME";

/// Header keys that map onto feature flags
pub const FEATURE_KEYS: &[(&str, &str)] = &[
    ("MICROPY_HW_ENABLE_SDCARD", "sdcard"),
    ("MICROPY_PY_MACHINE_I2S", "i2s"),
    ("MICROPY_PY_BLUETOOTH", "bluetooth"),
    ("MICROPY_PY_NETWORK_WLAN", "wifi"),
    ("MICROPY_HW_ENABLE_USBDEV", "usb"),
];

/// Key prefixes that declare peripheral pins
pub const PIN_PREFIXES: &[(&str, PeripheralKind)] = &[
    ("TFT_", PeripheralKind::Display),
    ("SDCARD_", PeripheralKind::SdCard),
    ("I2S_", PeripheralKind::I2s),
];

/// Display parameter keys
const DISPLAY_PARAM_KEYS: &[(&str, DisplayParam)] = &[
    ("TFT_WIDTH", DisplayParam::Width),
    ("TFT_HEIGHT", DisplayParam::Height),
    ("TFT_ROTATION", DisplayParam::Rotation),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DisplayParam {
    Width,
    Height,
    Rotation,
}

/// A parsed `#define` value
#[derive(Debug, Clone, PartialEq, Eq)]
enum DefineValue<'a> {
    Int(i32),
    Str(&'a str),
    /// Bare identifier or expression
    Symbol(&'a str),
}

/// Pins collected for one peripheral prefix
struct PinBlock {
    kind: PeripheralKind,
    active: Option<PeripheralConfig>,
    commented: Option<PeripheralConfig>,
}

impl PinBlock {
    fn slot(&mut self, commented: bool) -> Result<&mut PeripheralConfig, ParseError> {
        let kind = self.kind;
        let slot = if commented {
            &mut self.commented
        } else {
            &mut self.active
        };
        let config = match slot.take() {
            Some(config) => config,
            None => PeripheralConfig::new(kind.as_str(), kind)
                .map_err(ParseError::config(kind.as_str()))?,
        };
        Ok(slot.insert(config))
    }

    fn into_peripheral(self) -> Option<Peripheral> {
        match (self.active, self.commented) {
            (Some(active), _) => Some(Peripheral::Enabled(active)),
            (None, Some(commented)) => Some(Peripheral::Disabled(commented)),
            (None, None) => None,
        }
    }
}

/// Parse a board header into a descriptor
///
/// The identifier is not part of the header; callers pass it in, usually
/// the name of the board directory.
pub fn parse_board_header(identifier: &str, input: &str) -> Result<BoardDescriptor, ParseError> {
    let mut board =
        BoardDescriptor::new(identifier).map_err(ParseError::config("identifier"))?;
    let mut blocks: Vec<PinBlock> = Vec::new();
    let mut in_block_comment = false;

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let mut line = raw.trim();

        if in_block_comment {
            match line.split_once("*/") {
                Some((_, rest)) => {
                    in_block_comment = false;
                    line = rest.trim();
                }
                None => continue,
            }
        }

        let commented = line.starts_with("//");
        if commented {
            line = line.trim_start_matches('/').trim_start();
        } else {
            in_block_comment = strip_comment(line).1;
        }

        // Comment prose may mention `#define` without being one
        let define = match parse_define(line, line_no) {
            Err(ParseError::MalformedDefine { .. }) if commented => continue,
            define => define?,
        };
        let Some((key, value)) = define else {
            continue;
        };

        if let Some((_, param)) = DISPLAY_PARAM_KEYS.iter().find(|(k, _)| *k == key) {
            if commented {
                debug!("Ignoring commented display parameter {}", key);
            } else {
                let display = board.display.get_or_insert_with(DisplayParams::default);
                apply_display_param(display, *param, key, value)?;
            }
            continue;
        }

        if let Some((kind, role)) = pin_key(key) {
            let block = match blocks.iter().position(|b| b.kind == kind) {
                Some(idx) => &mut blocks[idx],
                None => {
                    blocks.push(PinBlock {
                        kind,
                        active: None,
                        commented: None,
                    });
                    let last = blocks.len() - 1;
                    &mut blocks[last]
                }
            };
            apply_pin(block.slot(commented)?, key, &role, value)?;
            continue;
        }

        // Only pin blocks carry meaning when commented out
        if commented {
            continue;
        }

        match key {
            BOARD_NAME_KEY => {
                let value = quoted(value).ok_or_else(|| ParseError::invalid(key, value))?;
                board
                    .set_board_name(value)
                    .map_err(ParseError::config(key))?;
            }
            MCU_NAME_KEY => {
                let value = quoted(value).ok_or_else(|| ParseError::invalid(key, value))?;
                board.set_mcu_name(value).map_err(ParseError::config(key))?;
            }
            _ => match FEATURE_KEYS.iter().find(|(k, _)| *k == key) {
                Some((_, feature)) => {
                    let value = feature_value(key, value)?;
                    board
                        .set_feature(feature, value)
                        .map_err(ParseError::config(key))?;
                }
                None => debug!("Ignoring unknown header key {}", key),
            },
        }
    }

    for block in blocks {
        if let Some(peripheral) = block.into_peripheral() {
            board
                .add_peripheral(peripheral)
                .map_err(ParseError::config("peripheral"))?;
        }
    }

    Ok(board)
}

/// Split `#define KEY VALUE` into key and value
///
/// Returns `None` for lines that are not defines.
fn parse_define(line: &str, line_no: usize) -> Result<Option<(&str, &str)>, ParseError> {
    let Some(rest) = line.strip_prefix("#define") else {
        return Ok(None);
    };
    if !rest.starts_with(char::is_whitespace) {
        return Err(ParseError::MalformedDefine { line: line_no });
    }

    let rest = strip_comment(rest).0.trim();
    let (key, value) = match rest.split_once(char::is_whitespace) {
        Some((key, value)) => (key, value.trim()),
        None => (rest, ""),
    };

    if key.is_empty() {
        return Err(ParseError::MalformedDefine { line: line_no });
    }

    Ok(Some((key, value)))
}

/// Code part of a line: the text before the first `//` or `/*` outside a
/// string
///
/// The flag is set when a `/*` on this line is not closed on it. Text after
/// a closed block comment is dropped along with the comment.
fn strip_comment(s: &str) -> (&str, bool) {
    let mut in_string = false;
    let bytes = s.as_bytes();
    for i in 0..bytes.len() {
        match bytes[i] {
            b'"' => in_string = !in_string,
            b'/' if !in_string => match bytes.get(i + 1) {
                Some(b'/') => return (&s[..i], false),
                Some(b'*') => return (&s[..i], !s[i + 2..].contains("*/")),
                _ => {}
            },
            _ => {}
        }
    }
    (s, false)
}

/// Contents of a double-quoted string
fn quoted(value: &str) -> Option<&str> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
}

/// Classify a define value
fn parse_value(value: &str) -> DefineValue<'_> {
    if let Some(s) = quoted(value) {
        return DefineValue::Str(s);
    }

    let mut inner = value.trim();
    while let Some(stripped) = inner.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        inner = stripped.trim();
    }

    match inner.parse::<i32>() {
        Ok(n) => DefineValue::Int(n),
        Err(_) => DefineValue::Symbol(value),
    }
}

/// Feature flag value: `0`/`1` become booleans, anything else is kept raw
fn feature_value(key: &str, value: &str) -> Result<FeatureValue, ParseError> {
    Ok(match parse_value(value) {
        DefineValue::Int(0) => FeatureValue::Bool(false),
        DefineValue::Int(1) => FeatureValue::Bool(true),
        DefineValue::Int(n) => FeatureValue::Int(n),
        DefineValue::Str(s) | DefineValue::Symbol(s) => {
            FeatureValue::Str(name(s).map_err(ParseError::config(key))?)
        }
    })
}

/// Map a pin key to its peripheral kind and role
fn pin_key(key: &str) -> Option<(PeripheralKind, String)> {
    PIN_PREFIXES.iter().find_map(|(prefix, kind)| {
        let suffix = key.strip_prefix(prefix)?;
        if suffix.is_empty() {
            return None;
        }
        Some((*kind, role_name(suffix)))
    })
}

/// Normalize a pin suffix to a schema role name
fn role_name(suffix: &str) -> String {
    let lower = suffix.to_ascii_lowercase();
    let role = match lower.as_str() {
        "sclk" | "clk" => "sck",
        "reset" => "rst",
        "backlight" | "blk" => "bl",
        "bclk" => "bck",
        "lrck" | "lrclk" => "ws",
        "dout" => "sdout",
        "din" => "sdin",
        other => other,
    };
    role.to_owned()
}

fn apply_display_param(
    display: &mut DisplayParams,
    param: DisplayParam,
    key: &str,
    value: &str,
) -> Result<(), ParseError> {
    let n = match parse_value(value) {
        DefineValue::Int(n) => n,
        DefineValue::Symbol(symbol) | DefineValue::Str(symbol) => {
            warn!("{}: cannot resolve {}, keeping default", key, symbol);
            return Ok(());
        }
    };

    let invalid = |_| ParseError::invalid(key, value);
    match param {
        DisplayParam::Width => display.width = u16::try_from(n).map_err(invalid)?,
        DisplayParam::Height => display.height = u16::try_from(n).map_err(invalid)?,
        DisplayParam::Rotation => display.rotation = u8::try_from(n).map_err(invalid)?,
    }
    Ok(())
}

fn apply_pin(
    config: &mut PeripheralConfig,
    key: &str,
    role: &str,
    value: &str,
) -> Result<(), ParseError> {
    match parse_value(value) {
        DefineValue::Int(-1) => config.clear_pin(role),
        DefineValue::Int(n) => {
            let pin = u8::try_from(n).map_err(|_| ParseError::invalid(key, value))?;
            config
                .set_pin(role, PinConfig::new(pin))
                .map_err(ParseError::config(key))?;
        }
        DefineValue::Symbol(symbol) | DefineValue::Str(symbol) => {
            warn!("{}: cannot resolve pin {}, leaving role unassigned", key, symbol);
            config.clear_pin(role);
        }
    }
    Ok(())
}
