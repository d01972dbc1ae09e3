//! Descriptor schema
//!
//! Declares every recognized configuration key together with its value type
//! and whether it is required. The validator and the board-file loaders both
//! read from these tables.
//!
//! Keys are flat strings:
//! - `identifier`, `board_name`, `mcu_name`
//! - feature flags such as `sdcard`, `i2s`
//! - `<kind>.<role>` for peripheral pins, e.g. `display.cs`
//! - `display.<param>` for display driver parameters, e.g. `display.width`

use crate::config::PeripheralKind;

/// Value type of a configuration key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FieldKind {
    String,
    Bool,
    /// Reference to a GPIO number
    PinRef,
    Integer,
}

/// Constraints of one configuration key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FieldSpec {
    /// Key must be present and non-empty
    pub required: bool,
    /// Expected value type
    pub kind: FieldKind,
}

impl FieldSpec {
    const fn required(kind: FieldKind) -> Self {
        Self {
            required: true,
            kind,
        }
    }

    const fn optional(kind: FieldKind) -> Self {
        Self {
            required: false,
            kind,
        }
    }
}

/// Schema lookup errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchemaError {
    /// Key is not part of the schema
    #[error("unknown field")]
    UnknownField,
}

/// Required top-level descriptor fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Field {
    Identifier,
    BoardName,
    McuName,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Identifier, Field::BoardName, Field::McuName];

    /// Schema key
    pub const fn as_str(self) -> &'static str {
        match self {
            Field::Identifier => "identifier",
            Field::BoardName => "board_name",
            Field::McuName => "mcu_name",
        }
    }
}

impl core::fmt::Display for Field {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognized feature flags
pub const FEATURES: &[&str] = &["sdcard", "i2s", "bluetooth", "wifi", "usb"];

/// Display driver parameters, keyed under `display.`
pub const DISPLAY_PARAMS: &[(&str, FieldKind)] = &[
    ("controller", FieldKind::String),
    ("width", FieldKind::Integer),
    ("height", FieldKind::Integer),
    ("rotation", FieldKind::Integer),
    ("spi_hz", FieldKind::Integer),
];

/// A pin role of a peripheral kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSpec {
    pub name: &'static str,
    pub required: bool,
}

const fn req(name: &'static str) -> RoleSpec {
    RoleSpec {
        name,
        required: true,
    }
}

const fn opt(name: &'static str) -> RoleSpec {
    RoleSpec {
        name,
        required: false,
    }
}

const DISPLAY_ROLES: &[RoleSpec] = &[
    req("sck"),
    req("mosi"),
    req("cs"),
    req("dc"),
    opt("rst"),
    opt("bl"),
    opt("miso"),
];
const SDCARD_ROLES: &[RoleSpec] = &[req("sck"), req("mosi"), req("miso"), req("cs")];
const I2S_ROLES: &[RoleSpec] = &[req("bck"), req("ws"), req("sdout"), opt("sdin"), opt("mck")];
const SINGLE_PIN_ROLES: &[RoleSpec] = &[req("pin")];
const UART_ROLES: &[RoleSpec] = &[req("tx"), req("rx")];
const I2C_ROLES: &[RoleSpec] = &[req("sda"), req("scl")];

impl PeripheralKind {
    /// Pin roles this kind understands
    pub const fn roles(self) -> &'static [RoleSpec] {
        match self {
            PeripheralKind::Display => DISPLAY_ROLES,
            PeripheralKind::SdCard => SDCARD_ROLES,
            PeripheralKind::I2s => I2S_ROLES,
            PeripheralKind::Led | PeripheralKind::Button => SINGLE_PIN_ROLES,
            PeripheralKind::Uart => UART_ROLES,
            PeripheralKind::I2c => I2C_ROLES,
        }
    }

    /// Look up a role by name
    pub fn role(self, name: &str) -> Option<&'static RoleSpec> {
        self.roles().iter().find(|r| r.name == name)
    }

    /// Roles that must be wired when the peripheral is enabled
    pub fn required_roles(self) -> impl Iterator<Item = &'static str> {
        self.roles().iter().filter(|r| r.required).map(|r| r.name)
    }
}

/// Check if a name is a recognized feature flag
pub fn is_feature(name: &str) -> bool {
    FEATURES.contains(&name)
}

/// Describe a configuration key
pub fn describe_field(name: &str) -> Result<FieldSpec, SchemaError> {
    if Field::ALL.iter().any(|f| f.as_str() == name) {
        return Ok(FieldSpec::required(FieldKind::String));
    }

    if is_feature(name) {
        return Ok(FieldSpec::optional(FieldKind::Bool));
    }

    let (prefix, key) = name.split_once('.').ok_or(SchemaError::UnknownField)?;

    if prefix == PeripheralKind::Display.as_str() {
        if let Some((_, kind)) = DISPLAY_PARAMS.iter().find(|(param, _)| *param == key) {
            return Ok(FieldSpec::optional(*kind));
        }
    }

    let kind: PeripheralKind = prefix.parse().map_err(|_| SchemaError::UnknownField)?;
    let role = kind.role(key).ok_or(SchemaError::UnknownField)?;

    Ok(FieldSpec {
        required: role.required,
        kind: FieldKind::PinRef,
    })
}
