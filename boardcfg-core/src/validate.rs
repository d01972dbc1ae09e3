//! Descriptor validation
//!
//! Checks one [`BoardDescriptor`] against the schema and the [`McuProfile`]
//! it targets. Every check runs to completion; the caller gets the whole
//! list of defects from a single pass.

use core::fmt::{self, Write};

use heapless::{String, Vec};

use crate::config::{
    BoardDescriptor, DisplayParams, Label, McuProfile, Name, PeripheralConfig, MAX_FEATURES,
    MAX_PERIPHERALS, MAX_PINS_PER_PERIPHERAL,
};
use crate::mcu;
use crate::schema::{self, Field};

/// Most required roles declared by any peripheral kind
pub const MAX_REQUIRED_ROLES: usize = 4;

/// Display parameters that can be individually rejected
const DISPLAY_PARAM_CHECKS: usize = 4;

/// Board-level checks besides required fields (MCU pairing)
const BOARD_CHECKS: usize = 1;

/// Upper bound on the number of errors one descriptor can produce
///
/// Each pin assignment yields at most one placement error (unknown role,
/// out of range or reserved) plus at most one conflict.
pub const MAX_ERRORS: usize = Field::ALL.len()
    + BOARD_CHECKS
    + MAX_FEATURES
    + MAX_PERIPHERALS * (2 * MAX_PINS_PER_PERIPHERAL + MAX_REQUIRED_ROLES)
    + DISPLAY_PARAM_CHECKS;

/// A single validation defect
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ValidationError {
    /// Required field absent or empty
    #[error("missing required field `{0}`")]
    MissingField(Field),
    /// Key not recognized by the schema
    #[error("unknown field `{0}`")]
    UnknownField(Name),
    /// Feature flag whose value is not a boolean
    #[error("feature `{0}` is not a boolean")]
    InvalidType(Label),
    /// Enabled peripheral without a pin for a required role
    #[error("peripheral `{0}` has no pin for role `{1}`")]
    MissingPin(Label, Label),
    /// Pin number outside the MCU's GPIO range
    #[error("pin {0} is out of range")]
    PinOutOfRange(u8),
    /// Pin reserved by the MCU
    #[error("pin {0} is reserved")]
    PinReserved(u8),
    /// Pin claimed twice among enabled peripherals
    #[error("pin {0} claimed by both `{1}` and `{2}`")]
    PinConflict(u8, Label, Label),
    /// Parameter value outside its allowed range
    #[error("invalid value for `{0}`")]
    InvalidParameter(Name),
}

/// Non-empty, ordered list of validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ValidationErrors {
    errors: Vec<ValidationError, MAX_ERRORS>,
}

impl ValidationErrors {
    /// Errors in the order they were found
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Iterate over the errors
    pub fn iter(&self) -> core::slice::Iter<'_, ValidationError> {
        self.errors.iter()
    }

    /// Number of errors (always at least one)
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if no error was recorded
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Check if a specific error was reported
    pub fn contains(&self, error: &ValidationError) -> bool {
        self.errors.contains(error)
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = core::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl core::error::Error for ValidationErrors {}

/// Outcome of validating one descriptor
pub type ValidationResult = Result<(), ValidationErrors>;

/// Copy as much of `s` as fits
fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Accumulates errors for one descriptor
struct Report {
    errors: Vec<ValidationError, MAX_ERRORS>,
}

impl Report {
    fn new() -> Self {
        Self { errors: Vec::new() }
    }

    fn record(&mut self, error: ValidationError) {
        // MAX_ERRORS bounds the worst case
        let pushed = self.errors.push(error);
        debug_assert!(pushed.is_ok());
    }

    fn finish(self) -> ValidationResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                errors: self.errors,
            })
        }
    }
}

/// Validate a descriptor against the MCU it targets
pub fn validate(board: &BoardDescriptor, mcu: &McuProfile) -> ValidationResult {
    let mut report = Report::new();

    check_required_fields(board, &mut report);
    check_mcu(board, mcu, &mut report);
    check_features(board, &mut report);
    check_pins(board, mcu, &mut report);
    if let Some(display) = &board.display {
        check_display(display, &mut report);
    }

    report.finish()
}

fn check_required_fields(board: &BoardDescriptor, report: &mut Report) {
    let present = |value: Option<&str>| value.is_some_and(|v| !v.trim().is_empty());

    if board.identifier.trim().is_empty() {
        report.record(ValidationError::MissingField(Field::Identifier));
    }
    if !present(board.board_name()) {
        report.record(ValidationError::MissingField(Field::BoardName));
    }
    if !present(board.mcu_name()) {
        report.record(ValidationError::MissingField(Field::McuName));
    }
}

/// The profile must be the one the board names
fn check_mcu(board: &BoardDescriptor, mcu: &McuProfile, report: &mut Report) {
    let Some(mcu_name) = board.mcu_name() else {
        return;
    };
    if !mcu_name.trim().is_empty() && !mcu::same_name(mcu_name, &mcu.identifier) {
        report.record(ValidationError::InvalidParameter(truncated(
            Field::McuName.as_str(),
        )));
    }
}

fn check_features(board: &BoardDescriptor, report: &mut Report) {
    for feature in &board.features {
        if !schema::is_feature(&feature.name) {
            report.record(ValidationError::UnknownField(truncated(&feature.name)));
        } else if feature.value.as_bool().is_none() {
            report.record(ValidationError::InvalidType(feature.name.clone()));
        }
    }
}

/// A pin claimed by an enabled peripheral
struct Claim<'a> {
    pin: u8,
    owner: &'a Label,
}

fn check_pins(board: &BoardDescriptor, mcu: &McuProfile, report: &mut Report) {
    let mut claims: Vec<Claim<'_>, { MAX_PERIPHERALS * MAX_PINS_PER_PERIPHERAL }> = Vec::new();

    for peripheral in board.enabled_peripherals() {
        let config = peripheral.config();
        check_required_roles(config, report);

        for assignment in &config.pins {
            if config.kind.role(&assignment.role).is_none() {
                let mut key: Name = Name::new();
                let _ = write!(key, "{}.{}", config.kind.as_str(), assignment.role);
                report.record(ValidationError::UnknownField(key));
                continue;
            }

            let pin = assignment.pin.pin;
            if !mcu.in_range(pin) {
                report.record(ValidationError::PinOutOfRange(pin));
            } else if mcu.is_reserved(pin) {
                report.record(ValidationError::PinReserved(pin));
            }

            match claims.iter().find(|c| c.pin == pin) {
                Some(first) => report.record(ValidationError::PinConflict(
                    pin,
                    first.owner.clone(),
                    config.name.clone(),
                )),
                None => {
                    // One slot per assignment of an enabled peripheral
                    let _ = claims.push(Claim {
                        pin,
                        owner: &config.name,
                    });
                }
            }
        }
    }
}

fn check_required_roles(config: &PeripheralConfig, report: &mut Report) {
    for role in config.kind.required_roles() {
        if config.pin(role).is_none() {
            report.record(ValidationError::MissingPin(
                config.name.clone(),
                truncated(role),
            ));
        }
    }
}

fn check_display(display: &DisplayParams, report: &mut Report) {
    let mut reject = |param: &str| {
        let mut key: Name = Name::new();
        let _ = write!(key, "display.{}", param);
        report.record(ValidationError::InvalidParameter(key));
    };

    if display.width == 0 {
        reject("width");
    }
    if display.height == 0 {
        reject("height");
    }
    if display.rotation > 3 {
        reject("rotation");
    }
    if display.spi_hz == 0 || display.spi_hz > display.controller.max_spi_hz() {
        reject("spi_hz");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        name, DisplayController, FeatureValue, Peripheral, PeripheralKind, PinConfig,
    };

    fn c3() -> McuProfile {
        McuProfile::new("ESP32C3", 0..=21).unwrap()
    }

    fn spotpear() -> BoardDescriptor {
        let mut board = BoardDescriptor::new("SPOTPEARC3").unwrap();
        board.set_board_name("Spotpear C3-1.44 MiniTV").unwrap();
        board.set_mcu_name("ESP32C3").unwrap();
        board.set_feature("sdcard", false).unwrap();
        board.set_feature("i2s", false).unwrap();
        board
    }

    fn display(enabled: bool) -> Peripheral {
        let config = PeripheralConfig::new("display", PeripheralKind::Display)
            .unwrap()
            .with_pin("sck", 3)
            .unwrap()
            .with_pin("mosi", 4)
            .unwrap()
            .with_pin("cs", 2)
            .unwrap()
            .with_pin("dc", 0)
            .unwrap()
            .with_pin("rst", 5)
            .unwrap();
        Peripheral::new(config, enabled)
    }

    fn led(name: &str, pin: u8) -> Peripheral {
        let config = PeripheralConfig::new(name, PeripheralKind::Led)
            .unwrap()
            .with_pin("pin", pin)
            .unwrap();
        Peripheral::Enabled(config)
    }

    fn errors(board: &BoardDescriptor, mcu: &McuProfile) -> ValidationErrors {
        validate(board, mcu).unwrap_err()
    }

    #[test]
    fn test_minimal_board_is_valid() {
        assert_eq!(validate(&spotpear(), &c3()), Ok(()));
    }

    #[test]
    fn test_enabled_display_is_valid() {
        let mut board = spotpear();
        board.add_peripheral(display(true)).unwrap();
        board.display = Some(DisplayParams::default());
        assert_eq!(validate(&board, &c3()), Ok(()));
    }

    #[test]
    fn test_missing_board_name() {
        let mut board = spotpear();
        board.board_name = None;

        let errs = errors(&board, &c3());
        let missing = errs
            .iter()
            .filter(|e| **e == ValidationError::MissingField(Field::BoardName))
            .count();
        assert_eq!(missing, 1);
    }

    #[test]
    fn test_blank_fields_count_as_missing() {
        let mut board = BoardDescriptor::new("").unwrap();
        board.set_board_name("   ").unwrap();

        let errs = errors(&board, &c3());
        assert_eq!(
            errs.as_slice(),
            &[
                ValidationError::MissingField(Field::Identifier),
                ValidationError::MissingField(Field::BoardName),
                ValidationError::MissingField(Field::McuName),
            ]
        );
    }

    #[test]
    fn test_mcu_profile_must_match_board() {
        let rp2040 = McuProfile::new("RP2040", 0..=29).unwrap();
        let errs = errors(&spotpear(), &rp2040);
        assert_eq!(
            errs.as_slice(),
            &[ValidationError::InvalidParameter(name("mcu_name").unwrap())]
        );

        let mut board = spotpear();
        board.set_mcu_name("esp32-c3").unwrap();
        assert_eq!(validate(&board, &c3()), Ok(()));
    }

    #[test]
    fn test_non_boolean_feature() {
        let mut board = spotpear();
        board
            .set_feature("sdcard", FeatureValue::Str(name("yes").unwrap()))
            .unwrap();
        board.set_feature("i2s", FeatureValue::Int(2)).unwrap();

        let errs = errors(&board, &c3());
        assert_eq!(
            errs.as_slice(),
            &[
                ValidationError::InvalidType(crate::config::label("sdcard").unwrap()),
                ValidationError::InvalidType(crate::config::label("i2s").unwrap()),
            ]
        );
    }

    #[test]
    fn test_unknown_feature() {
        let mut board = spotpear();
        board.set_feature("turbo", true).unwrap();

        let errs = errors(&board, &c3());
        assert!(errs.contains(&ValidationError::UnknownField(name("turbo").unwrap())));
    }

    #[test]
    fn test_missing_pin_for_required_role() {
        let mut board = spotpear();
        let config = PeripheralConfig::new("display", PeripheralKind::Display)
            .unwrap()
            .with_pin("sck", 3)
            .unwrap()
            .with_pin("mosi", 4)
            .unwrap();
        board.add_peripheral(Peripheral::Enabled(config)).unwrap();

        let errs = errors(&board, &c3());
        assert_eq!(errs.len(), 2);
        assert!(errs.contains(&ValidationError::MissingPin(
            crate::config::label("display").unwrap(),
            crate::config::label("cs").unwrap(),
        )));
        assert!(errs.contains(&ValidationError::MissingPin(
            crate::config::label("display").unwrap(),
            crate::config::label("dc").unwrap(),
        )));
    }

    #[test]
    fn test_unknown_role() {
        let mut board = spotpear();
        let config = PeripheralConfig::new("status", PeripheralKind::Led)
            .unwrap()
            .with_pin("pin", 11)
            .unwrap()
            .with_pin("blink", 12)
            .unwrap();
        board.add_peripheral(Peripheral::Enabled(config)).unwrap();

        let errs = errors(&board, &c3());
        assert_eq!(
            errs.as_slice(),
            &[ValidationError::UnknownField(name("led.blink").unwrap())]
        );
    }

    #[test]
    fn test_pin_out_of_range_and_reserved() {
        let mcu = c3().with_reserved(12..=17).unwrap();
        let mut board = spotpear();
        board.add_peripheral(led("led", 30)).unwrap();
        board.add_peripheral(led("flash", 12)).unwrap();

        let errs = errors(&board, &mcu);
        assert_eq!(
            errs.as_slice(),
            &[
                ValidationError::PinOutOfRange(30),
                ValidationError::PinReserved(12),
            ]
        );
    }

    #[test]
    fn test_pin_conflict_names_both_peripherals() {
        let mut board = spotpear();
        board.add_peripheral(display(true)).unwrap();
        board.add_peripheral(led("led", 2)).unwrap();

        let errs = errors(&board, &c3());
        assert_eq!(
            errs.as_slice(),
            &[ValidationError::PinConflict(
                2,
                crate::config::label("display").unwrap(),
                crate::config::label("led").unwrap(),
            )]
        );
    }

    #[test]
    fn test_pin_reused_within_one_peripheral() {
        let mut board = spotpear();
        let mut config = PeripheralConfig::new("uart0", PeripheralKind::Uart).unwrap();
        config.set_pin("tx", PinConfig::new(20)).unwrap();
        config.set_pin("rx", PinConfig::new(20)).unwrap();
        board.add_peripheral(Peripheral::Enabled(config)).unwrap();

        let errs = errors(&board, &c3());
        let uart = crate::config::label("uart0").unwrap();
        assert_eq!(
            errs.as_slice(),
            &[ValidationError::PinConflict(20, uart.clone(), uart)]
        );
    }

    #[test]
    fn test_disabled_peripherals_are_ignored() {
        let mut board = spotpear();
        board.add_peripheral(display(false)).unwrap();
        board.add_peripheral(led("led", 2)).unwrap();

        let empty = PeripheralConfig::new("sd", PeripheralKind::SdCard).unwrap();
        board.add_peripheral(Peripheral::Disabled(empty)).unwrap();

        let out_of_range = PeripheralConfig::new("spare", PeripheralKind::Led)
            .unwrap()
            .with_pin("pin", 99)
            .unwrap();
        board
            .add_peripheral(Peripheral::Disabled(out_of_range))
            .unwrap();

        assert_eq!(validate(&board, &c3()), Ok(()));
    }

    #[test]
    fn test_display_params() {
        let mut board = spotpear();
        board.display = Some(DisplayParams {
            controller: DisplayController::Sh1106,
            width: 0,
            height: 64,
            rotation: 4,
            spi_hz: 40_000_000,
        });

        let errs = errors(&board, &c3());
        assert_eq!(
            errs.as_slice(),
            &[
                ValidationError::InvalidParameter(name("display.width").unwrap()),
                ValidationError::InvalidParameter(name("display.rotation").unwrap()),
                ValidationError::InvalidParameter(name("display.spi_hz").unwrap()),
            ]
        );
    }

    #[test]
    fn test_errors_accumulate_without_short_circuit() {
        let mut board = BoardDescriptor::new("X").unwrap();
        board.set_feature("sdcard", FeatureValue::Int(1)).unwrap();
        board.add_peripheral(led("led", 40)).unwrap();
        board.add_peripheral(led("led2", 40)).unwrap();

        let errs = errors(&board, &c3());
        assert_eq!(errs.len(), 6);
        assert_eq!(errs.as_slice()[0], ValidationError::MissingField(Field::BoardName));
        assert_eq!(errs.as_slice()[5], ValidationError::PinConflict(
            40,
            crate::config::label("led").unwrap(),
            crate::config::label("led2").unwrap(),
        ));
    }

    #[test]
    fn test_required_role_bound() {
        for kind in PeripheralKind::ALL {
            assert!(kind.required_roles().count() <= MAX_REQUIRED_ROLES);
        }
    }

    #[test]
    fn test_error_display() {
        let mut board = spotpear();
        board.mcu_name = None;
        let errs = errors(&board, &c3());

        let mut text: String<64> = String::new();
        write!(text, "{}", errs).unwrap();
        assert_eq!(text.as_str(), "missing required field `mcu_name`");
    }
}
