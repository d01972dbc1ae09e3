//! Built-in MCU profiles
//!
//! GPIO ranges and pins that boards must not use (flash/PSRAM buses and
//! numbers that are not bonded out).

use core::ops::RangeInclusive;

use crate::config::McuProfile;

struct Builtin {
    name: &'static str,
    gpio: RangeInclusive<u8>,
    reserved: &'static [u8],
}

const BUILTIN: &[Builtin] = &[
    Builtin {
        name: "ESP32",
        gpio: 0..=39,
        // 6-11 SPI flash, 20/24/28-31 not bonded out
        reserved: &[6, 7, 8, 9, 10, 11, 20, 24, 28, 29, 30, 31],
    },
    Builtin {
        name: "ESP32C3",
        gpio: 0..=21,
        // SPI flash
        reserved: &[12, 13, 14, 15, 16, 17],
    },
    Builtin {
        name: "ESP32S3",
        gpio: 0..=48,
        // 22-25 not bonded out, 26-32 flash/PSRAM
        reserved: &[22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32],
    },
    Builtin {
        name: "RP2040",
        gpio: 0..=29,
        reserved: &[],
    },
];

fn normalized(s: &str) -> impl Iterator<Item = char> + '_ {
    s.chars()
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| c.to_ascii_uppercase())
}

/// Compare MCU names ignoring case and `-`/`_` separators
pub(crate) fn same_name(a: &str, b: &str) -> bool {
    normalized(a).eq(normalized(b))
}

/// Look up a built-in profile by MCU name ("ESP32C3", "esp32-c3", ...)
pub fn profile(name: &str) -> Option<McuProfile> {
    let builtin = BUILTIN.iter().find(|b| same_name(b.name, name))?;

    McuProfile::new(builtin.name, builtin.gpio.clone())
        .and_then(|p| p.with_reserved(builtin.reserved.iter().copied()))
        .ok()
}

/// Names of all built-in profiles
pub fn names() -> impl Iterator<Item = &'static str> {
    BUILTIN.iter().map(|b| b.name)
}
