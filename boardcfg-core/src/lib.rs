//! Board-agnostic descriptor registry for firmware builds
//!
//! This crate holds everything about per-board hardware facts that does
//! not depend on where those facts come from:
//!
//! - Descriptor types (board, peripherals, pins, display, MCU profile)
//! - Schema of recognized configuration keys
//! - Validation against the target MCU
//! - Init-then-freeze registry keyed by board identifier
//! - Built-in MCU profiles and board tables

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod boards;
pub mod config;
pub mod mcu;
pub mod registry;
pub mod schema;
pub mod validate;

pub use config::{BoardDescriptor, McuProfile, Peripheral, PeripheralConfig, PeripheralKind};
pub use registry::{Registry, RegistryError};
pub use schema::{describe_field, FieldKind, FieldSpec, SchemaError};
pub use validate::{validate, ValidationError, ValidationErrors, ValidationResult};
