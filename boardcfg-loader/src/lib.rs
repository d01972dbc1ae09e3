//! Host-side board file loading
//!
//! Turns board definitions on disk into validated registries:
//!
//! - [`header`]: `mpconfigboard.h` style `#define` files
//! - [`toml`]: structured TOML board files
//! - [`bundle`]: postcard bundles for embedding in firmware
//!
//! Board directories follow the port layout: `<ID>/mpconfigboard.h`, plus
//! any number of `<ID>.toml` files next to them.

use std::fs;
use std::path::{Path, PathBuf};

use boardcfg_core::config::McuProfile;
use boardcfg_core::{mcu, BoardDescriptor, Registry, RegistryError};
use log::{debug, info, warn};

pub mod bundle;
mod error;
pub mod header;
pub mod toml;

pub use error::{LoadError, ParseError};

/// File name of a board header inside its board directory
pub const HEADER_FILE: &str = "mpconfigboard.h";

/// Load one board file, picking the parser by extension
///
/// Headers take their identifier from the containing directory; TOML files
/// fall back to their file stem when they carry no `identifier` key.
pub fn load_board_file(path: &Path) -> Result<BoardDescriptor, LoadError> {
    let parse_error = |source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    };

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("h") => {
            let input = read(path)?;
            let identifier = path
                .parent()
                .and_then(Path::file_name)
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            header::parse_board_header(identifier, &input).map_err(parse_error)
        }
        Some("toml") => {
            let input = read(path)?;
            let stem = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default();
            toml::parse_board_toml(&input, stem).map_err(parse_error)
        }
        _ => Err(LoadError::Unsupported(path.to_path_buf())),
    }
}

/// Load every board under a boards directory, in file name order
///
/// Picks up `<dir>/<ID>/mpconfigboard.h` and `<dir>/*.toml`. Other entries
/// are skipped. A file that fails to load does not stop the others; it is
/// returned with its error next to the loaded boards. Only failing to list
/// the directory itself is an error.
pub fn load_board_dir(dir: &Path) -> Result<(Vec<BoardDescriptor>, Vec<LoadError>), LoadError> {
    let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            let header = path.join(HEADER_FILE);
            if header.is_file() {
                paths.push(header);
            }
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut boards = Vec::new();
    let mut failed = Vec::new();
    for path in &paths {
        debug!("Loading {}", path.display());
        match load_board_file(path) {
            Ok(board) => boards.push(board),
            Err(e) => {
                warn!("{}", e);
                failed.push(e);
            }
        }
    }

    info!(
        "Loaded {} boards from {} ({} failed)",
        boards.len(),
        dir.display(),
        failed.len()
    );
    Ok((boards, failed))
}

/// Why a board was left out of a registry
#[derive(Debug, thiserror::Error)]
pub enum RejectReason {
    /// The board names an MCU without a built-in profile
    #[error("unknown MCU `{0}`")]
    UnknownMcu(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// A board that failed to register
#[derive(Debug, thiserror::Error)]
#[error("{identifier}: {reason}")]
pub struct Rejection {
    pub identifier: String,
    #[source]
    pub reason: RejectReason,
}

/// Profile used for boards that do not name their MCU
///
/// Accepts every pin number so the remaining checks still report.
fn unconstrained_profile() -> Option<McuProfile> {
    McuProfile::new("ANY", 0..=u8::MAX).ok()
}

/// Validate and register boards against their built-in MCU profiles
///
/// Registration continues past failures; every rejected board is returned
/// with its reason.
pub fn build_registry(
    boards: impl IntoIterator<Item = BoardDescriptor>,
) -> (Registry, Vec<Rejection>) {
    let mut registry = Registry::new();
    let mut rejected = Vec::new();

    for board in boards {
        let identifier = String::from(board.identifier.as_str());
        let profile = match board.mcu_name() {
            Some(mcu_name) => mcu::profile(mcu_name)
                .ok_or_else(|| RejectReason::UnknownMcu(mcu_name.into())),
            None => {
                warn!("{}: no MCU name, pins are not range-checked", identifier);
                unconstrained_profile().ok_or(RejectReason::UnknownMcu(String::new()))
            }
        };

        let result = profile.and_then(|mcu| {
            registry
                .register(board, &mcu)
                .map_err(RejectReason::Registry)
        });

        match result {
            Ok(()) => debug!("Registered {}", identifier),
            Err(reason) => {
                warn!("Rejected {}: {}", identifier, reason);
                rejected.push(Rejection { identifier, reason });
            }
        }
    }

    (registry, rejected)
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: PathBuf::from(path),
        source,
    })
}
