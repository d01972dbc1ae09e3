//! Board registry
//!
//! Owns every validated [`BoardDescriptor`], keyed by identifier. The
//! registry is filled once during initialization and then frozen into a
//! `'static` shared reference; no removal or mutation exists after that, so
//! any reference handed out by [`Registry::lookup`] stays valid for the rest
//! of the program.

use heapless::Vec;
use static_cell::StaticCell;

use crate::config::{BoardDescriptor, Label, McuProfile, MAX_BOARDS};
use crate::validate::{validate, ValidationErrors};

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// A board with this identifier is already registered
    #[error("board `{0}` is already registered")]
    DuplicateIdentifier(Label),
    /// The descriptor did not pass validation
    #[error("board failed validation: {0}")]
    ValidationFailed(ValidationErrors),
    /// No board with the requested identifier
    #[error("board not found")]
    NotFound,
    /// Registry is at capacity
    #[error("registry is full")]
    Full,
    /// The cell already holds a frozen registry
    #[error("registry already frozen")]
    AlreadyFrozen,
}

/// Table of validated board descriptors
#[derive(Debug, Clone, Default)]
pub struct Registry {
    boards: Vec<BoardDescriptor, MAX_BOARDS>,
}

impl Registry {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self { boards: Vec::new() }
    }

    /// Validate a descriptor and add it
    ///
    /// On any error the registry is left untouched.
    pub fn register(
        &mut self,
        board: BoardDescriptor,
        mcu: &McuProfile,
    ) -> Result<(), RegistryError> {
        if let Err(errors) = validate(&board, mcu) {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Board {} rejected with {} errors",
                board.identifier.as_str(),
                errors.len()
            );
            return Err(RegistryError::ValidationFailed(errors));
        }

        if self.contains(&board.identifier) {
            return Err(RegistryError::DuplicateIdentifier(board.identifier));
        }

        self.boards.push(board).map_err(|_| RegistryError::Full)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Registered board {}",
            self.boards[self.boards.len() - 1].identifier.as_str()
        );

        Ok(())
    }

    /// Find a board by identifier
    pub fn lookup(&self, identifier: &str) -> Result<&BoardDescriptor, RegistryError> {
        self.boards
            .iter()
            .find(|b| b.identifier.as_str() == identifier)
            .ok_or(RegistryError::NotFound)
    }

    /// Check if a board is registered
    pub fn contains(&self, identifier: &str) -> bool {
        self.lookup(identifier).is_ok()
    }

    /// Identifiers in insertion order
    pub fn identifiers(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.boards.iter().map(|b| b.identifier.as_str())
    }

    /// Boards in insertion order
    pub fn iter(&self) -> core::slice::Iter<'_, BoardDescriptor> {
        self.boards.iter()
    }

    /// Number of registered boards
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    /// Check if no board is registered
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    /// Move the registry into a static cell and share it read-only
    ///
    /// The returned reference is `Copy` and can be handed to any task or
    /// thread. If the cell is already occupied the registry is dropped and
    /// `AlreadyFrozen` is returned.
    pub fn freeze(
        self,
        cell: &'static StaticCell<Registry>,
    ) -> Result<&'static Registry, RegistryError> {
        let frozen = cell.try_init(self).ok_or(RegistryError::AlreadyFrozen)?;

        #[cfg(feature = "defmt")]
        defmt::info!("Board registry frozen with {} boards", frozen.len());

        Ok(frozen)
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a BoardDescriptor;
    type IntoIter = core::slice::Iter<'a, BoardDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
