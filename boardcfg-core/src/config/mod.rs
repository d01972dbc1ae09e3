//! Configuration types
//!
//! Board-agnostic descriptor structures built from static tables or board
//! files and stored without allocation.

pub mod board;
pub mod hardware;
pub mod types;

pub use board::*;
pub use hardware::*;
pub use types::*;
