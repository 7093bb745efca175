//! # vmc-core
//!
//! Shared building blocks for the vmc crates: the error taxonomy, the
//! constants that pin down the identifier wire format, and small I/O helpers
//! for reading plain or gzip-compressed inputs.

pub mod consts;
pub mod errors;
pub mod utils;

pub use errors::{ErrorCategory, Result, VmcError};
