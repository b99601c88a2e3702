//! Configuration module for Downedit
//!
//! This module handles user preferences (export, import, beautifier and
//! timer settings), including serialization to/from JSON and persistent
//! storage in platform-specific directories.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
