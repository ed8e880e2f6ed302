//! chordbook-core - Core library for Chordbook
//!
//! This crate contains the chart and set-list models, the local libSQL store,
//! the remote adapters and the last-write-wins sync engine used by the
//! Chordbook CLI.

pub mod db;
pub mod device;
pub mod error;
pub mod models;
pub mod remote;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{Chart, SetList};
