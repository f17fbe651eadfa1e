//! Cryptographic utilities for Dashgate Core

pub mod integrity;

pub use integrity::{IntegrityScheme, KeyError, SnapshotKey};
