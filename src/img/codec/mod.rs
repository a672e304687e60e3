//! Codec layer for byte-level transforms.
//!
//! This module provides the pure data transforms applied to container
//! bytes before any structure is parsed from them.
//!
//! # Submodules
//!
//! - [`crypto`][]: Single-byte XOR de-obfuscation

pub mod crypto;
