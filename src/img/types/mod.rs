//! Foundational data structures, error types, and sub-file type definitions.

pub mod error;
pub mod filetypes;
pub mod models;
