//! File format parsing layer for IMG containers.
//!
//! This module provides the mid-level parsing layer that bridges between
//! raw container I/O and the high-level [`ImgReader`](crate::img::reader::ImgReader).
//!
//! # Module Organization
//!
//! - [`header`]: Parses the container header (key, signatures, name, block size)
//! - [`directory`]: Walks the directory and rebuilds each sub-file's block chain
//! - [`gmp`]: Reads the section table of combined sub-files
//! - [`tre`]: Reads the topology header; provides the bounds-only tile format
//!
//! # Architecture
//!
//! ```text
//! Container Structure:
//! ┌─────────────────┐
//! │  Header         │ ← header::parse()
//! ├─────────────────┤ 0x200
//! │  Directory      │ ← directory::parse()
//! │  (512-byte      │
//! │   records)      │
//! ├─────────────────┤
//! │  Data Blocks    │ ← SubFileStream (gmp, tre, tile decoders)
//! │  (block-size    │
//! │   units)        │
//! └─────────────────┘
//! ```

pub mod directory;
pub mod gmp;
pub mod header;
pub mod tre;
