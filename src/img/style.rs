//! The container's styling data.
//!
//! Interpreting TYP rules is left to the renderer; this module only decides
//! where the styling comes from and loads its bytes.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::source::ByteSource;
use super::subfile::SubFile;
use super::types::error::Result;

/// Where a [`Style`] was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleSource {
    /// The styling sub-file embedded in the container, by record name.
    Embedded(String),
    /// An external styling file.
    External(PathBuf),
    /// No styling data; renderers use their defaults.
    Builtin,
}

/// Raw styling data and its origin.
#[derive(Debug, Clone)]
pub struct Style {
    source: StyleSource,
    data: Vec<u8>,
}

impl Style {
    pub fn from_subfile(name: String, typ: &SubFile, source: &mut ByteSource) -> Result<Self> {
        let data = typ.read_to_end(source, 0)?;
        info!("Loaded embedded style '{}' ({} bytes)", name, data.len());
        Ok(Self {
            source: StyleSource::Embedded(name),
            data,
        })
    }

    /// Loads an external styling file. These are not obfuscated.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        info!("Loaded external style {} ({} bytes)", path.display(), data.len());
        Ok(Self {
            source: StyleSource::External(path.to_path_buf()),
            data,
        })
    }

    pub fn builtin() -> Self {
        debug!("Using built-in style");
        Self {
            source: StyleSource::Builtin,
            data: Vec::new(),
        }
    }

    pub fn source(&self) -> &StyleSource {
        &self.source
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_builtin(&self) -> bool {
        self.source == StyleSource::Builtin
    }
}
