//! Layout of the combined (GMP) sub-file.
//!
//! Newer maps pack the topology, geometry, label and network sections of a
//! tile into one GMP sub-file. Its header lists where each section starts:
//!
//! ```text
//! 0x19  u32  TRE section offset (0 = absent)
//! 0x1D  u32  RGN section offset
//! 0x21  u32  LBL section offset
//! 0x25  u32  NET section offset
//! ```

use std::io::{Read, Seek, SeekFrom};

use byteorder::{LittleEndian, ReadBytesExt};
use log::debug;

use crate::img::types::error::Result;
use crate::img::types::filetypes::SubFileType;

const SECTIONS_OFFSET: u64 = 0x19;

/// Section offsets of a combined sub-file, relative to its start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GmpLayout {
    pub tre: u32,
    pub rgn: u32,
    pub lbl: u32,
    pub net: u32,
}

impl GmpLayout {
    pub fn parse<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        reader.seek(SeekFrom::Start(SECTIONS_OFFSET))?;
        let layout = GmpLayout {
            tre: reader.read_u32::<LittleEndian>()?,
            rgn: reader.read_u32::<LittleEndian>()?,
            lbl: reader.read_u32::<LittleEndian>()?,
            net: reader.read_u32::<LittleEndian>()?,
        };
        debug!(
            "GMP sections: TRE={:#x}, RGN={:#x}, LBL={:#x}, NET={:#x}",
            layout.tre, layout.rgn, layout.lbl, layout.net
        );
        Ok(layout)
    }

    /// Start of the section of `kind`, if the combined sub-file carries one.
    pub fn offset(&self, kind: SubFileType) -> Option<u64> {
        let offset = match kind {
            SubFileType::Tre => self.tre,
            SubFileType::Rgn => self.rgn,
            SubFileType::Lbl => self.lbl,
            SubFileType::Net => self.net,
            _ => 0,
        };
        (offset != 0).then_some(offset as u64)
    }
}
