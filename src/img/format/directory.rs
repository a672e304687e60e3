//! Directory (block allocation table) parsing.
//!
//! The directory is a run of 512-byte records starting at 0x200. Unused
//! records with a zero flag may precede it. The first used record describes
//! the directory itself: its size field holds the offset where the
//! directory ends. Every following record maps (part of) one sub-file to
//! its blocks:
//!
//! ```text
//! 0x00  u8        flag
//! 0x01  [u8;8]    name (tile number or map name)
//! 0x09  [u8;3]    type code (TRE, RGN, LBL, NET, GMP, TYP, ...)
//! 0x0C  u32       sub-file size
//! 0x10  u16       part number (0 = first record of the sub-file)
//! 0x20  [u16;240] block numbers, 0xFFFF terminated
//! ```

use std::collections::BTreeMap;
use std::io::{self, ErrorKind};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, info, trace, warn};

use crate::img::source::ByteSource;
use crate::img::subfile::SubFile;
use crate::img::tile::TileFiles;
use crate::img::types::error::{ImgError, Result};
use crate::img::types::filetypes::SubFileType;
use crate::img::utils;

pub const DIRECTORY_OFFSET: u64 = 0x200;
pub const RECORD_SIZE: u64 = 512;

const SIZE_OFFSET: u64 = 0x0C;
const BLOCKS_OFFSET: u64 = 0x20;
const MAX_BLOCKS: usize = 240;
const BLOCK_SENTINEL: u16 = 0xFFFF;

/// One directory record, without its block list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntry {
    pub flag: u8,
    pub name: [u8; 8],
    pub code: [u8; 3],
    pub kind: SubFileType,
    pub size: u32,
    pub part: u16,
}

/// Everything the directory describes, grouped by owner.
#[derive(Debug, Default)]
pub struct Directory {
    /// Tile sub-files keyed by their 8-byte record name.
    pub tiles: BTreeMap<[u8; 8], TileFiles>,
    /// The container's styling sub-file and the record name it was taken from.
    pub style: Option<([u8; 8], SubFile)>,
    /// Number of sub-file records walked.
    pub records: usize,
}

/// Walks the directory and reassembles every sub-file's block chain.
pub fn parse(source: &mut ByteSource) -> Result<Directory> {
    info!("Parsing IMG directory");

    let (first_record, count) = locate(source)?;
    debug!("Directory: {} records from {:#x}", count, first_record);

    let mut directory = Directory {
        records: count,
        ..Directory::default()
    };

    for i in 0..count as u64 {
        let offset = first_record + i * RECORD_SIZE;
        let entry = read_entry(source, offset)?;
        trace!(
            "Record {}: name='{}', type={}, size={}, part={}",
            i,
            utils::entry_name(&entry.name),
            entry.kind,
            entry.size,
            entry.part
        );
        apply_entry(source, &mut directory, &entry, offset)?;
    }

    info!(
        "Directory parsed: {} records, {} tiles, style={}",
        count,
        directory.tiles.len(),
        directory.style.is_some()
    );
    Ok(directory)
}

/// Finds the first sub-file record and the number of records.
///
/// Skips zero-flag blocks, then reads the directory end offset from the
/// size field of the first used block, which itself is not a sub-file record.
pub fn locate(source: &mut ByteSource) -> Result<(u64, usize)> {
    let mut offset = DIRECTORY_OFFSET;
    loop {
        source.seek_to(offset)?;
        let flag = check(source.read_u8(), "directory flag")?;
        if flag != 0 {
            break;
        }
        offset += RECORD_SIZE;
    }
    if offset != DIRECTORY_OFFSET {
        debug!(
            "Skipped {} unused directory blocks",
            (offset - DIRECTORY_OFFSET) / RECORD_SIZE
        );
    }

    source.seek_to(offset + SIZE_OFFSET)?;
    let end = check(source.read_u32::<LittleEndian>(), "directory size")? as u64;
    offset += RECORD_SIZE;

    let count = end.saturating_sub(offset) / RECORD_SIZE;
    Ok((offset, count as usize))
}

fn read_entry(source: &mut ByteSource, offset: u64) -> Result<DirEntry> {
    source.seek_to(offset)?;
    let flag = check(source.read_u8(), "record flag")?;
    let name: [u8; 8] = source.read_fixed()?;
    let code: [u8; 3] = source.read_fixed()?;
    let size = check(source.read_u32::<LittleEndian>(), "record size")?;
    let part = check(source.read_u16::<LittleEndian>(), "record part")?;

    Ok(DirEntry {
        flag,
        name,
        code,
        kind: SubFileType::from_code(&code),
        size,
        part,
    })
}

fn apply_entry(
    source: &mut ByteSource,
    directory: &mut Directory,
    entry: &DirEntry,
    offset: u64,
) -> Result<()> {
    match entry.kind {
        kind if kind.is_tile_file() => {
            let file = if entry.part == 0 {
                let tile = directory.tiles.entry(entry.name).or_default();
                let file = tile.add_file(kind);
                file.set_size(entry.size);
                Some(file)
            } else {
                directory
                    .tiles
                    .get_mut(&entry.name)
                    .and_then(|tile| tile.file_mut(kind))
            };

            match file {
                Some(file) => read_blocks(source, offset, file)?,
                None => warn!(
                    "{}: {} part {} has no first part, record dropped",
                    utils::entry_name(&entry.name),
                    kind,
                    entry.part
                ),
            }
        }
        SubFileType::Typ => {
            // The first styling sub-file wins; records of other names are ignored.
            let style = directory.style.get_or_insert_with(|| {
                debug!("Style sub-file: '{}'", utils::entry_name(&entry.name));
                let mut typ = SubFile::new(SubFileType::Typ);
                typ.set_size(entry.size);
                (entry.name, typ)
            });
            if style.0 == entry.name {
                read_blocks(source, offset, &mut style.1)?;
            } else {
                debug!(
                    "Ignoring additional style sub-file '{}'",
                    utils::entry_name(&entry.name)
                );
            }
        }
        _ => {
            debug!(
                "Skipping record '{}' of unknown type {:?}",
                utils::entry_name(&entry.name),
                String::from_utf8_lossy(&entry.code)
            );
        }
    }
    Ok(())
}

fn read_blocks(source: &mut ByteSource, offset: u64, file: &mut SubFile) -> Result<()> {
    source.seek_to(offset + BLOCKS_OFFSET)?;
    for _ in 0..MAX_BLOCKS {
        let block = check(source.read_u16::<LittleEndian>(), "block list")?;
        if block == BLOCK_SENTINEL {
            break;
        }
        file.add_block(block);
    }
    Ok(())
}

fn check<T>(result: io::Result<T>, what: &str) -> Result<T> {
    result.map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => {
            ImgError::InvalidFormat(format!("Truncated directory while reading {}", what))
        }
        _ => ImgError::Io(e),
    })
}
