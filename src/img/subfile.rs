//! Sub-files as block chains, and the stream that reads them back.
//!
//! A sub-file is stored as an ordered list of fixed-size blocks that need
//! not be contiguous in the container. [`SubFileStream`] presents such a
//! chain as one logical byte stream, starting at an optional base offset
//! so that the sections of a combined (GMP) sub-file can be read as if
//! they were sub-files of their own.

use std::cmp::min;
use std::io::{self, Read, Seek, SeekFrom};

use super::source::ByteSource;
use super::tile::TileFiles;
use super::types::error::{ImgError, Result};
use super::types::filetypes::SubFileType;

/// One logical sub-file: its kind, declared size and block chain.
#[derive(Debug, Clone)]
pub struct SubFile {
    kind: SubFileType,
    size: u32,
    blocks: Vec<u16>,
}

impl SubFile {
    pub fn new(kind: SubFileType) -> Self {
        Self {
            kind,
            size: 0,
            blocks: Vec::new(),
        }
    }

    pub fn kind(&self) -> SubFileType {
        self.kind
    }

    /// Size declared by the first directory record of this sub-file.
    pub fn size(&self) -> u32 {
        self.size
    }

    pub(crate) fn set_size(&mut self, size: u32) {
        self.size = size;
    }

    pub fn blocks(&self) -> &[u16] {
        &self.blocks
    }

    pub(crate) fn add_block(&mut self, block: u16) {
        self.blocks.push(block);
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Opens a stream over this sub-file, starting `base` bytes into the chain.
    pub fn stream<'a>(&'a self, source: &'a mut ByteSource, base: u64) -> SubFileStream<'a> {
        SubFileStream::new(source, &self.blocks, base)
    }

    /// Reads the chain from `base` to its end.
    ///
    /// A whole sub-file (`base == 0`) is cut to its declared size, since the
    /// last block is usually only partly used.
    pub fn read_to_end(&self, source: &mut ByteSource, base: u64) -> Result<Vec<u8>> {
        let mut stream = self.stream(source, base);
        let mut data = Vec::with_capacity(stream.len() as usize);
        stream.read_to_end(&mut data)?;
        if base == 0 && self.size > 0 && (self.size as usize) < data.len() {
            data.truncate(self.size as usize);
        }
        Ok(data)
    }
}

/// A `Read + Seek` view over a block chain.
///
/// Positions are relative to the stream's base offset. The most recently
/// read block is kept in memory, so sequential small reads cost one
/// container read per block.
pub struct SubFileStream<'a> {
    source: &'a mut ByteSource,
    blocks: &'a [u16],
    base: u64,
    pos: u64,
    block: Vec<u8>,
    loaded: Option<usize>,
}

impl<'a> SubFileStream<'a> {
    pub fn new(source: &'a mut ByteSource, blocks: &'a [u16], base: u64) -> Self {
        Self {
            source,
            blocks,
            base,
            pos: 0,
            block: Vec::new(),
            loaded: None,
        }
    }

    /// Number of bytes addressable through this stream.
    pub fn len(&self) -> u64 {
        (self.blocks.len() as u64 * self.source.block_size()).saturating_sub(self.base)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    fn load(&mut self, index: usize) -> io::Result<()> {
        if self.loaded == Some(index) {
            return Ok(());
        }
        let block = self.blocks[index];
        self.source
            .read_block(block as u32, &mut self.block)
            .map_err(into_io)?;
        self.loaded = Some(index);
        Ok(())
    }
}

impl Read for SubFileStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.len();
        if buf.is_empty() || self.pos >= len {
            return Ok(0);
        }

        let block_size = self.source.block_size();
        let absolute = self.base + self.pos;
        let index = (absolute / block_size) as usize;
        let offset = (absolute % block_size) as usize;
        self.load(index)?;

        let n = min(
            min(block_size as usize - offset, buf.len()),
            (len - self.pos) as usize,
        );
        buf[..n].copy_from_slice(&self.block[offset..offset + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for SubFileStream<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => Some(n),
            SeekFrom::Current(d) => self.pos.checked_add_signed(d),
            SeekFrom::End(d) => self.len().checked_add_signed(d),
        };
        match target {
            Some(n) => {
                self.pos = n;
                Ok(n)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}

fn into_io(e: ImgError) -> io::Error {
    match e {
        ImgError::Io(e) => e,
        other => io::Error::other(other),
    }
}

/// What a tile decoder gets to read: the tile's sub-files and the container.
pub struct TileSource<'a> {
    files: &'a TileFiles,
    source: &'a mut ByteSource,
}

impl<'a> TileSource<'a> {
    pub(crate) fn new(files: &'a TileFiles, source: &'a mut ByteSource) -> Self {
        Self { files, source }
    }

    pub fn files(&self) -> &TileFiles {
        self.files
    }

    /// Opens the sub-file of `kind`, stand-alone or inside the combined sub-file.
    pub fn stream(&mut self, kind: SubFileType) -> Option<SubFileStream<'_>> {
        let (file, base) = self.files.locate(kind)?;
        Some(file.stream(self.source, base))
    }
}
