//! Decrypting byte source over the raw container.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use log::trace;

use super::codec::crypto;
use super::types::error::{ImgError, Result};

/// Anything the container can be read from.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// The container byte stream with de-obfuscation applied on every read.
///
/// Reads through the [`Read`] impl return XOR-ed bytes once a key is set,
/// so fixed-width values can be pulled with `byteorder::ReadBytesExt`
/// directly. Only the key byte itself is read with [`read_raw`].
///
/// [`read_raw`]: ByteSource::read_raw
pub struct ByteSource {
    inner: Box<dyn ReadSeek>,
    key: u8,
    block_size: u64,
}

impl ByteSource {
    pub fn new<R: Read + Seek + 'static>(reader: R) -> Self {
        Self {
            inner: Box::new(reader),
            key: 0,
            block_size: 0,
        }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Ok(Self::new(BufReader::new(file)))
    }

    pub fn key(&self) -> u8 {
        self.key
    }

    pub fn set_key(&mut self, key: u8) {
        self.key = key;
    }

    pub fn block_size(&self) -> u64 {
        self.block_size
    }

    pub fn set_block_size(&mut self, block_size: u64) {
        self.block_size = block_size;
    }

    /// Reads without de-obfuscation. Used for the key byte only.
    pub fn read_raw(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }

    pub fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        Ok(())
    }

    /// Positions the stream at the start of block `n`.
    pub fn seek_block(&mut self, n: u32) -> Result<()> {
        if self.block_size == 0 {
            return Err(ImgError::InvalidFormat("Block size not set".to_string()));
        }
        self.seek_to(n as u64 * self.block_size)
    }

    /// Reads the whole of block `n` into `buf`. A short block is an error.
    pub fn read_block(&mut self, n: u32, buf: &mut Vec<u8>) -> Result<()> {
        trace!("Reading block {} ({} bytes)", n, self.block_size);
        self.seek_block(n)?;
        buf.resize(self.block_size as usize, 0);
        self.read_exact(buf)?;
        Ok(())
    }

    /// Reads exactly `N` de-obfuscated bytes.
    pub fn read_fixed<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}

impl Read for ByteSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        crypto::xor_decrypt(&mut buf[..n], self.key);
        Ok(n)
    }
}

impl Seek for ByteSource {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSource")
            .field("key", &self.key)
            .field("block_size", &self.block_size)
            .finish_non_exhaustive()
    }
}
