//! IMG container header parsing.
//!
//! # Header Structure
//! ```text
//! 0x00  u8       XOR key for everything that follows (0 = none)
//! 0x10  [u8;6]   "DSKIMG"
//! 0x41  [u8;6]   "GARMIN"
//! 0x49  [u8;20]  description, first part
//! 0x61  u8       block size exponent 1
//! 0x62  u8       block size exponent 2
//! 0x65  [u8;31]  description, second part (last byte is a terminator)
//! ```
//!
//! Block size is `1 << (e1 + e2)`.

use std::io::ErrorKind;

use log::{debug, info};

use crate::img::source::ByteSource;
use crate::img::types::error::{ImgError, Result};
use crate::img::types::models::ImgHeader;
use crate::img::utils;

const KEY_OFFSET: u64 = 0x00;
const SIGNATURE_OFFSET: u64 = 0x10;
const IDENTIFIER_OFFSET: u64 = 0x41;
const DESCRIPTION1_OFFSET: u64 = 0x49;
const EXPONENTS_OFFSET: u64 = 0x61;
const DESCRIPTION2_OFFSET: u64 = 0x65;

const SIGNATURE: &[u8; 6] = b"DSKIMG";
const IDENTIFIER: &[u8; 6] = b"GARMIN";

/// Parses the container header, leaving the source configured with the XOR key.
pub fn parse(source: &mut ByteSource) -> Result<ImgHeader> {
    info!("Parsing IMG header");

    // Step 1: The key byte itself is stored in the clear
    source.seek_to(KEY_OFFSET)?;
    let mut key = [0u8; 1];
    if source.read_raw(&mut key)? != 1 {
        return Err(truncated("key byte"));
    }
    source.set_key(key[0]);
    debug!("XOR key: {:#04x}", key[0]);

    // Step 2: Verify the disk-image and vendor tags
    let signature: [u8; 6] = read_field(source, SIGNATURE_OFFSET, "signature")?;
    if &signature != SIGNATURE {
        return Err(ImgError::InvalidSignature {
            field: "signature",
            found: String::from_utf8_lossy(&signature).into_owned(),
        });
    }
    let identifier: [u8; 6] = read_field(source, IDENTIFIER_OFFSET, "identifier")?;
    if &identifier != IDENTIFIER {
        return Err(ImgError::InvalidSignature {
            field: "identifier",
            found: String::from_utf8_lossy(&identifier).into_owned(),
        });
    }

    // Step 3: Description fields and block size
    let d1: [u8; 20] = read_field(source, DESCRIPTION1_OFFSET, "description")?;
    let [e1, e2]: [u8; 2] = read_field(source, EXPONENTS_OFFSET, "block size exponents")?;
    let d2: [u8; 31] = read_field(source, DESCRIPTION2_OFFSET, "description")?;

    let exponent = e1 as u32 + e2 as u32;
    if exponent >= 32 {
        return Err(ImgError::InvalidFormat(format!(
            "Block size exponent {} + {} out of range",
            e1, e2
        )));
    }
    let block_size = 1u32 << exponent;

    let mut description = Vec::with_capacity(d1.len() + d2.len());
    description.extend_from_slice(&d1);
    description.extend_from_slice(&d2[..d2.len() - 1]);
    let name = utils::decode_latin1_trimmed(&description);

    info!("Header parsed: name='{}', block size={}", name, block_size);

    Ok(ImgHeader {
        key: key[0],
        block_size,
        name,
    })
}

fn read_field<const N: usize>(source: &mut ByteSource, offset: u64, field: &str) -> Result<[u8; N]> {
    source.seek_to(offset)?;
    source.read_fixed::<N>().map_err(|e| match e {
        ImgError::Io(io) if io.kind() == ErrorKind::UnexpectedEof => truncated(field),
        other => other,
    })
}

fn truncated(field: &str) -> ImgError {
    ImgError::InvalidFormat(format!("Truncated header while reading {}", field))
}
