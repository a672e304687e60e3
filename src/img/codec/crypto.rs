//! De-obfuscation of IMG container bytes

use log::trace;

/// XORs every byte with the container key.
///
/// The whole container after the key byte is obfuscated with the same key,
/// so this is applied uniformly to header fields, directory records and
/// sub-file payloads. A key of zero leaves the data untouched.
pub fn xor_decrypt(data: &mut [u8], key: u8) {
    if key == 0 {
        return;
    }
    trace!("Decrypting {} bytes with XOR key {:#04x}", data.len(), key);
    for byte in data.iter_mut() {
        *byte ^= key;
    }
}
