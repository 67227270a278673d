//! AES-128-CBC with zero padding.
//!
//! Padding is never removed on decryption: trailing zero bytes of the
//! plaintext and padding bytes cannot be told apart, so callers get the full
//! block-aligned output and must tolerate trailing NULs.

use crate::{Error, Result};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
use log::trace;

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;

pub const BLOCK_SIZE: usize = 16;

/// Key used to unwrap the per-container IV returned by the key service.
pub const WRAPPER_KEY: [u8; 16] = *b"cb99b5cbc24db398";

/// IV used to unwrap the per-container IV returned by the key service.
pub const WRAPPER_IV: [u8; 16] = *b"9bc24cb995cb8db3";

pub fn decrypt(data: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(Error::decryption(format!(
            "input of {} bytes is not a multiple of the {} byte block size",
            data.len(),
            BLOCK_SIZE
        )));
    }

    trace!("decrypting {} bytes", data.len());
    let mut data = data.to_vec();
    let len = Aes128CbcDec::new_from_slices(key, iv)
        .map_err(|_| invalid_key_material(key, iv))?
        .decrypt_padded_mut::<NoPadding>(&mut data)
        .map_err(|_| Error::decryption("cannot decrypt unaligned input"))?
        .len();
    data.truncate(len);
    Ok(data)
}

pub fn encrypt(data: &[u8], key: &[u8], iv: &[u8]) -> Result<Vec<u8>> {
    let mut data = data.to_vec();
    let tail = data.len() % BLOCK_SIZE;

    if tail != 0 {
        data.resize(data.len() + BLOCK_SIZE - tail, 0);
    }

    trace!("encrypting {} bytes", data.len());
    let msg_len = data.len();
    let len = Aes128CbcEnc::new_from_slices(key, iv)
        .map_err(|_| invalid_key_material(key, iv))?
        .encrypt_padded_mut::<NoPadding>(&mut data, msg_len)
        .map_err(|_| Error::decryption("cannot encrypt unaligned input"))?
        .len();
    data.truncate(len);
    Ok(data)
}

/// Recovers the real IV from the key service response bytes.
pub fn unwrap_key(wrapped: &[u8]) -> Result<Vec<u8>> {
    decrypt(wrapped, &WRAPPER_KEY, &WRAPPER_IV)
}

/// Inverse of [`unwrap_key`], what the key service does when a key is
/// registered.
pub fn wrap_key(key: &[u8]) -> Result<Vec<u8>> {
    encrypt(key, &WRAPPER_KEY, &WRAPPER_IV)
}

fn invalid_key_material(key: &[u8], iv: &[u8]) -> Error {
    Error::decryption(format!(
        "expected 16 byte key and iv for AES-128, got {} and {} bytes",
        key.len(),
        iv.len()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8; 16] = b"0123456789abcdef";

    #[test]
    fn test_encrypt_zero_pads() {
        let encrypted = encrypt(b"hello", KEY, KEY).unwrap();
        assert_eq!(encrypted.len(), 16);

        let decrypted = decrypt(&encrypted, KEY, KEY).unwrap();
        assert_eq!(&decrypted[..5], b"hello");
        assert_eq!(&decrypted[5..], &[0u8; 11]);
    }

    #[test]
    fn test_aligned_input_gets_no_extra_block() {
        let encrypted = encrypt(&[7u8; 32], KEY, KEY).unwrap();
        assert_eq!(encrypted.len(), 32);
        assert_eq!(decrypt(&encrypted, KEY, KEY).unwrap(), vec![7u8; 32]);
    }

    #[test]
    fn test_empty_input() {
        assert!(encrypt(&[], KEY, KEY).unwrap().is_empty());
        assert!(decrypt(&[], KEY, KEY).unwrap().is_empty());
    }

    #[test]
    fn test_decrypt_unaligned() {
        let result = decrypt(&[0u8; 17], KEY, KEY);
        assert!(matches!(result, Err(Error::Decryption(_))));
    }

    #[test]
    fn test_invalid_key_size() {
        let result = decrypt(&[0u8; 16], &KEY[..8], KEY);
        assert!(matches!(result, Err(Error::Decryption(_))));
        assert!(encrypt(b"x", KEY, &KEY[..15]).is_err());
    }

    #[test]
    fn test_wrap_unwrap_key() {
        let wrapped = wrap_key(b"00112233aabbccdd").unwrap();
        assert_ne!(wrapped.as_slice(), b"00112233aabbccdd");
        assert_eq!(unwrap_key(&wrapped).unwrap(), b"00112233aabbccdd");
    }
}
