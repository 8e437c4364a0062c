use aes_gcm::{
    Aes256Gcm, Key, Nonce,
    aead::{Aead, KeyInit, OsRng, rand_core::RngCore},
};
use anyhow::{Result, anyhow};

use crate::keys::ContactKey;

pub const NONCE_LEN: usize = 12;

/// Seal a reporter's contact details with AES-256-GCM.
/// Returns (ciphertext, nonce).
pub fn seal_contact(key: &ContactKey, plaintext: &str) -> Result<(Vec<u8>, Vec<u8>)> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| anyhow!("Contact encryption failed: {}", e))?;

    Ok((ciphertext, nonce_bytes.to_vec()))
}

/// Open contact details sealed by [`seal_contact`].
pub fn open_contact(key: &ContactKey, ciphertext: &[u8], nonce: &[u8]) -> Result<String> {
    if nonce.len() != NONCE_LEN {
        return Err(anyhow!("Invalid nonce length {}", nonce.len()));
    }
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()));

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| anyhow!("Contact decryption failed: {}", e))?;

    Ok(String::from_utf8(plaintext)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seal_open_roundtrip() {
        let key = ContactKey::generate();
        let contact = "call me on 0400 000 000";

        let (ciphertext, nonce) = seal_contact(&key, contact).unwrap();
        assert_ne!(ciphertext.as_slice(), contact.as_bytes());

        assert_eq!(open_contact(&key, &ciphertext, &nonce).unwrap(), contact);
    }

    #[test]
    fn wrong_key_fails() {
        let key1 = ContactKey::generate();
        let key2 = ContactKey::generate();

        let (ciphertext, nonce) = seal_contact(&key1, "someone@example.com").unwrap();
        assert!(open_contact(&key2, &ciphertext, &nonce).is_err());
    }

    #[test]
    fn short_nonce_is_rejected() {
        let key = ContactKey::generate();
        let (ciphertext, _) = seal_contact(&key, "x").unwrap();
        assert!(open_contact(&key, &ciphertext, &[0u8; 4]).is_err());
    }
}
