use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore as _;
use anyhow::Result;
use base64::{
    Engine as _,
    engine::general_purpose::{STANDARD as BASE64, URL_SAFE_NO_PAD},
};
use rand::{Rng, RngCore};

/// Random bytes behind an anonymous token (192 bits, 32 URL-safe chars).
const TOKEN_BYTES: usize = 24;

pub const PIN_DIGITS: usize = 6;

pub const COMPANY_CODE_LEN: usize = 8;

const COMPANY_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate the URL-safe token a reporter uses to find their report again.
pub fn generate_anon_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a zero-padded 6-digit PIN.
pub fn generate_pin() -> String {
    let n: u32 = rand::rng().random_range(0..1_000_000);
    format!("{:0width$}", n, width = PIN_DIGITS)
}

/// Generate an upper-case alphanumeric company code.
pub fn generate_company_code() -> String {
    let mut rng = rand::rng();
    (0..COMPANY_CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..COMPANY_CODE_ALPHABET.len());
            COMPANY_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// 256-bit key used to seal reporter contact details.
#[derive(Clone)]
pub struct ContactKey([u8; 32]);

impl ContactKey {
    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        Self(key)
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Decode a base64 key, e.g. from configuration.
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = BASE64.decode(encoded.trim())?;
        let key: [u8; 32] = bytes
            .try_into()
            .map_err(|_| anyhow::anyhow!("Invalid contact key length, expected 32 bytes"))?;
        Ok(Self(key))
    }

    pub(crate) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Debug for ContactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ContactKey(..)")
    }
}
