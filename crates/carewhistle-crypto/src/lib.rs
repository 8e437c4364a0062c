/// CareWhistle Crypto Library
///
/// - Anonymous follow-up credentials (token + PIN) and company codes
/// - Argon2id password hashing for staff accounts
/// - AES-256-GCM sealing of the optional reporter contact, so a database
///   dump alone does not reveal who filed a report

pub mod encrypt;
pub mod keys;
pub mod passwords;
