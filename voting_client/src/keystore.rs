//! Recovery of the verification card secret key from its keystore.
//!
//! The keystore is `base64(ciphertext || nonce || salt)`. The symmetric key is
//! derived from the start voting key, so the secret key only ever exists in the
//! voter's session.

use crate::*;
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hkdf::Hkdf;
use num_bigint::BigUint;
use sha2::Sha256;

pub const SYMMETRIC_NONCE_LENGTH: usize = 12;
pub const KEYSTORE_SALT_LENGTH: usize = 16;
pub const KEYSTORE_MIN_LENGTH: usize = 56;
pub const KEYSTORE_MAX_LENGTH: usize = 600;

const KEYSTORE_KEY_INFO: &[u8] = b"VerificationCardKeystore";

type AesKey = [u8; 32];

fn keystore_key(
    profile: Argon2Profile,
    start_voting_key: &str,
    salt: &[u8],
) -> Result<AesKey, Error> {
    let master = argon2id(profile, start_voting_key.as_bytes(), salt)?;

    let h = Hkdf::<Sha256>::new(None, &master);
    let mut out = [0u8; 32];
    h.expand(KEYSTORE_KEY_INFO, &mut out)
        .map_err(|e| Error::Kdf(e.to_string()))?;
    Ok(out)
}

/// Decrypt the verification card keystore and return `k_id`
///
/// Any failure here means the session cannot vote: the keystore or the start
/// voting key is wrong, and neither can be fixed by retrying.
pub fn get_key(
    group: &GqGroup,
    profile: Argon2Profile,
    start_voting_key: &str,
    keystore: &str,
) -> Result<BigUint, Error> {
    validate_start_voting_key(start_voting_key)?;

    let bytes = BASE64.decode(keystore)?;
    if bytes.len() < KEYSTORE_MIN_LENGTH || bytes.len() > KEYSTORE_MAX_LENGTH {
        return Err(Error::invalid(format!(
            "verification card keystore must be between {} and {} bytes, found {}",
            KEYSTORE_MIN_LENGTH,
            KEYSTORE_MAX_LENGTH,
            bytes.len()
        )));
    }

    let salt_start = bytes.len() - KEYSTORE_SALT_LENGTH;
    let nonce_start = salt_start - SYMMETRIC_NONCE_LENGTH;
    let ciphertext = &bytes[..nonce_start];
    let nonce = &bytes[nonce_start..salt_start];
    let salt = &bytes[salt_start..];

    let key = keystore_key(profile, start_voting_key, salt)?;
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| Error::KeystoreDecryption)?;

    let k_id = BigUint::from_bytes_be(&plaintext);
    if !group.is_exponent(&k_id) {
        return Err(Error::invalid(
            "verification card secret key is not an element of Zq",
        ));
    }

    Ok(k_id)
}

/// Build a keystore the way the election setup does (reference server and tests)
#[cfg(test)]
pub(crate) fn seal_keystore(
    profile: Argon2Profile,
    start_voting_key: &str,
    k_id: &BigUint,
) -> String {
    use rand::RngCore;

    let mut rng = rand::thread_rng();
    let mut salt = [0u8; KEYSTORE_SALT_LENGTH];
    let mut nonce = [0u8; SYMMETRIC_NONCE_LENGTH];
    rng.fill_bytes(&mut salt);
    rng.fill_bytes(&mut nonce);

    let key = keystore_key(profile, start_voting_key, &salt).unwrap();
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    let mut bytes = cipher
        .encrypt(Nonce::from_slice(&nonce), &k_id.to_bytes_be()[..])
        .unwrap();
    bytes.extend_from_slice(&nonce);
    bytes.extend_from_slice(&salt);

    BASE64.encode(bytes)
}
