//! Pseudonymous voter authentication.
//!
//! The start voting key never leaves the client. The server only sees the
//! credential id derived from it and, per request, a challenge bound to the
//! extended factor, the protocol step, a fresh nonce and the current time step.

use crate::*;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use num_bigint::{BigUint, RandBigInt};
use rand_core::{CryptoRng, RngCore};

/// Width of the time buckets challenges are bound to, in seconds
pub const AUTHENTICATION_TIME_STEP: u64 = 300;

const SALT_LENGTH: usize = 16;
const CREDENTIAL_ID_LENGTH: usize = 16;
const NONCE_BIT_LENGTH: u64 = 256;

/// Protocol step an authentication challenge is issued for
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AuthenticationStep {
    AuthenticateVoter,
    SendVote,
    ConfirmVote,
}

impl AuthenticationStep {
    pub fn as_str(self) -> &'static str {
        match self {
            AuthenticationStep::AuthenticateVoter => "authenticateVoter",
            AuthenticationStep::SendVote => "sendVote",
            AuthenticationStep::ConfirmVote => "confirmVote",
        }
    }
}

impl std::fmt::Display for AuthenticationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the server needs to check that the request comes from the card holder
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationChallenge {
    pub derived_voter_identifier: String,
    pub derived_authentication_challenge: String,

    /// 256-bit nonce in decimal
    pub authentication_nonce: String,
}

fn salt(values: Vec<Hashable>) -> Vec<u8> {
    truncate(&recursive_hash_of(values), SALT_LENGTH)
}

/// Upper-case hexadecimal credential id of the voting card behind `start_voting_key`
pub fn derive_credential_id(
    profile: Argon2Profile,
    election_event_id: &str,
    start_voting_key: &str,
) -> Result<String, Error> {
    validate_identifier(election_event_id, "election event id")?;
    validate_start_voting_key(start_voting_key)?;

    let salt = salt(vec![election_event_id.into(), "credentialId".into()]);
    let derived = argon2id(profile, start_voting_key.as_bytes(), &salt)?;

    Ok(hex::encode_upper(truncate(&derived, CREDENTIAL_ID_LENGTH)))
}

/// The time-independent part of every authentication challenge
pub fn derive_base_authentication_challenge(
    profile: Argon2Profile,
    election_event_id: &str,
    identification: Identification,
    start_voting_key: &str,
    extended_factor: &str,
) -> Result<String, Error> {
    validate_identifier(election_event_id, "election event id")?;
    validate_start_voting_key(start_voting_key)?;
    validate_extended_factor(extended_factor, identification)?;

    let salt = salt(vec![election_event_id.into(), "hAuth".into()]);
    let input = format!("{}Auth{}", extended_factor, start_voting_key);
    let derived = argon2id(profile, input.as_bytes(), &salt)?;

    Ok(BASE64.encode(derived))
}

/// Time step a unix timestamp falls into
pub fn time_step(unix_seconds: u64) -> u64 {
    unix_seconds / AUTHENTICATION_TIME_STEP
}

/// Derive a fresh challenge for `step`
///
/// A new nonce is drawn on every call, so two challenges are never equal even
/// within the same time step.
#[allow(clippy::too_many_arguments)]
pub fn get_authentication_challenge<R: RngCore + CryptoRng>(
    profile: Argon2Profile,
    step: AuthenticationStep,
    election_event_id: &str,
    start_voting_key: &str,
    extended_factor: &str,
    identification: Identification,
    unix_seconds: u64,
    rng: &mut R,
) -> Result<AuthenticationChallenge, Error> {
    let credential_id = derive_credential_id(profile, election_event_id, start_voting_key)?;
    let base_challenge = derive_base_authentication_challenge(
        profile,
        election_event_id,
        identification,
        start_voting_key,
        extended_factor,
    )?;

    let nonce: BigUint = rng.gen_biguint(NONCE_BIT_LENGTH);
    let challenge = derive_authentication_challenge(
        profile,
        step,
        election_event_id,
        &credential_id,
        &base_challenge,
        &nonce,
        time_step(unix_seconds),
    )?;

    Ok(AuthenticationChallenge {
        derived_voter_identifier: credential_id,
        derived_authentication_challenge: challenge,
        authentication_nonce: nonce.to_str_radix(10),
    })
}

/// The step-, nonce- and time-bound part of a challenge
///
/// This is also what the voting server recomputes for the neighbouring time steps.
pub fn derive_authentication_challenge(
    profile: Argon2Profile,
    step: AuthenticationStep,
    election_event_id: &str,
    credential_id: &str,
    base_challenge: &str,
    nonce: &BigUint,
    time_step: u64,
) -> Result<String, Error> {
    let salt = salt(vec![
        election_event_id.into(),
        credential_id.into(),
        "dAuth".into(),
        step.as_str().into(),
        nonce.into(),
    ]);
    let input = format!("{}Auth{}", base_challenge, time_step);
    let derived = argon2id(profile, input.as_bytes(), &salt)?;

    Ok(BASE64.encode(derived))
}
