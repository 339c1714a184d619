//! Format checks guarding the preconditions of every cryptographic operation.

use crate::*;

pub const START_VOTING_KEY_LENGTH: usize = 24;
pub const START_VOTING_KEY_ALPHABET: &str = "abcdefghijkmnpqrstuvwxyz23456789";
pub const BALLOT_CASTING_KEY_LENGTH: usize = 9;
pub const IDENTIFIER_LENGTH: usize = 32;
pub const SHORT_CHOICE_RETURN_CODE_LENGTH: usize = 4;
pub const SHORT_VOTE_CAST_RETURN_CODE_LENGTH: usize = 8;

/// How the voter proves the extended authentication factor
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Identification {
    /// Year of birth, `YYYY`
    Yob,
    /// Date of birth, `DDMMYYYY`
    Dob,
}

impl Identification {
    pub fn extended_factor_length(self) -> usize {
        match self {
            Identification::Yob => 4,
            Identification::Dob => 8,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "yob" => Some(Identification::Yob),
            "dob" => Some(Identification::Dob),
            _ => None,
        }
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

pub fn validate_start_voting_key(start_voting_key: &str) -> Result<(), ValidationError> {
    let valid = start_voting_key.chars().count() == START_VOTING_KEY_LENGTH
        && start_voting_key
            .chars()
            .all(|c| START_VOTING_KEY_ALPHABET.contains(c));

    if valid {
        Ok(())
    } else {
        Err(ValidationError::StartVotingKeyInvalid)
    }
}

pub fn validate_extended_factor(
    extended_factor: &str,
    identification: Identification,
) -> Result<(), ValidationError> {
    let expected = identification.extended_factor_length();
    if extended_factor.len() == expected && is_digits(extended_factor) {
        Ok(())
    } else {
        Err(ValidationError::ExtendedFactorInvalid(expected))
    }
}

/// A ballot casting key is a fixed-length number that is not zero
pub fn validate_ballot_casting_key(ballot_casting_key: &str) -> Result<(), ValidationError> {
    let found = ballot_casting_key.chars().count();
    if found != BALLOT_CASTING_KEY_LENGTH {
        return Err(ValidationError::BallotCastingKeyLength {
            expected: BALLOT_CASTING_KEY_LENGTH,
            found,
        });
    }
    if !is_digits(ballot_casting_key) {
        return Err(ValidationError::BallotCastingKeyNotNumeric);
    }
    if ballot_casting_key.bytes().all(|b| b == b'0') {
        return Err(ValidationError::BallotCastingKeyAllZero);
    }
    Ok(())
}

/// Election event, verification card, ballot box and credential identifiers
pub fn validate_identifier(identifier: &str, name: &str) -> Result<(), Error> {
    if identifier.len() == IDENTIFIER_LENGTH && identifier.bytes().all(|b| b.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "{} must be {} hexadecimal characters",
            name, IDENTIFIER_LENGTH
        )))
    }
}

pub fn validate_short_choice_return_code(code: &str) -> Result<(), Error> {
    if code.len() == SHORT_CHOICE_RETURN_CODE_LENGTH && is_digits(code) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "short choice return code must be {} digits",
            SHORT_CHOICE_RETURN_CODE_LENGTH
        )))
    }
}

pub fn validate_short_vote_cast_return_code(code: &str) -> Result<(), Error> {
    if code.len() == SHORT_VOTE_CAST_RETURN_CODE_LENGTH && is_digits(code) {
        Ok(())
    } else {
        Err(Error::invalid(format!(
            "short vote cast return code must be {} digits",
            SHORT_VOTE_CAST_RETURN_CODE_LENGTH
        )))
    }
}
