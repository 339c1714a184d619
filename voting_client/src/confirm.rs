use crate::*;
use num_bigint::BigUint;

/// Confirmation key `CK = hash_and_square(BCK)^k_id` for the ballot casting key
///
/// A malformed ballot casting key is a voter input error, reported with its own
/// status so the voter can retype it.
pub fn create_confirm_message(
    group: &GqGroup,
    ballot_casting_key: &str,
    verification_card_secret_key: &BigUint,
) -> Result<BigUint, Error> {
    validate_ballot_casting_key(ballot_casting_key)?;
    if !group.is_exponent(verification_card_secret_key) {
        return Err(Error::invalid(
            "verification card secret key is not an element of Zq",
        ));
    }

    let bck = BigUint::parse_bytes(ballot_casting_key.as_bytes(), 10)
        .ok_or_else(|| Error::invalid("ballot casting key is not a number"))?;
    let hashed = hash_and_square(&bck, group);

    Ok(group.exponentiate(&hashed, verification_card_secret_key))
}
