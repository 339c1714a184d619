//! Encoding of free-text write-ins as elements of Gq.
//!
//! A write-in is read as a base-`a` number over [`WRITE_IN_ALPHABET`] and then
//! squared into a quadratic residue. Squaring is invertible because the
//! integer is below `q` and `p = 3 mod 4`.

use crate::*;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};

/// Characters allowed in a write-in, in rank order
///
/// Rank 0 (`#`) is the padding symbol and can never lead a write-in.
pub const WRITE_IN_ALPHABET: &str = "# '()+,-./:0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz\
ÀÁÂÃÄÅÆÇÈÉÊËÌÍÎÏÐÑÒÓÔÕÖØÙÚÛÜÝÞßàáâãäåæçèéêëìíîïðñòóôõöøùúûüýþÿŒœŠšŸŽž";

const PADDING_SYMBOL: char = '#';

fn alphabet_size() -> u32 {
    WRITE_IN_ALPHABET.chars().count() as u32
}

fn rank(c: char) -> Option<u32> {
    WRITE_IN_ALPHABET.chars().position(|a| a == c).map(|i| i as u32)
}

fn symbol(rank: u32) -> Option<char> {
    WRITE_IN_ALPHABET.chars().nth(rank as usize)
}

fn invalid<S: Into<String>>(msg: S) -> Error {
    ValidationError::WriteInInvalid(msg.into()).into()
}

/// Check the characters of a voter-typed write-in
///
/// A write-in of spaces only is refused: a single space encodes to the group
/// identity, which fills unused write-in slots.
pub fn validate_write_in(write_in: &str) -> Result<(), ValidationError> {
    let error = |msg: String| Err(ValidationError::WriteInInvalid(msg));

    if write_in.trim_start_matches(' ').is_empty() {
        return error("a write-in cannot be blank".to_owned());
    }
    if write_in.starts_with(PADDING_SYMBOL) {
        return error(format!("a write-in cannot start with {}", PADDING_SYMBOL));
    }
    if let Some(c) = write_in.chars().find(|c| rank(*c).is_none()) {
        return error(format!("{:?} is not allowed in a write-in", c));
    }
    Ok(())
}

/// Largest `L` with `a^L < q`
///
/// Every write-in of at most this many characters encodes below `q`.
pub fn max_write_in_length(group: &GqGroup) -> usize {
    let a = BigUint::from(alphabet_size());
    let mut power = a.clone();
    let mut length = 0;
    while &power < group.q() {
        length += 1;
        power *= &a;
    }
    length
}

/// Base-`a` integer value of `write_in`
pub fn write_in_to_integer(group: &GqGroup, write_in: &str) -> Result<BigUint, Error> {
    validate_write_in(write_in)?;

    let length = write_in.chars().count();
    let max = max_write_in_length(group);
    if length > max {
        return Err(invalid(format!(
            "a write-in of {} characters is longer than {}",
            length, max
        )));
    }

    let a = alphabet_size();
    let mut value = BigUint::zero();
    for c in write_in.chars() {
        let r = rank(c).ok_or_else(|| invalid(format!("{:?} is not allowed in a write-in", c)))?;
        value = value * a + r;
    }

    Ok(value)
}

/// Inverse of [`write_in_to_integer`]
pub fn integer_to_write_in(group: &GqGroup, value: &BigUint) -> Result<String, Error> {
    if value <= &BigUint::one() || value >= group.q() {
        return Err(Error::invalid("write-in integer must be in (1, q)"));
    }

    let a = alphabet_size();
    let mut x = value.clone();
    let mut reversed = Vec::new();
    while !x.is_zero() {
        let digit = (&x % a).to_u32().unwrap_or(0);
        let c = symbol(digit)
            .ok_or_else(|| Error::invalid("write-in digit outside the alphabet"))?;
        reversed.push(c);
        x /= a;
    }

    Ok(reversed.into_iter().rev().collect())
}

/// `x^2 mod p` for the integer value `x` of `write_in`
pub fn write_in_to_quadratic_residue(group: &GqGroup, write_in: &str) -> Result<BigUint, Error> {
    let x = write_in_to_integer(group, write_in)?;
    Ok(group.multiply(&x, &x))
}

/// Inverse of [`write_in_to_quadratic_residue`]
///
/// Of the two square roots of `y`, the encoding always produced the one not above `q`.
pub fn quadratic_residue_to_write_in(group: &GqGroup, y: &BigUint) -> Result<String, Error> {
    if !group.is_member(y) {
        return Err(Error::invalid("write-in encoding is not a group element"));
    }

    let exponent = (group.p() + 1u32) / 4u32;
    let root = y.modpow(&exponent, group.p());
    let root = if &root > group.q() {
        group.p() - root
    } else {
        root
    };

    integer_to_write_in(group, &root)
}

/// Encode the selected write-ins into exactly `delta - 1` group elements
///
/// Slots with no write-in hold the identity.
pub fn encode_write_ins(
    group: &GqGroup,
    delta: usize,
    selected_write_ins: &[String],
) -> Result<Vec<BigUint>, Error> {
    if delta == 0 {
        return Err(Error::invalid("delta must be at least 1"));
    }
    let slots = delta - 1;
    if selected_write_ins.len() > slots {
        return Err(Error::invalid(format!(
            "{} write-ins selected but only {} write-in slots available",
            selected_write_ins.len(),
            slots
        )));
    }

    let mut encoded = selected_write_ins
        .iter()
        .map(|w| write_in_to_quadratic_residue(group, w))
        .collect::<Result<Vec<_>, _>>()?;
    encoded.resize(slots, group.identity());

    Ok(encoded)
}
