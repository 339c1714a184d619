//! Recursive hashing of structured values, the hash every protocol step agrees on.

use crate::*;
use digest::Digest;
use num_bigint::BigUint;
use sha3::Sha3_256;

pub const HASH_LENGTH: usize = 32;

/// A value that can be fed to [`recursive_hash`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hashable {
    Bytes(Vec<u8>),
    Integer(BigUint),
    Text(String),
    Sequence(Vec<Hashable>),
}

impl From<&str> for Hashable {
    fn from(s: &str) -> Self {
        Hashable::Text(s.to_owned())
    }
}

impl From<String> for Hashable {
    fn from(s: String) -> Self {
        Hashable::Text(s)
    }
}

impl From<BigUint> for Hashable {
    fn from(i: BigUint) -> Self {
        Hashable::Integer(i)
    }
}

impl From<&BigUint> for Hashable {
    fn from(i: &BigUint) -> Self {
        Hashable::Integer(i.clone())
    }
}

impl From<&[BigUint]> for Hashable {
    fn from(v: &[BigUint]) -> Self {
        Hashable::Sequence(v.iter().map(Hashable::from).collect())
    }
}

impl From<Vec<Hashable>> for Hashable {
    fn from(v: Vec<Hashable>) -> Self {
        Hashable::Sequence(v)
    }
}

impl From<&GqGroup> for Hashable {
    fn from(group: &GqGroup) -> Self {
        Hashable::Sequence(vec![
            group.p().into(),
            group.q().into(),
            group.generator().into(),
        ])
    }
}

/// SHA3-256 over a domain-separated encoding of `value`
pub fn recursive_hash(value: &Hashable) -> [u8; HASH_LENGTH] {
    let mut hasher = Sha3_256::new();
    match value {
        Hashable::Bytes(bytes) => {
            hasher.update([0x00u8]);
            hasher.update(bytes);
        }
        Hashable::Integer(i) => {
            hasher.update([0x01u8]);
            hasher.update(i.to_bytes_be());
        }
        Hashable::Text(s) => {
            hasher.update([0x02u8]);
            hasher.update(s.as_bytes());
        }
        Hashable::Sequence(values) => {
            hasher.update([0x03u8]);
            for v in values {
                hasher.update(recursive_hash(v));
            }
        }
    }
    hasher.finalize().into()
}

/// Hash a sequence of values
pub fn recursive_hash_of(values: Vec<Hashable>) -> [u8; HASH_LENGTH] {
    recursive_hash(&Hashable::Sequence(values))
}

/// Cut `bytes` down to its `len` rightmost bytes
pub fn truncate(bytes: &[u8], len: usize) -> Vec<u8> {
    bytes[bytes.len().saturating_sub(len)..].to_vec()
}

/// Map an integer into Gq: `(H(x) + 1)^2 mod p`
pub fn hash_and_square(x: &BigUint, group: &GqGroup) -> BigUint {
    let h = BigUint::from_bytes_be(&recursive_hash(&Hashable::Integer(x.clone()))) + 1u32;
    h.modpow(&BigUint::from(2u32), group.p())
}
