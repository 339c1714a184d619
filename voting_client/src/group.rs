//! The encryption group Gq: quadratic residues modulo a safe prime `p = 2q + 1`.

use crate::*;
use num_bigint::{BigUint, RandBigInt};
use num_traits::{One, Zero};
use rand_core::{CryptoRng, RngCore};

/// Encryption group parameters for one election event
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "RawGqGroup")]
pub struct GqGroup {
    #[serde(with = "biguint_hex")]
    p: BigUint,

    #[serde(with = "biguint_hex")]
    q: BigUint,

    #[serde(with = "biguint_hex")]
    g: BigUint,
}

// Unchecked wire form, only ever turned into a `GqGroup` through `GqGroup::new`
#[derive(Deserialize)]
struct RawGqGroup {
    #[serde(with = "biguint_hex")]
    p: BigUint,
    #[serde(with = "biguint_hex")]
    q: BigUint,
    #[serde(with = "biguint_hex")]
    g: BigUint,
}

impl std::convert::TryFrom<RawGqGroup> for GqGroup {
    type Error = Error;

    fn try_from(raw: RawGqGroup) -> Result<Self, Self::Error> {
        GqGroup::new(raw.p, raw.q, raw.g)
    }
}

impl GqGroup {
    /// Build a group, checking that `g` generates the order-`q` subgroup of `Z*p`
    ///
    /// Primality of `p` and `q` is not tested here; the parameters come from the
    /// election authority and are bound into every proof transcript.
    pub fn new(p: BigUint, q: BigUint, g: BigUint) -> Result<Self, Error> {
        let one = BigUint::one();
        if q <= one {
            return Err(Error::invalid("group order q must be greater than 1"));
        }
        if p != &q * 2u32 + 1u32 {
            return Err(Error::invalid("group modulus must satisfy p = 2q + 1"));
        }
        if g <= one || g >= p {
            return Err(Error::invalid("group generator must be in (1, p)"));
        }
        if g.modpow(&q, &p) != one {
            return Err(Error::invalid("group generator is not a quadratic residue"));
        }

        Ok(GqGroup { p, q, g })
    }

    pub fn p(&self) -> &BigUint {
        &self.p
    }

    pub fn q(&self) -> &BigUint {
        &self.q
    }

    pub fn generator(&self) -> &BigUint {
        &self.g
    }

    pub fn identity(&self) -> BigUint {
        BigUint::one()
    }

    /// Is `x` an element of Gq
    pub fn is_member(&self, x: &BigUint) -> bool {
        !x.is_zero() && x < &self.p && x.modpow(&self.q, &self.p).is_one()
    }

    /// Is `x` an element of Zq
    pub fn is_exponent(&self, x: &BigUint) -> bool {
        x < &self.q
    }

    pub fn multiply(&self, a: &BigUint, b: &BigUint) -> BigUint {
        (a * b) % &self.p
    }

    pub fn exponentiate(&self, base: &BigUint, exponent: &BigUint) -> BigUint {
        base.modpow(exponent, &self.p)
    }

    pub fn generator_pow(&self, exponent: &BigUint) -> BigUint {
        self.g.modpow(exponent, &self.p)
    }

    /// Inverse of a group element
    ///
    /// Every member has order dividing `q`, so `x^(q-1)` is its inverse.
    pub fn invert(&self, x: &BigUint) -> BigUint {
        x.modpow(&(&self.q - 1u32), &self.p)
    }

    /// Product of a sequence of elements (identity when empty)
    pub fn product<'a, I>(&self, elements: I) -> BigUint
    where
        I: IntoIterator<Item = &'a BigUint>,
    {
        elements
            .into_iter()
            .fold(self.identity(), |acc, x| self.multiply(&acc, x))
    }

    /// Additive inverse in Zq
    pub fn negate_exponent(&self, x: &BigUint) -> BigUint {
        let x = x % &self.q;
        if x.is_zero() {
            x
        } else {
            &self.q - x
        }
    }

    /// Uniformly random element of Zq
    pub fn random_exponent<R: RngCore + CryptoRng>(&self, rng: &mut R) -> BigUint {
        rng.gen_biguint_below(&self.q)
    }

    pub fn q_bit_length(&self) -> u64 {
        self.q.bits()
    }
}
