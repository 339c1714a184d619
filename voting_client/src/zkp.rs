//! Non-interactive sigma proofs attached to a vote.
//!
//! Both proofs are Fiat-Shamir transforms over [`recursive_hash`]. The auxiliary
//! information binds a proof to the voter and to the ciphertexts it was produced for.

use crate::*;
use num_bigint::BigUint;
use rand_core::{CryptoRng, RngCore};

const EXPONENTIATION_PROOF_CONTEXT: &str = "ExponentiationProof";
const PLAINTEXT_EQUALITY_PROOF_CONTEXT: &str = "PlaintextEqualityProof";

/// Proof that the same exponent `x` maps every base `g_i` to `y_i = g_i^x`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ExponentiationProof {
    #[serde(with = "biguint_hex")]
    pub e: BigUint,

    #[serde(with = "biguint_hex")]
    pub z: BigUint,
}

/// Proof that two single-element ciphertexts under different keys encrypt the same plaintext
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PlaintextEqualityProof {
    #[serde(with = "biguint_hex")]
    pub e: BigUint,

    #[serde(with = "biguint_hex_vec")]
    pub z: Vec<BigUint>,
}

fn challenge(group: &GqGroup, transcript: Vec<Hashable>) -> BigUint {
    BigUint::from_bytes_be(&recursive_hash_of(transcript)) % group.q()
}

fn auxiliary(context: &str, auxiliary_information: &[Hashable]) -> Hashable {
    let mut values = vec![Hashable::from(context)];
    values.extend(auxiliary_information.iter().cloned());
    Hashable::Sequence(values)
}

fn exponentiation_statement(group: &GqGroup, bases: &[BigUint]) -> Hashable {
    Hashable::Sequence(vec![
        group.p().into(),
        group.q().into(),
        group.generator().into(),
        bases.into(),
    ])
}

fn check_exponentiation_statement(
    group: &GqGroup,
    bases: &[BigUint],
    exponentiations: &[BigUint],
) -> Result<(), Error> {
    if bases.is_empty() {
        return Err(Error::invalid("exponentiation proof needs at least one base"));
    }
    if bases.len() != exponentiations.len() {
        return Err(Error::invalid(
            "exponentiation proof needs as many bases as exponentiations",
        ));
    }
    if !bases.iter().chain(exponentiations).all(|x| group.is_member(x)) {
        return Err(Error::invalid(
            "exponentiation proof statement must belong to the group",
        ));
    }
    Ok(())
}

/// Prove knowledge of `exponent` with `exponentiations[i] = bases[i]^exponent`
pub fn gen_exponentiation_proof<R: RngCore + CryptoRng>(
    group: &GqGroup,
    bases: &[BigUint],
    exponent: &BigUint,
    exponentiations: &[BigUint],
    auxiliary_information: &[Hashable],
    rng: &mut R,
) -> Result<ExponentiationProof, Error> {
    check_exponentiation_statement(group, bases, exponentiations)?;
    if !group.is_exponent(exponent) {
        return Err(Error::invalid("exponentiation proof witness is not in Zq"));
    }

    let b = group.random_exponent(rng);
    let commitment: Vec<BigUint> = bases.iter().map(|g| group.exponentiate(g, &b)).collect();

    let e = challenge(
        group,
        vec![
            exponentiation_statement(group, bases),
            exponentiations.into(),
            commitment.as_slice().into(),
            auxiliary(EXPONENTIATION_PROOF_CONTEXT, auxiliary_information),
        ],
    );
    let z = (b + &e * exponent) % group.q();

    Ok(ExponentiationProof { e, z })
}

pub fn verify_exponentiation_proof(
    group: &GqGroup,
    bases: &[BigUint],
    exponentiations: &[BigUint],
    proof: &ExponentiationProof,
    auxiliary_information: &[Hashable],
) -> Result<bool, Error> {
    check_exponentiation_statement(group, bases, exponentiations)?;
    if !group.is_exponent(&proof.e) || !group.is_exponent(&proof.z) {
        return Ok(false);
    }

    let minus_e = group.negate_exponent(&proof.e);
    let commitment: Vec<BigUint> = bases
        .iter()
        .zip(exponentiations)
        .map(|(g, y)| group.multiply(&group.exponentiate(g, &proof.z), &group.exponentiate(y, &minus_e)))
        .collect();

    let e = challenge(
        group,
        vec![
            exponentiation_statement(group, bases),
            exponentiations.into(),
            commitment.as_slice().into(),
            auxiliary(EXPONENTIATION_PROOF_CONTEXT, auxiliary_information),
        ],
    );

    Ok(e == proof.e)
}

/// Statement of a plaintext-equality proof
pub struct PlaintextEqualityStatement<'a> {
    /// Ciphertext under `public_key`
    pub ciphertext: &'a ElGamalCiphertext,
    /// Ciphertext under `other_public_key`
    pub other_ciphertext: &'a ElGamalCiphertext,
    pub public_key: &'a BigUint,
    pub other_public_key: &'a BigUint,
}

impl<'a> PlaintextEqualityStatement<'a> {
    fn check(&self, group: &GqGroup) -> Result<(), Error> {
        if self.ciphertext.size() != 1 || self.other_ciphertext.size() != 1 {
            return Err(Error::invalid(
                "plaintext equality proof works on single-element ciphertexts",
            ));
        }
        if !self.ciphertext.belongs_to(group)
            || !self.other_ciphertext.belongs_to(group)
            || !group.is_member(self.public_key)
            || !group.is_member(self.other_public_key)
        {
            return Err(Error::invalid(
                "plaintext equality proof statement must belong to the group",
            ));
        }
        Ok(())
    }

    // (g^x, g^x', h^x * h'^-x')
    fn phi(&self, group: &GqGroup, x: &BigUint, x_prime: &BigUint) -> Vec<BigUint> {
        vec![
            group.generator_pow(x),
            group.generator_pow(x_prime),
            group.multiply(
                &group.exponentiate(self.public_key, x),
                &group.exponentiate(self.other_public_key, &group.negate_exponent(x_prime)),
            ),
        ]
    }

    // (c_0, c'_0, c_1 / c'_1)
    fn image(&self, group: &GqGroup) -> Vec<BigUint> {
        vec![
            self.ciphertext.gamma.clone(),
            self.other_ciphertext.gamma.clone(),
            group.multiply(
                &self.ciphertext.phis[0],
                &group.invert(&self.other_ciphertext.phis[0]),
            ),
        ]
    }

    fn hashable(&self, group: &GqGroup) -> Hashable {
        Hashable::Sequence(vec![
            group.p().into(),
            group.q().into(),
            group.generator().into(),
            self.public_key.into(),
            self.other_public_key.into(),
        ])
    }
}

/// Prove that both ciphertexts of `statement` encrypt the same plaintext, given
/// the randomness `(x, x')` each of them was produced with
pub fn gen_plaintext_equality_proof<R: RngCore + CryptoRng>(
    group: &GqGroup,
    statement: &PlaintextEqualityStatement,
    randomness: (&BigUint, &BigUint),
    auxiliary_information: &[Hashable],
    rng: &mut R,
) -> Result<PlaintextEqualityProof, Error> {
    statement.check(group)?;
    let (x, x_prime) = randomness;
    if !group.is_exponent(x) || !group.is_exponent(x_prime) {
        return Err(Error::invalid("plaintext equality proof witness is not in Zq"));
    }

    let b0 = group.random_exponent(rng);
    let b1 = group.random_exponent(rng);
    let commitment = statement.phi(group, &b0, &b1);

    let e = challenge(
        group,
        vec![
            statement.hashable(group),
            statement.image(group).as_slice().into(),
            commitment.as_slice().into(),
            auxiliary(PLAINTEXT_EQUALITY_PROOF_CONTEXT, auxiliary_information),
        ],
    );
    let z = vec![(b0 + &e * x) % group.q(), (b1 + &e * x_prime) % group.q()];

    Ok(PlaintextEqualityProof { e, z })
}

pub fn verify_plaintext_equality_proof(
    group: &GqGroup,
    statement: &PlaintextEqualityStatement,
    proof: &PlaintextEqualityProof,
    auxiliary_information: &[Hashable],
) -> Result<bool, Error> {
    statement.check(group)?;
    if proof.z.len() != 2
        || !group.is_exponent(&proof.e)
        || !proof.z.iter().all(|z| group.is_exponent(z))
    {
        return Ok(false);
    }

    let image = statement.image(group);
    let minus_e = group.negate_exponent(&proof.e);
    let commitment: Vec<BigUint> = statement
        .phi(group, &proof.z[0], &proof.z[1])
        .iter()
        .zip(image.iter())
        .map(|(x, y)| group.multiply(x, &group.exponentiate(y, &minus_e)))
        .collect();

    let e = challenge(
        group,
        vec![
            statement.hashable(group),
            image.as_slice().into(),
            commitment.as_slice().into(),
            auxiliary(PLAINTEXT_EQUALITY_PROOF_CONTEXT, auxiliary_information),
        ],
    );

    Ok(e == proof.e)
}
