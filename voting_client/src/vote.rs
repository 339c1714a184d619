use crate::*;
use num_bigint::BigUint;
use rand_core::{CryptoRng, RngCore};

const CREATE_VOTE_CONTEXT: &str = "CreateVote";

/// Public parameters of an election event, as received with the voter material
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PrimitivesParams {
    pub encryption_group: GqGroup,
    pub election_public_key: ElGamalPublicKey,
    pub choice_return_codes_encryption_public_key: ElGamalPublicKey,
    pub primes_mapping_table: PrimesMappingTable,
}

impl PrimitivesParams {
    /// Check that keys and table live in the encryption group
    pub fn validate(&self) -> Result<(), Error> {
        let group = &self.encryption_group;
        if !self.election_public_key.belongs_to(group) {
            return Err(Error::invalid(
                "election public key does not belong to the encryption group",
            ));
        }
        if !self
            .choice_return_codes_encryption_public_key
            .belongs_to(group)
        {
            return Err(Error::invalid(
                "choice return codes public key does not belong to the encryption group",
            ));
        }
        if !self.primes_mapping_table.belongs_to(group) {
            return Err(Error::invalid(
                "primes mapping table does not belong to the encryption group",
            ));
        }

        let psi = get_psi(&self.primes_mapping_table);
        let delta = get_delta(&self.primes_mapping_table);
        if self.election_public_key.len() < delta {
            return Err(Error::invalid(format!(
                "election public key has {} elements but delta is {}",
                self.election_public_key.len(),
                delta
            )));
        }
        if self.choice_return_codes_encryption_public_key.len() < psi {
            return Err(Error::invalid(format!(
                "choice return codes public key has {} elements but psi is {}",
                self.choice_return_codes_encryption_public_key.len(),
                psi
            )));
        }
        Ok(())
    }
}

/// An encrypted vote with the proofs that bind it to the voter's choice return codes
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub encrypted_vote: ElGamalCiphertext,
    pub encrypted_partial_choice_return_codes: ElGamalCiphertext,
    pub exponentiated_encrypted_vote: ElGamalCiphertext,
    pub exponentiation_proof: ExponentiationProof,
    pub plaintext_equality_proof: PlaintextEqualityProof,
}

fn auxiliary_information(
    election_event_id: &str,
    verification_card_id: &str,
    encrypted_vote: &ElGamalCiphertext,
    encrypted_partial_choice_return_codes: &ElGamalCiphertext,
) -> Vec<Hashable> {
    vec![
        CREATE_VOTE_CONTEXT.into(),
        election_event_id.into(),
        verification_card_id.into(),
        encrypted_vote.into(),
        encrypted_partial_choice_return_codes.into(),
    ]
}

/// Encrypt the voter's selections and prove the result consistent with the
/// partial choice return codes
///
/// The selections must form a valid ballot. They are never corrected here; an
/// invalid selection means the caller built the ballot wrongly.
pub fn create_vote<R: RngCore + CryptoRng>(
    params: &PrimitivesParams,
    election_event_id: &str,
    verification_card_id: &str,
    selected_actual_voting_options: &[String],
    selected_write_ins: &[String],
    verification_card_secret_key: &BigUint,
    rng: &mut R,
) -> Result<Vote, Error> {
    validate_identifier(election_event_id, "election event id")?;
    validate_identifier(verification_card_id, "verification card id")?;
    params.validate()?;

    let group = &params.encryption_group;
    let table = &params.primes_mapping_table;
    let k_id = verification_card_secret_key;
    if !group.is_exponent(k_id) {
        return Err(Error::invalid(
            "verification card secret key is not an element of Zq",
        ));
    }

    let psi = get_psi(table);
    let delta = get_delta(table);
    if selected_actual_voting_options.len() != psi {
        return Err(Error::invalid(format!(
            "expected {} selected voting options, found {}",
            psi,
            selected_actual_voting_options.len()
        )));
    }

    let encoded = get_encoded_voting_options(table, selected_actual_voting_options)?;
    if !is_valid_ballot(table, selected_actual_voting_options)? {
        return Err(Error::invalid(
            "selected voting options do not form a valid ballot",
        ));
    }

    let write_ins = encode_write_ins(group, delta, selected_write_ins)?;
    let rho = group.product(&encoded);

    let mut vote_plaintext = Vec::with_capacity(delta);
    vote_plaintext.push(rho);
    vote_plaintext.extend(write_ins);

    let r = group.random_exponent(rng);
    let encrypted_vote =
        ElGamalCiphertext::encrypt(group, &vote_plaintext, &r, &params.election_public_key)?;

    let partial_choice_return_codes: Vec<BigUint> = encoded
        .iter()
        .map(|p| group.exponentiate(p, k_id))
        .collect();
    let r_prime = group.random_exponent(rng);
    let encrypted_partial_choice_return_codes = ElGamalCiphertext::encrypt(
        group,
        &partial_choice_return_codes,
        &r_prime,
        &params.choice_return_codes_encryption_public_key,
    )?;

    let exponentiated_encrypted_vote = encrypted_vote.first_component().exponentiate(k_id, group);
    let combined_partial_choice_return_codes =
        encrypted_partial_choice_return_codes.combine_phis(group);
    let verification_card_public_key = group.generator_pow(k_id);

    let i_aux = auxiliary_information(
        election_event_id,
        verification_card_id,
        &encrypted_vote,
        &encrypted_partial_choice_return_codes,
    );

    let bases = [
        group.generator().clone(),
        encrypted_vote.gamma.clone(),
        encrypted_vote.phis[0].clone(),
    ];
    let exponentiations = [
        verification_card_public_key,
        exponentiated_encrypted_vote.gamma.clone(),
        exponentiated_encrypted_vote.phis[0].clone(),
    ];
    let exponentiation_proof =
        gen_exponentiation_proof(group, &bases, k_id, &exponentiations, &i_aux, rng)?;

    let election_key = &params.election_public_key.elements()[0];
    let choice_codes_key = params
        .choice_return_codes_encryption_public_key
        .compress(psi, group)?;
    let statement = PlaintextEqualityStatement {
        ciphertext: &exponentiated_encrypted_vote,
        other_ciphertext: &combined_partial_choice_return_codes,
        public_key: election_key,
        other_public_key: &choice_codes_key,
    };
    let r_k = (&r * k_id) % group.q();
    let plaintext_equality_proof =
        gen_plaintext_equality_proof(group, &statement, (&r_k, &r_prime), &i_aux, rng)?;

    Ok(Vote {
        encrypted_vote,
        encrypted_partial_choice_return_codes,
        exponentiated_encrypted_vote,
        exponentiation_proof,
        plaintext_equality_proof,
    })
}

/// Check both proofs of `vote` against the voter's verification card public key
///
/// This is the check the voting server runs before extracting choice return codes.
pub fn verify_vote(
    params: &PrimitivesParams,
    election_event_id: &str,
    verification_card_id: &str,
    verification_card_public_key: &BigUint,
    vote: &Vote,
) -> Result<bool, Error> {
    params.validate()?;
    let group = &params.encryption_group;
    let psi = get_psi(&params.primes_mapping_table);

    if vote.encrypted_vote.size() != get_delta(&params.primes_mapping_table)
        || vote.encrypted_partial_choice_return_codes.size() != psi
        || vote.exponentiated_encrypted_vote.size() != 1
    {
        return Ok(false);
    }
    if !vote.encrypted_vote.belongs_to(group)
        || !vote.encrypted_partial_choice_return_codes.belongs_to(group)
        || !vote.exponentiated_encrypted_vote.belongs_to(group)
        || !group.is_member(verification_card_public_key)
    {
        return Ok(false);
    }

    let i_aux = auxiliary_information(
        election_event_id,
        verification_card_id,
        &vote.encrypted_vote,
        &vote.encrypted_partial_choice_return_codes,
    );

    let bases = [
        group.generator().clone(),
        vote.encrypted_vote.gamma.clone(),
        vote.encrypted_vote.phis[0].clone(),
    ];
    let exponentiations = [
        verification_card_public_key.clone(),
        vote.exponentiated_encrypted_vote.gamma.clone(),
        vote.exponentiated_encrypted_vote.phis[0].clone(),
    ];
    if !verify_exponentiation_proof(
        group,
        &bases,
        &exponentiations,
        &vote.exponentiation_proof,
        &i_aux,
    )? {
        return Ok(false);
    }

    let combined = vote.encrypted_partial_choice_return_codes.combine_phis(group);
    let choice_codes_key = params
        .choice_return_codes_encryption_public_key
        .compress(psi, group)?;
    let statement = PlaintextEqualityStatement {
        ciphertext: &vote.exponentiated_encrypted_vote,
        other_ciphertext: &combined,
        public_key: &params.election_public_key.elements()[0],
        other_public_key: &choice_codes_key,
    };
    verify_plaintext_equality_proof(group, &statement, &vote.plaintext_equality_proof, &i_aux)
}
