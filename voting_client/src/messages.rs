//! Payloads exchanged with the voting server and the results handed to the voter.

use crate::*;
use indexmap::IndexMap;
use num_bigint::BigUint;

/// Server-held progress of a verification card
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationCardState {
    Initial,
    Sent,
    Confirmed,
}

/// Identifiers scoping one voting card
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoterAuthenticationData {
    pub election_event_id: String,
    pub verification_card_set_id: String,
    pub ballot_box_id: String,
    pub verification_card_id: String,
    pub voting_card_id: String,
    pub credential_id: String,
}

impl VoterAuthenticationData {
    pub fn validate(&self) -> Result<(), Error> {
        validate_identifier(&self.election_event_id, "election event id")?;
        validate_identifier(&self.verification_card_set_id, "verification card set id")?;
        validate_identifier(&self.ballot_box_id, "ballot box id")?;
        validate_identifier(&self.verification_card_id, "verification card id")?;
        validate_identifier(&self.voting_card_id, "voting card id")?;
        validate_identifier(&self.credential_id, "credential id")?;
        Ok(())
    }

    /// Identifiers the send-vote and confirm-vote endpoints are scoped by
    pub fn context_ids(&self) -> ContextIds {
        ContextIds {
            election_event_id: self.election_event_id.clone(),
            verification_card_set_id: self.verification_card_set_id.clone(),
            verification_card_id: self.verification_card_id.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContextIds {
    pub election_event_id: String,
    pub verification_card_set_id: String,
    pub verification_card_id: String,
}

/// Everything the voter needs to vote, sent on first authentication
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VoterMaterial {
    pub verification_card_keystore: String,
    pub encryption_group: GqGroup,
    pub election_public_key: ElGamalPublicKey,
    pub choice_return_codes_encryption_public_key: ElGamalPublicKey,
    pub primes_mapping_table: PrimesMappingTable,

    /// Ballot texts, rendered by the voter portal only
    #[serde(default)]
    pub ballot: serde_json::Value,
}

impl VoterMaterial {
    pub fn primitives_params(&self) -> PrimitivesParams {
        PrimitivesParams {
            encryption_group: self.encryption_group.clone(),
            election_public_key: self.election_public_key.clone(),
            choice_return_codes_encryption_public_key: self
                .choice_return_codes_encryption_public_key
                .clone(),
            primes_mapping_table: self.primes_mapping_table.clone(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateVoterPayload {
    pub election_event_id: String,
    pub authentication_challenge: AuthenticationChallenge,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateVoterResponse {
    pub verification_card_state: VerificationCardState,
    pub voter_authentication_data: VoterAuthenticationData,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voter_material: Option<VoterMaterial>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_choice_return_codes: Option<Vec<String>>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_vote_cast_return_code: Option<String>,
}

impl AuthenticateVoterResponse {
    /// Check the response carries what its verification card state requires
    /// and belongs to the voter who asked
    pub fn validate(&self, election_event_id: &str, credential_id: &str) -> Result<(), ClientError> {
        let data = &self.voter_authentication_data;
        if data.election_event_id != election_event_id {
            return Err(ClientError::invariant(
                "authentication response is for another election event",
            ));
        }
        if data.credential_id != credential_id {
            return Err(ClientError::invariant(
                "authentication response is for another credential",
            ));
        }
        data.validate()?;

        match self.verification_card_state {
            VerificationCardState::Initial => {
                if self.voter_material.is_none() {
                    return Err(ClientError::invariant(
                        "voter material is missing for a verification card in state INITIAL",
                    ));
                }
            }
            VerificationCardState::Sent => {
                if self.voter_material.is_none() {
                    return Err(ClientError::invariant(
                        "voter material is missing for a verification card in state SENT",
                    ));
                }
                let codes = self.short_choice_return_codes.as_ref().ok_or_else(|| {
                    ClientError::invariant(
                        "short choice return codes are missing for a verification card in state SENT",
                    )
                })?;
                for code in codes.iter() {
                    validate_short_choice_return_code(code)?;
                }
            }
            VerificationCardState::Confirmed => {
                let code = self.short_vote_cast_return_code.as_ref().ok_or_else(|| {
                    ClientError::invariant(
                        "short vote cast return code is missing for a verification card in state CONFIRMED",
                    )
                })?;
                validate_short_vote_cast_return_code(code)?;
            }
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendVotePayload {
    pub context_ids: ContextIds,
    pub voting_card_id: String,
    pub encrypted_verifiable_vote: Vote,
    pub authentication_challenge: AuthenticationChallenge,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendVoteResponse {
    pub short_choice_return_codes: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmVotePayload {
    pub context_ids: ContextIds,
    pub voting_card_id: String,

    #[serde(with = "biguint_hex")]
    pub confirmation_key: BigUint,

    pub authentication_challenge: AuthenticationChallenge,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmVoteResponse {
    pub short_vote_cast_return_code: String,
}

/// Voter portal configuration as served by the voting server
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureVoterPortalResponse {
    pub election_event_id: String,

    /// Server time, unix seconds
    pub timestamp: u64,

    /// base64 of the UTF-8 JSON [`VoterPortalConfig`]
    pub configuration: String,
}

/// Decoded voter portal configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VoterPortalConfig {
    pub identification: Identification,

    /// Everything else, kept in server order for the voter portal
    #[serde(flatten)]
    pub properties: IndexMap<String, serde_json::Value>,
}

/// A short choice return code next to the option it stands for
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceReturnCode {
    pub actual_voting_option: String,
    pub semantic_information: String,
    pub short_choice_return_code: String,
}

/// What the voter portal gets back from authenticating
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateVoterResult {
    pub verification_card_state: VerificationCardState,
    pub voting_card_id: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ballot: Option<serde_json::Value>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_choice_return_codes: Option<Vec<String>>,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_vote_cast_return_code: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SendVoteResult {
    pub choice_return_codes: Vec<ChoiceReturnCode>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmVoteResult {
    pub short_vote_cast_return_code: String,
}
