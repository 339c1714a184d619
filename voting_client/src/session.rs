use crate::*;
use num_bigint::BigUint;
use zeroize::Zeroizing;

/// Everything a voter's session needs between the authenticate, send-vote and
/// confirm-vote calls
///
/// Owned by the caller and dropped with the session. It is never serialized;
/// the secret strings are wiped on drop.
#[derive(Default)]
pub struct VotingSession {
    pub(crate) start_voting_key: Option<Zeroizing<String>>,
    pub(crate) extended_factor: Option<Zeroizing<String>>,
    pub(crate) identification: Option<Identification>,
    pub(crate) authentication_data: Option<VoterAuthenticationData>,
    pub(crate) state: Option<VerificationCardState>,
    pub(crate) primitives_params: Option<PrimitivesParams>,
    pub(crate) verification_card_secret_key: Option<Zeroizing<Vec<u8>>>,
    pub(crate) selected_actual_voting_options: Vec<String>,
    pub(crate) short_choice_return_codes: Vec<String>,
}

impl VotingSession {
    pub fn new() -> Self {
        VotingSession::default()
    }

    pub fn verification_card_state(&self) -> Option<VerificationCardState> {
        self.state
    }

    pub fn authentication_data(&self) -> Option<&VoterAuthenticationData> {
        self.authentication_data.as_ref()
    }

    pub fn primitives_params(&self) -> Option<&PrimitivesParams> {
        self.primitives_params.as_ref()
    }

    /// Options of the vote sent in this session, in ballot order
    pub fn selected_actual_voting_options(&self) -> &[String] {
        &self.selected_actual_voting_options
    }

    pub fn short_choice_return_codes(&self) -> &[String] {
        &self.short_choice_return_codes
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication_data.is_some()
    }

    /// Forget everything, secrets included
    pub fn clear(&mut self) {
        *self = VotingSession::default();
    }

    pub(crate) fn start_voting_key(&self) -> Result<&str, ClientError> {
        self.start_voting_key
            .as_ref()
            .map(|s| s.as_str())
            .ok_or_else(|| ClientError::invariant("the session holds no start voting key"))
    }

    pub(crate) fn extended_factor(&self) -> Result<(&str, Identification), ClientError> {
        match (&self.extended_factor, self.identification) {
            (Some(f), Some(i)) => Ok((f.as_str(), i)),
            _ => Err(ClientError::invariant(
                "the session holds no extended authentication factor",
            )),
        }
    }

    pub(crate) fn require_authentication_data(&self) -> Result<&VoterAuthenticationData, ClientError> {
        self.authentication_data
            .as_ref()
            .ok_or_else(|| ClientError::invariant("the voter is not authenticated"))
    }

    pub(crate) fn require_primitives_params(&self) -> Result<&PrimitivesParams, ClientError> {
        self.primitives_params
            .as_ref()
            .ok_or_else(|| ClientError::invariant("the session holds no voter material"))
    }

    /// `k_id` is kept as big-endian bytes, wiped when the session goes
    pub(crate) fn set_secret_key(&mut self, k_id: &BigUint) {
        self.verification_card_secret_key = Some(Zeroizing::new(k_id.to_bytes_be()));
    }

    pub(crate) fn require_secret_key(&self) -> Result<BigUint, ClientError> {
        self.verification_card_secret_key
            .as_ref()
            .map(|bytes| BigUint::from_bytes_be(bytes))
            .ok_or_else(|| ClientError::invariant("the session holds no verification card secret key"))
    }
}

impl std::fmt::Debug for VotingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("VotingSession")
            .field("authentication_data", &self.authentication_data)
            .field("state", &self.state)
            .finish()
    }
}
