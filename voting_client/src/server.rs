use crate::*;

/// The voting server as seen by the client
///
/// Implementations send every request once, with a fresh idempotency key and
/// caching disabled. Retrying is left to the voter.
pub trait VotingServer {
    fn get_voter_portal_configuration(
        &self,
        election_event_id: &str,
    ) -> Result<ConfigureVoterPortalResponse, TransportError>;

    fn authenticate_voter(
        &self,
        credential_id: &str,
        payload: &AuthenticateVoterPayload,
    ) -> Result<AuthenticateVoterResponse, TransportError>;

    fn send_vote(
        &self,
        authentication_data: &VoterAuthenticationData,
        payload: &SendVotePayload,
    ) -> Result<SendVoteResponse, TransportError>;

    fn confirm_vote(
        &self,
        authentication_data: &VoterAuthenticationData,
        payload: &ConfirmVotePayload,
    ) -> Result<ConfirmVoteResponse, TransportError>;
}
