use log::debug;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde::de::DeserializeOwned;
use voting_client::*;

/// The voting server's REST API
pub struct HttpVotingServer {
    base_uri: String,
    client: Client,
}

impl HttpVotingServer {
    pub fn new(base_uri: &str) -> Self {
        HttpVotingServer {
            base_uri: base_uri.trim_end_matches('/').to_owned(),
            client: Client::new(),
        }
    }

    fn voting_uri(&self, data: &VoterAuthenticationData, action: &str) -> String {
        format!(
            "{}/api/v1/processor/voting/{}/electionevent/{}/verificationCardSet/{}/credentialId/{}/verificationCard/{}/{}",
            self.base_uri,
            action,
            data.election_event_id,
            data.verification_card_set_id,
            data.credential_id,
            data.verification_card_id,
            action
        )
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, TransportError> {
        let response = request
            .header("Idempotency-Key", uuid::Uuid::new_v4().to_string())
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        read_response(response)
    }
}

fn read_response<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let status = response.status();
    debug!("voting server answered {}", status);

    if status.is_success() {
        return response
            .json()
            .map_err(|e| TransportError::Decode(e.to_string()));
    }

    // The error body is optional
    let body = response.json::<ServerErrorBody>().ok();
    Err(TransportError::Server {
        status: status.as_u16(),
        body,
    })
}

impl VotingServer for HttpVotingServer {
    fn get_voter_portal_configuration(
        &self,
        election_event_id: &str,
    ) -> Result<ConfigureVoterPortalResponse, TransportError> {
        let uri = format!(
            "{}/api/v1/processor/configuration/electionevent/{}",
            self.base_uri, election_event_id
        );
        self.send(self.client.get(&uri))
    }

    fn authenticate_voter(
        &self,
        credential_id: &str,
        payload: &AuthenticateVoterPayload,
    ) -> Result<AuthenticateVoterResponse, TransportError> {
        let uri = format!(
            "{}/api/v1/processor/voting/authenticatevoter/electionevent/{}/credentialId/{}/authenticate",
            self.base_uri, payload.election_event_id, credential_id
        );
        self.send(self.client.post(&uri).json(payload))
    }

    fn send_vote(
        &self,
        authentication_data: &VoterAuthenticationData,
        payload: &SendVotePayload,
    ) -> Result<SendVoteResponse, TransportError> {
        let uri = self.voting_uri(authentication_data, "sendvote");
        self.send(self.client.post(&uri).json(payload))
    }

    fn confirm_vote(
        &self,
        authentication_data: &VoterAuthenticationData,
        payload: &ConfirmVotePayload,
    ) -> Result<ConfirmVoteResponse, TransportError> {
        let uri = self.voting_uri(authentication_data, "confirmvote");
        self.send(self.client.post(&uri).json(payload))
    }
}
