use super::*;
use crate::answers::fixtures::sample_answers;
use crate::keystore::seal_keystore;
use crate::vote::fixtures::{setup, Setup};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use std::cell::{Cell, RefCell};

const EE: &str = "34caee78ed3d4cf981ca06b659f558eb";
const SVK: &str = "4d65ej2adb4ia6ghhzb52kg6";
const FACTOR: &str = "01061975";
const BCK: &str = "123456789";
const NOW: u64 = 1_700_000_000;
const PROFILE: Argon2Profile = Argon2Profile::Test;

fn short_code(value: &BigUint, digits: u32) -> String {
    let modulus = 10u64.pow(digits);
    let h = BigUint::from_bytes_be(&recursive_hash(&value.into())) % modulus;
    format!("{:0width$}", h.to_u64().unwrap(), width = digits as usize)
}

fn rejected(status: u16, error_status: &str, timestamp: Option<u64>, attempts: Option<u32>) -> TransportError {
    TransportError::Server {
        status,
        body: Some(ServerErrorBody {
            error_status: error_status.to_owned(),
            timestamp,
            number_of_remaining_attempts: attempts,
        }),
    }
}

/// An in-memory voting server holding one voting card
///
/// It checks every authentication challenge, verifies the proofs of the vote it
/// receives and computes return codes the way the control components would.
struct ReferenceServer {
    setup: Setup,
    authentication_data: VoterAuthenticationData,
    keystore: String,
    k_id: BigUint,
    base_challenge: String,
    now: Cell<u64>,
    state: Cell<VerificationCardState>,
    short_choice_return_codes: RefCell<Vec<String>>,
    short_vote_cast_return_code: RefCell<Option<String>>,
    remaining_attempts: Cell<u32>,
    offline: Cell<bool>,
    withhold_last_code: Cell<bool>,
    echo_election_event_id: RefCell<String>,
    calls: Cell<u32>,
}

impl ReferenceServer {
    fn new() -> Self {
        let setup = setup();
        let k_id = setup
            .params
            .encryption_group
            .random_exponent(&mut rand::thread_rng());
        let keystore = seal_keystore(PROFILE, SVK, &k_id);
        let credential_id = derive_credential_id(PROFILE, EE, SVK).unwrap();
        let base_challenge =
            derive_base_authentication_challenge(PROFILE, EE, Identification::Dob, SVK, FACTOR)
                .unwrap();

        ReferenceServer {
            setup,
            authentication_data: VoterAuthenticationData {
                election_event_id: EE.to_owned(),
                verification_card_set_id: "5f6c0e6a8a1b4e0c9d2f3a4b5c6d7e8f".to_owned(),
                ballot_box_id: "6f6c0e6a8a1b4e0c9d2f3a4b5c6d7e8f".to_owned(),
                verification_card_id: "7f6c0e6a8a1b4e0c9d2f3a4b5c6d7e8f".to_owned(),
                voting_card_id: "8f6c0e6a8a1b4e0c9d2f3a4b5c6d7e8f".to_owned(),
                credential_id,
            },
            keystore,
            k_id,
            base_challenge,
            now: Cell::new(NOW),
            state: Cell::new(VerificationCardState::Initial),
            short_choice_return_codes: RefCell::new(vec![]),
            short_vote_cast_return_code: RefCell::new(None),
            remaining_attempts: Cell::new(5),
            offline: Cell::new(false),
            withhold_last_code: Cell::new(false),
            echo_election_event_id: RefCell::new(EE.to_owned()),
            calls: Cell::new(0),
        }
    }

    fn group(&self) -> &GqGroup {
        &self.setup.params.encryption_group
    }

    fn call(&self) -> Result<(), TransportError> {
        self.calls.set(self.calls.get() + 1);
        if self.offline.get() {
            return Err(TransportError::Connection("connection refused".to_owned()));
        }
        Ok(())
    }

    // Accept the current and the previous time step
    fn check_challenge(
        &self,
        step: AuthenticationStep,
        challenge: &AuthenticationChallenge,
    ) -> Result<(), TransportError> {
        let now = self.now.get();
        if challenge.derived_voter_identifier != self.authentication_data.credential_id {
            return Err(rejected(404, "VOTER_NOT_FOUND", Some(now), None));
        }

        let nonce = BigUint::parse_bytes(challenge.authentication_nonce.as_bytes(), 10)
            .ok_or_else(|| rejected(400, "INVALID_NONCE", Some(now), None))?;
        let current = time_step(now);
        let accepted = [current, current.saturating_sub(1)].iter().any(|t| {
            derive_authentication_challenge(
                PROFILE,
                step,
                EE,
                &challenge.derived_voter_identifier,
                &self.base_challenge,
                &nonce,
                *t,
            )
            .map(|expected| expected == challenge.derived_authentication_challenge)
            .unwrap_or(false)
        });

        if accepted {
            Ok(())
        } else {
            let remaining = self.remaining_attempts.get().saturating_sub(1);
            self.remaining_attempts.set(remaining);
            Err(rejected(401, "EXTENDED_FACTOR_INVALID", Some(now), Some(remaining)))
        }
    }

    fn issued_codes(&self) -> Vec<String> {
        let mut codes = self.short_choice_return_codes.borrow().clone();
        if self.withhold_last_code.get() {
            codes.pop();
        }
        codes
    }

    fn voter_material(&self) -> VoterMaterial {
        let params = &self.setup.params;
        VoterMaterial {
            verification_card_keystore: self.keystore.clone(),
            encryption_group: params.encryption_group.clone(),
            election_public_key: params.election_public_key.clone(),
            choice_return_codes_encryption_public_key: params
                .choice_return_codes_encryption_public_key
                .clone(),
            primes_mapping_table: params.primes_mapping_table.clone(),
            ballot: serde_json::json!({"title": "Sample ballot"}),
        }
    }
}

impl VotingServer for ReferenceServer {
    fn get_voter_portal_configuration(
        &self,
        election_event_id: &str,
    ) -> Result<ConfigureVoterPortalResponse, TransportError> {
        self.call()?;
        assert_eq!(election_event_id, EE);
        let config = r#"{"identification":"dob","header":{"title":"Test election"}}"#;

        Ok(ConfigureVoterPortalResponse {
            election_event_id: self.echo_election_event_id.borrow().clone(),
            timestamp: self.now.get(),
            configuration: BASE64.encode(config),
        })
    }

    fn authenticate_voter(
        &self,
        credential_id: &str,
        payload: &AuthenticateVoterPayload,
    ) -> Result<AuthenticateVoterResponse, TransportError> {
        self.call()?;
        assert_eq!(credential_id, payload.authentication_challenge.derived_voter_identifier);
        self.check_challenge(
            AuthenticationStep::AuthenticateVoter,
            &payload.authentication_challenge,
        )?;

        let mut authentication_data = self.authentication_data.clone();
        authentication_data.election_event_id = self.echo_election_event_id.borrow().clone();

        let state = self.state.get();
        let mut response = AuthenticateVoterResponse {
            verification_card_state: state,
            voter_authentication_data: authentication_data,
            voter_material: None,
            short_choice_return_codes: None,
            short_vote_cast_return_code: None,
        };
        match state {
            VerificationCardState::Initial => {
                response.voter_material = Some(self.voter_material());
            }
            VerificationCardState::Sent => {
                response.voter_material = Some(self.voter_material());
                response.short_choice_return_codes = Some(self.issued_codes());
            }
            VerificationCardState::Confirmed => {
                response.short_vote_cast_return_code =
                    self.short_vote_cast_return_code.borrow().clone();
            }
        }
        Ok(response)
    }

    fn send_vote(
        &self,
        authentication_data: &VoterAuthenticationData,
        payload: &SendVotePayload,
    ) -> Result<SendVoteResponse, TransportError> {
        self.call()?;
        assert_eq!(authentication_data, &self.authentication_data);
        self.check_challenge(AuthenticationStep::SendVote, &payload.authentication_challenge)?;
        if self.state.get() != VerificationCardState::Initial {
            return Err(rejected(409, "VOTE_ALREADY_SENT", None, None));
        }

        let group = self.group();
        let verification_card_public_key = group.generator_pow(&self.k_id);
        let valid = verify_vote(
            &self.setup.params,
            EE,
            &payload.context_ids.verification_card_id,
            &verification_card_public_key,
            &payload.encrypted_verifiable_vote,
        )
        .unwrap_or(false);
        if !valid {
            return Err(rejected(400, "VOTE_PROOFS_INVALID", None, None));
        }

        let partial_choice_return_codes = payload
            .encrypted_verifiable_vote
            .encrypted_partial_choice_return_codes
            .decrypt(&self.setup.choice_return_codes_secret_key, group)
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        let codes: Vec<String> = partial_choice_return_codes
            .iter()
            .map(|p| short_code(p, 4))
            .collect();

        self.state.set(VerificationCardState::Sent);
        *self.short_choice_return_codes.borrow_mut() = codes;
        Ok(SendVoteResponse {
            short_choice_return_codes: self.issued_codes(),
        })
    }

    fn confirm_vote(
        &self,
        authentication_data: &VoterAuthenticationData,
        payload: &ConfirmVotePayload,
    ) -> Result<ConfirmVoteResponse, TransportError> {
        self.call()?;
        assert_eq!(authentication_data, &self.authentication_data);
        self.check_challenge(AuthenticationStep::ConfirmVote, &payload.authentication_challenge)?;

        let group = self.group();
        let bck = BigUint::parse_bytes(BCK.as_bytes(), 10).unwrap();
        let expected = group.exponentiate(&hash_and_square(&bck, group), &self.k_id);
        if payload.confirmation_key != expected {
            let remaining = self.remaining_attempts.get().saturating_sub(1);
            self.remaining_attempts.set(remaining);
            return Err(rejected(401, "CONFIRMATION_KEY_INVALID", None, Some(remaining)));
        }

        let code = short_code(&payload.confirmation_key, 8);
        self.state.set(VerificationCardState::Confirmed);
        *self.short_vote_cast_return_code.borrow_mut() = Some(code.clone());
        Ok(ConfirmVoteResponse {
            short_vote_cast_return_code: code,
        })
    }
}

fn client(server: ReferenceServer) -> VotingClient<ReferenceServer> {
    let config = ClientConfig {
        argon2_profile: PROFILE,
        ..ClientConfig::default()
    };
    VotingClient::new(server, config).with_clock(|| NOW)
}

#[test]
fn full_voting_saga() {
    let client = client(ReferenceServer::new());

    let portal = client.configure_voter_portal(EE).unwrap();
    assert_eq!(portal.identification, Identification::Dob);

    let mut session = VotingSession::new();
    let authenticated = client
        .authenticate_voter(&mut session, SVK, FACTOR, EE, portal.identification)
        .unwrap();
    assert_eq!(authenticated.verification_card_state, VerificationCardState::Initial);
    assert_eq!(authenticated.ballot.unwrap()["title"], "Sample ballot");
    assert_eq!(
        session.verification_card_state(),
        Some(VerificationCardState::Initial)
    );

    let sent = client.send_vote(&mut session, &sample_answers()).unwrap();
    let codes = &sent.choice_return_codes;
    assert_eq!(codes.len(), 4);
    assert_eq!(codes[0].actual_voting_option, "q1|yes");
    assert_eq!(codes[0].semantic_information, "NON_BLANK|Yes");
    assert_eq!(codes[3].actual_voting_option, "e1|WRITE_IN_POSITION-2");
    for code in codes.iter() {
        assert_eq!(code.short_choice_return_code.len(), 4);
    }
    assert_eq!(session.verification_card_state(), Some(VerificationCardState::Sent));

    // Sending twice is refused before reaching the server
    let calls = client.server().calls.get();
    assert!(client.send_vote(&mut session, &sample_answers()).is_err());
    assert_eq!(client.server().calls.get(), calls);

    let confirmed = client.confirm_vote(&mut session, BCK).unwrap();
    assert_eq!(confirmed.short_vote_cast_return_code.len(), 8);
    assert_eq!(
        session.verification_card_state(),
        Some(VerificationCardState::Confirmed)
    );
}

#[test]
fn reauthentication_returns_issued_codes() {
    let client = client(ReferenceServer::new());

    let mut session = VotingSession::new();
    client
        .authenticate_voter(&mut session, SVK, FACTOR, EE, Identification::Dob)
        .unwrap();
    let sent = client.send_vote(&mut session, &sample_answers()).unwrap();
    drop(session);

    // The voter comes back in a new session after sending
    let mut session = VotingSession::new();
    let again = client
        .authenticate_voter(&mut session, SVK, FACTOR, EE, Identification::Dob)
        .unwrap();
    assert_eq!(again.verification_card_state, VerificationCardState::Sent);
    let issued: Vec<String> = sent
        .choice_return_codes
        .iter()
        .map(|c| c.short_choice_return_code.clone())
        .collect();
    assert_eq!(again.short_choice_return_codes.unwrap(), issued);

    let confirmed = client.confirm_vote(&mut session, BCK).unwrap();

    // and once more after confirming
    let mut session = VotingSession::new();
    let last = client
        .authenticate_voter(&mut session, SVK, FACTOR, EE, Identification::Dob)
        .unwrap();
    assert_eq!(last.verification_card_state, VerificationCardState::Confirmed);
    assert_eq!(
        last.short_vote_cast_return_code.unwrap(),
        confirmed.short_vote_cast_return_code
    );
    assert!(last.ballot.is_none());
    assert!(session.primitives_params().is_none());
}

#[test]
fn wrong_extended_factor_or_clock() {
    let client = client(ReferenceServer::new());
    let mut session = VotingSession::new();

    let err = client
        .authenticate_voter(&mut session, SVK, "02061975", EE, Identification::Dob)
        .unwrap_err();
    assert_eq!(err.error_status(), "EXTENDED_FACTOR_INVALID");
    assert_eq!(err.payload().number_of_remaining_attempts, Some(4));
    assert!(!session.is_authenticated());

    // The right factor with a client clock 20 minutes late
    let server = ReferenceServer::new();
    let config = ClientConfig {
        argon2_profile: PROFILE,
        ..ClientConfig::default()
    };
    let late = VotingClient::new(server, config).with_clock(|| NOW - 1200);
    let err = late
        .authenticate_voter(&mut session, SVK, FACTOR, EE, Identification::Dob)
        .unwrap_err();
    assert_eq!(err.error_status(), "TIMESTAMP_MISALIGNMENT");
}

#[test]
fn voter_input_errors_stay_local() {
    let client = client(ReferenceServer::new());
    let mut session = VotingSession::new();

    let err = client
        .authenticate_voter(&mut session, "4d65ej2adb4ia6ghhzb52kg1", FACTOR, EE, Identification::Dob)
        .unwrap_err();
    assert_eq!(err.error_status(), "START_VOTING_KEY_INVALID");

    let err = client
        .authenticate_voter(&mut session, SVK, "1975", EE, Identification::Dob)
        .unwrap_err();
    assert_eq!(err.error_status(), "EXTENDED_FACTOR_INVALID");
    assert!(matches!(err, ClientError::InputValidation(_)));
    assert_eq!(client.server().calls.get(), 0);

    client
        .authenticate_voter(&mut session, SVK, FACTOR, EE, Identification::Dob)
        .unwrap();
    client.send_vote(&mut session, &sample_answers()).unwrap();

    let calls = client.server().calls.get();
    for bck in ["12345678", "12345678a", "000000000"].iter() {
        let err = client.confirm_vote(&mut session, bck).unwrap_err();
        assert_eq!(err.error_status(), "CONFIRMATION_KEY_INCORRECT");
    }
    assert_eq!(client.server().calls.get(), calls);

    // Well formed but wrong
    let err = client.confirm_vote(&mut session, "987654321").unwrap_err();
    assert!(matches!(err, ClientError::ServerResponse { http_status: 401, .. }));
    assert_eq!(session.verification_card_state(), Some(VerificationCardState::Sent));
}

#[test]
fn missing_choice_return_codes() {
    let client = client(ReferenceServer::new());
    client.server().withhold_last_code.set(true);

    let mut session = VotingSession::new();
    client
        .authenticate_voter(&mut session, SVK, FACTOR, EE, Identification::Dob)
        .unwrap();

    let err = client.send_vote(&mut session, &sample_answers()).unwrap_err();
    assert_eq!(err.error_status(), "PROTOCOL_INVARIANT_VIOLATED");
    assert_eq!(
        session.verification_card_state(),
        Some(VerificationCardState::Initial)
    );
    assert!(session.short_choice_return_codes().is_empty());

    // The server did record the vote; coming back shows it in state SENT
    let err = client
        .authenticate_voter(&mut session, SVK, FACTOR, EE, Identification::Dob)
        .unwrap_err();
    assert_eq!(err.error_status(), "PROTOCOL_INVARIANT_VIOLATED");
    assert_eq!(
        session.verification_card_state(),
        Some(VerificationCardState::Initial)
    );

    client.server().withhold_last_code.set(false);
    let again = client
        .authenticate_voter(&mut session, SVK, FACTOR, EE, Identification::Dob)
        .unwrap();
    assert_eq!(again.short_choice_return_codes.unwrap().len(), 4);
}

#[test]
fn invalid_write_in_is_voter_input() {
    let client = client(ReferenceServer::new());
    let mut session = VotingSession::new();
    client
        .authenticate_voter(&mut session, SVK, FACTOR, EE, Identification::Dob)
        .unwrap();

    let mut answers = sample_answers();
    answers.election_answers[0].candidates[1] = CandidateChoice::WriteIn {
        text: "Jane Doe €".to_owned(),
    };
    let calls = client.server().calls.get();
    let err = client.send_vote(&mut session, &answers).unwrap_err();
    assert!(matches!(err, ClientError::InputValidation(_)));
    assert_eq!(err.error_status(), "WRITE_IN_INVALID");

    answers.election_answers[0].candidates[1] = CandidateChoice::WriteIn {
        text: "J".repeat(144),
    };
    let err = client.send_vote(&mut session, &answers).unwrap_err();
    assert_eq!(err.error_status(), "WRITE_IN_INVALID");
    assert_eq!(client.server().calls.get(), calls);
}

#[test]
fn invalid_ballot_is_not_sent() {
    let client = client(ReferenceServer::new());
    let mut session = VotingSession::new();
    client
        .authenticate_voter(&mut session, SVK, FACTOR, EE, Identification::Dob)
        .unwrap();

    let mut answers = sample_answers();
    answers.election_answers[0].candidates.pop();

    let calls = client.server().calls.get();
    let err = client.send_vote(&mut session, &answers).unwrap_err();
    assert_eq!(err.error_status(), "PROTOCOL_INVARIANT_VIOLATED");
    assert_eq!(client.server().calls.get(), calls);
    assert_eq!(
        session.verification_card_state(),
        Some(VerificationCardState::Initial)
    );
}

#[test]
fn configuration_checks() {
    let server = ReferenceServer::new();
    server.now.set(NOW + 241);
    let err = client(server).configure_voter_portal(EE).unwrap_err();
    assert!(matches!(err, ClientError::ClientTime { skew_seconds: 241 }));
    assert_eq!(err.error_status(), "CLIENT_TIME_ERROR");

    let server = ReferenceServer::new();
    server.now.set(NOW - 240);
    assert!(client(server).configure_voter_portal(EE).is_ok());

    let server = ReferenceServer::new();
    *server.echo_election_event_id.borrow_mut() = "44caee78ed3d4cf981ca06b659f558eb".to_owned();
    let err = client(server).configure_voter_portal(EE).unwrap_err();
    assert_eq!(err.error_status(), "PROTOCOL_INVARIANT_VIOLATED");
}

#[test]
fn mismatched_authentication_response() {
    let server = ReferenceServer::new();
    *server.echo_election_event_id.borrow_mut() = "44caee78ed3d4cf981ca06b659f558eb".to_owned();
    let client = client(server);

    let mut session = VotingSession::new();
    let err = client
        .authenticate_voter(&mut session, SVK, FACTOR, EE, Identification::Dob)
        .unwrap_err();
    assert_eq!(err.error_status(), "PROTOCOL_INVARIANT_VIOLATED");
    assert!(!session.is_authenticated());
}

#[test]
fn connection_errors() {
    let server = ReferenceServer::new();
    server.offline.set(true);
    let client = client(server);

    let err = client.configure_voter_portal(EE).unwrap_err();
    assert_eq!(err.error_status(), "CONNECTION_ERROR");

    let payload = serde_json::to_value(err.payload()).unwrap();
    assert_eq!(payload["errorStatus"], "CONNECTION_ERROR");
    assert!(payload.get("numberOfRemainingAttempts").is_none());
}
