//! The voter-facing phases: configure, authenticate, send vote, confirm vote.
//!
//! Each phase validates the voter's input, runs its algorithms, derives the
//! authentication challenge for its step, makes one server call and checks the
//! answer before touching the session.

use crate::*;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use log::{debug, warn};
use rand::rngs::OsRng;
use std::time::{SystemTime, UNIX_EPOCH};
use zeroize::Zeroizing;

const EXTENDED_FACTOR_INVALID: &str = "EXTENDED_FACTOR_INVALID";
const TIMESTAMP_MISALIGNMENT: &str = "TIMESTAMP_MISALIGNMENT";
const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

fn system_time() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn skew(a: u64, b: u64) -> u64 {
    if a > b {
        a - b
    } else {
        b - a
    }
}

/// Runs the voting phases against a [`VotingServer`]
pub struct VotingClient<S> {
    server: S,
    config: ClientConfig,
    clock: Box<dyn Fn() -> u64 + Send + Sync>,
}

impl<S: VotingServer> VotingClient<S> {
    pub fn new(server: S, config: ClientConfig) -> Self {
        VotingClient {
            server,
            config,
            clock: Box::new(system_time),
        }
    }

    /// Replace the system clock (unix seconds)
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> u64 + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn server(&self) -> &S {
        &self.server
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn now(&self) -> u64 {
        (self.clock)()
    }

    fn server_error(&self, error: TransportError) -> ClientError {
        match error {
            TransportError::Connection(msg) => ClientError::Connection(msg),
            TransportError::Decode(msg) => {
                warn!("unreadable voting server response: {}", msg);
                ClientError::invariant(format!("unreadable voting server response: {}", msg))
            }
            TransportError::Server { status, body } => {
                let (error_status, remaining_attempts) = match body {
                    Some(body) => {
                        // A correct factor is rejected when the clocks disagree too much
                        let misaligned = body.error_status == EXTENDED_FACTOR_INVALID
                            && body.timestamp.map_or(false, |server_time| {
                                skew(self.now(), server_time)
                                    > self.config.max_authentication_clock_skew
                            });
                        let error_status = if misaligned {
                            TIMESTAMP_MISALIGNMENT.to_owned()
                        } else {
                            body.error_status
                        };
                        (error_status, body.number_of_remaining_attempts)
                    }
                    None => (UNKNOWN_ERROR.to_owned(), None),
                };
                debug!("voting server rejected the request: {} (HTTP {})", error_status, status);

                ClientError::ServerResponse {
                    http_status: status,
                    error_status,
                    remaining_attempts,
                }
            }
        }
    }

    fn challenge(
        &self,
        session: &VotingSession,
        step: AuthenticationStep,
        election_event_id: &str,
    ) -> Result<AuthenticationChallenge, ClientError> {
        let start_voting_key = session.start_voting_key()?;
        let (extended_factor, identification) = session.extended_factor()?;
        Ok(get_authentication_challenge(
            self.config.argon2_profile,
            step,
            election_event_id,
            start_voting_key,
            extended_factor,
            identification,
            self.now(),
            &mut OsRng,
        )?)
    }

    /// Load the voter portal configuration of an election event
    pub fn configure_voter_portal(
        &self,
        election_event_id: &str,
    ) -> Result<VoterPortalConfig, ClientError> {
        validate_identifier(election_event_id, "election event id")?;

        let response = self
            .server
            .get_voter_portal_configuration(election_event_id)
            .map_err(|e| self.server_error(e))?;

        let skew_seconds = skew(self.now(), response.timestamp);
        if skew_seconds > self.config.max_configuration_clock_skew {
            warn!("client clock is {} seconds off the voting server clock", skew_seconds);
            return Err(ClientError::ClientTime { skew_seconds });
        }
        if response.election_event_id != election_event_id {
            warn!("voter portal configuration is for another election event");
            return Err(ClientError::invariant(
                "voter portal configuration is for another election event",
            ));
        }

        let bytes = BASE64
            .decode(&response.configuration)
            .map_err(Error::from)?;
        let json = String::from_utf8(bytes)
            .map_err(|_| ClientError::invariant("voter portal configuration is not UTF-8"))?;
        let config: VoterPortalConfig = serde_json::from_str(&json).map_err(Error::from)?;

        debug!("voter portal configured for election event {}", election_event_id);
        Ok(config)
    }

    /// Authenticate the voter and load their voting card into `session`
    ///
    /// The session is replaced only once the server response checks out.
    pub fn authenticate_voter(
        &self,
        session: &mut VotingSession,
        start_voting_key: &str,
        extended_factor: &str,
        election_event_id: &str,
        identification: Identification,
    ) -> Result<AuthenticateVoterResult, ClientError> {
        validate_start_voting_key(start_voting_key)?;
        validate_extended_factor(extended_factor, identification)?;
        validate_identifier(election_event_id, "election event id")?;

        let mut next = VotingSession::new();
        next.start_voting_key = Some(Zeroizing::new(start_voting_key.to_owned()));
        next.extended_factor = Some(Zeroizing::new(extended_factor.to_owned()));
        next.identification = Some(identification);

        let challenge = self.challenge(&next, AuthenticationStep::AuthenticateVoter, election_event_id)?;
        let credential_id = challenge.derived_voter_identifier.clone();
        let payload = AuthenticateVoterPayload {
            election_event_id: election_event_id.to_owned(),
            authentication_challenge: challenge,
        };

        debug!("authenticating credential {}", credential_id);
        let response = self
            .server
            .authenticate_voter(&credential_id, &payload)
            .map_err(|e| self.server_error(e))?;
        if let Err(e) = response.validate(election_event_id, &credential_id) {
            warn!("rejected authentication response: {}", e);
            return Err(e);
        }

        let state = response.verification_card_state;
        let mut result = AuthenticateVoterResult {
            verification_card_state: state,
            voting_card_id: response.voter_authentication_data.voting_card_id.clone(),
            ballot: None,
            short_choice_return_codes: None,
            short_vote_cast_return_code: None,
        };

        if let Some(material) = response.voter_material {
            let params = material.primitives_params();
            params.validate()?;
            let k_id = get_key(
                &params.encryption_group,
                self.config.argon2_profile,
                start_voting_key,
                &material.verification_card_keystore,
            )?;

            if state == VerificationCardState::Sent {
                let codes = response.short_choice_return_codes.unwrap_or_default();
                let psi = get_psi(&params.primes_mapping_table);
                if codes.len() != psi {
                    warn!("expected {} short choice return codes, got {}", psi, codes.len());
                    return Err(ClientError::invariant(format!(
                        "expected {} short choice return codes, found {}",
                        psi,
                        codes.len()
                    )));
                }
                result.short_choice_return_codes = Some(codes.clone());
                next.short_choice_return_codes = codes;
            }

            result.ballot = Some(material.ballot);
            next.primitives_params = Some(params);
            next.set_secret_key(&k_id);
        }

        if state == VerificationCardState::Confirmed {
            result.short_vote_cast_return_code = response.short_vote_cast_return_code;
        }

        next.authentication_data = Some(response.voter_authentication_data);
        next.state = Some(state);
        *session = next;

        debug!("voter authenticated, verification card state {:?}", state);
        Ok(result)
    }

    /// Encrypt and send the voter's answers, returning the choice return codes
    pub fn send_vote(
        &self,
        session: &mut VotingSession,
        answers: &VoterAnswers,
    ) -> Result<SendVoteResult, ClientError> {
        if session.state != Some(VerificationCardState::Initial) {
            return Err(ClientError::invariant(
                "a vote can only be sent for a verification card in state INITIAL",
            ));
        }
        let data = session.require_authentication_data()?;
        let params = session.require_primitives_params()?;
        let k_id = session.require_secret_key()?;
        let table = &params.primes_mapping_table;

        let translated = translate_voter_answers(table, answers)?;
        let vote = create_vote(
            params,
            &data.election_event_id,
            &data.verification_card_id,
            &translated.selected_actual_voting_options,
            &translated.selected_write_ins,
            &k_id,
            &mut OsRng,
        )?;

        let challenge = self.challenge(session, AuthenticationStep::SendVote, &data.election_event_id)?;
        let payload = SendVotePayload {
            context_ids: data.context_ids(),
            voting_card_id: data.voting_card_id.clone(),
            encrypted_verifiable_vote: vote,
            authentication_challenge: challenge,
        };

        debug!("sending vote for verification card {}", data.verification_card_id);
        let response = self
            .server
            .send_vote(data, &payload)
            .map_err(|e| self.server_error(e))?;

        let codes = response.short_choice_return_codes;
        let psi = get_psi(table);
        if codes.len() != psi {
            warn!("expected {} short choice return codes, got {}", psi, codes.len());
            return Err(ClientError::invariant(format!(
                "expected {} short choice return codes, found {}",
                psi,
                codes.len()
            )));
        }
        for code in codes.iter() {
            validate_short_choice_return_code(code)?;
        }

        let semantic = get_semantic_information(table, &translated.selected_actual_voting_options)?;
        let choice_return_codes = translated
            .selected_actual_voting_options
            .iter()
            .zip(semantic)
            .zip(codes.iter())
            .map(|((actual, semantic), code)| ChoiceReturnCode {
                actual_voting_option: actual.clone(),
                semantic_information: semantic,
                short_choice_return_code: code.clone(),
            })
            .collect();

        session.state = Some(VerificationCardState::Sent);
        session.selected_actual_voting_options = translated.selected_actual_voting_options;
        session.short_choice_return_codes = codes;

        debug!("vote sent");
        Ok(SendVoteResult {
            choice_return_codes,
        })
    }

    /// Confirm the sent vote with the voter's ballot casting key
    pub fn confirm_vote(
        &self,
        session: &mut VotingSession,
        ballot_casting_key: &str,
    ) -> Result<ConfirmVoteResult, ClientError> {
        validate_ballot_casting_key(ballot_casting_key)?;
        if session.state != Some(VerificationCardState::Sent) {
            return Err(ClientError::invariant(
                "only a verification card in state SENT can be confirmed",
            ));
        }
        let data = session.require_authentication_data()?;
        let params = session.require_primitives_params()?;
        let k_id = session.require_secret_key()?;

        let confirmation_key =
            create_confirm_message(&params.encryption_group, ballot_casting_key, &k_id)?;

        let challenge = self.challenge(session, AuthenticationStep::ConfirmVote, &data.election_event_id)?;
        let payload = ConfirmVotePayload {
            context_ids: data.context_ids(),
            voting_card_id: data.voting_card_id.clone(),
            confirmation_key,
            authentication_challenge: challenge,
        };

        debug!("confirming vote for verification card {}", data.verification_card_id);
        let response = self
            .server
            .confirm_vote(data, &payload)
            .map_err(|e| self.server_error(e))?;
        validate_short_vote_cast_return_code(&response.short_vote_cast_return_code)?;

        session.state = Some(VerificationCardState::Confirmed);

        debug!("vote confirmed");
        Ok(ConfirmVoteResult {
            short_vote_cast_return_code: response.short_vote_cast_return_code,
        })
    }
}

/// Check that the primitives the voting phases rely on work on this platform
///
/// Never panics; any failure reports `false`.
pub fn is_browser_compatible() -> bool {
    use aes_gcm::aead::{Aead, KeyInit};
    use aes_gcm::{Aes256Gcm, Key, Nonce};
    use argon2::{Algorithm, Argon2, Params, Version};

    let self_test = || -> Option<()> {
        let params = Params::new(Params::MIN_M_COST, 1, 1, Some(32)).ok()?;
        let mut key = [0u8; 32];
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password_into(b"compatibility", b"voting-client-salt", &mut key)
            .ok()?;

        let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
        let nonce = [0u8; 12];
        let sealed = cipher.encrypt(Nonce::from_slice(&nonce), &b"ok"[..]).ok()?;
        let opened = cipher.decrypt(Nonce::from_slice(&nonce), &sealed[..]).ok()?;
        if opened != b"ok" {
            return None;
        }

        if recursive_hash(&"".into()).len() != HASH_LENGTH {
            return None;
        }
        Some(())
    };

    match std::panic::catch_unwind(self_test) {
        Ok(Some(())) => true,
        _ => false,
    }
}
