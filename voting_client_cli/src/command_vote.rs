use super::*;
use crate::command_authenticate::authenticate;
use voting_client::{VerificationCardState, VoterAnswers, VotingSession};

pub fn command_vote(matches: &clap::ArgMatches, client: &Client) {
    // Unwrap is OK, the arg is required
    let filename = expand(matches.value_of("ANSWERS").unwrap());
    let file_bytes = std::fs::read(&filename).unwrap_or_else(|e| {
        eprintln!("voting-client vote: unable to read {}: {}", filename, e);
        std::process::exit(1);
    });
    let answers: VoterAnswers = serde_json::from_slice(&file_bytes).unwrap_or_else(|e| {
        eprintln!("voting-client vote: unable to read {}: {}", filename, e);
        std::process::exit(1);
    });

    let mut session = VotingSession::new();
    let authenticated = authenticate(matches, client, &mut session);
    if authenticated.verification_card_state != VerificationCardState::Initial {
        eprintln!("voting-client vote: this voting card has already voted");
        print_json(&authenticated);
        std::process::exit(1);
    }

    let sent = client
        .send_vote(&mut session, &answers)
        .unwrap_or_else(|e| fail(e));

    // Without a ballot casting key the voter checks the codes first
    let ballot_casting_key = match matches.value_of("ballot-casting-key") {
        Some(key) => key,
        None => {
            print_json(&sent);
            std::process::exit(0);
        }
    };

    let confirmed = client
        .confirm_vote(&mut session, ballot_casting_key)
        .unwrap_or_else(|e| fail(e));
    print_json(&serde_json::json!({
        "choiceReturnCodes": sent.choice_return_codes,
        "shortVoteCastReturnCode": confirmed.short_vote_cast_return_code,
    }));
    std::process::exit(0);
}

pub fn command_confirm(matches: &clap::ArgMatches, client: &Client) {
    // Unwrap is OK, the arg is required
    let ballot_casting_key = matches.value_of("ballot-casting-key").unwrap();

    let mut session = VotingSession::new();
    let authenticated = authenticate(matches, client, &mut session);
    if authenticated.verification_card_state != VerificationCardState::Sent {
        eprintln!("voting-client confirm: there is no sent vote to confirm");
        print_json(&authenticated);
        std::process::exit(1);
    }

    let confirmed = client
        .confirm_vote(&mut session, ballot_casting_key)
        .unwrap_or_else(|e| fail(e));
    print_json(&confirmed);
    std::process::exit(0);
}
