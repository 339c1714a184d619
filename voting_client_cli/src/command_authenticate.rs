use super::*;
use voting_client::{AuthenticateVoterResult, VotingSession};

/// Load the portal configuration, then authenticate into `session`
///
/// The identification the extended factor stands for comes from the portal
/// configuration, as it does for the voter portal.
pub fn authenticate(
    matches: &clap::ArgMatches,
    client: &Client,
    session: &mut VotingSession,
) -> AuthenticateVoterResult {
    // Unwraps are OK, all these args are required
    let election_event_id = expand(matches.value_of("ELECTION-EVENT-ID").unwrap());
    let start_voting_key = matches.value_of("start-voting-key").unwrap();
    let extended_factor = matches.value_of("extended-factor").unwrap();

    let portal = client
        .configure_voter_portal(&election_event_id)
        .unwrap_or_else(|e| fail(e));

    client
        .authenticate_voter(
            session,
            start_voting_key,
            extended_factor,
            &election_event_id,
            portal.identification,
        )
        .unwrap_or_else(|e| fail(e))
}

pub fn command_authenticate(matches: &clap::ArgMatches, client: &Client) {
    let mut session = VotingSession::new();
    let result = authenticate(matches, client, &mut session);
    print_json(&result);
    std::process::exit(0);
}
