use super::*;

pub fn command_configure(matches: &clap::ArgMatches, client: &Client) {
    // Unwrap is OK, the arg is required
    let election_event_id = expand(matches.value_of("ELECTION-EVENT-ID").unwrap());

    let config = client
        .configure_voter_portal(&election_event_id)
        .unwrap_or_else(|e| fail(e));
    print_json(&config);
    std::process::exit(0);
}

pub fn command_compatible() {
    let compatible = voting_client::is_browser_compatible();
    print_json(&serde_json::json!({ "compatible": compatible }));
    std::process::exit(if compatible { 0 } else { 1 });
}
