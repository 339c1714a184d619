use clap::{App, Arg, SubCommand};
use log::LevelFilter;
use serde::Serialize;
use voting_client::{ClientError, VotingClient};

mod command_authenticate;
mod command_configure;
mod command_vote;
mod config;
mod rest;

use command_authenticate::*;
use command_configure::*;
use command_vote::*;
use config::Config;
use rest::HttpVotingServer;

pub type Client = VotingClient<HttpVotingServer>;

fn main() {
    let voter_args = [
        Arg::with_name("ELECTION-EVENT-ID")
            .index(1)
            .required(true)
            .help("Election event id, 32 hexadecimal characters"),
        Arg::with_name("start-voting-key")
            .long("start-voting-key")
            .takes_value(true)
            .required(true)
            .help("The 24-character start voting key from the voting card"),
        Arg::with_name("extended-factor")
            .long("extended-factor")
            .takes_value(true)
            .required(true)
            .help("Year or date of birth, as the election asks for it"),
    ];

    let matches = App::new("Voting Client CLI")
        .version("1.0")
        .author("Patrick Hayes <patrick.d.hayes@gmail.com>")
        .about("Votes against a voting server")
        .arg(
            Arg::with_name("uri")
                .long("uri")
                .takes_value(true)
                .help("Set the voting server uri - can also be set with VOTING_CLIENT_URI")
                .required(false),
        )
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .help("Sets the level of verbosity"),
        )
        .subcommand(
            SubCommand::with_name("configure")
                .about("Print the voter portal configuration of an election event")
                .arg(
                    Arg::with_name("ELECTION-EVENT-ID")
                        .index(1)
                        .required(true)
                        .help("Election event id, 32 hexadecimal characters"),
                ),
        )
        .subcommand(
            SubCommand::with_name("compatible")
                .about("Check the cryptographic primitives work on this platform"),
        )
        .subcommand(
            SubCommand::with_name("authenticate")
                .about("Authenticate with a voting card and print its state")
                .args(&voter_args),
        )
        .subcommand(
            SubCommand::with_name("vote")
                .about("Send the answers in a JSON file and print the choice return codes")
                .args(&voter_args)
                .arg(
                    Arg::with_name("ANSWERS")
                        .index(2)
                        .required(true)
                        .help("Voter answers in JSON format"),
                )
                .arg(
                    Arg::with_name("ballot-casting-key")
                        .long("ballot-casting-key")
                        .takes_value(true)
                        .help("Confirm the vote with this ballot casting key"),
                ),
        )
        .subcommand(
            SubCommand::with_name("confirm")
                .about("Confirm a vote already sent")
                .args(&voter_args)
                .arg(
                    Arg::with_name("ballot-casting-key")
                        .long("ballot-casting-key")
                        .takes_value(true)
                        .required(true)
                        .help("The 9-digit ballot casting key from the voting card"),
                ),
        )
        .get_matches();

    let level = match matches.occurrences_of("v") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter(None, level)
        .target(env_logger::Target::Stderr)
        .init();

    let mut config = Config::from_env().unwrap_or_else(|e| {
        eprintln!("voting-client: {}", e);
        std::process::exit(1);
    });
    if let Some(uri) = matches.value_of("uri") {
        config.uri = uri.to_owned();
    }
    log::info!("URI: {}", config.uri);

    let client = VotingClient::new(HttpVotingServer::new(&config.uri), config.client_config());

    // Subcommands
    if let Some(matches) = matches.subcommand_matches("configure") {
        command_configure(matches, &client);
    }
    if matches.subcommand_matches("compatible").is_some() {
        command_compatible();
    }
    if let Some(matches) = matches.subcommand_matches("authenticate") {
        command_authenticate(matches, &client);
    }
    if let Some(matches) = matches.subcommand_matches("vote") {
        command_vote(matches, &client);
    }
    if let Some(matches) = matches.subcommand_matches("confirm") {
        command_confirm(matches, &client);
    }
}

pub fn expand(input: &str) -> String {
    shellexpand::full(input)
        .unwrap_or_else(|e| {
            eprintln!("voting-client: cannot expand {}: {}", input, e);
            std::process::exit(1);
        })
        .into_owned()
}

pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("voting-client: cannot print result: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the error payload on stderr and exit
pub fn fail(error: ClientError) -> ! {
    match serde_json::to_string_pretty(&error.payload()) {
        Ok(json) => eprintln!("{}", json),
        Err(_) => eprintln!("voting-client: {}", error),
    }
    std::process::exit(2);
}
