#[macro_use]
extern crate serde;

mod answers;
mod authn;
mod config;
mod confirm;
mod elgamal;
mod error;
mod group;
mod hash;
mod kdf;
mod keystore;
mod messages;
mod primes_mapping_table;
mod process;
mod serde_hex;
mod server;
mod session;
mod validation;
mod vote;
mod voting_options;
mod write_in;
mod zkp;

pub use answers::*;
pub use authn::*;
pub use config::*;
pub use confirm::*;
pub use elgamal::*;
pub use error::*;
pub use group::*;
pub use hash::*;
pub use kdf::*;
pub use keystore::*;
pub use messages::*;
pub use primes_mapping_table::*;
pub use process::*;
pub use serde_hex::*;
pub use server::*;
pub use session::*;
pub use validation::*;
pub use vote::*;
pub use voting_options::*;
pub use write_in::*;
pub use zkp::*;

#[cfg(test)]
mod tests;
