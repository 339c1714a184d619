use voting_client::{Argon2Profile, ClientConfig};

pub const DEFAULT_URI: &str = "http://localhost:8080";

/// CLI settings, read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub uri: String,
    pub argon2_profile: Argon2Profile,
}

impl Config {
    /// Reads VOTING_CLIENT_URI and VOTING_CLIENT_ARGON2_PROFILE
    pub fn from_env() -> Result<Self, String> {
        let uri = std::env::var("VOTING_CLIENT_URI").unwrap_or_else(|_| DEFAULT_URI.to_owned());
        let argon2_profile = match std::env::var("VOTING_CLIENT_ARGON2_PROFILE") {
            Ok(name) => Argon2Profile::from_name(&name)
                .ok_or_else(|| format!("unknown argon2 profile {}", name))?,
            Err(_) => Argon2Profile::default(),
        };

        Ok(Config {
            uri,
            argon2_profile,
        })
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            argon2_profile: self.argon2_profile,
            ..ClientConfig::default()
        }
    }
}
