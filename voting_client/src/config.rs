use crate::*;

/// Tunables of the voting client
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// Must match the profile the election was set up with
    pub argon2_profile: Argon2Profile,

    /// Largest tolerated difference between client and server clocks when
    /// loading the voter portal configuration, in seconds
    pub max_configuration_clock_skew: u64,

    /// Beyond this difference, in seconds, a rejected extended factor is
    /// reported as a clock problem
    pub max_authentication_clock_skew: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            argon2_profile: Argon2Profile::default(),
            max_configuration_clock_skew: 240,
            max_authentication_clock_skew: AUTHENTICATION_TIME_STEP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.argon2_profile, Argon2Profile::LessMemory);
        assert_eq!(config.max_configuration_clock_skew, 240);
        assert_eq!(config.max_authentication_clock_skew, 300);

        let partial: ClientConfig = serde_json::from_str(r#"{"argon2Profile":"test"}"#).unwrap();
        assert_eq!(partial.argon2_profile, Argon2Profile::Test);
        assert_eq!(partial.max_configuration_clock_skew, 240);
    }
}
