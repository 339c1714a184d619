use crate::*;
use argon2::{Algorithm, Argon2, Params, Version};

pub const ARGON2_OUTPUT_LENGTH: usize = 32;

/// Argon2id cost settings
///
/// Every party deriving the same value must use the same profile.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Argon2Profile {
    Standard,
    LessMemory,
    Test,
}

impl Default for Argon2Profile {
    fn default() -> Self {
        Argon2Profile::LessMemory
    }
}

impl Argon2Profile {
    /// Memory in KiB, iterations, parallelism
    pub fn costs(self) -> (u32, u32, u32) {
        match self {
            Argon2Profile::Standard => (1 << 21, 1, 4),
            Argon2Profile::LessMemory => (1 << 16, 3, 4),
            Argon2Profile::Test => (1 << 14, 1, 4),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(Argon2Profile::Standard),
            "less_memory" => Some(Argon2Profile::LessMemory),
            "test" => Some(Argon2Profile::Test),
            _ => None,
        }
    }
}

/// Argon2id with a 32-byte output
pub fn argon2id(
    profile: Argon2Profile,
    input: &[u8],
    salt: &[u8],
) -> Result<[u8; ARGON2_OUTPUT_LENGTH], Error> {
    let (memory, iterations, parallelism) = profile.costs();
    let params = Params::new(memory, iterations, parallelism, Some(ARGON2_OUTPUT_LENGTH))
        .map_err(|e| Error::Kdf(e.to_string()))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut output = [0u8; ARGON2_OUTPUT_LENGTH];
    argon2
        .hash_password_into(input, salt, &mut output)
        .map_err(|e| Error::Kdf(e.to_string()))?;

    Ok(output)
}
