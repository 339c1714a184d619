use thiserror::Error;

/// Error types raised by the voting client algorithms
#[derive(Debug, Error)]
pub enum Error {
    #[error("voting_client: invalid argument: {0}")]
    InvalidArgument(String),

    #[error("voting_client: not found: {0}")]
    NotFound(String),

    #[error("voting_client: {0}")]
    Validation(#[from] ValidationError),

    #[error("voting_client: key derivation failed: {0}")]
    Kdf(String),

    #[error("voting_client: failed to decrypt the verification card keystore")]
    KeystoreDecryption,

    #[error("voting_client: invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("voting_client: JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArgument(msg.into())
    }
}

/// Voter input validation errors
///
/// These are the only errors a voter can fix by retyping something, so each one
/// carries its own error status.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("the start voting key must be 24 characters from the start voting key alphabet")]
    StartVotingKeyInvalid,

    #[error("the extended authentication factor must be {0} digits")]
    ExtendedFactorInvalid(usize),

    #[error("the ballot casting key must be {expected} digits long, found {found}")]
    BallotCastingKeyLength { expected: usize, found: usize },

    #[error("the ballot casting key must contain only digits")]
    BallotCastingKeyNotNumeric,

    #[error("the ballot casting key must contain at least one non-zero digit")]
    BallotCastingKeyAllZero,

    #[error("invalid write-in: {0}")]
    WriteInInvalid(String),
}

impl ValidationError {
    /// Error status reported to the voter-facing layer
    pub fn error_status(&self) -> &'static str {
        match self {
            ValidationError::StartVotingKeyInvalid => "START_VOTING_KEY_INVALID",
            ValidationError::ExtendedFactorInvalid(_) => "EXTENDED_FACTOR_INVALID",
            ValidationError::BallotCastingKeyLength { .. }
            | ValidationError::BallotCastingKeyNotNumeric
            | ValidationError::BallotCastingKeyAllZero => "CONFIRMATION_KEY_INCORRECT",
            ValidationError::WriteInInvalid(_) => "WRITE_IN_INVALID",
        }
    }
}

/// Errors reported by a voting server transport
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no response from the voting server: {0}")]
    Connection(String),

    #[error("voting server answered with HTTP {status}")]
    Server {
        status: u16,
        body: Option<ServerErrorBody>,
    },

    #[error("unreadable voting server response: {0}")]
    Decode(String),
}

/// Error body sent by the voting server alongside a non-success status
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ServerErrorBody {
    pub error_status: String,

    #[serde(default)]
    pub timestamp: Option<u64>,

    #[serde(default)]
    pub number_of_remaining_attempts: Option<u32>,
}

/// Errors surfaced by the phase orchestrators
///
/// None of these are retried by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid voter input: {0}")]
    InputValidation(#[from] ValidationError),

    #[error("protocol invariant violated: {0}")]
    ProtocolInvariant(String),

    #[error("voting server rejected the request with {error_status} (HTTP {http_status})")]
    ServerResponse {
        http_status: u16,
        error_status: String,
        remaining_attempts: Option<u32>,
    },

    #[error("connection to the voting server failed: {0}")]
    Connection(String),

    #[error("client clock differs from the voting server clock by {skew_seconds} seconds")]
    ClientTime { skew_seconds: u64 },
}

impl ClientError {
    pub(crate) fn invariant<S: Into<String>>(msg: S) -> Self {
        ClientError::ProtocolInvariant(msg.into())
    }

    /// Error status code carried to the voter-facing layer
    pub fn error_status(&self) -> &str {
        match self {
            ClientError::InputValidation(e) => e.error_status(),
            ClientError::ProtocolInvariant(_) => "PROTOCOL_INVARIANT_VIOLATED",
            ClientError::ServerResponse { error_status, .. } => error_status,
            ClientError::Connection(_) => "CONNECTION_ERROR",
            ClientError::ClientTime { .. } => "CLIENT_TIME_ERROR",
        }
    }

    /// Serializable form of this error
    pub fn payload(&self) -> ErrorPayload {
        let number_of_remaining_attempts = match self {
            ClientError::ServerResponse {
                remaining_attempts, ..
            } => *remaining_attempts,
            _ => None,
        };

        ErrorPayload {
            error_status: self.error_status().to_owned(),
            message: self.to_string(),
            number_of_remaining_attempts,
        }
    }
}

impl From<Error> for ClientError {
    fn from(e: Error) -> Self {
        match e {
            Error::Validation(v) => ClientError::InputValidation(v),
            other => ClientError::ProtocolInvariant(other.to_string()),
        }
    }
}

/// What a rejected call carries back to the caller
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub error_status: String,
    pub message: String,

    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_remaining_attempts: Option<u32>,
}
