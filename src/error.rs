//! Error types for the Schnorr identification protocol.
//!
//! A rejected proof is not an error: [`Verifier::check`](crate::Verifier::check)
//! returns `false` for that. The variants here cover misuse, exhausted
//! searches and unusable inputs.

/// Main error type for the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The bounded parameter search gave up, or the request cannot be satisfied.
    #[error("Parameter generation failed: {0}")]
    ParameterGeneration(String),

    /// The parameter search was cancelled through its [`CancelToken`](crate::CancelToken).
    #[error("Parameter generation was cancelled")]
    Cancelled,

    /// Externally supplied group parameters violate a group invariant.
    #[error("Invalid group parameters: {0}")]
    InvalidParams(String),

    /// A private key is outside the range `(0, q)`.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// A prover operation was invoked in the wrong state.
    #[error("Protocol state violation: {0}")]
    ProtocolState(String),

    /// A challenge handed to the prover is not in `[0, q)`.
    #[error("Invalid challenge: {0}")]
    InvalidChallenge(String),

    /// The key pair has been zeroized and can no longer be used.
    #[error("Key pair has been destroyed")]
    KeyDestroyed,

    /// No cryptographically secure randomness could be obtained.
    #[error("Secure randomness unavailable: {0}")]
    RandomnessUnavailable(String),

    /// Wire bytes could not be decoded.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// A generation configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two transcripts cannot be combined for secret extraction.
    #[error("Invalid transcript: {0}")]
    InvalidTranscript(String),
}

impl From<rand_core::Error> for Error {
    fn from(err: rand_core::Error) -> Self {
        Error::RandomnessUnavailable(err.to_string())
    }
}
