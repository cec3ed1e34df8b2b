//! Low-level building blocks for the Schnorr protocol.
//!
//! - **rng**: secure randomness and uniform sampling over integer ranges
//! - **prime**: Miller-Rabin primality testing and prime candidates
//! - **secret**: wipe-on-release storage for secret scalars
//! - **encoding**: fixed-width big-endian wire encoding

/// Fixed-width big-endian encoding of protocol values.
pub mod encoding;
/// Probabilistic primality testing.
pub mod prime;
/// Cryptographically secure random number generation and sampling.
pub mod rng;
/// Zeroizing storage for secret scalars.
pub mod secret;

pub use prime::{DEFAULT_PRIMALITY_ROUNDS, MIN_PRIMALITY_ROUNDS, is_probable_prime};
pub use rng::SecureRng;
pub use secret::SecretScalar;
