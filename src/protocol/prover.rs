use core::{fmt, mem};

use num_bigint::BigUint;
use rand_core::CryptoRngCore;
use tracing::trace;

use super::keypair::KeyPair;
use super::parameters::Parameters;
use super::proof::Proof;
use crate::primitives::SecretScalar;
use crate::primitives::rng::sample_nonzero_below;
use crate::{Error, Result};

/// Observable state of a [`Prover`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProverState {
    /// No round is open; [`Prover::commit`] may be called.
    Idle,
    /// A commitment was issued and its nonce is held until [`Prover::respond`]
    /// or [`Prover::abandon`].
    Committed,
    /// [`Prover::destroy`] was called. Every further operation fails.
    Destroyed,
}

enum Phase {
    Idle,
    Committed(Round),
    Destroyed,
}

/// Nonce `k` and commitment `r` of the open round. The nonce is wiped when
/// the round is dropped.
struct Round {
    nonce: SecretScalar,
    commitment: BigUint,
}

/// Prover side of the Schnorr identification protocol.
///
/// Owns the key pair and at most one open round. [`respond`](Self::respond)
/// takes the round out of the prover before computing anything, so a
/// commitment can be answered exactly once and the nonce is wiped on every
/// exit path.
///
/// # Security
///
/// - Never answer two different challenges for the same commitment; this
///   reveals the private key. The state machine makes it impossible here
/// - Use one `Prover` per session; mutation goes through `&mut self`
/// - Draw nonces from a cryptographically secure generator such as
///   [`SecureRng`](crate::SecureRng)
pub struct Prover {
    key_pair: KeyPair,
    phase: Phase,
}

impl Prover {
    /// Creates an idle prover that owns `key_pair`.
    pub fn new(key_pair: KeyPair) -> Self {
        Self {
            key_pair,
            phase: Phase::Idle,
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> ProverState {
        match self.phase {
            Phase::Idle => ProverState::Idle,
            Phase::Committed(_) => ProverState::Committed,
            Phase::Destroyed => ProverState::Destroyed,
        }
    }

    /// Returns the public key `y` being proven.
    pub fn public_key(&self) -> &BigUint {
        self.key_pair.public_key()
    }

    /// Returns the group parameters.
    pub fn parameters(&self) -> &Parameters {
        self.key_pair.parameters()
    }

    /// First move: samples a nonce `k` in `[1, q - 1]` and returns `r = g^k mod p`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolState`] unless the prover is idle, and
    /// [`Error::RandomnessUnavailable`] if `rng` fails.
    pub fn commit<R: CryptoRngCore + ?Sized>(&mut self, rng: &mut R) -> Result<BigUint> {
        match self.phase {
            Phase::Idle => {}
            Phase::Committed(_) => {
                return Err(Error::ProtocolState(
                    "commit called while a round is open; respond or abandon first".to_string(),
                ));
            }
            Phase::Destroyed => return Err(destroyed()),
        }

        let params = self.key_pair.parameters();
        let k = sample_nonzero_below(rng, params.q())?;
        let commitment = params.g().modpow(&k, params.p());

        self.phase = Phase::Committed(Round {
            nonce: SecretScalar::new(k),
            commitment: commitment.clone(),
        });
        trace!("opened protocol round");

        Ok(commitment)
    }

    /// Third move: answers challenge `c` with `s = (k + c*x) mod q`.
    ///
    /// The round is closed whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolState`] if no round is open or the prover was
    /// destroyed, and [`Error::InvalidChallenge`] if `c >= q`.
    pub fn respond(&mut self, challenge: &BigUint) -> Result<Proof> {
        let Round { nonce, commitment } = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Committed(round) => round,
            Phase::Idle => {
                return Err(Error::ProtocolState(
                    "respond called without an open commitment".to_string(),
                ));
            }
            Phase::Destroyed => {
                self.phase = Phase::Destroyed;
                return Err(destroyed());
            }
        };

        let q = self.key_pair.parameters().q();
        if challenge >= q {
            return Err(Error::InvalidChallenge(
                "challenge must be smaller than q; round discarded".to_string(),
            ));
        }

        let cx = self.key_pair.scale(challenge)?;
        let response = nonce
            .with_value(|k| (k + &cx) % q)
            .ok_or_else(|| Error::ProtocolState("round nonce is no longer available".to_string()))?;
        drop(nonce);
        trace!("closed protocol round");

        Ok(Proof::new(commitment, challenge.clone(), response))
    }

    /// Discards the open round without responding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtocolState`] unless a round is open.
    pub fn abandon(&mut self) -> Result<()> {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Committed(round) => {
                drop(round);
                trace!("abandoned protocol round");
                Ok(())
            }
            Phase::Idle => Err(Error::ProtocolState(
                "abandon called without an open commitment".to_string(),
            )),
            Phase::Destroyed => {
                self.phase = Phase::Destroyed;
                Err(destroyed())
            }
        }
    }

    /// Wipes any open round and the private key. Idempotent.
    pub fn destroy(&mut self) {
        self.phase = Phase::Destroyed;
        self.key_pair.destroy();
    }
}

impl fmt::Debug for Prover {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prover")
            .field("public_key", &format_args!("{:x}", self.key_pair.public_key()))
            .field("state", &self.state())
            .finish()
    }
}

fn destroyed() -> Error {
    Error::ProtocolState("prover has been destroyed".to_string())
}
