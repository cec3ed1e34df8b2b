/// Key pair `(x, y = g^x mod p)`.
pub mod keypair;
/// Group parameters `(p, q, g)`.
pub mod parameters;
/// Proof transcript `(r, c, s)`.
pub mod proof;
/// Stateful prover.
pub mod prover;
/// Bounded, cancellable parameter search.
pub mod search;
/// Transcript simulator for the zero-knowledge property.
pub mod simulator;
/// Stateless verifier.
pub mod verifier;

pub use keypair::KeyPair;
pub use parameters::{ParameterOrigin, Parameters};
pub use proof::Proof;
pub use prover::{Prover, ProverState};
#[cfg(feature = "async")]
pub use search::SearchHandle;
pub use search::CancelToken;
pub use simulator::Simulator;
pub use verifier::Verifier;
