//! Parameter search with explicit bounds and cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use num_bigint::BigUint;
use num_traits::One;
use rand_core::CryptoRngCore;
use tracing::{debug, trace};

use super::parameters::Parameters;
use crate::config::GenerationConfig;
use crate::primitives::prime::{is_probable_prime, prime_candidate};
use crate::primitives::rng::sample_range;
use crate::{Error, Result};

/// Largest subgroup order accepted by the search, in bits.
pub const MAX_SEARCH_BITS: u64 = 8192;

/// Shared flag that stops a running parameter search.
///
/// Clones observe the same flag, so one copy can be handed to a signal
/// handler while another drives the search.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. The search stops at its next candidate.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

pub(crate) struct ParameterSearch<'a> {
    config: &'a GenerationConfig,
    cancel: &'a CancelToken,
}

impl<'a> ParameterSearch<'a> {
    pub(crate) fn new(config: &'a GenerationConfig, cancel: &'a CancelToken) -> Result<Self> {
        config.validate()?;

        if config.bits < 2 {
            return Err(Error::ParameterGeneration(format!(
                "subgroup order needs at least 2 bits, requested {}",
                config.bits
            )));
        }

        if config.bits > MAX_SEARCH_BITS {
            return Err(Error::ParameterGeneration(format!(
                "subgroup order is limited to {MAX_SEARCH_BITS} bits, requested {}",
                config.bits
            )));
        }

        Ok(Self { config, cancel })
    }

    pub(crate) fn run<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> Result<Parameters> {
        let started = Instant::now();
        debug!(bits = self.config.bits, "starting parameter search");

        let q = self.find_subgroup_order(rng)?;
        let (p, cofactor) = self.find_modulus(&q, rng)?;
        let g = self.find_generator(&p, &q, rng)?;

        debug!(
            q_bits = q.bits(),
            p_bits = p.bits(),
            %cofactor,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "parameter search finished"
        );

        Ok(Parameters::from_generated(p, q, g))
    }

    fn find_subgroup_order<R: CryptoRngCore + ?Sized>(&self, rng: &mut R) -> Result<BigUint> {
        for attempt in 1..=self.config.max_prime_candidates {
            self.cancel.checkpoint()?;

            let candidate = prime_candidate(rng, self.config.bits)?;
            if is_probable_prime(&candidate, self.config.primality_rounds, rng)? {
                trace!(attempt, "found subgroup order");
                return Ok(candidate);
            }
        }

        Err(Error::ParameterGeneration(format!(
            "no {}-bit prime among {} candidates",
            self.config.bits, self.config.max_prime_candidates
        )))
    }

    fn find_modulus<R: CryptoRngCore + ?Sized>(
        &self,
        q: &BigUint,
        rng: &mut R,
    ) -> Result<(BigUint, BigUint)> {
        let one = BigUint::one();
        let mut cofactor = BigUint::from(2u8);

        for _ in 0..self.config.max_cofactor_steps {
            self.cancel.checkpoint()?;

            let p = &cofactor * q + &one;
            if is_probable_prime(&p, self.config.primality_rounds, rng)? {
                trace!(%cofactor, "found modulus");
                return Ok((p, cofactor));
            }
            cofactor += &one;
        }

        Err(Error::ParameterGeneration(format!(
            "no prime p = k*q + 1 for k in [2, {}]",
            self.config.max_cofactor_steps + 1
        )))
    }

    fn find_generator<R: CryptoRngCore + ?Sized>(
        &self,
        p: &BigUint,
        q: &BigUint,
        rng: &mut R,
    ) -> Result<BigUint> {
        let one = BigUint::one();
        let two = BigUint::from(2u8);
        let exponent = (p - &one) / q;
        let upper = p - &two;

        for attempt in 1..=self.config.max_generator_attempts {
            self.cancel.checkpoint()?;

            let h = sample_range(rng, &two, &upper)?;
            let g = h.modpow(&exponent, p);
            if g != one {
                trace!(attempt, "found generator");
                return Ok(g);
            }
        }

        Err(Error::ParameterGeneration(format!(
            "no generator among {} random bases",
            self.config.max_generator_attempts
        )))
    }
}

/// Parameter search running on the blocking thread pool.
///
/// The search draws from a [`SecureRng`](crate::SecureRng) and can be
/// cancelled from any task while it runs. Dropping the handle before
/// [`join`](Self::join) completes cancels the search.
///
/// ```rust,no_run
/// use schnorr_zkp::{GenerationConfig, SearchHandle};
///
/// # async fn run() -> schnorr_zkp::Result<()> {
/// let handle = SearchHandle::spawn(GenerationConfig::with_bits(256));
/// let params = handle.join().await?;
/// println!("{params}");
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct SearchHandle {
    cancel: CancelToken,
    task: Option<tokio::task::JoinHandle<Result<Parameters>>>,
}

#[cfg(feature = "async")]
impl SearchHandle {
    /// Starts a search on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(config: GenerationConfig) -> Self {
        Self::spawn_with(config, CancelToken::new())
    }

    /// Starts a search that observes an existing token.
    pub fn spawn_with(config: GenerationConfig, cancel: CancelToken) -> Self {
        let token = cancel.clone();
        let task = tokio::task::spawn_blocking(move || {
            let mut rng = crate::SecureRng::try_new()?;
            Parameters::generate_with(&config, &mut rng, &token)
        });

        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Requests cancellation of the running search.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns a token that cancels this search.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Waits for the search to finish.
    ///
    /// # Errors
    ///
    /// Returns the search's own error, or [`Error::ParameterGeneration`] if the
    /// worker panicked.
    pub async fn join(mut self) -> Result<Parameters> {
        let Some(task) = self.task.as_mut() else {
            return Err(Error::ParameterGeneration(
                "parameter search was already joined".to_string(),
            ));
        };

        let outcome = task.await;
        self.task = None;
        outcome.map_err(|e| {
            Error::ParameterGeneration(format!("parameter search task failed: {e}"))
        })?
    }
}

#[cfg(feature = "async")]
impl Drop for SearchHandle {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.cancel.cancel();
        }
    }
}
