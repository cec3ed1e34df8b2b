use core::fmt;

use num_bigint::BigUint;

use super::parameters::Parameters;
use crate::{Error, Result};

/// Transcript `(r, c, s)` of one protocol run.
///
/// A proof is plain data. Whether it convinces anyone is decided by
/// [`Verifier::check`](crate::Verifier::check), never at construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    commitment: BigUint,
    challenge: BigUint,
    response: BigUint,
}

impl Proof {
    /// Creates a proof from commitment `r`, challenge `c` and response `s`.
    pub fn new(commitment: BigUint, challenge: BigUint, response: BigUint) -> Self {
        Self {
            commitment,
            challenge,
            response,
        }
    }

    /// Returns the commitment `r`.
    pub fn commitment(&self) -> &BigUint {
        &self.commitment
    }

    /// Returns the challenge `c`.
    pub fn challenge(&self) -> &BigUint {
        &self.challenge
    }

    /// Returns the response `s`.
    pub fn response(&self) -> &BigUint {
        &self.response
    }

    /// Serializes the proof for the given group.
    ///
    /// Format: `r || c || s`, with `r` in `element_len` bytes and `c`, `s` in
    /// `scalar_len` bytes each, all big-endian.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] if a value is not reduced for `params`.
    pub fn to_bytes(&self, params: &Parameters) -> Result<Vec<u8>> {
        let mut result = Vec::with_capacity(params.element_len() + 2 * params.scalar_len());
        result.extend_from_slice(&params.encode_element(&self.commitment)?);
        result.extend_from_slice(&params.encode_scalar(&self.challenge)?);
        result.extend_from_slice(&params.encode_scalar(&self.response)?);
        Ok(result)
    }

    /// Deserializes a proof produced by [`to_bytes`](Self::to_bytes).
    ///
    /// Every field is range-checked; the proof still has to be verified.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] for a wrong length or an out-of-range field.
    pub fn from_bytes(params: &Parameters, bytes: &[u8]) -> Result<Self> {
        let element_len = params.element_len();
        let scalar_len = params.scalar_len();
        let expected = element_len + 2 * scalar_len;

        if bytes.len() != expected {
            return Err(Error::InvalidEncoding(format!(
                "proof: expected {expected} bytes, got {}",
                bytes.len()
            )));
        }

        let (r_bytes, rest) = bytes.split_at(element_len);
        let (c_bytes, s_bytes) = rest.split_at(scalar_len);

        Ok(Self {
            commitment: params.decode_element(r_bytes)?,
            challenge: params.decode_scalar(c_bytes)?,
            response: params.decode_scalar(s_bytes)?,
        })
    }
}

impl fmt::Display for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Proof {{r = {:x}, c = {:x}, s = {:x}}}",
            self.commitment, self.challenge, self.response
        )
    }
}
