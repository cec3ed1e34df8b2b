use core::fmt;

use num_bigint::BigUint;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;
use tracing::warn;

use super::search::{CancelToken, ParameterSearch};
use crate::config::GenerationConfig;
use crate::primitives::encoding::{self, ByteReader};
use crate::primitives::{DEFAULT_PRIMALITY_ROUNDS, is_probable_prime};
use crate::{Error, Result};

/// Serialization format version for [`Parameters::to_bytes`].
const PARAMETERS_VERSION: u8 = 1;

/// Largest accepted length of `p` or `q` in an encoded parameter set (16384 bits).
const MAX_FIELD_LEN: usize = 2048;

/// How a [`Parameters`] instance came to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParameterOrigin {
    /// Produced by [`Parameters::generate`] or [`Parameters::generate_with`].
    Generated,
    /// Supplied externally and validated by [`Parameters::from_components`].
    Imported,
    /// The fixed toy group from [`Parameters::demo`]. Offers no security.
    InsecureDemo,
}

/// Public parameters of the Schnorr group.
///
/// `p` is prime, `q` is a prime dividing `p - 1` with cofactor at least 2, and
/// `g` generates the subgroup of order `q` in `Z_p*`. Every constructor
/// establishes these invariants and nothing mutates them afterwards, so a
/// single instance can be cloned into any number of concurrent sessions.
///
/// # Security
///
/// Only [`ParameterOrigin::Generated`] and [`ParameterOrigin::Imported`]
/// instances are meant for real use. [`Parameters::demo`] exists for
/// deterministic tests and carries an explicit [`ParameterOrigin::InsecureDemo`] tag.
#[derive(Clone, Debug)]
pub struct Parameters {
    p: BigUint,
    q: BigUint,
    g: BigUint,
    origin: ParameterOrigin,
}

impl Parameters {
    /// Generates fresh parameters with a `bits`-bit subgroup order.
    ///
    /// Samples a prime `q`, walks `k = 2, 3, ...` until `p = k*q + 1` is prime,
    /// then draws `h` from `[2, p - 2]` until `g = h^((p - 1) / q) mod p` is not 1.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterGeneration`] if `bits < 2` or a search bound from
    /// [`GenerationConfig::default`] is exhausted, and
    /// [`Error::RandomnessUnavailable`] if `rng` fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use schnorr_zkp::{Parameters, SecureRng};
    ///
    /// let mut rng = SecureRng::new();
    /// let params = Parameters::generate(64, &mut rng).unwrap();
    /// assert_eq!(params.q().bits(), 64);
    /// ```
    pub fn generate<R: CryptoRngCore + ?Sized>(bits: u64, rng: &mut R) -> Result<Self> {
        let config = GenerationConfig::with_bits(bits);
        Self::generate_with(&config, rng, &CancelToken::new())
    }

    /// Generates parameters with explicit search bounds and a cancellation token.
    ///
    /// The token is polled before every candidate; once cancelled the search
    /// stops with [`Error::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a rejected configuration,
    /// [`Error::ParameterGeneration`] when a bound is exhausted,
    /// [`Error::Cancelled`] on cancellation, and [`Error::RandomnessUnavailable`]
    /// if `rng` fails.
    pub fn generate_with<R: CryptoRngCore + ?Sized>(
        config: &GenerationConfig,
        rng: &mut R,
        cancel: &CancelToken,
    ) -> Result<Self> {
        ParameterSearch::new(config, cancel)?.run(rng)
    }

    /// Returns the fixed toy group `p = 23`, `q = 11`, `g = 2`.
    ///
    /// # Security
    ///
    /// A discrete logarithm in this group is found by inspection. Use it only in
    /// tests and walkthroughs; the instance reports [`ParameterOrigin::InsecureDemo`].
    pub fn demo() -> Self {
        warn!("constructing insecure demonstration parameters (p = 23, q = 11, g = 2)");
        Self {
            p: BigUint::from(23u32),
            q: BigUint::from(11u32),
            g: BigUint::from(2u32),
            origin: ParameterOrigin::InsecureDemo,
        }
    }

    /// Validates externally supplied parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if `p` or `q` is not prime, `q` does not
    /// divide `p - 1` with a cofactor of at least 2, or `g` is not an element of
    /// order `q`.
    pub fn from_components<R: CryptoRngCore + ?Sized>(
        p: BigUint,
        q: BigUint,
        g: BigUint,
        rng: &mut R,
    ) -> Result<Self> {
        check_structure(&p, &q, &g)?;

        if !is_probable_prime(&q, DEFAULT_PRIMALITY_ROUNDS, rng)? {
            return Err(Error::InvalidParams("q is not prime".to_string()));
        }

        if !is_probable_prime(&p, DEFAULT_PRIMALITY_ROUNDS, rng)? {
            return Err(Error::InvalidParams("p is not prime".to_string()));
        }

        Ok(Self {
            p,
            q,
            g,
            origin: ParameterOrigin::Imported,
        })
    }

    pub(crate) fn from_generated(p: BigUint, q: BigUint, g: BigUint) -> Self {
        Self {
            p,
            q,
            g,
            origin: ParameterOrigin::Generated,
        }
    }

    /// Returns the prime modulus `p`.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Returns the prime subgroup order `q`.
    pub fn q(&self) -> &BigUint {
        &self.q
    }

    /// Returns the subgroup generator `g`.
    pub fn g(&self) -> &BigUint {
        &self.g
    }

    /// Returns how these parameters were obtained.
    pub fn origin(&self) -> ParameterOrigin {
        self.origin
    }

    /// Returns `true` for the demonstration group.
    pub fn is_insecure(&self) -> bool {
        self.origin == ParameterOrigin::InsecureDemo
    }

    /// Returns `true` if `value` lies in the order-`q` subgroup of `Z_p*`.
    pub fn is_element(&self, value: &BigUint) -> bool {
        !value.is_zero() && value < &self.p && value.modpow(&self.q, &self.p).is_one()
    }

    /// Encoded length of group elements (`p`, `g`, `y`, `r`).
    pub fn element_len(&self) -> usize {
        encoding::byte_len(self.p.bits())
    }

    /// Encoded length of scalars (`q`, `c`, `s`).
    pub fn scalar_len(&self) -> usize {
        encoding::byte_len(self.q.bits())
    }

    /// Encodes a residue modulo `p` in [`element_len`](Self::element_len) bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] if `value >= p`.
    pub fn encode_element(&self, value: &BigUint) -> Result<Vec<u8>> {
        if value >= &self.p {
            return Err(Error::InvalidEncoding(
                "element is not reduced modulo p".to_string(),
            ));
        }
        encoding::to_fixed_be(value, self.element_len())
    }

    /// Encodes a scalar modulo `q` in [`scalar_len`](Self::scalar_len) bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] if `value >= q`.
    pub fn encode_scalar(&self, value: &BigUint) -> Result<Vec<u8>> {
        if value >= &self.q {
            return Err(Error::InvalidEncoding(
                "scalar is not reduced modulo q".to_string(),
            ));
        }
        encoding::to_fixed_be(value, self.scalar_len())
    }

    /// Decodes a nonzero residue modulo `p`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] for a wrong length or a value outside `[1, p - 1]`.
    pub fn decode_element(&self, bytes: &[u8]) -> Result<BigUint> {
        let value = encoding::from_fixed_be(bytes, self.element_len(), "element")?;
        if value.is_zero() || value >= self.p {
            return Err(Error::InvalidEncoding(
                "element must lie in [1, p - 1]".to_string(),
            ));
        }
        Ok(value)
    }

    /// Decodes a scalar modulo `q`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] for a wrong length or a value `>= q`.
    pub fn decode_scalar(&self, bytes: &[u8]) -> Result<BigUint> {
        let value = encoding::from_fixed_be(bytes, self.scalar_len(), "scalar")?;
        if value >= self.q {
            return Err(Error::InvalidEncoding(
                "scalar must lie in [0, q - 1]".to_string(),
            ));
        }
        Ok(value)
    }

    /// Serializes the parameters.
    ///
    /// Format: `[version (1 byte)][p_len (4 bytes)][p][q_len (4 bytes)][q][g (p_len bytes)]`
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let p_bytes = self.p.to_bytes_be();
        let q_bytes = self.q.to_bytes_be();
        let g_bytes = encoding::to_fixed_be(&self.g, p_bytes.len())?;

        let mut result = Vec::with_capacity(9 + 2 * p_bytes.len() + q_bytes.len());
        result.push(PARAMETERS_VERSION);

        result.extend_from_slice(&(p_bytes.len() as u32).to_be_bytes());
        result.extend_from_slice(&p_bytes);

        result.extend_from_slice(&(q_bytes.len() as u32).to_be_bytes());
        result.extend_from_slice(&q_bytes);

        result.extend_from_slice(&g_bytes);

        Ok(result)
    }

    /// Deserializes and fully validates parameters produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`] for malformed bytes and
    /// [`Error::InvalidParams`] if the decoded values do not form a valid group.
    pub fn from_bytes<R: CryptoRngCore + ?Sized>(bytes: &[u8], rng: &mut R) -> Result<Self> {
        let mut reader = ByteReader::new(bytes);

        let version = reader.take_u8("version")?;
        if version != PARAMETERS_VERSION {
            return Err(Error::InvalidEncoding(format!(
                "unsupported parameters version: {version}"
            )));
        }

        let p_len = read_field_len(&mut reader, "p")?;
        let p_bytes = reader.take(p_len, "p")?;
        let q_len = read_field_len(&mut reader, "q")?;
        let q_bytes = reader.take(q_len, "q")?;
        let g_bytes = reader.take(p_len, "g")?;
        reader.finish()?;

        if p_bytes[0] == 0 || q_bytes[0] == 0 {
            return Err(Error::InvalidEncoding(
                "p and q must be encoded without leading zero bytes".to_string(),
            ));
        }

        Self::from_components(
            BigUint::from_bytes_be(p_bytes),
            BigUint::from_bytes_be(q_bytes),
            BigUint::from_bytes_be(g_bytes),
            rng,
        )
    }
}

impl PartialEq for Parameters {
    fn eq(&self, other: &Self) -> bool {
        self.p == other.p && self.q == other.q && self.g == other.g
    }
}

impl Eq for Parameters {}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = if self.is_insecure() {
            " (insecure demo)"
        } else {
            ""
        };
        write!(
            f,
            "Parameters{label} {{\n  p = {:x},\n  q = {:x},\n  g = {:x}\n}}",
            self.p, self.q, self.g
        )
    }
}

fn read_field_len(reader: &mut ByteReader<'_>, field: &str) -> Result<usize> {
    let len = reader.take_u32(field)? as usize;
    if len == 0 || len > MAX_FIELD_LEN {
        return Err(Error::InvalidEncoding(format!("invalid {field} length: {len}")));
    }
    Ok(len)
}

fn check_structure(p: &BigUint, q: &BigUint, g: &BigUint) -> Result<()> {
    let one = BigUint::one();

    if q < &BigUint::from(2u8) {
        return Err(Error::InvalidParams("q must be at least 2".to_string()));
    }

    if p <= q {
        return Err(Error::InvalidParams("p must exceed q".to_string()));
    }

    let p_minus_one = p - &one;
    if !(&p_minus_one % q).is_zero() {
        return Err(Error::InvalidParams("q does not divide p - 1".to_string()));
    }

    if &p_minus_one / q < BigUint::from(2u8) {
        return Err(Error::InvalidParams(
            "cofactor (p - 1) / q must be at least 2".to_string(),
        ));
    }

    if g <= &one || g >= p {
        return Err(Error::InvalidParams("g must lie in (1, p)".to_string()));
    }

    if !g.modpow(q, p).is_one() {
        return Err(Error::InvalidParams(
            "g does not generate the subgroup of order q".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0xC0FFEE)
    }

    #[test]
    fn demo_values() {
        let params = Parameters::demo();
        assert_eq!(params.p(), &BigUint::from(23u32));
        assert_eq!(params.q(), &BigUint::from(11u32));
        assert_eq!(params.g(), &BigUint::from(2u32));
        assert_eq!(params.origin(), ParameterOrigin::InsecureDemo);
        assert!(params.is_insecure());
        assert!(params.to_string().contains("insecure demo"));
    }

    #[test]
    fn generated_parameters_form_a_prime_order_subgroup() {
        let mut rng = rng();
        for bits in [2u64, 3, 16, 48, 96] {
            let params = Parameters::generate(bits, &mut rng).unwrap();
            let one = BigUint::one();

            assert_eq!(params.q().bits(), bits);
            assert_eq!(params.origin(), ParameterOrigin::Generated);
            assert!(is_probable_prime(params.q(), 32, &mut rng).unwrap());
            assert!(is_probable_prime(params.p(), 32, &mut rng).unwrap());
            assert!(((params.p() - &one) % params.q()).is_zero());
            assert!(params.g() != &one);
            assert!(params.g().modpow(params.q(), params.p()).is_one());
        }
    }

    #[test]
    fn generation_rejects_one_bit_order() {
        let mut rng = rng();
        assert!(matches!(
            Parameters::generate(1, &mut rng),
            Err(Error::ParameterGeneration(_))
        ));
    }

    #[test]
    fn from_components_accepts_valid_group() {
        let mut rng = rng();
        let params = Parameters::from_components(
            BigUint::from(23u32),
            BigUint::from(11u32),
            BigUint::from(2u32),
            &mut rng,
        )
        .unwrap();

        assert_eq!(params.origin(), ParameterOrigin::Imported);
        assert_eq!(params, Parameters::demo());
    }

    #[test]
    fn from_components_rejects_broken_structure() {
        let mut rng = rng();
        let cases = [
            (23u32, 7u32, 2u32),
            (23, 22, 5),
            (23, 11, 1),
            (23, 11, 23),
            (23, 11, 5),
        ];

        for (p, q, g) in cases {
            let result = Parameters::from_components(
                BigUint::from(p),
                BigUint::from(q),
                BigUint::from(g),
                &mut rng,
            );
            assert!(matches!(result, Err(Error::InvalidParams(_))), "{p} {q} {g}");
        }
    }

    #[test]
    fn from_components_rejects_composite_order() {
        let mut rng = rng();
        // 5 has order 4 modulo 13, but 4 is not prime.
        let result = Parameters::from_components(
            BigUint::from(13u32),
            BigUint::from(4u32),
            BigUint::from(5u32),
            &mut rng,
        );
        assert!(matches!(result, Err(Error::InvalidParams(msg)) if msg.contains("q")));
    }

    #[test]
    fn from_components_rejects_composite_modulus() {
        let mut rng = rng();
        // 561 is a Carmichael number: 2^112 has order 5 modulo 561.
        let p = BigUint::from(561u32);
        let g = BigUint::from(2u32).modpow(&BigUint::from(112u32), &p);
        let result = Parameters::from_components(p, BigUint::from(5u32), g, &mut rng);
        assert!(matches!(result, Err(Error::InvalidParams(msg)) if msg.contains("p is not prime")));
    }

    #[test]
    fn subgroup_membership() {
        let params = Parameters::demo();
        assert!(params.is_element(&BigUint::from(13u32)));
        assert!(params.is_element(&BigUint::from(1u32)));
        assert!(!params.is_element(&BigUint::from(0u32)));
        assert!(!params.is_element(&BigUint::from(5u32)));
        assert!(!params.is_element(&BigUint::from(23u32)));
    }

    #[test]
    fn element_and_scalar_widths() {
        let mut rng = rng();
        let params = Parameters::generate(64, &mut rng).unwrap();
        assert_eq!(params.scalar_len(), 8);
        assert_eq!(params.element_len(), params.p().to_bytes_be().len());

        let g = params.encode_element(params.g()).unwrap();
        assert_eq!(g.len(), params.element_len());
        assert_eq!(&params.decode_element(&g).unwrap(), params.g());

        assert!(params.encode_element(params.p()).is_err());
        assert!(params.encode_scalar(params.q()).is_err());
        assert!(params.decode_element(&vec![0u8; params.element_len()]).is_err());
        assert!(params.decode_scalar(&[0u8; 7]).is_err());
    }

    #[test]
    fn serialized_parameters_are_revalidated() {
        let mut rng = rng();
        let params = Parameters::generate(48, &mut rng).unwrap();
        let bytes = params.to_bytes().unwrap();

        let restored = Parameters::from_bytes(&bytes, &mut rng).unwrap();
        assert_eq!(restored, params);
        assert_eq!(restored.origin(), ParameterOrigin::Imported);

        let mut tampered = bytes.clone();
        let last = tampered.len() - 1;
        tampered[last] ^= 0x01;
        assert!(Parameters::from_bytes(&tampered, &mut rng).is_err());
    }

    #[test]
    fn malformed_parameter_bytes() {
        let mut rng = rng();
        let bytes = Parameters::demo().to_bytes().unwrap();

        assert!(Parameters::from_bytes(&[], &mut rng).is_err());
        assert!(Parameters::from_bytes(&bytes[..bytes.len() - 1], &mut rng).is_err());

        let mut wrong_version = bytes.clone();
        wrong_version[0] = 99;
        assert!(matches!(
            Parameters::from_bytes(&wrong_version, &mut rng),
            Err(Error::InvalidEncoding(_))
        ));

        let mut trailing = bytes.clone();
        trailing.push(0);
        assert!(Parameters::from_bytes(&trailing, &mut rng).is_err());

        let mut huge = vec![PARAMETERS_VERSION];
        huge.extend_from_slice(&u32::MAX.to_be_bytes());
        assert!(Parameters::from_bytes(&huge, &mut rng).is_err());
    }

    #[test]
    fn display_renders_hex() {
        let rendered = Parameters::demo().to_string();
        assert!(rendered.contains("p = 17"));
        assert!(rendered.contains("q = b"));
        assert!(rendered.contains("g = 2"));
    }
}
