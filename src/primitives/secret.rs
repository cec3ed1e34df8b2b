use core::fmt;

use num_bigint::BigUint;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// Secret scalar held as a big-endian byte buffer that is wiped on release.
///
/// Private keys and nonces never sit in a `BigUint` field: `BigUint` cannot be
/// zeroized, so the value lives only in a [`Zeroizing`] byte buffer that is
/// overwritten on [`wipe`](Self::wipe) or drop. Arithmetic goes through
/// [`with_value`](Self::with_value), which rebuilds a `BigUint` for the
/// duration of one closure. Clearing that temporary, and the limbs of the
/// value passed to [`new`](Self::new), is best-effort: they are dropped
/// immediately but not overwritten.
pub struct SecretScalar {
    bytes: Option<Zeroizing<Vec<u8>>>,
}

impl SecretScalar {
    /// Moves a secret value into wipe-on-release storage.
    pub fn new(value: BigUint) -> Self {
        Self {
            bytes: Some(Zeroizing::new(value.to_bytes_be())),
        }
    }

    /// Runs `f` on the stored value, or returns `None` once wiped.
    pub fn with_value<T>(&self, f: impl FnOnce(&BigUint) -> T) -> Option<T> {
        let bytes = self.bytes.as_ref()?;
        let value = BigUint::from_bytes_be(bytes);
        Some(f(&value))
    }

    /// Overwrites the stored value. Later calls to [`with_value`](Self::with_value) return `None`.
    pub fn wipe(&mut self) {
        if let Some(mut bytes) = self.bytes.take() {
            bytes.zeroize();
        }
    }

    /// Returns `true` once the value has been wiped.
    pub fn is_wiped(&self) -> bool {
        self.bytes.is_none()
    }
}

impl Zeroize for SecretScalar {
    fn zeroize(&mut self) {
        self.wipe();
    }
}

impl Drop for SecretScalar {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl ZeroizeOnDrop for SecretScalar {}

impl fmt::Debug for SecretScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wiped() {
            f.write_str("SecretScalar(<wiped>)")
        } else {
            f.write_str("SecretScalar(<redacted>)")
        }
    }
}
