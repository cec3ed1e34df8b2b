#![no_main]

use libfuzzer_sys::fuzz_target;
use schnorr_zkp::{Parameters, SecureRng};

fuzz_target!(|data: &[u8]| {
    let mut rng = SecureRng::new();
    let _ = Parameters::from_bytes(data, &mut rng);
});
