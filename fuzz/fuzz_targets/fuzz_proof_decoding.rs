#![no_main]

use libfuzzer_sys::fuzz_target;
use num_bigint::BigUint;
use schnorr_zkp::{Parameters, Proof, Verifier};

fuzz_target!(|data: &[u8]| {
    let params = Parameters::demo();
    if let Ok(proof) = Proof::from_bytes(&params, data) {
        // Public key of x = 7 in the demonstration group.
        let _ = Verifier::new(params).check(&proof, &BigUint::from(13u32));
    }
});
