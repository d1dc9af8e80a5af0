//! Answer quality scoring.
//!
//! Mining compares answers by a scalar in `(0, 1]`: the Nth root of the
//! digest over all challenged labels, normalized by `2^(256/N)`. The
//! root runs over arbitrary-precision decimals because the 256-bit
//! digest overflows doubles long before Newton's method converges.

use bigdecimal::BigDecimal;
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;

use crate::config::INVALID_QUALITY;
use crate::hashing;
use crate::types::Answer;
use crate::utils::nth_root;
use crate::verifier::Verifier;

/// Scores an answer to a challenge batch.
///
/// Returns [`INVALID_QUALITY`] when the answer fails space
/// verification; otherwise a value in `(0, 1]`.
pub fn quality(verifier: &Verifier, challenges: &[i64], answer: &Answer) -> f64 {
    if !verifier.verify_space(challenges, answer) {
        return INVALID_QUALITY;
    }

    let digest = hashing::hash(&hashing::concat(&answer.hashes));
    let x = BigInt::from_bytes_be(Sign::Plus, &digest);
    let num = nth_root(&BigDecimal::from(x), answer.size)
        .to_f64()
        .unwrap_or(f64::MAX);
    let den = (256.0 / answer.size as f64).exp2();
    num / den
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HASH_SIZE;

    #[test]
    fn test_unverifiable_answer_scores_invalid() {
        let verifier = Verifier::new(&[0x01], 2, 1, [0u8; HASH_SIZE]).unwrap();
        let answer = Answer {
            size: 24,
            hashes: vec![[0xaau8; HASH_SIZE]],
            parents: vec![vec![]],
            proofs: vec![vec![[0u8; HASH_SIZE]; 5]],
            parent_proofs: vec![vec![]],
        };
        assert_eq!(quality(&verifier, &[0], &answer), INVALID_QUALITY);
    }
}
