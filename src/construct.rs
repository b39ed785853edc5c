//! Test-instance construction: builds (n, p, q, V) tuples where
//! p = (D*V^2 + 1)/4 is prime and q is an independent random prime.
//!
//! The factorization engine never calls into this module; it exists so
//! tests, demos, and benchmarks can produce instances with a known secret V
//! to rediscover.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

use crate::arith::{is_probable_prime, random_bits, random_prime};
use crate::factor::CmError;

/// Miller-Rabin rounds for the constructor's primality gates.
const PRIMALITY_ROUNDS: u32 = 20;

/// Attempts before construction gives up on a parameter set.
const MAX_ATTEMPTS: u64 = 2_000;

/// A constructed CM semiprime with its secret parameters.
#[derive(Debug, Clone)]
pub struct CmInstance {
    /// The public modulus n = p * q.
    pub n: BigUint,
    /// The structured prime p = (D*V^2 + 1)/4.
    pub p: BigUint,
    /// The independent companion prime.
    pub q: BigUint,
    /// The secret CM parameter (odd).
    pub v: BigUint,
    /// The discriminant the instance was built with.
    pub d: BigUint,
}

/// Construct an instance for the given discriminant and bit sizes.
///
/// Each attempt draws a random odd `v_bits`-bit V, requires D*V^2 + 1 to be
/// divisible by 4, and gates p = (D*V^2 + 1)/4 through Miller-Rabin; on
/// success q is an independent `q_bits`-bit random prime. Attempts are
/// bounded, yielding `ConstructionFailed` rather than looping forever.
///
/// D must be congruent to 3 mod 8: with an odd V that residue is exactly
/// what makes the numerator divisible by 4.
pub fn construct_cm_instance(
    d: &BigUint,
    v_bits: u64,
    q_bits: u64,
    rng: &mut impl Rng,
) -> Result<CmInstance, CmError> {
    if d % 8u32 != BigUint::from(3u32) {
        return Err(CmError::InvalidDiscriminant(d.clone()));
    }
    if v_bits < 2 || q_bits < 2 {
        return Err(CmError::InvalidInput(format!(
            "bit sizes too small: v_bits = {}, q_bits = {}",
            v_bits, q_bits
        )));
    }

    for _ in 0..MAX_ATTEMPTS {
        let mut v = random_bits(v_bits, rng);
        if v.is_even() {
            v += 1u32;
        }

        let numerator = d * &v * &v + BigUint::one();
        if !(&numerator % 4u32).is_zero() {
            continue;
        }
        let p = numerator >> 2u32;
        if !is_probable_prime(&p, PRIMALITY_ROUNDS, rng) {
            continue;
        }

        let q = random_prime(q_bits, rng);
        let n = &p * &q;
        return Ok(CmInstance {
            n,
            p,
            q,
            v,
            d: d.clone(),
        });
    }

    Err(CmError::ConstructionFailed(MAX_ATTEMPTS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::validate_cm_structure;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_construct_invariants() {
        let d = BigUint::from(11u32);
        let mut rng = StdRng::seed_from_u64(21);
        let inst = construct_cm_instance(&d, 16, 20, &mut rng).expect("construction");

        assert_eq!(&inst.p * &inst.q, inst.n);
        assert!(inst.v.is_odd());
        // p really is (D*V^2 + 1)/4.
        let numerator = &d * &inst.v * &inst.v + BigUint::one();
        assert_eq!(numerator >> 2u32, inst.p);
        // Both gates held.
        let mut check_rng = StdRng::seed_from_u64(22);
        assert!(is_probable_prime(&inst.p, 20, &mut check_rng));
        assert!(is_probable_prime(&inst.q, 20, &mut check_rng));
        // And the validator closes the loop.
        assert_eq!(validate_cm_structure(&inst.p, &d), Some(inst.v.clone()));
    }

    #[test]
    fn test_construct_rejects_bad_discriminant() {
        let mut rng = StdRng::seed_from_u64(23);
        for d in [5u32, 7, 8, 12] {
            let d = BigUint::from(d);
            assert!(matches!(
                construct_cm_instance(&d, 16, 16, &mut rng),
                Err(CmError::InvalidDiscriminant(_))
            ));
        }
    }

    #[test]
    fn test_construct_seeded_determinism() {
        let d = BigUint::from(19u32);
        let a = construct_cm_instance(&d, 16, 16, &mut StdRng::seed_from_u64(31)).unwrap();
        let b = construct_cm_instance(&d, 16, 16, &mut StdRng::seed_from_u64(31)).unwrap();
        assert_eq!(a.n, b.n);
        assert_eq!(a.v, b.v);
        assert_eq!(a.q, b.q);
    }

    #[test]
    fn test_construct_various_discriminants() {
        let mut rng = StdRng::seed_from_u64(37);
        for d in [3u32, 11, 19, 43] {
            let d = BigUint::from(d);
            let inst = construct_cm_instance(&d, 12, 14, &mut rng)
                .unwrap_or_else(|e| panic!("construction failed for D = {}: {}", d, e));
            assert_eq!(validate_cm_structure(&inst.p, &d), Some(inst.v));
        }
    }
}
