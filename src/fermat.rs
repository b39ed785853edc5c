//! Fermat's difference-of-squares factorization.
//!
//! If n = p * q with p and q close together, then n = a^2 - b^2 for some
//! a near sqrt(n), giving the factors (a - b, a + b). Cheap enough to try
//! before the rho search; expected to fail quickly when the factor ratio
//! is far from 1.

use num_bigint::BigUint;
use num_traits::One;

use crate::arith::{exact_sqrt, isqrt};

/// Search for a factor pair (a - b, a + b) with a = isqrt(n) + i for
/// i in 0..max_iterations.
///
/// Returns None once the window is exhausted. A returned pair always has
/// both factors > 1 and multiplies back to n exactly; the guards reject
/// the trivial split 1 * n and integer-root edge cases.
pub fn fermat_factor(n: &BigUint, max_iterations: u64) -> Option<(BigUint, BigUint)> {
    let one = BigUint::one();
    if *n <= one {
        return None;
    }

    let a0 = isqrt(n);
    for i in 0..max_iterations {
        let a = &a0 + BigUint::from(i);
        let a_squared = &a * &a;
        if a_squared < *n {
            // Only possible at i = 0 when n is not a perfect square.
            continue;
        }
        let b_squared = &a_squared - n;
        if let Some(b) = exact_sqrt(&b_squared) {
            let p = &a - &b;
            let q = &a + &b;
            if p > one && q > one && &p * &q == *n {
                return Some((p, q));
            }
        }
    }

    None
}
