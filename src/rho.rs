//! Pollard's rho with Brent's cycle detection.
//!
//! Brent's variant walks the pseudorandom map f(x) = (x^2 + c) mod n through
//! power-of-two search segments, accumulating |x - y| products so a single
//! gcd covers a whole batch of steps. Expected O(n^(1/4)) for factors of
//! typical CM size; exhausting the iteration budget is a reportable failure,
//! not a fault.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

use crate::arith::random_below;

/// Steps accumulated between gcd evaluations.
const BATCH_SIZE: u64 = 25;

/// Perturbation constants tried in order, each with a fresh random start.
const RHO_CONSTANTS: std::ops::RangeInclusive<u32> = 1..=9;

/// Find a nontrivial factor of n, or None once every perturbation constant
/// has exhausted its segment budget (the doubling segment length r stops
/// once it exceeds `max_iterations`).
pub fn pollard_rho_brent(
    n: &BigUint,
    max_iterations: u64,
    rng: &mut impl Rng,
) -> Option<BigUint> {
    let one = BigUint::one();
    let two = BigUint::from(2u32);

    if *n <= one {
        return None;
    }
    if n.is_even() {
        // 2 is only a proper divisor when n > 2.
        return if *n > two { Some(two) } else { None };
    }

    for c in RHO_CONSTANTS {
        let c = BigUint::from(c);
        let f = |x: &BigUint| -> BigUint { (x * x + &c) % n };

        // Random starting point in [1, n-1].
        let mut y = loop {
            let v = random_below(n, rng);
            if !v.is_zero() {
                break v;
            }
        };

        let mut r: u64 = 1; // current segment length (power of 2)
        let mut q_acc = BigUint::one(); // accumulated |x - y| product
        let mut x = y.clone(); // fixed point at the start of each segment
        let mut ys = y.clone(); // batch start, kept for the backtrack walk
        let mut d = BigUint::one();

        while d == one && r <= max_iterations {
            x = y.clone();
            for _ in 0..r {
                y = f(&y);
            }

            let mut k: u64 = 0;
            while k < r && d == one {
                ys = y.clone();
                let batch = BATCH_SIZE.min(r - k);
                for _ in 0..batch {
                    y = f(&y);
                    let diff = if y > x { &y - &x } else { &x - &y };
                    q_acc = q_acc * diff % n;
                }
                d = q_acc.gcd(n);
                k += batch;
            }

            r *= 2;
        }

        if d == *n {
            // The batch gcd collapsed to n: several factors collided inside
            // one batch. Replay it pointwise from the batch start. The walk
            // is explicitly capped so a degenerate batch cannot spin forever.
            d = BigUint::one();
            for _ in 0..max_iterations {
                ys = f(&ys);
                let diff = if ys > x { &ys - &x } else { &x - &ys };
                let g = diff.gcd(n);
                if g > one {
                    d = g;
                    break;
                }
            }
        }

        if d > one && d < *n {
            return Some(d);
        }
    }

    None
}
