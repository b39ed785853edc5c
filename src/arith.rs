//! Big-integer arithmetic primitives: integer square root, modular
//! exponentiation, Miller-Rabin primality testing, and random integer
//! generation.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

/// Integer square root: floor(sqrt(n)) via Newton's method.
///
/// Starts at x = n and iterates y = (x + n/x) / 2 until y >= x. Exact for
/// perfect squares, so `isqrt(k) * isqrt(k) == k` is a squareness test.
pub fn isqrt(n: &BigUint) -> BigUint {
    if n.is_zero() {
        return BigUint::zero();
    }
    let mut x = n.clone();
    loop {
        let y = (&x + n / &x) >> 1u32;
        if y >= x {
            return x;
        }
        x = y;
    }
}

/// Exact square root: returns the root only when n is a perfect square.
pub fn exact_sqrt(n: &BigUint) -> Option<BigUint> {
    let r = isqrt(n);
    if &r * &r == *n {
        Some(r)
    } else {
        None
    }
}

/// Modular exponentiation: base^exp mod modulus.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// Greatest common divisor.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    a.gcd(b)
}

/// Uniform-ish random integer in [0, bound): fills as many bytes as the
/// bound occupies and reduces modulo the bound.
pub fn random_below(bound: &BigUint, rng: &mut impl Rng) -> BigUint {
    let bytes = bound.to_bytes_be();
    let mut random_bytes = vec![0u8; bytes.len()];
    rng.fill(&mut random_bytes[..]);
    BigUint::from_bytes_be(&random_bytes) % bound
}

/// Random integer with exactly `bits` bits (top bit set).
pub fn random_bits(bits: u64, rng: &mut impl Rng) -> BigUint {
    assert!(bits >= 1, "cannot generate a 0-bit integer");
    let num_bytes = ((bits + 7) / 8) as usize;
    let mut bytes = vec![0u8; num_bytes];
    rng.fill(&mut bytes[..]);

    // Clear excess high bits so the value fits in `bits` bits, then set the
    // top bit so it occupies exactly `bits` bits.
    let excess_bits = (num_bytes as u64 * 8 - bits) as u32;
    if excess_bits > 0 {
        bytes[0] &= (1u8 << (8 - excess_bits)) - 1;
    }
    let top_bit_in_byte = ((bits - 1) % 8) as u32;
    bytes[0] |= 1u8 << top_bit_in_byte;

    let value = BigUint::from_bytes_be(&bytes);
    debug_assert_eq!(value.bits(), bits);
    value
}

/// Generate a random probable prime with exactly `bits` bits.
pub fn random_prime(bits: u64, rng: &mut impl Rng) -> BigUint {
    assert!(bits >= 2, "cannot generate a prime with fewer than 2 bits");
    loop {
        let mut candidate = random_bits(bits, rng);
        if candidate.is_even() {
            candidate += 1u32;
        }
        if is_probable_prime(&candidate, 20, rng) {
            return candidate;
        }
    }
}

/// Miller-Rabin probabilistic primality test.
///
/// Returns false for n < 2 and even n > 2, true for 2 and 3. Otherwise
/// writes n-1 = d * 2^r with d odd and runs `rounds` independent witness
/// rounds with random bases a in [2, n-2]. Monte Carlo: a "prime" answer is
/// wrong with probability at most 4^-rounds; a "composite" answer is never
/// wrong.
pub fn is_probable_prime(n: &BigUint, rounds: u32, rng: &mut impl Rng) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);

    if *n < two {
        return false;
    }
    if *n == two || *n == three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // Write n-1 as d * 2^r with d odd.
    let n_minus_1 = n - &one;
    let mut d = n_minus_1.clone();
    let mut r: u32 = 0;
    while d.is_even() {
        d >>= 1u32;
        r += 1;
    }

    'witness: for _ in 0..rounds {
        // Random base a in [2, n-2].
        let a = loop {
            let a = random_below(n, rng);
            if a >= two && a <= &n_minus_1 - &one {
                break a;
            }
        };

        let mut x = mod_pow(&a, &d, n);
        if x == one || x == n_minus_1 {
            continue 'witness;
        }
        for _ in 0..r - 1 {
            x = mod_pow(&x, &two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }
        return false;
    }

    true
}
