//! Strategy-ordered factorization pipeline for CM-constructed semiprimes.
//!
//! Strategy order, first success wins:
//! 1. Trial division (cheap; catches stray small factors)
//! 2. Fermat (cheap; wins when the factor ratio is near 1)
//! 3. Pollard rho, Brent variant (the general workhorse)
//!
//! Whichever strategy splits n, both factors run through the CM structure
//! validator so the structured factor, if there is one, comes back first
//! together with its recovered V.

use std::fmt;
use std::time::{Duration, Instant};

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::arith::isqrt;
use crate::fermat::fermat_factor;
use crate::rho::pollard_rho_brent;
use crate::structure::{cm_prime_from_v, validate_cm_structure};

/// Errors reported by the construction and factorization entry points.
#[derive(Debug, thiserror::Error)]
pub enum CmError {
    /// A collaborator that needs D = 3 (mod 8) was handed something else.
    /// The dispatcher itself only warns; construction refuses.
    #[error("discriminant {0} is not congruent to 3 modulo 8")]
    InvalidDiscriminant(BigUint),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Every strategy exhausted its iteration budget without finding a
    /// nontrivial divisor. Expected at large bit sizes; retry with a larger
    /// [`FactorBudget`] rather than treating this as a fault.
    #[error("all factoring strategies exhausted their budgets without finding a divisor")]
    FactorizationFailed,

    #[error("could not construct a CM instance after {0} attempts")]
    ConstructionFailed(u64),
}

/// Which strategy produced a factorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    TrialDivision,
    Fermat,
    RhoBrent,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::TrialDivision => write!(f, "Trial Division"),
            Method::Fermat => write!(f, "Fermat"),
            Method::RhoBrent => write!(f, "Pollard's rho (Brent)"),
        }
    }
}

/// Iteration budgets for the bounded strategies. Wall-clock limits are the
/// caller's business: abort between dispatcher calls, not inside one.
#[derive(Debug, Clone)]
pub struct FactorBudget {
    /// Largest divisor tried by trial division.
    pub trial_limit: u64,
    /// Width of the Fermat window above isqrt(n).
    pub fermat_iterations: u64,
    /// Segment-length bound per rho perturbation constant.
    pub rho_iterations: u64,
}

impl Default for FactorBudget {
    fn default() -> Self {
        FactorBudget {
            trial_limit: 10_000,
            fermat_iterations: 50_000,
            rho_iterations: 100_000,
        }
    }
}

/// A successful factorization of n = factor_a * factor_b.
#[derive(Debug, Clone)]
pub struct CmFactorization {
    /// The number that was factored.
    pub n: BigUint,
    /// The CM-structured factor when one validates, else the first found.
    pub factor_a: BigUint,
    /// The cofactor.
    pub factor_b: BigUint,
    /// Recovered construction parameter when factor_a has CM form.
    pub recovered_v: Option<BigUint>,
    /// Which strategy found the split.
    pub method: Method,
    /// Time taken.
    pub duration: Duration,
}

/// Deterministic small-factor search: divisibility by 2, then odd divisors
/// from 3 up to min(limit, isqrt(n)). Returns the first divisor found.
pub fn trial_division(n: &BigUint, limit: u64) -> Option<BigUint> {
    let two = BigUint::from(2u32);
    if *n <= two {
        return None;
    }
    if n.is_even() {
        return Some(two);
    }

    let bound = isqrt(n).to_u64().unwrap_or(u64::MAX).min(limit);
    let mut divisor = 3u64;
    while divisor <= bound {
        let big_divisor = BigUint::from(divisor);
        if (n % &big_divisor).is_zero() {
            return Some(big_divisor);
        }
        divisor += 2;
    }

    None
}

type StrategyFn = fn(&BigUint, &FactorBudget, &mut StdRng) -> Option<BigUint>;

fn strategy_trial(n: &BigUint, budget: &FactorBudget, _rng: &mut StdRng) -> Option<BigUint> {
    trial_division(n, budget.trial_limit)
}

fn strategy_fermat(n: &BigUint, budget: &FactorBudget, _rng: &mut StdRng) -> Option<BigUint> {
    fermat_factor(n, budget.fermat_iterations).map(|(p, _)| p)
}

fn strategy_rho(n: &BigUint, budget: &FactorBudget, rng: &mut StdRng) -> Option<BigUint> {
    pollard_rho_brent(n, budget.rho_iterations, rng)
}

/// Priority-ordered strategy table; reorder or extend here.
const STRATEGIES: [(Method, StrategyFn); 3] = [
    (Method::TrialDivision, strategy_trial),
    (Method::Fermat, strategy_fermat),
    (Method::RhoBrent, strategy_rho),
];

/// Factor a CM-constructed semiprime given only n and the discriminant D.
///
/// Convenience wrapper over [`factor_cm_semiprime_with`] using default
/// budgets and an entropy-seeded generator.
pub fn factor_cm_semiprime(n: &BigUint, d: &BigUint) -> Result<CmFactorization, CmError> {
    let mut rng = StdRng::from_entropy();
    factor_cm_semiprime_with(n, d, &FactorBudget::default(), &mut rng)
}

/// Factor with explicit budgets and an injected generator (for seeded tests
/// and callers with their own retry policy).
///
/// The dispatcher works for any D; D not congruent to 3 mod 8 only makes
/// structure recovery hopeless, so it is reported at warning level rather
/// than enforced.
pub fn factor_cm_semiprime_with(
    n: &BigUint,
    d: &BigUint,
    budget: &FactorBudget,
    rng: &mut StdRng,
) -> Result<CmFactorization, CmError> {
    let start = Instant::now();

    if *n < BigUint::from(2u32) {
        return Err(CmError::InvalidInput(format!("cannot factor n = {}", n)));
    }
    if d % 8u32 != BigUint::from(3u32) {
        log::warn!(
            "discriminant {} is not 3 mod 8; structure recovery is unlikely",
            d
        );
    }

    for (method, strategy) in STRATEGIES {
        if let Some(factor) = strategy(n, budget, rng) {
            let cofactor = n / &factor;
            debug_assert_eq!(&factor * &cofactor, *n);

            // Structured factor first; the factor the strategy discovered is
            // checked before its cofactor, and the first success wins.
            let (factor_a, factor_b, recovered_v) =
                if let Some(v) = validate_cm_structure(&factor, d) {
                    (factor, cofactor, Some(v))
                } else if let Some(v) = validate_cm_structure(&cofactor, d) {
                    (cofactor, factor, Some(v))
                } else {
                    (factor, cofactor, None)
                };

            return Ok(CmFactorization {
                n: n.clone(),
                factor_a,
                factor_b,
                recovered_v,
                method,
                duration: start.elapsed(),
            });
        }
    }

    Err(CmError::FactorizationFailed)
}

/// Direct split when the construction secret V is known: computes
/// p = (D*V^2 + 1)/4 and checks that it divides n.
pub fn factor_with_known_v(n: &BigUint, d: &BigUint, v: &BigUint) -> Option<(BigUint, BigUint)> {
    let p = cm_prime_from_v(d, v)?;
    if p > BigUint::one() && p < *n && (n % &p).is_zero() {
        let q = n / &p;
        Some((p, q))
    } else {
        None
    }
}
