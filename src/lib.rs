//! # cm-factor
//!
//! Construction and factorization of CM-structured semiprimes.
//!
//! The target instances are n = p * q where p is algebraically tied to a
//! public discriminant D (D ≡ 3 mod 8) via p = (D*V^2 + 1)/4 for a secret
//! odd integer V, and q is an independent prime. Given only n and D, the
//! engine layers cheap strategies (trial division, Fermat's method) under
//! Pollard's rho with Brent's cycle detection, then tests each recovered
//! factor against the CM closed form to rediscover V.
//!
//! ## Modules
//!
//! - **arith**: integer square root, Miller-Rabin, random big integers
//! - **fermat**: difference-of-squares search near sqrt(n)
//! - **rho**: Brent-variant rho with batched gcd
//! - **structure**: CM form detection and V recovery
//! - **factor**: the strategy-ordered dispatcher
//! - **construct**: test-instance generation with a known secret V

pub mod arith;
pub mod construct;
pub mod factor;
pub mod fermat;
pub mod rho;
pub mod structure;

pub use construct::{construct_cm_instance, CmInstance};
pub use factor::{
    factor_cm_semiprime, factor_cm_semiprime_with, factor_with_known_v, CmError, CmFactorization,
    FactorBudget, Method,
};
pub use structure::{cm_prime_from_v, validate_cm_structure};
