//! Credit Engine for Okra
//!
//! Deterministic credit decisions and BNPL risk scoring.
//!
//! # Engines
//!
//! - **CreditPolicyEngine**: ordered decision tree over a credit request,
//!   producing approve/decline/review plus limit, APR and payment terms
//! - **BnplScoringEngine**: weighted score over four normalized features,
//!   categorical key signals and a short-term offer
//!
//! # Invariants
//!
//! - Same input → same output; no state survives a call
//! - A quote is never both approved and review-required
//! - Declined quotes carry zero limit, APR and payment

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod bnpl;
pub mod credit;
pub mod error;
pub mod policy;
pub mod types;

pub use bnpl::{BnplConfig, BnplScoringEngine, DEFAULT_SEED};
pub use credit::CreditPolicyEngine;
pub use error::{Error, Result};
pub use policy::{decimal_to_f64, LimitAdjustment, PolicyConfig, PolicySnapshot, RateTier};
pub use types::*;
