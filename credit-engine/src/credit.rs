//! Credit policy engine
//!
//! Evaluates a request against an ordered decision tree. The first
//! terminal condition wins, so the order of the checks in
//! [`CreditPolicyEngine::evaluate`] is part of the policy.

use crate::{CreditProfile, CreditQuote, CreditRequest, PolicyConfig, PolicySnapshot, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::debug;

/// Deterministic credit policy engine
#[derive(Debug, Clone, Default)]
pub struct CreditPolicyEngine {
    config: PolicyConfig,
}

impl CreditPolicyEngine {
    /// Create engine for a validated policy
    pub fn new(config: PolicyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Policy in use
    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Published thresholds and rate tiers of the policy in use
    pub fn list_policies(&self) -> PolicySnapshot {
        self.config.snapshot()
    }

    /// Evaluate a credit request
    pub fn evaluate(&self, request: &CreditRequest) -> CreditQuote {
        let config = &self.config;

        if request.amount < config.min_loan_amount {
            return self.declined(
                request,
                format!(
                    "Requested amount ${} below minimum ${}",
                    request.amount, config.min_loan_amount
                ),
            );
        }

        if request.amount > config.max_loan_amount {
            return self.declined(
                request,
                format!(
                    "Requested amount ${} exceeds maximum ${}",
                    request.amount, config.max_loan_amount
                ),
            );
        }

        let profile = match &request.profile {
            Some(profile) => profile,
            None => {
                return self.review_estimate(
                    request,
                    "No credit profile provided - manual review required".to_string(),
                )
            }
        };

        if let Some(income) = profile.annual_income {
            if income < config.min_annual_income {
                return self.declined(
                    request,
                    format!("Income ${} below minimum ${}", income, config.min_annual_income),
                );
            }
        }

        if let Some(dti) = profile.debt_to_income_ratio {
            if dti > config.max_dti_ratio {
                return self.declined(
                    request,
                    format!(
                        "DTI ratio {}% exceeds maximum {}%",
                        percent(dti),
                        percent(config.max_dti_ratio)
                    ),
                );
            }
        }

        let credit_score = match profile.credit_score {
            Some(score) => score,
            None => {
                return self.review_estimate(
                    request,
                    "No credit score provided - manual review required".to_string(),
                )
            }
        };

        let mut reasons = Vec::new();
        let approved = if credit_score >= config.min_credit_score_auto_approve {
            reasons.push(format!("Excellent credit score {} - auto-approved", credit_score));
            true
        } else if credit_score >= config.min_credit_score_review {
            reasons.push(format!("Good credit score {} - review required", credit_score));
            false
        } else {
            return self.declined(
                request,
                format!("Credit score {} below minimum threshold", credit_score),
            );
        };

        let apr = config.apr_for_score(credit_score);
        let credit_limit = self.credit_limit(request.amount, profile, credit_score);
        let monthly_payment = monthly_payment(credit_limit, apr, request.term_months);

        if approved {
            reasons.push(format!("Approved for ${} at {}% APR", credit_limit, apr));
        }

        debug!(
            actor_id = %request.actor_id,
            credit_score,
            approved,
            %credit_limit,
            %apr,
            "credit request evaluated"
        );

        CreditQuote {
            approved,
            credit_limit,
            apr,
            term_months: request.term_months,
            monthly_payment,
            reasons,
            review_required: !approved,
            policy_version: config.version.clone(),
        }
    }

    /// Income cap, score haircut, then the minimum-amount floor
    fn credit_limit(&self, requested: Decimal, profile: &CreditProfile, credit_score: u16) -> Decimal {
        let mut limit = requested;

        if let Some(income) = profile.annual_income {
            limit = limit.min(income * self.config.income_limit_ratio);
        }

        limit *= self.config.limit_factor_for_score(credit_score);

        quantize_cents(limit.max(self.config.min_loan_amount))
    }

    fn declined(&self, request: &CreditRequest, reason: String) -> CreditQuote {
        debug!(actor_id = %request.actor_id, %reason, "credit request declined");

        CreditQuote {
            approved: false,
            credit_limit: Decimal::ZERO,
            apr: Decimal::ZERO,
            term_months: request.term_months,
            monthly_payment: Decimal::ZERO,
            reasons: vec![reason],
            review_required: false,
            policy_version: self.config.version.clone(),
        }
    }

    /// Review quote with estimated terms at the review tier APR
    fn review_estimate(&self, request: &CreditRequest, reason: String) -> CreditQuote {
        let apr = self.config.review_apr();
        let credit_limit = request
            .amount
            .min(self.config.max_loan_amount * self.config.review_limit_ratio);
        let monthly_payment = monthly_payment(credit_limit, apr, request.term_months);

        debug!(actor_id = %request.actor_id, %reason, "credit request sent to review");

        CreditQuote {
            approved: false,
            credit_limit,
            apr,
            term_months: request.term_months,
            monthly_payment,
            reasons: vec![reason],
            review_required: true,
            policy_version: self.config.version.clone(),
        }
    }
}

/// Amortized payment `P * r * (1+r)^n / ((1+r)^n - 1)` with `r = apr/100/12`.
/// A zero rate degrades to straight-line `P / n`.
pub fn monthly_payment(principal: Decimal, apr: Decimal, term_months: u32) -> Decimal {
    let months = term_months.max(1);
    let monthly_rate = apr / dec!(100) / dec!(12);

    if monthly_rate.is_zero() {
        return quantize_cents(principal / Decimal::from(months));
    }

    let growth = (0..months).fold(Decimal::ONE, |acc, _| acc * (Decimal::ONE + monthly_rate));
    let payment = principal * (monthly_rate * growth) / (growth - Decimal::ONE);

    quantize_cents(payment)
}

/// Round to cents, half-even, always carrying two decimal places
pub fn quantize_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    rounded.rescale(2);
    rounded
}

fn percent(ratio: Decimal) -> Decimal {
    quantize_cents(ratio * dec!(100))
}
