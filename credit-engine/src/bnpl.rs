//! BNPL scoring engine
//!
//! Weighted score over four normalized features:
//! - amount: moderate purchases score highest
//! - tenor: shorter terms score higher
//! - on-time rate: used as-is
//! - utilization: lower is better

use crate::{
    AmountSignal, BnplFeatures, BnplQuote, BnplScoreResult, Error, KeySignals, PaymentSignal,
    RawBnplFeatures, Result, RiskSignal, ScoreComponents, ScoreWeights, TenorSignal,
    UtilizationSignal,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Seed passed by callers that do not care about it
pub const DEFAULT_SEED: u64 = 42;

/// Normalized amount band of moderate purchases
const OPTIMAL_BAND: (f64, f64) = (0.4, 0.6);
const OPTIMAL_CENTER: f64 = 0.5;
const OPTIMAL_HALF_WIDTH: f64 = 0.1;

/// BNPL configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BnplConfig {
    /// Smallest financeable amount
    pub min_amount: f64,

    /// Largest financeable amount, also the limit cap
    pub max_amount: f64,

    /// Shortest tenor in months
    pub min_tenor: u32,

    /// Longest tenor in months
    pub max_tenor: u32,

    /// Component weights
    pub weights: ScoreWeights,

    /// APR charged at a perfect score
    pub base_apr: f64,

    /// APR added as the score falls to zero
    pub apr_risk_spread: f64,

    /// Score at or above which a quote is approved
    pub approval_threshold: f64,

    /// Score at or above which risk is low and the tenor is kept
    pub low_risk_score: f64,

    /// Score at or above which risk is medium
    pub medium_risk_score: f64,
}

impl Default for BnplConfig {
    fn default() -> Self {
        Self {
            min_amount: 100.0,
            max_amount: 5000.0,
            min_tenor: 1,
            max_tenor: 12,
            weights: ScoreWeights {
                amount: 0.2,
                tenor: 0.3,
                on_time_rate: 0.35,
                utilization: 0.15,
            },
            base_apr: 15.0,
            apr_risk_spread: 10.0,
            approval_threshold: 0.5,
            low_risk_score: 0.8,
            medium_risk_score: 0.6,
        }
    }
}

impl BnplConfig {
    /// Reject configurations that would divide by zero or invert bands
    pub fn validate(&self) -> Result<()> {
        if !(self.min_amount > 0.0 && self.min_amount < self.max_amount) {
            return Err(Error::InvalidConfig(format!(
                "BNPL amount band {}-{} is empty",
                self.min_amount, self.max_amount
            )));
        }
        if self.min_tenor == 0 || self.min_tenor >= self.max_tenor {
            return Err(Error::InvalidConfig(format!(
                "BNPL tenor band {}-{} is empty",
                self.min_tenor, self.max_tenor
            )));
        }
        if self.medium_risk_score > self.low_risk_score {
            return Err(Error::InvalidConfig(
                "medium risk score above low risk score".to_string(),
            ));
        }
        Ok(())
    }
}

/// Deterministic BNPL scoring engine
#[derive(Debug, Clone, Default)]
pub struct BnplScoringEngine {
    config: BnplConfig,
}

impl BnplScoringEngine {
    /// Create engine for a validated configuration
    pub fn new(config: BnplConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &BnplConfig {
        &self.config
    }

    /// Clamp raw features into range, filling defaults for absent fields.
    /// Tenor is truncated toward zero before clamping.
    pub fn validate_features(&self, raw: &RawBnplFeatures) -> BnplFeatures {
        let config = &self.config;
        let tenor = raw.tenor.unwrap_or(config.min_tenor as f64).trunc();

        BnplFeatures {
            amount: clamp(raw.amount.unwrap_or(config.min_amount), config.min_amount, config.max_amount),
            tenor: clamp(tenor, config.min_tenor as f64, config.max_tenor as f64) as u32,
            on_time_rate: clamp(raw.on_time_rate.unwrap_or(0.0), 0.0, 1.0),
            utilization: clamp(raw.utilization.unwrap_or(0.0), 0.0, 1.0),
        }
    }

    /// Score features.
    ///
    /// `seed` is accepted for interface compatibility and has no effect:
    /// the score depends on the features alone.
    pub fn score(&self, features: &BnplFeatures, _seed: u64) -> BnplScoreResult {
        let config = &self.config;
        let weights = config.weights;

        let amount = clamp(features.amount, config.min_amount, config.max_amount);
        let tenor = features.tenor.clamp(config.min_tenor, config.max_tenor);
        let on_time_rate = clamp(features.on_time_rate, 0.0, 1.0);
        let utilization = clamp(features.utilization, 0.0, 1.0);

        let amount_score = self.amount_score(amount);
        let tenor_score = self.tenor_score(tenor);
        let on_time_score = on_time_rate;
        let utilization_score = 1.0 - utilization;

        let total = amount_score * weights.amount
            + tenor_score * weights.tenor
            + on_time_score * weights.on_time_rate
            + utilization_score * weights.utilization;
        let total = clamp(total, 0.0, 1.0);

        let key_signals = self.key_signals(amount, tenor, on_time_rate, utilization, total);

        debug!(score = total, ?key_signals, "BNPL features scored");

        BnplScoreResult {
            score: round_to(total, 3),
            key_signals,
            components: ScoreComponents {
                amount_score: round_to(amount_score, 3),
                tenor_score: round_to(tenor_score, 3),
                on_time_score: round_to(on_time_score, 3),
                utilization_score: round_to(utilization_score, 3),
            },
            weights,
        }
    }

    /// Derive an offer from a score and the requested amount and tenor
    pub fn generate_quote(&self, score: f64, amount: f64, tenor: u32) -> BnplQuote {
        let config = &self.config;

        let limit_multiplier = 0.5 + score * 0.5;
        let limit = (amount * limit_multiplier).min(config.max_amount);
        let apr = config.base_apr + (1.0 - score) * config.apr_risk_spread;

        let term_months = if score >= config.low_risk_score {
            tenor
        } else if score >= config.medium_risk_score {
            tenor.saturating_add(1).min(config.max_tenor)
        } else {
            tenor.saturating_add(2).min(config.max_tenor)
        }
        .max(config.min_tenor);

        BnplQuote {
            limit: round_to(limit, 2),
            apr: round_to(apr, 2),
            term_months,
            monthly_payment: round_to(limit / term_months as f64, 2),
            score,
            approved: score >= config.approval_threshold,
        }
    }

    /// Peaks at 1.0 in the middle of the optimal band, decays by 2.0 per
    /// unit of distance outside it, floored at 0.3
    fn amount_score(&self, amount: f64) -> f64 {
        let config = &self.config;
        let normalized = (amount - config.min_amount) / (config.max_amount - config.min_amount);
        let (start, end) = OPTIMAL_BAND;

        if (start..=end).contains(&normalized) {
            0.9 + 0.1 * (1.0 - (normalized - OPTIMAL_CENTER).abs() / OPTIMAL_HALF_WIDTH)
        } else {
            let distance = (normalized - start).abs().min((normalized - end).abs());
            (0.9 - distance * 2.0).max(0.3)
        }
    }

    fn tenor_score(&self, tenor: u32) -> f64 {
        let config = &self.config;
        let normalized =
            (tenor - config.min_tenor) as f64 / (config.max_tenor - config.min_tenor) as f64;
        1.0 - normalized.powf(1.5)
    }

    fn key_signals(
        &self,
        amount: f64,
        tenor: u32,
        on_time_rate: f64,
        utilization: f64,
        total_score: f64,
    ) -> KeySignals {
        let amount_signal = if amount < 500.0 {
            AmountSignal::LowAmount
        } else if amount > 3000.0 {
            AmountSignal::HighAmount
        } else {
            AmountSignal::ModerateAmount
        };

        let tenor_signal = if tenor <= 3 {
            TenorSignal::ShortTerm
        } else if tenor >= 9 {
            TenorSignal::LongTerm
        } else {
            TenorSignal::MediumTerm
        };

        let payment_signal = if on_time_rate >= 0.95 {
            PaymentSignal::ExcellentHistory
        } else if on_time_rate >= 0.85 {
            PaymentSignal::GoodHistory
        } else if on_time_rate >= 0.70 {
            PaymentSignal::FairHistory
        } else {
            PaymentSignal::PoorHistory
        };

        let utilization_signal = if utilization <= 0.3 {
            UtilizationSignal::LowUtilization
        } else if utilization >= 0.8 {
            UtilizationSignal::HighUtilization
        } else {
            UtilizationSignal::ModerateUtilization
        };

        let risk_signal = if total_score >= self.config.low_risk_score {
            RiskSignal::LowRisk
        } else if total_score >= self.config.medium_risk_score {
            RiskSignal::MediumRisk
        } else {
            RiskSignal::HighRisk
        };

        KeySignals {
            amount_signal,
            tenor_signal,
            payment_signal,
            utilization_signal,
            risk_signal,
        }
    }
}

/// `max`/`min` rather than `f64::clamp` so NaN maps to the lower bound
fn clamp(value: f64, low: f64, high: f64) -> f64 {
    value.max(low).min(high)
}

/// Round half-even on the exact decimal expansion of the double
pub fn round_to(value: f64, places: usize) -> f64 {
    format!("{:.*}", places, value).parse::<f64>().unwrap_or(value)
}
