//! Credit policy configuration and the published policy snapshot

use crate::{Error, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// APR tier: applicants at or above `min_score` get `apr`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateTier {
    /// Minimum credit score for this tier
    pub min_score: u16,
    /// APR in percent
    pub apr: Decimal,
}

/// Credit limit haircut: applicants at or above `min_score` keep `factor`
/// of their income-capped limit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LimitAdjustment {
    /// Minimum credit score for this adjustment
    pub min_score: u16,
    /// Multiplier applied to the limit
    pub factor: Decimal,
}

/// Policy configuration. Immutable once handed to an engine; alternate
/// policy versions are separate values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Policy version stamped on every quote
    pub version: String,

    /// Score at or above which requests are auto-approved
    pub min_credit_score_auto_approve: u16,

    /// Score at or above which requests go to review
    pub min_credit_score_review: u16,

    /// Maximum debt-to-income ratio
    pub max_dti_ratio: Decimal,

    /// Minimum annual income
    pub min_annual_income: Decimal,

    /// Minimum loan amount, also the floor for computed limits
    pub min_loan_amount: Decimal,

    /// Maximum loan amount
    pub max_loan_amount: Decimal,

    /// Rate tiers, highest threshold first
    pub rate_tiers: Vec<RateTier>,

    /// Limit haircuts, highest threshold first
    pub limit_adjustments: Vec<LimitAdjustment>,

    /// Share of annual income a limit may not exceed
    pub income_limit_ratio: Decimal,

    /// Share of the maximum loan amount used for review estimates
    pub review_limit_ratio: Decimal,

    /// Index into `rate_tiers` used for review estimates
    pub review_rate_tier: usize,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            version: "v1.0.0".to_string(),
            min_credit_score_auto_approve: 720,
            min_credit_score_review: 650,
            max_dti_ratio: dec!(0.45),
            min_annual_income: dec!(25000),
            min_loan_amount: dec!(1000),
            max_loan_amount: dec!(50000),
            rate_tiers: vec![
                RateTier { min_score: 720, apr: dec!(8.99) },  // Excellent
                RateTier { min_score: 680, apr: dec!(12.99) }, // Good
                RateTier { min_score: 650, apr: dec!(18.99) }, // Fair
                RateTier { min_score: 600, apr: dec!(24.99) }, // Poor
                RateTier { min_score: 0, apr: dec!(29.99) },   // Subprime
            ],
            limit_adjustments: vec![
                LimitAdjustment { min_score: 750, factor: dec!(1.00) },
                LimitAdjustment { min_score: 700, factor: dec!(0.90) },
                LimitAdjustment { min_score: 650, factor: dec!(0.80) },
                LimitAdjustment { min_score: 0, factor: dec!(0.70) },
            ],
            income_limit_ratio: dec!(0.30),
            review_limit_ratio: dec!(0.80),
            review_rate_tier: 1,
        }
    }
}

impl PolicyConfig {
    /// Parse a policy from TOML
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: PolicyConfig = toml::from_str(content)
            .map_err(|e| Error::InvalidConfig(format!("Failed to parse policy: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a policy from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject policies the decision tree cannot evaluate
    pub fn validate(&self) -> Result<()> {
        if self.rate_tiers.is_empty() {
            return Err(Error::InvalidConfig("rate_tiers is empty".to_string()));
        }
        if self.rate_tiers.windows(2).any(|w| w[0].min_score <= w[1].min_score) {
            return Err(Error::InvalidConfig(
                "rate_tiers must be ordered by strictly descending min_score".to_string(),
            ));
        }
        if self.rate_tiers.last().map(|t| t.min_score) != Some(0) {
            return Err(Error::InvalidConfig(
                "last rate tier must start at score 0".to_string(),
            ));
        }
        if self
            .rate_tiers
            .iter()
            .any(|t| t.apr < Decimal::ZERO || t.apr > Decimal::ONE_HUNDRED)
        {
            return Err(Error::InvalidConfig("rate tier APR must be in [0, 100]".to_string()));
        }
        if self.review_rate_tier >= self.rate_tiers.len() {
            return Err(Error::InvalidConfig(format!(
                "review_rate_tier {} out of range for {} tiers",
                self.review_rate_tier,
                self.rate_tiers.len()
            )));
        }

        if self.limit_adjustments.is_empty() {
            return Err(Error::InvalidConfig("limit_adjustments is empty".to_string()));
        }
        if self
            .limit_adjustments
            .windows(2)
            .any(|w| w[0].min_score <= w[1].min_score)
        {
            return Err(Error::InvalidConfig(
                "limit_adjustments must be ordered by strictly descending min_score".to_string(),
            ));
        }
        if self
            .limit_adjustments
            .iter()
            .any(|a| a.factor <= Decimal::ZERO || a.factor > Decimal::ONE)
        {
            return Err(Error::InvalidConfig(
                "limit adjustment factors must be in (0, 1]".to_string(),
            ));
        }

        if self.min_loan_amount <= Decimal::ZERO || self.min_loan_amount > self.max_loan_amount {
            return Err(Error::InvalidConfig(format!(
                "loan amount band {}-{} is empty",
                self.min_loan_amount, self.max_loan_amount
            )));
        }
        if self.max_dti_ratio < Decimal::ZERO || self.max_dti_ratio > Decimal::ONE {
            return Err(Error::InvalidConfig("max_dti_ratio must be in [0, 1]".to_string()));
        }
        if self.min_credit_score_review > self.min_credit_score_auto_approve {
            return Err(Error::InvalidConfig(
                "review threshold above auto-approve threshold".to_string(),
            ));
        }

        Ok(())
    }

    /// APR for a credit score: first tier, scanning highest threshold first,
    /// whose minimum the score meets
    pub fn apr_for_score(&self, credit_score: u16) -> Decimal {
        self.rate_tiers
            .iter()
            .find(|tier| credit_score >= tier.min_score)
            .or(self.rate_tiers.last())
            .map(|tier| tier.apr)
            .unwrap_or(Decimal::ZERO)
    }

    /// Limit multiplier for a credit score
    pub fn limit_factor_for_score(&self, credit_score: u16) -> Decimal {
        self.limit_adjustments
            .iter()
            .find(|adj| credit_score >= adj.min_score)
            .or(self.limit_adjustments.last())
            .map(|adj| adj.factor)
            .unwrap_or(Decimal::ONE)
    }

    /// APR used for review estimates
    pub fn review_apr(&self) -> Decimal {
        self.rate_tiers
            .get(self.review_rate_tier)
            .map(|tier| tier.apr)
            .unwrap_or(Decimal::ZERO)
    }

    /// Read-only view of the thresholds and rate tiers
    pub fn snapshot(&self) -> PolicySnapshot {
        PolicySnapshot {
            policy_version: self.version.clone(),
            thresholds: PolicyThresholds {
                min_credit_score_auto_approve: self.min_credit_score_auto_approve,
                min_credit_score_review: self.min_credit_score_review,
                max_dti_ratio: decimal_to_f64(self.max_dti_ratio),
                min_annual_income: decimal_to_f64(self.min_annual_income),
                max_loan_amount: decimal_to_f64(self.max_loan_amount),
                min_loan_amount: decimal_to_f64(self.min_loan_amount),
            },
            rate_tiers: self
                .rate_tiers
                .iter()
                .map(|tier| RateTierSnapshot {
                    min_score: tier.min_score,
                    apr: decimal_to_f64(tier.apr),
                })
                .collect(),
        }
    }
}

/// Nearest double to the decimal value
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_string().parse::<f64>().unwrap_or(0.0)
}

/// Published policy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    /// Policy version
    pub policy_version: String,
    /// Decision thresholds
    pub thresholds: PolicyThresholds,
    /// Rate tiers, highest threshold first
    pub rate_tiers: Vec<RateTierSnapshot>,
}

/// Decision thresholds as plain numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct PolicyThresholds {
    pub min_credit_score_auto_approve: u16,
    pub min_credit_score_review: u16,
    pub max_dti_ratio: f64,
    pub min_annual_income: f64,
    pub max_loan_amount: f64,
    pub min_loan_amount: f64,
}

/// Rate tier as plain numbers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct RateTierSnapshot {
    pub min_score: u16,
    pub apr: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        let config = PolicyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.version, "v1.0.0");
        assert_eq!(config.review_apr(), dec!(12.99));
    }

    #[test]
    fn test_apr_lookup() {
        let config = PolicyConfig::default();

        assert_eq!(config.apr_for_score(850), dec!(8.99));
        assert_eq!(config.apr_for_score(720), dec!(8.99));
        assert_eq!(config.apr_for_score(719), dec!(12.99));
        assert_eq!(config.apr_for_score(680), dec!(12.99));
        assert_eq!(config.apr_for_score(650), dec!(18.99));
        assert_eq!(config.apr_for_score(600), dec!(24.99));
        assert_eq!(config.apr_for_score(300), dec!(29.99));
    }

    #[test]
    fn test_limit_factor_lookup() {
        let config = PolicyConfig::default();

        assert_eq!(config.limit_factor_for_score(750), dec!(1.00));
        assert_eq!(config.limit_factor_for_score(749), dec!(0.90));
        assert_eq!(config.limit_factor_for_score(699), dec!(0.80));
        assert_eq!(config.limit_factor_for_score(649), dec!(0.70));
    }

    #[test]
    fn test_snapshot_matches_config() {
        let config = PolicyConfig::default();
        let snapshot = config.snapshot();

        assert_eq!(snapshot.policy_version, "v1.0.0");
        assert_eq!(snapshot.thresholds.min_credit_score_auto_approve, 720);
        assert_eq!(snapshot.thresholds.min_credit_score_review, 650);
        assert_eq!(snapshot.thresholds.max_dti_ratio, 0.45);
        assert_eq!(snapshot.thresholds.min_annual_income, 25000.0);
        assert_eq!(snapshot.thresholds.max_loan_amount, 50000.0);
        assert_eq!(snapshot.thresholds.min_loan_amount, 1000.0);
        assert_eq!(snapshot.rate_tiers.len(), 5);
        assert_eq!(snapshot.rate_tiers[0].min_score, 720);
        assert_eq!(snapshot.rate_tiers[0].apr, 8.99);
        assert_eq!(snapshot.rate_tiers[4].apr, 29.99);
    }

    #[test]
    fn test_policy_from_toml() {
        let toml = r#"
            version = "v2.0.0-beta"
            min_credit_score_auto_approve = 740
            min_credit_score_review = 660
            max_dti_ratio = "0.40"
            min_annual_income = "30000"
            min_loan_amount = "2000"
            max_loan_amount = "40000"
            income_limit_ratio = "0.25"
            review_limit_ratio = "0.75"
            review_rate_tier = 1

            [[rate_tiers]]
            min_score = 740
            apr = "7.99"

            [[rate_tiers]]
            min_score = 0
            apr = "21.99"

            [[limit_adjustments]]
            min_score = 0
            factor = "1.0"
        "#;

        let config = PolicyConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.version, "v2.0.0-beta");
        assert_eq!(config.apr_for_score(745), dec!(7.99));
        assert_eq!(config.review_apr(), dec!(21.99));
    }

    #[test]
    fn test_invalid_policies_rejected() {
        let mut unordered = PolicyConfig::default();
        unordered.rate_tiers.swap(0, 1);
        assert!(unordered.validate().is_err());

        let mut no_floor = PolicyConfig::default();
        no_floor.rate_tiers.pop();
        assert!(no_floor.validate().is_err());

        let mut bad_review = PolicyConfig::default();
        bad_review.review_rate_tier = 9;
        assert!(bad_review.validate().is_err());

        let mut inverted_band = PolicyConfig::default();
        inverted_band.min_loan_amount = dec!(60000);
        assert!(inverted_band.validate().is_err());

        let mut bad_factor = PolicyConfig::default();
        bad_factor.limit_adjustments[0].factor = dec!(1.5);
        assert!(bad_factor.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let result = PolicyConfig::from_toml_str("version = ");
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
