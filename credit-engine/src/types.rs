//! Core types for credit engine

use crate::{Error, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lowest credit score accepted on a profile
pub const MIN_CREDIT_SCORE: u16 = 300;

/// Highest credit score accepted on a profile
pub const MAX_CREDIT_SCORE: u16 = 850;

/// Applicant credit profile. Every field is optional; an absent field
/// disables the checks that depend on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreditProfile {
    /// Credit score (300-850)
    #[serde(default, deserialize_with = "whole_number::optional")]
    pub credit_score: Option<u16>,

    /// Annual income in USD
    #[serde(default)]
    pub annual_income: Option<Decimal>,

    /// Debt-to-income ratio (0-1)
    #[serde(default)]
    pub debt_to_income_ratio: Option<Decimal>,

    /// Employment status, informational only
    #[serde(default)]
    pub employment_status: Option<String>,

    /// Credit history length in months, informational only
    #[serde(default, deserialize_with = "whole_number::optional")]
    pub credit_history_months: Option<u32>,
}

impl CreditProfile {
    /// Check wire-level ranges. The policy engine does not call this;
    /// callers use it to decide whether a profile counts as present.
    pub fn validate(&self) -> Result<()> {
        if let Some(score) = self.credit_score {
            if !(MIN_CREDIT_SCORE..=MAX_CREDIT_SCORE).contains(&score) {
                return Err(Error::InvalidProfile(format!(
                    "credit_score {} outside {}-{}",
                    score, MIN_CREDIT_SCORE, MAX_CREDIT_SCORE
                )));
            }
        }

        if let Some(income) = self.annual_income {
            if income < Decimal::ZERO {
                return Err(Error::InvalidProfile(format!(
                    "annual_income {} is negative",
                    income
                )));
            }
        }

        if let Some(dti) = self.debt_to_income_ratio {
            if dti < Decimal::ZERO || dti > Decimal::ONE {
                return Err(Error::InvalidProfile(format!(
                    "debt_to_income_ratio {} outside 0-1",
                    dti
                )));
            }
        }

        Ok(())
    }
}

/// Lenient whole-number fields. Profiles arrive from many clients, so
/// integral floats (`750.0`) and numeric strings (`"750"`) are accepted;
/// fractional values are not.
mod whole_number {
    use serde::de::{self, Deserializer, Unexpected, Visitor};
    use std::fmt;
    use std::marker::PhantomData;

    pub fn optional<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<u64>,
    {
        deserializer.deserialize_any(WholeNumber(PhantomData))
    }

    struct WholeNumber<T>(PhantomData<T>);

    impl<T: TryFrom<u64>> WholeNumber<T> {
        fn narrow<E: de::Error>(&self, value: u64) -> Result<Option<T>, E> {
            T::try_from(value)
                .map(Some)
                .map_err(|_| E::invalid_value(Unexpected::Unsigned(value), self))
        }

        fn from_float<E: de::Error>(&self, value: f64) -> Result<Option<T>, E> {
            let whole = value.is_finite() && value.fract() == 0.0;
            if whole && value >= 0.0 && value <= u64::MAX as f64 {
                self.narrow(value as u64)
            } else {
                Err(E::invalid_value(Unexpected::Float(value), self))
            }
        }
    }

    impl<'de, T: TryFrom<u64>> Visitor<'de> for WholeNumber<T> {
        type Value = Option<T>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a non-negative whole number, integral float or numeric string")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
            deserializer.deserialize_any(self)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
            self.narrow(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
            match u64::try_from(value) {
                Ok(value) => self.narrow(value),
                Err(_) => Err(E::invalid_value(Unexpected::Signed(value), &self)),
            }
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
            self.from_float(value)
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            let trimmed = value.trim();
            if let Ok(whole) = trimmed.parse::<u64>() {
                return self.narrow(whole);
            }
            match trimmed.parse::<f64>() {
                Ok(float) => self.from_float(float),
                Err(_) => Err(E::invalid_value(Unexpected::Str(value), &self)),
            }
        }
    }
}

/// Credit request as seen by the policy engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditRequest {
    /// Requested credit amount
    pub amount: Decimal,

    /// Loan term in months
    pub term_months: u32,

    /// Loan purpose, informational only
    pub purpose: String,

    /// Actor/borrower identifier
    pub actor_id: String,

    /// Credit profile, if one was supplied and valid
    #[serde(default)]
    pub profile: Option<CreditProfile>,
}

/// Outcome category of a credit quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Auto-approved
    Approved,
    /// Manual review required; terms are estimates
    Review,
    /// Declined; terms are zero
    Declined,
}

impl Decision {
    /// Label used in logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "approved",
            Decision::Review => "review",
            Decision::Declined => "declined",
        }
    }
}

/// Credit quote produced by the policy engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditQuote {
    /// Whether credit is approved
    pub approved: bool,

    /// Approved (or estimated) credit limit
    pub credit_limit: Decimal,

    /// Annual percentage rate, in percent
    pub apr: Decimal,

    /// Loan term in months, echoed from the request
    pub term_months: u32,

    /// Monthly payment
    pub monthly_payment: Decimal,

    /// Reasons for the decision, first-triggered first
    pub reasons: Vec<String>,

    /// Whether manual review is required
    pub review_required: bool,

    /// Policy version used
    pub policy_version: String,
}

impl CreditQuote {
    /// Decision category for this quote
    pub fn decision(&self) -> Decision {
        if self.approved {
            Decision::Approved
        } else if self.review_required {
            Decision::Review
        } else {
            Decision::Declined
        }
    }
}

/// Raw BNPL features before normalization; absent fields take defaults
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBnplFeatures {
    /// Requested amount
    #[serde(default)]
    pub amount: Option<f64>,

    /// Requested tenor in months
    #[serde(default)]
    pub tenor: Option<f64>,

    /// Historical on-time payment rate
    #[serde(default)]
    pub on_time_rate: Option<f64>,

    /// Current credit utilization
    #[serde(default)]
    pub utilization: Option<f64>,
}

/// Normalized BNPL features
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BnplFeatures {
    /// Amount, clamped to the configured amount band
    pub amount: f64,

    /// Tenor in months, clamped to the configured tenor band
    pub tenor: u32,

    /// On-time payment rate in [0, 1]
    pub on_time_rate: f64,

    /// Utilization in [0, 1]
    pub utilization: f64,
}

/// Amount signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountSignal {
    /// Below 500
    LowAmount,
    /// Between 500 and 3000
    ModerateAmount,
    /// Above 3000
    HighAmount,
}

/// Tenor signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TenorSignal {
    /// Three months or less
    ShortTerm,
    /// Four to eight months
    MediumTerm,
    /// Nine months or more
    LongTerm,
}

/// Payment history signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentSignal {
    /// On-time rate >= 0.95
    ExcellentHistory,
    /// On-time rate >= 0.85
    GoodHistory,
    /// On-time rate >= 0.70
    FairHistory,
    /// Anything lower
    PoorHistory,
}

/// Utilization signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationSignal {
    /// Utilization <= 0.3
    LowUtilization,
    /// Between 0.3 and 0.8
    ModerateUtilization,
    /// Utilization >= 0.8
    HighUtilization,
}

/// Overall risk signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskSignal {
    /// Score >= 0.8
    LowRisk,
    /// Score >= 0.6
    MediumRisk,
    /// Anything lower
    HighRisk,
}

/// Categorical key signals for explainability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySignals {
    /// Amount band
    pub amount_signal: AmountSignal,
    /// Tenor band
    pub tenor_signal: TenorSignal,
    /// Payment history band
    pub payment_signal: PaymentSignal,
    /// Utilization band
    pub utilization_signal: UtilizationSignal,
    /// Overall risk band
    pub risk_signal: RiskSignal,
}

/// Component sub-scores, each in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponents {
    /// Amount component
    pub amount_score: f64,
    /// Tenor component
    pub tenor_score: f64,
    /// On-time rate component
    pub on_time_score: f64,
    /// Utilization component
    pub utilization_score: f64,
}

/// Component weights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Amount weight
    pub amount: f64,
    /// Tenor weight
    pub tenor: f64,
    /// On-time rate weight
    pub on_time_rate: f64,
    /// Utilization weight
    pub utilization: f64,
}

/// BNPL scoring result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BnplScoreResult {
    /// Weighted score in [0, 1], rounded to 3 decimals
    pub score: f64,
    /// Key signals
    pub key_signals: KeySignals,
    /// Rounded component scores
    pub components: ScoreComponents,
    /// Weights used
    pub weights: ScoreWeights,
}

/// BNPL offer derived from a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BnplQuote {
    /// Approved limit
    pub limit: f64,
    /// Annual percentage rate, in percent
    pub apr: f64,
    /// Approved term in months
    pub term_months: u32,
    /// Monthly payment
    pub monthly_payment: f64,
    /// Score the quote was derived from
    pub score: f64,
    /// Whether the offer is approved
    pub approved: bool,
}
