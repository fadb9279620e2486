use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Health factor of an account: weighted collateral over debt.
///
/// An account with no debt cannot be liquidated, which is represented by the
/// `NoDebt` sentinel rather than a huge number. Variant order makes `NoDebt`
/// compare greater than every finite ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HealthFactor {
    Ratio(Decimal),
    NoDebt,
}

impl HealthFactor {
    /// The finite ratio, if the account carries debt.
    pub fn ratio(self) -> Option<Decimal> {
        match self {
            Self::Ratio(r) => Some(r),
            Self::NoDebt => None,
        }
    }

    pub fn is_no_debt(self) -> bool {
        matches!(self, Self::NoDebt)
    }

    /// Finite value for consumers that compare numerically.
    pub fn or_cap(self, cap: Decimal) -> Decimal {
        self.ratio().unwrap_or(cap)
    }

    /// Apply `f` to the ratio, leaving the sentinel untouched.
    pub fn map(self, f: impl FnOnce(Decimal) -> Decimal) -> Self {
        match self {
            Self::Ratio(r) => Self::Ratio(f(r)),
            Self::NoDebt => Self::NoDebt,
        }
    }
}

impl fmt::Display for HealthFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ratio(r) => write!(f, "{r}"),
            Self::NoDebt => write!(f, "inf"),
        }
    }
}

/// `NoDebt` serializes as `null`; ratios as decimal strings.
impl Serialize for HealthFactor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ratio(r) => serializer.serialize_some(&r.to_string()),
            Self::NoDebt => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for HealthFactor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(Self::NoDebt),
            Some(s) => Decimal::from_str(&s)
                .map(Self::Ratio)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// Risk band of a health factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthTier {
    /// HF < 1.0: the account can be liquidated.
    Liquidatable,
    /// 1.0 to 1.2.
    Danger,
    /// 1.2 to 1.5.
    AtRisk,
    /// 1.5 to 2.0.
    Stable,
    /// HF >= 2.0 or no debt.
    Safe,
}

/// Headroom left for new borrows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowingPower {
    /// `max(0, weighted collateral - debt)`.
    pub max_borrow_usd: Decimal,
    /// Share of weighted collateral still unused, in percent.
    pub power_percent: Decimal,
}
