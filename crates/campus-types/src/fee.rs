//! Fee enumerations and the derived fee status

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Billing frequency of a fee type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeFrequency {
    /// Charged once per session
    OneTime,
    Monthly,
    Quarterly,
    Yearly,
}

impl FeeFrequency {
    /// Get the frequency as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneTime => "one_time",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for FeeFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FeeFrequency {
    type Err = FeeValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one_time" => Ok(Self::OneTime),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(FeeValueParseError {
                kind: "fee frequency",
                value: s.to_string(),
            }),
        }
    }
}

/// How a payment was made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Card,
    Cheque,
    BankTransfer,
    Online,
}

impl PaymentMode {
    /// Get the payment mode as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Cheque => "cheque",
            Self::BankTransfer => "bank_transfer",
            Self::Online => "online",
        }
    }
}

impl std::fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = FeeValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            "card" => Ok(Self::Card),
            "cheque" => Ok(Self::Cheque),
            "bank_transfer" => Ok(Self::BankTransfer),
            "online" => Ok(Self::Online),
            _ => Err(FeeValueParseError {
                kind: "payment mode",
                value: s.to_string(),
            }),
        }
    }
}

/// Error parsing a fee enumeration from a string
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct FeeValueParseError {
    pub kind: &'static str,
    pub value: String,
}

/// Settlement state of a student fee.
///
/// Never stored: always derived from the amounts and the due date, so the
/// ledger cannot drift out of sync with its own balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeStatus {
    /// Nothing paid yet
    Pending,
    /// Partially paid
    Partial,
    /// Fully settled
    Paid,
    /// Due date passed with a balance outstanding
    Overdue,
}

impl FeeStatus {
    /// Derive the status of a fee from its amounts and due date.
    ///
    /// Paid takes precedence over everything, then overdue, then partial
    /// versus pending. A fee is overdue only once `today` is strictly past
    /// the due date.
    pub fn derive(
        amount_due_cents: i64,
        amount_paid_cents: i64,
        due_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> Self {
        if amount_paid_cents >= amount_due_cents {
            return Self::Paid;
        }
        if let Some(due) = due_date {
            if today > due {
                return Self::Overdue;
            }
        }
        if amount_paid_cents > 0 {
            Self::Partial
        } else {
            Self::Pending
        }
    }

    /// Get the status as a string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Partial => "partial",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
        }
    }
}

impl std::fmt::Display for FeeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
