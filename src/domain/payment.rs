use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Globally unique payment identifier, assigned at construction and
/// immutable afterwards.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
pub struct PaymentId(Uuid);

impl PaymentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Big-endian byte view, used as the storage key by persistent backends.
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for PaymentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PaymentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PaymentId {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| PaymentError::InvalidArguments(format!("malformed payment id '{s}'")))
    }
}

/// Represents a positive monetary amount.
///
/// This is a wrapper around `rust_decimal::Decimal` to enforce domain-specific
/// rules and provide type safety for financial calculations.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::InvalidArguments(
                "amount must be positive".to_string(),
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The supported settlement currencies.
///
/// Input is parsed case-insensitively; the stored and rendered form is the
/// upper-case ISO code.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
}

impl Currency {
    pub const SUPPORTED: [&'static str; 3] = ["USD", "EUR", "GBP"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Currency {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "GBP" => Ok(Currency::Gbp),
            other => Err(PaymentError::InvalidArguments(format!(
                "currency '{other}' is not supported (expected one of {})",
                Currency::SUPPORTED.join(", ")
            ))),
        }
    }
}

/// Lifecycle states of a payment.
///
/// The happy path moves `Initiated -> Validated -> Authorized -> Captured`;
/// `Failed` and `Cancelled` are the alternate terminal states. Transitions
/// only ever move forward.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Initiated,
    Validated,
    Authorized,
    Captured,
    Failed,
    Cancelled,
}

impl PaymentStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Captured | PaymentStatus::Failed | PaymentStatus::Cancelled
        )
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Initiated => "initiated",
            PaymentStatus::Validated => "validated",
            PaymentStatus::Authorized => "authorized",
            PaymentStatus::Captured => "captured",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// The payment record.
///
/// All fields are private; state only changes through the named transition
/// methods below, which enforce the lifecycle guards. Records are never
/// deleted; terminal records remain as the audit trail of the attempt.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Payment {
    id: PaymentId,
    amount: Amount,
    currency: Currency,
    status: PaymentStatus,
    gateway_transaction_id: Option<String>,
    failure_reason: Option<String>,
    created_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
}

impl Payment {
    /// Constructs a new payment in `Initiated` state.
    ///
    /// Fails with [`PaymentError::InvalidArguments`] for a non-positive
    /// amount or an unsupported currency, before anything is persisted.
    pub fn new(amount: Decimal, currency: &str) -> Result<Self> {
        Ok(Self {
            id: PaymentId::new(),
            amount: Amount::new(amount)?,
            currency: currency.parse()?,
            status: PaymentStatus::Initiated,
            gateway_transaction_id: None,
            failure_reason: None,
            created_at: Utc::now(),
            processed_at: None,
        })
    }

    pub fn id(&self) -> PaymentId {
        self.id
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Set if and only if the payment reached `Authorized` on the success path.
    pub fn gateway_transaction_id(&self) -> Option<&str> {
        self.gateway_transaction_id.as_deref()
    }

    /// Set if and only if the payment is `Failed`.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Set once, on reaching any terminal state.
    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    /// Marks the initiated payment as validated.
    pub fn validate(&mut self) -> Result<()> {
        self.guard("validate", PaymentStatus::Initiated)?;
        self.status = PaymentStatus::Validated;
        Ok(())
    }

    /// Records a successful authorization and the gateway's transaction
    /// reference.
    pub fn authorize(&mut self, transaction_ref: impl Into<String>) -> Result<()> {
        self.guard("authorize", PaymentStatus::Validated)?;
        self.status = PaymentStatus::Authorized;
        self.gateway_transaction_id = Some(transaction_ref.into());
        Ok(())
    }

    /// Finalizes the authorized charge.
    pub fn capture(&mut self) -> Result<()> {
        self.guard("capture", PaymentStatus::Authorized)?;
        self.status = PaymentStatus::Captured;
        self.processed_at = Some(Utc::now());
        Ok(())
    }

    /// Voids an authorization before capture. Cancellation requires a prior
    /// authorization; there is nothing to void earlier in the lifecycle.
    pub fn cancel(&mut self) -> Result<()> {
        self.guard("cancel", PaymentStatus::Authorized)?;
        self.status = PaymentStatus::Cancelled;
        self.processed_at = Some(Utc::now());
        Ok(())
    }

    /// Moves the payment to `Failed`, recording the reason. Legal from any
    /// non-terminal state.
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<()> {
        if self.status.is_terminal() {
            return Err(PaymentError::InvalidTransition {
                operation: "fail",
                state: self.status,
            });
        }
        self.status = PaymentStatus::Failed;
        self.failure_reason = Some(reason.into());
        self.processed_at = Some(Utc::now());
        Ok(())
    }

    fn guard(&self, operation: &'static str, expected: PaymentStatus) -> Result<()> {
        if self.status == expected {
            Ok(())
        } else {
            Err(PaymentError::InvalidTransition {
                operation,
                state: self.status,
            })
        }
    }
}
