//! Wallet entries returned by the `getUserFundingInstruments` GraphQL query.
//!
//! Balances change between calls, so instruments are decoded fresh for every
//! funding-source resolution and never cached.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A payment method in the wallet: the Venmo balance, a bank, or a card.
///
/// # Example
///
/// ```json
/// {
///   "id": "1234567890",
///   "name": "Venmo balance",
///   "instrumentType": "balance",
///   "roles": { "peerPayments": "primary", "merchantPayments": "none" },
///   "metadata": { "availableBalance": { "value": 25.5 } }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingInstrument {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_type: Option<String>,
    pub roles: InstrumentRoles,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InstrumentMetadata>,
    /// Fee schedule, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fees: Option<serde_json::Value>,
}

impl FundingInstrument {
    pub fn peer_payments(&self) -> PaymentRole {
        self.roles.peer_payments
    }

    /// Spendable balance, present only on balance-type instruments.
    pub fn available_balance(&self) -> Option<Decimal> {
        self.metadata
            .as_ref()?
            .available_balance
            .as_ref()
            .map(|b| b.value)
    }

    /// True when the card/bank metadata reports `expirationStatus: "active"`.
    pub fn is_active(&self) -> bool {
        self.metadata
            .as_ref()
            .and_then(|m| m.expiration_status)
            .is_some_and(|s| s == ExpirationStatus::Active)
    }
}

/// Per payment-type roles of an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentRoles {
    /// Role for person-to-person transfers. Required: every instrument carries it.
    pub peer_payments: PaymentRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_payments: Option<PaymentRole>,
}

/// Eligibility of an instrument for a payment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentRole {
    Primary,
    Backup,
    None,
    /// Any role string this crate does not know about.
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_balance: Option<AvailableBalance>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_status: Option<ExpirationStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailableBalance {
    pub value: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpirationStatus {
    Active,
    Expired,
    #[serde(other)]
    Other,
}
