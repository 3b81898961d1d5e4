//! Funding-source selection.
//!
//! Before money leaves the account, one wallet instrument has to be picked to
//! fund the transfer. [`FundingSelector`] is the seam for that decision and
//! [`PeerPaymentPriority`] is the policy used by default.

use rust_decimal::Decimal;

use crate::proto::wallet::{FundingInstrument, PaymentRole};

#[cfg(feature = "telemetry")]
use tracing::debug;

/// What a selector knows about the transfer being funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionContext {
    /// Transfer magnitude, always positive.
    pub amount: Decimal,
    /// Limited-account flag of the session. `None` means the identity has not
    /// established it yet.
    pub limited_account: Option<bool>,
}

impl SelectionContext {
    /// True only when the account is known not to be limited.
    pub fn primary_allowed(&self) -> bool {
        self.limited_account == Some(false)
    }
}

/// Picks the instrument that funds an outgoing transfer.
///
/// Returning `None` is not an error at this layer; the caller decides what an
/// unfunded transfer means.
pub trait FundingSelector: Send + Sync {
    fn select<'a>(
        &self,
        instruments: &'a [FundingInstrument],
        context: &SelectionContext,
    ) -> Option<&'a FundingInstrument>;
}

/// Default policy: balance first, then the backup, then any other active card.
///
/// A single pass records three candidates:
///
/// 1. **primary**: role `primary` with `availableBalance >= amount`, considered
///    only when the account is known not to be limited. An instrument without a
///    reported balance never qualifies.
/// 2. **backup**: role `backup`.
/// 3. **other active**: role `none` with `expirationStatus: "active"`.
///
/// The first present candidate in that order wins. When several instruments
/// match the same rank the last one in wallet order is kept.
///
/// Ranking the backup above other active instruments is a policy choice, not
/// something the API mandates. Balance-funded transfers carry no card or bank
/// fee, which is why the primary balance comes first.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeerPaymentPriority;

impl FundingSelector for PeerPaymentPriority {
    fn select<'a>(
        &self,
        instruments: &'a [FundingInstrument],
        context: &SelectionContext,
    ) -> Option<&'a FundingInstrument> {
        let mut primary = None;
        let mut backup = None;
        let mut other_active = None;

        for instrument in instruments {
            match instrument.peer_payments() {
                PaymentRole::Primary if context.primary_allowed() => {
                    match instrument.available_balance() {
                        Some(balance) if balance >= context.amount => primary = Some(instrument),
                        _ => {
                            #[cfg(feature = "telemetry")]
                            debug!(
                                instrument_id = %instrument.id,
                                available = ?instrument.available_balance(),
                                amount = %context.amount,
                                "Primary instrument cannot cover amount"
                            );
                        }
                    }
                }
                PaymentRole::Backup => backup = Some(instrument),
                PaymentRole::None if instrument.is_active() => other_active = Some(instrument),
                _ => {}
            }
        }

        primary.or(backup).or(other_active)
    }
}
