//! An initialized account session: cached identity plus the account and
//! payment operations built on it.
//!
//! ```rust,no_run
//! use venmo_rs::VenmoSession;
//! use venmo_types::Decimal;
//! use venmo_types::config::VenmoConfig;
//! use venmo_types::proto::Audience;
//!
//! # async fn run() -> Result<(), venmo_rs::VenmoError> {
//! let session = VenmoSession::connect(&VenmoConfig::new("ACCESS_TOKEN")).await?;
//! println!("balance: {}", session.get_balance()?);
//! session
//!     .pay_user("Jane-Doe-7", Decimal::new(1250, 2), "lunch", Audience::Private)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Concurrency
//!
//! Only [`VenmoSession::initialize`] and [`VenmoSession::get_identity`] mutate the
//! session, and both take `&mut self`. Every other operation takes `&self`, so
//! unrelated calls such as [`VenmoSession::get_balance`] and
//! [`VenmoSession::get_handle`] can run concurrently without locking.

use std::sync::Arc;
use venmo_types::Decimal;
use venmo_types::config::VenmoConfig;
use venmo_types::funding::{FundingSelector, PeerPaymentPriority, SelectionContext};
use venmo_types::proto::graphql::AvailableIdentity;
use venmo_types::proto::{Audience, Balance, IdentitySnapshot, TransferRequest, UserProfile};

use crate::client::VenmoClient;
use crate::error::{ValidationError, VenmoError};
use crate::transport::Transport;

#[cfg(feature = "telemetry")]
use tracing::{debug, info, instrument};

/// Session state and operations for one authenticated account.
///
/// `S` is the funding-source policy used by [`VenmoSession::pay_user`];
/// [`PeerPaymentPriority`] by default.
#[derive(Debug)]
pub struct VenmoSession<S = PeerPaymentPriority> {
    client: VenmoClient,
    selector: S,
    identity: Option<IdentitySnapshot>,
    transactions: Option<serde_json::Value>,
    is_limited_account: Option<bool>,
}

impl VenmoSession<PeerPaymentPriority> {
    /// Wraps a client without touching the network. Call
    /// [`VenmoSession::initialize`] before using identity-dependent operations.
    pub fn new(client: VenmoClient) -> Self {
        Self {
            client,
            selector: PeerPaymentPriority,
            identity: None,
            transactions: None,
            is_limited_account: None,
        }
    }

    /// Builds a session over the default transport and initializes it.
    pub async fn connect(config: &VenmoConfig) -> Result<Self, VenmoError> {
        let mut session = Self::new(VenmoClient::try_new(config)?);
        session.initialize().await?;
        Ok(session)
    }

    /// Builds a session over a caller-supplied transport and initializes it.
    pub async fn connect_with_transport(
        config: &VenmoConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, VenmoError> {
        let mut session = Self::new(VenmoClient::with_transport(config, transport)?);
        session.initialize().await?;
        Ok(session)
    }
}

impl<S> VenmoSession<S> {
    /// Replaces the funding-source policy.
    pub fn with_selector<P: FundingSelector>(self, selector: P) -> VenmoSession<P> {
        VenmoSession {
            client: self.client,
            selector,
            identity: self.identity,
            transactions: self.transactions,
            is_limited_account: self.is_limited_account,
        }
    }

    pub fn client(&self) -> &VenmoClient {
        &self.client
    }

    /// The cached `GET /account` payload, once fetched.
    pub fn identity(&self) -> Option<&IdentitySnapshot> {
        self.identity.as_ref()
    }

    /// The transaction feed cached by [`VenmoSession::initialize`].
    pub fn transactions(&self) -> Option<&serde_json::Value> {
        self.transactions.as_ref()
    }

    /// `None` until the identity has been fetched.
    pub fn is_limited_account(&self) -> Option<bool> {
        self.is_limited_account
    }

    /// Fetches the identity and then the transaction feed, caching both.
    ///
    /// The two requests run in order: the feed is scoped to the user id read
    /// from the identity.
    #[cfg_attr(feature = "telemetry", instrument(name = "venmo.session.initialize", skip_all, err))]
    pub async fn initialize(&mut self) -> Result<(), VenmoError> {
        self.get_identity().await?;
        let transactions = self.get_personal_transactions().await?;
        self.transactions = Some(transactions);
        #[cfg(feature = "telemetry")]
        info!(limited = ?self.is_limited_account, "Venmo session initialized");
        Ok(())
    }

    /// Fetches `GET /account`, caches it and updates the limited-account flag.
    ///
    /// If the payload lacks `data.is_limited_account` the call fails and the
    /// previous cache is left untouched.
    pub async fn get_identity(&mut self) -> Result<&IdentitySnapshot, VenmoError> {
        let identity = self.client.account().await?;
        let limited = identity.is_limited_account("get_identity")?;
        self.is_limited_account = Some(limited);
        Ok(self.identity.insert(identity))
    }

    /// Reads the balance from the cached identity. No request is made.
    pub fn get_balance(&self) -> Result<Balance, VenmoError> {
        let identity = self.cached_identity("get_balance")?;
        Ok(identity.balance("get_balance")?)
    }

    /// Fetches the transaction feed of the cached user.
    pub async fn get_personal_transactions(&self) -> Result<serde_json::Value, VenmoError> {
        let identity = self.cached_identity("get_personal_transactions")?;
        let user_id = identity.user_id("get_personal_transactions")?;
        self.client.stories(&user_id).await
    }

    /// Lists the personal and business identities available to the token.
    pub async fn get_handle(&self) -> Result<Vec<AvailableIdentity>, VenmoError> {
        self.client.available_identities().await
    }

    /// Looks up a user by username or id.
    pub async fn get_user(&self, user_id: &str) -> Result<UserProfile, VenmoError> {
        self.client.user(user_id).await
    }

    fn cached_identity(&self, operation: &'static str) -> Result<&IdentitySnapshot, VenmoError> {
        self.identity
            .as_ref()
            .ok_or(VenmoError::Validation(ValidationError::IdentityNotFetched { operation }))
    }
}

impl<S: FundingSelector> VenmoSession<S> {
    /// Fetches the wallet and returns the id of the instrument that should fund
    /// a transfer of `amount`, or `None` when no instrument is eligible.
    ///
    /// The wallet is fetched on every call; balances are never cached.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "venmo.session.get_payment_methods", skip(self), fields(amount = %amount), err)
    )]
    pub async fn get_payment_methods(&self, amount: Decimal) -> Result<Option<String>, VenmoError> {
        ensure_positive("get_payment_methods", amount)?;
        let instruments = self.client.wallet().await?;
        let context = SelectionContext {
            amount,
            limited_account: self.is_limited_account,
        };
        let selected = self.selector.select(&instruments, &context);

        #[cfg(feature = "telemetry")]
        debug!(
            instruments = instruments.len(),
            limited = ?context.limited_account,
            selected = ?selected.map(|i| i.id.as_str()),
            role = ?selected.map(|i| i.peer_payments()),
            "Resolved funding source"
        );

        Ok(selected.map(|instrument| instrument.id.clone()))
    }

    /// Pays `amount` to `user_id`.
    ///
    /// Resolves the recipient, then the funding source, then posts the
    /// transfer. Fails with [`ValidationError::NoFundingSource`] without posting
    /// anything when no instrument is eligible.
    ///
    /// This is a single attempt with no idempotency key. Calling it twice sends
    /// money twice; callers that retry on error must first check whether the
    /// earlier transfer went through.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "venmo.session.pay_user", skip(self, note), fields(amount = %amount, audience = %audience), err)
    )]
    pub async fn pay_user(
        &self,
        user_id: &str,
        amount: Decimal,
        note: impl Into<String>,
        audience: Audience,
    ) -> Result<serde_json::Value, VenmoError> {
        ensure_positive("pay_user", amount)?;
        let recipient_id = self.get_user(user_id).await?.id("pay_user")?;
        let funding_source_id = self
            .get_payment_methods(amount)
            .await?
            .ok_or(ValidationError::NoFundingSource)?;

        let transfer = TransferRequest::payment(
            funding_source_id,
            recipient_id,
            amount,
            note.into(),
            audience,
        );
        let response = self.client.create_transfer(&transfer).await?;
        #[cfg(feature = "telemetry")]
        info!(recipient_id = %transfer.user_id, funding_source_id = ?transfer.funding_source_id, "Payment sent");
        Ok(response)
    }

    /// Requests `amount` from `user_id`.
    ///
    /// Sent as a negative transfer with no funding source: asking for money
    /// does not require the requester to hold any. Same single-attempt caveat
    /// as [`VenmoSession::pay_user`]: repeated calls create repeated requests.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "venmo.session.request_user", skip(self, note), fields(amount = %amount, audience = %audience), err)
    )]
    pub async fn request_user(
        &self,
        user_id: &str,
        amount: Decimal,
        note: impl Into<String>,
        audience: Audience,
    ) -> Result<serde_json::Value, VenmoError> {
        ensure_positive("request_user", amount)?;
        let recipient_id = self.get_user(user_id).await?.id("request_user")?;
        let transfer = TransferRequest::request(recipient_id, amount, note.into(), audience);
        let response = self.client.create_transfer(&transfer).await?;
        #[cfg(feature = "telemetry")]
        info!(recipient_id = %transfer.user_id, "Payment request sent");
        Ok(response)
    }
}

fn ensure_positive(operation: &'static str, amount: Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_positive() && !amount.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::NonPositiveAmount { operation, amount })
    }
}
