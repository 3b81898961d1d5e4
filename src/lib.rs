#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Async client for Venmo's private REST and GraphQL API.
//!
//! The crate covers identity lookup, balance, transaction history,
//! funding-source selection, and moving money (pay and request). It does no
//! retrying, rate limiting or token refresh: every failure is returned to the
//! caller immediately, classified and with the upstream status and code kept.
//!
//! # Layers
//!
//! - [`transport`] - The [`Transport`] seam and the default [`ReqwestTransport`]
//! - [`normalize`] - Maps status + body to a JSON payload or a [`VenmoError`]
//! - [`client`] - [`VenmoClient`], one typed method per endpoint
//! - [`session`] - [`VenmoSession`], cached identity plus account and payment operations
//!
//! Wire types, configuration and the funding-source policy live in the
//! [`venmo_types`] crate and are re-exported here.
//!
//! # Example
//!
//! ```rust,no_run
//! use venmo_rs::{Audience, Decimal, VenmoConfig, VenmoSession};
//!
//! # async fn run() -> Result<(), venmo_rs::VenmoError> {
//! let config = VenmoConfig::new("ACCESS_TOKEN");
//! let session = VenmoSession::connect(&config).await?;
//!
//! println!("balance: {}", session.get_balance()?);
//! for identity in session.get_handle().await? {
//!     println!("@{} ({})", identity.handle, identity.kind);
//! }
//! session
//!     .request_user("Jane-Doe-7", Decimal::new(2000, 2), "concert", Audience::Friends)
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Feature Flags
//!
//! - `telemetry` (default) - `tracing` spans and events for every request and
//!   funding-source decision. Access tokens are never recorded.

pub mod client;
pub mod error;
pub mod normalize;
pub mod session;
pub mod transport;
pub mod user_agent;

pub use client::VenmoClient;
pub use error::{ApiErrorKind, ValidationError, VenmoError};
pub use session::VenmoSession;
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};

pub use venmo_types::Decimal;
pub use venmo_types::config::VenmoConfig;
pub use venmo_types::funding::{FundingSelector, PeerPaymentPriority, SelectionContext};
pub use venmo_types::proto::{Audience, Balance};
