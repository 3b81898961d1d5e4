#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for talking to Venmo's private API.
//!
//! This crate holds everything in `venmo-rs` that does not touch the network:
//! the wire shapes of the responses we consume, the transfer request body,
//! client configuration, and the funding-source selection policy that decides
//! which wallet instrument pays for an outgoing transfer.
//!
//! # Modules
//!
//! - [`config`] - Client configuration and `$VAR` / `${VAR}` resolution for secrets
//! - [`funding`] - Funding-source selection ([`funding::FundingSelector`] and the default policy)
//! - [`proto`] - Wire types: identity snapshots, wallet instruments, transfers, GraphQL envelopes
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing events inside the selection policy

pub mod config;
pub mod funding;
pub mod proto;

pub use rust_decimal::Decimal;
