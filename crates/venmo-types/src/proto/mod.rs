//! Wire types for the Venmo endpoints this crate consumes.
//!
//! Only the fields that are actually read are modelled. Everything else in a
//! response is carried opaquely as [`serde_json::Value`] so that upstream
//! additions never break decoding.
//!
//! # Key Types
//!
//! - [`IdentitySnapshot`] - Payload of `GET /account`
//! - [`UserProfile`] - Payload of `GET /users/{id}`
//! - [`TransferRequest`] - Body of `POST /payments`
//! - [`wallet::FundingInstrument`] - One entry of the GraphQL wallet
//! - [`graphql::GraphQlRequest`] - The `{query, operationName, variables}` envelope
//!
//! # Extraction
//!
//! Every typed read from a response goes through [`extract`], which looks up a
//! dotted field path and decodes it. A missing or mistyped field becomes an
//! [`ExtractionError`] naming the operation and the path.

use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub mod graphql;
pub mod wallet;

/// An expected field was absent from, or malformed in, a response.
///
/// This signals either upstream contract drift or a broken response. Financial
/// fields are never defaulted, so this is surfaced to the caller as-is.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("{operation}: missing field `{path}` in response")]
    Missing {
        /// The operation that was reading the response (e.g. `"get_balance"`).
        operation: &'static str,
        /// Dotted path of the field (e.g. `"data.user.id"`).
        path: &'static str,
    },
    #[error("{operation}: malformed field `{path}` in response: {source}")]
    Malformed {
        operation: &'static str,
        path: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl ExtractionError {
    pub fn operation(&self) -> &'static str {
        match self {
            ExtractionError::Missing { operation, .. }
            | ExtractionError::Malformed { operation, .. } => operation,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            ExtractionError::Missing { path, .. } | ExtractionError::Malformed { path, .. } => path,
        }
    }
}

/// Reads the field at dotted `path` inside `value` and decodes it as `T`.
///
/// A JSON `null` counts as missing.
pub fn extract<T>(
    value: &serde_json::Value,
    path: &'static str,
    operation: &'static str,
) -> Result<T, ExtractionError>
where
    T: DeserializeOwned,
{
    let pointer = format!("/{}", path.replace('.', "/"));
    let field = value
        .pointer(&pointer)
        .filter(|v| !v.is_null())
        .ok_or(ExtractionError::Missing { operation, path })?;
    T::deserialize(field).map_err(|source| ExtractionError::Malformed {
        operation,
        path,
        source,
    })
}

/// Cached payload of `GET /account`.
///
/// Held verbatim; the typed accessors decode on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentitySnapshot(serde_json::Value);

impl IdentitySnapshot {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    /// The authenticated user's internal id (`data.user.id`).
    pub fn user_id(&self, operation: &'static str) -> Result<String, ExtractionError> {
        extract::<ResourceId>(&self.0, "data.user.id", operation).map(ResourceId::into_inner)
    }

    /// The account balance (`data.balance`).
    pub fn balance(&self, operation: &'static str) -> Result<Balance, ExtractionError> {
        extract(&self.0, "data.balance", operation)
    }

    /// Whether the account is limited (`data.is_limited_account`).
    pub fn is_limited_account(&self, operation: &'static str) -> Result<bool, ExtractionError> {
        extract(&self.0, "data.is_limited_account", operation)
    }
}

/// Payload of `GET /users/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserProfile(serde_json::Value);

impl UserProfile {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }

    /// The internal id used as a transfer recipient (`data.id`).
    pub fn id(&self, operation: &'static str) -> Result<String, ExtractionError> {
        extract::<ResourceId>(&self.0, "data.id", operation).map(ResourceId::into_inner)
    }
}

/// An upstream identifier.
///
/// Ids have been seen both as strings and as JSON numbers; both decode to the
/// same string form so they can be placed in URLs and transfer bodies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl<'de> Deserialize<'de> for ResourceId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(serde_json::Number),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Text(id) => Ok(ResourceId(id)),
            Repr::Number(id) => Ok(ResourceId(id.to_string())),
        }
    }
}

/// An account balance.
///
/// The API has been seen to report the balance as a bare number, as a numeric
/// string, and as an object with a `value` field. All three decode here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Balance(pub Decimal);

impl Balance {
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl<'de> Deserialize<'de> for Balance {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Plain(Decimal),
            Wrapped { value: Decimal },
        }
        match Repr::deserialize(deserializer)? {
            Repr::Plain(value) | Repr::Wrapped { value } => Ok(Balance(value)),
        }
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Who can see a transfer in the feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    Private,
    Public,
    Friends,
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Audience::Private => "private",
            Audience::Public => "public",
            Audience::Friends => "friends",
        };
        f.write_str(s)
    }
}

/// Body of `POST /payments`.
///
/// A positive `amount` pays the recipient out of `funding_source_id`; a
/// negative one requests money from them and carries no funding source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_source_id: Option<String>,
    pub user_id: String,
    pub audience: Audience,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub note: String,
}

impl TransferRequest {
    /// An outgoing payment of `amount` funded by `funding_source_id`.
    pub fn payment(
        funding_source_id: String,
        user_id: String,
        amount: Decimal,
        note: String,
        audience: Audience,
    ) -> Self {
        Self {
            funding_source_id: Some(funding_source_id),
            user_id,
            audience,
            amount,
            note,
        }
    }

    /// A money request for `amount`; sent as a negative transfer.
    pub fn request(user_id: String, amount: Decimal, note: String, audience: Audience) -> Self {
        Self {
            funding_source_id: None,
            user_id,
            audience,
            amount: -amount,
            note,
        }
    }

    pub fn is_request(&self) -> bool {
        self.amount.is_sign_negative()
    }
}
