//! GraphQL request envelopes and error detection.
//!
//! The query documents are opaque payloads copied from the mobile client; only
//! the fields later decoded by [`super::wallet`] and [`AvailableIdentity`]
//! matter to this crate.

use serde::{Deserialize, Serialize};

/// Fetches the wallet (funding instruments with roles and balances).
pub const WALLET_QUERY: &str = r#"
query getUserFundingInstruments {
  profile {
    ... on Profile {
      identity {
        ... on Identity {
          capabilities
          __typename
        }
        __typename
      }
      wallet {
        id
        assets {
          logoThumbnail
          __typename
        }
        instrumentType
        name
        fees {
          feeType
          fixedAmount
          variablePercentage
          __typename
        }
        metadata {
          ...BalanceMetadata
          ... on BankFundingInstrumentMetadata {
            bankName
            isVerified
            lastFourDigits
            uniqueIdentifier
            __typename
          }
          ... on CardFundingInstrumentMetadata {
            issuerName
            lastFourDigits
            networkName
            isVenmoCard
            expirationStatus
            quasiCash
            __typename
          }
          __typename
        }
        roles {
          merchantPayments
          peerPayments
          __typename
        }
        __typename
      }
      __typename
    }
    __typename
  }
}

fragment BalanceMetadata on BalanceFundingInstrumentMetadata {
  availableBalance {
    value
    transactionType
    displayString
    __typename
  }
  __typename
}
"#;

/// Fetches the personal and business identities the token can act as.
pub const IDENTITY_QUERY: &str = r#"
query Identity {
  profile {
    ... on Profile {
      availableIdentities {
        ... on BusinessIdentity {
          handle
          type
        }
        ... on Identity {
          handle
          type
        }
      }
    }
  }
}
"#;

/// The `{query, operationName, variables}` POST body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest {
    pub query: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<serde_json::Value>,
}

impl GraphQlRequest {
    /// Wallet lookup. Sent with the bare `query` field only.
    pub fn wallet() -> Self {
        Self {
            query: WALLET_QUERY,
            operation_name: None,
            variables: None,
        }
    }

    /// Available identities, sent as the named `Identity` operation.
    pub fn identity() -> Self {
        Self {
            query: IDENTITY_QUERY,
            operation_name: Some("Identity"),
            variables: Some(serde_json::Value::Object(Default::default())),
        }
    }
}

/// One account the token may act as (personal or business).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableIdentity {
    pub handle: String,
    /// `"personal"`, `"business"`, ... as reported upstream.
    #[serde(rename = "type")]
    pub kind: String,
}

/// Returns the first message of a non-empty top-level `errors` array.
///
/// GraphQL reports failures with HTTP 200, so this has to be checked on
/// otherwise successful responses.
pub fn first_error_message(body: &serde_json::Value) -> Option<String> {
    let first = body.get("errors")?.as_array()?.first()?;
    let message = first
        .get("message")
        .and_then(|m| m.as_str())
        .unwrap_or("Unknown GraphQL error");
    Some(message.to_string())
}
