//! Error types for the market dashboard

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification of a failed provider call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The request could not complete (connection, DNS, timeout)
    NetworkFailure,
    /// The provider answered with a non-success status
    ProviderError,
    /// The provider answered with a body of unexpected shape
    MalformedResponse,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FailureKind::NetworkFailure => "network failure",
            FailureKind::ProviderError => "provider error",
            FailureKind::MalformedResponse => "malformed response",
        };
        f.write_str(label)
    }
}

/// Errors that can occur when fetching data from a provider
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Timeout waiting for response
    #[error("Request timeout")]
    Timeout,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Provider API error
    #[error("Provider API error: {0}")]
    ApiError(String),

    /// Invalid response from provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Maps the error onto the failure taxonomy shown to callers
    pub fn kind(&self) -> FailureKind {
        match self {
            ProviderError::NetworkError(e) if e.is_decode() => FailureKind::MalformedResponse,
            ProviderError::NetworkError(e) if e.is_status() => FailureKind::ProviderError,
            ProviderError::NetworkError(_) | ProviderError::Timeout => FailureKind::NetworkFailure,
            ProviderError::RateLimitExceeded | ProviderError::ApiError(_) => {
                FailureKind::ProviderError
            }
            ProviderError::InvalidResponse(_) => FailureKind::MalformedResponse,
        }
    }
}

/// Errors raised by the wallet/chain collaborator
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WalletError {
    /// Chain id is not in the supported set
    #[error("Chain {0} is not supported")]
    UnsupportedChain(u64),

    /// Wallet refused or failed the switch
    #[error("Wallet rejected the request: {0}")]
    Rejected(String),
}

/// User-facing dashboard errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DashboardError {
    /// A market page could not be loaded; retry with the same page
    #[error("Failed to load page {page} ({kind}): {message}")]
    LoadFailed {
        page: u32,
        kind: FailureKind,
        message: String,
    },

    /// Switching the active chain failed; the previous chain stays active
    #[error("Failed to switch to chain {chain_id}: {message}")]
    ChainSwitch { chain_id: u64, message: String },
}

impl DashboardError {
    /// Creates a LoadFailed error from a provider error
    pub fn load_failed(page: u32, err: &ProviderError) -> Self {
        Self::LoadFailed {
            page,
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Creates a ChainSwitch error
    pub fn chain_switch(chain_id: u64, err: &WalletError) -> Self {
        Self::ChainSwitch {
            chain_id,
            message: err.to_string(),
        }
    }

    /// True when re-issuing the same operation may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, DashboardError::LoadFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_kinds() {
        assert_eq!(ProviderError::Timeout.kind(), FailureKind::NetworkFailure);
        assert_eq!(
            ProviderError::RateLimitExceeded.kind(),
            FailureKind::ProviderError
        );
        assert_eq!(
            ProviderError::ApiError("HTTP 500".to_string()).kind(),
            FailureKind::ProviderError
        );
        assert_eq!(
            ProviderError::InvalidResponse("not json".to_string()).kind(),
            FailureKind::MalformedResponse
        );
    }

    #[test]
    fn test_load_failed_carries_kind() {
        let err = DashboardError::load_failed(3, &ProviderError::RateLimitExceeded);
        assert!(err.is_retryable());
        match err {
            DashboardError::LoadFailed { page, kind, .. } => {
                assert_eq!(page, 3);
                assert_eq!(kind, FailureKind::ProviderError);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_chain_switch_not_retryable() {
        let err = DashboardError::chain_switch(10, &WalletError::UnsupportedChain(10));
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("not supported"));
    }
}
