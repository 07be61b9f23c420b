//! Wallet/chain collaborator
//!
//! The dashboard only needs to read the active chain and ask the wallet to
//! switch. Signing and connection handshakes belong to the wallet itself.

use crate::{constants::SUPPORTED_CHAINS, error::WalletError, types::Chain};
use async_trait::async_trait;
use std::sync::RwLock;

#[async_trait]
pub trait ChainSelector: Send + Sync {
    /// Chain the wallet is currently connected to
    fn active_chain(&self) -> Option<Chain>;

    /// Chains the wallet may switch to
    fn supported_chains(&self) -> &[Chain];

    /// Asks the wallet to switch chains. On error the active chain is unchanged.
    async fn switch_chain(&self, chain_id: u64) -> Result<Chain, WalletError>;
}

/// In-memory selector over a fixed chain list
#[derive(Debug)]
pub struct StaticChainSelector {
    chains: Vec<Chain>,
    active: RwLock<Option<Chain>>,
}

impl StaticChainSelector {
    /// Selector over `chains`, connected to the first one
    pub fn new(chains: Vec<Chain>) -> Self {
        let active = chains.first().copied();
        Self {
            chains,
            active: RwLock::new(active),
        }
    }
}

impl Default for StaticChainSelector {
    fn default() -> Self {
        Self::new(SUPPORTED_CHAINS.to_vec())
    }
}

#[async_trait]
impl ChainSelector for StaticChainSelector {
    fn active_chain(&self) -> Option<Chain> {
        *self.active.read().unwrap_or_else(|e| e.into_inner())
    }

    fn supported_chains(&self) -> &[Chain] {
        &self.chains
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<Chain, WalletError> {
        let chain = self
            .chains
            .iter()
            .find(|c| c.chain_id == chain_id)
            .copied()
            .ok_or(WalletError::UnsupportedChain(chain_id))?;

        *self.active.write().unwrap_or_else(|e| e.into_inner()) = Some(chain);
        log::debug!("Switched active chain to {} ({})", chain.name, chain.chain_id);
        Ok(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_first_supported_chain() {
        let selector = StaticChainSelector::default();
        assert_eq!(selector.active_chain().map(|c| c.name), Some("Ethereum"));
        assert_eq!(selector.supported_chains().len(), 3);
    }

    #[tokio::test]
    async fn test_switch_chain() {
        let selector = StaticChainSelector::default();
        let chain = selector.switch_chain(8453).await.unwrap();
        assert_eq!(chain.slug, "base");
        assert_eq!(selector.active_chain(), Some(chain));
    }

    #[tokio::test]
    async fn test_unsupported_chain_keeps_active() {
        let selector = StaticChainSelector::default();
        selector.switch_chain(137).await.unwrap();

        let err = selector.switch_chain(56).await.unwrap_err();
        assert_eq!(err, WalletError::UnsupportedChain(56));
        assert_eq!(selector.active_chain().map(|c| c.chain_id), Some(137));
    }

    #[test]
    fn test_empty_selector_has_no_active_chain() {
        let selector = StaticChainSelector::new(Vec::new());
        assert!(selector.active_chain().is_none());
    }
}
