//! Wiring of the monitor's collaborators from configuration.

use std::sync::Arc;

use async_trait::async_trait;

use repwatch_clients::{CrawlerClient, NodeRpcClient, ReputationClient, RpcWalletAccounts};
use repwatch_monitor::{
    CrawledRepresentative, CrawlerSource, ReputationSource, SourceError, Sources, UptimeRecord,
};
use repwatch_types::RepAddress;

use crate::config::DaemonConfig;

/// Stand-in for a provider whose URL is not configured. Every call fails, so
/// the monitor degrades exactly as it would for an unreachable provider.
pub struct Unconfigured(&'static str);

#[async_trait]
impl CrawlerSource for Unconfigured {
    async fn representatives(
        &self,
        _min_weight: u64,
        _online_only: bool,
    ) -> Result<Vec<CrawledRepresentative>, SourceError> {
        Err(SourceError::Other(format!("{} not configured", self.0)))
    }
}

#[async_trait]
impl ReputationSource for Unconfigured {
    async fn account_reputation(
        &self,
        _account: &RepAddress,
    ) -> Result<Option<UptimeRecord>, SourceError> {
        Err(SourceError::Other(format!("{} not configured", self.0)))
    }
}

pub fn build_sources(config: &DaemonConfig) -> anyhow::Result<Sources> {
    let node = NodeRpcClient::new(config.node_url.clone())?;

    let accounts = config
        .accounts
        .iter()
        .map(|id| id.normalize(&config.monitor.address_prefix))
        .collect();
    let wallet = Arc::new(RpcWalletAccounts::new(node.clone(), accounts));

    let crawler: Arc<dyn CrawlerSource> = if config.crawler_url.is_empty() {
        Arc::new(Unconfigured("crawler"))
    } else {
        Arc::new(CrawlerClient::new(config.crawler_url.clone())?)
    };
    let reputation: Arc<dyn ReputationSource> = if config.reputation_url.is_empty() {
        Arc::new(Unconfigured("uptime provider"))
    } else {
        Arc::new(ReputationClient::new(config.reputation_url.clone())?)
    };

    Ok(Sources::new(wallet, Arc::new(node), crawler, reputation))
}
