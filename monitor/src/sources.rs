//! External collaborators the monitor reads from.
//!
//! Every source is a trait object so the monitor can be wired to HTTP
//! clients in production and to deterministic nullables in tests. Sources
//! are read-only from the monitor's point of view.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use repwatch_types::{RawAmount, RepAddress, Timestamp};

use crate::SourceError;

/// A wallet account as the wallet collaborator reports it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: RepAddress,
    pub balance: RawAmount,
    /// `None` while the account has not chosen a representative yet.
    #[serde(default)]
    pub representative: Option<RepAddress>,
}

impl Account {
    pub fn new(id: impl Into<RepAddress>, balance: RawAmount, representative: Option<RepAddress>) -> Self {
        Self {
            id: id.into(),
            balance,
            representative,
        }
    }

    /// The representative id, treating an empty id as "not chosen".
    pub fn delegate(&self) -> Option<&RepAddress> {
        self.representative
            .as_ref()
            .filter(|rep| !rep.as_str().trim().is_empty())
    }
}

/// Ledger fields for a representative account (`account_info`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerAccountInfo {
    #[serde(default)]
    pub frontier: String,
    #[serde(default)]
    pub open_block: String,
    #[serde(default)]
    pub representative_block: String,
    #[serde(default)]
    pub balance: RawAmount,
    #[serde(default)]
    pub modified_timestamp: u64,
    #[serde(default)]
    pub block_count: u64,
    #[serde(default)]
    pub confirmation_height: u64,
    /// The representative this representative account itself delegates to.
    #[serde(default)]
    pub representative: Option<RepAddress>,
    /// Total voting weight the ledger attributes to this account.
    #[serde(default)]
    pub weight: RawAmount,
    #[serde(default)]
    pub receivable: RawAmount,
}

/// A representative node reported by the crawler. Other fields the
/// crawler sends (weight, version, ...) are ignored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawledRepresentative {
    pub address: RepAddress,
    #[serde(default)]
    pub online: bool,
}

/// Uptime history and reputation for one representative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UptimeRecord {
    pub id: RepAddress,
    pub daily_pct: f64,
    pub weekly_pct: f64,
    pub monthly_pct: f64,
    pub score: f64,
    #[serde(default)]
    pub last_voted_at: Option<Timestamp>,
    #[serde(default)]
    pub closing: bool,
    #[serde(default)]
    pub donation_address: Option<RepAddress>,
    /// Public alias the reputation provider knows the representative by.
    #[serde(default)]
    pub alias: Option<String>,
}

/// Provides the wallet's accounts.
#[async_trait]
pub trait WalletAccounts: Send + Sync {
    async fn accounts_details(&self) -> Result<Vec<Account>, SourceError>;
}

/// Ledger node queries.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Ledger fields of `account`, including its voting weight.
    async fn account_info(&self, account: &RepAddress) -> Result<LedgerAccountInfo, SourceError>;

    /// Representatives the node currently sees voting.
    async fn representatives_online(&self) -> Result<Vec<RepAddress>, SourceError>;

    /// Total online stake, or `None` if the node does not report one.
    async fn confirmation_quorum(&self) -> Result<Option<RawAmount>, SourceError>;
}

/// Peer crawler reporting reachable representative nodes.
#[async_trait]
pub trait CrawlerSource: Send + Sync {
    async fn representatives(
        &self,
        min_weight: u64,
        online_only: bool,
    ) -> Result<Vec<CrawledRepresentative>, SourceError>;
}

/// Uptime / reputation provider.
#[async_trait]
pub trait ReputationSource: Send + Sync {
    /// `Ok(None)` means the provider does not know the account.
    async fn account_reputation(
        &self,
        account: &RepAddress,
    ) -> Result<Option<UptimeRecord>, SourceError>;
}

/// The full set of collaborators an overview is computed from.
#[derive(Clone)]
pub struct Sources {
    pub wallet: Arc<dyn WalletAccounts>,
    pub ledger: Arc<dyn LedgerRpc>,
    pub crawler: Arc<dyn CrawlerSource>,
    pub reputation: Arc<dyn ReputationSource>,
}

impl Sources {
    pub fn new(
        wallet: Arc<dyn WalletAccounts>,
        ledger: Arc<dyn LedgerRpc>,
        crawler: Arc<dyn CrawlerSource>,
        reputation: Arc<dyn ReputationSource>,
    ) -> Self {
        Self {
            wallet,
            ledger,
            crawler,
            reputation,
        }
    }
}
