//! Representative delegation monitor.
//!
//! Folds a wallet's accounts into per-representative delegation, joins each
//! representative with ledger, online, quorum and uptime data, and classifies
//! it into a status tier with a flag set saying whether the wallet should
//! move its delegation elsewhere.
//!
//! ## Module overview
//!
//! - [`rep_weights`]: Per-representative weight aggregation.
//! - [`sources`]: Collaborator traits (wallet, ledger, crawler, uptime).
//! - [`online`]: Online set resolution with crawler → node fallback.
//! - [`status`]: The classifier.
//! - [`change`]: Change-recommendation filter.
//! - [`known_list`]: Persisted known-representative list.
//! - [`blocklist`]: Hardcoded non-functional representatives.
//! - [`overview`]: Composed per-representative result.
//! - [`monitor`]: The session tying it together.

pub mod blocklist;
pub mod change;
pub mod config;
pub mod error;
pub mod known_list;
pub mod monitor;
pub mod online;
pub mod overview;
pub mod rep_weights;
pub mod sources;
pub mod status;

pub use blocklist::Blocklist;
pub use change::detect_changes;
pub use config::MonitorConfig;
pub use error::{KnownListError, MonitorError, SourceError};
pub use known_list::{default_known_entries, KnownEntry, KnownListManager};
pub use monitor::RepresentativeMonitor;
pub use online::{resolve_online_set, OnlineSet};
pub use overview::FullOverview;
pub use rep_weights::{aggregate_delegates, DelegateWeight, DelegateWeights};
pub use sources::{
    Account, CrawledRepresentative, CrawlerSource, LedgerAccountInfo, LedgerRpc, ReputationSource,
    Sources, UptimeRecord, WalletAccounts,
};
pub use status::{
    classify, Classification, ClassifierInput, RepresentativeStatus, StatusTier, UptimeSignal,
    WeightShare,
};
