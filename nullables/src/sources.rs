//! Nullable collaborators: scripted wallet, ledger, crawler and uptime
//! sources.
//!
//! Each nullable answers from an in-memory script, records what it was
//! asked, and can be given a per-id delay so tests can make responses
//! arrive out of order.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use repwatch_monitor::{
    Account, CrawledRepresentative, CrawlerSource, LedgerAccountInfo, LedgerRpc, ReputationSource,
    SourceError, UptimeRecord, WalletAccounts,
};
use repwatch_types::{RawAmount, RepAddress};

// ── Wallet ─────────────────────────────────────────────────────────────

/// A wallet whose accounts are set by the test.
pub struct NullWallet {
    accounts: Mutex<Result<Vec<Account>, SourceError>>,
}

impl NullWallet {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Mutex::new(Ok(accounts)),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            accounts: Mutex::new(Err(error)),
        }
    }

    pub fn set_accounts(&self, accounts: Vec<Account>) {
        *self.accounts.lock().unwrap() = Ok(accounts);
    }
}

#[async_trait]
impl WalletAccounts for NullWallet {
    async fn accounts_details(&self) -> Result<Vec<Account>, SourceError> {
        self.accounts.lock().unwrap().clone()
    }
}

// ── Ledger ─────────────────────────────────────────────────────────────

/// A ledger node answering from scripted account infos.
///
/// Accounts without a script fail with `RequestFailed`. No quorum and no
/// online representatives are reported until set.
pub struct NullLedger {
    infos: Mutex<HashMap<RepAddress, Result<LedgerAccountInfo, SourceError>>>,
    delays: Mutex<HashMap<RepAddress, Duration>>,
    online: Mutex<Result<Vec<RepAddress>, SourceError>>,
    quorum: Mutex<Result<Option<RawAmount>, SourceError>>,
    info_requests: Mutex<Vec<RepAddress>>,
}

impl Default for NullLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl NullLedger {
    pub fn new() -> Self {
        Self {
            infos: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            online: Mutex::new(Ok(Vec::new())),
            quorum: Mutex::new(Ok(None)),
            info_requests: Mutex::new(Vec::new()),
        }
    }

    /// Script a representative with the given voting weight.
    pub fn with_weight(self, id: &str, weight: u128) -> Self {
        self.set_info(
            id,
            LedgerAccountInfo {
                weight: RawAmount::new(weight),
                ..Default::default()
            },
        );
        self
    }

    pub fn with_info(self, id: &str, info: LedgerAccountInfo) -> Self {
        self.set_info(id, info);
        self
    }

    pub fn with_quorum(self, online_stake_total: u128) -> Self {
        *self.quorum.lock().unwrap() = Ok(Some(RawAmount::new(online_stake_total)));
        self
    }

    pub fn with_online(self, ids: &[&str]) -> Self {
        *self.online.lock().unwrap() = Ok(ids.iter().copied().map(RepAddress::from).collect());
        self
    }

    /// Delay `account_info` for `id`.
    pub fn with_delay(self, id: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(RepAddress::new(id), delay);
        self
    }

    pub fn set_info(&self, id: &str, info: LedgerAccountInfo) {
        self.infos.lock().unwrap().insert(RepAddress::new(id), Ok(info));
    }

    /// Make `account_info` for `id` fail.
    pub fn fail_account(&self, id: &str, error: SourceError) {
        self.infos.lock().unwrap().insert(RepAddress::new(id), Err(error));
    }

    pub fn set_quorum(&self, quorum: Result<Option<RawAmount>, SourceError>) {
        *self.quorum.lock().unwrap() = quorum;
    }

    pub fn set_online(&self, online: Result<Vec<RepAddress>, SourceError>) {
        *self.online.lock().unwrap() = online;
    }

    /// Ids `account_info` was called with, in call order.
    pub fn info_requests(&self) -> Vec<RepAddress> {
        self.info_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LedgerRpc for NullLedger {
    async fn account_info(&self, account: &RepAddress) -> Result<LedgerAccountInfo, SourceError> {
        self.info_requests.lock().unwrap().push(account.clone());
        let delay = self.delays.lock().unwrap().get(account).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.infos
            .lock()
            .unwrap()
            .get(account)
            .cloned()
            .unwrap_or_else(|| Err(SourceError::RequestFailed(format!("Account not found: {account}"))))
    }

    async fn representatives_online(&self) -> Result<Vec<RepAddress>, SourceError> {
        self.online.lock().unwrap().clone()
    }

    async fn confirmation_quorum(&self) -> Result<Option<RawAmount>, SourceError> {
        self.quorum.lock().unwrap().clone()
    }
}

// ── Crawler ────────────────────────────────────────────────────────────

/// A crawler returning a fixed list, recording `(min_weight, online_only)`
/// for every call.
pub struct NullCrawler {
    reps: Mutex<Result<Vec<CrawledRepresentative>, SourceError>>,
    requests: Mutex<Vec<(u64, bool)>>,
}

impl Default for NullCrawler {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl NullCrawler {
    pub fn new(reps: Vec<CrawledRepresentative>) -> Self {
        Self {
            reps: Mutex::new(Ok(reps)),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            reps: Mutex::new(Err(error)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Shorthand: `(address, online)` pairs.
    pub fn with_reps(reps: &[(&str, bool)]) -> Self {
        Self::new(
            reps.iter()
                .map(|&(address, online)| CrawledRepresentative {
                    address: RepAddress::new(address),
                    online,
                })
                .collect(),
        )
    }

    pub fn set_reps(&self, reps: Result<Vec<CrawledRepresentative>, SourceError>) {
        *self.reps.lock().unwrap() = reps;
    }

    pub fn requests(&self) -> Vec<(u64, bool)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CrawlerSource for NullCrawler {
    async fn representatives(
        &self,
        min_weight: u64,
        online_only: bool,
    ) -> Result<Vec<CrawledRepresentative>, SourceError> {
        self.requests.lock().unwrap().push((min_weight, online_only));
        self.reps.lock().unwrap().clone()
    }
}

// ── Reputation ─────────────────────────────────────────────────────────

/// An uptime provider answering from scripted records. Unscripted ids are
/// reported as not found.
#[derive(Default)]
pub struct NullReputation {
    records: Mutex<HashMap<RepAddress, Result<Option<UptimeRecord>, SourceError>>>,
    delays: Mutex<HashMap<RepAddress, Duration>>,
}

impl NullReputation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(self, record: UptimeRecord) -> Self {
        self.set_record(record);
        self
    }

    /// Script a plain record for `id` with the given daily/weekly uptime.
    pub fn with_uptime(self, id: &str, daily_pct: f64, weekly_pct: f64) -> Self {
        self.set_record(uptime_record(id, daily_pct, weekly_pct));
        self
    }

    pub fn with_error(self, id: &str, error: SourceError) -> Self {
        self.records
            .lock()
            .unwrap()
            .insert(RepAddress::new(id), Err(error));
        self
    }

    pub fn with_delay(self, id: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(RepAddress::new(id), delay);
        self
    }

    pub fn set_record(&self, record: UptimeRecord) {
        self.records
            .lock()
            .unwrap()
            .insert(record.id.clone(), Ok(Some(record)));
    }
}

#[async_trait]
impl ReputationSource for NullReputation {
    async fn account_reputation(
        &self,
        account: &RepAddress,
    ) -> Result<Option<UptimeRecord>, SourceError> {
        let delay = self.delays.lock().unwrap().get(account).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.records
            .lock()
            .unwrap()
            .get(account)
            .cloned()
            .unwrap_or(Ok(None))
    }
}

/// A record with the given uptime, a score of 50 and no vote timestamp.
pub fn uptime_record(id: &str, daily_pct: f64, weekly_pct: f64) -> UptimeRecord {
    UptimeRecord {
        id: RepAddress::new(id),
        daily_pct,
        weekly_pct,
        monthly_pct: weekly_pct,
        score: 50.0,
        last_voted_at: None,
        closing: false,
        donation_address: None,
        alias: None,
    }
}
