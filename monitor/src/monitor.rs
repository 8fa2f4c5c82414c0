//! A monitoring session over one wallet.
//!
//! [`RepresentativeMonitor`] ties the collaborators, the known list and the
//! classifier together and publishes results on watch channels. One
//! overview run:
//!
//! 1. loads the known list (first run only)
//! 2. aggregates the wallet's accounts per representative
//! 3. concurrently fetches ledger info per representative, the online set,
//!    the quorum and per-representative uptime
//! 4. classifies each representative in aggregation order

use futures_util::future::{join_all, try_join_all};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use repwatch_store::KvStore;
use repwatch_types::Timestamp;

use crate::blocklist::Blocklist;
use crate::change::detect_changes;
use crate::config::MonitorConfig;
use crate::known_list::{KnownEntry, KnownListManager};
use crate::online::resolve_online_set;
use crate::overview::FullOverview;
use crate::rep_weights::aggregate_delegates;
use crate::sources::Sources;
use crate::status::{classify, ClassifierInput, UptimeSignal, WeightShare};
use crate::MonitorError;

pub struct RepresentativeMonitor<S: KvStore> {
    sources: Sources,
    config: MonitorConfig,
    blocklist: Blocklist,
    known: KnownListManager<S>,
    overview_tx: watch::Sender<Vec<FullOverview>>,
    overview_rx: watch::Receiver<Vec<FullOverview>>,
    changeable_tx: watch::Sender<Vec<FullOverview>>,
    changeable_rx: watch::Receiver<Vec<FullOverview>>,
}

impl<S: KvStore> RepresentativeMonitor<S> {
    pub fn new(sources: Sources, store: S, config: MonitorConfig, blocklist: Blocklist) -> Self {
        let known = KnownListManager::new(store, &config);
        let (overview_tx, overview_rx) = watch::channel(Vec::new());
        let (changeable_tx, changeable_rx) = watch::channel(Vec::new());
        Self {
            sources,
            config,
            blocklist,
            known,
            overview_tx,
            overview_rx,
            changeable_tx,
            changeable_rx,
        }
    }

    /// Compute a fresh overview as of the current time.
    pub async fn overview(&mut self) -> Result<Vec<FullOverview>, MonitorError> {
        self.overview_at(Timestamp::now()).await
    }

    /// Compute a fresh overview as of `now`.
    ///
    /// A ledger lookup failure for any representative fails the whole run
    /// and nothing is published. Uptime, crawler, online and quorum
    /// failures only degrade the affected classification.
    pub async fn overview_at(&mut self, now: Timestamp) -> Result<Vec<FullOverview>, MonitorError> {
        self.known.load(self.sources.crawler.as_ref()).await?;

        let accounts = self
            .sources
            .wallet
            .accounts_details()
            .await
            .map_err(MonitorError::Accounts)?;
        let delegates = aggregate_delegates(&accounts)?;
        debug!(
            accounts = accounts.len(),
            representatives = delegates.len(),
            "aggregated wallet delegation"
        );

        let sources = &self.sources;
        let ledger_infos = try_join_all(delegates.iter().map(|delegate| async move {
            sources
                .ledger
                .account_info(&delegate.id)
                .await
                .map_err(|source| MonitorError::Ledger {
                    account: delegate.id.clone(),
                    source,
                })
        }));
        let online = resolve_online_set(
            sources.crawler.as_ref(),
            sources.ledger.as_ref(),
            &self.config.address_prefix,
            self.config.crawler_min_weight,
        );
        let quorum = async {
            match sources.ledger.confirmation_quorum().await {
                Ok(total) => total,
                Err(e) => {
                    warn!(error = %e, "confirmation quorum unavailable, percentages will be zero");
                    None
                }
            }
        };
        let uptimes = join_all(delegates.iter().map(|delegate| async move {
            let result = sources.reputation.account_reputation(&delegate.id).await;
            if let Err(e) = &result {
                warn!(representative = %delegate.id, error = %e, "uptime unavailable");
            }
            UptimeSignal::from(result)
        }));

        let (ledger_infos, online, online_stake, uptimes) =
            tokio::join!(ledger_infos, online, quorum, uptimes);
        let ledger_infos = ledger_infos?;

        let overviews: Vec<FullOverview> = delegates
            .into_iter()
            .zip(ledger_infos)
            .zip(uptimes)
            .map(|((delegate, info), uptime)| {
                let classification = classify(&ClassifierInput {
                    share: WeightShare::new(info.weight, online_stake),
                    online: online.contains(&delegate.id),
                    uptime: &uptime,
                    known: self.known.get(&delegate.id),
                    blocklisted: self.blocklist.contains(&delegate.id),
                    now,
                });
                let donation = uptime.record().and_then(|r| r.donation_address.clone());
                FullOverview::compose(delegate, info, classification, donation)
            })
            .collect();

        info!(
            representatives = overviews.len(),
            online = online.len(),
            quorum_known = online_stake.is_some(),
            "representative overview computed"
        );
        self.overview_tx.send_replace(overviews.clone());
        Ok(overviews)
    }

    /// Representatives the wallet should move away from. Uses `cached` when
    /// given, otherwise computes a fresh overview.
    pub async fn detect_changeable(
        &mut self,
        cached: Option<&[FullOverview]>,
    ) -> Result<Vec<FullOverview>, MonitorError> {
        let changeable = match cached {
            Some(list) => detect_changes(list),
            None => detect_changes(&self.overview().await?),
        };
        debug!(changeable = changeable.len(), "changeable representatives detected");
        self.changeable_tx.send_replace(changeable.clone());
        Ok(changeable)
    }

    /// Load the known list if needed and return it.
    pub async fn load_known_list(&mut self) -> Result<Vec<KnownEntry>, MonitorError> {
        let entries = self.known.load(self.sources.crawler.as_ref()).await?;
        Ok(entries.to_vec())
    }

    pub fn known_list(&self) -> &KnownListManager<S> {
        &self.known
    }

    pub fn known_list_mut(&mut self) -> &mut KnownListManager<S> {
        &mut self.known
    }

    /// Drop published results and revert the known list to its defaults.
    pub fn reset(&mut self) -> Result<(), MonitorError> {
        self.known.reset()?;
        self.overview_tx.send_replace(Vec::new());
        self.changeable_tx.send_replace(Vec::new());
        Ok(())
    }

    pub fn subscribe_overview(&self) -> watch::Receiver<Vec<FullOverview>> {
        self.overview_rx.clone()
    }

    pub fn subscribe_changeable(&self) -> watch::Receiver<Vec<FullOverview>> {
        self.changeable_rx.clone()
    }

    pub fn subscribe_known(&self) -> watch::Receiver<Vec<KnownEntry>> {
        self.known.subscribe()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }
}
