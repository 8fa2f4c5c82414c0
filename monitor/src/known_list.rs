//! The user's list of named, trusted and avoided representatives.
//!
//! The list is persisted as JSON under a single store key. On first load it
//! is taken from the store (migrating an older key once), seeded from the
//! crawler when nothing is stored, and otherwise falls back to a shipped
//! default list. Every change is published on a watch channel.

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use repwatch_store::KvStore;
use repwatch_types::RepAddress;

use crate::config::MonitorConfig;
use crate::sources::{CrawledRepresentative, CrawlerSource};
use crate::KnownListError;

/// A named representative in the user's list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownEntry {
    pub id: RepAddress,
    pub name: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub trusted: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub warn: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

impl KnownEntry {
    pub fn new(id: impl Into<RepAddress>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            trusted: false,
            warn: false,
        }
    }

    pub fn trusted(mut self, trusted: bool) -> Self {
        self.trusted = trusted;
        self
    }

    pub fn warn(mut self, warn: bool) -> Self {
        self.warn = warn;
        self
    }

    /// Whether this entry is labelled `name`, ignoring case (Unicode aware).
    pub fn has_name(&self, name: &str) -> bool {
        self.name == name || self.name.to_lowercase() == name.to_lowercase()
    }

    /// Display priority: trusted 2, warned 0, everything else 1.
    pub fn priority(&self) -> u8 {
        if self.trusted {
            2
        } else if self.warn {
            0
        } else {
            1
        }
    }
}

const DEFAULT_REPRESENTATIVES: &[(&str, &str, bool)] = &[
    ("ban_1hootubxy68fhhrctjmaias148tz91tsse3pq1pgmfedsm3cubhobuihqnxd", "ban_1hoot...hqnxd", true),
    ("ban_1bananobh5rat99qfgt1ptpieie5swmoth87thi74qgbfrij7dcgjiij94xr", "ban_1banan...94xr", true),
    ("ban_1ka1ium4pfue3uxtntqsrib8mumxgazsjf58gidh1xeo5te3whsq8z476goo", "ban_1ka1i...6goo", true),
    ("ban_3batmanuenphd7osrez9c45b3uqw9d9u81ne8xa6m43e1py56y9p48ap69zg", "ban_3batm...69zg", false),
    ("ban_1banbet1hxxe9aeu11oqss9sxwe814jo9ym8c98653j1chq4k4yaxjsacnhc", "ban_1banb...cnhc", false),
    ("ban_1heart7e8u4tnyowup9hwchx8tkfaqjiyp67si74gdanziizegf7p37jd6gf", "ban_1hear...d6gf", true),
    ("ban_3grayknbwtrjdsbdgsjbx4fzds7eufjqghzu6on57aqxte7fhhh14gxbdz61", "ban_3gray...dz61", false),
    ("ban_3pa1m3g79i1h7uijugndjeytpmqbsg6hc19zm8m7foqygwos1mmcqmab91hh", "ban_3pa1m...91hh", false),
    ("ban_3tacocatezozswnu8xkh66qa1dbcdujktzmfpdj7ax66wtfrio6h5sxikkep", "ban_3taco...kkep", false),
    ("ban_1moonanoj76om1e9gnji5mdfsopnr5ddyi6k3qtcbs8nogyjaa6p8j87sgid", "ban_1moon...sgid", false),
    ("ban_1goobcumtuqe37htu4qwtpkxnjj4jjheyz6e6kke3mro7d8zq5d36yskphqt", "ban_1goob...phqt", false),
];

/// The list shipped with the monitor.
pub fn default_known_entries() -> Vec<KnownEntry> {
    DEFAULT_REPRESENTATIVES
        .iter()
        .map(|&(id, name, trusted)| KnownEntry::new(id, name).trusted(trusted))
        .collect()
}

/// Owns the known-representative list and its persistence.
pub struct KnownListManager<S: KvStore> {
    store: S,
    store_key: String,
    legacy_store_key: String,
    address_prefix: String,
    crawler_min_weight: u64,
    crawler_online_only: bool,
    /// What `reset` reverts to. Replaced by a successful crawler bootstrap.
    defaults: Vec<KnownEntry>,
    entries: Vec<KnownEntry>,
    loaded: bool,
    entries_tx: watch::Sender<Vec<KnownEntry>>,
    entries_rx: watch::Receiver<Vec<KnownEntry>>,
}

impl<S: KvStore> KnownListManager<S> {
    pub fn new(store: S, config: &MonitorConfig) -> Self {
        let defaults = default_known_entries();
        let (entries_tx, entries_rx) = watch::channel(defaults.clone());
        Self {
            store,
            store_key: config.store_key.clone(),
            legacy_store_key: config.legacy_store_key.clone(),
            address_prefix: config.address_prefix.clone(),
            crawler_min_weight: config.crawler_min_weight,
            crawler_online_only: config.crawler_online_only,
            entries: defaults.clone(),
            defaults,
            loaded: false,
            entries_tx,
            entries_rx,
        }
    }

    /// Load the list once per session.
    ///
    /// A stored list wins; an older store key is migrated into the current
    /// one, and removed either way. With nothing stored the list is seeded from the
    /// crawler, or left at the defaults when the crawler has nothing usable.
    pub async fn load(&mut self, crawler: &dyn CrawlerSource) -> Result<&[KnownEntry], KnownListError> {
        if self.loaded {
            return Ok(&self.entries);
        }

        match self.read_stored()? {
            Some(list) => {
                debug!(entries = list.len(), "loaded known representatives from store");
                self.entries = list;
            }
            None => {
                self.entries = self.defaults.clone();
                self.bootstrap_from_crawler(crawler).await?;
            }
        }

        self.loaded = true;
        self.publish();
        Ok(&self.entries)
    }

    fn read_stored(&self) -> Result<Option<Vec<KnownEntry>>, KnownListError> {
        if let Some(json) = self.store.get(&self.store_key)? {
            let list = serde_json::from_str(&json)?;
            if self.store.contains(&self.legacy_store_key)? {
                self.store.remove(&self.legacy_store_key)?;
                debug!(key = %self.legacy_store_key, "dropped superseded legacy known list");
            }
            return Ok(Some(list));
        }

        let Some(json) = self.store.get(&self.legacy_store_key)? else {
            return Ok(None);
        };
        let list: Vec<KnownEntry> = serde_json::from_str(&json)?;
        self.store.set(&self.store_key, &json)?;
        self.store.remove(&self.legacy_store_key)?;
        info!(
            from = %self.legacy_store_key,
            to = %self.store_key,
            entries = list.len(),
            "migrated known representatives to new store key"
        );
        Ok(Some(list))
    }

    /// Seed the list from the crawler.
    ///
    /// A non-empty result replaces the defaults, and replaces the current
    /// list only while nothing is persisted. Never writes to the store.
    /// Returns whether the crawler yielded anything usable.
    pub async fn bootstrap_from_crawler(&mut self, crawler: &dyn CrawlerSource) -> Result<bool, KnownListError> {
        let crawled = match crawler
            .representatives(self.crawler_min_weight, self.crawler_online_only)
            .await
        {
            Ok(crawled) => crawled,
            Err(e) => {
                warn!(error = %e, "crawler bootstrap failed, keeping default representatives");
                return Ok(false);
            }
        };

        let mapped = self.map_crawled(&crawled);
        if mapped.is_empty() {
            debug!(crawled = crawled.len(), "crawler bootstrap yielded no valid representatives");
            return Ok(false);
        }

        info!(entries = mapped.len(), "seeded known representatives from crawler");
        self.defaults = mapped.clone();
        if !self.store.contains(&self.store_key)? {
            self.entries = mapped;
            self.publish();
        }
        Ok(true)
    }

    fn map_crawled(&self, crawled: &[CrawledRepresentative]) -> Vec<KnownEntry> {
        crawled
            .iter()
            .filter_map(|rep| {
                let id = rep.address.normalize(&self.address_prefix);
                if !id.is_valid(&self.address_prefix) {
                    return None;
                }
                let name = id.short_label();
                Some(KnownEntry::new(id, name).trusted(rep.online))
            })
            .collect()
    }

    /// Insert or replace an entry.
    ///
    /// An existing entry with the same name or the same id (ignoring case)
    /// is replaced in place; otherwise the entry is appended.
    pub fn save(&mut self, entry: KnownEntry) -> Result<(), KnownListError> {
        let existing = self.entries.iter().position(|e| {
            e.has_name(&entry.name) || e.id.eq_ignore_case(entry.id.as_str())
        });
        match existing {
            Some(pos) => self.entries[pos] = entry,
            None => self.entries.push(entry),
        }
        self.persist()?;
        self.publish();
        Ok(())
    }

    /// Remove the entry whose id matches ignoring case. Returns `false` and
    /// leaves the store untouched when there is none.
    pub fn delete(&mut self, id: &str) -> Result<bool, KnownListError> {
        let Some(pos) = self.entries.iter().position(|e| e.id.eq_ignore_case(id)) else {
            return Ok(false);
        };
        self.entries.remove(pos);
        self.persist()?;
        self.publish();
        Ok(true)
    }

    /// Forget the stored list and go back to the defaults. The next `load`
    /// seeds again.
    pub fn reset(&mut self) -> Result<(), KnownListError> {
        self.store.remove(&self.store_key)?;
        self.entries = self.defaults.clone();
        self.loaded = false;
        self.publish();
        Ok(())
    }

    /// Rewrite legacy id prefixes in the stored list. Returns whether a list
    /// was stored at all.
    pub fn migrate_legacy_prefixes(&mut self) -> Result<bool, KnownListError> {
        let Some(json) = self.store.get(&self.store_key)? else {
            return Ok(false);
        };
        let mut list: Vec<KnownEntry> = serde_json::from_str(&json)?;
        for entry in &mut list {
            entry.id = entry.id.normalize(&self.address_prefix);
        }
        self.store.set(&self.store_key, &serde_json::to_string(&list)?)?;

        if self.loaded {
            self.entries = list;
            self.publish();
        }
        Ok(true)
    }

    /// Case-insensitive name lookup.
    pub fn name_exists(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.has_name(name))
    }

    /// Exact id lookup.
    pub fn get(&self, id: &RepAddress) -> Option<&KnownEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    /// Entries ordered trusted first, warned last. Stable within a priority.
    pub fn sorted_by_priority(&self) -> Vec<KnownEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|e| Reverse(e.priority()));
        sorted
    }

    pub fn entries(&self) -> &[KnownEntry] {
        &self.entries
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<KnownEntry>> {
        self.entries_rx.clone()
    }

    fn persist(&self) -> Result<(), KnownListError> {
        let json = serde_json::to_string(&self.entries)?;
        self.store.set(&self.store_key, &json)?;
        Ok(())
    }

    fn publish(&self) {
        self.entries_tx.send_replace(self.entries.clone());
    }
}
