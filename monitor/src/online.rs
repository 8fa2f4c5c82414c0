//! Which representatives are voting right now.

use std::collections::HashSet;

use tracing::{debug, warn};

use repwatch_types::RepAddress;

use crate::sources::{CrawlerSource, LedgerRpc};

/// Representatives currently observed voting.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OnlineSet {
    ids: HashSet<RepAddress>,
}

impl OnlineSet {
    pub fn contains(&self, id: &RepAddress) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<RepAddress> for OnlineSet {
    fn from_iter<I: IntoIterator<Item = RepAddress>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Resolve the online set.
///
/// The crawler is asked first; its online entries are normalised to
/// `prefix` and kept if valid. When that leaves nothing, the node's
/// online-representatives list is used. Source failures degrade to the next
/// option and finally to an empty set.
pub async fn resolve_online_set(
    crawler: &dyn CrawlerSource,
    ledger: &dyn LedgerRpc,
    prefix: &str,
    min_weight: u64,
) -> OnlineSet {
    match crawler.representatives(min_weight, true).await {
        Ok(crawled) => {
            let online: OnlineSet = crawled
                .iter()
                .filter(|rep| rep.online)
                .map(|rep| rep.address.normalize(prefix))
                .filter(|id| id.is_valid(prefix))
                .collect();
            if !online.is_empty() {
                debug!(online = online.len(), "online representatives from crawler");
                return online;
            }
        }
        Err(e) => warn!(error = %e, "crawler unavailable, falling back to node"),
    }

    match ledger.representatives_online().await {
        Ok(reps) => {
            debug!(online = reps.len(), "online representatives from node");
            reps.into_iter().collect()
        }
        Err(e) => {
            warn!(error = %e, "online representatives unavailable");
            OnlineSet::default()
        }
    }
}
