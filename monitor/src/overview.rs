//! The per-representative result of an overview run.

use serde::{Deserialize, Serialize};

use repwatch_types::{RawAmount, RepAddress};

use crate::rep_weights::DelegateWeight;
use crate::sources::{Account, LedgerAccountInfo};
use crate::status::{Classification, RepresentativeStatus, StatusTier};

/// Ledger fields of a representative joined with the wallet's delegation to
/// it and its classification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FullOverview {
    pub id: RepAddress,

    // Ledger account info.
    pub frontier: String,
    pub open_block: String,
    pub representative_block: String,
    pub balance: RawAmount,
    pub modified_timestamp: u64,
    pub block_count: u64,
    pub confirmation_height: u64,
    pub representative: Option<RepAddress>,
    /// Voting weight the ledger attributes to the representative.
    pub weight: RawAmount,
    pub receivable: RawAmount,

    // Wallet delegation.
    pub accounts: Vec<Account>,
    pub delegated_weight: RawAmount,

    // Classification.
    pub percent_of_online_stake: f64,
    pub tier: StatusTier,
    pub label: Option<String>,
    pub status: RepresentativeStatus,
    pub donation_address: Option<RepAddress>,
}

impl FullOverview {
    pub fn compose(
        delegate: DelegateWeight,
        info: LedgerAccountInfo,
        classification: Classification,
        donation_address: Option<RepAddress>,
    ) -> Self {
        let DelegateWeight {
            id,
            weight: delegated_weight,
            accounts,
        } = delegate;
        let LedgerAccountInfo {
            frontier,
            open_block,
            representative_block,
            balance,
            modified_timestamp,
            block_count,
            confirmation_height,
            representative,
            weight,
            receivable,
        } = info;
        let Classification {
            tier,
            label,
            status,
            percent,
        } = classification;

        Self {
            id,
            frontier,
            open_block,
            representative_block,
            balance,
            modified_timestamp,
            block_count,
            confirmation_height,
            representative,
            weight,
            receivable,
            accounts,
            delegated_weight,
            percent_of_online_stake: percent,
            tier,
            label,
            status,
            donation_address,
        }
    }

    /// Label if one is known, otherwise the shortened id.
    pub fn display_name(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.id.short_label())
    }
}
