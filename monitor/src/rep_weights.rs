//! Per-representative weight aggregation over the wallet's accounts.
//!
//! Many wallet accounts can share one representative. Folding the account
//! list yields one [`DelegateWeight`] per distinct representative, in the
//! order each representative was first seen. Weights are summed with checked
//! raw arithmetic, so a delegate's weight is always the exact sum of its
//! member balances.

use std::collections::HashMap;

use repwatch_types::{RawAmount, RepAddress, RepwatchError};
use serde::{Deserialize, Serialize};

use crate::sources::Account;

/// One representative and the wallet accounts delegating to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegateWeight {
    pub id: RepAddress,
    /// Sum of `accounts[*].balance`.
    pub weight: RawAmount,
    pub accounts: Vec<Account>,
}

/// Accumulates delegate weights account by account.
#[derive(Debug, Default)]
pub struct DelegateWeights {
    delegates: Vec<DelegateWeight>,
    /// representative → position in `delegates`.
    index: HashMap<RepAddress, usize>,
    total_weight: RawAmount,
}

impl DelegateWeights {
    /// Create an empty aggregation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a whole account list.
    pub fn from_accounts<'a>(
        accounts: impl IntoIterator<Item = &'a Account>,
    ) -> Result<Self, RepwatchError> {
        let mut weights = Self::new();
        for account in accounts {
            weights.add_account(account)?;
        }
        Ok(weights)
    }

    /// Add one account. Returns `false` (and changes nothing) when the
    /// account has not chosen a representative yet.
    pub fn add_account(&mut self, account: &Account) -> Result<bool, RepwatchError> {
        let Some(rep) = account.delegate() else {
            return Ok(false);
        };

        let total = self.total_weight.try_add(account.balance)?;
        match self.index.get(rep) {
            Some(&pos) => {
                let delegate = &mut self.delegates[pos];
                delegate.weight = delegate.weight.try_add(account.balance)?;
                delegate.accounts.push(account.clone());
            }
            None => {
                self.index.insert(rep.clone(), self.delegates.len());
                self.delegates.push(DelegateWeight {
                    id: rep.clone(),
                    weight: account.balance,
                    accounts: vec![account.clone()],
                });
            }
        }
        self.total_weight = total;
        Ok(true)
    }

    /// Weight delegated to `rep`. Zero if no account names it.
    pub fn weight(&self, rep: &RepAddress) -> RawAmount {
        self.index
            .get(rep)
            .map(|&pos| self.delegates[pos].weight)
            .unwrap_or(RawAmount::ZERO)
    }

    /// Total weight across all delegates.
    pub fn total_weight(&self) -> RawAmount {
        self.total_weight
    }

    /// Number of distinct representatives.
    pub fn rep_count(&self) -> usize {
        self.delegates.len()
    }

    pub fn delegates(&self) -> &[DelegateWeight] {
        &self.delegates
    }

    pub fn into_delegates(self) -> Vec<DelegateWeight> {
        self.delegates
    }
}

/// Fold `accounts` into unique delegate records in first-seen order.
pub fn aggregate_delegates(accounts: &[Account]) -> Result<Vec<DelegateWeight>, RepwatchError> {
    Ok(DelegateWeights::from_accounts(accounts)?.into_delegates())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rep(name: &str) -> RepAddress {
        RepAddress::new(format!("ban_{name}"))
    }

    fn account(name: &str, balance: u128, representative: Option<&str>) -> Account {
        Account::new(
            format!("ban_acct_{name}"),
            RawAmount::new(balance),
            representative.map(rep),
        )
    }

    #[test]
    fn empty_input_yields_nothing() {
        let weights = DelegateWeights::from_accounts(&[]).unwrap();
        assert_eq!(weights.rep_count(), 0);
        assert_eq!(weights.total_weight(), RawAmount::ZERO);
        assert_eq!(weights.weight(&rep("alice")), RawAmount::ZERO);
    }

    #[test]
    fn accounts_without_representative_are_skipped() {
        let accounts = vec![
            account("1", 1_000, None),
            account("2", 2_000, Some("alice")),
        ];
        let delegates = aggregate_delegates(&accounts).unwrap();
        assert_eq!(delegates.len(), 1);
        assert_eq!(delegates[0].id, rep("alice"));
        assert_eq!(delegates[0].weight, RawAmount::new(2_000));
    }

    #[test]
    fn empty_representative_id_is_skipped() {
        let mut unset = account("1", 1_000, None);
        unset.representative = Some(RepAddress::new(""));
        let mut weights = DelegateWeights::new();
        assert!(!weights.add_account(&unset).unwrap());
        assert_eq!(weights.rep_count(), 0);
    }

    #[test]
    fn shared_representative_sums_balances() {
        let accounts = vec![
            account("1", 1_000_000, Some("alice")),
            account("2", 2_500_000, Some("alice")),
            account("3", 500_000, Some("bob")),
            account("4", 750_000, Some("alice")),
            account("5", 3_000_000, Some("carol")),
        ];

        let weights = DelegateWeights::from_accounts(&accounts).unwrap();

        assert_eq!(weights.weight(&rep("alice")), RawAmount::new(4_250_000));
        assert_eq!(weights.weight(&rep("bob")), RawAmount::new(500_000));
        assert_eq!(weights.weight(&rep("carol")), RawAmount::new(3_000_000));
        assert_eq!(weights.total_weight(), RawAmount::new(7_750_000));
        assert_eq!(weights.rep_count(), 3);
    }

    #[test]
    fn output_keeps_first_seen_order_and_members() {
        let accounts = vec![
            account("1", 10, Some("carol")),
            account("2", 20, Some("alice")),
            account("3", 30, Some("carol")),
            account("4", 40, Some("bob")),
        ];

        let delegates = aggregate_delegates(&accounts).unwrap();

        let ids: Vec<_> = delegates.iter().map(|d| d.id.clone()).collect();
        assert_eq!(ids, vec![rep("carol"), rep("alice"), rep("bob")]);
        let carol_members: Vec<_> = delegates[0].accounts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(carol_members, vec!["ban_acct_1", "ban_acct_3"]);
    }

    #[test]
    fn zero_balance_accounts_still_count_as_members() {
        let accounts = vec![
            account("1", 0, Some("alice")),
            account("2", 0, Some("alice")),
        ];
        let delegates = aggregate_delegates(&accounts).unwrap();
        assert_eq!(delegates[0].weight, RawAmount::ZERO);
        assert_eq!(delegates[0].accounts.len(), 2);
    }

    #[test]
    fn large_raw_balances_stay_exact() {
        let large: u128 = 10u128.pow(37);
        let accounts = vec![
            account("1", large, Some("alice")),
            account("2", large * 2 + 7, Some("alice")),
        ];
        let delegates = aggregate_delegates(&accounts).unwrap();
        assert_eq!(delegates[0].weight, RawAmount::new(large * 3 + 7));
    }

    #[test]
    fn overflow_is_an_error() {
        let accounts = vec![
            account("1", u128::MAX, Some("alice")),
            account("2", 1, Some("alice")),
        ];
        assert!(matches!(
            aggregate_delegates(&accounts),
            Err(RepwatchError::AmountOverflow { .. })
        ));
    }
}
