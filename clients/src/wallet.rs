//! Wallet accounts resolved through the node.
//!
//! The daemon has no wallet of its own: it watches a configured list of
//! account ids and asks the node for each one's balance and representative.

use async_trait::async_trait;
use futures_util::future::try_join_all;

use repwatch_monitor::{Account, SourceError, WalletAccounts};
use repwatch_types::{RawAmount, RepAddress};

use crate::node::{NodeRpcClient, ACCOUNT_NOT_FOUND};
use crate::ClientError;

pub struct RpcWalletAccounts {
    node: NodeRpcClient,
    accounts: Vec<RepAddress>,
}

impl RpcWalletAccounts {
    pub fn new(node: NodeRpcClient, accounts: Vec<RepAddress>) -> Self {
        Self { node, accounts }
    }

    pub fn accounts(&self) -> &[RepAddress] {
        &self.accounts
    }

    async fn account_details(&self, id: &RepAddress) -> Result<Account, ClientError> {
        match self.node.account_info(id).await {
            Ok(info) => Ok(Account::new(id.clone(), info.balance, info.representative)),
            Err(e) => unopened_account(id, e),
        }
    }
}

/// An account the node has never seen has no balance and no representative.
fn unopened_account(id: &RepAddress, error: ClientError) -> Result<Account, ClientError> {
    match error {
        ClientError::Node(msg) if msg == ACCOUNT_NOT_FOUND => {
            Ok(Account::new(id.clone(), RawAmount::ZERO, None))
        }
        other => Err(other),
    }
}

#[async_trait]
impl WalletAccounts for RpcWalletAccounts {
    async fn accounts_details(&self) -> Result<Vec<Account>, SourceError> {
        let accounts = try_join_all(self.accounts.iter().map(|id| self.account_details(id))).await?;
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_becomes_empty_account() {
        let id = RepAddress::new("ban_new");
        let account = unopened_account(&id, ClientError::Node(ACCOUNT_NOT_FOUND.into())).unwrap();
        assert_eq!(account.balance, RawAmount::ZERO);
        assert_eq!(account.representative, None);
        assert_eq!(account.delegate(), None);
    }

    #[test]
    fn other_errors_propagate() {
        let id = RepAddress::new("ban_x");
        assert_eq!(
            unopened_account(&id, ClientError::Node("Bad account number".into())).unwrap_err(),
            ClientError::Node("Bad account number".into())
        );
        assert!(unopened_account(&id, ClientError::Unreachable("down".into())).is_err());
    }

    #[tokio::test]
    async fn unreachable_node_is_a_source_error() {
        // Port 9 (discard) on localhost is not expected to run an RPC server.
        let node = NodeRpcClient::new("http://127.0.0.1:9").unwrap();
        let wallet = RpcWalletAccounts::new(node, vec![RepAddress::new("ban_x")]);
        assert!(wallet.accounts_details().await.is_err());
    }

    #[tokio::test]
    async fn empty_account_list_needs_no_node() {
        let node = NodeRpcClient::new("http://127.0.0.1:9").unwrap();
        let wallet = RpcWalletAccounts::new(node, Vec::new());
        assert!(wallet.accounts_details().await.unwrap().is_empty());
    }
}
