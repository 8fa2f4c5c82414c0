//! HTTP adapters for the monitor's collaborators.
//!
//! - [`node`]: Ledger node JSON-RPC (`account_info`, `representatives_online`,
//!   `confirmation_quorum`).
//! - [`reputation`]: Uptime / reputation provider REST API.
//! - [`crawler`]: Peer crawler REST API.
//! - [`wallet`]: Wallet accounts resolved through the node.

pub mod crawler;
pub mod error;
pub mod node;
pub mod reputation;
pub mod wallet;

pub use crawler::CrawlerClient;
pub use error::ClientError;
pub use node::NodeRpcClient;
pub use reputation::ReputationClient;
pub use wallet::RpcWalletAccounts;
