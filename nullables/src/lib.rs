//! Nullable infrastructure for deterministic testing.
//!
//! Every collaborator the monitor talks to (key-value store, clock, wallet,
//! ledger node, crawler, uptime provider) has an in-memory stand-in here that:
//! - Returns scripted values
//! - Can be made to fail per call site
//! - Never touches the filesystem or network
//!
//! Usage: wire nullables into a `RepresentativeMonitor` in tests.

pub mod clock;
pub mod sources;
pub mod store;

pub use clock::NullClock;
pub use sources::{uptime_record, NullCrawler, NullLedger, NullReputation, NullWallet};
pub use store::NullKvStore;
