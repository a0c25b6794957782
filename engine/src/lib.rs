//! Agora governance engine.
//!
//! Ties the stake ledger and proposal registry together behind a single
//! [`GovernanceDao`] that adds:
//! - single-administrator access control
//! - an emergency pause switch held by a dedicated panic account
//! - treasury custody and payout of accepted treasury proposals
//! - token sale and minting against a custodied reserve
//! - an append-only event log with synchronous listeners
//! - TOML configuration and checksummed state snapshots
//!
//! Asset movements go through an [`agora_types::AssetGateway`] supplied by the
//! caller; the engine itself never holds a token balance.

pub mod access;
pub mod breaker;
pub mod config;
pub mod dao;
pub mod error;
pub mod event;
pub mod snapshot;
pub mod treasury;

pub use access::AccessControl;
pub use breaker::CircuitBreaker;
pub use config::DaoConfig;
pub use dao::{DaoInit, DaoStatus, GovernanceDao, StakeInfo};
pub use error::DaoError;
pub use event::{DaoEvent, EventLog, EventRecord};
pub use snapshot::{DaoSnapshot, DaoState, SNAPSHOT_VERSION};
pub use treasury::Treasury;
