//! Engine snapshots: capture the full governance state at a point in time.
//!
//! A snapshot lets an engine be persisted and brought back on another
//! gateway without replaying its history. The checksum is Blake2b-256 over
//! the bincode encoding of the state, so a restored engine can be checked
//! against the one that produced it.

use serde::{Deserialize, Serialize};

use agora_governance::ProposalRegistry;
use agora_stake::StakeLedger;
use agora_types::{AccountId, AssetGateway, DaoParams, Timestamp};

use crate::access::AccessControl;
use crate::breaker::CircuitBreaker;
use crate::dao::GovernanceDao;
use crate::event::{EventLog, EventRecord};
use crate::treasury::Treasury;
use crate::DaoError;

/// Current snapshot format.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything an engine holds except its gateway and listeners.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaoState {
    pub access: AccessControl,
    pub breaker: CircuitBreaker,
    pub params: DaoParams,
    pub stakes: StakeLedger,
    pub registry: ProposalRegistry,
    pub treasury: Treasury,
    pub custody_account: AccountId,
    pub events: Vec<EventRecord>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaoSnapshot {
    /// Snapshot format version.
    pub version: u32,
    /// When the snapshot was taken. Not covered by the checksum.
    pub taken_at: Timestamp,
    /// Blake2b-256 of the encoded state.
    pub checksum: [u8; 32],
    pub state: DaoState,
}

impl DaoSnapshot {
    pub fn create(state: DaoState, taken_at: Timestamp) -> Result<Self, DaoError> {
        let checksum = checksum_of(&state)?;
        Ok(Self {
            version: SNAPSHOT_VERSION,
            taken_at,
            checksum,
            state,
        })
    }

    /// Whether the checksum matches the state.
    pub fn verify(&self) -> bool {
        checksum_of(&self.state).is_ok_and(|c| c == self.checksum)
    }

    pub fn checksum_hex(&self) -> String {
        hex::encode(self.checksum)
    }

    /// Serialize the snapshot to bytes (bincode).
    pub fn to_bytes(&self) -> Result<Vec<u8>, DaoError> {
        bincode::serialize(self).map_err(|e| DaoError::Snapshot(e.to_string()))
    }

    /// Deserialize a snapshot and check its version and checksum.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DaoError> {
        let snapshot: Self =
            bincode::deserialize(bytes).map_err(|e| DaoError::Snapshot(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DaoError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        if !snapshot.verify() {
            return Err(DaoError::Snapshot("checksum mismatch".into()));
        }
        Ok(snapshot)
    }

    pub fn proposal_count(&self) -> u64 {
        self.state.registry.count()
    }

    pub fn event_count(&self) -> usize {
        self.state.events.len()
    }
}

fn checksum_of(state: &DaoState) -> Result<[u8; 32], DaoError> {
    use blake2::digest::consts::U32;
    use blake2::{Blake2b, Digest};

    let encoded = bincode::serialize(state).map_err(|e| DaoError::Snapshot(e.to_string()))?;
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(SNAPSHOT_VERSION.to_le_bytes());
    hasher.update(&encoded);

    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    Ok(out)
}

impl<G> GovernanceDao<G> {
    /// Capture the current state.
    pub fn snapshot(&self, now: Timestamp) -> Result<DaoSnapshot, DaoError> {
        let state = DaoState {
            access: self.access.clone(),
            breaker: self.breaker.clone(),
            params: self.params.clone(),
            stakes: self.stakes.clone(),
            registry: self.registry.clone(),
            treasury: self.treasury.clone(),
            custody_account: self.custody_account,
            events: self.events.records().to_vec(),
        };
        let snapshot = DaoSnapshot::create(state, now)?;
        tracing::info!(
            proposals = snapshot.proposal_count(),
            events = snapshot.event_count(),
            checksum = %snapshot.checksum_hex(),
            "snapshot taken"
        );
        Ok(snapshot)
    }
}

impl<G: AssetGateway> GovernanceDao<G> {
    /// Rebuild an engine from a snapshot on top of `gateway`.
    ///
    /// The gateway must already hold the custodied balances the snapshot
    /// accounts for; the engine does not reconcile them.
    pub fn restore(snapshot: DaoSnapshot, gateway: G) -> Result<Self, DaoError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(DaoError::Snapshot(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        if !snapshot.verify() {
            return Err(DaoError::Snapshot("checksum mismatch".into()));
        }
        let state = snapshot.state;
        state.params.validate()?;
        if state.stakes.audit_voting_total() != state.stakes.total_voting_stake() {
            return Err(DaoError::Snapshot("voting stake total does not match balances".into()));
        }
        tracing::info!(
            proposals = state.registry.count(),
            events = state.events.len(),
            "engine restored from snapshot"
        );
        Ok(Self {
            access: state.access,
            breaker: state.breaker,
            params: state.params,
            stakes: state.stakes,
            registry: state.registry,
            treasury: state.treasury,
            custody_account: state.custody_account,
            events: EventLog::from_records(state.events),
            gateway,
        })
    }
}
