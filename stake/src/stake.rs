//! Stake records and the purposes tokens can be locked for.

use agora_types::{amount::decimal, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What a stake entitles its owner to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StakePurpose {
    /// Converts into voting power and counts toward quorum.
    Voting,
    /// Bond required to open proposals.
    Proposing,
}

impl StakePurpose {
    pub const ALL: [StakePurpose; 2] = [StakePurpose::Voting, StakePurpose::Proposing];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Voting => "voting",
            Self::Proposing => "proposing",
        }
    }
}

impl fmt::Display for StakePurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One account's stake for one purpose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeRecord {
    /// Locked amount in raw token units.
    #[serde(with = "decimal")]
    pub amount: u128,
    /// When the amount last increased. The lock window runs from here.
    pub locked_since: Timestamp,
}

impl StakeRecord {
    /// First moment a withdrawal is allowed.
    pub fn locked_until(&self, lock_secs: u64) -> Timestamp {
        self.locked_since.plus(lock_secs)
    }

    /// Whether a withdrawal at `now` would be refused for timing.
    pub fn is_locked(&self, now: Timestamp, lock_secs: u64) -> bool {
        !self.locked_since.has_expired(lock_secs, now)
    }
}
