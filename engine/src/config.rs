//! Engine configuration with TOML file support.

use serde::{Deserialize, Serialize};

use agora_types::{AccountId, DaoParams};

use crate::dao::DaoInit;
use crate::DaoError;

/// Configuration for a governance engine deployment.
///
/// Can be loaded from a TOML file via [`DaoConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Raw token amounts inside
/// `[params]` are written as decimal strings, since they exceed TOML's
/// 64-bit integers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaoConfig {
    /// Administrator account.
    pub owner: AccountId,

    /// Account allowed to pause and resume. Defaults to the owner; set
    /// `panic_disabled = true` to start without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub panic_account: Option<AccountId>,

    /// Start with no panic account, leaving gated operations refused until
    /// the owner sets one.
    #[serde(default)]
    pub panic_disabled: bool,

    /// The engine's own account on the token ledger.
    #[serde(default = "default_custody_account")]
    pub custody_account: AccountId,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Governance parameters. Kept last: TOML tables follow plain keys.
    #[serde(default)]
    pub params: DaoParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_custody_account() -> AccountId {
    AccountId::new([0xda; 20])
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaoConfig {
    /// A configuration with default parameters administered by `owner`.
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            panic_account: None,
            panic_disabled: false,
            custody_account: default_custody_account(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            params: DaoParams::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, DaoError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| DaoError::Config(format!("{path}: {e}")))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_toml_str(s: &str) -> Result<Self, DaoError> {
        let config: Self = toml::from_str(s).map_err(|e| DaoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, DaoError> {
        toml::to_string_pretty(self).map_err(|e| DaoError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), DaoError> {
        if self.owner.is_zero() {
            return Err(DaoError::InvalidParameter("owner is the null account".into()));
        }
        if self.custody_account.is_zero() {
            return Err(DaoError::InvalidParameter("custody account is the null account".into()));
        }
        self.params.validate()?;
        Ok(())
    }

    /// The panic account the engine starts with.
    pub fn effective_panic_account(&self) -> Option<AccountId> {
        if self.panic_disabled {
            None
        } else {
            Some(self.panic_account.unwrap_or(self.owner))
        }
    }

    pub fn to_init(&self) -> DaoInit {
        DaoInit {
            owner: self.owner,
            panic_account: self.effective_panic_account(),
            custody_account: self.custody_account,
            params: self.params.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_types::tokens;
    use std::io::Write;

    const OWNER: &str = "0x00000000000000000000000000000000000000aa";

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = DaoConfig::from_toml_str(&format!("owner = \"{OWNER}\"")).expect("should parse");
        assert_eq!(config.params, DaoParams::defaults());
        assert_eq!(config.log_format, "human");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.effective_panic_account(), Some(config.owner));
    }

    #[test]
    fn partial_params_override() {
        let toml = format!(
            r#"
            owner = "{OWNER}"
            panic_account = "0x00000000000000000000000000000000000000bb"

            [params]
            token_unit_price = "1_000_000_000_000_000"
            min_stake_for_voting = "100000000000000000000"
            min_stake_for_proposing = "500000000000000000000"
            tokens_per_vote_power = "10000000000000000000"
            stake_lock_duration_secs = 60
            proposal_voting_duration_secs = 3600
            quorum_percentage = 40
            approval_percentage = 66
            "#
        );
        let config = DaoConfig::from_toml_str(&toml).expect("should parse");
        assert_eq!(config.params.min_stake_for_voting, tokens(100));
        assert_eq!(config.params.stake_lock_duration_secs, 60);
        assert_eq!(config.params.quorum_percentage, 40);
        assert_eq!(
            config.effective_panic_account(),
            Some(AccountId::from_low_u64(0xbb))
        );
    }

    #[test]
    fn invalid_params_rejected_at_load() {
        let toml = format!(
            r#"
            owner = "{OWNER}"
            [params]
            token_unit_price = "1"
            min_stake_for_voting = "1"
            min_stake_for_proposing = "1"
            tokens_per_vote_power = "1"
            stake_lock_duration_secs = 60
            proposal_voting_duration_secs = 60
            quorum_percentage = 0
            approval_percentage = 60
            "#
        );
        assert!(matches!(
            DaoConfig::from_toml_str(&toml),
            Err(DaoError::InvalidParameter(_))
        ));
    }

    #[test]
    fn disabled_panic_account() {
        let config = DaoConfig::from_toml_str(&format!("owner = \"{OWNER}\"\npanic_disabled = true"))
            .expect("should parse");
        assert_eq!(config.to_init().panic_account, None);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = DaoConfig::new(AccountId::from_low_u64(1));
        let text = config.to_toml_string().unwrap();
        assert_eq!(DaoConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "owner = \"{OWNER}\"\nlog_format = \"json\"").unwrap();
        let config = DaoConfig::from_toml_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.log_format, "json");
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = DaoConfig::from_toml_file("/nonexistent/agora.toml");
        assert!(matches!(result, Err(DaoError::Config(_))));
    }

    #[test]
    fn missing_owner_is_an_error() {
        assert!(matches!(
            DaoConfig::from_toml_str(""),
            Err(DaoError::Config(_))
        ));
    }
}
