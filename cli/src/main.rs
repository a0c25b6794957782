//! Agora command line: inspect configuration, replay scripts, read snapshots.

mod script;

use agora_engine::{DaoConfig, DaoSnapshot};
use agora_types::{DaoParams, TOKEN_UNIT};
use agora_utils::{format_duration, init_tracing, LogFormat};
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agora", about = "Token-weighted governance engine tools")]
struct Cli {
    /// Path to a TOML deployment configuration.
    #[arg(long, env = "AGORA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Defaults to the config file's value.
    #[arg(long, env = "AGORA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json". Defaults to the config file's value.
    #[arg(long, env = "AGORA_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Validate the configuration and print its governance parameters.
    Params,

    /// Replay an operation script against a sandboxed engine.
    Simulate {
        /// Script file with `[[account]]` seeds and `[[step]]` operations.
        #[arg(long)]
        script: PathBuf,

        /// Write a snapshot of the final state here.
        #[arg(long)]
        snapshot_out: Option<PathBuf>,
    },

    /// Verify a snapshot file and print a summary.
    Inspect {
        #[arg(long)]
        snapshot: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Some(
            DaoConfig::from_toml_file(&path.to_string_lossy())
                .with_context(|| format!("loading {}", path.display()))?,
        ),
        None => None,
    };

    let format = match (cli.log_format, &config) {
        (Some(format), _) => format,
        (None, Some(cfg)) => cfg.log_format.parse().map_err(anyhow::Error::msg)?,
        (None, None) => LogFormat::default(),
    };
    let level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().map(|cfg| cfg.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    init_tracing(format, &level);

    if let Some(path) = &cli.config {
        tracing::info!("Loaded config from {}", path.display());
    }

    match cli.command {
        Command::Params => {
            let params = match &config {
                Some(cfg) => cfg.params.clone(),
                None => {
                    tracing::info!("no config given, showing default parameters");
                    DaoParams::defaults()
                }
            };
            params.validate()?;
            print_params(&params);
        }
        Command::Simulate {
            script,
            snapshot_out,
        } => {
            let config = config.context("simulate needs --config")?;
            let parsed = script::Script::from_toml_file(&script.to_string_lossy())?;
            let replay = script::replay(&config, &parsed)?;
            for line in &replay.lines {
                println!("{}", serde_json::to_string(line)?);
            }
            if let Some(out) = snapshot_out {
                let snapshot = replay.dao.snapshot(replay.finished_at)?;
                std::fs::write(&out, snapshot.to_bytes()?)
                    .with_context(|| format!("writing {}", out.display()))?;
                tracing::info!(
                    "Snapshot {} written to {}",
                    snapshot.checksum_hex(),
                    out.display()
                );
            }
        }
        Command::Inspect { snapshot } => {
            let bytes = std::fs::read(&snapshot)
                .with_context(|| format!("reading {}", snapshot.display()))?;
            let snap = DaoSnapshot::from_bytes(&bytes)?;
            let state = &snap.state;
            let summary = serde_json::json!({
                "version": snap.version,
                "taken_at": snap.taken_at,
                "checksum": snap.checksum_hex(),
                "owner": state.access.owner(),
                "panic_account": state.breaker.panic_account(),
                "paused": state.breaker.is_paused(),
                "proposals": snap.proposal_count(),
                "events": snap.event_count(),
                "total_voting_stake": state.stakes.total_voting_stake().to_string(),
                "treasury_balance": state.treasury.balance().to_string(),
                "token_reserve": state.treasury.token_reserve().to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

fn print_params(params: &DaoParams) {
    println!("token_unit_price         {}", whole(params.token_unit_price));
    println!("min_stake_for_voting     {} tokens", whole(params.min_stake_for_voting));
    println!("min_stake_for_proposing  {} tokens", whole(params.min_stake_for_proposing));
    println!("tokens_per_vote_power    {} tokens", whole(params.tokens_per_vote_power));
    println!(
        "stake_lock_duration      {}",
        format_duration(params.stake_lock_duration_secs)
    );
    println!(
        "proposal_voting_duration {}",
        format_duration(params.proposal_voting_duration_secs)
    );
    println!("quorum                   {}%", params.quorum_percentage);
    println!("approval                 {}%", params.approval_percentage);
}

/// Render a raw 18-decimal amount in whole units, trimming trailing zeros.
fn whole(raw: u128) -> String {
    let int = raw / TOKEN_UNIT;
    let frac = raw % TOKEN_UNIT;
    if frac == 0 {
        return int.to_string();
    }
    let digits = format!("{frac:018}");
    format!("{int}.{}", digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_trims_fraction() {
        assert_eq!(whole(0), "0");
        assert_eq!(whole(TOKEN_UNIT * 100), "100");
        assert_eq!(whole(TOKEN_UNIT / 1_000), "0.001");
        assert_eq!(whole(TOKEN_UNIT + TOKEN_UNIT / 2), "1.5");
    }

    #[test]
    fn cli_parses_simulate() {
        let cli = Cli::try_parse_from([
            "agora",
            "--config",
            "dao.toml",
            "--log-format",
            "json",
            "simulate",
            "--script",
            "run.toml",
            "--snapshot-out",
            "out.bin",
        ])
        .unwrap();
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        match cli.command {
            Command::Simulate { script, snapshot_out } => {
                assert_eq!(script, PathBuf::from("run.toml"));
                assert_eq!(snapshot_out, Some(PathBuf::from("out.bin")));
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn simulate_then_inspect_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let config = DaoConfig::from_toml_str(include_str!("../demo/dao.toml")).unwrap();
        let parsed = script::Script::from_toml_str(include_str!("../demo/treasury_grant.toml")).unwrap();
        let replay = script::replay(&config, &parsed).unwrap();

        let path = dir.path().join("final.snap");
        let snapshot = replay.dao.snapshot(replay.finished_at).unwrap();
        std::fs::write(&path, snapshot.to_bytes().unwrap()).unwrap();

        let loaded = DaoSnapshot::from_bytes(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(loaded.checksum, snapshot.checksum);
        assert_eq!(loaded.proposal_count(), 1);
        assert_eq!(loaded.state.treasury.balance(), 3 * TOKEN_UNIT);
    }
}
