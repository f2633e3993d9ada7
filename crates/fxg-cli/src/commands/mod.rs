//! Command handler modules for the `fxg` CLI.
//!
//! Shared utilities used by multiple command paths live here.
//! Command-specific logic lives in the submodules.

pub mod assess;
pub mod coalition;
pub mod config;
pub mod cycle;
pub mod evaluate;

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use fxg_audit::{verify_hash_chain, VerifyResult};
use fxg_config::{load_layered_yaml, report_unused_keys, ConfigMode, LoadedConfig};
use fxg_runtime::GovernancePolicy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

/// Env var holding comma-separated config paths when `--config` is absent.
pub const ENV_CONFIG: &str = "FXG_CONFIG";

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

pub fn resolve_config_paths(cli_paths: Vec<String>) -> Vec<String> {
    if !cli_paths.is_empty() {
        return cli_paths;
    }
    std::env::var(ENV_CONFIG)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Merge the config layers (empty list = all defaults) and build the typed policy.
///
/// Unused keys are logged, never fatal here; `config-check --mode LIVE` is the gate.
pub fn load_policy(paths: &[String]) -> Result<(LoadedConfig, GovernancePolicy)> {
    let loaded = if paths.is_empty() {
        LoadedConfig::empty()?
    } else {
        load_layered_yaml(paths)?
    };

    let report = report_unused_keys(
        ConfigMode::Replay,
        &loaded.config_json,
        fxg_config::UnusedKeyPolicy::Warn,
    )?;
    for key in &report.unused_leaf_pointers {
        warn!(key = %key, "config key is not read by any governance component");
    }

    let policy = GovernancePolicy::from_loaded(&loaded)?;
    Ok((loaded, policy))
}

/// Read a JSON file into `T`. A UTF-8 BOM (Windows editors) is stripped.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("read failed: {}", path.display()))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    let raw = std::str::from_utf8(bytes)
        .with_context(|| format!("{} must be UTF-8 text", path.display()))?;
    serde_json::from_str(raw.trim())
        .with_context(|| format!("{} must contain valid JSON", path.display()))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value).context("serialize output json failed")?;
    println!("{s}");
    Ok(())
}

/// Execute `fxg audit verify`.
pub fn audit_verify(path: &str) -> Result<()> {
    match verify_hash_chain(path)? {
        VerifyResult::Valid { lines } => {
            println!("audit_valid=true lines={lines} path={path}");
            Ok(())
        }
        VerifyResult::Broken { line, reason } => {
            println!("audit_valid=false line={line} reason={reason}");
            bail!("audit chain broken at line {line}: {reason}")
        }
    }
}
