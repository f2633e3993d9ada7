use anyhow::{anyhow, Result};
use fxg_config::{load_layered_yaml, report_unused_keys, ConfigMode, LoadedConfig};
use fxg_runtime::GovernancePolicy;

/// Execute `fxg config-hash`.
pub fn config_hash(paths: &[String]) -> Result<()> {
    let loaded = load_layered_yaml(paths)?;
    println!("config_hash={}", loaded.config_hash);
    println!("{}", loaded.canonical_json);
    Ok(())
}

/// Execute `fxg config-check`: every section must parse, and unused keys
/// follow the mode's policy (LIVE fails).
pub fn config_check(paths: &[String], mode: &str) -> Result<()> {
    let mode: ConfigMode = mode.parse().map_err(|e: String| anyhow!(e))?;
    let loaded = if paths.is_empty() {
        LoadedConfig::empty()?
    } else {
        load_layered_yaml(paths)?
    };

    GovernancePolicy::from_loaded(&loaded)?;
    let report = report_unused_keys(mode, &loaded.config_json, mode.default_unused_policy())?;

    println!("config_hash={}", loaded.config_hash);
    println!("mode={}", report.mode);
    println!("unused_keys={}", report.unused_leaf_pointers.len());
    for key in &report.unused_leaf_pointers {
        println!("unused={key}");
    }
    Ok(())
}
