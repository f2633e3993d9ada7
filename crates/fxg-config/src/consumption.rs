//! Config consumption map + unused-key guard.
//!
//! "Consumed pointers" are JSON Pointer prefixes. A leaf under any consumed
//! prefix is consumed; every other leaf is unused. Callers choose whether
//! unused keys warn or fail.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfigMode {
    /// Offline evaluation over recorded history (CLI).
    Replay,
    Paper,
    Live,
}

impl ConfigMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigMode::Replay => "REPLAY",
            ConfigMode::Paper => "PAPER",
            ConfigMode::Live => "LIVE",
        }
    }

    /// Default unused-key policy: live refuses to start on unknown keys.
    pub fn default_unused_policy(&self) -> UnusedKeyPolicy {
        match self {
            ConfigMode::Live => UnusedKeyPolicy::Fail,
            ConfigMode::Replay | ConfigMode::Paper => UnusedKeyPolicy::Warn,
        }
    }
}

impl std::str::FromStr for ConfigMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "REPLAY" => Ok(ConfigMode::Replay),
            "PAPER" => Ok(ConfigMode::Paper),
            "LIVE" => Ok(ConfigMode::Live),
            other => Err(format!("unknown config mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    pub mode: String,
    /// Consumed prefixes used for this analysis (sorted, unique).
    pub consumed_prefixes: Vec<String>,
    /// Unused leaf pointers (sorted).
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

/// Consumed prefixes. Must match what code reads:
///
/// - fxg-runtime::GovernancePolicy::from_config_json
///     /governance  /decision  /coalition  /sizing  /runtime
/// - fxg-cli: audit stream identity
///     /engine/engine_id
const CONSUMED_POINTERS: &[&str] = &[
    "/governance",
    "/decision",
    "/coalition",
    "/sizing",
    "/runtime",
    "/engine/engine_id",
];

/// Registry of consumed prefixes per mode. Every mode reads the same keys;
/// the modes differ only in their unused-key policy.
pub fn consumed_pointers_for_mode(mode: ConfigMode) -> &'static [&'static str] {
    match mode {
        ConfigMode::Replay | ConfigMode::Paper | ConfigMode::Live => CONSUMED_POINTERS,
    }
}

/// Produce an unused-key report. With `Fail`, unused keys are an error.
pub fn report_unused_keys(
    mode: ConfigMode,
    config_json: &Value,
    policy: UnusedKeyPolicy,
) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<String> = consumed_pointers_for_mode(mode)
        .iter()
        .map(|p| normalize_pointer(p))
        .collect();
    let consumed_prefixes: Vec<String> = consumed.into_iter().collect();

    let mut leaves: Vec<String> = Vec::new();
    collect_leaf_pointers(config_json, "", &mut leaves);

    let mut unused: Vec<String> = leaves
        .into_iter()
        .filter(|lp| !consumed_prefixes.iter().any(|cp| is_prefix_pointer(cp, lp)))
        .collect();
    unused.sort();
    unused.dedup();

    let report = UnusedKeyReport {
        mode: mode.as_str().to_string(),
        consumed_prefixes,
        unused_leaf_pointers: unused,
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS (mode={}): {} unused config leaf key(s) detected. \
            Remove them or update the consumed registry. First few: {}",
            report.mode,
            report.unused_leaf_pointers.len(),
            preview_list(&report.unused_leaf_pointers, 12)
        );
    }

    Ok(report)
}

/// Leading "/", no trailing "/" (except the root).
fn normalize_pointer(p: &str) -> String {
    let mut s = p.trim().to_string();
    if s.is_empty() {
        return "/".to_string();
    }
    if !s.starts_with('/') {
        s.insert(0, '/');
    }
    while s.ends_with('/') && s.len() > 1 {
        s.pop();
    }
    s
}

/// "/a/b" consumes "/a/b" and "/a/b/c" but not "/a/bc".
fn is_prefix_pointer(prefix: &str, leaf: &str) -> bool {
    if prefix == "/" || leaf == prefix {
        return true;
    }
    leaf.strip_prefix(prefix)
        .map(|rest| rest.starts_with('/'))
        .unwrap_or(false)
}

pub(crate) fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            let p = if prefix.is_empty() {
                "/".to_string()
            } else {
                prefix.to_string()
            };
            out.push(p);
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn preview_list(items: &[String], n: usize) -> String {
    let take = items.iter().take(n).cloned().collect::<Vec<_>>();
    format!("{:?}", take)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_respects_token_boundary() {
        assert!(is_prefix_pointer("/governance", "/governance/learning/milestone"));
        assert!(is_prefix_pointer("/governance", "/governance"));
        assert!(!is_prefix_pointer("/governance", "/governance_v2/x"));
        assert!(is_prefix_pointer("/", "/anything"));
    }

    #[test]
    fn normalize_adds_and_strips_slashes() {
        assert_eq!(normalize_pointer("sizing/"), "/sizing");
        assert_eq!(normalize_pointer(""), "/");
    }
}
