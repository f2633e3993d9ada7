//! fxg-audit
//!
//! Append-only JSON Lines audit log for governance decisions, with an
//! optional SHA-256 hash chain (each event carries `hash_prev` + `hash_self`).
//!
//! Timestamps are supplied by the caller (the cycle clock), and event ids are
//! derived from chain state, so replaying the same cycle yields the same log.

mod verify;

pub use verify::{verify_hash_chain, verify_hash_chain_str, VerifyResult};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Namespace for v5 event and run ids.
const AUDIT_NAMESPACE: Uuid = Uuid::from_u128(0x6f78_6701_9b1e_4c3a_8d52_27c4_1e0a_93d7);

pub const TOPIC_GOVERNANCE: &str = "GOVERNANCE";

/// Governance event kinds written by the cycle evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    GovernanceState,
    CoalitionPromotion,
    ProposalDecision,
    CycleSummary,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::GovernanceState => "governance_state",
            EventKind::CoalitionPromotion => "coalition_promotion",
            EventKind::ProposalDecision => "proposal_decision",
            EventKind::CycleSummary => "cycle_summary",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        [
            EventKind::GovernanceState,
            EventKind::CoalitionPromotion,
            EventKind::ProposalDecision,
            EventKind::CycleSummary,
        ]
        .into_iter()
        .find(|k| k.as_str() == raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub run_id: Uuid,
    pub seq: u64,
    pub ts_utc: DateTime<Utc>,
    pub topic: String,
    pub event_type: String,
    pub payload: Value,
    pub hash_prev: Option<String>,
    pub hash_self: Option<String>,
}

/// Destination for governance audit events.
pub trait AuditSink {
    fn record(&mut self, ts_utc: DateTime<Utc>, kind: EventKind, payload: Value) -> Result<()>;
}

/// Stable run id from the engine id and the active config hash.
pub fn derive_run_id(engine_id: &str, config_hash: &str) -> Uuid {
    Uuid::new_v5(
        &AUDIT_NAMESPACE,
        format!("run|{engine_id}|{config_hash}").as_bytes(),
    )
}

/// Event id from chain position, previous hash and canonical payload. No RNG.
pub fn derive_event_id(last_hash: Option<&str>, payload: &Value, seq: u64) -> Result<Uuid> {
    let canonical = canonical_json_line(payload)?;
    let name = format!("event|{}|{}|{}", seq, last_hash.unwrap_or("-"), canonical);
    Ok(Uuid::new_v5(&AUDIT_NAMESPACE, name.as_bytes()))
}

// ---------------------------------------------------------------------------
// File writer
// ---------------------------------------------------------------------------

/// Append-only JSONL writer.
pub struct AuditWriter {
    path: PathBuf,
    run_id: Uuid,
    hash_chain: bool,
    last_hash: Option<String>,
    seq: u64,
}

impl AuditWriter {
    /// Creates the writer and ensures parent dirs exist. Starts a fresh chain.
    pub fn new(path: impl AsRef<Path>, run_id: Uuid, hash_chain: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create_dir_all {:?}", parent))?;
        }
        Ok(Self {
            path,
            run_id,
            hash_chain,
            last_hash: None,
            seq: 0,
        })
    }

    /// Continue an existing log: restores `seq` and `last_hash` from its last line.
    pub fn resume(path: impl AsRef<Path>, run_id: Uuid, hash_chain: bool) -> Result<Self> {
        let mut w = Self::new(path, run_id, hash_chain)?;
        if !w.path.exists() {
            return Ok(w);
        }
        let content =
            fs::read_to_string(&w.path).with_context(|| format!("read audit log {:?}", w.path))?;
        if let Some(last) = content.lines().rev().find(|l| !l.trim().is_empty()) {
            let ev: AuditEvent =
                serde_json::from_str(last.trim()).context("parse last audit event")?;
            w.seq = ev.seq + 1;
            w.last_hash = ev.hash_self;
        }
        Ok(w)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_hash(&self) -> Option<&str> {
        self.last_hash.as_deref()
    }

    /// Number of events appended to this log so far.
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn append(
        &mut self,
        ts_utc: DateTime<Utc>,
        topic: &str,
        event_type: &str,
        payload: Value,
    ) -> Result<AuditEvent> {
        let event_id = derive_event_id(self.last_hash.as_deref(), &payload, self.seq)?;

        let mut ev = AuditEvent {
            event_id,
            run_id: self.run_id,
            seq: self.seq,
            ts_utc,
            topic: topic.to_string(),
            event_type: event_type.to_string(),
            payload,
            hash_prev: None,
            hash_self: None,
        };

        if self.hash_chain {
            ev.hash_prev = self.last_hash.clone();
            let self_hash = compute_event_hash(&ev)?;
            ev.hash_self = Some(self_hash.clone());
            self.last_hash = Some(self_hash);
        }

        let line = canonical_json_line(&ev)?;
        append_line(&self.path, &line)?;
        self.seq += 1;

        Ok(ev)
    }
}

impl AuditSink for AuditWriter {
    fn record(&mut self, ts_utc: DateTime<Utc>, kind: EventKind, payload: Value) -> Result<()> {
        self.append(ts_utc, TOPIC_GOVERNANCE, kind.as_str(), payload)
            .map(|_| ())
    }
}

/// In-memory sink, mostly for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryAuditSink {
    pub events: Vec<(DateTime<Utc>, EventKind, Value)>,
}

impl MemoryAuditSink {
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &Value> {
        self.events
            .iter()
            .filter(move |(_, k, _)| *k == kind)
            .map(|(_, _, v)| v)
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&mut self, ts_utc: DateTime<Utc>, kind: EventKind, payload: Value) -> Result<()> {
        self.events.push((ts_utc, kind, payload));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Canonical form + hashing
// ---------------------------------------------------------------------------

fn append_line(path: &Path, line: &str) -> Result<()> {
    let mut f = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open audit log {:?}", path))?;
    f.write_all(line.as_bytes())
        .context("write audit line failed")?;
    f.write_all(b"\n").context("write newline failed")?;
    Ok(())
}

/// Keys sorted recursively, compact output. One event == one line.
pub(crate) fn canonical_json_line<T: Serialize>(v: &T) -> Result<String> {
    let raw = serde_json::to_value(v).context("serialize audit event failed")?;
    serde_json::to_string(&sort_keys(&raw)).context("json stringify failed")
}

fn sort_keys(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().cloned().collect();
            keys.sort();
            let mut new = serde_json::Map::new();
            for k in keys {
                new.insert(k.clone(), sort_keys(&map[&k]));
            }
            Value::Object(new)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_keys).collect()),
        _ => v.clone(),
    }
}

/// Hash over the canonical event with `hash_self` cleared.
pub fn compute_event_hash(ev: &AuditEvent) -> Result<String> {
    let mut clone = ev.clone();
    clone.hash_self = None;

    let canonical = canonical_json_line(&clone)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}
