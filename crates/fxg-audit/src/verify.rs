use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::{compute_event_hash, derive_event_id, AuditEvent, EventKind, TOPIC_GOVERNANCE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyResult {
    Valid { lines: usize },
    /// First broken line (1-based) and why.
    Broken { line: usize, reason: String },
}

impl VerifyResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, VerifyResult::Valid { .. })
    }
}

pub fn verify_hash_chain(path: impl AsRef<Path>) -> Result<VerifyResult> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("read audit log {:?}", path.as_ref()))?;
    verify_hash_chain_str(&content)
}

/// What the previous event fixed for the one after it.
#[derive(Default)]
struct ChainCursor {
    seq: Option<u64>,
    run_id: Option<Uuid>,
    hash: Option<String>,
}

impl ChainCursor {
    /// First rule the event breaks, if any.
    fn check(&self, ev: &AuditEvent) -> Result<Option<String>> {
        if let Some(seq) = self.seq {
            if ev.seq != seq {
                return Ok(Some(format!("seq gap: expected {seq}, got {}", ev.seq)));
            }
        }

        if ev.topic != TOPIC_GOVERNANCE {
            return Ok(Some(format!("unexpected topic '{}'", ev.topic)));
        }
        let Some(kind) = EventKind::parse(&ev.event_type) else {
            return Ok(Some(format!("unknown event_type '{}'", ev.event_type)));
        };

        // A new run id only appears where a cycle opens.
        if let Some(run_id) = self.run_id {
            if ev.run_id != run_id && kind != EventKind::GovernanceState {
                return Ok(Some(format!(
                    "run_id changed mid-cycle at {}: {} -> {}",
                    kind.as_str(),
                    run_id,
                    ev.run_id
                )));
            }
        }

        if ev.hash_prev != self.hash {
            return Ok(Some(format!(
                "hash_prev mismatch: expected {:?}, got {:?}",
                self.hash, ev.hash_prev
            )));
        }

        if let Some(claimed) = &ev.hash_self {
            let recomputed = compute_event_hash(ev)?;
            if *claimed != recomputed {
                return Ok(Some(format!(
                    "hash_self mismatch: claimed {claimed}, recomputed {recomputed}"
                )));
            }
        }

        let expected_id = derive_event_id(self.hash.as_deref(), &ev.payload, ev.seq)?;
        if ev.event_id != expected_id {
            return Ok(Some(format!(
                "event_id mismatch: got {}, derived {}",
                ev.event_id, expected_id
            )));
        }
        Ok(None)
    }

    fn advance(&mut self, ev: &AuditEvent) {
        self.seq = Some(ev.seq + 1);
        self.run_id = Some(ev.run_id);
        self.hash = ev.hash_self.clone();
    }
}

/// Checks `seq` continuity, governance event kinds, run-id boundaries,
/// `hash_prev` linkage, derived event ids and `hash_self` integrity.
///
/// Event ids are re-derived from chain state, so payload edits are caught
/// even in an unchained log.
pub fn verify_hash_chain_str(content: &str) -> Result<VerifyResult> {
    let mut cursor = ChainCursor::default();
    let mut lines = 0usize;

    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let ev: AuditEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("parse audit event at line {}", i + 1))?;
        lines += 1;

        if let Some(reason) = cursor.check(&ev)? {
            return Ok(VerifyResult::Broken {
                line: i + 1,
                reason,
            });
        }
        cursor.advance(&ev);
    }

    Ok(VerifyResult::Valid { lines })
}
