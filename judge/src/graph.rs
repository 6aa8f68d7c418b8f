//! Graph builder (C6, §4.6): turns the event log and the judge's
//! validated `stream` row-set into the evidence graph's four row-sets.
//! All IDs route through `flashfreeze_kernel::canon::mint`; every vector
//! is sorted lexicographically by primary id before return (§4.6
//! determinism requirement).

use std::collections::BTreeSet;

use flashfreeze_kernel::binary::RecordStatus;
use flashfreeze_kernel::capsule::{EventKind, ScannedEvent};
use flashfreeze_kernel::hash::ContentHash;

use crate::rows::{Claim, ClaimObject, Entity, LiteralValue, Provenance, Span, StreamRow, Tier};

const ENTITY_PREFIX: &str = "e_";
const CLAIM_PREFIX: &str = "c_";
const SPAN_PREFIX: &str = "s_";
const PROVENANCE_PREFIX: &str = "p_";

/// The four row-sets the graph builder emits.
#[derive(Debug, Clone, Default)]
pub struct GraphRowSets {
    pub entities: Vec<Entity>,
    pub claims: Vec<Claim>,
    pub spans: Vec<Span>,
    pub provenance: Vec<Provenance>,
}

/// Build the evidence graph from the narrative event log and the
/// judge's validated `stream` row-set. Every claim, span, and provenance
/// row is anchored to an *event* line, so only the event loop builds
/// those; but §4.6 requires an entity row for each event *and* each
/// validated record, so `stream_rows` contributes entity rows for any
/// frame_id that never surfaced as an event (a resynced/missing record
/// inside a window, or a latent frame with no matching event line).
pub fn build_graph(
    events: &[ScannedEvent],
    stream_rows: &[StreamRow],
    events_bytes: &[u8],
    source_hash: &ContentHash,
) -> GraphRowSets {
    let mut out = GraphRowSets::default();
    let mut entity_frame_ids: BTreeSet<u64> = BTreeSet::new();

    for scanned in events {
        let frame_id = match scanned.event.frame_id {
            Some(f) => f,
            None => continue,
        };

        let entity_payload = format!("frame|{frame_id}");
        let entity_id = flashfreeze_kernel::canon::mint(ENTITY_PREFIX, entity_payload.as_bytes())
            .expect("frame entity payload is always valid UTF-8");
        entity_frame_ids.insert(frame_id);
        out.entities.push(Entity {
            entity_id: entity_id.clone(),
            namespace: "frame".to_string(),
            label: frame_id.to_string(),
            entity_type: "frame".to_string(),
        });

        let span_payload = format!(
            "{}|{}|{}",
            source_hash.as_str(),
            scanned.byte_start,
            scanned.byte_end
        );
        let span_id = flashfreeze_kernel::canon::mint(SPAN_PREFIX, span_payload.as_bytes())
            .expect("span payload is always valid UTF-8");
        let text = events_bytes[scanned.byte_start..scanned.byte_end].to_vec();
        out.spans.push(Span {
            span_id: span_id.clone(),
            source_hash: source_hash.clone(),
            byte_start: scanned.byte_start as u64,
            byte_end: scanned.byte_end as u64,
            text,
        });

        let (predicate, object, tier) = match scanned.event.kind {
            EventKind::SafetyTrigger => (
                "triggered",
                ClaimObject::Literal(LiteralValue::String("tier1".to_string())),
                Tier::SAFETY,
            ),
            EventKind::Observation => (
                "observed",
                ClaimObject::Entity(entity_id.clone()),
                Tier::OBSERVATION,
            ),
            EventKind::Other => continue,
        };

        let claim_payload = format!("{entity_id}|{predicate}|{}", object.object_type());
        let claim_id = flashfreeze_kernel::canon::mint(CLAIM_PREFIX, claim_payload.as_bytes())
            .expect("claim payload is always valid UTF-8");
        out.claims.push(Claim {
            claim_id: claim_id.clone(),
            subject: entity_id.clone(),
            predicate: predicate.to_string(),
            object,
            tier,
        });

        let provenance_payload = format!("{claim_id}|{span_id}");
        let provenance_id =
            flashfreeze_kernel::canon::mint(PROVENANCE_PREFIX, provenance_payload.as_bytes())
                .expect("provenance payload is always valid UTF-8");
        out.provenance.push(Provenance {
            provenance_id,
            claim_id,
            span_id,
            source_hash: source_hash.clone(),
            byte_start: scanned.byte_start as u64,
            byte_end: scanned.byte_end as u64,
        });
    }

    for row in stream_rows {
        // A `missing` row is a placeholder for a frame_id that was never
        // observed as an event and never found on disk — it has no
        // validated record behind it, so it must not be promoted into an
        // entity row (spec: an entity row is emitted "for each validated
        // record", and a `missing` row is the absence of one).
        if !matches!(row.status, RecordStatus::Ok | RecordStatus::Resynced { .. }) {
            continue;
        }
        if !entity_frame_ids.insert(row.frame_id) {
            continue;
        }
        let entity_payload = format!("frame|{}", row.frame_id);
        let entity_id = flashfreeze_kernel::canon::mint(ENTITY_PREFIX, entity_payload.as_bytes())
            .expect("frame entity payload is always valid UTF-8");
        out.entities.push(Entity {
            entity_id,
            namespace: "frame".to_string(),
            label: row.frame_id.to_string(),
            entity_type: "frame".to_string(),
        });
    }

    out.entities.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
    out.claims.sort_by(|a, b| a.claim_id.cmp(&b.claim_id));
    out.spans.sort_by(|a, b| a.span_id.cmp(&b.span_id));
    out.provenance
        .sort_by(|a, b| a.provenance_id.cmp(&b.provenance_id));

    out
}
