//! Row-set entity types shared by the cross-validator (C5) and the graph
//! builder (C6), §3 / §4.6.

use flashfreeze_kernel::binary::RecordStatus;
use flashfreeze_kernel::hash::ContentHash;

/// A subject's narrative tier: 0 (unclassified) through 4 (highest
/// severity, reserved for future use beyond Tier-1 safety triggers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Tier(u8);

impl Tier {
    pub const UNCLASSIFIED: Tier = Tier(0);
    pub const SAFETY: Tier = Tier(1);
    pub const OBSERVATION: Tier = Tier(2);

    /// Construct a tier, rejecting values outside `0..=4`.
    #[must_use]
    pub fn new(value: u8) -> Option<Self> {
        (value <= 4).then_some(Self(value))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

/// An `entity` row (§3): a named node in the evidence graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub entity_id: String,
    pub namespace: String,
    pub label: String,
    pub entity_type: String,
}

/// A literal value a claim's object may hold.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
}

impl LiteralValue {
    #[must_use]
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Decimal(_) => "decimal",
            Self::Boolean(_) => "boolean",
        }
    }
}

/// What a `claim`'s object points at: another entity, or a literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimObject {
    Entity(String),
    Literal(LiteralValue),
}

impl ClaimObject {
    /// The `object_type` column value (§3: `entity` or `literal:<kind>`).
    #[must_use]
    pub fn object_type(&self) -> String {
        match self {
            Self::Entity(_) => "entity".to_string(),
            Self::Literal(v) => format!("literal:{}", v.type_label()),
        }
    }
}

/// A `claim` row (§3): a structured fact asserted about a subject entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub claim_id: String,
    pub subject: String,
    pub predicate: String,
    pub object: ClaimObject,
    pub tier: Tier,
}

/// A `span` row (§3): a verbatim byte range into `events.jsonl`.
///
/// `text` is the raw byte slice `events.jsonl[byte_start..byte_end]`,
/// copied as-is and never reserialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub span_id: String,
    pub source_hash: ContentHash,
    pub byte_start: u64,
    pub byte_end: u64,
    pub text: Vec<u8>,
}

/// A `provenance` row (§3): links a claim to the span it was extracted from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub provenance_id: String,
    pub claim_id: String,
    pub span_id: String,
    pub source_hash: ContentHash,
    pub byte_start: u64,
    pub byte_end: u64,
}

/// Which binary side-channel a [`StreamRow`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Latents,
    Residuals,
}

impl StreamKind {
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Latents => "cam_latents.bin",
            Self::Residuals => "cam_residuals.bin",
        }
    }
}

/// A `stream` row (§3): the judge's joined view of one binary record,
/// or a synthesized gap inside a residual window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRow {
    pub frame_id: u64,
    pub stream: StreamKind,
    pub file: String,
    pub offset: u64,
    pub length: u32,
    pub status: RecordStatus,
    /// Absent only for a synthesized `Missing` row — there is no payload
    /// to hash when nothing was found on disk.
    pub content_hash: Option<ContentHash>,
}
