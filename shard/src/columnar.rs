//! Thin, deterministic wrapper over `arrow`/`parquet` (§4.7, §9 Design
//! Notes: "the columnar writer is a collaborator that accepts row
//! batches and writes deterministic files ... if the chosen library
//! cannot guarantee reproducibility, the writer must serialize via a
//! thin deterministic encoder").
//!
//! Every table is written as a single row group, uncompressed, with
//! dictionary encoding and statistics disabled — the write options most
//! likely to make two encodings of the same rows diverge. As a second
//! line of defense, [`write_table`] re-encodes the same batch immediately
//! after writing and compares bytes; a real divergence surfaces as
//! [`ColumnarWriteError::NonDeterministic`] rather than a silently
//! non-reproducible shard.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, BinaryArray, StringArray, UInt32Array, UInt64Array, UInt8Array,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::{EnabledStatistics, WriterProperties};

use flashfreeze_judge::rows::{
    Claim, ClaimObject, Entity, LiteralValue, Provenance, Span, StreamKind, StreamRow, Tier,
};
use flashfreeze_kernel::binary::RecordStatus;
use flashfreeze_kernel::hash::ContentHash;

/// Error writing a columnar table.
#[derive(Debug)]
pub enum ColumnarWriteError {
    Io { detail: String },
    Arrow { detail: String },
    /// Encoding the same row batch twice produced different bytes: the
    /// pinned `arrow`/`parquet` version and options no longer guarantee
    /// reproducible output (original §4.7/§7 `NonDeterministicLibrary`).
    NonDeterministic { table: String },
}

impl std::fmt::Display for ColumnarWriteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::Arrow { detail } => write!(f, "arrow/parquet error: {detail}"),
            Self::NonDeterministic { table } => {
                write!(f, "non-deterministic columnar encoding for table {table:?}")
            }
        }
    }
}

impl std::error::Error for ColumnarWriteError {}

/// Error reading a columnar table back.
#[derive(Debug)]
pub enum ColumnarReadError {
    Io { detail: String },
    Arrow { detail: String },
    /// A row's stored value didn't parse back into its Rust type (e.g. a
    /// malformed `object_type` string, or a non-hex `content_hash`).
    MalformedRow { detail: String },
}

impl std::fmt::Display for ColumnarReadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error: {detail}"),
            Self::Arrow { detail } => write!(f, "arrow/parquet error: {detail}"),
            Self::MalformedRow { detail } => write!(f, "malformed row: {detail}"),
        }
    }
}

impl std::error::Error for ColumnarReadError {}

fn writer_properties() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::UNCOMPRESSED)
        .set_dictionary_enabled(false)
        .set_statistics_enabled(EnabledStatistics::None)
        .set_max_row_group_size(usize::MAX)
        .build()
}

fn encode(schema: &SchemaRef, batch: &RecordBatch) -> Result<Vec<u8>, ColumnarWriteError> {
    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, schema.clone(), Some(writer_properties()))
        .map_err(|e| ColumnarWriteError::Arrow {
            detail: e.to_string(),
        })?;
    writer.write(batch).map_err(|e| ColumnarWriteError::Arrow {
        detail: e.to_string(),
    })?;
    writer.close().map_err(|e| ColumnarWriteError::Arrow {
        detail: e.to_string(),
    })?;
    Ok(buf)
}

/// Write `batch` to `path` as a parquet file, verifying the encoding is
/// reproducible before trusting the bytes to disk.
///
/// # Errors
///
/// Returns [`ColumnarWriteError`] on an arrow/parquet failure, an I/O
/// failure, or a detected non-determinism in the encoder itself.
fn write_table(
    path: &Path,
    table_name: &str,
    schema: &SchemaRef,
    batch: &RecordBatch,
) -> Result<(), ColumnarWriteError> {
    let first = encode(schema, batch)?;
    let second = encode(schema, batch)?;
    if first != second {
        return Err(ColumnarWriteError::NonDeterministic {
            table: table_name.to_string(),
        });
    }
    std::fs::write(path, &first).map_err(|e| ColumnarWriteError::Io {
        detail: format!("writing {}: {e}", path.display()),
    })
}

fn read_batches(path: &Path) -> Result<Vec<RecordBatch>, ColumnarReadError> {
    let file = std::fs::File::open(path).map_err(|e| ColumnarReadError::Io {
        detail: format!("opening {}: {e}", path.display()),
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| ColumnarReadError::Arrow {
            detail: e.to_string(),
        })?
        .build()
        .map_err(|e| ColumnarReadError::Arrow {
            detail: e.to_string(),
        })?;
    reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ColumnarReadError::Arrow {
            detail: e.to_string(),
        })
}

fn col_str<'a>(batch: &'a RecordBatch, name: &str) -> &'a StringArray {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .unwrap_or_else(|| panic!("column {name:?} missing or wrong type"))
}

fn col_u64<'a>(batch: &'a RecordBatch, name: &str) -> &'a UInt64Array {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<UInt64Array>())
        .unwrap_or_else(|| panic!("column {name:?} missing or wrong type"))
}

fn col_u32<'a>(batch: &'a RecordBatch, name: &str) -> &'a UInt32Array {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<UInt32Array>())
        .unwrap_or_else(|| panic!("column {name:?} missing or wrong type"))
}

fn col_bin<'a>(batch: &'a RecordBatch, name: &str) -> &'a BinaryArray {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<BinaryArray>())
        .unwrap_or_else(|| panic!("column {name:?} missing or wrong type"))
}

// ---------------------------------------------------------------------
// entities
// ---------------------------------------------------------------------

pub mod entities {
    use super::{
        col_str, read_batches, write_table, Arc, ArrayRef, ColumnarReadError, ColumnarWriteError,
        DataType, Entity, Field, Path, RecordBatch, Schema, SchemaRef, StringArray,
    };

    #[must_use]
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("entity_id", DataType::Utf8, false),
            Field::new("namespace", DataType::Utf8, false),
            Field::new("label", DataType::Utf8, false),
            Field::new("entity_type", DataType::Utf8, false),
        ]))
    }

    fn to_batch(rows: &[Entity]) -> RecordBatch {
        let entity_id: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.entity_id.as_str())));
        let namespace: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.namespace.as_str())));
        let label: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.label.as_str())));
        let entity_type: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.entity_type.as_str())));
        RecordBatch::try_new(schema(), vec![entity_id, namespace, label, entity_type])
            .expect("entity columns have matching length by construction")
    }

    /// # Errors
    ///
    /// See [`ColumnarWriteError`].
    pub fn write(path: &Path, rows: &[Entity]) -> Result<(), ColumnarWriteError> {
        write_table(path, "entities", &schema(), &to_batch(rows))
    }

    /// # Errors
    ///
    /// See [`ColumnarReadError`].
    pub fn read(path: &Path) -> Result<Vec<Entity>, ColumnarReadError> {
        let mut out = Vec::new();
        for batch in read_batches(path)? {
            let entity_id = col_str(&batch, "entity_id");
            let namespace = col_str(&batch, "namespace");
            let label = col_str(&batch, "label");
            let entity_type = col_str(&batch, "entity_type");
            for i in 0..batch.num_rows() {
                out.push(Entity {
                    entity_id: entity_id.value(i).to_string(),
                    namespace: namespace.value(i).to_string(),
                    label: label.value(i).to_string(),
                    entity_type: entity_type.value(i).to_string(),
                });
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------
// claims
// ---------------------------------------------------------------------

pub mod claims {
    use super::{
        col_str, read_batches, write_table, Arc, ArrayRef, Claim, ClaimObject, ColumnarReadError,
        ColumnarWriteError, DataType, Field, LiteralValue, Path, RecordBatch, Schema, SchemaRef,
        StringArray, Tier, UInt8Array,
    };

    #[must_use]
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("claim_id", DataType::Utf8, false),
            Field::new("subject", DataType::Utf8, false),
            Field::new("predicate", DataType::Utf8, false),
            Field::new("object_type", DataType::Utf8, false),
            Field::new("object_value", DataType::Utf8, false),
            Field::new("tier", DataType::UInt8, false),
        ]))
    }

    fn object_value(object: &ClaimObject) -> String {
        match object {
            ClaimObject::Entity(id) => id.clone(),
            ClaimObject::Literal(LiteralValue::String(s)) => s.clone(),
            ClaimObject::Literal(LiteralValue::Integer(i)) => i.to_string(),
            ClaimObject::Literal(LiteralValue::Decimal(d)) => d.to_string(),
            ClaimObject::Literal(LiteralValue::Boolean(b)) => b.to_string(),
        }
    }

    fn parse_object(object_type: &str, value: &str) -> Result<ClaimObject, ColumnarReadError> {
        match object_type {
            "entity" => Ok(ClaimObject::Entity(value.to_string())),
            "literal:string" => Ok(ClaimObject::Literal(LiteralValue::String(value.to_string()))),
            "literal:integer" => value
                .parse()
                .map(|v| ClaimObject::Literal(LiteralValue::Integer(v)))
                .map_err(|e| ColumnarReadError::MalformedRow {
                    detail: format!("object_value {value:?} not an integer: {e}"),
                }),
            "literal:decimal" => value
                .parse()
                .map(|v| ClaimObject::Literal(LiteralValue::Decimal(v)))
                .map_err(|e| ColumnarReadError::MalformedRow {
                    detail: format!("object_value {value:?} not a decimal: {e}"),
                }),
            "literal:boolean" => value
                .parse()
                .map(|v| ClaimObject::Literal(LiteralValue::Boolean(v)))
                .map_err(|e| ColumnarReadError::MalformedRow {
                    detail: format!("object_value {value:?} not a boolean: {e}"),
                }),
            other => Err(ColumnarReadError::MalformedRow {
                detail: format!("unrecognized object_type {other:?}"),
            }),
        }
    }

    fn to_batch(rows: &[Claim]) -> RecordBatch {
        let claim_id: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.claim_id.as_str())));
        let subject: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.subject.as_str())));
        let predicate: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.predicate.as_str())));
        let object_type: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.object.object_type())));
        let object_value: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(object_value)));
        let tier: ArrayRef = Arc::new(UInt8Array::from_iter_values(rows.iter().map(|r| r.tier.value())));
        RecordBatch::try_new(
            schema(),
            vec![claim_id, subject, predicate, object_type, object_value, tier],
        )
        .expect("claim columns have matching length by construction")
    }

    /// # Errors
    ///
    /// See [`ColumnarWriteError`].
    pub fn write(path: &Path, rows: &[Claim]) -> Result<(), ColumnarWriteError> {
        write_table(path, "claims", &schema(), &to_batch(rows))
    }

    /// # Errors
    ///
    /// See [`ColumnarReadError`].
    pub fn read(path: &Path) -> Result<Vec<Claim>, ColumnarReadError> {
        let mut out = Vec::new();
        for batch in read_batches(path)? {
            let claim_id = col_str(&batch, "claim_id");
            let subject = col_str(&batch, "subject");
            let predicate = col_str(&batch, "predicate");
            let object_type = col_str(&batch, "object_type");
            let object_value = col_str(&batch, "object_value");
            let tier_col = batch
                .column_by_name("tier")
                .and_then(|c| c.as_any().downcast_ref::<UInt8Array>())
                .expect("tier column missing or wrong type");
            for i in 0..batch.num_rows() {
                out.push(Claim {
                    claim_id: claim_id.value(i).to_string(),
                    subject: subject.value(i).to_string(),
                    predicate: predicate.value(i).to_string(),
                    object: parse_object(object_type.value(i), object_value.value(i))?,
                    tier: Tier::new(tier_col.value(i)).ok_or_else(|| ColumnarReadError::MalformedRow {
                        detail: format!("tier {} out of range", tier_col.value(i)),
                    })?,
                });
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------
// spans
// ---------------------------------------------------------------------

pub mod spans {
    use super::{
        col_bin, col_str, col_u64, read_batches, write_table, Arc, ArrayRef, BinaryArray,
        ColumnarReadError, ColumnarWriteError, ContentHash, DataType, Field, Path, RecordBatch,
        Schema, SchemaRef, Span, StringArray, UInt64Array,
    };

    #[must_use]
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("span_id", DataType::Utf8, false),
            Field::new("source_hash", DataType::Utf8, false),
            Field::new("byte_start", DataType::UInt64, false),
            Field::new("byte_end", DataType::UInt64, false),
            Field::new("text", DataType::Binary, false),
        ]))
    }

    fn to_batch(rows: &[Span]) -> RecordBatch {
        let span_id: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.span_id.as_str())));
        let source_hash: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.source_hash.as_str())));
        let byte_start: ArrayRef = Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.byte_start)));
        let byte_end: ArrayRef = Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.byte_end)));
        let text: ArrayRef = Arc::new(BinaryArray::from_iter_values(rows.iter().map(|r| r.text.as_slice())));
        RecordBatch::try_new(schema(), vec![span_id, source_hash, byte_start, byte_end, text])
            .expect("span columns have matching length by construction")
    }

    /// # Errors
    ///
    /// See [`ColumnarWriteError`].
    pub fn write(path: &Path, rows: &[Span]) -> Result<(), ColumnarWriteError> {
        write_table(path, "spans", &schema(), &to_batch(rows))
    }

    /// # Errors
    ///
    /// See [`ColumnarReadError`].
    pub fn read(path: &Path) -> Result<Vec<Span>, ColumnarReadError> {
        let mut out = Vec::new();
        for batch in read_batches(path)? {
            let span_id = col_str(&batch, "span_id");
            let source_hash = col_str(&batch, "source_hash");
            let byte_start = col_u64(&batch, "byte_start");
            let byte_end = col_u64(&batch, "byte_end");
            let text = col_bin(&batch, "text");
            for i in 0..batch.num_rows() {
                let hash = ContentHash::parse(source_hash.value(i)).ok_or_else(|| {
                    ColumnarReadError::MalformedRow {
                        detail: format!("malformed source_hash {:?}", source_hash.value(i)),
                    }
                })?;
                out.push(Span {
                    span_id: span_id.value(i).to_string(),
                    source_hash: hash,
                    byte_start: byte_start.value(i),
                    byte_end: byte_end.value(i),
                    text: text.value(i).to_vec(),
                });
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------
// provenance
// ---------------------------------------------------------------------

pub mod provenance {
    use super::{
        col_str, col_u64, read_batches, write_table, Arc, ArrayRef, ColumnarReadError,
        ColumnarWriteError, ContentHash, DataType, Field, Path, Provenance, RecordBatch, Schema,
        SchemaRef, StringArray, UInt64Array,
    };

    #[must_use]
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("provenance_id", DataType::Utf8, false),
            Field::new("claim_id", DataType::Utf8, false),
            Field::new("span_id", DataType::Utf8, false),
            Field::new("source_hash", DataType::Utf8, false),
            Field::new("byte_start", DataType::UInt64, false),
            Field::new("byte_end", DataType::UInt64, false),
        ]))
    }

    fn to_batch(rows: &[Provenance]) -> RecordBatch {
        let provenance_id: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.provenance_id.as_str())));
        let claim_id: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.claim_id.as_str())));
        let span_id: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.span_id.as_str())));
        let source_hash: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.source_hash.as_str())));
        let byte_start: ArrayRef = Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.byte_start)));
        let byte_end: ArrayRef = Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.byte_end)));
        RecordBatch::try_new(
            schema(),
            vec![provenance_id, claim_id, span_id, source_hash, byte_start, byte_end],
        )
        .expect("provenance columns have matching length by construction")
    }

    /// # Errors
    ///
    /// See [`ColumnarWriteError`].
    pub fn write(path: &Path, rows: &[Provenance]) -> Result<(), ColumnarWriteError> {
        write_table(path, "provenance", &schema(), &to_batch(rows))
    }

    /// # Errors
    ///
    /// See [`ColumnarReadError`].
    pub fn read(path: &Path) -> Result<Vec<Provenance>, ColumnarReadError> {
        let mut out = Vec::new();
        for batch in read_batches(path)? {
            let provenance_id = col_str(&batch, "provenance_id");
            let claim_id = col_str(&batch, "claim_id");
            let span_id = col_str(&batch, "span_id");
            let source_hash = col_str(&batch, "source_hash");
            let byte_start = col_u64(&batch, "byte_start");
            let byte_end = col_u64(&batch, "byte_end");
            for i in 0..batch.num_rows() {
                let hash = ContentHash::parse(source_hash.value(i)).ok_or_else(|| {
                    ColumnarReadError::MalformedRow {
                        detail: format!("malformed source_hash {:?}", source_hash.value(i)),
                    }
                })?;
                out.push(Provenance {
                    provenance_id: provenance_id.value(i).to_string(),
                    claim_id: claim_id.value(i).to_string(),
                    span_id: span_id.value(i).to_string(),
                    source_hash: hash,
                    byte_start: byte_start.value(i),
                    byte_end: byte_end.value(i),
                });
            }
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------
// streams
// ---------------------------------------------------------------------

pub mod streams {
    use super::{
        col_str, col_u32, col_u64, read_batches, write_table, Arc, ArrayRef, ColumnarReadError,
        ColumnarWriteError, ContentHash, DataType, Field, Path, RecordBatch, RecordStatus, Schema,
        SchemaRef, StreamKind, StreamRow, StringArray, UInt32Array, UInt64Array,
    };

    #[must_use]
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("frame_id", DataType::UInt64, false),
            Field::new("stream", DataType::Utf8, false),
            Field::new("file", DataType::Utf8, false),
            Field::new("offset", DataType::UInt64, false),
            Field::new("length", DataType::UInt32, false),
            Field::new("status", DataType::Utf8, false),
            Field::new("status_skipped", DataType::UInt64, true),
            Field::new("content_hash", DataType::Utf8, true),
        ]))
    }

    fn stream_label(kind: StreamKind) -> &'static str {
        match kind {
            StreamKind::Latents => "latents",
            StreamKind::Residuals => "residuals",
        }
    }

    fn parse_stream_label(s: &str) -> Result<StreamKind, ColumnarReadError> {
        match s {
            "latents" => Ok(StreamKind::Latents),
            "residuals" => Ok(StreamKind::Residuals),
            other => Err(ColumnarReadError::MalformedRow {
                detail: format!("unrecognized stream kind {other:?}"),
            }),
        }
    }

    fn status_label(status: RecordStatus) -> &'static str {
        match status {
            RecordStatus::Ok => "ok",
            RecordStatus::Resynced { .. } => "resynced",
            RecordStatus::Missing => "missing",
        }
    }

    fn status_skipped(status: RecordStatus) -> Option<u64> {
        match status {
            RecordStatus::Resynced { skipped } => Some(skipped),
            _ => None,
        }
    }

    fn parse_status(label: &str, skipped: Option<u64>) -> Result<RecordStatus, ColumnarReadError> {
        match label {
            "ok" => Ok(RecordStatus::Ok),
            "resynced" => skipped
                .map(|skipped| RecordStatus::Resynced { skipped })
                .ok_or_else(|| ColumnarReadError::MalformedRow {
                    detail: "resynced row missing status_skipped".to_string(),
                }),
            "missing" => Ok(RecordStatus::Missing),
            other => Err(ColumnarReadError::MalformedRow {
                detail: format!("unrecognized status {other:?}"),
            }),
        }
    }

    fn to_batch(rows: &[StreamRow]) -> RecordBatch {
        let frame_id: ArrayRef = Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.frame_id)));
        let stream: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| stream_label(r.stream))));
        let file: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.file.as_str())));
        let offset: ArrayRef = Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.offset)));
        let length: ArrayRef = Arc::new(UInt32Array::from_iter_values(rows.iter().map(|r| r.length)));
        let status: ArrayRef = Arc::new(StringArray::from_iter_values(rows.iter().map(|r| status_label(r.status))));
        let status_skipped: ArrayRef = Arc::new(UInt64Array::from_iter(rows.iter().map(|r| status_skipped(r.status))));
        let content_hash: ArrayRef = Arc::new(StringArray::from_iter(
            rows.iter().map(|r| r.content_hash.as_ref().map(ContentHash::as_str)),
        ));
        RecordBatch::try_new(
            schema(),
            vec![frame_id, stream, file, offset, length, status, status_skipped, content_hash],
        )
        .expect("stream columns have matching length by construction")
    }

    /// # Errors
    ///
    /// See [`ColumnarWriteError`].
    pub fn write(path: &Path, rows: &[StreamRow]) -> Result<(), ColumnarWriteError> {
        write_table(path, "streams", &schema(), &to_batch(rows))
    }

    /// # Errors
    ///
    /// See [`ColumnarReadError`].
    pub fn read(path: &Path) -> Result<Vec<StreamRow>, ColumnarReadError> {
        let mut out = Vec::new();
        for batch in read_batches(path)? {
            let frame_id = col_u64(&batch, "frame_id");
            let stream = col_str(&batch, "stream");
            let file = col_str(&batch, "file");
            let offset = col_u64(&batch, "offset");
            let length = col_u32(&batch, "length");
            let status = col_str(&batch, "status");
            let status_skipped = col_u64(&batch, "status_skipped");
            let content_hash = col_str(&batch, "content_hash");
            for i in 0..batch.num_rows() {
                let skipped = if status_skipped.is_null(i) {
                    None
                } else {
                    Some(status_skipped.value(i))
                };
                let hash = if content_hash.is_null(i) {
                    None
                } else {
                    Some(ContentHash::parse(content_hash.value(i)).ok_or_else(|| {
                        ColumnarReadError::MalformedRow {
                            detail: format!("malformed content_hash {:?}", content_hash.value(i)),
                        }
                    })?)
                };
                out.push(StreamRow {
                    frame_id: frame_id.value(i),
                    stream: parse_stream_label(stream.value(i))?,
                    file: file.value(i).to_string(),
                    offset: offset.value(i),
                    length: length.value(i),
                    status: parse_status(status.value(i), skipped)?,
                    content_hash: hash,
                });
            }
        }
        Ok(out)
    }
}
