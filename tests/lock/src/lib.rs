//! Shared fixture helpers for the end-to-end lock tests and fixture
//! binaries: building a capsule directory on disk, and hand-encoding
//! raw latent/residual binary records without going through the
//! compiler itself (so the scanners are genuinely exercised against
//! bytes nothing in this workspace produced).

use std::io::Write as _;
use std::path::Path;

use ed25519_dalek::SigningKey;
use flashfreeze_shard::{LocalPolicyV1, TrustStoreV1};

/// Writes a minimal but valid `meta.json` plus the given `events.jsonl`
/// bytes and (optional) binary streams into `dir`.
pub fn write_capsule(dir: &Path, events: &[u8], latents: &[u8], residuals: &[u8]) {
    std::fs::create_dir_all(dir).unwrap();
    let meta = br#"{"robot_id":"r1","session_id":"s1","started_at":"2026-01-01T00:00:00Z","ended_at":"2026-01-01T00:01:00Z","event_log_encoding":"utf-8","event_log_newline":"\n"}"#;
    std::fs::write(dir.join("meta.json"), meta).unwrap();
    std::fs::write(dir.join("events.jsonl"), events).unwrap();
    if !latents.is_empty() {
        std::fs::File::create(dir.join("cam_latents.bin"))
            .unwrap()
            .write_all(latents)
            .unwrap();
    }
    if !residuals.is_empty() {
        std::fs::File::create(dir.join("cam_residuals.bin"))
            .unwrap()
            .write_all(residuals)
            .unwrap();
    }
}

/// One `cam_latents.bin` record: `L1\0\0` magic, a fixed-width payload,
/// a correct CRC-32, and the given `frame_id`/`timestamp_ns`.
pub fn latent_record(frame_id: u64, timestamp_ns: u64, payload: &[u8]) -> Vec<u8> {
    encode_record(*b"L1\0\0", frame_id, timestamp_ns, payload)
}

/// One `cam_residuals.bin` record: `R1\0\0` magic, a variable-width
/// payload, a correct CRC-32, and the given `frame_id`/`timestamp_ns`.
pub fn residual_record(frame_id: u64, timestamp_ns: u64, payload: &[u8]) -> Vec<u8> {
    encode_record(*b"R1\0\0", frame_id, timestamp_ns, payload)
}

fn encode_record(magic: [u8; 4], frame_id: u64, timestamp_ns: u64, payload: &[u8]) -> Vec<u8> {
    let crc = crc32fast::hash(payload);
    let mut buf = Vec::with_capacity(28 + payload.len());
    buf.extend_from_slice(&magic);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(&frame_id.to_le_bytes());
    buf.extend_from_slice(&timestamp_ns.to_le_bytes());
    buf.extend_from_slice(&crc.to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// One observation event line for `events.jsonl`.
pub fn observation_line(frame_id: u64) -> String {
    format!("{{\"kind\":\"observation\",\"frame_id\":{frame_id},\"t\":\"2026-01-01T00:00:00Z\"}}\n")
}

/// One safety-trigger event line for `events.jsonl`.
pub fn safety_trigger_line(frame_id: u64) -> String {
    format!("{{\"kind\":\"safety_trigger\",\"frame_id\":{frame_id},\"t\":\"2026-01-01T00:00:00Z\"}}\n")
}

/// A fresh signing key plus a trust store that allows exactly that key,
/// the shape every fixture/test needs before it can compile or verify a
/// shard.
pub fn trusted_keypair() -> (SigningKey, TrustStoreV1) {
    let key = SigningKey::generate(&mut rand::rngs::OsRng);
    let trust_store = TrustStoreV1::new([hex::encode(key.verifying_key().to_bytes())]);
    (key, trust_store)
}

pub fn empty_local_policy() -> LocalPolicyV1 {
    LocalPolicyV1::empty()
}

/// A scratch directory unique to this process, under the system temp
/// dir, that callers should remove when done.
pub fn scratch_dir(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("flashfreeze_{label}_{}", std::process::id()))
}
