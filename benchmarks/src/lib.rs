//! Shared fixture helpers for flash-freeze benchmark suites: building
//! synthetic capsule directories of a given frame count, large enough to
//! make the binary-scan and compile-pipeline costs visible without
//! shipping real flight-recorder data alongside the crate.

use std::io::Write as _;
use std::path::Path;

use ed25519_dalek::SigningKey;
use flashfreeze_shard::{LocalPolicyV1, TrustStoreV1};

/// One `cam_latents.bin` record: fixed 4-byte payload, correct CRC-32.
#[must_use]
pub fn latent_record(frame_id: u64, timestamp_ns: u64) -> Vec<u8> {
    encode_record(*b"L1\0\0", frame_id, timestamp_ns, &[0u8; 4])
}

/// `n` contiguous, valid latent records: frame_id `0..n`.
#[must_use]
pub fn latent_stream(n: u64) -> Vec<u8> {
    (0..n).flat_map(|i| latent_record(i, i * 1000)).collect()
}

/// Like [`latent_stream`], but every `corrupt_every`-th record has its
/// payload flipped without fixing the CRC, forcing the scanner down the
/// resync path that often instead of the straight-line happy path.
#[must_use]
pub fn latent_stream_with_corruption(n: u64, corrupt_every: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    for i in 0..n {
        let mut record = latent_record(i, i * 1000);
        if corrupt_every > 0 && i % corrupt_every == 0 && i != 0 {
            let payload_start = record.len() - 4;
            record[payload_start] ^= 0xFF;
        }
        buf.extend(record);
    }
    buf
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

/// Write a minimal, valid capsule directory with `n` observation frames
/// and a matching contiguous latent stream, no residuals (a safe run).
///
/// # Panics
///
/// Panics on any I/O failure. Benchmark fixture setup is expected to
/// always succeed.
pub fn write_safe_run_capsule(dir: &Path, n: u64) {
    std::fs::create_dir_all(dir).expect("create capsule dir");
    let meta = br#"{"robot_id":"bench","session_id":"bench","started_at":"t0","ended_at":"t1","event_log_encoding":"utf-8","event_log_newline":"\n"}"#;
    std::fs::write(dir.join("meta.json"), meta).expect("write meta.json");

    let mut events = String::with_capacity(usize::try_from(n).unwrap_or(usize::MAX) * 48);
    for frame_id in 0..n {
        events.push_str(&format!(
            "{{\"kind\":\"observation\",\"frame_id\":{frame_id},\"t\":\"t0\"}}\n"
        ));
    }
    std::fs::write(dir.join("events.jsonl"), events.as_bytes()).expect("write events.jsonl");

    std::fs::File::create(dir.join("cam_latents.bin"))
        .expect("create cam_latents.bin")
        .write_all(&latent_stream(n))
        .expect("write cam_latents.bin");
}

/// A fresh signing key plus a trust store that allows exactly that key.
#[must_use]
pub fn trusted_keypair() -> (SigningKey, TrustStoreV1) {
    let key = SigningKey::generate(&mut rand::rngs::OsRng);
    let trust_store = TrustStoreV1::new([hex::encode(key.verifying_key().to_bytes())]);
    (key, trust_store)
}

#[must_use]
pub fn empty_local_policy() -> LocalPolicyV1 {
    LocalPolicyV1::empty()
}
