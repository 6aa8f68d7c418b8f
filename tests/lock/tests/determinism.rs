//! Compiling the same capsule twice, whether in one process or two
//! separate process invocations sharing a signing key, must produce a
//! byte-identical shard tree — no wall-clock reads, no unordered
//! directory walks, no non-deterministic columnar encoding leaking into
//! the output.

use std::path::Path;

use ed25519_dalek::SigningKey;
use flashfreeze_judge::crossvalidate::WindowConfig;
use flashfreeze_kernel::binary::RecordScanConfig;
use flashfreeze_shard::{compile_capsule, CompileConfig, FixedClock, LocalPolicyV1, TrustStoreV1};
use lock_tests::{latent_record, observation_line, write_capsule};

fn fixed_config<'a>(key: &'a SigningKey, trust_store: &'a TrustStoreV1, policy: &'a LocalPolicyV1, clock: &'a FixedClock) -> CompileConfig<'a> {
    CompileConfig {
        record_scan: RecordScanConfig {
            latent_payload_len: 4,
            residual_max_len: 1024,
            resync_window: 4096,
        },
        window: WindowConfig {
            pre_window: 5,
            post_window: 5,
        },
        signing_key: key,
        trust_store,
        local_policy: policy,
        clock,
    }
}

fn build_safe_run_capsule(dir: &Path) {
    let mut events = String::new();
    let mut latents = Vec::new();
    for frame_id in 0..20u64 {
        events.push_str(&observation_line(frame_id));
        latents.extend(latent_record(frame_id, frame_id * 1000, &[0u8; 4]));
    }
    write_capsule(dir, events.as_bytes(), &latents, &[]);
}

#[test]
fn compiling_ten_times_in_process_is_byte_identical() {
    let tmp = tempfile::tempdir().unwrap();
    let capsule_dir = tmp.path().join("capsule");
    build_safe_run_capsule(&capsule_dir);

    let key = SigningKey::generate(&mut rand::rngs::OsRng);
    let trust_store = TrustStoreV1::new([hex::encode(key.verifying_key().to_bytes())]);
    let policy = LocalPolicyV1::empty();
    let clock = FixedClock("2026-01-01T00:00:00Z".to_string());
    let config = fixed_config(&key, &trust_store, &policy, &clock);

    let first_dir = tmp.path().join("shard_0");
    compile_capsule(&capsule_dir, &first_dir, &config).unwrap();
    let first_manifest = std::fs::read(first_dir.join("manifest.json")).unwrap();

    for i in 1..10 {
        let dir = tmp.path().join(format!("shard_{i}"));
        compile_capsule(&capsule_dir, &dir, &config).unwrap();
        let manifest = std::fs::read(dir.join("manifest.json")).unwrap();
        assert_eq!(manifest, first_manifest, "run {i} manifest diverged");

        for rel in ["graph/entities.parquet", "evidence/streams.parquet", "sig/manifest.sig"] {
            assert_eq!(
                std::fs::read(dir.join(rel)).unwrap(),
                std::fs::read(first_dir.join(rel)).unwrap(),
                "run {i}: {rel} diverged"
            );
        }
    }
}

#[test]
fn compiling_across_two_processes_is_byte_identical() {
    let tmp = tempfile::tempdir().unwrap();
    let capsule_dir = tmp.path().join("capsule");
    build_safe_run_capsule(&capsule_dir);

    let key = SigningKey::generate(&mut rand::rngs::OsRng);
    let seed_hex = hex::encode(key.to_bytes());

    let shard_a = tmp.path().join("shard_a");
    let shard_b = tmp.path().join("shard_b");

    for shard_dir in [&shard_a, &shard_b] {
        let status = std::process::Command::new(env!("CARGO_BIN_EXE_compile_golden_generator"))
            .arg(&capsule_dir)
            .arg(shard_dir)
            .arg(&seed_hex)
            .status()
            .expect("failed to spawn compile_golden_generator");
        assert!(status.success());
    }

    for rel in ["manifest.json", "graph/entities.parquet", "sig/manifest.sig"] {
        assert_eq!(
            std::fs::read(shard_a.join(rel)).unwrap(),
            std::fs::read(shard_b.join(rel)).unwrap(),
            "{rel} diverged across process boundary"
        );
    }
}
