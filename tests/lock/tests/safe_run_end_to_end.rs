//! A 100-frame safe run (pure observations, zero safety events) compiles
//! and verifies cleanly, with no residual stream at all.

use ed25519_dalek::SigningKey;
use flashfreeze_judge::crossvalidate::WindowConfig;
use flashfreeze_kernel::binary::RecordScanConfig;
use flashfreeze_kernel::capsule::Capsule;
use flashfreeze_shard::{compile_capsule, verify_shard, CapsuleCheck, CompileConfig, FixedClock, LocalPolicyV1, TrustStoreV1};
use lock_tests::{latent_record, observation_line, write_capsule};

#[test]
fn safe_run_compiles_and_verifies() {
    let tmp = tempfile::tempdir().unwrap();
    let capsule_dir = tmp.path().join("capsule");
    let shard_dir = tmp.path().join("shard");

    let mut events = String::new();
    let mut latents = Vec::new();
    for frame_id in 0..100u64 {
        events.push_str(&observation_line(frame_id));
        latents.extend(latent_record(frame_id, frame_id * 1000, &[0u8; 4]));
    }
    write_capsule(&capsule_dir, events.as_bytes(), &latents, &[]);

    let key = SigningKey::generate(&mut rand::rngs::OsRng);
    let trust_store = TrustStoreV1::new([hex::encode(key.verifying_key().to_bytes())]);
    let local_policy = LocalPolicyV1::empty();
    let clock = FixedClock("2026-01-01T00:00:00Z".to_string());
    let record_scan = RecordScanConfig {
        latent_payload_len: 4,
        residual_max_len: 1024,
        resync_window: 4096,
    };
    let window = WindowConfig { pre_window: 5, post_window: 5 };
    let config = CompileConfig {
        record_scan,
        window,
        signing_key: &key,
        trust_store: &trust_store,
        local_policy: &local_policy,
        clock: &clock,
    };

    compile_capsule(&capsule_dir, &shard_dir, &config).unwrap();
    assert!(!shard_dir.join("cam_residuals.bin").exists());

    let capsule = Capsule::open(&capsule_dir).unwrap();
    let check = CapsuleCheck {
        capsule: &capsule,
        record_scan,
        window,
    };
    let report = verify_shard(&shard_dir, &trust_store, Some(&check)).unwrap();
    assert!(report.capsule_checked);
}
