//! Compiles a safe-run capsule into a shard directory and prints the
//! resulting manifest fields, for cross-process determinism checks
//! (compiling the same capsule in two separate process invocations
//! must yield byte-identical shard trees).
//!
//! Usage: `compile_golden_generator <capsule_dir> <shard_dir> <signing_key_hex>`
//!
//! `signing_key_hex` is the 32-byte Ed25519 seed, hex-encoded, so two
//! invocations can share the same publisher identity.

use ed25519_dalek::SigningKey;
use flashfreeze_judge::crossvalidate::WindowConfig;
use flashfreeze_kernel::binary::RecordScanConfig;
use flashfreeze_shard::{compile_capsule, CompileConfig, FixedClock, LocalPolicyV1, TrustStoreV1};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        eprintln!("usage: compile_golden_generator <capsule_dir> <shard_dir> <signing_key_hex>");
        std::process::exit(1);
    }
    let capsule_dir = std::path::Path::new(&args[1]);
    let shard_dir = std::path::Path::new(&args[2]);
    let seed_bytes: [u8; 32] = hex::decode(&args[3])
        .expect("signing_key_hex must be valid hex")
        .try_into()
        .expect("signing_key_hex must decode to 32 bytes");
    let signing_key = SigningKey::from_bytes(&seed_bytes);

    let trust_store = TrustStoreV1::new([hex::encode(signing_key.verifying_key().to_bytes())]);
    let local_policy = LocalPolicyV1::empty();
    let clock = FixedClock("2026-01-01T00:00:00Z".to_string());
    let config = CompileConfig {
        record_scan: RecordScanConfig {
            latent_payload_len: 4,
            residual_max_len: 1024,
            resync_window: 4096,
        },
        window: WindowConfig {
            pre_window: 5,
            post_window: 5,
        },
        signing_key: &signing_key,
        trust_store: &trust_store,
        local_policy: &local_policy,
        clock: &clock,
    };

    if shard_dir.exists() {
        std::fs::remove_dir_all(shard_dir).expect("clearing stale shard dir");
    }
    compile_capsule(capsule_dir, shard_dir, &config).expect("compile failed");

    let manifest_bytes = std::fs::read(shard_dir.join("manifest.json")).unwrap();
    let manifest = flashfreeze_shard::Manifest::parse(&manifest_bytes).unwrap();
    println!("merkle_root={}", manifest.merkle_root);
    println!("capsule_hash={}", manifest.capsule_hash.as_str());
    println!("publisher_public_key={}", manifest.publisher_public_key_hex);
    println!("shard written to: {}", shard_dir.display());
}
