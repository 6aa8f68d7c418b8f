//! Verifies an already-compiled shard directory against a trust store
//! that allows exactly the given publisher key, optionally re-checking
//! it against its source capsule, and prints the verdict.
//!
//! Usage: `verify_fixture <shard_dir> <trusted_key_hex> [capsule_dir]`

use flashfreeze_kernel::binary::RecordScanConfig;
use flashfreeze_kernel::capsule::Capsule;
use flashfreeze_judge::crossvalidate::WindowConfig;
use flashfreeze_shard::{verify_shard, CapsuleCheck, TrustStoreV1};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: verify_fixture <shard_dir> <trusted_key_hex> [capsule_dir]");
        std::process::exit(1);
    }
    let shard_dir = std::path::Path::new(&args[1]);
    let trust_store = TrustStoreV1::new([args[2].clone()]);

    let capsule;
    let capsule_check = if let Some(capsule_dir) = args.get(3) {
        capsule = Capsule::open(std::path::Path::new(capsule_dir)).expect("opening capsule");
        Some(CapsuleCheck {
            capsule: &capsule,
            record_scan: RecordScanConfig {
                latent_payload_len: 4,
                residual_max_len: 1024,
                resync_window: 4096,
            },
            window: WindowConfig {
                pre_window: 5,
                post_window: 5,
            },
        })
    } else {
        None
    };

    match verify_shard(shard_dir, &trust_store, capsule_check.as_ref()) {
        Ok(report) => {
            println!("verdict=accept");
            println!("merkle_root={}", report.merkle_root);
            println!("capsule_checked={}", report.capsule_checked);
        }
        Err(e) => {
            println!("verdict=reject");
            println!("reason={e}");
        }
    }
}
