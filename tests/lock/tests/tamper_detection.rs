//! Tampering with a capsule's binary stream before compilation, or with
//! a compiled shard's files afterward, must be caught — never silently
//! accepted.

use ed25519_dalek::SigningKey;
use flashfreeze_judge::crossvalidate::WindowConfig;
use flashfreeze_kernel::binary::{BinaryScanError, RecordScanConfig};
use flashfreeze_shard::{compile_capsule, verify_shard, CompileConfig, CompileError, FixedClock, LocalPolicyV1, TrustStoreV1, VerifyError};
use lock_tests::{latent_record, observation_line, write_capsule};

fn base_config<'a>(
    key: &'a SigningKey,
    trust_store: &'a TrustStoreV1,
    policy: &'a LocalPolicyV1,
    clock: &'a FixedClock,
) -> CompileConfig<'a> {
    CompileConfig {
        record_scan: RecordScanConfig {
            latent_payload_len: 4,
            residual_max_len: 1024,
            resync_window: 4096,
        },
        window: WindowConfig { pre_window: 5, post_window: 5 },
        signing_key: key,
        trust_store,
        local_policy: policy,
        clock,
    }
}

#[test]
fn one_byte_tamper_on_latents_is_a_crc_mismatch() {
    let tmp = tempfile::tempdir().unwrap();
    let capsule_dir = tmp.path().join("capsule");
    let shard_dir = tmp.path().join("shard");

    let events = observation_line(0);
    let mut record = latent_record(0, 0, &[0u8; 4]);
    // Flip a payload byte without touching the CRC: the scanner must
    // reject it outright rather than silently reading corrupt bytes.
    let payload_start = record.len() - 4;
    record[payload_start] ^= 0xFF;
    write_capsule(&capsule_dir, events.as_bytes(), &record, &[]);

    let key = SigningKey::generate(&mut rand::rngs::OsRng);
    let trust_store = TrustStoreV1::new([hex::encode(key.verifying_key().to_bytes())]);
    let policy = LocalPolicyV1::empty();
    let clock = FixedClock("2026-01-01T00:00:00Z".to_string());
    let config = base_config(&key, &trust_store, &policy, &clock);

    let err = compile_capsule(&capsule_dir, &shard_dir, &config).unwrap_err();
    assert!(matches!(
        err,
        CompileError::BinaryScan(BinaryScanError::CrcMismatch { frame_id: 0, .. })
    ));
}

#[test]
fn repacked_shard_fails_signature_verification() {
    let tmp = tempfile::tempdir().unwrap();
    let capsule_dir = tmp.path().join("capsule");
    let shard_dir = tmp.path().join("shard");

    let events = observation_line(0);
    let record = latent_record(0, 0, &[0u8; 4]);
    write_capsule(&capsule_dir, events.as_bytes(), &record, &[]);

    let key = SigningKey::generate(&mut rand::rngs::OsRng);
    let trust_store = TrustStoreV1::new([hex::encode(key.verifying_key().to_bytes())]);
    let policy = LocalPolicyV1::empty();
    let clock = FixedClock("2026-01-01T00:00:00Z".to_string());
    let config = base_config(&key, &trust_store, &policy, &clock);
    compile_capsule(&capsule_dir, &shard_dir, &config).unwrap();

    // A different publisher re-signs the exact same manifest bytes and
    // swaps in its own key material, without touching the evidence
    // tables — the verifier must reject it on the trust check before
    // it ever reaches signature verification.
    let impostor_key = SigningKey::generate(&mut rand::rngs::OsRng);
    let manifest_bytes = std::fs::read(shard_dir.join("manifest.json")).unwrap();
    let impostor_sig = flashfreeze_shard::sign::sign(&impostor_key, &manifest_bytes);
    std::fs::write(shard_dir.join("sig/manifest.sig"), impostor_sig).unwrap();
    std::fs::write(
        shard_dir.join("sig/publisher.pub"),
        impostor_key.verifying_key().to_bytes(),
    )
    .unwrap();

    // The manifest still names the original key, so `sig/publisher.pub`
    // now disagrees with it — caught before the trust check even runs.
    let err = verify_shard(&shard_dir, &trust_store, None).unwrap_err();
    assert!(matches!(err, VerifyError::ManifestInvalid { .. }));
}

#[test]
fn shard_signed_by_untrusted_publisher_fails_verification() {
    let tmp = tempfile::tempdir().unwrap();
    let capsule_dir = tmp.path().join("capsule");
    let shard_dir = tmp.path().join("shard");

    let events = observation_line(0);
    let record = latent_record(0, 0, &[0u8; 4]);
    write_capsule(&capsule_dir, events.as_bytes(), &record, &[]);

    // Compile and sign with a key that is never added to the verifier's
    // trust store: the shard itself is entirely well-formed (correct
    // signature, correct Merkle root) — only the publisher is untrusted.
    let key = SigningKey::generate(&mut rand::rngs::OsRng);
    let signing_trust_store = TrustStoreV1::new([hex::encode(key.verifying_key().to_bytes())]);
    let policy = LocalPolicyV1::empty();
    let clock = FixedClock("2026-01-01T00:00:00Z".to_string());
    let config = base_config(&key, &signing_trust_store, &policy, &clock);
    compile_capsule(&capsule_dir, &shard_dir, &config).unwrap();

    let verifier_trust_store = TrustStoreV1::new(["0000000000000000000000000000000000000000000000000000000000000000".to_string()]);
    let err = verify_shard(&shard_dir, &verifier_trust_store, None).unwrap_err();
    assert!(matches!(err, VerifyError::UntrustedPublisher { .. }));
}
