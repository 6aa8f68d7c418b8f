//! Builds a minimal safe-run capsule directory (100 observation frames,
//! zero safety events, matching latent coverage, no residual stream) at
//! the given output path and prints its `source_hash`.
//!
//! Usage: `capsule_fixture <output_dir>`

use lock_tests::{latent_record, observation_line, write_capsule};

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let Some(output_dir) = args.get(1) else {
        eprintln!("usage: capsule_fixture <output_dir>");
        std::process::exit(1);
    };
    let output_dir = std::path::Path::new(output_dir);

    let mut events = String::new();
    let mut latents = Vec::new();
    for frame_id in 0..100u64 {
        events.push_str(&observation_line(frame_id));
        latents.extend(latent_record(frame_id, frame_id * 1000, &[0u8; 4]));
    }

    write_capsule(output_dir, events.as_bytes(), &latents, &[]);

    let source_hash = flashfreeze_kernel::hash::sha256_content_hash(events.as_bytes());
    println!("source_hash={}", source_hash.as_str());
    println!("frame_count=100");
    println!("capsule written to: {}", output_dir.display());
}
