//! Shard-tree Merkle fold (§4.7): enumerates every file under a shard
//! directory except `manifest.json` and everything under `sig/`, hashes
//! each leaf with `flashfreeze_kernel::hash::merkle_leaf`, and folds the
//! sorted leaves into one root.
//!
//! Per-file hashing is the one place this pipeline parallelizes (§5):
//! independent leaf hashes computed with `rayon`, reduced back into
//! lexicographic path order before folding.

use std::path::{Path, PathBuf};

use flashfreeze_kernel::hash::{merkle_leaf, merkle_root};
use rayon::prelude::*;

const EXCLUDED_TOP_LEVEL: &str = "sig";
const MANIFEST_FILENAME: &str = "manifest.json";

/// Error enumerating or hashing the shard tree.
#[derive(Debug)]
pub enum MerkleError {
    Io { detail: String },
}

impl std::fmt::Display for MerkleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { detail } => write!(f, "I/O error enumerating shard tree: {detail}"),
        }
    }
}

impl std::error::Error for MerkleError {}

/// One file in the Merkle-hashed shard tree.
#[derive(Debug, Clone)]
pub struct TreeFile {
    /// Path relative to the shard root, using `/` separators.
    pub rel_path: String,
    pub content_hash: blake3::Hash,
}

/// Enumerate the shard tree's hashable files, sorted lexicographically by
/// relative path (`walkdir` does not guarantee this order itself), and
/// fold their leaf hashes into the shard's Merkle root.
///
/// # Errors
///
/// Returns [`MerkleError::Io`] on any I/O failure walking or reading the
/// tree.
pub fn build_merkle_tree(shard_root: &Path) -> Result<(Vec<TreeFile>, Option<blake3::Hash>), MerkleError> {
    let mut rel_paths: Vec<PathBuf> = walkdir::WalkDir::new(shard_root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.path().strip_prefix(shard_root).ok().map(Path::to_path_buf))
        .filter(|rel| is_hashable(rel))
        .collect();
    rel_paths.sort();

    let files: Result<Vec<TreeFile>, MerkleError> = rel_paths
        .par_iter()
        .map(|rel| {
            let abs = shard_root.join(rel);
            let bytes = std::fs::read(&abs).map_err(|e| MerkleError::Io {
                detail: format!("reading {}: {e}", abs.display()),
            })?;
            let rel_path = to_forward_slash(rel);
            let content_hash = merkle_leaf(rel_path.as_bytes(), &bytes);
            Ok(TreeFile {
                rel_path,
                content_hash,
            })
        })
        .collect();
    let mut files = files?;
    files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

    let leaves: Vec<blake3::Hash> = files.iter().map(|f| f.content_hash).collect();
    let root = merkle_root(&leaves);
    Ok((files, root))
}

fn is_hashable(rel: &Path) -> bool {
    if rel == Path::new(MANIFEST_FILENAME) {
        return false;
    }
    !rel.components().any(|c| c.as_os_str() == EXCLUDED_TOP_LEVEL)
}

fn to_forward_slash(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn excludes_manifest_and_sig_directory() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("manifest.json"), b"{}").unwrap();
        fs::create_dir_all(tmp.path().join("sig")).unwrap();
        fs::write(tmp.path().join("sig/manifest.sig"), b"sig-bytes").unwrap();
        fs::create_dir_all(tmp.path().join("content")).unwrap();
        fs::write(tmp.path().join("content/a.bin"), b"hello").unwrap();

        let (files, root) = build_merkle_tree(tmp.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].rel_path, "content/a.bin");
        assert!(root.is_some());
    }

    #[test]
    fn empty_tree_has_no_root() {
        let tmp = tempfile::tempdir().unwrap();
        let (files, root) = build_merkle_tree(tmp.path()).unwrap();
        assert!(files.is_empty());
        assert!(root.is_none());
    }

    #[test]
    fn files_are_sorted_lexicographically() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("graph")).unwrap();
        fs::write(tmp.path().join("graph/z.parquet"), b"z").unwrap();
        fs::write(tmp.path().join("graph/a.parquet"), b"a").unwrap();

        let (files, _) = build_merkle_tree(tmp.path()).unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.rel_path.clone()).collect();
        assert_eq!(paths, vec!["graph/a.parquet", "graph/z.parquet"]);
    }

    #[test]
    fn root_is_sensitive_to_content_changes() {
        let tmp1 = tempfile::tempdir().unwrap();
        fs::write(tmp1.path().join("a.bin"), b"hello").unwrap();
        let (_, root1) = build_merkle_tree(tmp1.path()).unwrap();

        let tmp2 = tempfile::tempdir().unwrap();
        fs::write(tmp2.path().join("a.bin"), b"hellp").unwrap();
        let (_, root2) = build_merkle_tree(tmp2.path()).unwrap();

        assert_ne!(root1, root2);
    }
}
