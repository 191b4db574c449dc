use anyhow::{Context, Result};
use std::path::Path;
use time::OffsetDateTime;
use uuid::Uuid;

/// Builds a collision-resistant file name from a millisecond timestamp and a
/// random component, so concurrent writers never need a lock.
pub(crate) fn unique_file_name(ext: &str) -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    format!("{}-{}.{}", millis, Uuid::new_v4().simple(), ext)
}

/// Persists uploaded bytes under the public directory and returns the name.
pub(crate) fn save_public_file(dir: &Path, bytes: &[u8], ext: &str) -> Result<String> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create public dir: {}", dir.display()))?;
    let name = unique_file_name(ext);
    let path = dir.join(&name);
    std::fs::write(&path, bytes)
        .with_context(|| format!("failed to write public file: {}", path.display()))?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn unique_names_carry_the_extension_and_never_collide() {
        let mut seen = HashSet::new();
        for _ in 0..64 {
            let name = unique_file_name("png");
            assert!(name.ends_with(".png"));
            assert!(seen.insert(name), "duplicate file name generated");
        }
    }

    #[test]
    fn saves_bytes_under_the_public_dir() {
        let dir = tempfile::tempdir().unwrap();
        let name = save_public_file(dir.path(), b"image bytes", "jpg").unwrap();
        let written = std::fs::read(dir.path().join(&name)).unwrap();
        assert_eq!(written, b"image bytes");
    }
}
