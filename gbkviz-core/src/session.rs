//! Per-session scratch directories and their time-to-live reclamation

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use crate::error::Result;

/// Default lifetime of an idle session directory
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDir {
    path: PathBuf,
}

impl SessionDir {
    /// Create (or reuse) `root/id`
    pub fn create<P: AsRef<Path>>(root: P, id: &str) -> Result<Self> {
        let path = root.as_ref().join(id);
        fs::create_dir_all(&path)?;
        log::debug!("Session directory {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn join<P: AsRef<Path>>(&self, name: P) -> PathBuf {
        self.path.join(name)
    }
}

/// Delete every directory under `root` whose last modification is older than
/// `ttl`. Returns the number of directories removed.
///
/// Failures to delete are logged and skipped: another request may still be
/// writing into a directory that is being swept.
pub fn sweep_stale<P: AsRef<Path>>(root: P, ttl: Duration) -> Result<usize> {
    sweep_stale_at(root, ttl, SystemTime::now())
}

pub fn sweep_stale_at<P: AsRef<Path>>(root: P, ttl: Duration, now: SystemTime) -> Result<usize> {
    let root = root.as_ref();
    if !root.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in fs::read_dir(root)? {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", root.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let modified = match entry.metadata().and_then(|m| if m.is_dir() { m.modified().map(Some) } else { Ok(None) }) {
            Ok(Some(modified)) => modified,
            Ok(None) => continue,
            Err(e) => {
                log::warn!("Cannot stat {}: {}", path.display(), e);
                continue;
            }
        };

        let age = now.duration_since(modified).unwrap_or_default();
        if age <= ttl {
            continue;
        }
        match fs::remove_dir_all(&path) {
            Ok(()) => {
                log::info!("Removed stale session {} (idle {}s)", path.display(), age.as_secs());
                removed += 1;
            }
            Err(e) => log::warn!("Failed to remove stale session {}: {}", path.display(), e),
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_join() {
        let root = tempfile::tempdir().unwrap();
        let session = SessionDir::create(root.path(), "abc").unwrap();
        assert!(session.path().is_dir());
        assert_eq!(session.join("out0.delta"), root.path().join("abc").join("out0.delta"));
        // Creating again reuses the directory
        assert!(SessionDir::create(root.path(), "abc").is_ok());
    }

    #[test]
    fn test_sweep_removes_only_stale_dirs() {
        let root = tempfile::tempdir().unwrap();
        SessionDir::create(root.path(), "s1").unwrap();
        SessionDir::create(root.path(), "s2").unwrap();
        fs::write(root.path().join("keep.txt"), "x").unwrap();

        let removed = sweep_stale_at(root.path(), DEFAULT_SESSION_TTL, SystemTime::now()).unwrap();
        assert_eq!(removed, 0);

        let later = SystemTime::now() + Duration::from_secs(3600);
        let removed = sweep_stale_at(root.path(), DEFAULT_SESSION_TTL, later).unwrap();
        assert_eq!(removed, 2);
        assert!(root.path().join("keep.txt").exists());
        assert!(!root.path().join("s1").exists());
    }

    #[test]
    fn test_sweep_missing_root() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(sweep_stale(root.path().join("absent"), DEFAULT_SESSION_TTL).unwrap(), 0);
    }
}
