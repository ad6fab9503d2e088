//! Per-request work directories and their deferred deletion

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A directory owned by a single request.
///
/// The response may still be streaming from it, so removal is scheduled
/// explicitly with [`WorkDir::cleanup_after`]. A `WorkDir` dropped without
/// being handed off (the request was abandoned mid-download) schedules its
/// own removal after the drop delay.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
    drop_delay: Duration,
    handed_off: bool,
}

impl WorkDir {
    /// Create `<base>/<random hex id>`, creating `base` if needed.
    pub async fn create(base: &Path) -> std::io::Result<Self> {
        let path = base.join(Uuid::new_v4().simple().to_string());
        tokio::fs::create_dir_all(&path).await?;
        debug!("Created work directory: {}", path.display());
        Ok(Self {
            path,
            drop_delay: Duration::ZERO,
            handed_off: false,
        })
    }

    /// Delay used when the directory is dropped without `cleanup_after`.
    pub fn with_drop_delay(mut self, delay: Duration) -> Self {
        self.drop_delay = delay;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Largest regular file in this directory, if any.
    pub async fn largest_file(&self) -> std::io::Result<Option<PathBuf>> {
        largest_file(&self.path).await
    }

    /// Hand the directory over to a background deletion timer.
    pub fn cleanup_after(mut self, delay: Duration) -> JoinHandle<()> {
        self.handed_off = true;
        schedule_cleanup(self.path.clone(), delay)
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if self.handed_off {
            return;
        }

        debug!("Work directory {} abandoned", self.path.display());
        if tokio::runtime::Handle::try_current().is_ok() {
            schedule_cleanup(self.path.clone(), self.drop_delay);
        } else if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Return the regular file with the most bytes in `dir` (not recursive).
pub async fn largest_file(dir: &Path) -> std::io::Result<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut best: Option<(u64, PathBuf)> = None;

    while let Some(entry) = entries.next_entry().await? {
        // entries can vanish between listing and stat
        let metadata = match entry.metadata().await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        if !metadata.is_file() {
            continue;
        }

        let size = metadata.len();
        if best.as_ref().map_or(true, |(best_size, _)| size > *best_size) {
            best = Some((size, entry.path()));
        }
    }

    Ok(best.map(|(_, path)| path))
}

/// Delete `path` (file or directory tree) after `delay` on a background task.
pub fn schedule_cleanup(path: PathBuf, delay: Duration) -> JoinHandle<()> {
    debug!("Scheduling removal of {} in {:?}", path.display(), delay);
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if let Err(e) = remove_path(&path).await {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    })
}

async fn remove_path(path: &Path) -> std::io::Result<()> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    let result = if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };

    match result {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Remove work directories in `base` not modified within `max_age`.
///
/// Deletion timers die with the process, so a restart can leave work
/// directories behind. Only directories named like the ones
/// [`WorkDir::create`] makes are touched. Returns how many were removed.
pub async fn sweep_stale(base: &Path, max_age: Duration) -> std::io::Result<usize> {
    let mut entries = match tokio::fs::read_dir(base).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let now = SystemTime::now();
    let mut removed = 0;

    while let Some(entry) = entries.next_entry().await? {
        if !is_workdir_name(&entry.file_name().to_string_lossy()) {
            continue;
        }
        let metadata = match entry.metadata().await {
            Ok(m) if m.is_dir() => m,
            _ => continue,
        };
        let modified = match metadata.modified() {
            Ok(modified) => modified,
            Err(_) => continue,
        };
        let age = now.duration_since(modified).unwrap_or_default();
        if age < max_age {
            continue;
        }

        match remove_path(&entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to remove stale {}: {}", entry.path().display(), e),
        }
    }

    if removed > 0 {
        info!("Swept {} stale entries from {}", removed, base.display());
    }
    Ok(removed)
}

/// 32 lowercase hex digits, as produced by `Uuid::simple`.
fn is_workdir_name(name: &str) -> bool {
    name.len() == 32
        && name.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        && Uuid::try_parse(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_is_unique() {
        let base = tempfile::tempdir().unwrap();
        let a = WorkDir::create(base.path()).await.unwrap();
        let b = WorkDir::create(base.path()).await.unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().is_dir());
        assert_eq!(a.path().parent(), Some(base.path()));
    }

    #[tokio::test]
    async fn test_create_makes_missing_base() {
        let root = tempfile::tempdir().unwrap();
        let base = root.path().join("nested/downloads_temp");
        let dir = WorkDir::create(&base).await.unwrap();
        assert!(dir.path().starts_with(&base));
    }

    #[tokio::test]
    async fn test_largest_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("small.jpg"), vec![0u8; 10]).unwrap();
        std::fs::write(dir.path().join("Some Title.mp4"), vec![0u8; 1000]).unwrap();
        std::fs::write(dir.path().join("Some Title.info.json"), vec![0u8; 100]).unwrap();
        std::fs::create_dir(dir.path().join("subdir")).unwrap();

        let largest = largest_file(dir.path()).await.unwrap().unwrap();
        assert_eq!(largest.file_name().unwrap(), "Some Title.mp4");
    }

    #[tokio::test]
    async fn test_largest_file_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("only-a-dir")).unwrap();
        assert_eq!(largest_file(dir.path()).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_cleanup_removes_tree_after_delay() {
        let base = tempfile::tempdir().unwrap();
        let dir = WorkDir::create(base.path()).await.unwrap();
        std::fs::write(dir.path().join("a.mp3"), b"data").unwrap();
        let path = dir.path().to_path_buf();

        let handle = dir.cleanup_after(Duration::from_millis(50));
        assert!(path.exists());
        handle.await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_cleanup_of_missing_path_is_quiet() {
        let base = tempfile::tempdir().unwrap();
        let handle = schedule_cleanup(base.path().join("gone"), Duration::ZERO);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_sweep_stale() {
        let base = tempfile::tempdir().unwrap();
        let ours = base.path().join(Uuid::new_v4().simple().to_string());
        std::fs::create_dir(&ours).unwrap();
        std::fs::write(ours.join("partial.mp4.part"), b"x").unwrap();
        std::fs::write(base.path().join("stray.part"), b"x").unwrap();
        std::fs::create_dir(base.path().join("not-a-workdir")).unwrap();
        // right shape, but a file
        std::fs::write(base.path().join(Uuid::new_v4().simple().to_string()), b"x").unwrap();

        // nothing is old enough yet
        assert_eq!(sweep_stale(base.path(), Duration::from_secs(3600)).await.unwrap(), 0);
        // everything is older than zero, but only our directory goes
        assert_eq!(sweep_stale(base.path(), Duration::ZERO).await.unwrap(), 1);
        assert!(!ours.exists());
        assert!(base.path().join("stray.part").exists());
        assert!(base.path().join("not-a-workdir").exists());
        assert_eq!(std::fs::read_dir(base.path()).unwrap().count(), 3);
    }

    #[test]
    fn test_workdir_name() {
        assert!(is_workdir_name(&Uuid::new_v4().simple().to_string()));
        assert!(!is_workdir_name(&Uuid::new_v4().hyphenated().to_string()));
        assert!(!is_workdir_name("downloads"));
        assert!(!is_workdir_name("ZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZZ"));
    }

    #[tokio::test]
    async fn test_drop_without_handoff_schedules_removal() {
        let base = tempfile::tempdir().unwrap();
        let dir = WorkDir::create(base.path())
            .await
            .unwrap()
            .with_drop_delay(Duration::from_millis(20));
        std::fs::write(dir.path().join("partial.mp4.part"), b"x").unwrap();
        let path = dir.path().to_path_buf();

        drop(dir);
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_handoff_is_not_removed_on_drop() {
        let base = tempfile::tempdir().unwrap();
        let dir = WorkDir::create(base.path()).await.unwrap();
        let path = dir.path().to_path_buf();

        // handed off with a long delay; the drop that follows must not win
        let handle = dir.cleanup_after(Duration::from_secs(3600));
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(path.exists());
        handle.abort();
    }

    #[test]
    fn test_drop_outside_runtime_removes_now() {
        let base = tempfile::tempdir().unwrap();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let dir = runtime.block_on(WorkDir::create(base.path())).unwrap();
        let path = dir.path().to_path_buf();
        drop(runtime);

        drop(dir);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_sweep_missing_base() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(sweep_stale(&root.path().join("nope"), Duration::ZERO).await.unwrap(), 0);
    }
}
