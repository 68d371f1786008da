//! Cross-process lock that serializes typing sessions.
//!
//! The lock is a plain file holding a token unique to its holder: the unix
//! timestamp of acquisition, the process id and a per-process sequence
//! number. Its modification time decides staleness, so a crashed session
//! blocks others for at most `INSTANCE_LOCK_STALE_SECS`. A live holder keeps
//! the mtime fresh with `InstanceLockGuard::keep_alive`.

use crate::constants::{
    INSTANCE_LOCK_FILE_NAME, INSTANCE_LOCK_REFRESH_SECS, INSTANCE_LOCK_STALE_SECS,
};
use anyhow::{bail, Context, Result};
use log::{debug, warn};
use std::cell::Cell;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

static LOCK_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Result of trying to take the lock
#[derive(Debug)]
pub enum LockAttempt {
    Acquired(InstanceLockGuard),
    /// Another session holds a fresh lock
    Busy { age: Duration },
}

#[derive(Debug, Clone)]
pub struct InstanceLock {
    path: PathBuf,
    stale_after: Duration,
}

impl InstanceLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            stale_after: Duration::from_secs(INSTANCE_LOCK_STALE_SECS),
        }
    }

    /// Lock file under the user's runtime directory (temp dir as fallback)
    pub fn default_path() -> PathBuf {
        dirs::runtime_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("handson")
            .join(INSTANCE_LOCK_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Take the lock, overwriting a stale one
    pub fn try_acquire(&self) -> Result<LockAttempt> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create lock directory: {}", parent.display())
            })?;
        }

        // A second pass covers a holder releasing between our two checks
        for _ in 0..2 {
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&self.path)
            {
                Ok(mut file) => {
                    let token = lock_token();
                    file.write_all(token.as_bytes())
                        .with_context(|| format!("Failed to write lock file: {}", self.path.display()))?;
                    return Ok(self.acquired(token));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to create lock file: {}", self.path.display())
                    })
                }
            }

            let age = match self.age() {
                Ok(age) => age,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Failed to read lock file metadata: {}", self.path.display())
                    })
                }
            };

            if age <= self.stale_after {
                warn!(
                    "Another typing session is running (lock age {:.0}s). Aborting this request.",
                    age.as_secs_f64()
                );
                return Ok(LockAttempt::Busy { age });
            }

            warn!(
                "Stale lock file found ({:.0}s old). Overwriting.",
                age.as_secs_f64()
            );
            let token = lock_token();
            fs::write(&self.path, &token)
                .with_context(|| format!("Failed to overwrite lock file: {}", self.path.display()))?;
            return Ok(self.acquired(token));
        }

        // The file kept vanishing and reappearing; report it as held
        Ok(LockAttempt::Busy {
            age: Duration::ZERO,
        })
    }

    fn age(&self) -> std::io::Result<Duration> {
        let modified = fs::metadata(&self.path)?.modified()?;
        Ok(SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO))
    }

    fn acquired(&self, token: String) -> LockAttempt {
        debug!("Instance lock acquired: {}", self.path.display());
        LockAttempt::Acquired(InstanceLockGuard {
            path: self.path.clone(),
            token,
            last_refresh: Cell::new(Instant::now()),
        })
    }
}

fn lock_token() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!(
        "{:.3} {} {}",
        now.as_secs_f64(),
        std::process::id(),
        LOCK_SEQUENCE.fetch_add(1, Ordering::Relaxed)
    )
}

/// Held lock. Removes the lock file when dropped, unless another session
/// has since taken it over.
#[derive(Debug)]
pub struct InstanceLockGuard {
    path: PathBuf,
    token: String,
    last_refresh: Cell<Instant>,
}

impl InstanceLockGuard {
    /// Whether the lock file still carries this guard's token
    pub fn is_held(&self) -> bool {
        fs::read_to_string(&self.path)
            .map(|contents| contents == self.token)
            .unwrap_or(false)
    }

    /// Bump the lock file's modification time so the lock never looks stale
    pub fn refresh(&self) -> Result<()> {
        if !self.is_held() {
            bail!(
                "Lock file {} is no longer held by this session",
                self.path.display()
            );
        }
        File::options()
            .write(true)
            .open(&self.path)
            .and_then(|file| file.set_modified(SystemTime::now()))
            .with_context(|| format!("Failed to refresh lock file: {}", self.path.display()))?;
        self.last_refresh.set(Instant::now());
        Ok(())
    }

    /// Refresh at most once every `INSTANCE_LOCK_REFRESH_SECS`
    pub fn keep_alive(&self) {
        if self.last_refresh.get().elapsed() < Duration::from_secs(INSTANCE_LOCK_REFRESH_SECS) {
            return;
        }
        if let Err(e) = self.refresh() {
            warn!("{:#}", e);
            // Retry on the next interval rather than every word
            self.last_refresh.set(Instant::now());
        }
    }
}

impl Drop for InstanceLockGuard {
    fn drop(&mut self) {
        if !self.is_held() {
            warn!(
                "Lock file {} was taken over by another session; leaving it in place",
                self.path.display()
            );
            return;
        }
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Instance lock released: {}", self.path.display()),
            Err(e) => warn!("Failed to remove lock file {}: {}", self.path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn backdate(path: &Path, secs: u64) {
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn test_acquire_and_release() {
        let dir = tempfile::tempdir().unwrap();
        let lock = InstanceLock::new(dir.path().join("typing.lock"));

        let guard = match lock.try_acquire().unwrap() {
            LockAttempt::Acquired(guard) => guard,
            other => panic!("expected lock, got {:?}", other),
        };
        let contents = fs::read_to_string(lock.path()).unwrap();
        let stamp = contents.split_whitespace().next().unwrap();
        assert!(stamp.parse::<f64>().unwrap() > 0.0);
        assert!(guard.is_held());

        drop(guard);
        assert!(!lock.path().exists());
    }

    #[test]
    fn test_fresh_lock_is_busy() {
        let dir = tempfile::tempdir().unwrap();
        let lock = InstanceLock::new(dir.path().join("typing.lock"));
        let _held = lock.try_acquire().unwrap();

        assert!(matches!(
            lock.try_acquire().unwrap(),
            LockAttempt::Busy { .. }
        ));
        // The busy attempt must not have removed the holder's file
        assert!(lock.path().exists());
    }

    #[test]
    fn test_lock_at_threshold_is_still_busy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typing.lock");
        fs::write(&path, "0").unwrap();
        backdate(&path, INSTANCE_LOCK_STALE_SECS - 5);

        match InstanceLock::new(&path).try_acquire().unwrap() {
            LockAttempt::Busy { age } => assert!(age.as_secs() >= INSTANCE_LOCK_STALE_SECS - 5),
            other => panic!("expected busy, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_lock_is_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typing.lock");
        fs::write(&path, "0").unwrap();
        backdate(&path, INSTANCE_LOCK_STALE_SECS + 60);

        let attempt = InstanceLock::new(&path).try_acquire().unwrap();
        assert!(matches!(attempt, LockAttempt::Acquired(_)));
        assert_ne!(fs::read_to_string(&path).unwrap(), "0");
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let lock = InstanceLock::new(dir.path().join("nested").join("typing.lock"));
        assert!(matches!(
            lock.try_acquire().unwrap(),
            LockAttempt::Acquired(_)
        ));
    }

    fn acquire(lock: &InstanceLock) -> InstanceLockGuard {
        match lock.try_acquire().unwrap() {
            LockAttempt::Acquired(guard) => guard,
            other => panic!("expected lock, got {:?}", other),
        }
    }

    #[test]
    fn test_superseded_guard_leaves_new_holder_alone() {
        let dir = tempfile::tempdir().unwrap();
        let lock = InstanceLock::new(dir.path().join("typing.lock"));

        let first = acquire(&lock);
        backdate(lock.path(), INSTANCE_LOCK_STALE_SECS + 60);
        let second = acquire(&lock);
        assert!(!first.is_held());
        assert!(second.is_held());

        drop(first);
        assert!(lock.path().exists());
        assert!(second.is_held());
        assert!(matches!(
            lock.try_acquire().unwrap(),
            LockAttempt::Busy { .. }
        ));

        drop(second);
        assert!(!lock.path().exists());
    }

    #[test]
    fn test_refresh_keeps_long_session_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let lock = InstanceLock::new(dir.path().join("typing.lock"));
        let guard = acquire(&lock);

        backdate(lock.path(), INSTANCE_LOCK_STALE_SECS + 60);
        guard.refresh().unwrap();

        match lock.try_acquire().unwrap() {
            LockAttempt::Busy { age } => assert!(age < Duration::from_secs(5)),
            other => panic!("expected busy, got {:?}", other),
        }
        assert!(guard.is_held());
    }

    #[test]
    fn test_refresh_fails_after_takeover() {
        let dir = tempfile::tempdir().unwrap();
        let lock = InstanceLock::new(dir.path().join("typing.lock"));
        let first = acquire(&lock);

        backdate(lock.path(), INSTANCE_LOCK_STALE_SECS + 60);
        let _second = acquire(&lock);

        assert!(first.refresh().is_err());
    }
}
