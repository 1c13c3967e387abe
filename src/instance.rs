//! PID-file single-instance lock under the OS temp directory.

use std::fs;
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "fairy-picker.lock";

pub struct InstanceLock {
    path: PathBuf,
}

impl InstanceLock {
    /// Take the lock for this process. Returns `None` when another live
    /// instance already holds it; stale locks (dead PID, unreadable content)
    /// are cleaned up and taken over. Failure to write the lock file never
    /// blocks startup.
    pub fn acquire() -> Option<Self> {
        Self::acquire_at(std::env::temp_dir().join(LOCK_FILE))
    }

    fn acquire_at(path: PathBuf) -> Option<Self> {
        if let Ok(content) = fs::read_to_string(&path) {
            match content.trim().parse::<u32>() {
                Ok(pid) if pid != std::process::id() && pid_alive(pid) => {
                    return None;
                }
                _ => {
                    let _ = fs::remove_file(&path);
                }
            }
        }
        if let Err(err) = fs::write(&path, std::process::id().to_string()) {
            tracing::warn!("instance: could not write lock file: {err}");
        }
        Some(Self { path })
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn pid_alive(pid: u32) -> bool {
    Path::new("/proc").join(pid.to_string()).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILE);
        (dir, path)
    }

    #[test]
    fn acquire_writes_own_pid() {
        let (_dir, path) = scratch();
        let lock = InstanceLock::acquire_at(path.clone()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, std::process::id().to_string());
        drop(lock);
        assert!(!path.exists());
    }

    #[test]
    fn live_lock_blocks_second_acquire() {
        let (_dir, path) = scratch();
        // PID 1 is always alive on Linux.
        fs::write(&path, "1").unwrap();
        assert!(InstanceLock::acquire_at(path).is_none());
    }

    #[test]
    fn stale_lock_is_taken_over() {
        let (_dir, path) = scratch();
        // u32::MAX is far above any real pid_max.
        fs::write(&path, u32::MAX.to_string()).unwrap();
        let lock = InstanceLock::acquire_at(path.clone());
        assert!(lock.is_some());
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, std::process::id().to_string());
    }

    #[test]
    fn garbage_lock_is_taken_over() {
        let (_dir, path) = scratch();
        fs::write(&path, "not-a-pid").unwrap();
        assert!(InstanceLock::acquire_at(path).is_some());
    }
}
