//! # Project Files
//!
//! Reading and writing `.jnr` project files:
//! - **Atomic saves**: write `.jnr.tmp`, fsync, rename over the target
//! - **Locking**: a `.jnr.lock` sidecar naming the holder, backed by an OS lock
//! - **Version checks**: files from an incompatible schema are refused
//!
//! ## Example
//!
//! ```rust,no_run
//! use joinery_core::file_io::{load_project, save_project, FileLock};
//! use joinery_core::project::Project;
//! use std::path::Path;
//!
//! let path = Path::new("kitchen.jnr");
//! let project = Project::new("Kitchen Popescu", "Ana");
//!
//! let lock = FileLock::acquire(path, "ana@workshop.ro")?;
//! save_project(&project, path)?;
//! drop(lock);
//!
//! let reloaded = load_project(path)?;
//! assert_eq!(reloaded.meta.name, "Kitchen Popescu");
//! # Ok::<(), joinery_core::errors::JoineryError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::errors::{JoineryError, JoineryResult};
use crate::project::{Project, SCHEMA_VERSION};

/// Extension for project files
pub const PROJECT_EXTENSION: &str = "jnr";

/// Locks older than this are taken over regardless of the holder
const STALE_LOCK_HOURS: i64 = 24;

/// Contents of a `.jnr.lock` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who holds the lock (email or user name)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// Whether the lock can be taken over: the holder process is gone (same
    /// machine only) or the lock has outlived [`STALE_LOCK_HOURS`].
    pub fn is_stale(&self) -> bool {
        if (Utc::now() - self.locked_at).num_hours() > STALE_LOCK_HOURS {
            return true;
        }
        match hostname() {
            Some(machine) if machine == self.machine => !process_alive(self.pid),
            _ => false,
        }
    }

    fn holder(&self) -> String {
        format!("{} ({})", self.user_id, self.machine)
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").or_else(|_| std::env::var("HOST")).ok()
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(windows)]
fn process_alive(pid: u32) -> bool {
    use std::process::Command;
    match Command::new("tasklist")
        .args(["/FI", &format!("PID eq {}", pid), "/NH"])
        .output()
    {
        Ok(output) => String::from_utf8_lossy(&output.stdout).contains(&pid.to_string()),
        Err(_) => true,
    }
}

#[cfg(not(any(unix, windows)))]
fn process_alive(_pid: u32) -> bool {
    true
}

/// Exclusive hold on a project file, released on drop.
///
/// The OS lock (`fs2`) guards against other processes; the sidecar tells
/// people who is editing.
#[derive(Debug)]
pub struct FileLock {
    project_path: PathBuf,
    lock_path: PathBuf,
    _handle: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Take the lock on `path`.
    ///
    /// # Errors
    ///
    /// - `FileLocked` when a live lock exists or the OS lock is held elsewhere
    /// - `FileError` when the sidecar cannot be written
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> JoineryResult<Self> {
        let lock_path = sidecar_path(path, "lock");

        if let Some(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(JoineryError::file_locked(
                    path.display().to_string(),
                    existing.holder(),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            warn!(path = %path.display(), holder = %existing.holder(), "taking over stale lock");
        }

        let io_err = |operation: &str, e: std::io::Error| {
            JoineryError::file_error(operation, lock_path.display().to_string(), e.to_string())
        };

        // Clear the sidecar only once the OS lock is ours.
        let mut handle = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| io_err("create lock", e))?;

        handle.try_lock_exclusive().map_err(|_| {
            JoineryError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;
        handle.set_len(0).map_err(|e| io_err("clear lock", e))?;

        let info = LockInfo::new(user_id);
        handle
            .write_all(serde_json::to_string_pretty(&info)?.as_bytes())
            .map_err(|e| io_err("write lock", e))?;
        handle.sync_all().map_err(|e| io_err("sync lock", e))?;

        debug!(path = %path.display(), user = %info.user_id, "lock acquired");

        Ok(FileLock {
            project_path: path.to_path_buf(),
            lock_path,
            _handle: handle,
            info,
        })
    }

    /// The live lock on `path`, if any. Stale locks are reported as free.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&sidecar_path(path, "lock")).filter(|info| !info.is_stale())
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `kitchen.jnr` → `kitchen.jnr.<suffix>`
fn sidecar_path(path: &Path, suffix: &str) -> PathBuf {
    let extension = match path.extension() {
        Some(ext) => format!("{}.{}", ext.to_string_lossy(), suffix),
        None => suffix.to_string(),
    };
    path.with_extension(extension)
}

/// Unreadable or malformed sidecars count as no lock.
fn read_lock_info(lock_path: &Path) -> Option<LockInfo> {
    let contents = fs::read_to_string(lock_path).ok()?;
    serde_json::from_str(&contents).ok()
}

/// Write a project atomically.
///
/// # Errors
///
/// `FileError` naming the step that failed; the temporary file is removed
/// when the final rename fails.
pub fn save_project(project: &Project, path: &Path) -> JoineryResult<()> {
    let json = serde_json::to_string_pretty(project)?;
    let tmp_path = sidecar_path(path, "tmp");

    let tmp_err = |operation: &str, e: std::io::Error| {
        JoineryError::file_error(operation, tmp_path.display().to_string(), e.to_string())
    };

    let mut tmp = File::create(&tmp_path).map_err(|e| tmp_err("create temp file", e))?;
    tmp.write_all(json.as_bytes()).map_err(|e| tmp_err("write temp file", e))?;
    tmp.sync_all().map_err(|e| tmp_err("sync temp file", e))?;
    drop(tmp);

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(JoineryError::file_error(
            "rename to final",
            path.display().to_string(),
            e.to_string(),
        ));
    }

    info!(
        path = %path.display(),
        project = %project.meta.name,
        modules = project.module_count(),
        "project saved"
    );
    Ok(())
}

/// Read a project file and check its schema version.
///
/// # Errors
///
/// - `FileError` when the file cannot be read
/// - `SerializationError` for invalid JSON
/// - `VersionMismatch` for an incompatible schema
/// - `InvalidInput` for negative or non-finite pricing settings
pub fn load_project(path: &Path) -> JoineryResult<Project> {
    let contents = fs::read_to_string(path)
        .map_err(|e| JoineryError::file_error("read", path.display().to_string(), e.to_string()))?;

    let project: Project = serde_json::from_str(&contents)
        .map_err(|e| JoineryError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(&project.meta.version)?;
    project.settings.pricing.validate()?;

    info!(path = %path.display(), project = %project.meta.name, "project loaded");
    Ok(project)
}

/// Load a project and report who, if anyone, is editing it.
pub fn load_project_with_lock_check(path: &Path) -> JoineryResult<(Project, Option<LockInfo>)> {
    let project = load_project(path)?;
    Ok((project, FileLock::check(path)))
}

fn parse_version(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.split('.').map(|p| p.parse::<u32>().ok());
    let major = parts.next()??;
    let minor = parts.next().flatten().unwrap_or(0);
    Some((major, minor))
}

/// Majors must match; while the schema is 0.x a newer minor is refused too.
pub fn validate_version(file_version: &str) -> JoineryResult<()> {
    let mismatch = || JoineryError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let (file_major, file_minor) = parse_version(file_version).ok_or_else(mismatch)?;
    let (major, minor) = parse_version(SCHEMA_VERSION).ok_or_else(mismatch)?;

    if file_major != major || (major == 0 && file_minor > minor) {
        return Err(mismatch());
    }
    Ok(())
}
