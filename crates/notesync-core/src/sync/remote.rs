//! Remote task service contract and a JSON-file implementation

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::util::{compact_text, now_millis};

/// Remote copy of one note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTask {
    /// Remote identifier; empty until the service assigns one
    #[serde(default)]
    pub gid: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub deleted: bool,
    /// Last remote modification (Unix ms)
    #[serde(default)]
    pub modified: i64,
}

#[derive(Debug, Error)]
pub enum RemoteError {
    /// The service could not be reached
    #[error("Remote unreachable: {0}")]
    Network(String),
    /// The service answered with something unusable
    #[error("Remote protocol error: {0}")]
    Protocol(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Blocking client for the remote task service
pub trait RemoteTaskService: Send + Sync {
    fn login(&self, account: &str) -> RemoteResult<()>;

    fn fetch_tasks(&self) -> RemoteResult<Vec<RemoteTask>>;

    /// Create the task when `gid` is empty, otherwise replace it.
    /// Returns the stored task with its assigned `gid` and `modified`.
    fn upsert_task(&self, task: &RemoteTask) -> RemoteResult<RemoteTask>;

    /// Leave a tombstone for `gid`
    fn delete_task(&self, gid: &str) -> RemoteResult<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskFile {
    #[serde(default)]
    account: Option<String>,
    #[serde(default)]
    tasks: Vec<RemoteTask>,
}

/// Remote service backed by a JSON file, typically on a shared or mounted
/// directory. A missing parent directory counts as the remote being
/// unreachable.
#[derive(Debug)]
pub struct FileTaskService {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTaskService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_reachable(&self) -> RemoteResult<()> {
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty());
        match parent {
            Some(parent) if !parent.is_dir() => Err(RemoteError::Network(format!(
                "{} is not available",
                parent.display()
            ))),
            _ => Ok(()),
        }
    }

    fn read(&self) -> RemoteResult<TaskFile> {
        self.check_reachable()?;
        match fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw).map_err(|error| {
                RemoteError::Protocol(format!(
                    "invalid task file {}: {}",
                    self.path.display(),
                    compact_text(&error.to_string())
                ))
            }),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(TaskFile::default()),
            Err(error) => Err(RemoteError::Network(error.to_string())),
        }
    }

    /// Sibling file the next version is staged in before it replaces the task file
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write(&self, file: &TaskFile) -> RemoteResult<()> {
        let raw = serde_json::to_string_pretty(file)
            .map_err(|error| RemoteError::Protocol(error.to_string()))?;
        let staging = self.staging_path();
        fs::write(&staging, raw)
            .and_then(|()| fs::rename(&staging, &self.path))
            .map_err(|error| {
                let _ = fs::remove_file(&staging);
                RemoteError::Network(error.to_string())
            })
    }

    fn with_file<T>(&self, update: impl FnOnce(&mut TaskFile) -> RemoteResult<T>) -> RemoteResult<T> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| RemoteError::Protocol("task file lock poisoned".to_string()))?;
        let mut file = self.read()?;
        let result = update(&mut file)?;
        self.write(&file)?;
        Ok(result)
    }
}

impl RemoteTaskService for FileTaskService {
    fn login(&self, account: &str) -> RemoteResult<()> {
        self.with_file(|file| match file.account.as_deref() {
            Some(owner) if owner != account => Err(RemoteError::Protocol(format!(
                "task file belongs to {owner}"
            ))),
            Some(_) => Ok(()),
            None => {
                file.account = Some(account.to_string());
                Ok(())
            }
        })
    }

    fn fetch_tasks(&self) -> RemoteResult<Vec<RemoteTask>> {
        Ok(self.read()?.tasks)
    }

    fn upsert_task(&self, task: &RemoteTask) -> RemoteResult<RemoteTask> {
        self.with_file(|file| {
            let mut stored = task.clone();
            stored.modified = now_millis();
            if stored.gid.is_empty() {
                stored.gid = Uuid::now_v7().to_string();
                file.tasks.push(stored.clone());
                return Ok(stored);
            }
            match file.tasks.iter_mut().find(|existing| existing.gid == stored.gid) {
                Some(existing) => {
                    // versions only move forward, even within one millisecond
                    stored.modified = stored.modified.max(existing.modified + 1);
                    *existing = stored.clone();
                }
                None => file.tasks.push(stored.clone()),
            }
            Ok(stored)
        })
    }

    fn delete_task(&self, gid: &str) -> RemoteResult<()> {
        self.with_file(|file| {
            let task = file
                .tasks
                .iter_mut()
                .find(|task| task.gid == gid)
                .ok_or_else(|| RemoteError::Protocol(format!("unknown task {gid}")))?;
            task.deleted = true;
            task.modified = now_millis().max(task.modified + 1);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileTaskService) {
        let dir = TempDir::new().unwrap();
        let service = FileTaskService::new(dir.path().join("tasks.json"));
        (dir, service)
    }

    #[test]
    fn test_missing_file_is_empty() {
        let (_dir, service) = setup();
        assert!(service.fetch_tasks().unwrap().is_empty());
    }

    #[test]
    fn test_upsert_assigns_gid_and_replaces() {
        let (_dir, service) = setup();
        let created = service
            .upsert_task(&RemoteTask {
                gid: String::new(),
                content: "first".to_string(),
                deleted: false,
                modified: 0,
            })
            .unwrap();
        assert!(!created.gid.is_empty());
        assert!(created.modified > 0);

        let mut changed = created.clone();
        changed.content = "second".to_string();
        let replaced = service.upsert_task(&changed).unwrap();
        assert!(replaced.modified > created.modified);

        let tasks = service.fetch_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].content, "second");
    }

    #[test]
    fn test_delete_leaves_tombstone() {
        let (_dir, service) = setup();
        let created = service
            .upsert_task(&RemoteTask {
                gid: String::new(),
                content: "gone".to_string(),
                deleted: false,
                modified: 0,
            })
            .unwrap();

        service.delete_task(&created.gid).unwrap();
        assert!(service.fetch_tasks().unwrap()[0].deleted);
        assert!(matches!(
            service.delete_task("missing"),
            Err(RemoteError::Protocol(_))
        ));
    }

    #[test]
    fn test_login_binds_account() {
        let (_dir, service) = setup();
        service.login("a@example.com").unwrap();
        service.login("a@example.com").unwrap();
        assert!(matches!(
            service.login("b@example.com"),
            Err(RemoteError::Protocol(_))
        ));
    }

    #[test]
    fn test_missing_directory_is_network_error() {
        let dir = TempDir::new().unwrap();
        let service = FileTaskService::new(dir.path().join("offline").join("tasks.json"));
        assert!(matches!(service.fetch_tasks(), Err(RemoteError::Network(_))));
        assert!(matches!(service.login("a"), Err(RemoteError::Network(_))));
    }

    #[test]
    fn test_write_replaces_file_without_leftovers() {
        let (dir, service) = setup();
        service.login("a@example.com").unwrap();
        // an interrupted earlier write leaves the task file untouched
        fs::write(service.staging_path(), "{ partial").unwrap();

        service
            .upsert_task(&RemoteTask {
                gid: String::new(),
                content: "kept".to_string(),
                deleted: false,
                modified: 0,
            })
            .unwrap();

        assert_eq!(service.fetch_tasks().unwrap()[0].content, "kept");
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("tasks.json")]);
    }

    #[test]
    fn test_corrupt_file_is_protocol_error() {
        let (_dir, service) = setup();
        fs::write(service.path(), "not json").unwrap();
        assert!(matches!(service.fetch_tasks(), Err(RemoteError::Protocol(_))));
    }
}
