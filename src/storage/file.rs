//! Flat-file record store.
//!
//! Layout: `<root>/<service>/{current,rollback,history}`, one JSON document
//! per file. A save stages every record as a temp file inside the service
//! directory and only then renames them into place, `current` last.

use super::engine::{RecordKind, RecordStore, StoreResult};
use crate::core::{Deploy, Rollback, ServiceName, ServiceState, StoreError};
use serde::de::DeserializeOwned;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

#[cfg(unix)]
const DIR_MODE: u32 = 0o755;
#[cfg(unix)]
const RECORD_MODE: u32 = 0o644;

// ============================================================================
// Durability Configuration
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurabilityMode {
    /// fsync every staged record and the service directory.
    #[default]
    Sync,
    /// Rename only; flushing is left to the OS.
    Async,
}

impl FromStr for DurabilityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sync" => Ok(DurabilityMode::Sync),
            "async" => Ok(DurabilityMode::Async),
            other => Err(format!("unknown durability mode '{other}' (expected sync or async)")),
        }
    }
}

impl fmt::Display for DurabilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurabilityMode::Sync => f.write_str("sync"),
            DurabilityMode::Async => f.write_str("async"),
        }
    }
}

// ============================================================================
// File Record Store
// ============================================================================

#[derive(Debug, Clone)]
pub struct FileRecordStore {
    root: PathBuf,
    durability: DurabilityMode,
}

impl FileRecordStore {
    /// Opens a store rooted at `root`, creating the directory if needed.
    pub fn open<P: AsRef<Path>>(root: P, durability: DurabilityMode) -> StoreResult<Self> {
        let root = root.as_ref().to_path_buf();
        create_dir(&root)?;
        Ok(Self { root, durability })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn durability(&self) -> DurabilityMode {
        self.durability
    }

    pub fn service_dir(&self, service: &ServiceName) -> PathBuf {
        self.root.join(service.as_str())
    }

    pub fn record_path(&self, service: &ServiceName, kind: RecordKind) -> PathBuf {
        self.service_dir(service).join(kind.key())
    }

    fn read_record<T: DeserializeOwned>(&self, path: &Path) -> StoreResult<Option<T>> {
        match fs::read(path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| StoreError::corrupt(path.display(), e.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path.display(), e)),
        }
    }

    fn stage(&self, dir: &Path, kind: RecordKind, state: &ServiceState) -> StoreResult<NamedTempFile> {
        let bytes = match kind {
            RecordKind::Current => serde_json::to_vec(&state.current),
            RecordKind::Rollback => serde_json::to_vec(&state.rollback),
            RecordKind::History => serde_json::to_vec(&state.history),
        }
        .map_err(|e| StoreError::io(dir.join(kind.key()).display(), e.into()))?;

        let mut staged = tempfile::Builder::new()
            .prefix(".staged-")
            .tempfile_in(dir)
            .map_err(|e| StoreError::io(dir.display(), e))?;
        let staged_path = staged.path().display().to_string();

        staged
            .write_all(&bytes)
            .and_then(|_| staged.flush())
            .map_err(|e| StoreError::io(&staged_path, e))?;
        if self.durability == DurabilityMode::Sync {
            staged
                .as_file()
                .sync_all()
                .map_err(|e| StoreError::io(&staged_path, e))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(staged.path(), fs::Permissions::from_mode(RECORD_MODE))
                .map_err(|e| StoreError::io(&staged_path, e))?;
        }

        Ok(staged)
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self, service: &ServiceName) -> StoreResult<Option<ServiceState>> {
        let dir = self.service_dir(service);
        if !dir.is_dir() {
            return Ok(None);
        }

        // `current` is published last, so without it no save ever completed.
        let Some(current) = self.read_record::<Deploy>(&dir.join(RecordKind::Current.key()))?
        else {
            let leftovers: Vec<&str> = [RecordKind::Rollback, RecordKind::History]
                .into_iter()
                .filter(|kind| dir.join(kind.key()).is_file())
                .map(|kind| kind.key())
                .collect();
            if !leftovers.is_empty() {
                warn!(
                    service = %service,
                    dir = %dir.display(),
                    leftovers = %leftovers.join(", "),
                    "ignoring records of an unfinished first save"
                );
            }
            return Ok(None);
        };
        let rollback: Option<Rollback> = self.read_record(&dir.join(RecordKind::Rollback.key()))?;
        let history: Option<Vec<Deploy>> = self.read_record(&dir.join(RecordKind::History.key()))?;

        match (rollback, history) {
            (Some(rollback), Some(history)) => Ok(Some(ServiceState {
                current,
                rollback,
                history,
            })),
            (rollback, history) => {
                let missing: Vec<&str> = [
                    (rollback.is_none(), RecordKind::Rollback),
                    (history.is_none(), RecordKind::History),
                ]
                .into_iter()
                .filter(|(absent, _)| *absent)
                .map(|(_, kind)| kind.key())
                .collect();
                Err(StoreError::corrupt(
                    dir.display(),
                    format!("missing records: {}", missing.join(", ")),
                ))
            }
        }
    }

    fn exists(&self, service: &ServiceName) -> bool {
        self.record_path(service, RecordKind::Current).is_file()
    }

    fn save(&self, service: &ServiceName, state: &ServiceState) -> StoreResult<()> {
        let dir = self.service_dir(service);
        create_dir(&dir)?;

        // Stage everything before publishing anything; a failed stage drops
        // (and deletes) the temp files written so far.
        let mut staged = Vec::with_capacity(RecordKind::WRITE_ORDER.len());
        for kind in RecordKind::WRITE_ORDER {
            staged.push((kind, self.stage(&dir, kind, state)?));
        }

        for (kind, file) in staged {
            let target = dir.join(kind.key());
            file.persist(&target)
                .map_err(|e| StoreError::io(target.display(), e.error))?;
        }

        if self.durability == DurabilityMode::Sync {
            sync_dir(&dir)?;
        }

        debug!(
            service = %service,
            dir = %dir.display(),
            history_len = state.history.len(),
            "records saved"
        );
        Ok(())
    }
}

fn create_dir(path: &Path) -> StoreResult<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder
        .create(path)
        .map_err(|e| StoreError::io(path.display(), e))
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> StoreResult<()> {
    fs::File::open(dir)
        .and_then(|handle| handle.sync_all())
        .map_err(|e| StoreError::io(dir.display(), e))
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> StoreResult<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DeployDate, StoreErrorKind, apply_deploy_at, initialize_at};
    use tempfile::TempDir;

    fn name(raw: &str) -> ServiceName {
        ServiceName::parse(raw).unwrap()
    }

    fn sample_state() -> ServiceState {
        let first = initialize_at("1.0.0", DeployDate::from("01-02-2024:10:00:00"));
        let second = apply_deploy_at(&first, "1.1.0", false, DeployDate::from("01-03-2024:10:00:00"));
        apply_deploy_at(&second, "1.1.0", true, DeployDate::from("01-04-2024:10:00:00"))
    }

    #[test]
    fn test_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path(), DurabilityMode::Sync).unwrap();
        let service = name("billing");
        let state = sample_state();

        store.save(&service, &state).unwrap();
        let loaded = store.load(&service).unwrap().unwrap();
        assert_eq!(loaded, state);
        assert!(store.exists(&service));
    }

    #[test]
    fn test_layout_is_one_json_file_per_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path(), DurabilityMode::Async).unwrap();
        let service = name("billing");
        let state = sample_state();
        store.save(&service, &state).unwrap();

        let mut entries: Vec<String> = fs::read_dir(store.service_dir(&service))
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        entries.sort();
        assert_eq!(entries, vec!["current", "history", "rollback"]);

        let rollback: serde_json::Value = serde_json::from_slice(
            &fs::read(store.record_path(&service, RecordKind::Rollback)).unwrap(),
        )
        .unwrap();
        assert_eq!(rollback, serde_json::json!({ "version": "1.0.0" }));
    }

    #[test]
    fn test_absent_service() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path(), DurabilityMode::Sync).unwrap();
        let service = name("ghost");

        assert!(store.load(&service).unwrap().is_none());
        assert!(!store.exists(&service));

        // An empty directory left by an interrupted first write is still absent.
        fs::create_dir(store.service_dir(&service)).unwrap();
        assert!(store.load(&service).unwrap().is_none());
        assert!(!store.exists(&service));
    }

    #[test]
    fn test_partial_record_set_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path(), DurabilityMode::Sync).unwrap();
        let service = name("billing");
        store.save(&service, &sample_state()).unwrap();
        fs::remove_file(store.record_path(&service, RecordKind::History)).unwrap();

        let err = store.load(&service).unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::CorruptRecord);
        assert!(err.to_string().contains("history"));
    }

    #[test]
    fn test_unfinished_first_save_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path(), DurabilityMode::Sync).unwrap();
        let service = name("billing");
        store.save(&service, &sample_state()).unwrap();
        // A crash after `history` and `rollback` were renamed but before `current`.
        fs::remove_file(store.record_path(&service, RecordKind::Current)).unwrap();

        assert!(store.load(&service).unwrap().is_none());
        assert!(!store.exists(&service));

        fs::remove_file(store.record_path(&service, RecordKind::Rollback)).unwrap();
        assert!(store.load(&service).unwrap().is_none());

        let fresh = initialize_at("2.0.0", DeployDate::from("02-01-2024:10:00:00"));
        store.save(&service, &fresh).unwrap();
        assert_eq!(store.load(&service).unwrap().unwrap(), fresh);
    }

    #[test]
    fn test_malformed_json_is_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path(), DurabilityMode::Sync).unwrap();
        let service = name("billing");
        store.save(&service, &sample_state()).unwrap();
        fs::write(store.record_path(&service, RecordKind::Current), b"{\"version\": 3").unwrap();

        let err = store.load(&service).unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::CorruptRecord);
    }

    #[test]
    fn test_save_overwrites_previous_records() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path(), DurabilityMode::Sync).unwrap();
        let service = name("billing");
        let first = initialize_at("1.0.0", DeployDate::from("01-02-2024:10:00:00"));
        store.save(&service, &first).unwrap();

        let state = sample_state();
        store.save(&service, &state).unwrap();
        assert_eq!(store.load(&service).unwrap().unwrap(), state);
    }

    #[test]
    fn test_blocked_service_dir_is_io_failure() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileRecordStore::open(temp_dir.path(), DurabilityMode::Sync).unwrap();
        let service = name("blocked");
        fs::write(store.service_dir(&service), b"not a directory").unwrap();

        let err = store.save(&service, &sample_state()).unwrap_err();
        assert_eq!(err.kind(), StoreErrorKind::IoFailure);
    }

    #[test]
    fn test_durability_mode_parsing() {
        assert_eq!("sync".parse::<DurabilityMode>().unwrap(), DurabilityMode::Sync);
        assert_eq!("ASYNC".parse::<DurabilityMode>().unwrap(), DurabilityMode::Async);
        assert!("eventually".parse::<DurabilityMode>().is_err());
        assert_eq!(DurabilityMode::default().to_string(), "sync");
    }
}
