// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! `KEY=VALUE` file store.
//!
//! Reads skip blank lines and `#` comments. Every write re-reads the file
//! under an exclusive OS lock, applies the change and rewrites the whole
//! file with keys in sorted order. Comments and the original ordering are
//! not preserved across a write.
//!
//! Loaded keys are mirrored into the process environment so that raw
//! environment lookups see the same values.

use std::collections::BTreeMap;
use std::env;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use crate::credentials::CredentialStore;
use crate::engine_core::constants::credentials;
use crate::engine_core::errors::WardenError;
use crate::engine_core::types::CredentialValue;

pub struct FileCredentialStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, CredentialValue>>,
    // Serializes writers inside this process; the OS lock covers other processes.
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    /// Load `path`. A missing or unreadable file is logged and the store
    /// starts empty; the file is created on the first write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match load(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Credentials file not loaded");
                BTreeMap::new()
            }
        };
        for (key, value) in &entries {
            env::set_var(key, value.expose());
        }
        debug!(path = %path.display(), count = entries.len(), "Credentials file loaded");
        Self {
            path,
            entries: RwLock::new(entries),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Locked read-modify-write of the whole file.
    fn rewrite<F>(&self, mutate: F) -> Result<(), WardenError>
    where
        F: FnOnce(&mut BTreeMap<String, CredentialValue>),
    {
        let _guard = self.write_lock.lock();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;
        FileExt::lock_exclusive(&file)?;

        let result = read_modify_write(&mut file, mutate);
        if let Err(e) = FileExt::unlock(&file) {
            warn!(path = %self.path.display(), error = %e, "Failed to release credentials file lock");
        }

        let merged = result?;
        *self.entries.write() = merged;
        Ok(())
    }
}

fn read_modify_write<F>(
    file: &mut File,
    mutate: F,
) -> Result<BTreeMap<String, CredentialValue>, WardenError>
where
    F: FnOnce(&mut BTreeMap<String, CredentialValue>),
{
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    let mut entries = parse_entries(&contents);
    mutate(&mut entries);

    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(render_entries(&entries).as_bytes())?;
    file.sync_all()?;
    Ok(entries)
}

fn load(path: &Path) -> Result<BTreeMap<String, CredentialValue>, WardenError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        WardenError::ConfigurationError(format!(
            "credentials file {} unreadable: {}",
            path.display(),
            e
        ))
    })?;
    Ok(parse_entries(&contents))
}

/// Parse `KEY=VALUE` lines. The split is on the first `=`; key and value are
/// trimmed. Lines without `=` or with an empty key are skipped.
pub fn parse_entries(contents: &str) -> BTreeMap<String, CredentialValue> {
    let mut entries = BTreeMap::new();
    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(credentials::COMMENT_PREFIX) {
            continue;
        }
        match line.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                entries.insert(key.trim().to_string(), CredentialValue::new(value.trim()));
            }
            _ => warn!(line = idx + 1, "Skipping malformed credentials line"),
        }
    }
    entries
}

/// Whether `key=value` survives a write followed by [`parse_entries`] unchanged.
fn is_representable(key: &str, value: &str) -> bool {
    !key.is_empty()
        && key.trim() == key
        && !key.starts_with(credentials::COMMENT_PREFIX)
        && !key.contains(['=', '\n', '\r'])
        && value.trim() == value
        && !value.contains(['\n', '\r'])
}

pub fn render_entries(entries: &BTreeMap<String, CredentialValue>) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(key);
        out.push('=');
        out.push_str(value.expose());
        out.push('\n');
    }
    out
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: &str) -> Option<CredentialValue> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), WardenError> {
        if !is_representable(key, value) {
            return Err(WardenError::ValidationError(
                "Credential key or value not representable in a KEY=VALUE file".to_string(),
            ));
        }
        self.rewrite(|entries| {
            entries.insert(key.to_string(), CredentialValue::from(value));
        })?;
        env::set_var(key, value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), WardenError> {
        self.rewrite(|entries| {
            entries.remove(key);
        })?;
        env::remove_var(key);
        Ok(())
    }

    fn list(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    #[test]
    fn test_parse_entries() {
        let entries = parse_entries(
            "# comment\n\n  FS_PARSE_A = one \nFS_PARSE_B=x=y\nnot a pair\n=orphan\n",
        );
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["FS_PARSE_A"].expose(), "one");
        assert_eq!(entries["FS_PARSE_B"].expose(), "x=y");
    }

    #[test]
    fn test_open_loads_and_mirrors_env() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "FS_OPEN_MIRROR=from-file\n").unwrap();

        let store = FileCredentialStore::open(&path);
        assert_eq!(store.get("FS_OPEN_MIRROR").unwrap().expose(), "from-file");
        assert_eq!(env::var("FS_OPEN_MIRROR").unwrap(), "from-file");
    }

    #[test]
    fn test_write_rewrites_whole_file_sorted_without_comments() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "# header\nFS_RW_Z=26\n\nFS_RW_A=1\n").unwrap();

        let store = FileCredentialStore::open(&path);
        store.set("FS_RW_M", "13").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "FS_RW_A=1\nFS_RW_M=13\nFS_RW_Z=26\n"
        );
        assert_eq!(env::var("FS_RW_M").unwrap(), "13");

        store.delete("FS_RW_Z").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "FS_RW_A=1\nFS_RW_M=13\n");
        assert!(store.get("FS_RW_Z").is_none());
        assert!(env::var("FS_RW_Z").is_err());
    }

    #[test]
    fn test_write_picks_up_external_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        let store = FileCredentialStore::open(&path);
        assert!(store.list().is_empty());

        fs::write(&path, "FS_EXT_OTHER=written-elsewhere\n").unwrap();
        store.set("FS_EXT_MINE", "v").unwrap();

        assert_eq!(store.list(), vec!["FS_EXT_MINE", "FS_EXT_OTHER"]);
    }

    #[test]
    fn test_rejects_unrepresentable_entries() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::open(dir.path().join(".env"));
        assert!(store.set("A=B", "v").is_err());
        assert!(store.set("FS_BAD_VALUE", "line\nbreak").is_err());
        assert!(store.set("", "v").is_err());
        assert!(store.set("#FS_BAD_HASH", "v").is_err());
        assert!(store.set(" FS_BAD_PAD", "v").is_err());
        assert!(store.set("FS_BAD_TRAIL", "  padded  ").is_err());
        assert!(store.list().is_empty());
        assert!(env::var("#FS_BAD_HASH").is_err());
    }

    #[test]
    fn test_written_entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        let store = FileCredentialStore::open(&path);
        store.set("FS_REOPEN_A", "x=y inner space").unwrap();
        store.set("FS_REOPEN_B", "plain").unwrap();

        let reopened = FileCredentialStore::open(&path);
        assert_eq!(reopened.list(), store.list());
        for key in store.list() {
            assert_eq!(reopened.get(&key), store.get(&key));
        }
    }

    #[test]
    fn test_concurrent_writers_lose_no_updates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        let store = Arc::new(FileCredentialStore::open(&path));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    store
                        .set(&format!("FS_CONC_{}", i), &format!("value{}", i))
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let on_disk = parse_entries(&fs::read_to_string(&path).unwrap());
        assert_eq!(on_disk.len(), 8);
        assert_eq!(store.list().len(), 8);
    }

    #[test]
    fn test_two_handles_on_one_file_lose_no_updates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        let a = FileCredentialStore::open(&path);
        let b = FileCredentialStore::open(&path);

        a.set("FS_TWO_A", "1").unwrap();
        b.set("FS_TWO_B", "2").unwrap();

        let on_disk = parse_entries(&fs::read_to_string(&path).unwrap());
        assert_eq!(on_disk.len(), 2);
    }
}
