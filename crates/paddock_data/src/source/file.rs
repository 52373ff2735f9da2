//! File-backed data source.
//!
//! ```text
//! <root>/
//! ├── meta.json              {"next_uids": {"horse": 12, ...}}
//! ├── horse/
//! │   ├── 1.json
//! │   └── 2.json
//! └── user/
//!     └── rider.json
//! ```
//!
//! Every write goes to a temporary file first and is renamed into place,
//! so a crash never leaves a half-written entity behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{DataSource, EntitySource};
use crate::error::{DataError, DataResult};
use crate::model::{Entity, Uid};

const META_FILE: &str = "meta.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct Meta {
    #[serde(default)]
    next_uids: BTreeMap<String, Uid>,
}

/// Stores each entity as a JSON file under a root directory.
#[derive(Debug)]
pub struct FileDataSource {
    root: PathBuf,
    meta: Mutex<Meta>,
}

impl FileDataSource {
    /// Opens (or creates) a data directory.
    ///
    /// # Errors
    ///
    /// Fails if the directory cannot be created or `meta.json` is corrupt.
    pub fn open(root: impl Into<PathBuf>) -> DataResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;

        let meta_path = root.join(META_FILE);
        let meta = match fs::read_to_string(&meta_path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(err) if err.kind() == ErrorKind::NotFound => Meta::default(),
            Err(err) => return Err(err.into()),
        };
        info!(root = %root.display(), "opened file data source");

        Ok(Self {
            root,
            meta: Mutex::new(meta),
        })
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entity_path<V: Entity>(&self, key: &V::Key) -> PathBuf {
        self.root
            .join(V::KIND)
            .join(format!("{}.json", file_stem(&key.to_string())))
    }

    fn save_meta(&self, meta: &Meta) -> DataResult<()> {
        let json = serde_json::to_vec_pretty(meta)?;
        write_atomic(&self.root.join(META_FILE), &json)
    }
}

impl<V: Entity> EntitySource<V> for FileDataSource {
    fn retrieve(&self, key: &V::Key) -> DataResult<V> {
        let path = self.entity_path::<V>(key);
        match fs::read_to_string(&path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(DataError::NotFound {
                kind: V::KIND,
                key: key.to_string(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&self, key: &V::Key, value: &V) -> DataResult<()> {
        fs::create_dir_all(self.root.join(V::KIND))?;
        let json = serde_json::to_vec_pretty(value)?;
        write_atomic(&self.entity_path::<V>(key), &json)
    }

    fn delete(&self, key: &V::Key) -> DataResult<()> {
        match fs::remove_file(self.entity_path::<V>(key)) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err.into()),
            _ => Ok(()),
        }
    }
}

impl DataSource for FileDataSource {
    fn next_uid(&self, kind: &'static str) -> DataResult<Uid> {
        let mut meta = self.meta.lock();
        let next = meta.next_uids.entry(kind.to_owned()).or_insert(1);
        let uid = *next;
        if uid == Uid::MAX {
            return Err(DataError::UidExhausted(kind));
        }
        *next = uid + 1;

        if let Err(err) = self.save_meta(&meta) {
            // Hand the uid back so it is not skipped.
            if let Some(next) = meta.next_uids.get_mut(kind) {
                *next = uid;
            }
            return Err(err);
        }
        Ok(uid)
    }

    fn terminate(&self) -> DataResult<()> {
        self.save_meta(&self.meta.lock())?;
        debug!(root = %self.root.display(), "file data source terminated");
        Ok(())
    }
}

/// Escapes a key into a portable file name.
fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    stem
}

fn write_atomic(path: &Path, bytes: &[u8]) -> DataResult<()> {
    let temporary = path.with_extension("json.tmp");
    fs::write(&temporary, bytes)?;
    fs::rename(&temporary, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Horse, User};

    #[test]
    fn test_file_stem_escaping() {
        assert_eq!(file_stem("rider_01"), "rider_01");
        assert_eq!(file_stem("../etc"), "%2E%2E%2Fetc");
        assert_eq!(file_stem("a b"), "a%20b");
    }

    #[test]
    fn test_persists_across_reopen() {
        let directory = tempfile::tempdir().unwrap();
        {
            let source = FileDataSource::open(directory.path()).unwrap();
            let uid = source.next_uid(Horse::KIND).unwrap();
            assert_eq!(uid, 1);
            let horse = Horse { uid, name: "Ace".to_owned(), ..Horse::default() };
            source.store(&uid, &horse).unwrap();
            source.terminate().unwrap();
        }

        let source = FileDataSource::open(directory.path()).unwrap();
        let horse: Horse = source.retrieve(&1).unwrap();
        assert_eq!(horse.name, "Ace");
        assert_eq!(source.next_uid(Horse::KIND).unwrap(), 2);
        assert!(directory.path().join("horse").join("1.json").exists());
        assert!(!directory.path().join("horse").join("1.json.tmp").exists());
    }

    #[test]
    fn test_missing_and_delete() {
        let directory = tempfile::tempdir().unwrap();
        let source = FileDataSource::open(directory.path()).unwrap();
        let name = "nobody".to_owned();

        assert!(matches!(
            EntitySource::<User>::retrieve(&source, &name),
            Err(DataError::NotFound { kind: "user", .. })
        ));
        // Deleting something absent is fine.
        EntitySource::<User>::delete(&source, &name).unwrap();

        let user = User { name: name.clone(), ..User::default() };
        source.store(&name, &user).unwrap();
        EntitySource::<User>::delete(&source, &name).unwrap();
        assert!(EntitySource::<User>::retrieve(&source, &name).is_err());
    }

    #[test]
    fn test_corrupt_entity_is_serialization_error() {
        let directory = tempfile::tempdir().unwrap();
        let source = FileDataSource::open(directory.path()).unwrap();
        fs::create_dir_all(directory.path().join("horse")).unwrap();
        fs::write(directory.path().join("horse").join("5.json"), b"{ nope").unwrap();

        assert!(matches!(
            EntitySource::<Horse>::retrieve(&source, &5),
            Err(DataError::Serialization(_))
        ));
    }
}
