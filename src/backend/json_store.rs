use std::{collections::BTreeMap, fs, io, path::{Path, PathBuf}};

use log::{debug, warn};

use crate::backend::interface::{KeyValueStore, Result};

type Entries = BTreeMap<String, String>;

/// Key-value store persisted as a single JSON object in a profile file.
///
/// The file is re-read on every access and rewritten in full on every
/// mutation, so two processes sharing a profile get last-write-wins.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> JsonStore {
        JsonStore { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Unparseable file contents read as an empty store.
    fn load(&self) -> Result<Entries> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Entries::new()),
            Err(err) => return Err(err.into())
        };
        if content.trim().is_empty() {
            return Ok(Entries::new());
        }
        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(err) => {
                warn!("ignoring corrupt profile {}: {}", self.path.display(), err);
                Ok(Entries::new())
            }
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn persist(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        // the profile is replaced whole, never left half written
        let content = serde_json::to_string_pretty(entries)?;
        let staging = self.staging_path();
        fs::write(&staging, content)?;
        fs::rename(&staging, &self.path)?;
        debug!("wrote {} entries to {}", entries.len(), self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.load()?;
        Ok(entries.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_owned(), value.to_owned());
        self.persist(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use crate::backend::{JsonStore, KeyValueStore};

    use rstest::{fixture, rstest};
    use serde_json::json;
    use tempfile::TempDir;

    #[fixture]
    fn profile_dir() -> TempDir {
        tempfile::tempdir().unwrap()
    }

    #[rstest]
    fn missing_file_is_empty(profile_dir: TempDir) {
        let store = JsonStore::new(profile_dir.path().join("profile.json"));
        assert_eq!(store.get("bank_users").unwrap(), None);
    }

    #[rstest]
    fn values_survive_reopen(profile_dir: TempDir) {
        let path = profile_dir.path().join("nested").join("profile.json");
        let mut store = JsonStore::new(&path);
        store.set("bank_session", "\"Bilbo\"").unwrap();
        store.set("bank_users", "{}").unwrap();

        let reopened = JsonStore::new(&path);
        assert_eq!(reopened.get("bank_session").unwrap().as_deref(), Some("\"Bilbo\""));
        assert_eq!(reopened.get("bank_users").unwrap().as_deref(), Some("{}"));
    }

    #[rstest]
    fn file_layout(profile_dir: TempDir) {
        let path = profile_dir.path().join("profile.json");
        let mut store = JsonStore::new(&path);
        store.set("bank_session", "null").unwrap();

        let on_disk: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk, json!({"bank_session": "null"}));
    }

    #[rstest]
    fn remove_key(profile_dir: TempDir) {
        let mut store = JsonStore::new(profile_dir.path().join("profile.json"));
        store.set("bank_session", "\"Gimli\"").unwrap();
        store.remove("bank_session").unwrap();
        assert_eq!(store.get("bank_session").unwrap(), None);
    }

    #[rstest]
    #[case("not json at all")]
    #[case("{\"bank_session\": \"\\\"Bil")]
    #[case("[1, 2, 3]")]
    fn unparseable_file_reads_empty(profile_dir: TempDir, #[case] content: &str) {
        let path = profile_dir.path().join("profile.json");
        std::fs::write(&path, content).unwrap();

        let mut store = JsonStore::new(&path);
        assert_eq!(store.get("bank_session").unwrap(), None);

        store.set("bank_session", "\"Bilbo\"").unwrap();
        assert_eq!(store.get("bank_session").unwrap().as_deref(), Some("\"Bilbo\""));
    }

    #[rstest]
    fn no_staging_file_left_behind(profile_dir: TempDir) {
        let path = profile_dir.path().join("profile.json");
        let mut store = JsonStore::new(&path);
        store.set("bank_users", "{}").unwrap();

        let names: Vec<_> = std::fs::read_dir(profile_dir.path()).unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("profile.json")]);
    }
}
