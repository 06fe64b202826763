use crate::domain::errors::MechanismError;
use crate::ports::outbound::{BatchOperation, KeyValueStore, ScanResult};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// File-backed key-value store.
///
/// Keeps the map in memory and rewrites the whole file on every mutation,
/// via a temp file and rename so a crash never leaves a half-written file.
///
/// File format: `[key_len:u32][key][value_len:u32][value]...`, little-endian.
#[derive(Debug)]
pub struct FileBackedKVStore {
    data: HashMap<Vec<u8>, Vec<u8>>,
    path: PathBuf,
}

impl FileBackedKVStore {
    /// Open (or create on first write) a store at the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();

        let data = match Self::load_from_file(&path) {
            Some(data) => {
                tracing::info!(
                    "[persistence] 💾 Loaded {} keys from {}",
                    data.len(),
                    path.display()
                );
                data
            }
            None => {
                tracing::info!("[persistence] 📁 No existing storage file at {}", path.display());
                HashMap::new()
            }
        };

        Self { data, path }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_file(path: &Path) -> Option<HashMap<Vec<u8>, Vec<u8>>> {
        let mut file = std::fs::File::open(path).ok()?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).ok()?;

        let mut data = HashMap::new();
        let mut cursor = 0;

        while cursor + 4 <= bytes.len() {
            let key_len = u32::from_le_bytes(bytes[cursor..cursor + 4].try_into().ok()?) as usize;
            cursor += 4;

            if cursor + key_len + 4 > bytes.len() {
                tracing::warn!(
                    "[persistence] ⚠️ Truncated record in {} at offset {}",
                    path.display(),
                    cursor
                );
                break;
            }
            let key = bytes[cursor..cursor + key_len].to_vec();
            cursor += key_len;

            let value_len = u32::from_le_bytes(bytes[cursor..cursor + 4].try_into().ok()?) as usize;
            cursor += 4;

            if cursor + value_len > bytes.len() {
                tracing::warn!(
                    "[persistence] ⚠️ Truncated record in {} at offset {}",
                    path.display(),
                    cursor
                );
                break;
            }
            let value = bytes[cursor..cursor + value_len].to_vec();
            cursor += value_len;

            data.insert(key, value);
        }

        Some(data)
    }

    fn save_to_file(&self) -> Result<(), MechanismError> {
        let io = |e: std::io::Error| MechanismError::Io {
            message: e.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io)?;
        }

        let mut bytes = Vec::new();
        for (key, value) in &self.data {
            bytes.extend_from_slice(&(key.len() as u32).to_le_bytes());
            bytes.extend_from_slice(key);
            bytes.extend_from_slice(&(value.len() as u32).to_le_bytes());
            bytes.extend_from_slice(value);
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(io)?;
        file.write_all(&bytes).map_err(io)?;
        file.sync_all().map_err(io)?;
        std::fs::rename(&temp_path, &self.path).map_err(io)?;

        Ok(())
    }

    /// Apply a mutation and persist it, rolling back the map if the file
    /// cannot be written.
    fn commit(
        &mut self,
        mutate: impl FnOnce(&mut HashMap<Vec<u8>, Vec<u8>>),
    ) -> Result<(), MechanismError> {
        let snapshot = self.data.clone();
        mutate(&mut self.data);
        if let Err(e) = self.save_to_file() {
            self.data = snapshot;
            return Err(e);
        }
        Ok(())
    }
}

impl KeyValueStore for FileBackedKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, MechanismError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), MechanismError> {
        self.commit(|data| {
            data.insert(key.to_vec(), value.to_vec());
        })
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), MechanismError> {
        if !self.data.contains_key(key) {
            return Ok(());
        }
        self.commit(|data| {
            data.remove(key);
        })
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), MechanismError> {
        self.commit(|data| {
            for op in operations {
                match op {
                    BatchOperation::Put { key, value } => {
                        data.insert(key, value);
                    }
                    BatchOperation::Delete { key } => {
                        data.remove(&key);
                    }
                }
            }
        })
    }

    fn exists(&self, key: &[u8]) -> Result<bool, MechanismError> {
        Ok(self.data.contains_key(key))
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, MechanismError> {
        let results: Vec<_> = self
            .data
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(results)
    }
}
