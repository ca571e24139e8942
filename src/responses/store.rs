//! On-disk store of the latest response per API.
//!
//! Layout: `{dir}/{api_name}.json`, pretty-printed, overwritten on every save.

use std::path::PathBuf;

use thiserror::Error;

use super::record::ResponseRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize response for {api_name}: {source}")]
    Serialize {
        api_name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A record together with the file it was read from.
#[derive(Debug, Clone)]
pub struct StoredResponse {
    pub path: PathBuf,
    pub record: ResponseRecord,
}

#[derive(Debug, Clone)]
pub struct ResponseStore {
    dir: PathBuf,
}

impl ResponseStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File that holds the record for `api_name`.
    ///
    /// Path separators in the name are replaced so every record stays
    /// directly inside the store directory.
    pub fn path_for(&self, api_name: &str) -> PathBuf {
        let file_stem: String = api_name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.dir.join(format!("{}.json", file_stem))
    }

    /// Write `record`, creating the directory if needed.
    pub async fn save(&self, record: &ResponseRecord) -> Result<PathBuf, StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(&record.api_name);
        let contents =
            serde_json::to_string_pretty(record).map_err(|source| StoreError::Serialize {
                api_name: record.api_name.clone(),
                source,
            })?;

        tokio::fs::write(&path, contents)
            .await
            .map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;

        tracing::info!("Saved response to {}", path.display());
        Ok(path)
    }

    /// Read every `*.json` record, sorted by file name.
    ///
    /// A missing directory is empty. Unparseable files are skipped.
    pub async fn load_all(&self) -> Result<Vec<StoredResponse>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No responses directory at {}", self.dir.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })? {
            let path = entry.path();
            let is_json = path.extension().is_some_and(|ext| ext == "json");
            if is_json && path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();

        let mut stored = Vec::with_capacity(paths.len());
        for path in paths {
            let contents = match tokio::fs::read_to_string(&path).await {
                Ok(c) => c,
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}, skipping", path.display(), e);
                    continue;
                }
            };
            match serde_json::from_str::<ResponseRecord>(&contents) {
                Ok(record) => stored.push(StoredResponse { path, record }),
                Err(e) => tracing::warn!("Failed to parse {}: {}, skipping", path.display(), e),
            }
        }

        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn save_creates_directory_and_overwrites() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ResponseStore::new(tmp.path().join("responses"));

        let first = ResponseRecord::success("weather", 8000, 200, json!({"temp": 1}));
        let path = store.save(&first).await.unwrap();
        assert_eq!(path, tmp.path().join("responses").join("weather.json"));

        let second = ResponseRecord::failure("weather", 8000, "boom");
        store.save(&second).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains('\n'), "expected pretty-printed JSON");
        let on_disk: ResponseRecord = serde_json::from_str(&contents).unwrap();
        assert_eq!(on_disk.error(), Some("boom"));
    }

    #[tokio::test]
    async fn load_all_on_missing_directory_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ResponseStore::new(tmp.path().join("absent"));
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_all_sorts_and_skips_bad_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = ResponseStore::new(tmp.path());

        store
            .save(&ResponseRecord::success("zeta", 8001, 200, json!([])))
            .await
            .unwrap();
        store
            .save(&ResponseRecord::success("alpha", 8000, 200, json!({})))
            .await
            .unwrap();
        std::fs::write(tmp.path().join("broken.json"), "{").unwrap();
        std::fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();
        std::fs::create_dir(tmp.path().join("nested.json")).unwrap();

        let names: Vec<String> = store
            .load_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.record.api_name)
            .collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn path_for_keeps_records_inside_directory() {
        let store = ResponseStore::new("responses");
        assert_eq!(
            store.path_for("a/b"),
            PathBuf::from("responses").join("a_b.json")
        );
    }
}
