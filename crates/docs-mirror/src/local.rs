use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Errors from the local mirror directory. These are always fatal to a run.
#[derive(Debug, thiserror::Error)]
pub enum LocalError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LocalError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A flat directory of `*.md` files. The filename is the only identity.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open the mirror directory, creating it if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LocalError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| LocalError::io(&root, e))?;
        Ok(Self { root })
    }

    pub fn path_for(&self, filename: &str) -> PathBuf {
        self.root.join(filename)
    }

    /// Filenames of the markdown files currently on disk.
    pub fn list(&self) -> Result<BTreeSet<String>, LocalError> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| LocalError::io(&self.root, e))?;

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(|e| LocalError::io(&self.root, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| LocalError::io(&entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            // Non-UTF-8 names can't have come from a manifest URL.
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name.ends_with(".md") {
                names.insert(name);
            }
        }
        Ok(names)
    }

    /// Current bytes of a document, or `None` if it isn't on disk.
    pub async fn read(&self, filename: &str) -> Result<Option<Vec<u8>>, LocalError> {
        let path = self.path_for(filename);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LocalError::io(&path, e)),
        }
    }

    pub async fn write(&self, filename: &str, content: &str) -> Result<(), LocalError> {
        let path = self.path_for(filename);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| LocalError::io(&path, e))
    }

    pub async fn remove(&self, filename: &str) -> Result<(), LocalError> {
        let path = self.path_for(filename);
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| LocalError::io(&path, e))
    }
}
