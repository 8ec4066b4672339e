use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// JsonConnection owns the data directory where JSON entries are kept
#[derive(Clone, Debug)]
pub struct JsonConnection {
    base_directory: PathBuf,
}

impl JsonConnection {
    /// Create a new connection, creating the directory if it doesn't exist
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .with_context(|| format!("Failed to create data directory {}", base_path.display()))?;
            info!("Created data directory {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Path of the JSON file backing a named entry
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.base_directory.join(format!("{}.json", name))
    }

    /// Read a named entry, `None` when the file does not exist
    pub fn read_entry(&self, name: &str) -> Result<Option<String>> {
        let path = self.entry_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    /// Write a named entry through a temporary file and a rename
    pub fn write_entry(&self, name: &str, content: &str) -> Result<()> {
        let path = self.entry_path(name);
        let temp_path = self.base_directory.join(format!("{}.json.tmp", name));

        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }
}
