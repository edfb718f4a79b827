use std::fs;
use std::path::{Path, PathBuf};

use super::TradeRepository;
use crate::error::Result;
use crate::models::TradeRecord;

/// Stores the collection as one JSON array, the same document the browser
/// build kept under its `trades` storage key.
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TradeRepository for JsonFileRepository {
    fn backend_name(&self) -> &str {
        "json-file"
    }

    fn load(&self) -> Result<Vec<TradeRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }

        let trades: Vec<TradeRecord> = serde_json::from_str(&data)?;
        Ok(trades)
    }

    fn save(&self, trades: &[TradeRecord]) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        // Write-then-rename so a crash never leaves half a document behind
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_vec(trades)?)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
