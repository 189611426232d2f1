use std::path::{Path, PathBuf};
use tokio::fs;

use super::MenuSnapshot;

/// A JSON file holding the latest snapshot. Each save replaces the whole file.
#[derive(Debug)]
pub struct FileStore(PathBuf);

impl FileStore {
    pub fn open(p: impl AsRef<Path>) -> Self {
        Self(p.as_ref().to_owned())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub async fn load(&self) -> crate::Result<Option<MenuSnapshot>> {
        if fs::try_exists(&self.0).await? {
            let bytes = fs::read(&self.0).await?;
            serde_json::from_slice(&bytes).map(Some).map_err(From::from)
        } else {
            Ok(None)
        }
    }

    pub async fn save(&self, value: &MenuSnapshot) -> crate::Result<()> {
        if let Some(parent) = self.0.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(value)?;
        fs::write(&self.0, json).await.map_err(From::from)
    }
}
