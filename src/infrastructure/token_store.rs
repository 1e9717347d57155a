// File-backed persistence for the admin token
use crate::application::session::TokenStore;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSession {
    admin_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> anyhow::Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let stored: StoredSession = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", self.path.display()))?;
        Ok(stored.admin_token.filter(|t| !t.is_empty()))
    }

    fn save(&self, token: Option<&str>) -> anyhow::Result<()> {
        let Some(token) = token else {
            if self.path.exists() {
                std::fs::remove_file(&self.path)
                    .with_context(|| format!("Failed to remove {}", self.path.display()))?;
            }
            return Ok(());
        };

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let stored = StoredSession {
            admin_token: Some(token.to_string()),
        };
        std::fs::write(&self.path, toml::to_string(&stored)?)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(name: &str) -> FileTokenStore {
        let dir = std::env::temp_dir().join(format!("cell-analyzer-token-{}", std::process::id()));
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        FileTokenStore::new(path)
    }

    #[test]
    fn test_missing_file_means_no_token() {
        assert_eq!(store("missing.toml").load().unwrap(), None);
    }

    #[test]
    fn test_save_load_and_clear() {
        let store = store("session.toml");

        store.save(Some("abc123")).unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("abc123"));
        let raw = std::fs::read_to_string(&store.path).unwrap();
        assert!(raw.contains("admin_token = \"abc123\""));

        store.save(None).unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert!(!store.path.exists());
    }
}
