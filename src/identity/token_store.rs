use std::path::{Path, PathBuf};

use chrono::Utc;

/// File-backed persistence for the bearer token, one JSON document per
/// client home. Reads and writes are best-effort: a missing or unreadable
/// file degrades to an in-memory-only session rather than an error.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path { &self.path }

    /// Read the persisted token. Empty or whitespace-only tokens count as absent.
    pub fn load(&self) -> Option<String> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        let val: serde_json::Value = serde_json::from_str(&text).ok()?;
        let token = val.get("token")?.as_str()?.trim();
        if token.is_empty() { None } else { Some(token.to_string()) }
    }

    /// Best-effort write; ignore errors so a read-only home cannot block login.
    pub fn save(&self, token: &str) {
        if let Some(dir) = self.path.parent() {
            let _ = std::fs::create_dir_all(dir);
        }
        let val = serde_json::json!({
            "token": token,
            "saved_at": Utc::now().to_rfc3339(),
        });
        if let Ok(text) = serde_json::to_string_pretty(&val) {
            let _ = std::fs::write(&self.path, text);
        }
    }

    /// Remove the persisted token. Succeeds whether or not the file exists.
    pub fn clear(&self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
