use std::path::{Path, PathBuf};

/// Centralized helpers for client-side files rooted at the simscan home dir.
/// This keeps locations consistent across modules (session, CLI, tests).
#[inline]
pub fn token_file(home: &Path) -> PathBuf { home.join("token.json") }

#[inline]
pub fn downloads_dir(home: &Path) -> PathBuf { home.join("downloads") }

/// Resolve the client home directory: `$SIMSCAN_HOME`, else `~/.simscan`,
/// else `.simscan` relative to the working directory.
pub fn default_home() -> PathBuf {
    if let Ok(dir) = std::env::var("SIMSCAN_HOME") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    let profile_var = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    match std::env::var(profile_var) {
        Ok(root) if !root.is_empty() => Path::new(&root).join(".simscan"),
        _ => PathBuf::from(".simscan"),
    }
}
