//! Credential store for persisting the session between invocations
//!
//! Provides a `CredentialStore` that keeps the bearer token and the logged-in
//! user in a JSON file, so a `login` survives until `logout` or a rejected token.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use super::User;

/// File name of the stored session inside the store directory
const SESSION_FILE: &str = "session.json";

/// Session data stored on disk
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    /// Bearer token returned by the login endpoint
    pub token: Option<String>,
    /// Profile of the logged-in user
    pub user: Option<User>,
    /// When the session was last written
    pub saved_at: Option<DateTime<Utc>>,
}

/// Manages reading and writing the stored session
///
/// The session lives in an XDG-compliant data directory
/// (`~/.local/share/fieldops/` on Linux). A missing or unreadable file is
/// treated as "not logged in".
#[derive(Debug, Clone)]
pub struct CredentialStore {
    /// Directory where the session file is stored
    dir: PathBuf,
}

impl CredentialStore {
    /// Creates a CredentialStore using the XDG data directory
    ///
    /// Returns `None` if the directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "fieldops")?;
        let dir = project_dirs.data_local_dir().to_path_buf();
        Some(Self { dir })
    }

    /// Creates a CredentialStore in a custom directory
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE)
    }

    /// Reads the stored session, if any
    pub fn load(&self) -> Option<StoredSession> {
        let content = fs::read_to_string(self.session_path()).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Returns the stored bearer token
    pub fn token(&self) -> Option<String> {
        self.load()?.token
    }

    /// Returns the stored user profile
    pub fn user(&self) -> Option<User> {
        self.load()?.user
    }

    /// Stores a bearer token, keeping any stored user
    pub fn save_token(&self, token: &str) -> std::io::Result<()> {
        let mut session = self.load().unwrap_or_default();
        session.token = Some(token.to_string());
        self.write(session)
    }

    /// Stores the user profile, keeping any stored token
    pub fn save_user(&self, user: &User) -> std::io::Result<()> {
        let mut session = self.load().unwrap_or_default();
        session.user = Some(user.clone());
        self.write(session)
    }

    /// Deletes the stored session
    ///
    /// Succeeds when nothing was stored.
    pub fn clear(&self) -> std::io::Result<()> {
        match fs::remove_file(self.session_path()) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn write(&self, mut session: StoredSession) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        session.saved_at = Some(Utc::now());

        let json = serde_json::to_string_pretty(&session)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.session_path(), json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (CredentialStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let store = CredentialStore::with_dir(temp_dir.path().to_path_buf());
        (store, temp_dir)
    }

    fn sample_user() -> User {
        User {
            id: 7,
            email: "tech@example.com".to_string(),
            nom: Some("Martin".to_string()),
            prenom: Some("Alex".to_string()),
            role: "bo".to_string(),
            bo_affectee: Some("Nord".to_string()),
        }
    }

    #[test]
    fn test_load_returns_none_without_session() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.load().is_none());
        assert!(store.token().is_none());
    }

    #[test]
    fn test_save_token_creates_session_file() {
        let (store, temp_dir) = create_test_store();

        store.save_token("abc123").expect("Write should succeed");

        let path = temp_dir.path().join(SESSION_FILE);
        assert!(path.exists(), "Session file should exist");
        assert_eq!(store.token(), Some("abc123".to_string()));
    }

    #[test]
    fn test_token_and_user_are_kept_together() {
        let (store, _temp_dir) = create_test_store();

        store.save_token("abc123").expect("Write should succeed");
        store.save_user(&sample_user()).expect("Write should succeed");

        let session = store.load().expect("Should read session");
        assert_eq!(session.token.as_deref(), Some("abc123"));
        assert_eq!(session.user, Some(sample_user()));
        assert!(session.saved_at.is_some());
    }

    #[test]
    fn test_clear_removes_session() {
        let (store, _temp_dir) = create_test_store();
        store.save_token("abc123").expect("Write should succeed");

        store.clear().expect("Clear should succeed");

        assert!(store.token().is_none());
        assert!(store.user().is_none());
    }

    #[test]
    fn test_clear_without_session_is_ok() {
        let (store, _temp_dir) = create_test_store();
        assert!(store.clear().is_ok());
    }

    #[test]
    fn test_corrupt_file_reads_as_logged_out() {
        let (store, temp_dir) = create_test_store();
        fs::write(temp_dir.path().join(SESSION_FILE), "not json").unwrap();

        assert!(store.load().is_none());
    }

    #[test]
    fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested = temp_dir.path().join("nested").join("fieldops");
        let store = CredentialStore::with_dir(nested.clone());

        store.save_token("tok").expect("Write should succeed");

        assert!(nested.join(SESSION_FILE).exists());
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(store) = CredentialStore::new() {
            let path_str = store.dir.to_string_lossy();
            assert!(path_str.contains("fieldops"));
        }
        // Test passes if new() returns None (e.g., no home directory in CI)
    }
}
