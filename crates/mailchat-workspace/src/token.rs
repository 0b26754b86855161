//! OAuth token cache: a single JSON file on disk.
//!
//! The layout follows Google's "authorized user" credential file, so a
//! `token.json` written by Google's own client libraries loads unchanged.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorkspaceError;

/// Tokens this close to expiry are treated as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Persisted OAuth credential.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    /// Short-lived access token.
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_uri: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    /// `None` means the expiry is unknown; such a token is used until rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// The access token expires within the safety margin.
    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(exp) => Utc::now() >= exp - Duration::seconds(EXPIRY_MARGIN_SECS),
            None => false,
        }
    }

    /// Usable as-is: has an access token that has not expired.
    pub fn is_valid(&self) -> bool {
        !self.token.is_empty() && !self.is_expired()
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// Reads and writes one `StoredToken` at a fixed path.
#[derive(Clone, Debug)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// Load the cached token.
    ///
    /// `Ok(None)` when the file does not exist; an error when it exists but
    /// cannot be read or parsed.
    pub fn load(&self) -> Result<Option<StoredToken>, WorkspaceError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            WorkspaceError::TokenIo {
                path: self.display_path(),
                source,
            }
        })?;

        let token: StoredToken =
            serde_json::from_str(&content).map_err(|source| WorkspaceError::TokenParse {
                path: self.display_path(),
                source,
            })?;

        debug!(path = %self.path.display(), expiry = ?token.expiry, "loaded OAuth token");
        Ok(Some(token))
    }

    /// Write the token, creating parent directories.
    ///
    /// The JSON goes to an owner-only temp file in the same directory which
    /// is then renamed over the target, so concurrent `load` calls see either
    /// the old token or the new one.
    pub fn save(&self, token: &StoredToken) -> Result<(), WorkspaceError> {
        let io_err = |source| WorkspaceError::TokenIo {
            path: self.display_path(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(io_err)?;

        let json = serde_json::to_vec_pretty(token).map_err(|source| {
            WorkspaceError::TokenParse {
                path: self.display_path(),
                source,
            }
        })?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "token.json".to_string());
        let tmp = dir.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4().simple()));

        let written = write_private(&tmp, &json).and_then(|()| std::fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(e));
        }

        debug!(path = %self.path.display(), "saved OAuth token");
        Ok(())
    }
}

/// Create `path` readable by the owner only and write `bytes` to it.
fn write_private(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_token(expiry: Option<DateTime<Utc>>) -> StoredToken {
        StoredToken {
            token: "ya29.access".into(),
            refresh_token: Some("1//refresh".into()),
            token_uri: "https://oauth2.googleapis.com/token".into(),
            client_id: "client".into(),
            client_secret: "secret".into(),
            scopes: vec!["https://www.googleapis.com/auth/gmail.send".into()],
            expiry,
        }
    }

    #[test]
    fn test_expiry_margin() {
        assert!(sample_token(Some(Utc::now() + Duration::seconds(30))).is_expired());
        assert!(!sample_token(Some(Utc::now() + Duration::hours(1))).is_expired());
        assert!(!sample_token(None).is_expired());
    }

    #[test]
    fn test_validity_needs_access_token() {
        let mut token = sample_token(None);
        assert!(token.is_valid());
        token.token.clear();
        assert!(!token.is_valid());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("nested").join("token.json"));
        let token = sample_token(Some(Utc::now() + Duration::hours(1)));

        store.save(&token).unwrap();
        assert_eq!(store.load().unwrap(), Some(token));
    }

    #[cfg(unix)]
    #[test]
    fn test_saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        store.save(&sample_token(None)).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_loads_google_authorized_user_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(
            &path,
            r#"{"token": "ya29.a0", "refresh_token": "1//0g", "token_uri": "https://oauth2.googleapis.com/token",
                "client_id": "id.apps.googleusercontent.com", "client_secret": "sec",
                "scopes": ["https://www.googleapis.com/auth/gmail.send", "https://www.googleapis.com/auth/gmail.modify"],
                "universe_domain": "googleapis.com", "account": "",
                "expiry": "2030-01-01T00:00:00.123456Z"}"#,
        )
        .unwrap();

        let token = TokenStore::new(&path).load().unwrap().unwrap();
        assert_eq!(token.token, "ya29.a0");
        assert!(token.can_refresh());
        assert_eq!(token.scopes.len(), 2);
        assert!(token.is_valid());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "not json").unwrap();
        let err = TokenStore::new(&path).load().unwrap_err();
        assert!(matches!(err, WorkspaceError::TokenParse { .. }));
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        store.save(&sample_token(None)).unwrap();
        store.save(&sample_token(Some(Utc::now()))).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["token.json".to_string()]);
    }

    #[test]
    fn test_concurrent_load_never_sees_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("token.json"));
        store.save(&sample_token(None)).unwrap();

        let writer = {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..300 {
                    let mut token = sample_token(None);
                    token.token = format!("ya29.access-{}", i);
                    store.save(&token).unwrap();
                }
            })
        };

        let mut reads = 0;
        while !writer.is_finished() || reads < 1000 {
            let loaded = store.load().unwrap().unwrap();
            assert!(loaded.token.starts_with("ya29.access"));
            reads += 1;
        }
        writer.join().unwrap();
    }

    #[test]
    fn test_save_under_regular_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let store = TokenStore::new(blocker.join("token.json"));
        let err = store.save(&sample_token(None)).unwrap_err();
        assert!(matches!(err, WorkspaceError::TokenIo { .. }));
    }
}
