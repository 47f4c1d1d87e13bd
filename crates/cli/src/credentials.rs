//! Credential storage with keyring and file-based fallback.
//!
//! Tries the system keyring first (macOS Keychain, Windows Credential
//! Manager, Linux Secret Service). Falls back to file storage
//! (~/.config/keystorm/credentials.json) for headless environments.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use keyring::Entry;
use serde::{Deserialize, Serialize};

const SERVICE: &str = "keystorm";
const TOKEN_USER: &str = "session-token";

#[derive(Debug, Default, Serialize, Deserialize)]
struct FileCredentials {
    token: Option<String>,
}

fn credentials_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("keystorm")
        .join("credentials.json")
}

fn load_file_credentials() -> FileCredentials {
    let path = credentials_path();
    if path.exists() {
        std::fs::read_to_string(&path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    } else {
        FileCredentials::default()
    }
}

fn save_file_credentials(creds: &FileCredentials) -> Result<()> {
    let path = credentials_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(creds)?;
    std::fs::write(&path, json)?;

    // Set restrictive permissions on Unix
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

/// Load the session token, with a helpful error if not signed in.
pub fn get_token() -> Result<String> {
    // Try keyring first
    if let Ok(entry) = Entry::new(SERVICE, TOKEN_USER)
        && let Ok(secret) = entry.get_password()
    {
        return Ok(secret);
    }

    // Fall back to file
    let creds = load_file_credentials();
    creds
        .token
        .ok_or_else(|| anyhow!("Not signed in. Run: keystorm login <email>"))
}

/// Store the session token.
pub fn set_token(value: String) -> Result<()> {
    // Try keyring first
    if let Ok(entry) = Entry::new(SERVICE, TOKEN_USER)
        && entry.set_password(&value).is_ok()
    {
        return Ok(());
    }

    // Fall back to file
    let mut creds = load_file_credentials();
    creds.token = Some(value);
    save_file_credentials(&creds)
}

/// Delete all stored credentials.
pub fn delete_all() -> Result<()> {
    // Try keyring
    if let Ok(entry) = Entry::new(SERVICE, TOKEN_USER) {
        let _ = entry.delete_credential();
    }

    // Also delete file if it exists
    let path = credentials_path();
    if path.exists() {
        std::fs::remove_file(&path)?;
    }

    Ok(())
}
