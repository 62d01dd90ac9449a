//! Vault file storage
//!
//! The vault is a single age-encrypted file holding the full record list.
//! Files we create are owner-only (600), and anything readable or writable
//! by group/other is refused both before reading and after writing.

use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use crate::cipher::VaultCipher;
use crate::error::{Result, VaultError};
use crate::record::Record;

/// Where a record set lives between invocations
pub trait Storage {
    /// Load all records. Absent or empty storage is an empty list.
    fn load(&self) -> Result<Vec<Record>>;

    /// Replace the stored content with `records`
    fn save(&mut self, records: &[Record]) -> Result<()>;

    /// Remove the backing store entirely
    fn remove(&mut self) -> Result<()>;

    /// Human-readable location, for messages
    fn describe(&self) -> String;
}

/// Fail if `path` exists and grants any access to group or other.
/// A missing path passes.
pub fn check_permissions(path: &Path) -> Result<()> {
    let metadata = match fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    let mode = metadata.permissions().mode() & 0o777;
    if mode & 0o077 != 0 {
        return Err(VaultError::Permission {
            path: path.to_path_buf(),
            mode,
        });
    }

    tracing::debug!("File permissions validated for {}", path.display());
    Ok(())
}

/// Write `data` to `path`, creating it owner-only if needed
pub fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    check_permissions(path)?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.write_all(data)?;
    file.sync_all()?;

    check_permissions(path)
}

/// Read a plaintext JSON input file (for validate/create/update)
pub fn read_json_input(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Err(VaultError::NotFound(path.to_path_buf()));
    }
    check_permissions(path)?;

    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// An encrypted vault file
pub struct VaultFile {
    path: PathBuf,
    cipher: VaultCipher,
}

impl VaultFile {
    pub fn new(path: &Path, cipher: VaultCipher) -> Self {
        Self {
            path: path.to_path_buf(),
            cipher,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for VaultFile {
    fn load(&self) -> Result<Vec<Record>> {
        check_permissions(&self.path)?;

        let encrypted = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("Vault file not found: {}", self.path.display());
                return Ok(vec![]);
            }
            Err(e) => return Err(e.into()),
        };

        if encrypted.iter().all(u8::is_ascii_whitespace) {
            tracing::info!("Empty vault file: {}", self.path.display());
            return Ok(vec![]);
        }

        let records = self.cipher.decrypt(&encrypted)?;
        tracing::info!("Loaded {} entries from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn save(&mut self, records: &[Record]) -> Result<()> {
        let encrypted = self.cipher.encrypt(records)?;
        write_private(&self.path, &encrypted)?;
        tracing::info!("Saved {} entries to {}", records.len(), self.path.display());
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        fs::remove_file(&self.path)?;
        tracing::info!("Removed vault file: {}", self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
