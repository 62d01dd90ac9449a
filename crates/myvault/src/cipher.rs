//! Vault encryption
//!
//! The whole record list is serialized as pretty JSON and encrypted with an
//! age passphrase (scrypt) recipient. Output is ASCII-armored so the vault
//! file stays text and diffs/backs up like any other dotfile.

use age::armor::{ArmoredReader, ArmoredWriter, Format};
use age::secrecy::{ExposeSecret, Secret, SecretString};
use serde_json::Value;
use std::io::{Read, Write};

use crate::error::{Result, VaultError};
use crate::record::Record;

/// Password-based encryption for a record list
pub struct VaultCipher {
    passphrase: SecretString,
}

impl VaultCipher {
    pub fn new(password: &str) -> Self {
        Self {
            passphrase: Secret::new(password.to_string()),
        }
    }

    /// Serialize and encrypt records
    pub fn encrypt(&self, records: &[Record]) -> Result<Vec<u8>> {
        let plaintext = serde_json::to_string_pretty(records)?;
        let crypto = |e: &dyn std::fmt::Display| VaultError::Crypto(format!("Failed to encrypt data: {}", e));

        let passphrase = Secret::new(self.passphrase.expose_secret().clone());
        let encryptor = age::Encryptor::with_user_passphrase(passphrase);

        let mut encrypted = vec![];
        let armor = ArmoredWriter::wrap_output(&mut encrypted, Format::AsciiArmor)
            .map_err(|e| crypto(&e))?;
        let mut writer = encryptor.wrap_output(armor).map_err(|e| crypto(&e))?;
        writer.write_all(plaintext.as_bytes()).map_err(|e| crypto(&e))?;
        writer
            .finish()
            .and_then(|armor| armor.finish())
            .map_err(|e| crypto(&e))?;

        tracing::debug!("Encrypted {} entries", records.len());
        Ok(encrypted)
    }

    /// Decrypt and parse records. A bare object is read as one record.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<Record>> {
        let crypto = |e: &dyn std::fmt::Display| VaultError::Crypto(format!("Failed to decrypt data: {}", e));

        let decryptor = match age::Decryptor::new(ArmoredReader::new(data)).map_err(|e| crypto(&e))? {
            age::Decryptor::Passphrase(d) => d,
            _ => {
                return Err(VaultError::Crypto(
                    "Vault file is not passphrase-encrypted".to_string(),
                ))
            }
        };

        let mut plaintext = vec![];
        let mut reader = decryptor
            .decrypt(&self.passphrase, None)
            .map_err(|e| crypto(&e))?;
        reader.read_to_end(&mut plaintext).map_err(|e| crypto(&e))?;

        let raw: Value = serde_json::from_slice(&plaintext)?;
        let records = into_records(raw)?;
        tracing::debug!("Decrypted {} entries", records.len());
        Ok(records)
    }
}

fn into_records(raw: Value) -> Result<Vec<Record>> {
    let items = match raw {
        Value::Object(map) => return Ok(vec![Record::from_map(map)]),
        Value::Array(items) => items,
        _ => {
            return Err(VaultError::Validation(
                "Vault content must be a list of objects or a single object".to_string(),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(map) => Ok(Record::from_map(map)),
            _ => Err(VaultError::Validation(format!(
                "Vault entry {} is not an object",
                i
            ))),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::test_support::records;
    use serde_json::json;

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = VaultCipher::new("test_password");
        let recs = records(json!([
            {"property": "web.com", "password": "s3cret", "ünï": "cødé"},
            {"property": "api", "token": null, "n": 1.5}
        ]));

        let encrypted = cipher.encrypt(&recs).unwrap();
        let text = String::from_utf8(encrypted.clone()).unwrap();
        assert!(text.starts_with("-----BEGIN AGE ENCRYPTED FILE-----"));
        assert!(!text.contains("s3cret"));

        assert_eq!(cipher.decrypt(&encrypted).unwrap(), recs);
    }

    #[test]
    fn test_wrong_password_is_crypto_error() {
        let encrypted = VaultCipher::new("right")
            .encrypt(&records(json!([{"property": "x"}])))
            .unwrap();

        let err = VaultCipher::new("wrong").decrypt(&encrypted).unwrap_err();
        assert!(matches!(err, VaultError::Crypto(_)));
    }

    #[test]
    fn test_garbage_is_crypto_error() {
        let err = VaultCipher::new("pw").decrypt(b"not an age file").unwrap_err();
        assert!(matches!(err, VaultError::Crypto(_)));
    }

    #[test]
    fn test_into_records_normalizes_object() {
        let recs = into_records(json!({"property": "solo"})).unwrap();
        assert_eq!(recs, records(json!([{"property": "solo"}])));

        assert!(into_records(json!([1, 2])).is_err());
        assert!(into_records(json!("text")).is_err());
    }
}
