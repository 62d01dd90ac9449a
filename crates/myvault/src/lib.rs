//! myvault - Encrypted JSON secrets vault
//!
//! "One file, every credential, nothing in plaintext."
//!
//! A vault is a single age-encrypted file holding a list of records. Each
//! record is an open-ended set of fields (username, password, apitoken,
//! notes, anything) keyed by a `property` such as `website1.com`. Records
//! are selected with glob expressions like `web*|*api*`.
//!
//! Changes are all-or-nothing per command: the full list is loaded,
//! changed in memory, confirmed with the operator when destructive, and
//! written back whole.

pub mod cipher;
pub mod error;
pub mod matcher;
pub mod output;
pub mod prompt;
pub mod record;
pub mod storage;
pub mod store;
pub mod validate;

pub use cipher::VaultCipher;
pub use error::VaultError;
pub use matcher::FilterExpression;
pub use prompt::{Decisions, DeletionChoice, TerminalDecisions};
pub use record::Record;
pub use storage::{Storage, VaultFile};
pub use store::{CreateOutcome, DeleteOutcome, ReadOutcome, RecordStore, UpdateOutcome};
