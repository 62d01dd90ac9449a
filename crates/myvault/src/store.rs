//! Record store - the read/create/update/delete protocol
//!
//! Every mutating operation follows the same shape: load the full record
//! list, compute the change in memory, ask the operator where the change is
//! destructive or surprising, then write the whole list back (or nothing).
//! A declined prompt never leaves a partial write behind.

use std::collections::{HashMap, HashSet};

use crate::error::{Result, VaultError};
use crate::matcher::FilterExpression;
use crate::output;
use crate::prompt::{Decisions, DeletionChoice, DeletionPreview};
use crate::record::Record;
use crate::storage::Storage;

/// Result of `read`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// The vault holds no entries at all
    Empty,
    NoMatches,
    Found(Vec<Record>),
}

/// Result of `create`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    Created { added: usize, total: usize },
    /// Operator declined after property conflicts
    Cancelled { conflicts: Vec<String> },
}

/// Result of `update`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated { updated: usize, not_found: Vec<String> },
    /// Nothing matched, nothing written
    NothingUpdated { not_found: Vec<String> },
    /// Operator declined after missing properties
    Cancelled { not_found: Vec<String> },
}

/// Result of `delete`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The vault holds no entries at all
    Empty,
    NoMatches,
    /// Quit at a per-entry prompt, or declined the final confirmation
    Cancelled,
    /// Every candidate was skipped
    NothingSelected,
    Deleted { removed: Vec<String>, remaining: usize },
    /// The last entry went, so did the vault file
    Removed { removed: Vec<String> },
}

/// Records whose property matches `filter`, or all of them without one
pub fn select(records: &[Record], filter: Option<&FilterExpression>) -> Vec<Record> {
    match filter {
        None => records.to_vec(),
        Some(filter) => records
            .iter()
            .filter(|r| filter.matches(r.property()))
            .cloned()
            .collect(),
    }
}

/// Lower-cased property -> position. The first occurrence of a duplicate wins.
fn property_index(records: &[Record]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(records.len());
    for (i, record) in records.iter().enumerate() {
        let key = record.property_key();
        if index.contains_key(&key) {
            tracing::warn!("Duplicate property in vault: {}", key);
            continue;
        }
        index.insert(key, i);
    }
    index
}

/// Record store over a storage backend
pub struct RecordStore<S: Storage> {
    storage: S,
}

impl<S: Storage> RecordStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load and optionally filter. An empty vault is reported before filtering.
    pub fn read(&self, filter: Option<&FilterExpression>) -> Result<ReadOutcome> {
        let records = self.storage.load()?;
        if records.is_empty() {
            tracing::info!("No entries found in vault file");
            return Ok(ReadOutcome::Empty);
        }

        let selected = select(&records, filter);
        match filter {
            Some(f) => tracing::info!(
                "Found {} entries matching property expression: {}",
                selected.len(),
                f
            ),
            None => tracing::info!("Showing all {} entries", selected.len()),
        }

        if selected.is_empty() {
            return Ok(ReadOutcome::NoMatches);
        }
        Ok(ReadOutcome::Found(selected))
    }

    /// Append validated records after the existing ones
    pub fn create(
        &mut self,
        new_records: Vec<Record>,
        decisions: &mut impl Decisions,
    ) -> Result<CreateOutcome> {
        let mut records = self.storage.load()?;

        let existing: HashSet<String> =
            records.iter().map(Record::property_key).collect();
        let conflicts: Vec<String> = new_records
            .iter()
            .filter(|r| existing.contains(&r.property_key()))
            .map(|r| r.property().to_string())
            .collect();

        if !conflicts.is_empty() {
            tracing::warn!("Property conflicts detected: {}", conflicts.join(", "));
            let question = format!(
                "Properties already exist: {}. Continue anyway?",
                conflicts.join(", ")
            );
            if !decisions.confirm(&question)? {
                tracing::info!("Create operation cancelled by user");
                return Ok(CreateOutcome::Cancelled { conflicts });
            }
        }

        let added = new_records.len();
        tracing::info!(
            "Merging {} existing + {} new = {} total entries",
            records.len(),
            added,
            records.len() + added
        );
        records.extend(new_records);
        self.storage.save(&records)?;

        Ok(CreateOutcome::Created {
            added,
            total: records.len(),
        })
    }

    /// Merge update records into existing ones by property
    pub fn update(
        &mut self,
        updates: &[Record],
        decisions: &mut impl Decisions,
    ) -> Result<UpdateOutcome> {
        let mut records = self.storage.load()?;
        if records.is_empty() {
            return Err(VaultError::Operation(
                "No existing entries found in vault file".to_string(),
            ));
        }

        let index = property_index(&records);
        let mut updated = 0;
        let mut not_found = Vec::new();

        for update in updates {
            match index.get(&update.property_key()) {
                Some(&pos) => {
                    records[pos].merge(update);
                    updated += 1;
                    tracing::info!("Updated property: {}", update.property());
                }
                None => not_found.push(update.property().to_string()),
            }
        }

        if !not_found.is_empty() {
            tracing::warn!("Properties not found for update: {}", not_found.join(", "));
            if !decisions.confirm("Some properties were not found. Continue with updates?")? {
                tracing::info!("Update operation cancelled by user");
                return Ok(UpdateOutcome::Cancelled { not_found });
            }
        }

        if updated == 0 {
            tracing::info!("No entries were updated");
            return Ok(UpdateOutcome::NothingUpdated { not_found });
        }

        self.storage.save(&records)?;
        Ok(UpdateOutcome::Updated { updated, not_found })
    }

    /// Remove entries matching `filter`, asking per entry unless forced
    pub fn delete(
        &mut self,
        filter: &FilterExpression,
        force: bool,
        decisions: &mut impl Decisions,
    ) -> Result<DeleteOutcome> {
        let mut records = self.storage.load()?;
        if records.is_empty() {
            tracing::info!("No entries found in vault file");
            return Ok(DeleteOutcome::Empty);
        }

        let candidates: Vec<(usize, Record)> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| filter.matches(r.property()))
            .map(|(i, r)| (i, r.clone()))
            .collect();

        if candidates.is_empty() {
            tracing::info!("No entries found matching property expression: {}", filter);
            return Ok(DeleteOutcome::NoMatches);
        }

        let chosen = if force {
            show_forced(filter, &candidates, decisions)?;
            candidates
        } else {
            match confirm_candidates(filter, candidates, decisions)? {
                Some(chosen) if chosen.is_empty() => {
                    tracing::info!("No entries selected for deletion");
                    return Ok(DeleteOutcome::NothingSelected);
                }
                Some(chosen) => chosen,
                None => {
                    tracing::info!("Delete operation cancelled by user");
                    return Ok(DeleteOutcome::Cancelled);
                }
            }
        };

        let removed: Vec<String> = chosen.iter().map(|(_, r)| r.property().to_string()).collect();
        let mut positions: Vec<usize> = chosen.into_iter().map(|(i, _)| i).collect();
        positions.sort_unstable_by(|a, b| b.cmp(a));
        for pos in positions {
            records.remove(pos);
        }
        tracing::info!("Deleted {} entries: {}", removed.len(), removed.join(", "));

        if records.is_empty() {
            self.storage.remove()?;
            return Ok(DeleteOutcome::Removed { removed });
        }

        self.storage.save(&records)?;
        Ok(DeleteOutcome::Deleted {
            removed,
            remaining: records.len(),
        })
    }
}

fn rule() -> String {
    "=".repeat(60)
}

/// Force mode still shows what goes, it just does not ask
fn show_forced(
    filter: &FilterExpression,
    candidates: &[(usize, Record)],
    decisions: &mut impl Decisions,
) -> Result<()> {
    decisions.show(&format!(
        "Force mode: Deleting {} entries matching expression '{}':",
        candidates.len(),
        filter
    ))?;
    decisions.show(&rule())?;
    for (n, (_, record)) in candidates.iter().enumerate() {
        decisions.show(&format!("\nEntry {}:\n{}", n + 1, output::preview(record)))?;
    }
    decisions.show(&rule())
}

/// Ask about each candidate, then once more about the whole selection.
/// `None` means the operator backed out and nothing may be written.
fn confirm_candidates(
    filter: &FilterExpression,
    candidates: Vec<(usize, Record)>,
    decisions: &mut impl Decisions,
) -> Result<Option<Vec<(usize, Record)>>> {
    let total = candidates.len();
    decisions.show(&format!(
        "Found {} entries matching expression '{}':",
        total, filter
    ))?;
    decisions.show(&rule())?;

    let mut chosen = Vec::new();
    for (n, (pos, record)) in candidates.into_iter().enumerate() {
        let preview = DeletionPreview {
            number: n + 1,
            total,
            body: output::preview(&record),
        };
        match decisions.confirm_deletion(&preview)? {
            DeletionChoice::Delete => chosen.push((pos, record)),
            DeletionChoice::Keep => {}
            DeletionChoice::Abort => return Ok(None),
        }
    }
    decisions.show(&rule())?;

    if chosen.is_empty() {
        return Ok(Some(chosen));
    }

    decisions.show(&format!(
        "\nSummary: {} of {} entries marked for deletion",
        chosen.len(),
        total
    ))?;
    if !decisions.confirm("Proceed with deletion?")? {
        return Ok(None);
    }
    Ok(Some(chosen))
}
