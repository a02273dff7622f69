//! Resume ledger: the persisted set of already-attempted identifiers
//!
//! Once an identifier is in the ledger it is never reprocessed within a
//! campaign, across restarts included. Identifiers are marked even after a
//! failed attempt; that bias trades completeness for forward progress so a
//! permanently failing identifier can never wedge the campaign in a retry
//! loop. The file is an ordered JSON array, fully rewritten atomically on
//! every mutation.

use crate::quota::write_json_atomic;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Persisted set of processed identifiers
#[derive(Debug)]
pub struct ResumeLedger {
    path: PathBuf,
    /// Insertion order preserved for the on-disk representation
    order: Vec<String>,
    processed: HashSet<String>,
}

impl ResumeLedger {
    /// Loads the ledger from the given file, or starts empty
    ///
    /// A missing or malformed file yields an empty ledger rather than an
    /// error; the worst case is reattempting identifiers.
    pub fn load(path: &Path) -> Self {
        let order: Vec<String> = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(ids) => ids,
                Err(e) => {
                    tracing::warn!("Malformed resume ledger, starting empty: {}", e);
                    Vec::new()
                }
            },
            Err(_) => {
                tracing::info!("No resume ledger at {}, starting empty", path.display());
                Vec::new()
            }
        };

        let processed = order.iter().cloned().collect();
        if !order.is_empty() {
            tracing::info!("Resume ledger loaded: {} identifier(s) already attempted", order.len());
        }

        Self {
            path: path.to_path_buf(),
            order,
            processed,
        }
    }

    /// Whether the identifier was already attempted
    pub fn contains(&self, identifier: &str) -> bool {
        self.processed.contains(identifier)
    }

    /// Marks the identifier as processed and persists immediately
    ///
    /// Idempotent: marking an identifier twice is equivalent to once, and
    /// does not rewrite the file on the second call.
    pub fn mark_processed(&mut self, identifier: &str) {
        if !self.processed.insert(identifier.to_string()) {
            return;
        }

        self.order.push(identifier.to_string());
        if let Err(e) = write_json_atomic(&self.path, &self.order) {
            tracing::warn!("Failed to persist resume ledger: {}", e);
        }
    }

    /// Number of identifiers attempted so far
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ledger_path(dir: &TempDir) -> PathBuf {
        dir.path().join("ledger.json")
    }

    #[test]
    fn test_starts_empty_without_file() {
        let dir = TempDir::new().unwrap();
        let ledger = ResumeLedger::load(&ledger_path(&dir));
        assert!(ledger.is_empty());
        assert!(!ledger.contains("18240054"));
    }

    #[test]
    fn test_mark_processed_persists() {
        let dir = TempDir::new().unwrap();
        let path = ledger_path(&dir);

        {
            let mut ledger = ResumeLedger::load(&path);
            ledger.mark_processed("18240054");
            ledger.mark_processed("27074358");
        }

        let reloaded = ResumeLedger::load(&path);
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.contains("18240054"));
        assert!(reloaded.contains("27074358"));
    }

    #[test]
    fn test_mark_processed_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut ledger = ResumeLedger::load(&ledger_path(&dir));

        ledger.mark_processed("18240054");
        ledger.mark_processed("18240054");

        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains("18240054"));
    }

    #[test]
    fn test_order_preserved_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = ledger_path(&dir);

        let mut ledger = ResumeLedger::load(&path);
        ledger.mark_processed("b");
        ledger.mark_processed("a");
        ledger.mark_processed("c");

        let content = std::fs::read_to_string(&path).unwrap();
        let ids: Vec<String> = serde_json::from_str(&content).unwrap();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_malformed_file_starts_empty() {
        let dir = TempDir::new().unwrap();
        let path = ledger_path(&dir);
        std::fs::write(&path, "not json at all").unwrap();

        let ledger = ResumeLedger::load(&path);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_no_tmp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let path = ledger_path(&dir);
        let mut ledger = ResumeLedger::load(&path);
        ledger.mark_processed("18240054");

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }
}
