//! Persistent record of deployed contract addresses.

use std::collections::BTreeMap;
use std::path::Path;

use alloy_core::primitives::Address;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name-to-address book written to the configured output file after every
/// successful deployment, so an aborted run still leaves a usable record.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBook {
    #[serde(flatten)]
    entries: BTreeMap<String, Address>,
}

impl AddressBook {
    /// Load the book at `path`, or start an empty one if the file does not
    /// exist yet.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read address book from {}", path.display()))?;
        serde_json::from_str(&content).context("Failed to parse address book as JSON")
    }

    pub fn record(&mut self, name: impl Into<String>, address: Address) {
        self.entries.insert(name.into(), address);
    }

    pub fn get(&self, name: &str) -> Option<Address> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize address book")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write address book to {}", path.display()))?;
        tracing::debug!(path = %path.display(), entries = self.len(), "Address book saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempdir::TempDir::new("feedstack-book").unwrap();
        let path = dir.path().join("deployments.json");

        let mut book = AddressBook::default();
        book.record("PriceFeedV2", Address::repeat_byte(0x11));
        book.record("ChainlinkWrapper", Address::repeat_byte(0x22));
        book.save(&path).unwrap();

        let loaded = AddressBook::load_or_default(&path).unwrap();
        assert_eq!(loaded, book);
        assert_eq!(loaded.get("PriceFeedV2"), Some(Address::repeat_byte(0x11)));
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir::TempDir::new("feedstack-book").unwrap();
        let book = AddressBook::load_or_default(&dir.path().join("absent.json")).unwrap();
        assert!(book.is_empty());
    }

    #[test]
    fn test_record_overwrites() {
        let mut book = AddressBook::default();
        book.record("gohm", Address::repeat_byte(0x01));
        book.record("gohm", Address::repeat_byte(0x02));
        assert_eq!(book.len(), 1);
        assert_eq!(book.get("gohm"), Some(Address::repeat_byte(0x02)));
    }
}
