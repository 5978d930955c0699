use crate::models::ServiceRecord;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while loading the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog is not a JSON array of records: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Read-only collection of service records
///
/// Loaded once at startup and shared between workers. Records keep the
/// order of the source file, which is also the order of every result set.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<ServiceRecord>,
    by_id: HashMap<String, usize>,
}

impl Catalog {
    pub fn new(records: Vec<ServiceRecord>) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            if let Some(id) = record.id() {
                if by_id.contains_key(id) {
                    tracing::warn!("Duplicate program name in catalog: {}", id);
                    continue;
                }
                by_id.insert(id.to_string(), index);
            }
        }

        Self { records, by_id }
    }

    /// Parse a catalog from a JSON array
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let records: Vec<ServiceRecord> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }

    /// Load a catalog from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        tracing::debug!("Loading catalog from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn records(&self) -> &[ServiceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Look up a record by program name (first occurrence wins)
    pub fn get(&self, id: &str) -> Option<&ServiceRecord> {
        self.by_id.get(id.trim()).map(|&index| &self.records[index])
    }

    /// Resolve identifiers to records, skipping unknown ones
    pub fn resolve<'a, I>(&self, ids: I) -> Vec<ServiceRecord>
    where
        I: IntoIterator<Item = &'a str>,
    {
        ids.into_iter()
            .filter_map(|id| self.get(id))
            .cloned()
            .collect()
    }

    /// The first `size` records, used to give the chat assistant context
    pub fn excerpt(&self, size: usize) -> &[ServiceRecord] {
        &self.records[..size.min(self.records.len())]
    }
}
