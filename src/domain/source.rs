//! Lineage lookup boundary.

use std::collections::HashMap;

use crate::domain::entities::{LabelMap, Resolution, TaxId};

/// Resolves an entity name to its ancestor path.
///
/// Implementations must be shareable across threads: the builder may resolve
/// several entities concurrently before merging them.
pub trait LineageSource: Send + Sync {
    /// Ancestors root-first plus their labels, `None` when the name is unknown.
    fn resolve(&self, name: &str) -> Option<Resolution>;
}

/// Lineages configured in code.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLineageSource {
    entries: HashMap<String, Resolution>,
}

impl InMemoryLineageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` with a root-first lineage of `(taxid, label)` pairs.
    pub fn with_lineage(mut self, name: impl Into<String>, lineage: &[(u64, &str)]) -> Self {
        let labels: LabelMap = lineage
            .iter()
            .map(|&(id, label)| (TaxId(id), label.to_string()))
            .collect();
        let lineage = lineage.iter().map(|&(id, _)| TaxId(id)).collect();
        self.insert(name, Resolution { lineage, labels });
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, resolution: Resolution) {
        self.entries.insert(name.into(), resolution);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LineageSource for InMemoryLineageSource {
    fn resolve(&self, name: &str) -> Option<Resolution> {
        self.entries.get(name).cloned()
    }
}
