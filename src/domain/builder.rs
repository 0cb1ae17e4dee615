//! Tree builder merging resolved lineages into one shared tree.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::domain::entities::{
    Entity, InsertedEntity, LabelConflict, Resolution, SkipReason, SkippedEntity, TaxId,
};
use crate::domain::error::DomainError;
use crate::domain::source::LineageSource;
use crate::domain::tree::TaxonTree;

/// Everything a build produced: the tree plus per-entity bookkeeping.
#[derive(Debug)]
pub struct BuildReport {
    pub tree: TaxonTree,
    /// Entities merged into the tree, in input order
    pub inserted: Vec<InsertedEntity>,
    /// Entities left out, with the reason
    pub skipped: Vec<SkippedEntity>,
    /// Label disagreements encountered while merging
    pub conflicts: Vec<LabelConflict>,
}

impl BuildReport {
    /// Scores of inserted entities keyed by their identifier.
    pub fn scores(&self) -> HashMap<TaxId, f64> {
        self.inserted
            .iter()
            .filter_map(|e| e.score.map(|s| (e.taxid, s)))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Constructs one taxonomy tree from many entity lineages.
pub struct TreeBuilder {
    source: Arc<dyn LineageSource>,
    root: TaxId,
    root_label: String,
}

impl TreeBuilder {
    pub fn new(source: Arc<dyn LineageSource>) -> Self {
        Self {
            source,
            root: TaxId::ROOT,
            root_label: "root".to_string(),
        }
    }

    /// Use a different root sentinel.
    pub fn with_root(mut self, root: TaxId, label: impl Into<String>) -> Self {
        self.root = root;
        self.root_label = label.into();
        self
    }

    /// Resolve and merge every entity.
    ///
    /// Resolution runs in parallel; merging is sequential in input order so the
    /// children order of the tree is deterministic. Repeated names are merged
    /// once. A failure on one entity is recorded and never stops the others.
    #[instrument(level = "debug", skip_all, fields(entities = entities.len()))]
    pub fn build(&self, entities: &[Entity]) -> BuildReport {
        let mut seen = HashSet::new();
        let unique: Vec<&Entity> = entities
            .iter()
            .filter(|e| {
                let fresh = seen.insert(e.name.as_str());
                if !fresh {
                    debug!("build: ignoring repeated entity '{}'", e.name);
                }
                fresh
            })
            .collect();

        let resolved: Vec<(&Entity, Option<Resolution>)> = unique
            .par_iter()
            .map(|&entity| (entity, self.source.resolve(&entity.name)))
            .collect();

        let mut report = BuildReport {
            tree: TaxonTree::with_root(self.root, self.root_label.clone()),
            inserted: Vec::new(),
            skipped: Vec::new(),
            conflicts: Vec::new(),
        };

        for (entity, resolution) in resolved {
            self.merge(&mut report, entity, resolution);
        }

        debug!(
            "build: {} inserted, {} skipped, {} nodes",
            report.inserted.len(),
            report.skipped.len(),
            report.tree.len()
        );
        report
    }

    fn merge(&self, report: &mut BuildReport, entity: &Entity, resolution: Option<Resolution>) {
        let Some(resolution) = resolution else {
            warn!("unresolved entity '{}'", entity.name);
            report.skipped.push(SkippedEntity {
                name: entity.name.clone(),
                reason: SkipReason::Unresolved,
            });
            return;
        };

        match report
            .tree
            .insert_lineage(&resolution.lineage, &resolution.labels)
        {
            Ok(outcome) => {
                for conflict in &outcome.conflicts {
                    warn!("label conflict while merging '{}': {}", entity.name, conflict);
                }
                report.conflicts.extend(outcome.conflicts);
                // insert_lineage rejects empty lineages, so the last id exists
                if let Some(taxid) = resolution.taxid() {
                    report.inserted.push(InsertedEntity {
                        name: entity.name.clone(),
                        taxid,
                        score: entity.score,
                    });
                }
            }
            Err(e) => {
                warn!("skipping '{}': {}", entity.name, e);
                report.skipped.push(SkippedEntity {
                    name: entity.name.clone(),
                    reason: skip_reason(&e),
                });
            }
        }
    }
}

fn skip_reason(error: &DomainError) -> SkipReason {
    match error {
        DomainError::MissingLabel(taxid) => SkipReason::MissingLabel(*taxid),
        e if e.is_malformed_path() => SkipReason::MalformedPath(e.to_string()),
        // insert_lineage never parses Newick; keep the entity skipped anyway
        e => {
            warn!("unexpected merge error: {}", e);
            SkipReason::MalformedPath(e.to_string())
        }
    }
}
