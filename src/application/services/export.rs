//! Tree export service
//!
//! Converts the merged taxonomy tree into a [`LabeledNode`] and persists it as
//! Newick with NHX leaf annotations.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{BuildReport, LabeledNode, TaxId, TaxonTree};
use crate::infrastructure::traits::FileSystem;

/// Attribute holding the taxonomy identifier, present on every node.
pub const ATTR_TAXID: &str = "taxid";
/// Attribute holding the entity score, present on scored leaves only.
pub const ATTR_SCORE: &str = "score";
/// Attributes the exporter knows how to fill.
pub const KNOWN_ATTRIBUTES: &[&str] = &[ATTR_TAXID, ATTR_SCORE];

/// Service exporting taxonomy trees.
pub struct TreeExporter {
    fs: Arc<dyn FileSystem>,
}

impl TreeExporter {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Labeled copy of `tree`, children in insertion order.
    ///
    /// Every node carries `taxid`; leaves found in `scores` also carry `score`.
    pub fn to_labeled(tree: &TaxonTree, scores: &HashMap<TaxId, f64>) -> LabeledNode {
        fn build(tree: &TaxonTree, idx: Index, scores: &HashMap<TaxId, f64>) -> LabeledNode {
            let Some(node) = tree.get_node(idx) else {
                return LabeledNode::default();
            };
            let mut labeled =
                LabeledNode::new(node.label.clone()).with_attribute(ATTR_TAXID, node.taxid);
            if node.is_leaf() {
                if let Some(score) = scores.get(&node.taxid) {
                    labeled = labeled.with_attribute(ATTR_SCORE, score);
                }
            }
            for &child in &node.children {
                labeled.push(build(tree, child, scores));
            }
            labeled
        }

        build(tree, tree.root(), scores)
    }

    /// Labeled copy of a build result, with entity scores attached.
    pub fn export(&self, report: &BuildReport) -> LabeledNode {
        Self::to_labeled(&report.tree, &report.scores())
    }

    /// Reject attribute names the exporter never produces.
    pub fn validate_allowlist<S: AsRef<str>>(allowlist: &[S]) -> ApplicationResult<()> {
        match allowlist
            .iter()
            .map(AsRef::as_ref)
            .find(|a| !KNOWN_ATTRIBUTES.contains(a))
        {
            Some(unknown) => Err(ApplicationError::UnknownAttribute {
                attribute: unknown.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Write the Newick text of `tree` to `path`, leaves annotated with the
    /// allowlisted attributes. Returns the written text.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn persist(
        &self,
        tree: &LabeledNode,
        path: &Path,
        allowlist: &[String],
    ) -> ApplicationResult<String> {
        Self::validate_allowlist(allowlist)?;
        let mut text = tree.to_newick_with(allowlist);
        text.push('\n');
        self.fs
            .write_atomic(path, &text)
            .with_path_context("write newick", path)?;
        debug!("persist: wrote {} bytes to {}", text.len(), path.display());
        Ok(text)
    }
}
