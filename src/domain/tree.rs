use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{LabelConflict, LabelMap, TaxId};
use crate::domain::error::{DomainError, DomainResult};

/// Tree node in the arena-based taxonomy.
#[derive(Debug, Clone)]
pub struct TaxonNode {
    /// Taxonomy identifier, unique within the tree
    pub taxid: TaxId,
    /// Display label, first one seen wins
    pub label: String,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in first-insertion order
    pub children: Vec<Index>,
}

impl TaxonNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Display for TaxonNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.taxid)
    }
}

/// What a successful lineage insertion changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Number of nodes created
    pub created: usize,
    /// Reused nodes whose label differed from the lineage's label
    pub conflicts: Vec<LabelConflict>,
}

/// Arena-based tree merging many lineages under one synthetic root.
///
/// Nodes are keyed by [`TaxId`]; the id → index map gives O(1) lookup of any
/// node and guarantees that an identifier is attached below exactly one parent.
/// Nodes are never removed, so arena indices stay valid for the tree's lifetime.
#[derive(Debug)]
pub struct TaxonTree {
    arena: Arena<TaxonNode>,
    root: Index,
    by_taxid: HashMap<TaxId, Index>,
}

impl Default for TaxonTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TaxonTree {
    /// Tree rooted at the conventional taxonomy root `1 (root)`.
    pub fn new() -> Self {
        Self::with_root(TaxId::ROOT, "root")
    }

    pub fn with_root(taxid: TaxId, label: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let root = arena.insert(TaxonNode {
            taxid,
            label: label.into(),
            parent: None,
            children: Vec::new(),
        });
        let mut by_taxid = HashMap::new();
        by_taxid.insert(taxid, root);
        Self {
            arena,
            root,
            by_taxid,
        }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn root_id(&self) -> TaxId {
        self.arena[self.root].taxid
    }

    pub fn get_node(&self, idx: Index) -> Option<&TaxonNode> {
        self.arena.get(idx)
    }

    pub fn find(&self, taxid: TaxId) -> Option<Index> {
        self.by_taxid.get(&taxid).copied()
    }

    pub fn find_node(&self, taxid: TaxId) -> Option<&TaxonNode> {
        self.find(taxid).and_then(|idx| self.get_node(idx))
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// True when nothing but the root is present.
    pub fn is_empty(&self) -> bool {
        self.arena.len() == 1
    }

    /// Merge one lineage into the tree.
    ///
    /// `lineage` starts with the root sentinel; every following identifier is
    /// looked up among the current node's children and created with its label
    /// from `labels` when absent. The whole lineage is validated before the
    /// first node is created, so a rejected lineage leaves the tree unchanged.
    ///
    /// # Errors
    /// * [`DomainError::EmptyLineage`] / [`DomainError::NotRooted`] for lineages
    ///   that do not start at this tree's root
    /// * [`DomainError::MissingLabel`] when a new identifier has no label
    /// * [`DomainError::ParentConflict`] / [`DomainError::RepeatedTaxId`] when the
    ///   lineage would attach a node below a second parent
    #[instrument(level = "trace", skip(self, labels))]
    pub fn insert_lineage(
        &mut self,
        lineage: &[TaxId],
        labels: &LabelMap,
    ) -> DomainResult<InsertOutcome> {
        let (&first, path) = lineage.split_first().ok_or(DomainError::EmptyLineage)?;
        let root_id = self.root_id();
        if first != root_id {
            return Err(DomainError::NotRooted {
                expected: root_id,
                found: first,
            });
        }

        let conflicts = self.check_path(path, labels)?;

        let mut current = self.root;
        let mut created = 0;
        for &taxid in path {
            current = match self.find(taxid) {
                Some(existing) => existing,
                None => {
                    let label = labels
                        .get(&taxid)
                        .cloned()
                        .ok_or(DomainError::MissingLabel(taxid))?;
                    created += 1;
                    self.insert_node(taxid, label, current)
                }
            };
        }

        Ok(InsertOutcome { created, conflicts })
    }

    /// Walk `path` without mutating, collecting label conflicts and rejecting
    /// anything that would break single-parent membership.
    fn check_path(&self, path: &[TaxId], labels: &LabelMap) -> DomainResult<Vec<LabelConflict>> {
        let mut conflicts = Vec::new();
        let mut seen: HashSet<TaxId> = HashSet::from([self.root_id()]);
        // None once the walk has left the existing tree
        let mut cursor = Some(self.root);
        let mut previous = self.root_id();

        for &taxid in path {
            if !seen.insert(taxid) {
                return Err(DomainError::RepeatedTaxId(taxid));
            }

            match self.find(taxid) {
                Some(existing) => {
                    let node = &self.arena[existing];
                    if cursor.is_none() || node.parent != cursor {
                        let existing_parent = node
                            .parent
                            .map(|p| self.arena[p].taxid)
                            .unwrap_or(taxid);
                        return Err(DomainError::ParentConflict {
                            taxid,
                            existing_parent,
                            requested_parent: previous,
                        });
                    }
                    if let Some(label) = labels.get(&taxid) {
                        if *label != node.label {
                            conflicts.push(LabelConflict {
                                taxid,
                                kept: node.label.clone(),
                                rejected: label.clone(),
                            });
                        }
                    }
                    cursor = Some(existing);
                }
                None => {
                    if !labels.contains_key(&taxid) {
                        return Err(DomainError::MissingLabel(taxid));
                    }
                    cursor = None;
                }
            }
            previous = taxid;
        }

        Ok(conflicts)
    }

    fn insert_node(&mut self, taxid: TaxId, label: String, parent: Index) -> Index {
        let idx = self.arena.insert(TaxonNode {
            taxid,
            label,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.push(idx);
        }
        self.by_taxid.insert(taxid, idx);
        idx
    }

    /// A node with at least one leaf child.
    pub fn is_branch_point(&self, idx: Index) -> bool {
        self.get_node(idx)
            .map(|node| {
                node.children
                    .iter()
                    .filter_map(|&child| self.get_node(child))
                    .any(TaxonNode::is_leaf)
            })
            .unwrap_or(false)
    }

    /// Pre-order traversal yielding `(depth, index, node)`, children in insertion order.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self)
    }

    /// Number of levels, the root alone counting as one.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        self.iter().map(|(depth, _, _)| depth + 1).max().unwrap_or(0)
    }

    /// Labels of all leaves in traversal order.
    pub fn leaf_labels(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, _, node)| node.is_leaf())
            .map(|(_, _, node)| node.label.clone())
            .collect()
    }

    /// Parent → child identifier pairs, independent of insertion order.
    pub fn edges(&self) -> BTreeSet<(TaxId, TaxId)> {
        self.iter()
            .filter_map(|(_, _, node)| {
                node.parent
                    .and_then(|p| self.get_node(p))
                    .map(|parent| (parent.taxid, node.taxid))
            })
            .collect()
    }
}

pub struct TreeIterator<'a> {
    tree: &'a TaxonTree,
    stack: Vec<(usize, Index)>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a TaxonTree) -> Self {
        Self {
            tree,
            stack: vec![(0, tree.root())],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (usize, Index, &'a TaxonNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((depth, current)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push((depth + 1, child));
                }
                return Some((depth, current, node));
            }
        }
        None
    }
}
