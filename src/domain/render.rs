//! Text renderings of a [`TaxonTree`].
//!
//! Both strategies produce [`RenderedLine`]s so that callers decide about
//! indentation width and styling.

use std::fmt;

use tracing::instrument;

use crate::domain::entities::TaxId;
use crate::domain::tree::{TaxonNode, TaxonTree};

/// One printed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// Distance from the root (root = 0)
    pub depth: usize,
    pub label: String,
    pub taxid: TaxId,
    pub is_leaf: bool,
}

impl RenderedLine {
    fn from_node(depth: usize, node: &TaxonNode) -> Self {
        Self {
            depth,
            label: node.label.clone(),
            taxid: node.taxid,
            is_leaf: node.is_leaf(),
        }
    }

    /// `label (taxid)` indented by `depth * indent` spaces.
    pub fn format(&self, indent: usize) -> String {
        format!(
            "{}{} ({})",
            " ".repeat(self.depth * indent),
            self.label,
            self.taxid
        )
    }
}

impl fmt::Display for RenderedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(2))
    }
}

/// A strategy turning a tree into printable lines.
pub trait TreeRenderer {
    fn render(&self, tree: &TaxonTree) -> Vec<RenderedLine>;
}

/// Every node, pre-order, root included.
#[derive(Debug, Default, Clone, Copy)]
pub struct FullRenderer;

impl TreeRenderer for FullRenderer {
    #[instrument(level = "debug", skip_all)]
    fn render(&self, tree: &TaxonTree) -> Vec<RenderedLine> {
        tree.iter()
            .map(|(depth, _, node)| RenderedLine::from_node(depth, node))
            .collect()
    }
}

/// Leaves and branch points only; non-branching chains are elided.
///
/// A node is printed when it is a branch point (has a leaf child) or when an
/// ancestor branch point forces it. The root itself is never printed, but a
/// root with a leaf child still forces every child.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompactRenderer;

impl TreeRenderer for CompactRenderer {
    #[instrument(level = "debug", skip_all)]
    fn render(&self, tree: &TaxonTree) -> Vec<RenderedLine> {
        let mut lines = Vec::new();
        let Some(root) = tree.get_node(tree.root()) else {
            return lines;
        };

        let root_force = tree.is_branch_point(tree.root());
        let mut stack: Vec<_> = root
            .children
            .iter()
            .rev()
            .map(|&child| (1, child, root_force))
            .collect();

        while let Some((depth, idx, force_print)) = stack.pop() {
            let Some(node) = tree.get_node(idx) else {
                continue;
            };
            let branch_point = tree.is_branch_point(idx);
            if force_print || branch_point {
                lines.push(RenderedLine::from_node(depth, node));
            }
            let child_force = branch_point || force_print;
            for &child in node.children.iter().rev() {
                stack.push((depth + 1, child, child_force));
            }
        }

        lines
    }
}

/// Which renderer to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Full,
    Compact,
}

impl RenderMode {
    pub fn render(self, tree: &TaxonTree) -> Vec<RenderedLine> {
        match self {
            RenderMode::Full => FullRenderer.render(tree),
            RenderMode::Compact => CompactRenderer.render(tree),
        }
    }
}
