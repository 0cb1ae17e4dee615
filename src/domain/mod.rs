//! Domain layer: taxonomy tree, merging, rendering and interchange format
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod entities;
pub mod error;
pub mod labeled;
pub mod render;
pub mod source;
pub mod tree;

pub use builder::{BuildReport, TreeBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use labeled::{parse_newick, LabeledNode};
pub use render::{CompactRenderer, FullRenderer, RenderMode, RenderedLine, TreeRenderer};
pub use source::{InMemoryLineageSource, LineageSource};
pub use tree::{InsertOutcome, TaxonNode, TaxonTree};
