//! Merge taxonomy lineages into one shared tree, then list, compact or export it.
//!
//! Layers, innermost first:
//! - [`domain`]: tree arena, lineage merging, renderers, Newick interchange
//! - [`application`]: export and input services
//! - [`infrastructure`]: filesystem, taxonomy dump source, service wiring
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
