//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem)
//! but are themselves concrete structs, not traits.

mod entities;
mod export;

pub use entities::{collect_entities, load_entities};
pub use export::{TreeExporter, ATTR_SCORE, ATTR_TAXID, KNOWN_ATTRIBUTES};
