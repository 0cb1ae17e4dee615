//! Entity list input.

use std::path::Path;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::Entity;
use crate::infrastructure::traits::FileSystem;

/// Read an entity list: one name per line, optional TAB-separated score.
pub fn load_entities(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<Vec<Entity>> {
    let content = fs
        .read_to_string(path)
        .with_path_context("read entity list", path)?;
    let entities: Vec<Entity> = content.lines().filter_map(Entity::parse_line).collect();
    debug!("load_entities: {} entities from {}", entities.len(), path.display());
    Ok(entities)
}

/// Combine names from the command line with an optional entity list file.
///
/// Command line names come first. Fails when both are empty.
pub fn collect_entities(
    fs: &dyn FileSystem,
    names: &[String],
    file: Option<&Path>,
) -> ApplicationResult<Vec<Entity>> {
    let mut entities: Vec<Entity> = names
        .iter()
        .filter_map(|n| Entity::parse_line(n))
        .collect();
    if let Some(path) = file {
        entities.extend(load_entities(fs, path)?);
    }
    if entities.is_empty() {
        return Err(ApplicationError::NoEntities);
    }
    Ok(entities)
}
