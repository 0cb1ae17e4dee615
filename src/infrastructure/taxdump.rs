//! Lineage source backed by an NCBI taxonomy dump.
//!
//! Reads `nodes.dmp` (taxid → parent) and `names.dmp` (taxid → names by class).
//! Both use `\t|\t` as field separator and end each line with `\t|`.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::{debug, instrument, warn};

use crate::application::ApplicationError;
use crate::domain::{LabelMap, LineageSource, Resolution, TaxId};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::FileSystem;

pub const NODES_FILE: &str = "nodes.dmp";
pub const NAMES_FILE: &str = "names.dmp";

const SCIENTIFIC_NAME: &str = "scientific name";

/// In-memory index of a taxonomy dump.
#[derive(Debug, Default)]
pub struct TaxdumpSource {
    parents: HashMap<TaxId, TaxId>,
    scientific: HashMap<TaxId, String>,
    /// Scientific name → taxid, first occurrence wins
    by_name: HashMap<String, TaxId>,
    /// Any other name class → taxid, first occurrence wins
    by_alias: HashMap<String, TaxId>,
    /// Resolved lineages start here instead of at the dump's own root
    root: Option<TaxId>,
}

impl TaxdumpSource {
    /// Load `nodes.dmp` and `names.dmp` from `dir`.
    #[instrument(level = "debug", skip(fs))]
    pub fn load(fs: &dyn FileSystem, dir: &Path) -> InfraResult<Self> {
        if !fs.is_dir(dir) {
            return Err(ApplicationError::TaxdumpMissing(dir.to_path_buf()).into());
        }
        let nodes_path = dir.join(NODES_FILE);
        let names_path = dir.join(NAMES_FILE);
        let nodes = fs
            .read_to_string(&nodes_path)
            .map_err(|e| InfraError::io(format!("read {}", nodes_path.display()), e))?;
        let names = fs
            .read_to_string(&names_path)
            .map_err(|e| InfraError::io(format!("read {}", names_path.display()), e))?;

        let mut source = Self::default();
        source.read_nodes(&nodes, &nodes_path)?;
        source.read_names(&names, &names_path)?;
        debug!(
            "taxdump: {} nodes, {} scientific names, {} aliases",
            source.parents.len(),
            source.scientific.len(),
            source.by_alias.len()
        );
        Ok(source)
    }

    /// Build from dump contents already in memory.
    pub fn from_dumps(nodes: &str, names: &str) -> InfraResult<Self> {
        let mut source = Self::default();
        source.read_nodes(nodes, Path::new(NODES_FILE))?;
        source.read_names(names, Path::new(NAMES_FILE))?;
        Ok(source)
    }

    fn read_nodes(&mut self, content: &str, path: &Path) -> InfraResult<()> {
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_dmp_line(line);
            if fields.len() < 2 {
                return Err(dump_error(path, i, "expected at least taxid and parent"));
            }
            let taxid = parse_taxid(fields[0], path, i)?;
            let parent = parse_taxid(fields[1], path, i)?;
            self.parents.insert(taxid, parent);
        }
        Ok(())
    }

    fn read_names(&mut self, content: &str, path: &Path) -> InfraResult<()> {
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let fields = split_dmp_line(line);
            if fields.len() < 4 {
                return Err(dump_error(path, i, "expected taxid, name, unique name, class"));
            }
            let taxid = parse_taxid(fields[0], path, i)?;
            let name = fields[1].trim();
            let class = fields[3].trim();

            if class == SCIENTIFIC_NAME {
                self.scientific.entry(taxid).or_insert_with(|| name.to_string());
                self.by_name.entry(name.to_string()).or_insert(taxid);
            } else {
                self.by_alias.entry(name.to_string()).or_insert(taxid);
            }
        }
        Ok(())
    }

    /// Anchor resolved lineages at `root`, dropping its ancestors.
    ///
    /// Lineages of taxa outside `root`'s subtree are left untouched and get
    /// rejected as not rooted when merged.
    pub fn with_root(mut self, root: TaxId) -> Self {
        self.root = Some(root);
        self
    }

    /// Taxid for a name; scientific names take precedence over other classes.
    pub fn lookup(&self, name: &str) -> Option<TaxId> {
        let name = name.trim();
        self.by_name
            .get(name)
            .or_else(|| self.by_alias.get(name))
            .copied()
    }

    /// Ancestors of `taxid`, root first, ending with `taxid`.
    ///
    /// Follows parent links until the self-parented root. A broken chain
    /// (unknown parent) or a cycle stops the walk early; the resulting lineage
    /// then does not start at the root and is rejected when merged.
    pub fn lineage(&self, taxid: TaxId) -> Vec<TaxId> {
        let mut chain = vec![taxid];
        let mut seen = HashSet::from([taxid]);
        let mut current = taxid;

        while let Some(&parent) = self.parents.get(&current) {
            if parent == current {
                break;
            }
            if !seen.insert(parent) {
                warn!("taxdump: parent cycle at taxid {}", parent);
                break;
            }
            chain.push(parent);
            current = parent;
        }

        chain.reverse();
        chain
    }

    pub fn scientific_name(&self, taxid: TaxId) -> Option<&str> {
        self.scientific.get(&taxid).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }
}

impl LineageSource for TaxdumpSource {
    fn resolve(&self, name: &str) -> Option<Resolution> {
        let taxid = self.lookup(name)?;
        let mut lineage = self.lineage(taxid);
        if let Some(start) = self
            .root
            .and_then(|root| lineage.iter().position(|&id| id == root))
        {
            lineage.drain(..start);
        }
        let labels: LabelMap = lineage
            .iter()
            .filter_map(|id| self.scientific.get(id).map(|n| (*id, n.clone())))
            .collect();
        Some(Resolution { lineage, labels })
    }
}

fn split_dmp_line(line: &str) -> Vec<&str> {
    line.trim_end_matches(['\r', '\n'])
        .trim_end_matches("\t|")
        .split("\t|\t")
        .collect()
}

fn parse_taxid(field: &str, path: &Path, line: usize) -> InfraResult<TaxId> {
    field
        .parse()
        .map_err(|_| dump_error(path, line, &format!("invalid taxid '{}'", field.trim())))
}

fn dump_error(path: &Path, line: usize, message: &str) -> InfraError {
    InfraError::Taxdump {
        path: path.to_path_buf(),
        line: line + 1,
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_dmp_line_when_splitting_then_strips_terminator() {
        let fields = split_dmp_line("7070\t|\t7069\t|\tspecies\t|");
        assert_eq!(fields, vec!["7070", "7069", "species"]);
    }

    #[test]
    fn given_invalid_taxid_when_loading_then_reports_line() {
        let err = TaxdumpSource::from_dumps("1\t|\t1\t|\nx\t|\t1\t|\n", "").unwrap_err();
        match err {
            InfraError::Taxdump { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }
}
