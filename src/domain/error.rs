//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::entities::TaxId;

/// Domain errors represent violations of the tree model.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("no label for taxid {0}")]
    MissingLabel(TaxId),

    #[error("empty lineage")]
    EmptyLineage,

    #[error("lineage starts at {found}, expected root {expected}")]
    NotRooted { expected: TaxId, found: TaxId },

    #[error("taxid {taxid} already attached below {existing_parent}, lineage places it below {requested_parent}")]
    ParentConflict {
        taxid: TaxId,
        existing_parent: TaxId,
        requested_parent: TaxId,
    },

    #[error("taxid {0} appears twice in one lineage")]
    RepeatedTaxId(TaxId),

    #[error("invalid newick at byte {position}: {message}")]
    Newick { position: usize, message: String },
}

impl DomainError {
    /// True for errors that mean the lineage itself is unusable.
    pub fn is_malformed_path(&self) -> bool {
        matches!(
            self,
            DomainError::EmptyLineage
                | DomainError::NotRooted { .. }
                | DomainError::ParentConflict { .. }
                | DomainError::RepeatedTaxId(_)
        )
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
