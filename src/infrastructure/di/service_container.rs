//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use tracing::debug;

use crate::application::services::TreeExporter;
use crate::config::Settings;
use crate::domain::{LineageSource, TreeBuilder};
use crate::infrastructure::error::InfraResult;
use crate::infrastructure::taxdump::TaxdumpSource;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
///
/// The lineage source is loaded on first use, so commands that never resolve
/// names do not pay for reading the taxonomy dump.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    source: Option<Arc<dyn LineageSource>>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), None)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        source: Option<Arc<dyn LineageSource>>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            source,
        }
    }

    /// The configured lineage source, reading the taxonomy dump if none was injected.
    pub fn lineage_source(&mut self) -> InfraResult<Arc<dyn LineageSource>> {
        if let Some(source) = &self.source {
            return Ok(Arc::clone(source));
        }
        debug!("loading taxdump from {}", self.settings.taxdump_dir.display());
        let source: Arc<dyn LineageSource> = Arc::new(
            TaxdumpSource::load(self.fs.as_ref(), &self.settings.taxdump_dir)?
                .with_root(self.settings.root_id),
        );
        self.source = Some(Arc::clone(&source));
        Ok(source)
    }

    pub fn tree_builder(&mut self) -> InfraResult<TreeBuilder> {
        let source = self.lineage_source()?;
        Ok(TreeBuilder::new(source).with_root(self.settings.root_id, "root"))
    }

    pub fn tree_exporter(&self) -> TreeExporter {
        TreeExporter::new(Arc::clone(&self.fs))
    }
}
