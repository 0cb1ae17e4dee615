//! Test support: logging setup and a ready-made lineage fixture.

use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::InMemoryLineageSource;

static TEST_SETUP: Once = Once::new();

/// Install a global tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`, defaulting to `debug`.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// A handful of beetles sharing most of their lineage.
///
/// ```text
/// root (1)
/// └── Coleoptera (7041)
///     ├── Tenebrionidae (7055)
///     │   ├── Tribolium madens (7072)
///     │   └── Tenebrio molitor (7067)
///     └── Chrysomelidae (7061)
///         └── Leptinotarsa decemlineata (7539)
/// ```
pub fn beetle_source() -> InMemoryLineageSource {
    InMemoryLineageSource::new()
        .with_lineage(
            "Tribolium madens",
            &[
                (1, "root"),
                (7041, "Coleoptera"),
                (7055, "Tenebrionidae"),
                (7072, "Tribolium madens"),
            ],
        )
        .with_lineage(
            "Tenebrio molitor",
            &[
                (1, "root"),
                (7041, "Coleoptera"),
                (7055, "Tenebrionidae"),
                (7067, "Tenebrio molitor"),
            ],
        )
        .with_lineage(
            "Leptinotarsa decemlineata",
            &[
                (1, "root"),
                (7041, "Coleoptera"),
                (7061, "Chrysomelidae"),
                (7539, "Leptinotarsa decemlineata"),
            ],
        )
}
