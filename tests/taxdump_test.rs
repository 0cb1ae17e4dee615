//! Tests for the NCBI taxonomy dump lineage source

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use taxotree::application::ApplicationError;
use taxotree::config::Settings;
use taxotree::domain::{Entity, LineageSource, SkipReason, TaxId, TreeBuilder};
use taxotree::infrastructure::di::ServiceContainer;
use taxotree::infrastructure::traits::RealFileSystem;
use taxotree::infrastructure::{InfraError, TaxdumpSource};
use taxotree::util::testing::init_test_setup;

const NODES: &str = "\
1\t|\t1\t|\tno rank\t|
7041\t|\t1\t|\torder\t|
7055\t|\t7041\t|\tfamily\t|
7069\t|\t7055\t|\tgenus\t|
7070\t|\t7069\t|\tspecies\t|
7072\t|\t7069\t|\tspecies\t|
50\t|\t49\t|\tspecies\t|
";

const NAMES: &str = "\
1\t|\troot\t|\t\t|\tscientific name\t|
7041\t|\tColeoptera\t|\t\t|\tscientific name\t|
7041\t|\tbeetles\t|\t\t|\tgenbank common name\t|
7055\t|\tTenebrionidae\t|\t\t|\tscientific name\t|
7069\t|\tTribolium\t|\t\t|\tscientific name\t|
7070\t|\tTribolium castaneum\t|\t\t|\tscientific name\t|
7070\t|\tred flour beetle\t|\t\t|\tgenbank common name\t|
7072\t|\tTribolium madens\t|\t\t|\tscientific name\t|
7072\t|\tTribolium castaneum\t|\t\t|\tsynonym\t|
50\t|\tOrphan\t|\t\t|\tscientific name\t|
";

fn write_dump(dir: &Path) {
    std::fs::write(dir.join("nodes.dmp"), NODES).unwrap();
    std::fs::write(dir.join("names.dmp"), NAMES).unwrap();
}

fn load() -> (TempDir, TaxdumpSource) {
    let temp = TempDir::new().unwrap();
    write_dump(temp.path());
    let source = TaxdumpSource::load(&RealFileSystem, temp.path()).unwrap();
    (temp, source)
}

// ============================================================
// Loading
// ============================================================

#[test]
fn given_dump_dir_when_loading_then_all_nodes_indexed() {
    // Arrange
    init_test_setup();

    // Act
    let (_temp, source) = load();

    // Assert
    assert_eq!(source.len(), 7);
    assert!(!source.is_empty());
    assert_eq!(source.scientific_name(TaxId(7041)), Some("Coleoptera"));
}

#[test]
fn given_missing_dir_when_loading_then_taxdump_missing() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope");

    let err = TaxdumpSource::load(&RealFileSystem, &missing).unwrap_err();

    assert!(matches!(
        err,
        InfraError::Application(ApplicationError::TaxdumpMissing(ref p)) if *p == missing
    ));
}

#[test]
fn given_dir_without_names_when_loading_then_io_error() {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("nodes.dmp"), NODES).unwrap();

    let err = TaxdumpSource::load(&RealFileSystem, temp.path()).unwrap_err();

    assert!(matches!(err, InfraError::Io { .. }));
}

#[test]
fn given_short_names_line_when_loading_then_error_names_file_and_line() {
    let err = TaxdumpSource::from_dumps(NODES, "1\t|\troot\t|\n").unwrap_err();

    assert!(err.to_string().starts_with("names.dmp:1:"), "{}", err);
}

// ============================================================
// Lookup and lineage
// ============================================================

#[test]
fn given_name_in_two_classes_when_looking_up_then_scientific_wins() {
    let (_temp, source) = load();

    // "Tribolium castaneum" is 7070's scientific name and a synonym of 7072
    assert_eq!(source.lookup("Tribolium castaneum"), Some(TaxId(7070)));
    assert_eq!(source.lookup("red flour beetle"), Some(TaxId(7070)));
    assert_eq!(source.lookup("  beetles "), Some(TaxId(7041)));
    assert_eq!(source.lookup("Unknown X"), None);
}

#[test]
fn given_taxid_when_walking_lineage_then_root_first() {
    let (_temp, source) = load();

    let lineage = source.lineage(TaxId(7072));

    assert_eq!(
        lineage,
        vec![TaxId(1), TaxId(7041), TaxId(7055), TaxId(7069), TaxId(7072)]
    );
}

#[test]
fn given_common_name_when_resolving_then_labels_are_scientific() {
    let (_temp, source) = load();

    let resolution = source.resolve("red flour beetle").unwrap();

    assert_eq!(resolution.taxid(), Some(TaxId(7070)));
    assert_eq!(resolution.labels[&TaxId(7070)], "Tribolium castaneum");
    assert_eq!(resolution.labels[&TaxId(1)], "root");
    assert_eq!(resolution.labels.len(), resolution.lineage.len());
}

#[test]
fn given_parent_cycle_when_walking_lineage_then_stops() {
    let nodes = "1\t|\t1\t|\n5\t|\t6\t|\n6\t|\t5\t|\n";
    let names = "5\t|\tfive\t|\t\t|\tscientific name\t|\n";
    let source = TaxdumpSource::from_dumps(nodes, names).unwrap();

    let lineage = source.lineage(TaxId(5));

    assert_eq!(lineage, vec![TaxId(6), TaxId(5)]);
}

// ============================================================
// End to end with the builder
// ============================================================

#[test]
fn given_dump_when_building_then_broken_chain_skipped_and_rest_merged() {
    // Arrange
    let (_temp, source) = load();
    let builder = TreeBuilder::new(Arc::new(source));
    let entities = vec![
        Entity::new("Tribolium castaneum"),
        Entity::new("Tribolium madens"),
        Entity::new("Orphan"),
        Entity::new("Unknown X"),
    ];

    // Act
    let report = builder.build(&entities);

    // Assert
    assert_eq!(report.inserted.len(), 2);
    assert_eq!(report.skipped.len(), 2);
    assert!(matches!(
        report.skipped[0].reason,
        SkipReason::MalformedPath(_)
    ));
    assert_eq!(report.skipped[0].name, "Orphan");
    assert_eq!(report.skipped[1].reason, SkipReason::Unresolved);
    let genus = report.tree.find_node(TaxId(7069)).unwrap();
    assert_eq!(genus.children.len(), 2);
}

// ============================================================
// Custom root
// ============================================================

#[test]
fn given_custom_root_when_resolving_then_lineage_starts_there() {
    let (_temp, source) = load();
    let source = source.with_root(TaxId(7041));

    let resolution = source.resolve("Tribolium madens").unwrap();

    assert_eq!(
        resolution.lineage,
        vec![TaxId(7041), TaxId(7055), TaxId(7069), TaxId(7072)]
    );
    assert!(!resolution.labels.contains_key(&TaxId(1)));
}

#[test]
fn given_custom_root_setting_when_building_then_entities_below_it_merged() {
    // Arrange
    let temp = TempDir::new().unwrap();
    write_dump(temp.path());
    let settings = Settings {
        taxdump_dir: temp.path().to_path_buf(),
        root_id: TaxId(7041),
        ..Settings::default()
    };
    let mut container = ServiceContainer::with_deps(settings, Arc::new(RealFileSystem), None);

    // Act
    let report = container
        .tree_builder()
        .unwrap()
        .build(&[Entity::new("Tribolium madens"), Entity::new("Orphan")]);

    // Assert: Orphan's lineage never reaches 7041
    assert_eq!(report.tree.root_id(), TaxId(7041));
    assert_eq!(report.inserted.len(), 1);
    assert_eq!(report.tree.len(), 4);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].name, "Orphan");
}
