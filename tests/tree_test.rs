//! Tests for merging lineages into a TaxonTree

use rstest::rstest;

use taxotree::domain::{DomainError, LabelMap, TaxId, TaxonTree};

fn ids(raw: &[u64]) -> Vec<TaxId> {
    raw.iter().copied().map(TaxId).collect()
}

fn labels(pairs: &[(u64, &str)]) -> LabelMap {
    pairs
        .iter()
        .map(|&(id, label)| (TaxId(id), label.to_string()))
        .collect()
}

fn scenario_labels() -> LabelMap {
    labels(&[(1, "root"), (10, "A"), (20, "B"), (30, "C"), (40, "D")])
}

// ============================================================
// Merge correctness
// ============================================================

#[test]
fn given_two_lineages_sharing_prefix_when_inserting_then_one_shared_chain() {
    // Arrange
    let mut tree = TaxonTree::new();
    let names = scenario_labels();

    // Act
    tree.insert_lineage(&ids(&[1, 10, 20, 30]), &names).unwrap();
    tree.insert_lineage(&ids(&[1, 10, 20, 40]), &names).unwrap();

    // Assert: root → A → B → {C, D}
    assert_eq!(tree.len(), 5);
    let b = tree.find_node(TaxId(20)).unwrap();
    let children: Vec<_> = b
        .children
        .iter()
        .map(|&c| tree.get_node(c).unwrap().label.clone())
        .collect();
    assert_eq!(children, vec!["C", "D"]);
    assert_eq!(tree.find_node(TaxId(10)).unwrap().children.len(), 1);
    assert_eq!(tree.depth(), 4);
}

#[test]
fn given_second_lineage_when_inserting_then_reports_only_new_nodes() {
    let mut tree = TaxonTree::new();
    let names = scenario_labels();

    let first = tree.insert_lineage(&ids(&[1, 10, 20, 30]), &names).unwrap();
    let second = tree.insert_lineage(&ids(&[1, 10, 20, 40]), &names).unwrap();

    assert_eq!(first.created, 3);
    assert_eq!(second.created, 1);
}

// ============================================================
// Idempotence and order independence
// ============================================================

#[test]
fn given_same_lineage_twice_when_inserting_then_tree_unchanged() {
    // Arrange
    let mut once = TaxonTree::new();
    let mut twice = TaxonTree::new();
    let names = scenario_labels();
    let lineage = ids(&[1, 10, 20, 30]);

    // Act
    once.insert_lineage(&lineage, &names).unwrap();
    twice.insert_lineage(&lineage, &names).unwrap();
    let repeat = twice.insert_lineage(&lineage, &names).unwrap();

    // Assert
    assert_eq!(repeat.created, 0);
    assert!(repeat.conflicts.is_empty());
    assert_eq!(once.edges(), twice.edges());
    assert_eq!(once.len(), twice.len());
    assert_eq!(once.leaf_labels(), twice.leaf_labels());
}

#[rstest]
#[case(&[1, 10, 20, 30], &[1, 10, 20, 40])]
#[case(&[1, 10, 20, 30], &[1, 10])]
#[case(&[1, 10], &[1, 50, 60])]
#[case(&[1, 10, 20, 30], &[1, 10, 20, 30])]
fn given_two_lineages_when_inserted_in_either_order_then_same_shape(
    #[case] a: &[u64],
    #[case] b: &[u64],
) {
    let names = labels(&[
        (1, "root"),
        (10, "A"),
        (20, "B"),
        (30, "C"),
        (40, "D"),
        (50, "E"),
        (60, "F"),
    ]);

    let mut ab = TaxonTree::new();
    ab.insert_lineage(&ids(a), &names).unwrap();
    ab.insert_lineage(&ids(b), &names).unwrap();

    let mut ba = TaxonTree::new();
    ba.insert_lineage(&ids(b), &names).unwrap();
    ba.insert_lineage(&ids(a), &names).unwrap();

    assert_eq!(ab.edges(), ba.edges());
    assert_eq!(ab.len(), ba.len());
}

#[test]
fn given_children_inserted_in_order_when_iterating_then_order_kept() {
    let mut tree = TaxonTree::new();
    let names = scenario_labels();

    tree.insert_lineage(&ids(&[1, 10, 20, 40]), &names).unwrap();
    tree.insert_lineage(&ids(&[1, 10, 20, 30]), &names).unwrap();
    // re-inserting the first path must not move D behind C
    tree.insert_lineage(&ids(&[1, 10, 20, 40]), &names).unwrap();

    assert_eq!(tree.leaf_labels(), vec!["D", "C"]);
}

// ============================================================
// Edge cases
// ============================================================

#[test]
fn given_root_only_lineage_when_inserting_then_noop() {
    let mut tree = TaxonTree::new();

    let outcome = tree.insert_lineage(&ids(&[1]), &LabelMap::new()).unwrap();

    assert_eq!(outcome.created, 0);
    assert!(tree.is_empty());
}

#[test]
fn given_empty_lineage_when_inserting_then_malformed() {
    let mut tree = TaxonTree::new();

    let err = tree.insert_lineage(&[], &LabelMap::new()).unwrap_err();

    assert_eq!(err, DomainError::EmptyLineage);
    assert!(err.is_malformed_path());
}

#[test]
fn given_lineage_not_starting_at_root_when_inserting_then_malformed() {
    let mut tree = TaxonTree::new();

    let err = tree
        .insert_lineage(&ids(&[10, 20]), &scenario_labels())
        .unwrap_err();

    assert_eq!(
        err,
        DomainError::NotRooted {
            expected: TaxId(1),
            found: TaxId(10)
        }
    );
    assert!(tree.is_empty());
}

#[test]
fn given_missing_label_when_inserting_then_rejected_and_prior_state_kept() {
    // Arrange
    let mut tree = TaxonTree::new();
    tree.insert_lineage(&ids(&[1, 10, 20, 30]), &scenario_labels())
        .unwrap();
    let before = tree.edges();

    // Act: 70 has no label
    let err = tree
        .insert_lineage(&ids(&[1, 10, 20, 40, 70]), &scenario_labels())
        .unwrap_err();

    // Assert
    assert_eq!(err, DomainError::MissingLabel(TaxId(70)));
    assert!(!err.is_malformed_path());
    assert_eq!(tree.edges(), before, "40 must not have been created");
}

#[test]
fn given_known_taxid_below_other_parent_when_inserting_then_conflict() {
    let mut tree = TaxonTree::new();
    let names = scenario_labels();
    tree.insert_lineage(&ids(&[1, 10, 20]), &names).unwrap();

    let err = tree.insert_lineage(&ids(&[1, 30, 20]), &names).unwrap_err();

    assert_eq!(
        err,
        DomainError::ParentConflict {
            taxid: TaxId(20),
            existing_parent: TaxId(10),
            requested_parent: TaxId(30),
        }
    );
    assert!(tree.find(TaxId(30)).is_none());
}

#[test]
fn given_different_label_for_known_taxid_when_inserting_then_first_label_kept() {
    // Arrange
    let mut tree = TaxonTree::new();
    tree.insert_lineage(&ids(&[1, 10, 20]), &labels(&[(10, "A"), (20, "B")]))
        .unwrap();

    // Act
    let outcome = tree
        .insert_lineage(&ids(&[1, 10, 30]), &labels(&[(10, "Alpha"), (30, "C")]))
        .unwrap();

    // Assert
    assert_eq!(tree.find_node(TaxId(10)).unwrap().label, "A");
    assert_eq!(outcome.conflicts.len(), 1);
    assert_eq!(outcome.conflicts[0].kept, "A");
    assert_eq!(outcome.conflicts[0].rejected, "Alpha");
    assert_eq!(outcome.created, 1);
}

#[test]
fn given_custom_root_when_inserting_then_lineages_anchor_there() {
    let mut tree = TaxonTree::with_root(TaxId(131567), "cellular organisms");

    tree.insert_lineage(&ids(&[131567, 2759]), &labels(&[(2759, "Eukaryota")]))
        .unwrap();

    assert_eq!(tree.root_id(), TaxId(131567));
    assert_eq!(tree.leaf_labels(), vec!["Eukaryota"]);
    assert!(tree.insert_lineage(&ids(&[1, 2759]), &LabelMap::new()).is_err());
}
