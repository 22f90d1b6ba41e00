//! End-to-end classification of enhanced lattices.

use ns_lattice::{Classifier, ClassifierConfig, DPLattice, ToolCache};

fn types(classes: &[DPLattice]) -> Vec<(&str, &str)> {
    classes.iter().map(|c| (c.mtype(), c.dynkin_type())).collect()
}

fn assert_same_classes(a: &[DPLattice], b: &[DPLattice]) {
    assert_eq!(a.len(), b.len());
    for x in a {
        assert!(b.iter().any(|y| x.is_equivalent(y)), "no counterpart for\n{x}");
    }
    for y in b {
        assert!(a.iter().any(|x| x.is_equivalent(y)), "no counterpart for\n{y}");
    }
}

#[test]
fn rank_three() {
    let mut classifier = Classifier::default();
    let classes = classifier.get_cls(3).unwrap();
    assert_eq!(types(&classes), vec![("A0", "A0"), ("A0", "A1"), ("A1", "A0")]);
}

#[test]
fn rank_four() {
    let mut classifier = Classifier::default();
    let classes = classifier.get_cls(4).unwrap();
    assert_eq!(
        types(&classes),
        vec![
            ("A0", "A0"),
            ("A0", "A1"),
            ("A0", "A1"),
            ("A0", "2A1"),
            ("A0", "A2"),
            ("A0", "A1+A2"),
            ("A1", "A0"),
            ("A1", "A0"),
            ("A1", "A1"),
            ("A1", "A1"),
            ("A1", "A2"),
            ("2A1", "A0"),
        ]
    );
    assert!(classes.iter().all(|c| c.rank() == 4 && c.degree() == 6));
}

#[test]
fn classes_are_pairwise_inequivalent() {
    let mut classifier = Classifier::default();
    let classes = classifier.get_cls(5).unwrap();
    for (i, a) in classes.iter().enumerate() {
        for b in &classes[i + 1..] {
            assert!(!a.is_equivalent(b));
        }
    }
}

#[test]
fn output_is_sorted() {
    let mut classifier = Classifier::default();
    let classes = classifier.get_cls(5).unwrap();
    for pair in classes.windows(2) {
        assert_ne!(pair[0].compare(&pair[1]), std::cmp::Ordering::Greater);
    }
}

#[test]
fn fast_and_provable_agree() {
    let mut classifier = Classifier::default();
    for rank in 3..=6 {
        let fast = classifier.get_cls(rank).unwrap();
        let provable = classifier.get_cls_provable(rank).unwrap();
        assert_same_classes(&fast, &provable);
    }
}

#[test]
fn fast_and_provable_agree_at_rank_seven() {
    let mut classifier = Classifier::default();
    let fast = classifier.get_cls(7).unwrap();
    let provable = classifier.get_cls_provable(7).unwrap();
    assert_same_classes(&fast, &provable);
}

#[test]
fn recomputation_after_clear_is_equivalent() {
    let mut classifier = Classifier::default();
    let first = classifier.get_cls(5).unwrap();
    classifier.clear_cache();
    assert!(classifier.cache().is_empty());
    let second = classifier.get_cls(5).unwrap();
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second) {
        assert!(a.is_equivalent(b));
    }
}

#[test]
fn real_dp_classification_by_rank() {
    let mut classifier = Classifier::default();
    let by_rank = classifier.get_cls_real_dp(4, false).unwrap();
    assert_eq!(by_rank.keys().copied().collect::<Vec<_>>(), vec![3, 4]);
    assert_eq!(by_rank[&3].len(), 3);
    assert_eq!(by_rank[&4].len(), 12);

    let provable = classifier.get_cls_real_dp(3, true).unwrap();
    assert_eq!(types(&provable[&3]), types(&by_rank[&3]));
}

#[test]
fn persisted_cache_answers_without_recomputation() {
    let path = std::env::temp_dir().join(format!("ns-lattice-classify-{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);
    let config = ClassifierConfig {
        cache_path: Some(path.clone()),
        ..ClassifierConfig::default()
    };

    let mut classifier = Classifier::open(config.clone()).unwrap();
    let computed = classifier.get_cls(4).unwrap();
    classifier.save_cache().unwrap();

    let cache = ToolCache::open(&path).unwrap();
    assert!(cache.contains("get_cls(4)"));
    assert!(cache.contains("get_inv_lst(4)"));
    let mut reopened = Classifier::with_cache(config, cache);
    let loaded = reopened.get_cls(4).unwrap();
    assert_eq!(types(&loaded), types(&computed));
    assert_same_classes(&loaded, &computed);
    let _ = std::fs::remove_file(&path);
}
