//! Root basis and involution tables.

use ns_lattice::div::Div;
use ns_lattice::involutions::{basis_to_involution, is_integral_involution, preserves};
use ns_lattice::root_bases::is_root_basis;
use ns_lattice::{get_base_changes, Classifier};

#[test]
fn root_basis_classes_of_low_rank() {
    let mut classifier = Classifier::default();
    let cls = classifier.get_cls_root_bases(4).unwrap();
    assert_eq!(cls[&3].len(), 2);
    assert_eq!(cls[&4].len(), 6);

    let mut types = Vec::new();
    for d_lst in &cls[&4] {
        types.push(classifier.dynkin_type(d_lst).unwrap());
    }
    assert_eq!(types, vec!["A0", "A1", "A1", "2A1", "A2", "A1+A2"]);
    assert!(!classifier.is_equal_root_lst(&cls[&4][1], &cls[&4][2]));
}

#[test]
fn representatives_are_root_bases() {
    let mut classifier = Classifier::default();
    for rank in 3..=6 {
        for d_lst in classifier.root_basis_classes(rank).unwrap() {
            assert!(is_root_basis(&d_lst));
            assert!(d_lst.len() < rank);
            assert!(d_lst.iter().all(|d| d.rank() == rank));
        }
    }
}

#[test]
fn reflection_orbits() {
    let mut classifier = Classifier::default();
    assert_eq!(classifier.get_root_bases(3, false).unwrap().len(), 3);
    assert_eq!(classifier.get_root_bases(3, true).unwrap().len(), 2);
    let positive = classifier.get_root_bases(4, true).unwrap();
    assert_eq!(positive.len(), 10);
    assert!(positive[0].is_empty());
    assert!(positive.windows(2).all(|w| w[0].len() <= w[1].len()));
    // Recomputing is answered from the cache and gives the same list.
    assert_eq!(classifier.get_root_bases(4, true).unwrap(), positive);
}

#[test]
fn every_classified_involution_is_integral() {
    let mut classifier = Classifier::default();
    for rank in 3..=6 {
        let inv_lst = classifier.get_inv_lst(rank).unwrap();
        assert!(inv_lst[0].is_identity());
        for inv in &inv_lst {
            let m = basis_to_involution(&inv.md_lst, rank).unwrap();
            assert!(is_integral_involution(&m));
            assert_eq!(m.to_integer().as_ref(), Some(&inv.matrix));
            assert!(preserves(&inv.matrix, &[Div::canonical(rank)]));
        }
    }
}

#[test]
fn brute_force_involutions_contain_the_classified_ones() {
    let mut classifier = Classifier::default();
    let all = classifier.all_involutions(5).unwrap();
    for inv in classifier.get_inv_lst(5).unwrap() {
        assert!(all.iter().any(|a| a.matrix == inv.matrix));
    }
}

#[test]
fn contraction_bases_of_a_smooth_surface() {
    // Degree 6: six (-1)-curves forming a hexagon, contracted pairwise.
    let mats = get_base_changes(4, &[]).unwrap();
    assert!(!mats.is_empty());
    for b in &mats {
        let k = Div::canonical(4).basis_change(b).unwrap();
        assert_eq!(k.self_intersection(), 6);
    }
}
