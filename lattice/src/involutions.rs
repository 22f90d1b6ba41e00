//! Unimodular involutions of the lattice (real structures).
//!
//! An involution is an integral matrix `M` with `M² = I`, `Mᵗ·J·M = J` for the
//! standard form `J`, fixing the canonical class. Acting on column vectors,
//! the involution attached to a root basis is `-1` on the span of the basis and
//! `+1` on its orthogonal complement.
//!
//! # Examples
//!
//! ```
//! use ns_lattice::div::Div;
//! use ns_lattice::involutions::{basis_to_involution, is_integral_involution};
//!
//! let r = Div::from_label("12", 3).unwrap();
//! let m = basis_to_involution(&[r.clone()], 3).unwrap();
//! assert!(is_integral_involution(&m));
//! let m = m.to_integer().unwrap();
//! assert_eq!(r.apply_linear_map(&m), -&r);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::cache_key;
use crate::classify::Classifier;
use crate::div::{labels, sorted, Div, Form};
use crate::error::{LatticeError, Result};
use crate::linalg::{integer_kernel, rank, IntMatrix, RatMatrix};

/// An involution together with the root basis spanning its (-1)-eigenspace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Involution {
    /// The matrix, acting on column vectors.
    pub matrix: IntMatrix,
    /// Root basis of the (-1)-eigenspace.
    pub md_lst: Vec<Div>,
}

impl Involution {
    /// The identity of the given rank.
    pub fn identity(rank: usize) -> Self {
        Self {
            matrix: IntMatrix::identity(rank),
            md_lst: Vec::new(),
        }
    }

    /// True for the trivial involution.
    pub fn is_identity(&self) -> bool {
        self.matrix.is_identity()
    }

    /// Rank of the lattice.
    pub fn rank(&self) -> usize {
        self.matrix.nrows()
    }
}

// ============================================================================
// Construction
// ============================================================================

/// Square matrix whose columns are the sorted `divs` followed by a basis of
/// their orthogonal complement.
///
/// # Errors
///
/// Returns [`LatticeError::DegenerateBasis`] when `divs` is empty, or when the
/// completion is rank deficient or not orthogonal to `divs`.
pub fn complete_basis(divs: &[Div]) -> Result<IntMatrix> {
    let Some(first) = divs.first() else {
        return Err(LatticeError::DegenerateBasis(
            "cannot complete an empty list".to_string(),
        ));
    };
    let n = first.rank();
    let mut divs = divs.to_vec();
    divs.sort_by(|a, b| b.cmp(a));

    let rows: Vec<Vec<i64>> = divs.iter().map(|d| d.coeffs().to_vec()).collect();
    // Euclidean kernel vectors become orthogonal for diag(1,-1,..) once the
    // first coordinate is negated.
    let ext: Vec<Vec<i64>> = integer_kernel(&rows, n)
        .ok_or_else(|| {
            LatticeError::DegenerateBasis(format!(
                "orthogonal complement of [{}] leaves the i64 range",
                divs.iter().map(|d| d.label(false)).collect::<Vec<_>>().join(", ")
            ))
        })?
        .into_iter()
        .map(|mut v| {
            if let Some(x) = v.first_mut() {
                *x = -*x;
            }
            v
        })
        .collect();
    let columns: Vec<Vec<i64>> = rows.iter().chain(&ext).cloned().collect();
    if columns.len() != n || rank(&columns) < n {
        return Err(LatticeError::DegenerateBasis(format!(
            "completion of [{}] does not have full rank",
            labels(&divs)
        )));
    }
    for e in &ext {
        let e = Div::new(e.clone());
        if let Some(d) = divs.iter().find(|d| d.intersection(&e) != 0) {
            return Err(LatticeError::DegenerateBasis(format!(
                "appended class {} is not orthogonal to {d}",
                e.label(false)
            )));
        }
    }
    IntMatrix::from_columns(&columns)
}

/// `V·D·V⁻¹` with `V = complete_basis(divs)` and `D = diag(-1,..,-1,1,..,1)`
/// (one `-1` per element of `divs`); the identity for an empty list.
///
/// # Errors
///
/// Returns [`LatticeError::DegenerateBasis`] when the basis cannot be completed.
pub fn basis_to_involution(divs: &[Div], rank: usize) -> Result<RatMatrix> {
    if divs.is_empty() {
        return Ok(RatMatrix::identity(rank));
    }
    let v = complete_basis(divs)?.to_rational();
    let mut diag = vec![1; rank];
    for x in diag.iter_mut().take(divs.len()) {
        *x = -1;
    }
    let d = IntMatrix::diagonal(&diag).to_rational();
    let v_inv = v
        .inverse()
        .ok_or_else(|| LatticeError::DegenerateBasis(format!("[{}] completes to a singular matrix", labels(divs))))?;
    Ok(&(&v * &d) * &v_inv)
}

/// True when `m` is an involution preserving the standard form, has integral
/// entries and fixes the canonical class.
pub fn is_integral_involution(m: &RatMatrix) -> bool {
    let n = m.nrows();
    if m.ncols() != n || !(m * m).is_identity() {
        return false;
    }
    let form = Form::Standard.matrix(n).to_rational();
    if &(&m.transpose() * &form) * m != form {
        return false;
    }
    let Some(m) = m.to_integer() else {
        return false;
    };
    let k = Div::canonical(n);
    k.apply_linear_map(&m) == k
}

/// Reflection in a (-2)-class: `x ↦ x + (x·r)·r`.
pub fn reflection(root: &Div) -> IntMatrix {
    let n = root.rank();
    let mut m = IntMatrix::identity(n);
    for j in 0..n {
        let w = root.intersection(&Div::basis_vector(j, n));
        if w == 0 {
            continue;
        }
        for (i, &r) in root.coeffs().iter().enumerate() {
            m.set(i, j, m.get(i, j) + w * r);
        }
    }
    m
}

/// Product of the reflections in mutually orthogonal roots.
pub fn orthogonal_involution(roots: &[Div], rank: usize) -> IntMatrix {
    roots
        .iter()
        .fold(IntMatrix::identity(rank), |acc, r| &acc * &reflection(r))
}

/// True when `m` maps the set `divs` onto itself.
pub fn preserves(m: &IntMatrix, divs: &[Div]) -> bool {
    let images: Vec<Div> = divs.iter().map(|d| d.apply_linear_map(m)).collect();
    sorted(&images) == sorted(divs)
}

/// Checks that `m` maps the set `divs` onto itself.
///
/// # Errors
///
/// Returns [`LatticeError::Preservation`] naming the set otherwise.
pub fn assert_preserves(m: &IntMatrix, divs: &[Div]) -> Result<()> {
    if preserves(m, divs) {
        Ok(())
    } else {
        Err(LatticeError::Preservation(format!("[{}]", labels(divs))))
    }
}

/// Checks that `m` fixes `d`.
///
/// # Errors
///
/// Returns [`LatticeError::Preservation`] naming the class otherwise.
pub fn assert_fixes(m: &IntMatrix, d: &Div) -> Result<()> {
    if d.apply_linear_map(m) == *d {
        Ok(())
    } else {
        Err(LatticeError::Preservation(d.label(false)))
    }
}

// ============================================================================
// Classifier operations
// ============================================================================

impl Classifier {
    /// Classified involutions of the given rank: the integral involutions of
    /// the root basis representatives, one per equivalence class. The
    /// identity comes first.
    ///
    /// # Errors
    ///
    /// Propagates basis completion and Dynkin typing errors.
    pub fn get_inv_lst(&mut self, rank: usize) -> Result<Vec<Involution>> {
        self.memo(cache_key("get_inv_lst", &[&rank]), |c| {
            let mut candidates = Vec::new();
            for md_lst in c.root_basis_classes(rank)? {
                let m = basis_to_involution(&md_lst, rank)?;
                if !is_integral_involution(&m) {
                    debug!(rank, md_lst = %labels(&md_lst), "not an integral involution");
                    continue;
                }
                let Some(matrix) = m.to_integer() else {
                    continue;
                };
                assert_fixes(&matrix, &Div::canonical(rank))?;
                candidates.push(Involution { matrix, md_lst });
            }
            let out = c.dedupe_involutions(candidates)?;
            info!(rank, involutions = out.len(), "involutions classified");
            Ok(out)
        })
    }

    /// Every involution of the given rank, each as a product of reflections in
    /// a set of mutually orthogonal positive roots. Duplicate matrices are
    /// dropped; the identity comes first.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Cache`] when the result cannot be memoized.
    pub fn all_involutions(&mut self, rank: usize) -> Result<Vec<Involution>> {
        self.memo(cache_key("all_involutions", &[&rank]), |c| {
            let tables = c.tables(rank);
            let mut sets = Vec::new();
            orthogonal_sets(&tables.positive_roots, 0, &mut Vec::new(), &mut sets);
            let identity = Involution::identity(rank);
            let mut seen = HashSet::from([identity.matrix.clone()]);
            let mut out = vec![identity];
            for md_lst in sets {
                let matrix = orthogonal_involution(&md_lst, rank);
                if seen.insert(matrix.clone()) {
                    out.push(Involution { matrix, md_lst });
                }
            }
            info!(rank, involutions = out.len(), "all involutions");
            Ok(out)
        })
    }
}

fn orthogonal_sets(roots: &[Div], start: usize, current: &mut Vec<Div>, out: &mut Vec<Vec<Div>>) {
    out.push(current.clone());
    for (i, r) in roots.iter().enumerate().skip(start) {
        if current.iter().all(|c| c.intersection(r) == 0) {
            current.push(r.clone());
            orthogonal_sets(roots, i + 1, current, out);
            current.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn divs(labels: &[&str], rank: usize) -> Vec<Div> {
        labels.iter().map(|l| Div::from_label(l, rank).unwrap()).collect()
    }

    #[test]
    fn identity_for_empty_basis() {
        let m = basis_to_involution(&[], 5).unwrap();
        assert!(m.is_identity());
        assert!(is_integral_involution(&m));
        assert!(complete_basis(&[]).is_err());
    }

    #[test]
    fn involution_of_a_conic_root() {
        let m = basis_to_involution(&divs(&["1123"], 4), 4).unwrap();
        assert!(is_integral_involution(&m));
        let expected = IntMatrix::from_rows(&[
            vec![2, 1, 1, 1],
            vec![-1, 0, -1, -1],
            vec![-1, -1, 0, -1],
            vec![-1, -1, -1, 0],
        ])
        .unwrap();
        assert_eq!(m.to_integer().unwrap(), expected);
        assert_eq!(reflection(&divs(&["1123"], 4)[0]), expected);
    }

    #[test]
    fn involution_of_a_difference_swaps_points() {
        let m = basis_to_involution(&divs(&["12"], 4), 4).unwrap().to_integer().unwrap();
        let swap = IntMatrix::from_rows(&[
            vec![1, 0, 0, 0],
            vec![0, 0, 1, 0],
            vec![0, 1, 0, 0],
            vec![0, 0, 0, 1],
        ])
        .unwrap();
        assert_eq!(m, swap);
    }

    #[test]
    fn a2_gives_no_integral_involution() {
        let m = basis_to_involution(&divs(&["12", "23"], 4), 4).unwrap();
        assert!((&m * &m).is_identity());
        assert!(!is_integral_involution(&m));
    }

    #[test]
    fn form_must_be_preserved() {
        let swap_h_e1 = IntMatrix::from_rows(&[vec![0, 1, 0], vec![1, 0, 0], vec![0, 0, 1]]).unwrap();
        assert!(!is_integral_involution(&swap_h_e1.to_rational()));
        let not_involution = IntMatrix::diagonal(&[1, 1, 2]);
        assert!(!is_integral_involution(&not_involution.to_rational()));
    }

    #[test]
    fn canonical_class_must_be_fixed() {
        let minus = IntMatrix::diagonal(&[-1, -1, -1, -1]);
        let form = Form::Standard.matrix(4);
        assert!((&minus * &minus).is_identity());
        assert_eq!(&(&minus.transpose() * &form) * &minus, form);
        assert!(!is_integral_involution(&minus.to_rational()));
    }

    #[test]
    fn oversized_completion_is_degenerate() {
        let d = vec![Div::new(vec![i64::MAX, 1, 0]), Div::new(vec![0, i64::MAX, 1])];
        assert!(matches!(complete_basis(&d), Err(LatticeError::DegenerateBasis(_))));
    }

    #[test]
    fn completion_is_orthogonal() {
        let d = divs(&["12", "1123"], 4);
        let v = complete_basis(&d).unwrap();
        assert_eq!(v.ncols(), 4);
        let cols = v.transpose().to_rows();
        for ext in &cols[2..] {
            let e = Div::new(ext.clone());
            assert!(d.iter().all(|x| x.intersection(&e) == 0));
        }
    }

    #[test]
    fn orthogonal_products_match_completion() {
        let d = divs(&["12", "1123"], 4);
        let product = orthogonal_involution(&d, 4);
        let completed = basis_to_involution(&d, 4).unwrap().to_integer().unwrap();
        assert_eq!(product, completed);
    }

    #[test]
    fn preservation_checks() {
        let m = reflection(&divs(&["12"], 4)[0]);
        let a2 = divs(&["13", "23"], 4);
        assert!(preserves(&m, &a2));
        assert!(assert_preserves(&m, &a2).is_ok());
        assert!(matches!(
            assert_preserves(&m, &divs(&["12"], 4)),
            Err(LatticeError::Preservation(_))
        ));
        assert!(assert_fixes(&m, &Div::canonical(4)).is_ok());
        assert!(assert_fixes(&m, &divs(&["12"], 4)[0]).is_err());
    }

    #[test]
    fn involutions_of_small_ranks() {
        let mut classifier = Classifier::default();
        assert_eq!(classifier.all_involutions(3).unwrap().len(), 2);
        let all = classifier.all_involutions(4).unwrap();
        assert_eq!(all.len(), 8);
        assert_eq!(all[0], Involution::identity(4));
        assert_eq!(all.iter().filter(|inv| inv.is_identity()).count(), 1);
        assert!(all.iter().all(|inv| is_integral_involution(&inv.matrix.to_rational())));

        let inv_lst = classifier.get_inv_lst(4).unwrap();
        let sizes: Vec<usize> = inv_lst.iter().map(|inv| inv.md_lst.len()).collect();
        assert_eq!(sizes, vec![0, 1, 1, 2]);
        assert_eq!(inv_lst[0].rank(), 4);
    }
}
