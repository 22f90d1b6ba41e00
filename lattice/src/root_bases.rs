//! Root bases: recognition, Dynkin typing, orbits and classification.
//!
//! A root basis is a linearly independent list of (-2)-roots whose pairwise
//! products lie in `{-2, 0, 1}`. Up to the reflection group of the ambient
//! root system (`A1`, `A1+A2`, `A4`, `D5`, `E6`, `E7`, `E8` for ranks 3 to 9)
//! there are finitely many of them; [`Classifier::get_cls_root_bases`] lists
//! one representative per class.
//!
//! # Examples
//!
//! ```
//! use ns_lattice::div::Div;
//! use ns_lattice::root_bases::is_root_basis;
//!
//! let a2: Vec<Div> = ["12", "23"].iter().map(|l| Div::from_label(l, 4).unwrap()).collect();
//! assert!(is_root_basis(&a2));
//! assert!(is_root_basis(&[]));
//! ```

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use tracing::{debug, info};

use crate::cache::cache_key;
use crate::classify::Classifier;
use crate::config::MIN_RANK;
use crate::div::{labels, sorted, Div};
use crate::error::{LatticeError, Result};
use crate::graph::{EdgeLabel, LabeledGraph};
use crate::linalg::{in_span, rank, IntMatrix};

/// Hand-picked root bases whose sub-bases reach every class of root bases.
/// Each seed label is used at the ranks able to host it.
pub const SEEDS: [&[&str]; 4] = [
    &["12", "23", "34", "45", "56", "67", "78", "1123"],
    &[
        "12", "23", "34", "45", "56", "67", "78", "1123", "1145", "1347", "1678", "1127", "1456",
        "1567", "234", "278", "308",
    ],
    &["1123", "1345", "1165", "1285", "1673", "1274", "1684", "1178"],
    &[
        "12", "23", "34", "45", "56", "67", "78", "1123", "-1145", "-1345", "-1167", "-1178",
        "-278", "-218", "-308", "218",
    ],
];

// ============================================================================
// Recognition and graphs
// ============================================================================

/// True when all pairwise products (self-products included) are in
/// `{-2, 0, 1}` and the classes are linearly independent. The empty list is a
/// root basis.
pub fn is_root_basis(divs: &[Div]) -> bool {
    let products_ok = divs
        .iter()
        .all(|a| divs.iter().all(|b| matches!(a.intersection(b), -2 | 0 | 1)));
    if !products_ok {
        return false;
    }
    let rows: Vec<Vec<i64>> = divs.iter().map(|d| d.coeffs().to_vec()).collect();
    rank(&rows) == divs.len()
}

/// Intersection graph of a root basis: distinct elements with positive
/// product are adjacent.
pub fn root_graph(divs: &[Div]) -> LabeledGraph<()> {
    let mut graph = LabeledGraph::new(divs.len());
    for (i, a) in divs.iter().enumerate() {
        for (j, b) in divs.iter().enumerate().skip(i + 1) {
            if a.intersection(b) > 0 {
                graph.set_edge(i, j, ());
            }
        }
    }
    graph
}

/// Labeled incidence graph of `divs` together with the action of `m`.
///
/// Every pair (loops included) carries its nonzero product; pairs exchanged
/// by `m`, and classes fixed by `m` on their loop, additionally carry the
/// involution link.
pub fn ext_graph(divs: &[Div], m: &IntMatrix) -> LabeledGraph<EdgeLabel> {
    let index: HashMap<&Div, usize> = divs.iter().enumerate().map(|(i, d)| (d, i)).collect();
    let images: Vec<Option<usize>> = divs
        .iter()
        .map(|d| index.get(&d.apply_linear_map(m)).copied())
        .collect();
    let mut graph = LabeledGraph::new(divs.len());
    for (i, a) in divs.iter().enumerate() {
        for (j, b) in divs.iter().enumerate().skip(i) {
            let linked = images[i] == Some(j);
            if let Some(label) = EdgeLabel::from_parts(a.intersection(b), linked) {
                graph.set_edge(i, j, label);
            }
        }
    }
    graph
}

/// The elements of `roots` orthogonal to every element of `d_lst`.
pub fn orthogonal_roots(d_lst: &[Div], roots: &[Div]) -> Vec<Div> {
    roots
        .iter()
        .filter(|r| d_lst.iter().all(|d| r.intersection(d) == 0))
        .cloned()
        .collect()
}

/// The elements of `roots` in the rational span of `d_lst`.
pub fn subspace_roots(d_lst: &[Div], roots: &[Div]) -> Vec<Div> {
    let rows: Vec<Vec<i64>> = d_lst.iter().map(|d| d.coeffs().to_vec()).collect();
    roots
        .iter()
        .filter(|r| in_span(&rows, r.coeffs()))
        .cloned()
        .collect()
}

/// Invariants deciding equivalence of root bases.
struct BasisProfile {
    len: usize,
    rank: usize,
    fam: usize,
    orthogonal: usize,
    subspace: usize,
    graph: LabeledGraph<()>,
}

impl BasisProfile {
    fn matches(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        if self.len == 0 {
            return true;
        }
        self.rank == other.rank
            && self.fam == other.fam
            && self.orthogonal == other.orthogonal
            && self.subspace == other.subspace
            && self.graph.is_isomorphic(&other.graph)
    }
}

// ============================================================================
// Classifier operations
// ============================================================================

impl Classifier {
    /// Dynkin type label of a root basis, `"A0"` for the empty one.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::UnrecognizedType`] when the intersection graph
    /// is not a Dynkin diagram.
    pub fn dynkin_type(&mut self, divs: &[Div]) -> Result<String> {
        if divs.is_empty() {
            return Ok("A0".to_string());
        }
        let catalog = self.catalog(divs.len());
        catalog
            .lookup(&root_graph(divs))
            .map(str::to_string)
            .ok_or_else(|| LatticeError::UnrecognizedType(labels(divs)))
    }

    fn profile(&mut self, d_lst: &[Div]) -> BasisProfile {
        let rank = d_lst.first().map_or(0, Div::rank);
        let (fam, orthogonal, subspace) = if d_lst.is_empty() {
            (0, 0, 0)
        } else {
            let tables = self.tables(rank);
            let fam = tables
                .fam
                .iter()
                .filter(|f| d_lst.iter().all(|d| f.intersection(d) >= 0))
                .count();
            (
                fam,
                orthogonal_roots(d_lst, &tables.positive_roots).len(),
                subspace_roots(d_lst, &tables.positive_roots).len(),
            )
        };
        BasisProfile {
            len: d_lst.len(),
            rank,
            fam,
            orthogonal,
            subspace,
            graph: root_graph(d_lst),
        }
    }

    /// True when two root bases agree in size, rank, number of compatible
    /// conic families, intersection graph, number of orthogonal positive roots
    /// and number of positive roots in their span.
    pub fn is_equal_root_lst(&mut self, a: &[Div], b: &[Div]) -> bool {
        let pa = self.profile(a);
        let pb = self.profile(b);
        pa.matches(&pb)
    }

    /// One representative per class of root bases of the given rank, ordered
    /// by size and then by Dynkin type. The empty basis comes first.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Format`] for an unusable seed label and
    /// [`LatticeError::UnrecognizedType`] when a representative cannot be typed.
    pub fn root_basis_classes(&mut self, rank: usize) -> Result<Vec<Vec<Div>>> {
        self.memo(cache_key("get_cls_root_bases", &[&rank]), |c| {
            c.classify_root_bases(rank)
        })
    }

    /// Representatives of root bases for every rank in `3..=max_rank`.
    ///
    /// # Errors
    ///
    /// Propagates errors of [`root_basis_classes`](Self::root_basis_classes).
    pub fn get_cls_root_bases(&mut self, max_rank: usize) -> Result<BTreeMap<usize, Vec<Vec<Div>>>> {
        (MIN_RANK..=max_rank)
            .map(|rank| Ok((rank, self.root_basis_classes(rank)?)))
            .collect()
    }

    fn classify_root_bases(&mut self, rank: usize) -> Result<Vec<Vec<Div>>> {
        info!(rank, "classifying root bases");
        let mut classes: Vec<Vec<Div>> = vec![Vec::new()];
        let mut profiles: Vec<BasisProfile> = vec![self.profile(&[])];
        for seed in SEEDS {
            let mut z = Vec::new();
            for label in seed {
                if Div::min_rank(label)? <= rank {
                    z.push(Div::from_label(label, rank)?);
                }
            }
            debug!(rank, seed = %labels(&z), "seed");
            let mut eta = self.eta(rank.saturating_sub(1));
            for size in 1..rank {
                eta.update(&format!("rank={rank} size={size}"));
                for idx in combinations(z.len(), size) {
                    let candidate: Vec<Div> = idx.iter().map(|&i| z[i].clone()).collect();
                    if !is_root_basis(&candidate) {
                        continue;
                    }
                    let profile = self.profile(&candidate);
                    if profiles.iter().any(|p| p.matches(&profile)) {
                        continue;
                    }
                    profiles.push(profile);
                    classes.push(candidate);
                }
            }
        }
        let mut keyed = Vec::with_capacity(classes.len());
        for d_lst in classes {
            let dynkin_type = self.dynkin_type(&d_lst)?;
            keyed.push(((d_lst.len(), dynkin_type), d_lst));
        }
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        info!(rank, classes = keyed.len(), "root bases classified");
        Ok(keyed.into_iter().map(|(_, d_lst)| d_lst).collect())
    }

    /// Every root basis of the given rank, as the union of the reflection
    /// orbits of the class representatives. With `positive` only bases made of
    /// positive roots are kept. Each basis is sorted.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::DegenerateBasis`] when a reflected basis is not a
    /// root basis, and propagates errors of the classification.
    pub fn get_root_bases(&mut self, rank: usize, positive: bool) -> Result<Vec<Vec<Div>>> {
        self.memo(cache_key("get_root_bases", &[&rank, &positive]), |c| {
            let reps = c.root_basis_classes(rank)?;
            let tables = c.tables(rank);
            let mut seen: HashSet<Vec<Div>> = HashSet::new();
            let mut queue: VecDeque<Vec<Div>> = VecDeque::new();
            for rep in reps {
                let start = sorted(&rep);
                if seen.insert(start.clone()) {
                    queue.push_back(start);
                }
            }
            let mut out = Vec::new();
            while let Some(basis) = queue.pop_front() {
                for r in &tables.positive_roots {
                    let image: Vec<Div> = sorted(&basis.iter().map(|d| d.reflect(r)).collect::<Vec<_>>());
                    if seen.contains(&image) {
                        continue;
                    }
                    if !is_root_basis(&image) {
                        return Err(LatticeError::DegenerateBasis(format!(
                            "reflection of [{}] in {r} is not a root basis",
                            labels(&basis)
                        )));
                    }
                    seen.insert(image.clone());
                    queue.push_back(image);
                }
                out.push(basis);
            }
            if positive {
                let pos: HashSet<&Div> = tables.positive_roots.iter().collect();
                out.retain(|b| b.iter().all(|d| pos.contains(d)));
            }
            out.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
            debug!(rank, positive, bases = out.len(), "root bases");
            Ok(out)
        })
    }
}

/// Index subsets of `0..n` with `k` elements, in lexicographic order.
fn combinations(n: usize, k: usize) -> Vec<Vec<usize>> {
    fn go(n: usize, k: usize, start: usize, current: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if current.len() == k {
            out.push(current.clone());
            return;
        }
        for i in start..n {
            if n - i < k - current.len() {
                break;
            }
            current.push(i);
            go(n, k, i + 1, current, out);
            current.pop();
        }
    }
    let mut out = Vec::new();
    go(n, k, 0, &mut Vec::new(), &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn divs(labels: &[&str], rank: usize) -> Vec<Div> {
        labels.iter().map(|l| Div::from_label(l, rank).unwrap()).collect()
    }

    #[test]
    fn root_basis_recognition() {
        assert!(is_root_basis(&[]));
        assert!(is_root_basis(&divs(&["12", "23", "1123"], 4)));
        // 12 and 13 have product -1.
        assert!(!is_root_basis(&divs(&["12", "13"], 4)));
        // 12 + 23 = 13: dependent.
        assert!(!is_root_basis(&divs(&["12", "23", "-13"], 4)));
        assert!(!is_root_basis(&divs(&["12", "12"], 4)));
    }

    #[test]
    fn dynkin_types() {
        let mut classifier = Classifier::default();
        assert_eq!(classifier.dynkin_type(&[]).unwrap(), "A0");
        assert_eq!(classifier.dynkin_type(&divs(&["12", "23", "1123"], 4)).unwrap(), "A1+A2");
        assert_eq!(
            classifier
                .dynkin_type(&divs(&["1145", "1123", "23", "45", "56", "78"], 9))
                .unwrap(),
            "3A1+A3"
        );
        assert_eq!(
            classifier.dynkin_type(&divs(&["12", "23", "34", "1125"], 6)).unwrap(),
            "D4"
        );
    }

    #[test]
    fn non_dynkin_graph_is_rejected() {
        let mut classifier = Classifier::default();
        // Affine A3: the four roots form a cycle.
        let cycle = divs(&["12", "23", "34", "-14"], 6);
        assert!(matches!(
            classifier.dynkin_type(&cycle),
            Err(LatticeError::UnrecognizedType(_))
        ));
    }

    #[test]
    fn orthogonal_and_subspace_roots() {
        let roots = divs(&["12", "13", "23", "1123"], 4);
        let a1 = divs(&["12"], 4);
        assert_eq!(orthogonal_roots(&a1, &roots), divs(&["1123"], 4));
        assert_eq!(subspace_roots(&a1, &roots), divs(&["12"], 4));
        let a2 = divs(&["12", "23"], 4);
        assert_eq!(subspace_roots(&a2, &roots).len(), 3);
        assert_eq!(orthogonal_roots(&[], &roots).len(), 4);
        assert!(subspace_roots(&[], &roots).is_empty());
    }

    #[test]
    fn ext_graph_links_exchanged_classes() {
        // Swap of e1 and e2 at rank 3.
        let m = IntMatrix::from_rows(&[vec![1, 0, 0], vec![0, 0, 1], vec![0, 1, 0]]).unwrap();
        let lines = vec![
            Div::from_label("e1", 3).unwrap(),
            Div::from_label("e2", 3).unwrap(),
            Div::from_label("h-e1-e2", 3).unwrap(),
        ];
        let g = ext_graph(&lines, &m);
        assert_eq!(g.edge(0, 1), Some(&EdgeLabel::InvolutionLink));
        assert_eq!(g.edge(2, 2), Some(&EdgeLabel::IntersectionAndLink(-1)));
        assert_eq!(g.edge(0, 0), Some(&EdgeLabel::Intersection(-1)));
        assert_eq!(g.edge(0, 2), Some(&EdgeLabel::Intersection(1)));
    }

    #[test]
    fn equivalence_of_root_bases() {
        let mut classifier = Classifier::default();
        let a = divs(&["12"], 4);
        let b = divs(&["13"], 4);
        let c = divs(&["1123"], 4);
        assert!(classifier.is_equal_root_lst(&a, &b));
        assert!(!classifier.is_equal_root_lst(&a, &c));
        assert!(classifier.is_equal_root_lst(&[], &[]));
        assert!(!classifier.is_equal_root_lst(&[], &a));
    }

    #[test]
    fn combinations_in_lexicographic_order() {
        assert_eq!(
            combinations(4, 2),
            vec![vec![0, 1], vec![0, 2], vec![0, 3], vec![1, 2], vec![1, 3], vec![2, 3]]
        );
        assert_eq!(combinations(2, 3).len(), 0);
    }
}
