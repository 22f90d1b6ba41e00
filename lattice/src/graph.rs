//! Small labeled graphs and isomorphism testing.
//!
//! Graphs here have at most a few hundred vertices (the lines of a degree one
//! del Pezzo surface plus a root basis), so a dense label matrix and an
//! individualization-refinement search are enough. Loops are allowed and act
//! as vertex colors.

use std::collections::BTreeMap;
use std::hash::Hash;

/// Edge label of the extended incidence graph.
///
/// The involution relation has its own variants so that it can never be
/// mistaken for an intersection number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeLabel {
    /// Nonzero intersection product.
    Intersection(i64),
    /// The involution maps one endpoint to the other; the product is zero.
    InvolutionLink,
    /// Both of the above: nonzero product and linked by the involution.
    IntersectionAndLink(i64),
}

impl EdgeLabel {
    /// Label for a pair with the given product and involution relation, or
    /// `None` when the pair is not adjacent.
    pub fn from_parts(product: i64, linked: bool) -> Option<Self> {
        match (product, linked) {
            (0, false) => None,
            (0, true) => Some(Self::InvolutionLink),
            (w, false) => Some(Self::Intersection(w)),
            (w, true) => Some(Self::IntersectionAndLink(w)),
        }
    }
}

/// Undirected graph with optional labels on vertex pairs (including loops).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabeledGraph<L> {
    order: usize,
    cells: Vec<Option<L>>,
}

impl<L: Clone + Ord + Hash> LabeledGraph<L> {
    /// Graph on `order` vertices without edges.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            cells: vec![None; order * order],
        }
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Sets the label between `i` and `j` in both directions (`i == j` is a loop).
    pub fn set_edge(&mut self, i: usize, j: usize, label: L) {
        self.cells[i * self.order + j] = Some(label.clone());
        self.cells[j * self.order + i] = Some(label);
    }

    /// Label between `i` and `j`, if any.
    pub fn edge(&self, i: usize, j: usize) -> Option<&L> {
        self.cells[i * self.order + j].as_ref()
    }

    /// Number of non-loop edges.
    pub fn edge_count(&self) -> usize {
        (0..self.order)
            .map(|i| (i + 1..self.order).filter(|&j| self.edge(i, j).is_some()).count())
            .sum()
    }

    /// Number of non-loop edges at `i`.
    pub fn degree(&self, i: usize) -> usize {
        (0..self.order)
            .filter(|&j| j != i && self.edge(i, j).is_some())
            .count()
    }

    /// Label-preserving isomorphism test.
    pub fn is_isomorphic(&self, other: &Self) -> bool {
        if self.order != other.order || self.edge_count() != other.edge_count() {
            return false;
        }
        let mut palette = BTreeMap::new();
        let initial_a: Vec<usize> = (0..self.order)
            .map(|v| palette_id(&mut palette, self.edge(v, v).cloned()))
            .collect();
        let initial_b: Vec<usize> = (0..other.order)
            .map(|v| palette_id(&mut palette, other.edge(v, v).cloned()))
            .collect();
        if histogram(&initial_a) != histogram(&initial_b) {
            return false;
        }
        match refine(self, other, initial_a, initial_b) {
            Some((a, b)) => search(self, other, a, b),
            None => false,
        }
    }
}

fn palette_id<K: Ord>(palette: &mut BTreeMap<K, usize>, key: K) -> usize {
    let next = palette.len();
    *palette.entry(key).or_insert(next)
}

fn histogram(colors: &[usize]) -> BTreeMap<usize, usize> {
    let mut h = BTreeMap::new();
    for &c in colors {
        *h.entry(c).or_insert(0) += 1;
    }
    h
}

type Signature<L> = (usize, Vec<(L, usize)>);

fn signatures<L: Clone + Ord + Hash>(g: &LabeledGraph<L>, colors: &[usize]) -> Vec<Signature<L>> {
    (0..g.order)
        .map(|v| {
            let mut nbrs: Vec<(L, usize)> = (0..g.order)
                .filter(|&u| u != v)
                .filter_map(|u| g.edge(v, u).map(|l| (l.clone(), colors[u])))
                .collect();
            nbrs.sort();
            (colors[v], nbrs)
        })
        .collect()
}

/// Joint color refinement of both graphs over a shared palette. Returns
/// `None` as soon as the color histograms differ.
fn refine<L: Clone + Ord + Hash>(
    a: &LabeledGraph<L>,
    b: &LabeledGraph<L>,
    mut ca: Vec<usize>,
    mut cb: Vec<usize>,
) -> Option<(Vec<usize>, Vec<usize>)> {
    let mut classes = histogram(&ca).len();
    loop {
        let sa = signatures(a, &ca);
        let sb = signatures(b, &cb);
        let mut palette: BTreeMap<&Signature<L>, usize> = BTreeMap::new();
        for s in sa.iter().chain(sb.iter()) {
            palette.insert(s, 0);
        }
        for (id, v) in palette.values_mut().enumerate() {
            *v = id;
        }
        let na: Vec<usize> = sa.iter().map(|s| palette[s]).collect();
        let nb: Vec<usize> = sb.iter().map(|s| palette[s]).collect();
        let ha = histogram(&na);
        if ha != histogram(&nb) {
            return None;
        }
        ca = na;
        cb = nb;
        if ha.len() == classes {
            return Some((ca, cb));
        }
        classes = ha.len();
    }
}

fn search<L: Clone + Ord + Hash>(
    a: &LabeledGraph<L>,
    b: &LabeledGraph<L>,
    ca: Vec<usize>,
    cb: Vec<usize>,
) -> bool {
    let hist = histogram(&ca);
    let target = hist
        .iter()
        .filter(|(_, &size)| size > 1)
        .min_by_key(|(_, &size)| size)
        .map(|(&color, _)| color);
    let Some(color) = target else {
        return verify(a, b, &ca, &cb);
    };
    let fresh = hist.keys().max().map_or(0, |m| m + 1);
    let Some(v) = ca.iter().position(|&c| c == color) else {
        return false;
    };
    for u in (0..b.order).filter(|&u| cb[u] == color) {
        let mut ca2 = ca.clone();
        let mut cb2 = cb.clone();
        ca2[v] = fresh;
        cb2[u] = fresh;
        if let Some((ra, rb)) = refine(a, b, ca2, cb2) {
            if search(a, b, ra, rb) {
                return true;
            }
        }
    }
    false
}

/// Checks that the bijection induced by a discrete coloring preserves labels.
fn verify<L: Clone + Ord + Hash>(a: &LabeledGraph<L>, b: &LabeledGraph<L>, ca: &[usize], cb: &[usize]) -> bool {
    let by_color: BTreeMap<usize, usize> = cb.iter().enumerate().map(|(u, &c)| (c, u)).collect();
    let Some(map) = ca
        .iter()
        .map(|c| by_color.get(c).copied())
        .collect::<Option<Vec<usize>>>()
    else {
        return false;
    };
    (0..a.order).all(|i| (0..a.order).all(|j| a.edge(i, j) == b.edge(map[i], map[j])))
}
