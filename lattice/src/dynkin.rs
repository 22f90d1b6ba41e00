//! Dynkin types of root bases.
//!
//! A [`DynkinCatalog`] lists every disjoint union of irreducible root systems
//! `A_n (n ≥ 1)`, `D_n (n ≥ 4)` and `E_6, E_7, E_8` up to a maximal total
//! rank, each with its Dynkin diagram. The type of a root basis is the label
//! of the catalog entry whose diagram is isomorphic to the basis' intersection
//! graph.
//!
//! # Examples
//!
//! ```
//! use ns_lattice::dynkin::{Component, DynkinCatalog};
//!
//! let catalog = DynkinCatalog::build(4);
//! let label = Component::label(&[Component::A(1), Component::A(1), Component::A(2)]);
//! assert_eq!(label, "2A1+A2");
//! assert!(catalog.entries().any(|e| e == "D4"));
//! ```

use std::fmt;

use crate::graph::LabeledGraph;

/// An irreducible root system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    /// `A_n`, a path on `n` vertices.
    A(usize),
    /// `D_n`, a path with a fork at one end.
    D(usize),
    /// `E_n` for `n` in 6, 7, 8.
    E(usize),
}

impl Component {
    /// Rank of the component.
    pub fn rank(self) -> usize {
        match self {
            Self::A(n) | Self::D(n) | Self::E(n) => n,
        }
    }

    /// True for a valid Cartan type (`D2`, `D3` and `E` outside 6..=8 are not).
    pub fn is_valid(self) -> bool {
        match self {
            Self::A(n) => n >= 1,
            Self::D(n) => n >= 4,
            Self::E(n) => (6..=8).contains(&n),
        }
    }

    /// Edges of the Dynkin diagram on vertices `0..rank`.
    pub fn edges(self) -> Vec<(usize, usize)> {
        if !self.is_valid() {
            return Vec::new();
        }
        let n = self.rank();
        let mut edges: Vec<(usize, usize)> = match self {
            Self::A(_) => (1..n).map(|i| (i - 1, i)).collect(),
            Self::D(_) => (1..n - 1).map(|i| (i - 1, i)).collect(),
            Self::E(_) => (1..n - 1).map(|i| (i - 1, i)).collect(),
        };
        match self {
            Self::A(_) => {}
            Self::D(_) => edges.push((n - 3, n - 1)),
            Self::E(_) => edges.push((2, n - 1)),
        }
        edges
    }

    /// Canonical label of a union of components, e.g. `3A1+A3` or `A0` for
    /// the empty union.
    pub fn label(components: &[Component]) -> String {
        let mut sorted = components.to_vec();
        sorted.sort();
        let mut parts: Vec<String> = Vec::new();
        let mut i = 0;
        while i < sorted.len() {
            let c = sorted[i];
            let count = sorted[i..].iter().take_while(|&&x| x == c).count();
            if count > 1 {
                parts.push(format!("{count}{c}"));
            } else {
                parts.push(c.to_string());
            }
            i += count;
        }
        if parts.is_empty() {
            "A0".to_string()
        } else {
            parts.join("+")
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A(n) => write!(f, "A{n}"),
            Self::D(n) => write!(f, "D{n}"),
            Self::E(n) => write!(f, "E{n}"),
        }
    }
}

/// Cheap isomorphism invariant used to skip catalog entries.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Profile {
    order: usize,
    edges: usize,
    degrees: Vec<usize>,
}

impl Profile {
    fn of(graph: &LabeledGraph<()>) -> Self {
        let mut degrees: Vec<usize> = (0..graph.order()).map(|v| graph.degree(v)).collect();
        degrees.sort_unstable();
        Self {
            order: graph.order(),
            edges: graph.edge_count(),
            degrees,
        }
    }
}

#[derive(Clone, Debug)]
struct Entry {
    label: String,
    graph: LabeledGraph<()>,
    profile: Profile,
}

/// Dynkin diagrams of every root system up to a maximal rank.
#[derive(Clone, Debug)]
pub struct DynkinCatalog {
    max_rank: usize,
    entries: Vec<Entry>,
}

impl DynkinCatalog {
    /// Builds the catalog of all unions of total rank `1..=max_rank`.
    pub fn build(max_rank: usize) -> Self {
        let mut irreducible = Vec::new();
        for n in 1..=max_rank {
            for c in [Component::A(n), Component::D(n), Component::E(n)] {
                if c.is_valid() {
                    irreducible.push(c);
                }
            }
        }
        irreducible.sort();
        let mut unions = Vec::new();
        collect_unions(&irreducible, 0, max_rank, &mut Vec::new(), &mut unions);

        let entries = unions
            .into_iter()
            .filter(|u| !u.is_empty())
            .map(|components| {
                let graph = union_graph(&components);
                Entry {
                    label: Component::label(&components),
                    profile: Profile::of(&graph),
                    graph,
                }
            })
            .collect();
        Self { max_rank, entries }
    }

    /// Largest total rank covered.
    pub fn max_rank(&self) -> usize {
        self.max_rank
    }

    /// Number of catalogued types.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the catalog is empty (maximal rank zero).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Labels of all catalogued types.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    /// Label of the type whose diagram is isomorphic to `graph`.
    pub fn lookup(&self, graph: &LabeledGraph<()>) -> Option<&str> {
        if graph.order() == 0 {
            return Some("A0");
        }
        let profile = Profile::of(graph);
        self.entries
            .iter()
            .filter(|e| e.profile == profile)
            .find(|e| e.graph.is_isomorphic(graph))
            .map(|e| e.label.as_str())
    }
}

/// Multisets of components in non-decreasing order with total rank at most `remaining`.
fn collect_unions(
    irreducible: &[Component],
    start: usize,
    remaining: usize,
    current: &mut Vec<Component>,
    out: &mut Vec<Vec<Component>>,
) {
    out.push(current.clone());
    for (i, &c) in irreducible.iter().enumerate().skip(start) {
        if c.rank() > remaining {
            continue;
        }
        current.push(c);
        collect_unions(irreducible, i, remaining - c.rank(), current, out);
        current.pop();
    }
}

fn union_graph(components: &[Component]) -> LabeledGraph<()> {
    let order = components.iter().map(|c| c.rank()).sum();
    let mut graph = LabeledGraph::new(order);
    let mut offset = 0;
    for c in components {
        for (i, j) in c.edges() {
            graph.set_edge(offset + i, offset + j, ());
        }
        offset += c.rank();
    }
    graph
}
