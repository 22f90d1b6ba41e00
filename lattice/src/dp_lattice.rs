//! Enhanced Néron-Severi lattices of real weak del Pezzo surfaces.
//!
//! A [`DPLattice`] is determined by a root basis of effective (-2)-classes
//! (`d_lst`), an involution `M` preserving it, and the root basis `Md_lst` of
//! the (-1)-eigenspace of `M`. Everything else is derived at construction:
//! the indecomposable (-1)-classes (lines), the conic families, their real
//! subsets, the roots orthogonal to and spanned by `d_lst`, and the Dynkin
//! types. The incidence graph used for equivalence is built on first use.
//!
//! Two lattices are equivalent when their counts and singularity types agree
//! and their incidence graphs (with involution links) are isomorphic. The
//! Dynkin type of the real structure is not part of the equivalence but does
//! take part in the ordering, so equivalent lattices may still sort apart.

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classify::RankTables;
use crate::div::Div;
use crate::div_set::nonnegative;
use crate::error::{LatticeError, Result};
use crate::graph::{EdgeLabel, LabeledGraph};
use crate::linalg::IntMatrix;
use crate::root_bases::{ext_graph, orthogonal_roots, subspace_roots};

/// Cheap invariants compared before graph isomorphism.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct LatticeSignature {
    counts: [usize; 8],
    dynkin_type: String,
}

/// An enhanced lattice: root basis, involution and derived class sets.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DPLattice {
    d_lst: Vec<Div>,
    md_lst: Vec<Div>,
    m: IntMatrix,
    #[serde(rename = "type")]
    dynkin_type: String,
    mtype: String,
    m1_lst: Vec<Div>,
    fam_lst: Vec<Div>,
    real_d_lst: Vec<Div>,
    real_m1_lst: Vec<Div>,
    real_fam_lst: Vec<Div>,
    or_lst: Vec<Div>,
    sr_lst: Vec<Div>,
    #[serde(skip)]
    graph: OnceCell<LabeledGraph<EdgeLabel>>,
}

impl DPLattice {
    pub(crate) fn derive(
        d_lst: Vec<Div>,
        md_lst: Vec<Div>,
        m: IntMatrix,
        dynkin_type: String,
        mtype: String,
        tables: &RankTables,
    ) -> Self {
        let m1_lst = nonnegative(&tables.m1, &d_lst);
        let fam_lst = nonnegative(&tables.fam, &d_lst);
        let real = |divs: &[Div]| -> Vec<Div> {
            divs.iter()
                .filter(|d| d.apply_linear_map(&m) == **d)
                .cloned()
                .collect()
        };
        let real_d_lst = real(&d_lst);
        let real_m1_lst = real(&m1_lst);
        let real_fam_lst = real(&fam_lst);
        let or_lst = orthogonal_roots(&d_lst, &tables.positive_roots);
        let sr_lst = subspace_roots(&d_lst, &tables.positive_roots);
        Self {
            d_lst,
            md_lst,
            m,
            dynkin_type,
            mtype,
            m1_lst,
            fam_lst,
            real_d_lst,
            real_m1_lst,
            real_fam_lst,
            or_lst,
            sr_lst,
            graph: OnceCell::new(),
        }
    }

    /// The same lattice expressed in the basis given by the rows of `b`.
    ///
    /// The involution becomes `(Bᵗ)⁻¹·M·Bᵗ` and every class list is mapped
    /// through [`Div::basis_change`], so the classes carry the Gram matrix of
    /// the new basis. Types are kept as they are.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::DegenerateBasis`] when `b` is singular or not
    /// unimodular on the classes of this lattice.
    pub fn change_basis(&self, b: &IntMatrix) -> Result<Self> {
        let bt = b.transpose();
        let singular = || LatticeError::DegenerateBasis("basis change matrix is singular".into());
        let bt_inv = bt.to_rational().inverse().ok_or_else(singular)?;
        let m = (&(&bt_inv * &self.m.to_rational()) * &bt.to_rational())
            .to_integer()
            .ok_or_else(|| {
                LatticeError::DegenerateBasis("involution is not integral in the new basis".into())
            })?;
        let change = |divs: &[Div]| -> Result<Vec<Div>> {
            divs.iter().map(|d| d.basis_change(b)).collect()
        };
        Ok(Self {
            d_lst: change(&self.d_lst)?,
            md_lst: change(&self.md_lst)?,
            m,
            dynkin_type: self.dynkin_type.clone(),
            mtype: self.mtype.clone(),
            m1_lst: change(&self.m1_lst)?,
            fam_lst: change(&self.fam_lst)?,
            real_d_lst: change(&self.real_d_lst)?,
            real_m1_lst: change(&self.real_m1_lst)?,
            real_fam_lst: change(&self.real_fam_lst)?,
            or_lst: change(&self.or_lst)?,
            sr_lst: change(&self.sr_lst)?,
            graph: OnceCell::new(),
        })
    }

    /// Rank of the lattice.
    pub fn rank(&self) -> usize {
        self.m.nrows()
    }

    /// Degree of the surface, `10 - rank`.
    pub fn degree(&self) -> usize {
        10usize.saturating_sub(self.rank())
    }

    /// Effective (-2)-classes (singularities).
    pub fn d_lst(&self) -> &[Div] {
        &self.d_lst
    }

    /// Root basis of the (-1)-eigenspace of the involution.
    pub fn md_lst(&self) -> &[Div] {
        &self.md_lst
    }

    /// The involution, acting on column vectors.
    pub fn matrix(&self) -> &IntMatrix {
        &self.m
    }

    /// Dynkin type of `d_lst`.
    pub fn dynkin_type(&self) -> &str {
        &self.dynkin_type
    }

    /// Dynkin type of `md_lst`.
    pub fn mtype(&self) -> &str {
        &self.mtype
    }

    /// Indecomposable (-1)-classes.
    pub fn m1_lst(&self) -> &[Div] {
        &self.m1_lst
    }

    /// Classes of conic families.
    pub fn fam_lst(&self) -> &[Div] {
        &self.fam_lst
    }

    /// Singularities fixed by the involution.
    pub fn real_d_lst(&self) -> &[Div] {
        &self.real_d_lst
    }

    /// Lines fixed by the involution.
    pub fn real_m1_lst(&self) -> &[Div] {
        &self.real_m1_lst
    }

    /// Conic families fixed by the involution.
    pub fn real_fam_lst(&self) -> &[Div] {
        &self.real_fam_lst
    }

    /// Positive roots orthogonal to `d_lst`.
    pub fn or_lst(&self) -> &[Div] {
        &self.or_lst
    }

    /// Positive roots in the span of `d_lst`.
    pub fn sr_lst(&self) -> &[Div] {
        &self.sr_lst
    }

    /// At least two real conic families and no real line.
    pub fn is_celestial(&self) -> bool {
        self.real_fam_lst.len() >= 2 && self.real_m1_lst.is_empty()
    }

    /// True when two real conic families meet once, i.e. the surface has a
    /// real fibration structure like P¹×P¹.
    pub fn has_real_p1xp1(&self) -> bool {
        self.real_fam_lst.iter().enumerate().any(|(i, a)| {
            self.real_fam_lst[i + 1..]
                .iter()
                .any(|b| a.intersection(b) == 1)
        })
    }

    /// Extended incidence graph over `d_lst ∪ m1_lst`.
    pub fn graph(&self) -> &LabeledGraph<EdgeLabel> {
        self.graph.get_or_init(|| {
            let vertices: Vec<Div> = self.d_lst.iter().chain(&self.m1_lst).cloned().collect();
            ext_graph(&vertices, &self.m)
        })
    }

    fn counts(&self) -> [usize; 8] {
        [
            self.d_lst.len(),
            self.m1_lst.len(),
            self.fam_lst.len(),
            self.real_d_lst.len(),
            self.real_m1_lst.len(),
            self.real_fam_lst.len(),
            self.or_lst.len(),
            self.sr_lst.len(),
        ]
    }

    pub(crate) fn signature(&self) -> LatticeSignature {
        LatticeSignature {
            counts: self.counts(),
            dynkin_type: self.dynkin_type.clone(),
        }
    }

    /// Lattice equivalence: equal counts (singularities, lines, families,
    /// their real subsets, orthogonal and spanned roots), equal singularity
    /// type and isomorphic incidence graphs. The real structure type is
    /// ignored.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.rank() == other.rank()
            && self.counts() == other.counts()
            && self.dynkin_type == other.dynkin_type
            && self.graph().is_isomorphic(other.graph())
    }

    /// Order used for classification output: rank, size and type of the real
    /// structure, size and type of the singularities, then the counts of
    /// families, lines, real singularities, real lines, real families,
    /// orthogonal roots and spanned roots.
    pub fn compare(&self, other: &Self) -> Ordering {
        let tail = |x: &Self| {
            [
                x.fam_lst.len(),
                x.m1_lst.len(),
                x.real_d_lst.len(),
                x.real_m1_lst.len(),
                x.real_fam_lst.len(),
                x.or_lst.len(),
                x.sr_lst.len(),
            ]
        };
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.md_lst.len().cmp(&other.md_lst.len()))
            .then_with(|| self.mtype.cmp(&other.mtype))
            .then_with(|| self.d_lst.len().cmp(&other.d_lst.len()))
            .then_with(|| self.dynkin_type.cmp(&other.dynkin_type))
            .then_with(|| tail(self).cmp(&tail(other)))
    }
}

impl PartialEq for DPLattice {
    fn eq(&self, other: &Self) -> bool {
        self.is_equivalent(other)
    }
}

fn write_classes(f: &mut fmt::Formatter<'_>, title: &str, divs: &[Div], real: usize, m: &IntMatrix) -> fmt::Result {
    writeln!(f, "{title}:")?;
    for d in divs {
        writeln!(f, "\t{d}  --->  {}", d.apply_linear_map(m))?;
    }
    writeln!(f, "\t#real = {real}")
}

impl fmt::Display for DPLattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(50);
        writeln!(f, "{rule}")?;
        writeln!(f, "Degree          = {}", self.degree())?;
        writeln!(f, "Rank            = {}", self.rank())?;
        writeln!(f, "Real structure  = {}", self.mtype)?;
        writeln!(f, "Singularities   = {}", self.dynkin_type)?;
        writeln!(f, "Real involution:")?;
        for i in 0..self.rank() {
            let b = Div::basis_vector(i, self.rank());
            writeln!(f, "\t{}  --->  {}", b.label(false), b.apply_linear_map(&self.m).label(false))?;
        }
        write_classes(f, "Indecomposable (-2)-classes", &self.d_lst, self.real_d_lst.len(), &self.m)?;
        write_classes(f, "Indecomposable (-1)-classes", &self.m1_lst, self.real_m1_lst.len(), &self.m)?;
        write_classes(f, "Classes of conical families", &self.fam_lst, self.real_fam_lst.len(), &self.m)?;
        writeln!(f, "{rule}")
    }
}
