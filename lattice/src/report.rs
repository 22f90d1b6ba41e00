//! Classification tables: one row per enhanced lattice, rendered as text.

use std::fmt::Write as _;

use serde::Serialize;

use crate::dp_lattice::DPLattice;

const HEADERS: [&str; 10] = [
    "rank", "degree", "Mtype", "type", "lines", "real lines", "families", "real families",
    "real roots", "celestial",
];

/// Summary of a single classified lattice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassRow {
    /// Rank of the lattice.
    pub rank: usize,
    /// Degree of the surface, `10 - rank`.
    pub degree: usize,
    /// Dynkin type of the root basis of the involution.
    pub mtype: String,
    /// Dynkin type of the singularities.
    #[serde(rename = "type")]
    pub dynkin_type: String,
    /// Number of indecomposable (-1)-classes.
    pub lines: usize,
    /// Number of real indecomposable (-1)-classes.
    pub real_lines: usize,
    /// Number of conic families.
    pub families: usize,
    /// Number of real conic families.
    pub real_families: usize,
    /// Number of real effective (-2)-classes.
    pub real_roots: usize,
    /// Whether the surface is celestial.
    pub celestial: bool,
}

impl ClassRow {
    /// Collects the row for `lattice`.
    pub fn from_lattice(lattice: &DPLattice) -> Self {
        Self {
            rank: lattice.rank(),
            degree: lattice.degree(),
            mtype: lattice.mtype().to_string(),
            dynkin_type: lattice.dynkin_type().to_string(),
            lines: lattice.m1_lst().len(),
            real_lines: lattice.real_m1_lst().len(),
            families: lattice.fam_lst().len(),
            real_families: lattice.real_fam_lst().len(),
            real_roots: lattice.real_d_lst().len(),
            celestial: lattice.is_celestial(),
        }
    }

    fn cells(&self) -> [String; 10] {
        [
            self.rank.to_string(),
            self.degree.to_string(),
            self.mtype.clone(),
            self.dynkin_type.clone(),
            self.lines.to_string(),
            self.real_lines.to_string(),
            self.families.to_string(),
            self.real_families.to_string(),
            self.real_roots.to_string(),
            if self.celestial { "yes" } else { "no" }.to_string(),
        ]
    }
}

/// Ordered collection of rows.
#[derive(Debug, Clone)]
pub struct ClassificationReport {
    /// Rows in insertion order.
    pub rows: Vec<ClassRow>,
}

impl ClassificationReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Appends the row of `lattice`.
    pub fn push(&mut self, lattice: &DPLattice) {
        self.rows.push(ClassRow::from_lattice(lattice));
    }

    /// Appends the rows of another report.
    pub fn extend(&mut self, other: ClassificationReport) {
        self.rows.extend(other.rows);
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when no row was pushed.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders a left-aligned table with a header line and a rule.
    pub fn render(&self) -> String {
        let cells: Vec<[String; 10]> = self.rows.iter().map(ClassRow::cells).collect();
        let widths: Vec<usize> = HEADERS
            .iter()
            .enumerate()
            .map(|(i, h)| cells.iter().map(|c| c[i].len()).fold(h.len(), usize::max))
            .collect();

        let mut out = String::new();
        push_line(&mut out, HEADERS, &widths);
        push_line(&mut out, widths.iter().map(|w| "-".repeat(*w)), &widths);
        for row in &cells {
            push_line(&mut out, row, &widths);
        }
        out
    }
}

impl Default for ClassificationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> FromIterator<&'a DPLattice> for ClassificationReport {
    fn from_iter<I: IntoIterator<Item = &'a DPLattice>>(iter: I) -> Self {
        let mut report = Self::new();
        for lattice in iter {
            report.push(lattice);
        }
        report
    }
}

fn push_line<S: AsRef<str>>(out: &mut String, cells: impl IntoIterator<Item = S>, widths: &[usize]) {
    let line = cells
        .into_iter()
        .zip(widths.iter().copied())
        .map(|(c, w)| format!("{:<w$}", c.as_ref()))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;

    #[test]
    fn rows_follow_lattices() {
        let mut c = Classifier::default();
        let cls = c.get_cls(3).unwrap();
        let report: ClassificationReport = cls.iter().collect();
        assert_eq!(report.len(), cls.len());
        let first = &report.rows[0];
        assert_eq!(first.rank, 3);
        assert_eq!(first.degree, 7);
        assert_eq!((first.mtype.as_str(), first.dynkin_type.as_str()), ("A0", "A0"));
        assert_eq!(first.lines, 3);
        assert_eq!(first.families, 2);
    }

    #[test]
    fn render_aligns_columns() {
        let mut c = Classifier::default();
        let mut report = ClassificationReport::new();
        for lattice in c.get_cls(3).unwrap() {
            report.push(&lattice);
        }
        let text = report.render();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), report.len() + 2);
        assert!(lines[0].starts_with("rank  degree  Mtype  type"));
        assert!(lines[1].chars().all(|ch| ch == '-' || ch == ' '));
        assert!(lines[2].starts_with("3     7       A0     A0"));
    }

    #[test]
    fn extend_concatenates() {
        let mut a = ClassificationReport::default();
        assert!(a.is_empty());
        let mut c = Classifier::default();
        let b: ClassificationReport = c.get_cls(3).unwrap().iter().collect();
        let n = b.len();
        a.extend(b.clone());
        a.extend(b);
        assert_eq!(a.len(), 2 * n);
    }
}
