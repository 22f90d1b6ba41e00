//! Divisor classes of a Néron-Severi lattice.
//!
//! A [`Div`] is a coefficient vector with respect to a lattice basis
//! `<h, e1, .., er>`, together with the bilinear [`Form`] used for the
//! intersection product. The default form is `diag(1, -1, .., -1)`, the
//! Néron-Severi lattice of the plane blown up in `r` points.
//!
//! # Labels
//!
//! Divisors have a compact textual notation:
//!
//! | Label | Class |
//! |-------|-------|
//! | `3h+e1+5e5-e6` | general linear combination (`e0` may replace `h`) |
//! | `12` | `e1-e2` |
//! | `1123` | `h-e1-e2-e3` |
//! | `212` | `2h-e3-e4-e5-e6-e7-e8` |
//! | `308` | `3h-e1-..-e7-2e8` |
//! | `-12` | `-(e1-e2)` |
//!
//! The numeric shorthand only exists for (-2)-classes of rank at most 9.
//!
//! # Examples
//!
//! ```
//! use ns_lattice::div::Div;
//!
//! let d = Div::from_label("1245", 9).unwrap();
//! assert_eq!(d.coeffs(), &[1, 0, -1, 0, -1, -1, 0, 0, 0]);
//! assert_eq!(d.self_intersection(), -2);
//! assert_eq!(d.label(true), "1245");
//! assert_eq!(d.label(false), "h-e2-e4-e5");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Neg, Sub};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, Result};
use crate::linalg::IntMatrix;

/// Largest rank for which the numeric (-2)-class shorthand is defined.
pub const MAX_SHORTHAND_RANK: usize = 9;

// ============================================================================
// Bilinear forms
// ============================================================================

/// Symmetric bilinear form of a lattice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Form {
    /// `diag(1, -1, .., -1)` of the appropriate rank.
    #[default]
    Standard,
    /// Explicit Gram matrix, shared between all divisors built with it.
    Gram(Arc<IntMatrix>),
}

impl Form {
    /// The form of P¹×P¹ blown up in `rank - 2` points:
    /// `[[0,1],[1,0]] ⊕ diag(-1, .., -1)`.
    pub fn p1xp1(rank: usize) -> Self {
        Self::Gram(Arc::new(p1xp1_matrix(rank)))
    }

    /// True for the default diagonal form.
    pub fn is_standard(&self) -> bool {
        matches!(self, Self::Standard)
    }

    /// True when this is the P¹×P¹ form of the given rank.
    pub fn is_p1xp1(&self, rank: usize) -> bool {
        matches!(self, Self::Gram(m) if **m == p1xp1_matrix(rank))
    }

    /// The Gram matrix at the given rank.
    pub fn matrix(&self, rank: usize) -> IntMatrix {
        match self {
            Self::Standard => {
                let mut diag = vec![-1; rank];
                if let Some(first) = diag.first_mut() {
                    *first = 1;
                }
                IntMatrix::diagonal(&diag)
            }
            Self::Gram(m) => m.as_ref().clone(),
        }
    }

    /// `aᵗ·Form·b`.
    pub fn product(&self, a: &[i64], b: &[i64]) -> i64 {
        match self {
            Self::Standard => a
                .iter()
                .zip(b)
                .enumerate()
                .map(|(i, (x, y))| if i == 0 { x * y } else { -x * y })
                .sum(),
            Self::Gram(m) => {
                let mb = m.mul_vec(b);
                a.iter().zip(&mb).map(|(x, y)| x * y).sum()
            }
        }
    }
}

fn p1xp1_matrix(rank: usize) -> IntMatrix {
    let mut m = IntMatrix::zeros(rank, rank);
    if rank >= 2 {
        m.set(0, 1, 1);
        m.set(1, 0, 1);
    }
    for i in 2..rank {
        m.set(i, i, -1);
    }
    m
}

// ============================================================================
// Divisors
// ============================================================================

/// A divisor class: integer coordinates plus the form used to intersect them.
///
/// Equality, hashing and ordering only look at the coefficients.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Div {
    coeffs: Vec<i64>,
    #[serde(default, skip_serializing_if = "Form::is_standard")]
    form: Form,
}

impl Div {
    /// Divisor with the default form.
    pub fn new(coeffs: Vec<i64>) -> Self {
        Self {
            coeffs,
            form: Form::Standard,
        }
    }

    /// Divisor with an explicit form.
    pub fn with_form(coeffs: Vec<i64>, form: Form) -> Self {
        Self { coeffs, form }
    }

    /// The `i`-th basis vector of the given rank (`0` is `h`).
    pub fn basis_vector(i: usize, rank: usize) -> Self {
        let mut coeffs = vec![0; rank];
        if i < rank {
            coeffs[i] = 1;
        }
        Self::new(coeffs)
    }

    /// Canonical class `-3h + e1 + .. + er` for the default form.
    pub fn canonical(rank: usize) -> Self {
        Self::canonical_for(rank, &Form::Standard)
    }

    /// Canonical class with respect to `form`: `-2h - 2e1 + e2 + .. + er` for
    /// the P¹×P¹ form, `-3h + e1 + .. + er` otherwise.
    pub fn canonical_for(rank: usize, form: &Form) -> Self {
        let mut coeffs = vec![1; rank];
        if form.is_p1xp1(rank) {
            coeffs[0] = -2;
            coeffs[1] = -2;
        } else if let Some(first) = coeffs.first_mut() {
            *first = -3;
        }
        Self::with_form(coeffs, form.clone())
    }

    /// Parses a label (see the module documentation) into a divisor of the
    /// given rank.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Format`] when the label matches neither grammar,
    /// refers to an index outside the rank, or uses the numeric shorthand with
    /// a rank above [`MAX_SHORTHAND_RANK`].
    pub fn from_label(label: &str, rank: usize) -> Result<Self> {
        let label = label.trim();
        let coeffs = if label.contains(['h', 'e']) {
            parse_general(label)?
        } else {
            parse_shorthand(label, rank)?
        };
        if coeffs.len() > rank {
            if coeffs[rank..].iter().any(|&c| c != 0) {
                return Err(LatticeError::format(
                    label,
                    format!("needs rank at least {}", coeffs.len()),
                ));
            }
            return Ok(Self::new(coeffs[..rank].to_vec()));
        }
        let mut coeffs = coeffs;
        coeffs.resize(rank, 0);
        Ok(Self::new(coeffs))
    }

    /// Smallest rank able to host `label`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Format`] when the label cannot be parsed.
    pub fn min_rank(label: &str) -> Result<usize> {
        let label = label.trim();
        let coeffs = if label.contains(['h', 'e']) {
            parse_general(label)?
        } else {
            parse_shorthand(label, MAX_SHORTHAND_RANK)?
        };
        let used = coeffs.iter().rposition(|&c| c != 0).map_or(1, |i| i + 1);
        Ok(used)
    }

    /// Coefficients with respect to the lattice basis.
    pub fn coeffs(&self) -> &[i64] {
        &self.coeffs
    }

    /// Rank of the ambient lattice.
    pub fn rank(&self) -> usize {
        self.coeffs.len()
    }

    /// The form used for intersection products.
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Intersection product `selfᵗ·Form·other`, using the form of `self`.
    pub fn intersection(&self, other: &Div) -> i64 {
        self.form.product(&self.coeffs, &other.coeffs)
    }

    /// Self-intersection `d·d`.
    pub fn self_intersection(&self) -> i64 {
        self.intersection(self)
    }

    /// Intersection with the canonical class of the own form.
    pub fn canonical_product(&self) -> i64 {
        self.intersection(&Self::canonical_for(self.rank(), &self.form))
    }

    /// True for a (-2)-class orthogonal to the canonical class.
    pub fn is_root(&self) -> bool {
        self.self_intersection() == -2 && self.canonical_product() == 0
    }

    /// `M·d`.
    pub fn apply_linear_map(&self, m: &IntMatrix) -> Self {
        Self::with_form(m.mul_vec(&self.coeffs), self.form.clone())
    }

    /// `n·d`.
    pub fn scale(&self, n: i64) -> Self {
        self.apply_linear_map(&IntMatrix::diagonal(&vec![n; self.rank()]))
    }

    /// Image under the reflection in a (-2)-class: `d + (d·r)·r`.
    pub fn reflect(&self, root: &Div) -> Self {
        self + &root.scale(self.intersection(root))
    }

    /// Coordinates of `self` with respect to the rows of `b`, together with
    /// the induced form `B·Form·Bᵗ`.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::DegenerateBasis`] when `b` is singular or when
    /// the new coordinates are not integral.
    pub fn basis_change(&self, b: &IntMatrix) -> Result<Self> {
        let rank = self.rank();
        let bt_inv = b
            .transpose()
            .to_rational()
            .inverse()
            .ok_or_else(|| LatticeError::DegenerateBasis("basis change matrix is singular".into()))?;
        let column = IntMatrix::from_columns(&[self.coeffs.clone()])?.to_rational();
        let coeffs = (&bt_inv * &column)
            .to_integer()
            .ok_or_else(|| {
                LatticeError::DegenerateBasis(format!(
                    "{} has no integral coordinates in the new basis",
                    self.label(false)
                ))
            })?
            .transpose()
            .row(0)
            .to_vec();
        let gram = &(b * &self.form.matrix(rank)) * &b.transpose();
        let form = if gram == Form::Standard.matrix(rank) {
            Form::Standard
        } else {
            Form::Gram(Arc::new(gram))
        };
        Ok(Self::with_form(coeffs, form))
    }

    /// Textual label.
    ///
    /// With `abbreviate`, (-2)-classes of rank at most 9 with the default form
    /// use the numeric shorthand; every other divisor uses the general form.
    pub fn label(&self, abbreviate: bool) -> String {
        if abbreviate && self.rank() <= MAX_SHORTHAND_RANK && self.form.is_standard() && self.is_root()
        {
            if let Some(s) = self.shorthand() {
                return s;
            }
        }
        general_label(&self.coeffs)
    }

    fn shorthand(&self) -> Option<String> {
        let first = self.coeffs.iter().find(|&&c| c != 0)?;
        let (sign, c) = if *first < 0 {
            ("-", self.scale(-1).coeffs)
        } else {
            ("", self.coeffs.clone())
        };
        let mut padded = c.clone();
        padded.resize(MAX_SHORTHAND_RANK, 0);
        let tail = &padded[1..];
        let indices = |value: i64| -> Vec<usize> {
            tail.iter()
                .enumerate()
                .filter(|(_, &x)| x == value)
                .map(|(i, _)| i + 1)
                .collect()
        };
        let digits = |v: &[usize]| v.iter().map(usize::to_string).collect::<String>();
        let body = match padded[0] {
            0 => {
                let (pos, neg) = (indices(1), indices(-1));
                if pos.len() != 1 || neg.len() != 1 {
                    return None;
                }
                format!("{}{}", pos[0], neg[0])
            }
            1 => {
                let neg = indices(-1);
                if neg.len() != 3 {
                    return None;
                }
                format!("1{}", digits(&neg))
            }
            2 => {
                let zero = indices(0);
                if zero.len() != 2 || indices(-1).len() != 6 {
                    return None;
                }
                format!("2{}", digits(&zero))
            }
            3 => {
                let double = indices(-2);
                if double.len() != 1 || indices(-1).len() != 7 {
                    return None;
                }
                format!("30{}", double[0])
            }
            _ => return None,
        };
        Some(format!("{sign}{body}"))
    }

    /// Key realising the lattice order: degree coefficient first, then the
    /// exceptional coefficients from the last one backwards.
    fn order_key(&self) -> impl Iterator<Item = i64> + '_ {
        self.coeffs
            .first()
            .copied()
            .into_iter()
            .chain(self.coeffs.iter().skip(1).rev().copied())
    }
}

impl PartialEq for Div {
    fn eq(&self, other: &Self) -> bool {
        self.coeffs == other.coeffs
    }
}

impl Eq for Div {}

impl Hash for Div {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coeffs.hash(state);
    }
}

impl Ord for Div {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank()
            .cmp(&other.rank())
            .then_with(|| self.order_key().cmp(other.order_key()))
    }
}

impl PartialOrd for Div {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Div {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label(true))
    }
}

impl Add for &Div {
    type Output = Div;

    fn add(self, rhs: &Div) -> Div {
        debug_assert_eq!(self.rank(), rhs.rank());
        let coeffs = self.coeffs.iter().zip(&rhs.coeffs).map(|(a, b)| a + b).collect();
        Div::with_form(coeffs, self.form.clone())
    }
}

impl Sub for &Div {
    type Output = Div;

    fn sub(self, rhs: &Div) -> Div {
        debug_assert_eq!(self.rank(), rhs.rank());
        let coeffs = self.coeffs.iter().zip(&rhs.coeffs).map(|(a, b)| a - b).collect();
        Div::with_form(coeffs, self.form.clone())
    }
}

impl Neg for &Div {
    type Output = Div;

    fn neg(self) -> Div {
        self.scale(-1)
    }
}

/// Sorts divisors in lattice order.
pub fn sorted(divs: &[Div]) -> Vec<Div> {
    let mut out = divs.to_vec();
    out.sort();
    out
}

/// Comma-separated abbreviated labels, used in messages and reports.
pub fn labels(divs: &[Div]) -> String {
    divs.iter().map(|d| d.label(true)).collect::<Vec<_>>().join(", ")
}

// ============================================================================
// Label grammar
// ============================================================================

fn general_label(coeffs: &[i64]) -> String {
    let mut out = String::new();
    for (i, &c) in coeffs.iter().enumerate() {
        if c == 0 {
            continue;
        }
        let symbol = if i == 0 { "h".to_string() } else { format!("e{i}") };
        match (c, out.is_empty()) {
            (1, true) => {}
            (1, false) => out.push('+'),
            (-1, _) => out.push('-'),
            (_, true) => out.push_str(&c.to_string()),
            (_, false) => out.push_str(&format!("{c:+}")),
        }
        out.push_str(&symbol);
    }
    if out.is_empty() {
        out.push('0');
    }
    out
}

/// Parses `[sign][coefficient](h|e<index>)` terms, growing the vector as needed.
fn parse_general(label: &str) -> Result<Vec<i64>> {
    let chars: Vec<char> = label.chars().collect();
    let mut coeffs: Vec<i64> = Vec::new();
    let mut pos = 0;
    if chars.is_empty() {
        return Err(LatticeError::format(label, "empty label"));
    }
    while pos < chars.len() {
        let sign = match chars[pos] {
            '+' => {
                pos += 1;
                1
            }
            '-' => {
                pos += 1;
                -1
            }
            _ if pos == 0 => 1,
            other => {
                return Err(LatticeError::format(
                    label,
                    format!("expected '+' or '-' before '{other}'"),
                ))
            }
        };
        let (number, next) = read_number(label, &chars, pos)?;
        pos = next;
        let coefficient = number.unwrap_or(1);
        let index = match chars.get(pos) {
            Some('h') => {
                pos += 1;
                0
            }
            Some('e') => {
                let (number, next) = read_number(label, &chars, pos + 1)?;
                pos = next;
                let n = number.ok_or_else(|| LatticeError::format(label, "'e' without index"))?;
                usize::try_from(n).map_err(|_| LatticeError::format(label, "index out of range"))?
            }
            _ => return Err(LatticeError::format(label, "expected 'h' or 'e<index>'")),
        };
        if index >= coeffs.len() {
            coeffs.resize(index + 1, 0);
        }
        coeffs[index] = coefficient
            .checked_mul(sign)
            .and_then(|term| coeffs[index].checked_add(term))
            .ok_or_else(|| LatticeError::format(label, "coefficient out of range"))?;
    }
    Ok(coeffs)
}

/// Reads the digits starting at `start`; `None` when there are none.
fn read_number(label: &str, chars: &[char], start: usize) -> Result<(Option<i64>, usize)> {
    let mut end = start;
    while end < chars.len() && chars[end].is_ascii_digit() {
        end += 1;
    }
    if end == start {
        return Ok((None, start));
    }
    let digits: String = chars[start..end].iter().collect();
    let number = digits
        .parse()
        .map_err(|_| LatticeError::format(label, format!("number {digits} out of range")))?;
    Ok((Some(number), end))
}

/// Parses the numeric (-2)-class shorthand into a rank-9 vector.
fn parse_shorthand(label: &str, rank: usize) -> Result<Vec<i64>> {
    if rank > MAX_SHORTHAND_RANK {
        return Err(LatticeError::format(
            label,
            format!("numeric shorthand needs rank at most {MAX_SHORTHAND_RANK}"),
        ));
    }
    let (negate, body) = match label.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, label),
    };
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit()) {
        return Err(LatticeError::format(label, "not a divisor label"));
    }
    let digits: Vec<usize> = body
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| d as usize)
        .collect();
    let valid = |i: usize| (1..MAX_SHORTHAND_RANK).contains(&i);
    let mut c = vec![0i64; MAX_SHORTHAND_RANK];
    match digits.as_slice() {
        [i, j] if valid(*i) && valid(*j) && i != j => {
            c[*i] = 1;
            c[*j] = -1;
        }
        [1, i, j, k] if [i, j, k].iter().all(|x| valid(**x)) && i != j && j != k && i != k => {
            c[0] = 1;
            c[*i] = -1;
            c[*j] = -1;
            c[*k] = -1;
        }
        [2, i, j] if valid(*i) && valid(*j) && i != j => {
            c[0] = 2;
            for (idx, x) in c.iter_mut().enumerate().skip(1) {
                if idx != *i && idx != *j {
                    *x = -1;
                }
            }
        }
        [3, 0, x] if valid(*x) => {
            c[0] = 3;
            for v in c.iter_mut().skip(1) {
                *v = -1;
            }
            c[*x] = -2;
        }
        _ => return Err(LatticeError::format(label, "not a divisor label")),
    }
    if negate {
        for v in c.iter_mut() {
            *v = -*v;
        }
    }
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div(label: &str) -> Div {
        Div::from_label(label, 9).unwrap()
    }

    #[test]
    fn parse_general_labels() {
        assert_eq!(div("3h+e1+5e5-e6").coeffs(), &[3, 1, 0, 0, 0, 5, -1, 0, 0]);
        assert_eq!(div("e0-e1-e2").coeffs(), div("h-e1-e2").coeffs());
        assert_eq!(div("-h+2e1-e1").coeffs(), &[-1, 1, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(Div::from_label("e1", 3).unwrap().coeffs(), &[0, 1, 0]);
    }

    #[test]
    fn parse_shorthand_labels() {
        assert_eq!(div("1245").coeffs(), &[1, 0, -1, 0, -1, -1, 0, 0, 0]);
        assert_eq!(div("-308").coeffs(), &[-3, 1, 1, 1, 1, 1, 1, 1, 2]);
        assert_eq!(div("12").coeffs(), &[0, 1, -1, 0, 0, 0, 0, 0, 0]);
        assert_eq!(div("212").coeffs(), &[2, 0, 0, -1, -1, -1, -1, -1, -1]);
        assert_eq!(Div::from_label("1123", 4).unwrap().coeffs(), &[1, -1, -1, -1]);
        assert_eq!(Div::from_label("278", 8).unwrap().coeffs(), &[2, -1, -1, -1, -1, -1, -1, 0]);
    }

    #[test]
    fn reject_malformed_labels() {
        assert!(Div::from_label("", 3).is_err());
        assert!(Div::from_label("x1", 3).is_err());
        assert!(Div::from_label("12345", 9).is_err());
        assert!(Div::from_label("11", 9).is_err());
        assert!(Div::from_label("12", 10).is_err());
        assert!(Div::from_label("34", 3).is_err());
        assert!(Div::from_label("308", 8).is_err());
        assert!(Div::from_label("h-e5", 3).is_err());
    }

    #[test]
    fn reject_out_of_range_coefficients() {
        assert!(matches!(
            Div::from_label("99999999999999999999h+e1", 3),
            Err(LatticeError::Format { .. })
        ));
        assert!(matches!(
            Div::from_label("9223372036854775807h+9223372036854775807h", 3),
            Err(LatticeError::Format { .. })
        ));
        assert!(matches!(
            Div::from_label("h-e99999999999999999999", 3),
            Err(LatticeError::Format { .. })
        ));
        let max = Div::from_label("9223372036854775807h-e1", 3).unwrap();
        assert_eq!(max.coeffs(), &[i64::MAX, -1, 0]);
    }

    #[test]
    fn minimal_ranks() {
        assert_eq!(Div::min_rank("12").unwrap(), 3);
        assert_eq!(Div::min_rank("1123").unwrap(), 4);
        assert_eq!(Div::min_rank("78").unwrap(), 9);
        assert_eq!(Div::min_rank("308").unwrap(), 9);
        assert_eq!(Div::min_rank("234").unwrap(), 9);
        assert_eq!(Div::min_rank("-1145").unwrap(), 6);
    }

    #[test]
    fn labels_of_roots() {
        for label in ["12", "-12", "1123", "-1123", "212", "308", "-308", "1678"] {
            assert_eq!(div(label).label(true), label);
        }
        assert_eq!(div("12").label(false), "e1-e2");
        assert_eq!(div("3h+e1+5e5-e6").label(true), "3h+e1+5e5-e6");
        assert_eq!(Div::new(vec![-3, 0, 0]).label(false), "-3h");
        assert_eq!(Div::new(vec![0, 0, 0, -1]).label(false), "-e3");
        assert_eq!(Div::new(vec![0, 0]).label(false), "0");
    }

    #[test]
    fn lattice_order() {
        assert!(div("1124") < div("1123"));
        assert!(div("12") < div("1123"));
        assert!(div("13") < div("12"));
        assert!(div("34") < div("12"));
        assert!(Div::from_label("12", 3).unwrap() < div("45"));
    }

    #[test]
    fn intersection_numbers() {
        let k = Div::canonical(9);
        assert_eq!(k.self_intersection(), 1);
        assert_eq!(div("e1").canonical_product(), -1);
        assert_eq!(div("h-e1").canonical_product(), -2);
        assert_eq!(div("12").intersection(&div("23")), 1);
        assert_eq!(div("12").intersection(&div("1123")), 0);
        assert!(div("308").is_root());
    }

    #[test]
    fn arithmetic() {
        let a = div("e1");
        let b = div("e2");
        assert_eq!(&a - &b, div("12"));
        assert_eq!(-&div("12"), div("-12"));
        assert_eq!(div("12").scale(2).coeffs()[1], 2);
        let swap = IntMatrix::from_rows(&[vec![1, 0, 0], vec![0, 0, 1], vec![0, 1, 0]]).unwrap();
        let d = Div::from_label("12", 3).unwrap();
        assert_eq!(d.apply_linear_map(&swap), Div::from_label("-12", 3).unwrap());
    }

    #[test]
    fn reflections_in_roots() {
        let r = div("12");
        assert_eq!(r.reflect(&r), div("-12"));
        assert_eq!(div("23").reflect(&r), div("13"));
        assert_eq!(div("45").reflect(&r), div("45"));
        assert_eq!(div("e1").reflect(&r), div("e2"));
    }

    #[test]
    fn basis_change_to_p1xp1() {
        let b = IntMatrix::from_rows(&[vec![1, -1, 0], vec![1, 0, -1], vec![1, -1, -1]]).unwrap();
        let k = Div::canonical(3).basis_change(&b).unwrap();
        assert_eq!(k.coeffs(), &[-2, -2, 1]);
        assert!(k.form().is_p1xp1(3));
        assert_eq!(k, Div::canonical_for(3, &Form::p1xp1(3)));
        assert_eq!(k.self_intersection(), 7);
    }

    #[test]
    fn singular_basis_change_fails() {
        let b = IntMatrix::from_rows(&[vec![1, 0, 0], vec![1, 0, 0], vec![0, 0, 1]]).unwrap();
        assert!(matches!(
            Div::canonical(3).basis_change(&b),
            Err(LatticeError::DegenerateBasis(_))
        ));
    }
}
