//! Enumeration of divisor classes with prescribed intersection numbers.
//!
//! All classes here live in the default lattice `<h, e1, .., er>` and are
//! described by their product with the anticanonical class
//! `-k = 3h - e1 - .. - er` and their self-intersection:
//!
//! | Classes | `c·(-k)` | `c·c` |
//! |---------|----------|-------|
//! | (-2)-roots | 0 | -2 |
//! | (-1)-classes | 1 | -1 |
//! | conic families | 2 | 0 |

use crate::div::{sorted, Div};

/// Largest rank for which the class sets are finite.
pub const MAX_RANK: usize = 9;

/// All classes `c = c0·h - p1·e1 - .. - pr·er` with `c0 ≥ 1`, `pi ≥ 0`,
/// `c·(-k) = dc` and `c·c = cc`.
///
/// The degree `c0` runs upwards until the Cauchy-Schwarz bound
/// `(3c0 - dc)² ≤ r·(c0² - cc)` fails past its minimum. With `perm` every
/// ordering of the tail is produced, otherwise only non-increasing tails.
/// Ranks outside `2..=9` yield no classes.
pub fn get_div_set(rank: usize, dc: i64, cc: i64, perm: bool) -> Vec<Div> {
    if !(2..=MAX_RANK).contains(&rank) {
        return Vec::new();
    }
    let r = (rank - 1) as i64;
    let mut out = Vec::new();
    for c0 in 1i64.. {
        let s = 3 * c0 - dc;
        let q = c0 * c0 - cc;
        if s < 0 || q < 0 {
            continue;
        }
        if s * s > r * q {
            if (9 - r) * c0 >= 3 * dc {
                break;
            }
            continue;
        }
        let mut tails = Vec::new();
        enumerate_tails(rank - 1, s, q, if perm { None } else { Some(s) }, &mut Vec::new(), &mut tails);
        for tail in tails {
            let mut coeffs = Vec::with_capacity(rank);
            coeffs.push(c0);
            coeffs.extend(tail.iter().map(|p| -p));
            out.push(Div::new(coeffs));
        }
    }
    out
}

/// Non-negative integer vectors of length `len` with the given sum and sum
/// of squares. `max_part` forces non-increasing entries.
fn enumerate_tails(
    len: usize,
    sum: i64,
    squares: i64,
    max_part: Option<i64>,
    prefix: &mut Vec<i64>,
    out: &mut Vec<Vec<i64>>,
) {
    if len == 0 {
        if sum == 0 && squares == 0 {
            out.push(prefix.clone());
        }
        return;
    }
    if sum * sum > len as i64 * squares || squares > sum * sum || squares < sum {
        return;
    }
    let mut upper = sum.min(isqrt(squares));
    if let Some(m) = max_part {
        upper = upper.min(m);
    }
    for p in 0..=upper {
        prefix.push(p);
        let next_max = max_part.map(|_| p);
        enumerate_tails(len - 1, sum - p, squares - p * p, next_max, prefix, out);
        prefix.pop();
    }
}

fn isqrt(n: i64) -> i64 {
    let mut x = 0;
    while (x + 1) * (x + 1) <= n {
        x += 1;
    }
    x
}

/// Positive (-2)-roots: the classes `e_i - e_j` for `i < j` and the roots
/// of positive degree.
pub fn m2_classes(rank: usize) -> Vec<Div> {
    let mut out = get_div_set(rank, 0, -2, true);
    for i in 1..rank {
        for j in i + 1..rank {
            out.push(&Div::basis_vector(i, rank) - &Div::basis_vector(j, rank));
        }
    }
    sorted(&out)
}

/// Every (-2)-root, positive and negative.
pub fn all_roots(rank: usize) -> Vec<Div> {
    let positive = m2_classes(rank);
    let mut out: Vec<Div> = positive.iter().map(|d| -d).collect();
    out.extend(positive);
    sorted(&out)
}

/// The (-1)-classes: the `e_i` and the classes of positive degree.
pub fn m1_classes(rank: usize) -> Vec<Div> {
    let mut out = get_div_set(rank, 1, -1, true);
    out.extend((1..rank).map(|i| Div::basis_vector(i, rank)));
    sorted(&out)
}

/// Classes of conic families: `c·c = 0`, `c·k = -2`.
pub fn fam_classes(rank: usize) -> Vec<Div> {
    sorted(&get_div_set(rank, 2, 0, true))
}

/// The classes that intersect every element of `d_lst` non-negatively.
pub fn nonnegative(classes: &[Div], d_lst: &[Div]) -> Vec<Div> {
    classes
        .iter()
        .filter(|c| d_lst.iter().all(|d| c.intersection(d) >= 0))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(divs: &[Div]) -> Vec<String> {
        divs.iter().map(|d| d.label(true)).collect()
    }

    #[test]
    fn class_counts_per_rank() {
        let m1: Vec<usize> = (3..=9).map(|r| m1_classes(r).len()).collect();
        assert_eq!(m1, vec![3, 6, 10, 16, 27, 56, 240]);
        let m2: Vec<usize> = (3..=9).map(|r| m2_classes(r).len()).collect();
        assert_eq!(m2, vec![1, 4, 10, 20, 36, 63, 120]);
        let fam: Vec<usize> = (3..=8).map(|r| fam_classes(r).len()).collect();
        assert_eq!(fam, vec![2, 3, 5, 10, 27, 126]);
    }

    #[test]
    fn classes_have_prescribed_numbers() {
        for rank in 3..=8 {
            assert!(m2_classes(rank).iter().all(Div::is_root));
            for c in m1_classes(rank) {
                assert_eq!((c.self_intersection(), c.canonical_product()), (-1, -1));
            }
            for c in fam_classes(rank) {
                assert_eq!((c.self_intersection(), c.canonical_product()), (0, -2));
            }
        }
    }

    #[test]
    fn low_rank_classes() {
        let m1 = m1_classes(3);
        assert!(m1.contains(&Div::new(vec![0, 1, 0])));
        assert!(m1.contains(&Div::new(vec![0, 0, 1])));
        assert!(m1.contains(&Div::new(vec![1, -1, -1])));

        let mut positive = labels(&m2_classes(5));
        positive.sort();
        let mut expected: Vec<String> = ["12", "23", "13", "34", "24", "14", "1123", "1124", "1134", "1234"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        expected.sort();
        assert_eq!(positive, expected);
    }

    #[test]
    fn partitions_without_permutations() {
        // 2h - four points: one sorted tail instead of five orderings.
        assert_eq!(get_div_set(6, 2, 0, true).len(), 10);
        assert_eq!(get_div_set(6, 2, 0, false).len(), 2);
    }

    #[test]
    fn nonnegativity_filter() {
        let d = Div::from_label("12", 3).unwrap();
        let lines = nonnegative(&m1_classes(3), &[d]);
        assert_eq!(lines.len(), 2);
        assert!(!lines.contains(&Div::new(vec![0, 1, 0])));
        assert_eq!(all_roots(4).len(), 8);
    }
}
