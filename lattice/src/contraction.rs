//! Bases obtained by contracting (-1)-curves.
//!
//! Contracting indecomposable (-1)-classes one at a time ends either at the
//! plane (no (-1)-class and no conic family left) or at P¹×P¹ (no (-1)-class
//! and exactly two conic families). The contracted classes, together with
//! the class of a line or the two rulings, form a new basis of the lattice.

use tracing::debug;

use crate::div::Div;
use crate::div_set::{fam_classes, m1_classes, nonnegative};
use crate::error::{LatticeError, Result};
use crate::linalg::IntMatrix;

struct Contraction {
    rays: Vec<Div>,
    k: Div,
    fam: Vec<Div>,
    m1: Vec<Div>,
}

/// Row-basis matrices for all sequences of contractions of the weak del Pezzo
/// surface with singularities `d_lst`.
///
/// Rows are `[h, rays..]` for the plane and `[f1, f2, rays..]` for P¹×P¹,
/// where the ray contracted last comes first. Duplicates are dropped and the
/// order of discovery is kept.
///
/// # Errors
///
/// Returns [`LatticeError::DegenerateBasis`] when an element of `d_lst` has
/// the wrong rank or a contraction leaves an inconsistent class.
pub fn get_base_changes(rank: usize, d_lst: &[Div]) -> Result<Vec<IntMatrix>> {
    if let Some(d) = d_lst.iter().find(|d| d.rank() != rank) {
        return Err(LatticeError::DegenerateBasis(format!(
            "{} does not have rank {rank}",
            d.label(false)
        )));
    }
    let start = Contraction {
        rays: Vec::new(),
        k: Div::canonical(rank),
        fam: nonnegative(&fam_classes(rank), d_lst),
        m1: nonnegative(&m1_classes(rank), d_lst),
    };
    let mut out = Vec::new();
    contract(d_lst, start, &mut out)?;
    Ok(out)
}

fn contract(d_lst: &[Div], state: Contraction, out: &mut Vec<IntMatrix>) -> Result<()> {
    if state.m1.is_empty() {
        let generators: Vec<Div> = match state.fam.len() {
            0 => {
                if state.k.coeffs().iter().any(|c| c % 3 != 0) {
                    return Err(LatticeError::DegenerateBasis(format!(
                        "canonical class {} is not divisible by three",
                        state.k.label(false)
                    )));
                }
                let h = Div::new(state.k.coeffs().iter().map(|c| -c / 3).collect());
                std::iter::once(h).chain(state.rays).collect()
            }
            2 => state.fam.into_iter().chain(state.rays).collect(),
            n => {
                debug!(families = n, "contraction ends in a conic bundle");
                return Ok(());
            }
        };
        let rows: Vec<Vec<i64>> = generators.iter().map(|g| g.coeffs().to_vec()).collect();
        let matrix = IntMatrix::from_rows(&rows)?;
        if !out.contains(&matrix) {
            out.push(matrix);
        }
        return Ok(());
    }

    for ray in &state.m1 {
        let k = &state.k - ray;
        let fam: Vec<Div> = state.fam.iter().filter(|f| f.intersection(ray) == 0).cloned().collect();
        let next_d: Vec<Div> = d_lst.iter().filter(|d| d.intersection(ray) == 0).cloned().collect();
        let mut m1: Vec<Div> = state.m1.iter().filter(|a| a.intersection(ray) == 0).cloned().collect();
        // (-2)-curves meeting the ray become (-1)-curves.
        m1.extend(
            d_lst
                .iter()
                .filter(|d| d.intersection(ray) > 0)
                .map(|d| d + &ray.scale(d.intersection(ray))),
        );
        if let Some(bad) = m1.iter().find(|c| {
            c.self_intersection() != -1 || c.intersection(&k) != -1 || c.intersection(ray) != 0
        }) {
            return Err(LatticeError::DegenerateBasis(format!(
                "{} is not a (-1)-class orthogonal to {}",
                bad.label(false),
                ray.label(false)
            )));
        }
        let mut rays = Vec::with_capacity(state.rays.len() + 1);
        rays.push(ray.clone());
        rays.extend(state.rays.iter().cloned());
        contract(&next_d, Contraction { rays, k, fam, m1 }, out)?;
    }
    Ok(())
}
