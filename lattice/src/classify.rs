//! The classifier: owner of the memo cache and of the per-rank tables, and
//! home of the top-level classification of enhanced lattices.
//!
//! Every expensive routine is a get-or-compute around the [`ToolCache`], so a
//! classifier opened on a persisted cache answers previously computed ranks
//! without recomputation.
//!
//! # Entry Point
//!
//! ```
//! use ns_lattice::{Classifier, ClassifierConfig};
//!
//! let mut classifier = Classifier::new(ClassifierConfig::default());
//! let classes = classifier.get_cls(3).unwrap();
//! let types: Vec<(&str, &str)> = classes.iter().map(|c| (c.mtype(), c.dynkin_type())).collect();
//! assert_eq!(types, vec![("A0", "A0"), ("A0", "A1"), ("A1", "A0")]);
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::{cache_key, ToolCache};
use crate::config::{ClassifierConfig, MIN_RANK};
use crate::div::{labels, sorted, Div};
use crate::div_set::{all_roots, fam_classes, m1_classes, m2_classes};
use crate::dp_lattice::{DPLattice, LatticeSignature};
use crate::dynkin::DynkinCatalog;
use crate::error::{LatticeError, Result};
use crate::eta::Eta;
use crate::involutions::{preserves, Involution};
use crate::linalg::{rank as span_rank, IntMatrix};
use crate::root_bases::is_root_basis;

// ============================================================================
// Per-rank tables
// ============================================================================

/// Divisor class enumerations of one rank.
#[derive(Debug)]
pub(crate) struct RankTables {
    pub(crate) positive_roots: Vec<Div>,
    pub(crate) roots: Vec<Div>,
    pub(crate) m1: Vec<Div>,
    pub(crate) fam: Vec<Div>,
}

impl RankTables {
    fn build(rank: usize) -> Self {
        debug!(rank, "building class tables");
        Self {
            positive_roots: m2_classes(rank),
            roots: all_roots(rank),
            m1: m1_classes(rank),
            fam: fam_classes(rank),
        }
    }
}

// ============================================================================
// Classifier
// ============================================================================

/// Classification engine with an injected memoization cache.
#[derive(Debug)]
pub struct Classifier {
    config: ClassifierConfig,
    cache: ToolCache,
    catalog: Option<Arc<DynkinCatalog>>,
    tables: HashMap<usize, Arc<RankTables>>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierConfig::default())
    }
}

impl Classifier {
    /// Classifier with an in-memory cache.
    pub fn new(config: ClassifierConfig) -> Self {
        Self::with_cache(config, ToolCache::in_memory())
    }

    /// Classifier using the given cache.
    pub fn with_cache(config: ClassifierConfig, cache: ToolCache) -> Self {
        Self {
            config: config.validated(),
            cache,
            catalog: None,
            tables: HashMap::new(),
        }
    }

    /// Classifier whose cache is loaded from `config.cache_path` when set.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Cache`](crate::LatticeError::Cache) when the
    /// cache file exists but cannot be read.
    pub fn open(config: ClassifierConfig) -> Result<Self> {
        let cache = match &config.cache_path {
            Some(path) => ToolCache::open(path)?,
            None => ToolCache::in_memory(),
        };
        Ok(Self::with_cache(config, cache))
    }

    /// Active configuration.
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// The memoization cache.
    pub fn cache(&self) -> &ToolCache {
        &self.cache
    }

    /// Persists the cache (no-op for in-memory caches).
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Cache`](crate::LatticeError::Cache) when writing fails.
    pub fn save_cache(&self) -> Result<()> {
        self.cache.save()
    }

    /// Forgets every memoized result, typed tables included.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.tables.clear();
        self.catalog = None;
    }

    pub(crate) fn tables(&mut self, rank: usize) -> Arc<RankTables> {
        self.tables
            .entry(rank)
            .or_insert_with(|| Arc::new(RankTables::build(rank)))
            .clone()
    }

    /// Dynkin catalog covering root bases of `len` elements.
    pub(crate) fn catalog(&mut self, len: usize) -> Arc<DynkinCatalog> {
        match &self.catalog {
            Some(catalog) if catalog.max_rank() >= len => catalog.clone(),
            _ => {
                let max_rank = len.max(self.config.max_rank.saturating_sub(1));
                info!(max_rank, "building Dynkin catalog");
                let catalog = Arc::new(DynkinCatalog::build(max_rank));
                self.catalog = Some(catalog.clone());
                catalog
            }
        }
    }

    /// Get-or-compute around the cache.
    pub(crate) fn memo<T, F>(&mut self, key: String, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Self) -> Result<T>,
    {
        if let Some(value) = self.cache.get(&key) {
            return Ok(value);
        }
        let value = compute(self)?;
        self.cache.put(&key, &value)?;
        Ok(value)
    }

    pub(crate) fn eta(&self, total: usize) -> Eta {
        Eta::new(total, self.config.eta_interval)
    }

    /// Builds the enhanced lattice of a root basis and an involution.
    ///
    /// `m` must preserve `d_lst` as a set.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::UnrecognizedType`](crate::LatticeError::UnrecognizedType)
    /// when `d_lst` or `md_lst` is not a root basis.
    pub fn lattice(&mut self, d_lst: Vec<Div>, md_lst: Vec<Div>, m: IntMatrix) -> Result<DPLattice> {
        let dynkin_type = self.dynkin_type(&d_lst)?;
        let mtype = self.dynkin_type(&md_lst)?;
        let tables = self.tables(m.nrows());
        Ok(DPLattice::derive(d_lst, md_lst, m, dynkin_type, mtype, &tables))
    }

    // ========================================================================
    // Classification
    // ========================================================================

    /// Root basis classes with the trivial involution.
    ///
    /// # Errors
    ///
    /// Propagates errors of the root basis classification.
    pub fn get_bas_lst(&mut self, rank: usize) -> Result<Vec<DPLattice>> {
        self.memo(cache_key("get_bas_lst", &[&rank]), |c| {
            let mut set = LatticeSet::default();
            for d_lst in c.root_basis_classes(rank)? {
                let dpl = c.lattice(d_lst, Vec::new(), IntMatrix::identity(rank))?;
                set.insert(dpl);
            }
            Ok(set.into_sorted())
        })
    }

    /// Classes of enhanced lattices of the given rank, fast algorithm.
    ///
    /// Starts from the classes with trivial involution; for every other
    /// classified involution it searches the invariant root bases built from
    /// roots fixed by the involution and from pairs `{r, M·r}`.
    ///
    /// # Errors
    ///
    /// Propagates errors of the involution and root basis classifications.
    pub fn get_cls(&mut self, rank: usize) -> Result<Vec<DPLattice>> {
        self.memo(cache_key("get_cls", &[&rank]), |c| c.classify_fast(rank))
    }

    /// Classes of enhanced lattices of the given rank, brute-force algorithm:
    /// every root basis class paired with every involution preserving it.
    ///
    /// # Errors
    ///
    /// Propagates errors of the involution and root basis classifications.
    pub fn get_cls_provable(&mut self, rank: usize) -> Result<Vec<DPLattice>> {
        self.memo(cache_key("get_cls_provable", &[&rank]), |c| {
            c.classify_provable(rank)
        })
    }

    /// Classification of a single rank using either algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Config`] when `rank` lies outside
    /// `3..=9` and propagates classification errors.
    pub fn classify_rank(&mut self, rank: usize, provable: bool) -> Result<Vec<DPLattice>> {
        if !(MIN_RANK..=crate::div_set::MAX_RANK).contains(&rank) {
            return Err(LatticeError::Config(format!(
                "rank {rank} outside {MIN_RANK}..={}",
                crate::div_set::MAX_RANK
            )));
        }
        info!(rank, provable, "classifying");
        let classes = if provable {
            self.get_cls_provable(rank)?
        } else {
            self.get_cls(rank)?
        };
        info!(rank, classes = classes.len(), "classified");
        Ok(classes)
    }

    /// Classifications for ranks `3..=max_rank` using either algorithm.
    ///
    /// # Errors
    ///
    /// Propagates the first classification error.
    pub fn get_cls_real_dp(
        &mut self,
        max_rank: usize,
        provable: bool,
    ) -> Result<BTreeMap<usize, Vec<DPLattice>>> {
        let mut out = BTreeMap::new();
        for rank in MIN_RANK..=max_rank.min(crate::div_set::MAX_RANK) {
            out.insert(rank, self.classify_rank(rank, provable)?);
        }
        Ok(out)
    }

    fn classify_fast(&mut self, rank: usize) -> Result<Vec<DPLattice>> {
        let inv_lst = self.get_inv_lst(rank)?;
        let mut set = LatticeSet::default();
        for dpl in self.get_bas_lst(rank)? {
            set.insert(dpl);
        }
        let tables = self.tables(rank);
        let max_len = rank - 1;
        let mut eta = self.eta(inv_lst.len());
        for inv in &inv_lst {
            eta.update(&format!("rank={rank} Md_lst={}", labels(&inv.md_lst)));
            if inv.is_identity() {
                continue;
            }
            let m = &inv.matrix;
            let fixed: Vec<Vec<Div>> = tables
                .positive_roots
                .iter()
                .filter(|r| r.apply_linear_map(m) == **r)
                .map(|r| vec![r.clone()])
                .collect();
            let pairs: Vec<Vec<Div>> = tables
                .roots
                .iter()
                .filter_map(|r| {
                    let image = r.apply_linear_map(m);
                    let moved = image != *r && image != -r;
                    (moved && *r < image && r.intersection(&image) >= 0).then(|| vec![r.clone(), image])
                })
                .collect();
            let s_bases = bases_from_units(&fixed, max_len);
            let q_bases = bases_from_units(&pairs, max_len);
            debug!(
                rank,
                fixed = fixed.len(),
                pairs = pairs.len(),
                s_bases = s_bases.len(),
                q_bases = q_bases.len(),
                "invariant root bases"
            );

            let mut seen: HashSet<Vec<Div>> = HashSet::new();
            let mut buckets: BTreeMap<(usize, String), Vec<Vec<Div>>> = BTreeMap::new();
            for s in &s_bases {
                for q in &q_bases {
                    if s.len() + q.len() > max_len {
                        continue;
                    }
                    let union: Vec<Div> = s.iter().chain(q).cloned().collect();
                    if !is_root_basis(&union) || !seen.insert(sorted(&union)) {
                        continue;
                    }
                    let dynkin_type = self.dynkin_type(&union)?;
                    buckets.entry((union.len(), dynkin_type)).or_default().push(union);
                }
            }
            for d_lst in buckets.into_values().flatten() {
                let dpl = self.lattice(d_lst, inv.md_lst.clone(), m.clone())?;
                set.insert(dpl);
            }
        }
        Ok(set.into_sorted())
    }

    fn classify_provable(&mut self, rank: usize) -> Result<Vec<DPLattice>> {
        let reps = self.root_basis_classes(rank)?;
        let invs = self.all_involutions(rank)?;
        let mut set = LatticeSet::default();
        let mut eta = self.eta(reps.len());
        for d_lst in reps {
            eta.update(&format!("rank={rank} d_lst={}", labels(&d_lst)));
            for inv in &invs {
                if !preserves(&inv.matrix, &d_lst) {
                    continue;
                }
                let dpl = self.lattice(d_lst.clone(), inv.md_lst.clone(), inv.matrix.clone())?;
                set.insert(dpl);
            }
        }
        Ok(set.into_sorted())
    }

    /// Deduplicated list of involutions.
    pub(crate) fn dedupe_involutions(&mut self, candidates: Vec<Involution>) -> Result<Vec<Involution>> {
        let mut set = LatticeSet::default();
        let mut out = Vec::new();
        for inv in candidates {
            let dpl = self.lattice(Vec::new(), inv.md_lst.clone(), inv.matrix.clone())?;
            if set.insert(dpl) {
                out.push(inv);
            }
        }
        Ok(out)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// List of pairwise inequivalent lattices, bucketed by their cheap invariants.
#[derive(Default)]
struct LatticeSet {
    items: Vec<DPLattice>,
    buckets: HashMap<LatticeSignature, Vec<usize>>,
}

impl LatticeSet {
    /// Adds `dpl` unless an equivalent lattice is present; true when added.
    fn insert(&mut self, dpl: DPLattice) -> bool {
        let bucket = self.buckets.entry(dpl.signature()).or_default();
        if bucket.iter().any(|&i| self.items[i].is_equivalent(&dpl)) {
            return false;
        }
        bucket.push(self.items.len());
        self.items.push(dpl);
        true
    }

    fn into_sorted(self) -> Vec<DPLattice> {
        let mut items = self.items;
        items.sort_by(DPLattice::compare);
        items
    }
}

/// Root bases that are unions of `units` (each unit taken whole), with at
/// most `max_len` elements. The empty basis is included.
pub(crate) fn bases_from_units(units: &[Vec<Div>], max_len: usize) -> Vec<Vec<Div>> {
    let mut out = Vec::new();
    extend_bases(units, 0, max_len, &mut Vec::new(), &mut out);
    out
}

fn extend_bases(
    units: &[Vec<Div>],
    start: usize,
    max_len: usize,
    current: &mut Vec<Div>,
    out: &mut Vec<Vec<Div>>,
) {
    out.push(current.clone());
    for (i, unit) in units.iter().enumerate().skip(start) {
        if current.len() + unit.len() > max_len {
            continue;
        }
        let compatible = unit.iter().all(|u| {
            unit.iter().chain(current.iter()).all(|v| u == v || matches!(u.intersection(v), 0 | 1))
        });
        if !compatible {
            continue;
        }
        let before = current.len();
        current.extend(unit.iter().cloned());
        let rows: Vec<Vec<i64>> = current.iter().map(|d| d.coeffs().to_vec()).collect();
        if span_rank(&rows) == current.len() {
            extend_bases(units, i + 1, max_len, current, out);
        }
        current.truncate(before);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div(label: &str, rank: usize) -> Div {
        Div::from_label(label, rank).unwrap()
    }

    #[test]
    fn unit_bases_respect_products_and_length() {
        let units: Vec<Vec<Div>> = ["12", "23", "13"].iter().map(|l| vec![div(l, 4)]).collect();
        let bases = bases_from_units(&units, 3);
        // [], [12], [12,23], [23], [13]
        assert_eq!(bases.len(), 5);
        assert!(bases.iter().all(|b| is_root_basis(b)));
        assert_eq!(bases_from_units(&units, 1).len(), 4);
    }

    #[test]
    fn paired_units_are_taken_whole() {
        let units = vec![vec![div("12", 5), div("34", 5)]];
        let bases = bases_from_units(&units, 4);
        assert_eq!(bases, vec![vec![], vec![div("12", 5), div("34", 5)]]);
        assert_eq!(bases_from_units(&units, 1), vec![Vec::<Div>::new()]);
    }

    #[test]
    fn tables_are_shared_until_cleared() {
        let mut classifier = Classifier::default();
        let a = classifier.tables(4);
        let b = classifier.tables(4);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.positive_roots.len(), 4);
        assert_eq!(a.roots.len(), 8);
        classifier.clear_cache();
        assert!(!Arc::ptr_eq(&a, &classifier.tables(4)));
    }

    #[test]
    fn catalog_grows_on_demand() {
        let mut classifier = Classifier::new(ClassifierConfig {
            max_rank: 3,
            ..ClassifierConfig::default()
        });
        assert_eq!(classifier.catalog(1).max_rank(), 2);
        assert_eq!(classifier.catalog(6).max_rank(), 6);
    }

    #[test]
    fn memoized_results_land_in_the_cache() {
        let mut classifier = Classifier::default();
        let first = classifier.get_bas_lst(3).unwrap();
        assert!(classifier.cache().contains("get_bas_lst(3)"));
        let second = classifier.get_bas_lst(3).unwrap();
        assert_eq!(first.len(), second.len());
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn classify_rank_touches_only_that_rank() {
        let mut classifier = Classifier::default();
        let classes = classifier.classify_rank(4, false).unwrap();
        assert!(!classes.is_empty());
        assert!(classes.iter().all(|dpl| dpl.rank() == 4));
        assert!(classifier.cache().contains("get_cls(4)"));
        assert!(!classifier.cache().contains("get_cls(3)"));
    }

    #[test]
    fn classify_rank_rejects_ranks_out_of_range() {
        let mut classifier = Classifier::default();
        for rank in [2, 10] {
            assert!(matches!(
                classifier.classify_rank(rank, true),
                Err(LatticeError::Config(_))
            ));
        }
    }
}
