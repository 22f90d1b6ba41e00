//! Néron-Severi lattices of real weak del Pezzo surfaces.
//!
//! A weak del Pezzo surface of degree `10 - rank` is recorded by its
//! Néron-Severi lattice `<h, e1, .., e(rank-1)>`, a root basis of effective
//! (-2)-classes (its singularities) and the unimodular involution induced by
//! the real structure. This crate enumerates those triples up to equivalence.
//!
//! # Components
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`div`] | Divisor classes, labels, intersection forms |
//! | [`div_set`] | Enumeration of (-2)-, (-1)- and conic classes |
//! | [`root_bases`] | Dynkin types and root-basis classification |
//! | [`involutions`] | Integral involutions from root bases |
//! | [`dp_lattice`] | Enhanced lattices and their derived data |
//! | [`classify`] | The memoizing [`Classifier`] driving everything |
//! | [`contraction`] | Bases obtained by contracting (-1)-curves |
//! | [`report`] | Text tables of classification results |
//!
//! # Entry Point
//!
//! ```
//! use ns_lattice::{Classifier, ClassificationReport};
//!
//! # fn main() -> ns_lattice::Result<()> {
//! let mut classifier = Classifier::default();
//! let lattices = classifier.get_cls(4)?;
//! assert_eq!(lattices.len(), 12);
//! let report: ClassificationReport = lattices.iter().collect();
//! println!("{}", report.render());
//! # Ok(())
//! # }
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod cache;
pub mod classify;
pub mod config;
pub mod contraction;
pub mod div;
pub mod div_set;
pub mod dp_lattice;
pub mod dynkin;
pub mod error;
pub mod eta;
pub mod graph;
pub mod involutions;
pub mod linalg;
pub mod report;
pub mod root_bases;

pub use cache::{cache_key, ToolCache};
pub use classify::Classifier;
pub use config::{ClassifierConfig, MIN_RANK};
pub use contraction::get_base_changes;
pub use div::{Div, Form};
pub use div_set::MAX_RANK;
pub use dp_lattice::DPLattice;
pub use error::{LatticeError, Result};
pub use eta::Eta;
pub use involutions::Involution;
pub use linalg::IntMatrix;
pub use report::{ClassRow, ClassificationReport};
