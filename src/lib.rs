//! # abundance-statistics
//!
//! Descriptive and inferential statistics for biological abundance tables: taxonomic
//! abundance matrices from metagenomics and metabolite abundance matrices from metabolomics.
//!
//! The crate works on a dense [`AbundanceTable`] (entities × samples) and never mutates it;
//! every transform returns a new table or a fresh result container.
//!
//! ## Core Features
//!
//! - **Alpha Diversity**: Shannon, Simpson and richness per sample
//! - **Normalization**: log2 with pseudocount, per-entity z-score and min-max scaling
//! - **Differential Abundance**: two-group Student's or Welch's t-tests with fold changes
//!   and significance flags
//! - **Explicit Degenerate Handling**: all-zero samples, constant rows and zero reference
//!   means either fail with [`AnalysisError::DegenerateInput`] or propagate as NaN/inf,
//!   chosen through [`DegeneratePolicy`]
//!
//! ## Quick Start
//!
//! Build an [`AbundanceTable`], then use the [`DiversityCalculator`], [`Normalizer`] and
//! [`DifferentialAnalyzer`] traits on it. The three are independent of each other.
//!
//! ## Module Organization
//!
//! - **[`data`]**: The abundance table and its identifier lookups
//! - **[`diversity`]**: Alpha diversity indices
//! - **[`normalization`]**: Per-entity and elementwise rescaling
//! - **[`testing`]**: Two-group t-tests, fold changes and differential results
//! - **[`error`]**: Error taxonomy and degenerate-input policy
//!
//! Logging goes through the `log` facade; installing a logger is left to the application.

pub mod data;
pub mod diversity;
pub mod error;
pub mod normalization;
pub mod testing;

pub use data::AbundanceTable;
pub use diversity::{DiversityCalculator, DiversityMethod, DiversityResult};
pub use error::{AnalysisError, DegeneratePolicy, Result};
pub use normalization::{NormalizationMethod, Normalizer};
pub use testing::inference::DifferentialAnalyzer;
pub use testing::{DifferentialOptions, DifferentialResult, DifferentialResults, TTestType};
