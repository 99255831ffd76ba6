#![doc = include_str!("../README.md")]
// EngineError carries parser/lowering diagnostics with their source text;
// boxing would complicate every call site for no practical gain.
#![allow(clippy::result_large_err)]

//! Petrel analysis engine.
//!
//! Fixed-point computations over extended-integer vectors
//! (`MinInitCons`, `Safe`, `SafePR`), counter-selector synthesis, the
//! selector-induced product chain, qualitative reachability, semantic
//! validation, and the one-shot pipeline tying them together.

pub mod error;
pub mod min_init_cons;
pub mod pipeline;
pub mod product;
pub mod reachability;
pub mod result;
pub mod safe;
pub mod safe_pr;
pub mod validator;

pub use error::EngineError;
pub use pipeline::{analyse, run_pipeline, PipelineOptions};
pub use result::AnalysisReport;
