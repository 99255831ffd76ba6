//! One-shot analysis pipeline: parse → lower → `MinInitCons` → `Safe` →
//! `SafePR` → product → validation → report.

use std::time::Instant;
use tracing::{info, warn};

use crate::error::EngineError;
use crate::min_init_cons::compute_min_init_cons;
use crate::product::ProductChain;
use crate::result::{AnalysisReport, PhaseTimings};
use crate::safe_pr::compute_safe_pr;
use crate::validator::validate_counter_selector;
use petrel_ir::lowering::lower_with_source;
use petrel_ir::Cmdp;

/// Knobs for one pipeline run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Use this capacity instead of the model's `capacity` constant.
    pub capacity_override: Option<u32>,
}

/// Run the full analysis on a model source.
///
/// The computation always runs to completion; a selector that fails
/// validation is reported through [`AnalysisReport::selector_valid`], not
/// as an error (the caller decides whether that is fatal).
pub fn run_pipeline(
    source: &str,
    filename: &str,
    options: &PipelineOptions,
) -> Result<AnalysisReport, EngineError> {
    let model = petrel_dsl::parse(source, filename)?;
    let lowered = lower_with_source(&model, source, filename)?;
    let capacity = options
        .capacity_override
        .or(lowered.capacity)
        .ok_or(EngineError::MissingCapacity)?;
    info!(
        states = lowered.cmdp.num_states(),
        actions = lowered.cmdp.num_actions(),
        capacity,
        "model lowered"
    );
    if let (Some(chosen), Some(declared)) = (options.capacity_override, lowered.capacity) {
        if chosen != declared {
            warn!(declared, chosen, "capacity override replaces the model constant");
        }
    }
    analyse(&lowered.cmdp, capacity)
}

/// Run the analyses on an already-built model.
pub fn analyse(cmdp: &Cmdp, capacity: u32) -> Result<AnalysisReport, EngineError> {
    let mut timings = PhaseTimings::default();

    let clock = Instant::now();
    let min_init_cons = compute_min_init_cons(cmdp)?;
    timings.min_init_cons_secs = clock.elapsed().as_secs_f64();
    info!("MinInitCons fixed point reached");

    // `compute_safe_pr` recomputes Safe internally; time it separately so
    // the report mirrors the three-phase structure.
    let clock = Instant::now();
    let safe = crate::safe::compute_safe(cmdp, capacity)?;
    timings.safe_secs = clock.elapsed().as_secs_f64();
    info!("Safe fixed point reached");

    let clock = Instant::now();
    let outcome = compute_safe_pr(cmdp, capacity)?;
    timings.safe_pr_secs = clock.elapsed().as_secs_f64();
    info!("SafePR fixed point reached");
    debug_assert_eq!(outcome.safe, safe);

    let clock = Instant::now();
    let product = ProductChain::build(cmdp, &outcome.selector);
    let selector_valid = validate_counter_selector(&product, &outcome.values, capacity)?;
    timings.validation_secs = clock.elapsed().as_secs_f64();
    info!(product_states = product.num_states(), selector_valid, "validation finished");

    Ok(AnalysisReport {
        capacity,
        min_init_cons,
        safe,
        safe_pr: outcome.values,
        selector: outcome.selector,
        selector_valid,
        timings,
    })
}
