use miette::Diagnostic;
use thiserror::Error;

use petrel_dsl::ParseError;
use petrel_ir::ext_int::ExtIntError;
use petrel_ir::lowering::SpannedLoweringError;

/// Errors surfaced by the analysis pipeline.
///
/// Nothing is swallowed inside the engine; every failure propagates to the
/// CLI boundary. There are no transient conditions and nothing is retried.
#[derive(Debug, Error, Diagnostic)]
pub enum EngineError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    /// The model parsed but violates a shape restriction (module count,
    /// labels, rewards, arity, distributions).
    #[error(transparent)]
    #[diagnostic(transparent)]
    UnsupportedModel(#[from] SpannedLoweringError),

    #[error("missing integer constant `capacity` (declare it in the model or pass a capacity override)")]
    #[diagnostic(code(petrel::engine::missing_capacity))]
    MissingCapacity,

    /// Extended-integer arithmetic failed. The analyses never add opposite
    /// infinities, so this is a bug flag rather than an input error.
    #[error("extended-integer arithmetic failed: {0}")]
    #[diagnostic(code(petrel::engine::arithmetic))]
    Arithmetic(#[from] ExtIntError),

    /// The computed counter selector failed semantic validation on the
    /// product chain. The computation itself completed; the report is
    /// still available.
    #[error("counter selector failed validation on the product chain")]
    #[diagnostic(code(petrel::engine::validation_failed))]
    ValidationFailed,

    #[error("I/O error: {0}")]
    #[diagnostic(code(petrel::engine::io))]
    Io(#[from] std::io::Error),
}
