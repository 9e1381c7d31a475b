/// Tolerance on `Σ w = 1` for stacking weights.
pub const SIMPLEX_TOLERANCE: f64 = 1e-6;
/// Tolerance used to decide that two prediction columns are identical.
pub const IDENTICAL_TOLERANCE: f64 = 1e-12;
/// Numeric tolerance for the active-set and IRLS solvers.
pub const NUMERIC_TOLERANCE: f64 = 1e-10;
/// Probabilities are clamped into `[ε, 1 - ε]` before taking logs.
pub const PROBABILITY_CLAMP: f64 = 1e-6;
/// Ridge added to the diagonal of normal equations in the learners.
pub const RIDGE_JITTER: f64 = 1e-8;
/// Smallest censoring probability used as a divisor.
pub const MIN_CENSORING_PROBABILITY: f64 = 1e-6;

/// Default number of folds.
pub const DEFAULT_N_FOLDS: usize = 10;
/// Default seed for shuffling.
pub const DEFAULT_SEED: u64 = 1234;
/// Default name of the person-period time column.
pub const DEFAULT_TIME_COLUMN: &str = "time";

/// Iteration budget of the NNLS active-set loop, per candidate.
pub const NNLS_ITER_PER_COLUMN: usize = 30;
/// Iteration budget of IRLS loops.
pub const IRLS_MAX_ITER: usize = 100;
/// Iteration budget of the Frank-Wolfe loop.
pub const FRANK_WOLFE_MAX_ITER: usize = 10_000;
/// Relative duality-gap tolerance of the Frank-Wolfe loop.
pub const FRANK_WOLFE_TOLERANCE: f64 = 1e-8;
