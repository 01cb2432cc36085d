//! Error types for model configuration and simulation

use thiserror::Error;

/// Errors raised while validating inputs, before any integration step runs
///
/// Every variant names the offending field so a caller can surface the
/// message verbatim next to the input that produced it.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    // ─────────────────────────────────────────────────────────────────────────
    // Model structure
    // ─────────────────────────────────────────────────────────────────────────
    /// Compartment count outside the supported range
    #[error("Unsupported number of compartments: {count} (expected 1, 2 or 3)")]
    UnsupportedCompartments { count: usize },

    /// Transit absorption selected with an empty transit chain
    #[error("Transit absorption requires at least one transit compartment")]
    MissingTransitCompartments,

    // ─────────────────────────────────────────────────────────────────────────
    // Parameters
    // ─────────────────────────────────────────────────────────────────────────
    /// Required parameter absent from the parameter set
    #[error("Missing required parameter '{name}'")]
    MissingParameter { name: String },

    /// Required parameter present but not a finite, non-negative number
    #[error("Parameter '{name}' must be a finite non-negative number, got {value}")]
    InvalidParameter { name: String, value: f64 },

    // ─────────────────────────────────────────────────────────────────────────
    // Dosing regimen
    // ─────────────────────────────────────────────────────────────────────────
    /// Dose amount negative or non-finite
    #[error("Dose amount must be a finite non-negative number, got {value}")]
    InvalidDose { value: f64 },

    /// Regimen with no doses at all
    #[error("Dosing regimen must contain at least one dose")]
    EmptyRegimen,

    /// Inter-dose interval negative or non-finite
    #[error("Dosing interval must be a finite non-negative number, got {value}")]
    InvalidInterval { value: f64 },

    /// Regimen with more doses than expansion supports
    #[error("Number of doses {count} exceeds the supported maximum of {max}")]
    ExcessiveDoses { count: usize, max: usize },

    // ─────────────────────────────────────────────────────────────────────────
    // Simulation options
    // ─────────────────────────────────────────────────────────────────────────
    /// Horizon not a finite positive number
    #[error("Simulation horizon must be a finite positive number, got {value}")]
    InvalidHorizon { value: f64 },

    /// Reporting step not a finite positive number
    #[error("Reporting step must be a finite positive number, got {value}")]
    InvalidReportingStep { value: f64 },

    /// Explicit integrator step not a finite positive number
    #[error("Integrator step size must be a finite positive number, got {value}")]
    InvalidStepSize { value: f64 },

    /// Reporting grid finer than one call supports
    #[error("Reporting step {step} over horizon {horizon} exceeds {max} samples")]
    ExcessiveSamples { step: f64, horizon: f64, max: usize },

    /// Integration span requiring more sub-steps than one call supports
    #[error("Step size {step} over horizon {horizon} exceeds {max} integration steps")]
    ExcessiveSubsteps { step: f64, horizon: f64, max: usize },
}

impl ConfigurationError {
    /// Create a missing parameter error
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(name: impl Into<String>, value: f64) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value,
        }
    }
}

/// Errors raised by the numerical core once validation has passed
///
/// Either a zero divisor discovered while resolving the micro-rate constants,
/// or a state component leaving the finite range mid-integration. In both
/// cases the call returns nothing: partial trajectories are discarded.
#[derive(Debug, Error)]
pub enum NumericalError {
    /// A parameter used as a divisor is exactly zero
    #[error("Parameter '{name}' is zero but appears as a divisor")]
    ZeroDivisor { name: String },

    /// A compartment amount became NaN or infinite during integration
    #[error("State became non-finite at t = {time}")]
    NonFiniteState { time: f64 },
}

impl NumericalError {
    /// Create a zero divisor error
    pub fn zero_divisor(name: impl Into<String>) -> Self {
        Self::ZeroDivisor { name: name.into() }
    }
}

/// Top-level error type returned by the crate's entry points
#[derive(Debug, Error)]
pub enum PksolError {
    #[error("Invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Numerical failure: {0}")]
    Numerical(#[from] NumericalError),

    #[error("Failed to parse scenario JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to write trajectory as CSV: {0}")]
    Csv(#[from] csv::Error),
}
