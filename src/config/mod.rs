//! Declarative model configuration
//!
//! Everything a caller supplies to describe *what* to simulate lives here:
//!
//! - [`ModelConfig`]: model topology (kind, compartment count, route)
//! - [`Parameters`]: named kinetic parameters
//! - [`SimulationOptions`]: horizon, reporting grid and step override
//! - [`Scenario`]: the four inputs bundled as one (JSON-friendly) document
//!
//! All types are immutable value objects built once per request; the
//! simulation core never mutates them and holds no state between calls.

mod parameters;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dosing::DosingRegimen;
use crate::error::{ConfigurationError, PksolError};
use crate::simulator::Trajectory;

pub use parameters::Parameters;

// ═══════════════════════════════════════════════════════════════════════════════
// Model Kind
// ═══════════════════════════════════════════════════════════════════════════════

/// The structural family of the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// Linear compartmental PK (central plus up to two peripherals)
    Standard,
    /// Target-mediated drug disposition: the PK block plus a receptor pool
    /// and a drug-receptor complex with turnover and internalization
    Tmdd,
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Tmdd => write!(f, "tmdd"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Administration Route
// ═══════════════════════════════════════════════════════════════════════════════

/// How doses enter the system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Instantaneous dose straight into the central compartment
    IvBolus,
    /// Depot compartment drained into central at rate `KA`
    FirstOrderOral,
    /// Depot followed by `num_transit` transit compartments, each drained at
    /// `KTR = (num_transit + 1) / MTT`
    TransitOral { num_transit: usize },
}

impl Route {
    /// Whether the route adds a depot (GUT) compartment ahead of central
    pub fn has_depot(&self) -> bool {
        !matches!(self, Self::IvBolus)
    }

    /// Number of transit compartments contributed by the route
    pub fn num_transit(&self) -> usize {
        match self {
            Self::TransitOral { num_transit } => *num_transit,
            _ => 0,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IvBolus => write!(f, "iv_bolus"),
            Self::FirstOrderOral => write!(f, "first_order_oral"),
            Self::TransitOral { num_transit } => write!(f, "transit_oral({})", num_transit),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Model Configuration
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable description of model topology
///
/// Together, `kind`, `num_compartments` and `route` fix the set and order of
/// state variables (see [`Layout`](crate::model::Layout)) and the set of
/// required parameter names (see
/// [`required_parameters`](crate::model::required_parameters)).
///
/// For [`ModelKind::Tmdd`], `num_compartments` sizes the PK sub-model; the
/// receptor and complex states are always appended after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model family
    pub kind: ModelKind,
    /// Number of PK compartments (central + peripherals), 1 to 3
    pub num_compartments: usize,
    /// Administration route
    pub route: Route,
}

impl ModelConfig {
    /// A standard PK model
    pub fn standard(num_compartments: usize, route: Route) -> Self {
        Self {
            kind: ModelKind::Standard,
            num_compartments,
            route,
        }
    }

    /// A TMDD model over the given PK sub-model
    pub fn tmdd(num_compartments: usize, route: Route) -> Self {
        Self {
            kind: ModelKind::Tmdd,
            num_compartments,
            route,
        }
    }

    /// Check the structural invariants
    ///
    /// Run by the model builder before anything numeric happens, so invalid
    /// topologies surface as [`ConfigurationError`] with the field named.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !(1..=3).contains(&self.num_compartments) {
            return Err(ConfigurationError::UnsupportedCompartments {
                count: self.num_compartments,
            });
        }
        if let Route::TransitOral { num_transit } = self.route {
            if num_transit < 1 {
                return Err(ConfigurationError::MissingTransitCompartments);
            }
        }
        Ok(())
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-compartment, {}",
            self.kind, self.num_compartments, self.route
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Simulation Options
// ═══════════════════════════════════════════════════════════════════════════════

/// Points on the default reporting grid, horizon / REPORTING_POINTS apart
const REPORTING_POINTS: f64 = 192.0;

/// Most samples one call may report; finer grids are rejected outright
const MAX_SAMPLES: usize = 1_000_000;

/// Horizon and output grid for one simulation call
///
/// `horizon` and `reporting_step` define the reported series: samples at
/// `0, reporting_step, 2·reporting_step, …` up to and including `horizon`.
/// `step_size` overrides the integrator's internal step; leave it `None` to
/// let the integrator derive one from the model's rate constants (see
/// [`simulate`](crate::simulator::simulate)).
///
/// Grids are bounded: one call reports at most a million samples, so a
/// `reporting_step` microscopically small relative to the horizon fails
/// validation instead of exhausting memory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationOptions {
    /// End of the simulated time span (time units)
    pub horizon: f64,
    /// Spacing of reported samples (time units)
    pub reporting_step: f64,
    /// Fixed internal integration step; `None` selects one automatically
    pub step_size: Option<f64>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            horizon: 48.0,
            reporting_step: 0.25,
            step_size: None,
        }
    }
}

impl SimulationOptions {
    /// Options over a custom horizon with a proportional reporting grid
    pub fn new(horizon: f64) -> Self {
        Self {
            horizon,
            reporting_step: horizon / REPORTING_POINTS,
            step_size: None,
        }
    }

    /// Set the reporting step
    pub fn with_reporting_step(mut self, step: f64) -> Self {
        self.reporting_step = step;
        self
    }

    /// Pin the internal integration step
    pub fn with_step_size(mut self, step: f64) -> Self {
        self.step_size = Some(step);
        self
    }

    /// Check that horizon, grid and step override are usable
    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            return Err(ConfigurationError::InvalidHorizon {
                value: self.horizon,
            });
        }
        if !self.reporting_step.is_finite() || self.reporting_step <= 0.0 {
            return Err(ConfigurationError::InvalidReportingStep {
                value: self.reporting_step,
            });
        }
        if self.horizon / self.reporting_step > MAX_SAMPLES as f64 {
            return Err(ConfigurationError::ExcessiveSamples {
                step: self.reporting_step,
                horizon: self.horizon,
                max: MAX_SAMPLES,
            });
        }
        if let Some(step) = self.step_size {
            if !step.is_finite() || step <= 0.0 {
                return Err(ConfigurationError::InvalidStepSize { value: step });
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scenario
// ═══════════════════════════════════════════════════════════════════════════════

/// A complete simulation request as one document
///
/// This is the shape front-ends assemble per interaction and hand to the
/// core: model topology, parameters, dosing and options together. It
/// round-trips through JSON, with `options` falling back to
/// [`SimulationOptions::default`] when omitted.
///
/// # Example
///
/// ```
/// use pksol::config::Scenario;
///
/// let scenario = Scenario::from_json(
///     r#"{
///         "model": {
///             "kind": "standard",
///             "num_compartments": 1,
///             "route": "iv_bolus"
///         },
///         "parameters": {"CL": 1.0, "V": 10.0},
///         "regimen": {"dose": 100.0, "num_doses": 1, "interval": 0.0}
///     }"#,
/// )
/// .unwrap();
/// let trajectory = scenario.simulate().unwrap();
/// assert!(!trajectory.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Model topology
    pub model: ModelConfig,
    /// Kinetic parameters
    pub parameters: Parameters,
    /// Dosing regimen
    pub regimen: DosingRegimen,
    /// Horizon and output grid
    #[serde(default)]
    pub options: SimulationOptions,
}

impl Scenario {
    /// Bundle a request with default options
    pub fn new(model: ModelConfig, parameters: Parameters, regimen: DosingRegimen) -> Self {
        Self {
            model,
            parameters,
            regimen,
            options: SimulationOptions::default(),
        }
    }

    /// Parse a scenario document
    pub fn from_json(text: &str) -> Result<Self, PksolError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize the scenario back to JSON
    pub fn to_json(&self) -> Result<String, PksolError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Run the request through the simulation core
    pub fn simulate(&self) -> Result<Trajectory, PksolError> {
        crate::simulator::simulate(&self.model, &self.parameters, &self.regimen, &self.options)
    }
}
