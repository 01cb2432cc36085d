//! Fixed-step simulation of compiled compartment models
//!
//! [`simulate`] is the one entry point: it validates the request, compiles
//! the model, expands the dosing regimen into a timeline and integrates the
//! system with classical RK4, reporting central-compartment concentrations
//! on the caller's grid. The call is pure: same inputs, same trajectory, and
//! nothing is retained between calls.

mod rk4;
mod trajectory;

pub use rk4::Rk4;
pub use trajectory::{Sample, Trajectory};

use crate::config::{ModelConfig, Parameters, SimulationOptions};
use crate::dosing::DosingRegimen;
use crate::error::{ConfigurationError, NumericalError, PksolError};
use crate::model::OdeModel;

pub type T = f64;
pub type V = nalgebra::DVector<T>;

/// Largest step the automatic policy will pick
const DEFAULT_MAX_STEP: f64 = 0.1;
/// Smallest step the automatic policy will pick
const MIN_STEP: f64 = 1e-4;
/// Sub-steps per characteristic time of the fastest resolved rate
const STEPS_PER_RATE: f64 = 50.0;
/// Most internal integration steps one call may take
const MAX_SUBSTEPS: usize = 10_000_000;

/// A first-order ODE system `dx/dt = f(t, x)`
pub trait OdeSystem {
    /// Write the time derivative of `x` into `dx`
    ///
    /// Implementations must assign every component of `dx`: the integrator
    /// reuses its stage buffers across calls without zeroing them.
    fn derivs(&self, t: T, x: &V, dx: &mut V);
}

/// Simulate a dosing regimen against a configured model
///
/// Validation is all-or-nothing: any invalid input returns a
/// [`ConfigurationError`](crate::error::ConfigurationError) before a single
/// integration step runs, and a mid-run numerical failure discards the
/// partial trajectory.
///
/// Doses are instantaneous additions to the model's dose compartment at
/// `0, interval, 2·interval, …`; doses falling after the horizon are
/// ignored. When a dose coincides with a reporting time the dose is applied
/// first, so the sample reflects the post-dose state. The internal step is
/// `options.step_size` when set, otherwise derived from the fastest rate
/// constant in the model and clamped to `[1e-4, 0.1]`.
///
/// Work per call is bounded: at most a million reported samples and ten
/// million internal steps. A horizon-and-step combination past either
/// ceiling is rejected as a [`ConfigurationError`] rather than left to run
/// without bound.
///
/// # Example
///
/// ```
/// use pksol::config::{ModelConfig, Parameters, Route, SimulationOptions};
/// use pksol::dosing::DosingRegimen;
/// use pksol::simulator::simulate;
///
/// let config = ModelConfig::standard(1, Route::IvBolus);
/// let parameters = Parameters::default().with("CL", 1.0).with("V", 10.0);
/// let regimen = DosingRegimen::single(100.0);
/// let options = SimulationOptions::new(24.0);
///
/// let trajectory = simulate(&config, &parameters, &regimen, &options).unwrap();
/// assert_eq!(trajectory.samples().first().map(|s| s.concentration), Some(10.0));
/// ```
pub fn simulate(
    config: &ModelConfig,
    parameters: &Parameters,
    regimen: &DosingRegimen,
    options: &SimulationOptions,
) -> Result<Trajectory, PksolError> {
    options.validate()?;
    regimen.validate()?;
    let model = OdeModel::new(config, parameters)?;

    let step = match options.step_size {
        Some(step) => step,
        None => auto_step(&model, regimen),
    };
    if options.horizon / step > MAX_SUBSTEPS as f64 {
        return Err(ConfigurationError::ExcessiveSubsteps {
            step,
            horizon: options.horizon,
            max: MAX_SUBSTEPS,
        }
        .into());
    }

    let trajectory = run(&model, regimen, options, step)?;
    Ok(trajectory)
}

/// Integrate a compiled model over the reporting grid
fn run(
    model: &OdeModel,
    regimen: &DosingRegimen,
    options: &SimulationOptions,
    step: f64,
) -> Result<Trajectory, NumericalError> {
    let horizon = options.horizon;
    let doses = regimen.events(model.layout().dose_input(), horizon);
    let times = sample_times(horizon, options.reporting_step);

    tracing::debug!(
        "integrating {} doses over [0, {}] with step {:.5} ({} samples)",
        doses.len(),
        horizon,
        step,
        times.len()
    );

    let mut rk4 = Rk4::new(step, model.layout().num_states());
    let mut x = model.initial_state();
    let mut t = 0.0;
    let mut next_dose = 0;
    let mut trajectory = Trajectory::with_capacity(times.len());

    for &sample_time in &times {
        // Apply every dose due at or before this sample; a dose exactly on
        // the sample lands first, so the report sees the post-dose state.
        while next_dose < doses.len() && doses[next_dose].time() <= sample_time {
            let dose = &doses[next_dose];
            rk4.advance(model, &mut x, t, dose.time())?;
            t = dose.time();
            x[dose.input()] += dose.amount();
            next_dose += 1;
        }
        rk4.advance(model, &mut x, t, sample_time)?;
        t = sample_time;
        trajectory.push(sample_time, model.concentration(&x));
    }

    Ok(trajectory)
}

/// Reporting times: multiples of `reporting_step`, closed at the horizon
fn sample_times(horizon: f64, reporting_step: f64) -> Vec<f64> {
    let mut times = Vec::with_capacity((horizon / reporting_step) as usize + 2);
    let mut k = 0usize;
    loop {
        let t = k as f64 * reporting_step;
        if t > horizon {
            break;
        }
        times.push(t);
        k += 1;
    }
    if times.last().map_or(true, |&t| t < horizon) {
        times.push(horizon);
    }
    times
}

/// Derive a step from the fastest rate constant in the model
///
/// The drug-dependent binding rate is scaled by the concentration reached if
/// the whole regimen were in the central compartment at once, a deliberate
/// overestimate.
fn auto_step(model: &OdeModel, regimen: &DosingRegimen) -> f64 {
    let conc_scale = regimen.total_dose() / model.volume();
    let max_rate = model.max_rate(conc_scale);
    if max_rate <= 0.0 {
        return DEFAULT_MAX_STEP;
    }
    let step = (1.0 / (STEPS_PER_RATE * max_rate)).clamp(MIN_STEP, DEFAULT_MAX_STEP);
    if step == MIN_STEP {
        tracing::warn!(
            "fastest rate constant {:.3} pushes the integrator step to its floor of {}",
            max_rate,
            MIN_STEP
        );
    }
    step
}
