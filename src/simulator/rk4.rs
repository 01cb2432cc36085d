//! Fixed-step classical Runge-Kutta integration

use crate::error::NumericalError;
use crate::simulator::{OdeSystem, T, V};

/// Classical fourth-order Runge-Kutta stepper with a fixed base step
///
/// The four stage buffers are allocated once per instance and reused across
/// steps. Each simulation call owns its own `Rk4`, so concurrent runs share
/// nothing.
#[derive(Debug, Clone)]
pub struct Rk4 {
    step: f64,
    k1: V,
    k2: V,
    k3: V,
    k4: V,
    stage: V,
}

impl Rk4 {
    /// Create a stepper with base step `step` for systems of `num_states`
    pub fn new(step: f64, num_states: usize) -> Self {
        Self {
            step,
            k1: V::zeros(num_states),
            k2: V::zeros(num_states),
            k3: V::zeros(num_states),
            k4: V::zeros(num_states),
            stage: V::zeros(num_states),
        }
    }

    /// Advance `x` in place from `t0` to `t1`
    ///
    /// The span is split into equal sub-steps no larger than the base step,
    /// so the integration lands exactly on `t1` rather than overshooting it.
    /// Aborts with [`NumericalError::NonFiniteState`] the moment any state
    /// component leaves the finite range.
    pub fn advance<S: OdeSystem>(
        &mut self,
        system: &S,
        x: &mut V,
        t0: T,
        t1: T,
    ) -> Result<(), NumericalError> {
        if t1 <= t0 {
            return Ok(());
        }
        let span = t1 - t0;
        let num_steps = (span / self.step).ceil().max(1.0) as usize;
        let h = span / num_steps as f64;

        for i in 0..num_steps {
            let t = t0 + i as f64 * h;
            self.step_once(system, x, t, h);
            if x.iter().any(|v| !v.is_finite()) {
                return Err(NumericalError::NonFiniteState { time: t + h });
            }
        }
        Ok(())
    }

    /// One classical RK4 step of size `h` starting at time `t`
    fn step_once<S: OdeSystem>(&mut self, system: &S, x: &mut V, t: T, h: T) {
        let half = 0.5 * h;

        system.derivs(t, x, &mut self.k1);

        self.stage.copy_from(x);
        self.stage.axpy(half, &self.k1, 1.0);
        system.derivs(t + half, &self.stage, &mut self.k2);

        self.stage.copy_from(x);
        self.stage.axpy(half, &self.k2, 1.0);
        system.derivs(t + half, &self.stage, &mut self.k3);

        self.stage.copy_from(x);
        self.stage.axpy(h, &self.k3, 1.0);
        system.derivs(t + h, &self.stage, &mut self.k4);

        let weight = h / 6.0;
        x.axpy(weight, &self.k1, 1.0);
        x.axpy(2.0 * weight, &self.k2, 1.0);
        x.axpy(2.0 * weight, &self.k3, 1.0);
        x.axpy(weight, &self.k4, 1.0);
    }
}
