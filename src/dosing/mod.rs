//! Dosing regimens and the dose events they expand into
//!
//! A [`DosingRegimen`] is the caller-facing description (amount, count,
//! interval). Before integration it is expanded into a schedule of
//! [`DoseEvent`]s, each an instantaneous mass addition to one compartment at
//! one time. Every administration route uses this same mechanism: an IV
//! bolus is simply an event targeting the central compartment, an oral dose
//! one targeting the depot.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Most dose events one regimen may expand into
const MAX_DOSES: usize = 100_000;

/// A repeated-bolus dosing schedule
///
/// `num_doses` doses of `dose` mass units, the i-th administered at
/// `i × interval`. With `interval = 0` all doses land at t = 0 and
/// accumulate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DosingRegimen {
    /// Mass added per dose (≥ 0)
    pub dose: f64,
    /// Number of doses (≥ 1)
    pub num_doses: usize,
    /// Time between consecutive doses (≥ 0; ignored when `num_doses` is 1)
    pub interval: f64,
}

impl DosingRegimen {
    /// A regimen of `num_doses` doses spaced `interval` apart
    pub fn new(dose: f64, num_doses: usize, interval: f64) -> Self {
        Self {
            dose,
            num_doses,
            interval,
        }
    }

    /// A single dose at t = 0
    pub fn single(dose: f64) -> Self {
        Self::new(dose, 1, 0.0)
    }

    /// Check amounts and spacing
    ///
    /// The interval only matters once there is a second dose, so a
    /// single-dose regimen passes regardless of what `interval` holds.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.dose.is_finite() || self.dose < 0.0 {
            return Err(ConfigurationError::InvalidDose { value: self.dose });
        }
        if self.num_doses < 1 {
            return Err(ConfigurationError::EmptyRegimen);
        }
        if self.num_doses > MAX_DOSES {
            return Err(ConfigurationError::ExcessiveDoses {
                count: self.num_doses,
                max: MAX_DOSES,
            });
        }
        if self.num_doses > 1 && (!self.interval.is_finite() || self.interval < 0.0) {
            return Err(ConfigurationError::InvalidInterval {
                value: self.interval,
            });
        }
        Ok(())
    }

    /// Total mass administered over the whole regimen
    pub fn total_dose(&self) -> f64 {
        self.dose * self.num_doses as f64
    }

    /// Expand the regimen into dose events targeting compartment `input`
    ///
    /// Events come back in ascending time order; expansion stops at the
    /// first dose past `horizon`, so a schedule far longer than the
    /// simulated span costs nothing. Times are computed as `i × interval`
    /// rather than accumulated, so long schedules do not drift.
    pub fn events(&self, input: usize, horizon: f64) -> Vec<DoseEvent> {
        let mut events = Vec::new();
        for i in 0..self.num_doses {
            // The first dose is at t = 0 whatever the interval holds
            let time = if i == 0 { 0.0 } else { i as f64 * self.interval };
            if time > horizon {
                break;
            }
            events.push(DoseEvent::new(time, self.dose, input));
        }
        events
    }
}

impl fmt::Display for DosingRegimen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.num_doses == 1 {
            write!(f, "single dose of {:.2}", self.dose)
        } else {
            write!(
                f,
                "{} doses of {:.2} every {:.2} time units",
                self.num_doses, self.dose, self.interval
            )
        }
    }
}

/// An instantaneous addition of drug mass to one compartment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoseEvent {
    time: f64,
    amount: f64,
    input: usize,
}

impl DoseEvent {
    /// Create a new dose event
    ///
    /// # Arguments
    ///
    /// * `time` - Time of the dose
    /// * `amount` - Amount of drug administered
    /// * `input` - The state index (zero-indexed) receiving the dose
    pub(crate) fn new(time: f64, amount: f64, input: usize) -> Self {
        DoseEvent {
            time,
            amount,
            input,
        }
    }

    /// Get the time of the dose
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Get the amount of drug in the dose
    pub fn amount(&self) -> f64 {
        self.amount
    }

    /// Get the state index (zero-indexed) that receives the dose
    pub fn input(&self) -> usize {
        self.input
    }
}

impl fmt::Display for DoseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dose at time {:.2} with amount {:.2} in compartment {}",
            self.time, self.amount, self.input
        )
    }
}
