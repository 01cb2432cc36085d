//! Simulated concentration-time output

use crate::error::PksolError;
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};

/// One reported point: central-compartment concentration at a time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub time: f64,
    pub concentration: f64,
}

/// The full concentration-time course of one simulation
///
/// Samples are ordered by strictly increasing time, starting at zero and
/// ending at the simulation horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    samples: Vec<Sample>,
}

impl Trajectory {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, time: f64, concentration: f64) {
        self.samples.push(Sample {
            time,
            concentration,
        });
    }

    /// All samples in time order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Sample times as a plain vector
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Sampled concentrations as a plain vector
    pub fn concentrations(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.concentration).collect()
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the trajectory holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Peak concentration, or `None` for an empty trajectory
    ///
    /// Ties resolve to the first occurrence.
    pub fn cmax(&self) -> Option<f64> {
        self.peak().map(|s| s.concentration)
    }

    /// Time of the peak concentration, or `None` for an empty trajectory
    ///
    /// Ties resolve to the first occurrence.
    pub fn tmax(&self) -> Option<f64> {
        self.peak().map(|s| s.time)
    }

    fn peak(&self) -> Option<&Sample> {
        self.samples.iter().fold(None, |best, sample| match best {
            Some(b) if sample.concentration <= b.concentration => Some(b),
            _ => Some(sample),
        })
    }

    /// Area under the curve by the linear trapezoidal rule
    ///
    /// Zero when the trajectory has fewer than two samples.
    pub fn auc(&self) -> f64 {
        self.samples
            .windows(2)
            .map(|pair| {
                let dt = pair[1].time - pair[0].time;
                (pair[0].concentration + pair[1].concentration) / 2.0 * dt
            })
            .sum()
    }

    /// Write the trajectory as CSV with a `time,concentration` header
    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), PksolError> {
        let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
        for sample in &self.samples {
            writer.serialize(sample)?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn triangle() -> Trajectory {
        let mut trajectory = Trajectory::with_capacity(4);
        trajectory.push(0.0, 0.0);
        trajectory.push(1.0, 10.0);
        trajectory.push(2.0, 10.0);
        trajectory.push(3.0, 0.0);
        trajectory
    }

    #[test]
    fn test_peak_reports_first_occurrence() {
        let trajectory = triangle();
        assert_eq!(trajectory.cmax(), Some(10.0));
        assert_eq!(trajectory.tmax(), Some(1.0));
    }

    #[test]
    fn test_empty_trajectory_has_no_peak() {
        let trajectory = Trajectory::default();
        assert!(trajectory.is_empty());
        assert_eq!(trajectory.cmax(), None);
        assert_eq!(trajectory.tmax(), None);
        assert_eq!(trajectory.auc(), 0.0);
    }

    #[test]
    fn test_auc_trapezoid() {
        // Trapezoid with parallel sides 10 and 10 over [1, 2] plus the two
        // triangular flanks: 5 + 10 + 5
        let trajectory = triangle();
        assert_relative_eq!(trajectory.auc(), 20.0);
    }

    #[test]
    fn test_csv_export() {
        let trajectory = triangle();
        let mut buffer = Vec::new();
        trajectory.write_csv(&mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("time,concentration"));
        assert_eq!(lines.next(), Some("0.0,0.0"));
        assert_eq!(lines.next(), Some("1.0,10.0"));
    }

    #[test]
    fn test_iterates_in_time_order() {
        let trajectory = triangle();
        let times: Vec<f64> = (&trajectory).into_iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_accessor_pairs_mirror_samples() {
        let trajectory = triangle();
        assert_eq!(trajectory.times(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(trajectory.concentrations(), vec![0.0, 10.0, 10.0, 0.0]);
        assert_eq!(trajectory.times().len(), trajectory.len());
    }
}
