//! Model builder: from declarative configuration to a compiled ODE system
//!
//! [`OdeModel::new`] resolves every micro-rate constant exactly once into a
//! small set of tagged variants: elimination `K10 = CL/V1`, the
//! per-peripheral exchange pairs, the absorption rate (`KA`, or
//! `KTR = (N+1)/MTT` for a transit chain) and the TMDD binding rates. The
//! integration hot path then evaluates one compiled derivative function; no
//! configuration is inspected per step.
//!
//! Initial conditions are always zero: an IV bolus enters through a dose
//! event, never through a nonzero initial state.

mod layout;

use crate::config::{ModelConfig, ModelKind, Parameters, Route};
use crate::error::{NumericalError, PksolError};
use crate::simulator::{OdeSystem, T, V};

pub use layout::{Compartment, Layout};

/// Parameter names required by a configuration, in display order
///
/// The exact analogue of the tables UIs render input fields from:
///
/// | Configuration | Names |
/// |---|---|
/// | 1 compartment | `CL, V` |
/// | 2 compartments | `CL, V1, Q, V2` |
/// | 3 compartments | `CL, V1, Q2, V2, Q3, V3` |
/// | + first-order oral | `KA` |
/// | + transit oral | `MTT` |
/// | + TMDD | `KINT, KON, KOFF, KSYN, KDEG` |
pub fn required_parameters(config: &ModelConfig) -> Vec<&'static str> {
    let mut names = match config.num_compartments {
        1 => vec!["CL", "V"],
        2 => vec!["CL", "V1", "Q", "V2"],
        _ => vec!["CL", "V1", "Q2", "V2", "Q3", "V3"],
    };
    match config.route {
        Route::IvBolus => {}
        Route::FirstOrderOral => names.push("KA"),
        Route::TransitOral { .. } => names.push("MTT"),
    }
    if config.kind == ModelKind::Tmdd {
        names.extend(["KINT", "KON", "KOFF", "KSYN", "KDEG"]);
    }
    names
}

/// Absorption block resolved from the route
#[derive(Debug, Clone, Copy, PartialEq)]
enum Absorption {
    /// IV bolus: no depot states
    None,
    /// Depot drained into central at `ka`
    FirstOrder { ka: f64 },
    /// Depot plus `n` transit compartments, each turning over at `ktr`
    Transit { ktr: f64, n: usize },
}

/// One central ↔ peripheral exchange pair, rates already divided by volume
#[derive(Debug, Clone, Copy, PartialEq)]
struct Exchange {
    /// Central → peripheral rate (K12 or K13)
    k1p: f64,
    /// Peripheral → central rate (K21 or K31)
    kp1: f64,
    /// State index of the peripheral compartment
    index: usize,
}

/// TMDD binding rates and the state indices they act on
#[derive(Debug, Clone, Copy, PartialEq)]
struct Binding {
    kon: f64,
    koff: f64,
    kint: f64,
    ksyn: f64,
    kdeg: f64,
    receptor: usize,
    complex: usize,
}

/// A compiled compartmental model ready for integration
///
/// Built once per simulation request from a [`ModelConfig`] and a
/// [`Parameters`] set. Plain `Send + Sync` data; concurrent runs over the
/// same model are sound because [`OdeSystem::derivs`] takes `&self`.
#[derive(Debug, Clone, PartialEq)]
pub struct OdeModel {
    layout: Layout,
    volume: f64,
    k10: f64,
    absorption: Absorption,
    exchanges: Vec<Exchange>,
    binding: Option<Binding>,
}

impl OdeModel {
    /// Resolve a configuration and parameter set into a compiled model
    ///
    /// Fails with [`ConfigurationError`](crate::error::ConfigurationError)
    /// for structural problems or missing/invalid required parameters, and
    /// with [`NumericalError`] when a parameter that appears as a divisor
    /// (V, V1, V2, V3, MTT) is zero.
    pub fn new(config: &ModelConfig, params: &Parameters) -> Result<Self, PksolError> {
        let layout = Layout::new(config)?;

        let volume_name = if config.num_compartments == 1 { "V" } else { "V1" };
        let cl = params.require("CL")?;
        let volume = params.require(volume_name)?;
        let k10 = checked_div(cl, volume, volume_name)?;

        let central = layout.central();
        let mut exchanges = Vec::with_capacity(config.num_compartments - 1);
        match config.num_compartments {
            1 => {}
            2 => {
                let q = params.require("Q")?;
                let v2 = params.require("V2")?;
                exchanges.push(Exchange {
                    k1p: checked_div(q, volume, volume_name)?,
                    kp1: checked_div(q, v2, "V2")?,
                    index: central + 1,
                });
            }
            _ => {
                let q2 = params.require("Q2")?;
                let v2 = params.require("V2")?;
                let q3 = params.require("Q3")?;
                let v3 = params.require("V3")?;
                exchanges.push(Exchange {
                    k1p: checked_div(q2, volume, volume_name)?,
                    kp1: checked_div(q2, v2, "V2")?,
                    index: central + 1,
                });
                exchanges.push(Exchange {
                    k1p: checked_div(q3, volume, volume_name)?,
                    kp1: checked_div(q3, v3, "V3")?,
                    index: central + 2,
                });
            }
        }

        let absorption = match config.route {
            Route::IvBolus => Absorption::None,
            Route::FirstOrderOral => Absorption::FirstOrder {
                ka: params.require("KA")?,
            },
            Route::TransitOral { num_transit } => {
                let mtt = params.require("MTT")?;
                Absorption::Transit {
                    ktr: checked_div(num_transit as f64 + 1.0, mtt, "MTT")?,
                    n: num_transit,
                }
            }
        };

        let binding = match config.kind {
            ModelKind::Standard => None,
            ModelKind::Tmdd => Some(Binding {
                kint: params.require("KINT")?,
                kon: params.require("KON")?,
                koff: params.require("KOFF")?,
                ksyn: params.require("KSYN")?,
                kdeg: params.require("KDEG")?,
                // TMDD layouts always end [.., RECEPTOR, COMPLEX]
                receptor: layout.num_states() - 2,
                complex: layout.num_states() - 1,
            }),
        };

        tracing::debug!(
            "compiled {} model: {} states [{}], k10 = {:.5}",
            config.kind,
            layout.num_states(),
            layout,
            k10
        );

        Ok(Self {
            layout,
            volume,
            k10,
            absorption,
            exchanges,
            binding,
        })
    }

    /// The state-vector layout
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Central compartment volume (V or V1) used for output scaling
    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Fresh all-zero state vector
    pub fn initial_state(&self) -> V {
        V::zeros(self.layout.num_states())
    }

    /// Output concentration for a state: CENTRAL amount over central volume
    pub fn concentration(&self, x: &V) -> f64 {
        x[self.layout.central()] / self.volume
    }

    /// Largest resolved first-order rate constant, for step-size selection
    ///
    /// `conc_scale` converts the second-order `KON` into a rate: callers pass
    /// the largest plausible driving concentration (total dose over central
    /// volume).
    pub(crate) fn max_rate(&self, conc_scale: f64) -> f64 {
        let mut k_max = self.k10;
        match self.absorption {
            Absorption::None => {}
            Absorption::FirstOrder { ka } => k_max = k_max.max(ka),
            Absorption::Transit { ktr, .. } => k_max = k_max.max(ktr),
        }
        for exchange in &self.exchanges {
            k_max = k_max.max(exchange.k1p).max(exchange.kp1);
        }
        if let Some(binding) = &self.binding {
            k_max = k_max
                .max(binding.kdeg)
                .max(binding.koff + binding.kint)
                .max(binding.kon * conc_scale);
        }
        k_max
    }
}

impl OdeSystem for OdeModel {
    // Every state slot is assigned unconditionally below, so the caller's
    // dx buffer never needs zeroing first.
    fn derivs(&self, _t: T, x: &V, dx: &mut V) {
        let central = self.layout.central();
        let xc = x[central];

        let inflow = match self.absorption {
            Absorption::None => 0.0,
            Absorption::FirstOrder { ka } => {
                dx[0] = -ka * x[0];
                ka * x[0]
            }
            Absorption::Transit { ktr, n } => {
                dx[0] = -ktr * x[0];
                for i in 1..=n {
                    dx[i] = ktr * (x[i - 1] - x[i]);
                }
                ktr * x[n]
            }
        };

        let mut dc = inflow - self.k10 * xc;
        for exchange in &self.exchanges {
            let xp = x[exchange.index];
            dc += exchange.kp1 * xp - exchange.k1p * xc;
            dx[exchange.index] = exchange.k1p * xc - exchange.kp1 * xp;
        }

        if let Some(binding) = &self.binding {
            let conc = xc / self.volume;
            let receptor = x[binding.receptor];
            let complex = x[binding.complex];
            let association = binding.kon * conc * receptor;
            let dissociation = binding.koff * complex;

            dx[binding.receptor] =
                binding.ksyn - binding.kdeg * receptor - association + dissociation;
            dx[binding.complex] = association - dissociation - binding.kint * complex;
            // Bound drug leaves plasma; dissociating drug returns to it.
            dc += (dissociation - association) * self.volume;
        }

        dx[central] = dc;
    }
}

/// Divide, rejecting an exactly-zero denominator with the parameter named
fn checked_div(
    numerator: f64,
    denominator: f64,
    name: &'static str,
) -> Result<f64, NumericalError> {
    if denominator == 0.0 {
        return Err(NumericalError::zero_divisor(name));
    }
    Ok(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigurationError;
    use approx::assert_relative_eq;

    fn derivs_for(model: &OdeModel, x: &V) -> V {
        let mut dx = V::zeros(x.len());
        model.derivs(0.0, x, &mut dx);
        dx
    }

    #[test]
    fn test_required_parameters_per_config() {
        let config = ModelConfig::standard(1, Route::IvBolus);
        assert_eq!(required_parameters(&config), vec!["CL", "V"]);

        let config = ModelConfig::standard(2, Route::FirstOrderOral);
        assert_eq!(required_parameters(&config), vec!["CL", "V1", "Q", "V2", "KA"]);

        let config = ModelConfig::standard(3, Route::IvBolus);
        assert_eq!(
            required_parameters(&config),
            vec!["CL", "V1", "Q2", "V2", "Q3", "V3"]
        );

        let config = ModelConfig::tmdd(1, Route::TransitOral { num_transit: 4 });
        assert_eq!(
            required_parameters(&config),
            vec!["CL", "V", "MTT", "KINT", "KON", "KOFF", "KSYN", "KDEG"]
        );
    }

    #[test]
    fn test_missing_parameter_is_named() {
        let config = ModelConfig::standard(2, Route::IvBolus);
        let params = Parameters::new().with("CL", 5.0).with("V1", 50.0).with("V2", 30.0);
        let err = OdeModel::new(&config, &params).unwrap_err();
        match err {
            PksolError::Configuration(ConfigurationError::MissingParameter { name }) => {
                assert_eq!(name, "Q")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_zero_volume_is_numerical() {
        let config = ModelConfig::standard(1, Route::IvBolus);
        let params = Parameters::new().with("CL", 5.0).with("V", 0.0);
        let err = OdeModel::new(&config, &params).unwrap_err();
        match err {
            PksolError::Numerical(NumericalError::ZeroDivisor { name }) => {
                assert_eq!(name, "V")
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let config = ModelConfig::standard(1, Route::TransitOral { num_transit: 4 });
        let params = Parameters::new().with("CL", 5.0).with("V", 10.0).with("MTT", 0.0);
        let err = OdeModel::new(&config, &params).unwrap_err();
        assert!(matches!(
            err,
            PksolError::Numerical(NumericalError::ZeroDivisor { ref name }) if name == "MTT"
        ));
    }

    #[test]
    fn test_two_compartment_rates() {
        // CL=2, V1=10 -> k10=0.2; Q=3 -> k12=0.3, k21=Q/V2=0.5
        let config = ModelConfig::standard(2, Route::IvBolus);
        let params = Parameters::new()
            .with("CL", 2.0)
            .with("V1", 10.0)
            .with("Q", 3.0)
            .with("V2", 6.0);
        let model = OdeModel::new(&config, &params).unwrap();

        let x = V::from_vec(vec![10.0, 4.0]);
        let dx = derivs_for(&model, &x);
        assert_relative_eq!(dx[0], -(0.2 + 0.3) * 10.0 + 0.5 * 4.0, max_relative = 1e-12);
        assert_relative_eq!(dx[1], 0.3 * 10.0 - 0.5 * 4.0, max_relative = 1e-12);
    }

    #[test]
    fn test_three_compartment_uses_pairwise_clearances() {
        // Q2 pairs with V2, Q3 with V3
        let config = ModelConfig::standard(3, Route::IvBolus);
        let params = Parameters::new()
            .with("CL", 1.0)
            .with("V1", 10.0)
            .with("Q2", 2.0)
            .with("V2", 4.0)
            .with("Q3", 5.0)
            .with("V3", 20.0);
        let model = OdeModel::new(&config, &params).unwrap();

        let x = V::from_vec(vec![10.0, 0.0, 0.0]);
        let dx = derivs_for(&model, &x);
        // k12 = 0.2, k13 = 0.5, k10 = 0.1
        assert_relative_eq!(dx[0], -(0.1 + 0.2 + 0.5) * 10.0, max_relative = 1e-12);
        assert_relative_eq!(dx[1], 0.2 * 10.0, max_relative = 1e-12);
        assert_relative_eq!(dx[2], 0.5 * 10.0, max_relative = 1e-12);
    }

    #[test]
    fn test_transit_chain_rates() {
        // N=3, MTT=8 -> KTR = 0.5
        let config = ModelConfig::standard(1, Route::TransitOral { num_transit: 3 });
        let params = Parameters::new().with("CL", 1.0).with("V", 10.0).with("MTT", 8.0);
        let model = OdeModel::new(&config, &params).unwrap();

        let x = V::from_vec(vec![8.0, 2.0, 0.0, 4.0, 6.0]);
        let dx = derivs_for(&model, &x);
        assert_relative_eq!(dx[0], -0.5 * 8.0, max_relative = 1e-12);
        assert_relative_eq!(dx[1], 0.5 * (8.0 - 2.0), max_relative = 1e-12);
        assert_relative_eq!(dx[2], 0.5 * (2.0 - 0.0), max_relative = 1e-12);
        assert_relative_eq!(dx[3], 0.5 * (0.0 - 4.0), max_relative = 1e-12);
        // central: inflow 0.5*x[3] minus elimination 0.1*x[4]
        assert_relative_eq!(dx[4], 0.5 * 4.0 - 0.1 * 6.0, max_relative = 1e-12);
    }

    #[test]
    fn test_tmdd_binding_conserves_drug_mass() {
        // With elimination, turnover and internalization off, drug mass
        // CENTRAL + V1·COMPLEX must be invariant under binding flux.
        let config = ModelConfig::tmdd(1, Route::IvBolus);
        let params = Parameters::new()
            .with("CL", 0.0)
            .with("V", 5.0)
            .with("KON", 0.3)
            .with("KOFF", 0.2)
            .with("KINT", 0.0)
            .with("KSYN", 0.0)
            .with("KDEG", 0.0);
        let model = OdeModel::new(&config, &params).unwrap();

        let x = V::from_vec(vec![50.0, 2.0, 1.5]);
        let dx = derivs_for(&model, &x);
        assert_relative_eq!(dx[0] + 5.0 * dx[2], 0.0, epsilon = 1e-12);
        // Receptor balance mirrors the complex flux when kdeg = ksyn = 0
        assert_relative_eq!(dx[1], -dx[2], epsilon = 1e-12);
    }

    #[test]
    fn test_tmdd_receptor_turnover() {
        let config = ModelConfig::tmdd(1, Route::IvBolus);
        let params = Parameters::new()
            .with("CL", 1.0)
            .with("V", 5.0)
            .with("KON", 0.0)
            .with("KOFF", 0.0)
            .with("KINT", 0.1)
            .with("KSYN", 2.0)
            .with("KDEG", 0.25);
        let model = OdeModel::new(&config, &params).unwrap();

        // No drug: receptor relaxes toward KSYN/KDEG = 8
        let x = V::from_vec(vec![0.0, 4.0, 0.0]);
        let dx = derivs_for(&model, &x);
        assert_relative_eq!(dx[1], 2.0 - 0.25 * 4.0, max_relative = 1e-12);
        assert_relative_eq!(dx[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_initial_state_is_zero() {
        let config = ModelConfig::tmdd(2, Route::TransitOral { num_transit: 2 });
        let params = Parameters::new()
            .with("CL", 1.0)
            .with("V1", 10.0)
            .with("Q", 2.0)
            .with("V2", 8.0)
            .with("MTT", 6.0)
            .with("KINT", 0.1)
            .with("KON", 0.5)
            .with("KOFF", 0.2)
            .with("KSYN", 1.0)
            .with("KDEG", 0.25);
        let model = OdeModel::new(&config, &params).unwrap();
        let x0 = model.initial_state();
        assert_eq!(x0.len(), 7);
        assert!(x0.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_max_rate_covers_binding() {
        let config = ModelConfig::tmdd(1, Route::IvBolus);
        let params = Parameters::new()
            .with("CL", 1.0)
            .with("V", 10.0)
            .with("KON", 2.0)
            .with("KOFF", 0.1)
            .with("KINT", 0.05)
            .with("KSYN", 1.0)
            .with("KDEG", 0.2);
        let model = OdeModel::new(&config, &params).unwrap();
        // conc scale 10 -> kon term dominates at 20
        assert_relative_eq!(model.max_rate(10.0), 20.0, max_relative = 1e-12);
        // without drug the largest first-order rate wins (kdeg here)
        assert_relative_eq!(model.max_rate(0.0), 0.2, max_relative = 1e-12);
    }
}
