//! Build and simulate compartmental PK and TMDD models
//!
//! A [`ModelConfig`] picks the topology (standard PK or TMDD, one to three
//! compartments, IV bolus / first-order oral / transit-chain oral), a
//! [`Parameters`] map supplies the kinetic constants, and a
//! [`DosingRegimen`] schedules equal bolus doses. [`simulate`] integrates
//! the resulting ODE system with fixed-step RK4 and reports the central
//! concentration over time as a [`Trajectory`]. [`Scenario`] bundles all of
//! it as one JSON-friendly document.

pub mod config;
pub mod dosing;
pub mod error;
pub mod model;
pub mod simulator;

pub use config::{ModelConfig, ModelKind, Parameters, Route, Scenario, SimulationOptions};
pub use dosing::{DoseEvent, DosingRegimen};
pub use error::{ConfigurationError, NumericalError, PksolError};
pub use model::{required_parameters, Compartment, Layout, OdeModel};
pub use simulator::{simulate, Sample, Trajectory};

pub mod prelude {
    pub use crate::config::{
        ModelConfig, ModelKind, Parameters, Route, Scenario, SimulationOptions,
    };
    pub use crate::dosing::DosingRegimen;
    pub use crate::error::PksolError;
    pub use crate::model::required_parameters;
    pub use crate::simulator::{simulate, Sample, Trajectory};
}
