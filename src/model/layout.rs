//! Compartment identities and state-vector ordering

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{ModelConfig, ModelKind, Route};
use crate::error::ConfigurationError;

/// Identity of one compartment in the state vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compartment {
    /// Oral depot
    Gut,
    /// Transit chain member (1-based position)
    Transit(usize),
    /// Central (plasma) compartment; the reported output is its concentration
    Central,
    /// Peripheral distribution compartment (1 or 2)
    Peripheral(usize),
    /// Free receptor pool (TMDD)
    Receptor,
    /// Drug-receptor complex (TMDD)
    Complex,
}

impl fmt::Display for Compartment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gut => write!(f, "GUT"),
            Self::Transit(i) => write!(f, "TRANS_{}", i),
            Self::Central => write!(f, "CENTRAL"),
            Self::Peripheral(i) => write!(f, "PERIPHERAL_{}", i),
            Self::Receptor => write!(f, "RECEPTOR"),
            Self::Complex => write!(f, "COMPLEX"),
        }
    }
}

/// Ordered state-vector layout derived from a [`ModelConfig`]
///
/// The ordering rules are fixed:
///
/// 1. Route block first: `GUT, TRANS_1 … TRANS_N` for transit absorption,
///    `GUT` alone for first-order oral, nothing for IV bolus.
/// 2. Then `CENTRAL`, `PERIPHERAL_1` (≥ 2 compartments), `PERIPHERAL_2`
///    (3 compartments).
/// 3. TMDD appends `RECEPTOR`, `COMPLEX` after the PK block.
///
/// Doses target `GUT` when present, otherwise `CENTRAL`. A `Layout` needs no
/// parameter values, so topology consumers (diagram renderers, UIs) can build
/// one straight from the configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    compartments: Vec<Compartment>,
    central: usize,
    dose_input: usize,
    receptor: Option<usize>,
    complex: Option<usize>,
}

impl Layout {
    /// Derive the layout for a configuration
    pub fn new(config: &ModelConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let num_transit = config.route.num_transit();
        let mut compartments = Vec::with_capacity(
            config.route.has_depot() as usize + num_transit + config.num_compartments + 2,
        );

        if config.route.has_depot() {
            compartments.push(Compartment::Gut);
            for i in 1..=num_transit {
                compartments.push(Compartment::Transit(i));
            }
        }

        let central = compartments.len();
        compartments.push(Compartment::Central);
        for i in 1..config.num_compartments {
            compartments.push(Compartment::Peripheral(i));
        }

        let (receptor, complex) = match config.kind {
            ModelKind::Standard => (None, None),
            ModelKind::Tmdd => {
                let receptor = compartments.len();
                compartments.push(Compartment::Receptor);
                compartments.push(Compartment::Complex);
                (Some(receptor), Some(receptor + 1))
            }
        };

        let dose_input = match config.route {
            Route::IvBolus => central,
            _ => 0,
        };

        Ok(Self {
            compartments,
            central,
            dose_input,
            receptor,
            complex,
        })
    }

    /// The ordered compartment list
    pub fn compartments(&self) -> &[Compartment] {
        &self.compartments
    }

    /// Number of state variables
    pub fn num_states(&self) -> usize {
        self.compartments.len()
    }

    /// Index of the central compartment
    pub fn central(&self) -> usize {
        self.central
    }

    /// Index of the compartment that receives doses
    pub fn dose_input(&self) -> usize {
        self.dose_input
    }

    /// Index of the receptor pool, if the model has one
    pub fn receptor(&self) -> Option<usize> {
        self.receptor
    }

    /// Index of the drug-receptor complex, if the model has one
    pub fn complex(&self) -> Option<usize> {
        self.complex
    }

    /// Position of a compartment in the state vector
    pub fn index_of(&self, compartment: Compartment) -> Option<usize> {
        self.compartments.iter().position(|&c| c == compartment)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.compartments.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", names.join(", "))
    }
}
